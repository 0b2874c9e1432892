use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Dashboard counters computed from a full scan of the intake collection.
///
/// Map keys are the wire strings of `IntakeStatus` and `ComplexityBand`; every
/// status and band is present, with zero when nothing matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IntakeStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_complexity: BTreeMap<String, usize>,
    pub recent_count: usize,
}
