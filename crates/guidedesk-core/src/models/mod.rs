//! Data models for guide intakes
//!
//! Intakes, their per-section details, and uploaded attachments. Request and
//! response DTOs used by the HTTP layer live next to the entity they belong to.

mod intake;
mod section;
mod stats;
mod upload;

pub use intake::*;
pub use section::*;
pub use stats::*;
pub use upload::*;
