//! Status transition policy
//!
//! `Unrestricted` accepts any status change. `Workflow` enforces the production
//! graph below; re-setting the current status is always accepted.
//!
//! ```text
//! NOT_STARTED  -> STARTED, ROADBLOCK
//! STARTED      -> ROADBLOCK, READY_FOR_QA
//! ROADBLOCK    -> STARTED, READY_FOR_QA
//! READY_FOR_QA -> STARTED, ROADBLOCK, DELIVERED_TO_CONSULTANT
//! DELIVERED_TO_CONSULTANT (terminal)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::AppError;
use crate::models::IntakeStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTransitionPolicy {
    #[default]
    Unrestricted,
    Workflow,
}

impl FromStr for StatusTransitionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unrestricted" => Ok(StatusTransitionPolicy::Unrestricted),
            "workflow" => Ok(StatusTransitionPolicy::Workflow),
            _ => Err(anyhow::anyhow!("Invalid status transition policy: {}", s)),
        }
    }
}

impl Display for StatusTransitionPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StatusTransitionPolicy::Unrestricted => write!(f, "unrestricted"),
            StatusTransitionPolicy::Workflow => write!(f, "workflow"),
        }
    }
}

pub fn allowed_transitions(from: IntakeStatus) -> &'static [IntakeStatus] {
    use IntakeStatus::*;
    match from {
        NotStarted => &[Started, Roadblock],
        Started => &[Roadblock, ReadyForQa],
        Roadblock => &[Started, ReadyForQa],
        ReadyForQa => &[Started, Roadblock, DeliveredToConsultant],
        DeliveredToConsultant => &[],
    }
}

impl StatusTransitionPolicy {
    pub fn validate(&self, from: IntakeStatus, to: IntakeStatus) -> Result<(), AppError> {
        match self {
            StatusTransitionPolicy::Unrestricted => Ok(()),
            StatusTransitionPolicy::Workflow => {
                if from == to || allowed_transitions(from).contains(&to) {
                    Ok(())
                } else {
                    Err(AppError::IllegalTransition { from, to })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use IntakeStatus::*;

    #[test]
    fn test_unrestricted_allows_backwards() {
        let policy = StatusTransitionPolicy::Unrestricted;
        assert!(policy.validate(DeliveredToConsultant, NotStarted).is_ok());
        assert!(policy.validate(NotStarted, DeliveredToConsultant).is_ok());
    }

    #[test]
    fn test_workflow_graph() {
        let policy = StatusTransitionPolicy::Workflow;
        assert!(policy.validate(NotStarted, Started).is_ok());
        assert!(policy.validate(Started, ReadyForQa).is_ok());
        assert!(policy.validate(ReadyForQa, DeliveredToConsultant).is_ok());
        assert!(policy.validate(Roadblock, Started).is_ok());
        assert!(policy.validate(Started, Started).is_ok());

        let err = policy.validate(DeliveredToConsultant, NotStarted).unwrap_err();
        assert!(matches!(
            err,
            AppError::IllegalTransition {
                from: DeliveredToConsultant,
                to: NotStarted
            }
        ));
        assert!(policy.validate(NotStarted, DeliveredToConsultant).is_err());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "WORKFLOW".parse::<StatusTransitionPolicy>().unwrap(),
            StatusTransitionPolicy::Workflow
        );
        assert_eq!(
            "unrestricted".parse::<StatusTransitionPolicy>().unwrap(),
            StatusTransitionPolicy::Unrestricted
        );
        assert!("strict".parse::<StatusTransitionPolicy>().is_err());
    }
}
