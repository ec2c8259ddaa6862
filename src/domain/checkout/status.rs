//! Transaction status state machine.
//!
//! `Pending → AwaitingGatewayResult → {Approved, Declined}`. Terminal states
//! are final; nothing moves a transaction backwards or between outcomes.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Recorded before the gateway is contacted.
    Pending,

    /// The gateway accepted the signed purchase request.
    AwaitingGatewayResult,

    Approved,

    Declined,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::AwaitingGatewayResult => "awaiting_gateway_result",
            TransactionStatus::Approved => "approved",
            TransactionStatus::Declined => "declined",
        }
    }
}

impl StateMachine for TransactionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TransactionStatus::*;
        matches!(
            (self, target),
            (Pending, AwaitingGatewayResult)
                | (AwaitingGatewayResult, Approved)
                | (AwaitingGatewayResult, Declined)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TransactionStatus::*;
        match self {
            Pending => vec![AwaitingGatewayResult],
            AwaitingGatewayResult => vec![Approved, Declined],
            Approved | Declined => vec![],
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "awaiting_gateway_result" => Ok(TransactionStatus::AwaitingGatewayResult),
            "approved" => Ok(TransactionStatus::Approved),
            "declined" => Ok(TransactionStatus::Declined),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown transaction status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TransactionStatus::*;

    const ALL: [TransactionStatus; 4] = [Pending, AwaitingGatewayResult, Approved, Declined];

    #[test]
    fn pending_only_moves_to_awaiting() {
        assert_eq!(Pending.valid_transitions(), vec![AwaitingGatewayResult]);
        assert!(Pending.transition_to(Approved).is_err());
        assert!(Pending.transition_to(Declined).is_err());
    }

    #[test]
    fn awaiting_moves_to_either_outcome() {
        assert_eq!(AwaitingGatewayResult.transition_to(Approved), Ok(Approved));
        assert_eq!(AwaitingGatewayResult.transition_to(Declined), Ok(Declined));
        assert!(AwaitingGatewayResult.transition_to(Pending).is_err());
    }

    #[test]
    fn outcomes_are_terminal() {
        assert!(Approved.is_terminal());
        assert!(Declined.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(!AwaitingGatewayResult.is_terminal());
        for target in ALL {
            assert!(!Approved.can_transition_to(&target));
            assert!(!Declined.can_transition_to(&target));
        }
    }

    #[test]
    fn can_transition_to_agrees_with_valid_transitions() {
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(&to),
                    from.valid_transitions().contains(&to),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn string_form_roundtrips() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<TransactionStatus>(), Ok(status));
        }
        assert!("pendiente".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&AwaitingGatewayResult).unwrap(),
            "\"awaiting_gateway_result\""
        );
    }
}
