//! Gateway-reported purchase outcome.

use serde::{Deserialize, Serialize};

use super::TransactionStatus;

/// Outcome code the gateway uses for an approved purchase.
pub const APPROVED_OUTCOME_CODE: i32 = 0;

/// Raw outcome code together with the terminal status it maps to.
///
/// Webhook callbacks and status inquiries both go through
/// [`GatewayOutcome::from_code`]: zero is approved, anything else declined.
/// The raw code is kept so distinct decline reasons survive in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOutcome {
    code: i32,
    status: TransactionStatus,
}

impl GatewayOutcome {
    pub fn from_code(code: i32) -> Self {
        let status = if code == APPROVED_OUTCOME_CODE {
            TransactionStatus::Approved
        } else {
            TransactionStatus::Declined
        };
        Self { code, status }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    /// Always a terminal status.
    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn is_approved(&self) -> bool {
        self.status == TransactionStatus::Approved
    }
}
