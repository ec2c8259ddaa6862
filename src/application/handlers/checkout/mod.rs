//! Checkout handlers.
//!
//! ## Commands
//! - Starting a checkout and initiating the gateway purchase
//! - Applying gateway callbacks
//! - Polling the gateway for an outcome
//! - Sweeping stale transactions
//!
//! ## Queries
//! - Transaction status for the confirmation page
//!
//! Every status write after creation goes through [`ReconciliationEngine`].

mod get_transaction_status;
mod handle_gateway_webhook;
mod poll_transaction_status;
mod reconcile;
mod reconcile_stale;
mod start_checkout;

#[cfg(test)]
pub(crate) mod test_support;

// Commands
pub use handle_gateway_webhook::{HandleGatewayWebhookHandler, HandleGatewayWebhookResult};
pub use poll_transaction_status::{
    PollRetryPolicy, PollTransactionStatusCommand, PollTransactionStatusHandler,
    PollTransactionStatusResult,
};
pub use reconcile::{ReconcileOutcome, ReconciliationEngine};
pub use reconcile_stale::{ReconcileStaleTransactionsHandler, StaleSweepConfig, SweepReport};
pub use start_checkout::{CheckoutItem, StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult};

// Queries
pub use get_transaction_status::{
    GetTransactionStatusHandler, GetTransactionStatusQuery, TransactionStatusView,
};
