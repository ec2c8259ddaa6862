//! Application layer - Commands, Queries, and Handlers.
//!
//! Orchestrates domain operations and coordinates between ports.
//! Command handlers write through the reconciliation engine; query handlers only read.

pub mod handlers;

pub use handlers::checkout::{
    // Commands
    CheckoutItem, StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult,
    HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
    PollRetryPolicy, PollTransactionStatusCommand, PollTransactionStatusHandler,
    PollTransactionStatusResult,
    ReconcileStaleTransactionsHandler, StaleSweepConfig, SweepReport,
    ReconcileOutcome, ReconciliationEngine,
    // Queries
    GetTransactionStatusHandler, GetTransactionStatusQuery, TransactionStatusView,
};
