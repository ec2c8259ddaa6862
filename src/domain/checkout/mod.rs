//! Checkout domain: priced carts, transactions and their reconciliation states.

mod customer;
mod errors;
mod line_item;
mod money;
mod outcome;
mod status;
mod transaction;

pub use customer::{Customer, ShippingAddress};
pub use errors::CheckoutError;
pub use line_item::{LineItem, MAX_QUANTITY};
pub use money::Money;
pub use outcome::{GatewayOutcome, APPROVED_OUTCOME_CODE};
pub use status::TransactionStatus;
pub use transaction::Transaction;
