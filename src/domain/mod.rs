//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, errors, state machine)
//! - `signing` - Canonical form, monetary notation and signed envelopes
//! - `checkout` - Transactions, line items, money and outcome mapping

pub mod checkout;
pub mod foundation;
pub mod signing;
