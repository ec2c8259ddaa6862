//! Express Checkout - signed card-payment gateway integration
//!
//! Builds canonical, RSA-signed purchase requests for the gateway and
//! reconciles their outcomes, delivered by webhook or by status poll, into a
//! single authoritative transaction status.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
