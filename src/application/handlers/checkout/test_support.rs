//! Shared fixtures for checkout handler tests.

use crate::domain::checkout::{Customer, LineItem, Money, ShippingAddress, Transaction};
use crate::domain::foundation::{ProductId, TransactionId};

pub(crate) fn customer() -> Customer {
    Customer::new(
        "Ana",
        "Pérez",
        "ana@example.com",
        "+598 99 123 456",
        ShippingAddress {
            address: "Av. Italia 1234".to_string(),
            zip_code: "11300".to_string(),
            city: "Montevideo".to_string(),
        },
    )
    .unwrap()
}

pub(crate) fn pending_transaction() -> Transaction {
    let items = vec![
        LineItem::new(ProductId::new(1).unwrap(), "Maceta", Money::from_cents(6100), 1).unwrap(),
        LineItem::new(ProductId::new(2).unwrap(), "Sustrato", Money::from_cents(6100), 1).unwrap(),
    ];
    Transaction::create(TransactionId::new(), customer(), items).unwrap()
}
