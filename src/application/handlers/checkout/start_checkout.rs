//! StartCheckoutHandler - Command handler for checkout intake.
//!
//! Prices come from the catalog at intake time. The transaction is saved as
//! `Pending` before the gateway is contacted, so a record exists even when
//! initiation fails.

use std::collections::HashMap;
use std::sync::Arc;

use super::ReconciliationEngine;
use crate::domain::checkout::{CheckoutError, Customer, LineItem, Money, Transaction, TransactionStatus};
use crate::domain::foundation::{ProductId, TransactionId};
use crate::ports::{PaymentGateway, ProductCatalog, TransactionRepository};

/// One requested product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutItem {
    pub product_id: i64,
    pub quantity: u32,
}

/// Command to start a checkout.
#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    pub customer: Customer,
    pub items: Vec<CheckoutItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartCheckoutResult {
    pub transaction_id: TransactionId,
    pub status: TransactionStatus,
    pub total_amount: Money,
    pub redirect_uri: Option<String>,
}

pub struct StartCheckoutHandler {
    repository: Arc<dyn TransactionRepository>,
    catalog: Arc<dyn ProductCatalog>,
    gateway: Arc<dyn PaymentGateway>,
    engine: Arc<ReconciliationEngine>,
}

impl StartCheckoutHandler {
    pub fn new(
        repository: Arc<dyn TransactionRepository>,
        catalog: Arc<dyn ProductCatalog>,
        gateway: Arc<dyn PaymentGateway>,
        engine: Arc<ReconciliationEngine>,
    ) -> Self {
        Self {
            repository,
            catalog,
            gateway,
            engine,
        }
    }

    pub async fn handle(&self, cmd: StartCheckoutCommand) -> Result<StartCheckoutResult, CheckoutError> {
        // 1. Resolve products and prices
        let line_items = self.resolve_line_items(&cmd.items).await?;

        // 2. Record the pending transaction
        let transaction = Transaction::create(TransactionId::new(), cmd.customer, line_items)?;
        self.repository.save(&transaction).await?;
        tracing::info!(
            transaction_id = %transaction.id,
            status = %transaction.status,
            total_amount = %transaction.total_amount,
            "Checkout started"
        );

        // 3. Initiate the purchase; never retried
        let session = self
            .gateway
            .initiate_purchase(&transaction)
            .await
            .map_err(|e| {
                tracing::warn!(
                    transaction_id = %transaction.id,
                    error = %e,
                    gateway_body = e.gateway_body.as_deref().unwrap_or(""),
                    "Purchase initiation failed"
                );
                CheckoutError::from(e)
            })?;

        // 4. Gateway accepted the request
        self.engine.mark_awaiting(&transaction.id).await?;

        let status = self
            .repository
            .find_by_id(&transaction.id)
            .await?
            .map(|tx| tx.status)
            .unwrap_or(TransactionStatus::AwaitingGatewayResult);

        Ok(StartCheckoutResult {
            transaction_id: transaction.id,
            status,
            total_amount: transaction.total_amount,
            redirect_uri: session.redirect_uri,
        })
    }

    async fn resolve_line_items(&self, items: &[CheckoutItem]) -> Result<Vec<LineItem>, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::validation("items", "At least one product is required"));
        }

        let product_ids = items
            .iter()
            .map(|item| ProductId::new(item.product_id))
            .collect::<Result<Vec<_>, _>>()?;

        let mut unique_ids = product_ids.clone();
        unique_ids.sort();
        unique_ids.dedup();

        let products: HashMap<ProductId, _> = self
            .catalog
            .find_by_ids(&unique_ids)
            .await?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        let missing: Vec<String> = unique_ids
            .iter()
            .filter(|id| !products.contains_key(id))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(CheckoutError::validation(
                "items",
                format!("Unknown product ids: {}", missing.join(", ")),
            ));
        }

        let mut line_items = Vec::with_capacity(items.len());
        for (item, id) in items.iter().zip(product_ids) {
            if let Some(product) = products.get(&id) {
                line_items.push(LineItem::new(id, product.name.clone(), product.price, item.quantity)?);
            }
        }
        Ok(line_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryProductCatalog, InMemoryTransactionRepository};
    use crate::adapters::plexo::MockPaymentGateway;
    use crate::application::handlers::checkout::test_support::customer;
    use crate::domain::checkout::GatewayOutcome;
    use crate::ports::GatewayError;

    struct Fixture {
        handler: StartCheckoutHandler,
        repo: Arc<InMemoryTransactionRepository>,
        gateway: Arc<MockPaymentGateway>,
    }

    async fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryTransactionRepository::new());
        let catalog = Arc::new(InMemoryProductCatalog::new());
        catalog.insert(ProductId::new(1).unwrap(), "Maceta", Money::from_cents(6100)).await;
        catalog.insert(ProductId::new(2).unwrap(), "Sustrato", Money::from_cents(6100)).await;
        catalog.insert(ProductId::new(3).unwrap(), "Regadera", Money::from_cents(1999)).await;
        let gateway = Arc::new(MockPaymentGateway::new());
        let engine = Arc::new(ReconciliationEngine::new(repo.clone()));
        let handler = StartCheckoutHandler::new(repo.clone(), catalog, gateway.clone(), engine);
        Fixture {
            handler,
            repo,
            gateway,
        }
    }

    fn command(items: &[(i64, u32)]) -> StartCheckoutCommand {
        StartCheckoutCommand {
            customer: customer(),
            items: items
                .iter()
                .map(|&(product_id, quantity)| CheckoutItem {
                    product_id,
                    quantity,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn prices_items_from_catalog_and_awaits_gateway() {
        let f = fixture().await;

        let result = f.handler.handle(command(&[(1, 1), (2, 1)])).await.unwrap();

        assert_eq!(result.status, TransactionStatus::AwaitingGatewayResult);
        assert_eq!(result.total_amount, Money::from_cents(12200));
        assert!(result.redirect_uri.is_some());

        let stored = f.repo.find_by_id(&result.transaction_id).await.unwrap().unwrap();
        assert_eq!(stored.line_items.len(), 2);
        assert_eq!(stored.line_items[0].name(), "Maceta");
        assert_eq!(f.gateway.initiate_calls(), 1);
    }

    #[tokio::test]
    async fn quantities_multiply_unit_price() {
        let f = fixture().await;

        let result = f.handler.handle(command(&[(3, 3)])).await.unwrap();

        assert_eq!(result.total_amount, Money::from_cents(5997));
    }

    #[tokio::test]
    async fn empty_items_are_rejected_before_any_side_effect() {
        let f = fixture().await;

        let err = f.handler.handle(command(&[])).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Validation { ref field, .. } if field == "items"));
        assert!(f.repo.is_empty().await);
        assert_eq!(f.gateway.initiate_calls(), 0);
    }

    #[tokio::test]
    async fn unknown_products_are_listed() {
        let f = fixture().await;

        let err = f.handler.handle(command(&[(1, 1), (42, 1), (7, 2)])).await.unwrap_err();

        match err {
            CheckoutError::Validation { field, message } => {
                assert_eq!(field, "items");
                assert!(message.contains("7, 42"), "{}", message);
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert!(f.repo.is_empty().await);
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let f = fixture().await;

        let err = f.handler.handle(command(&[(1, 0)])).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Validation { ref field, .. } if field == "quantity"));
    }

    #[tokio::test]
    async fn gateway_failure_leaves_pending_record() {
        let f = fixture().await;
        f.gateway.fail_initiation(GatewayError::unavailable("connection refused"));

        let err = f.handler.handle(command(&[(1, 1)])).await.unwrap_err();

        assert!(matches!(err, CheckoutError::GatewayUnavailable(_)));
        assert_eq!(f.repo.len().await, 1);
        assert_eq!(f.gateway.initiate_calls(), 1);
    }

    #[tokio::test]
    async fn early_outcome_is_not_overwritten_by_initiation() {
        let f = fixture().await;
        let result = f.handler.handle(command(&[(1, 1)])).await.unwrap();
        let engine = ReconciliationEngine::new(f.repo.clone());
        engine
            .apply_outcome(&result.transaction_id, GatewayOutcome::from_code(0))
            .await
            .unwrap();

        engine.mark_awaiting(&result.transaction_id).await.unwrap();

        let stored = f.repo.find_by_id(&result.transaction_id).await.unwrap().unwrap();
        assert_eq!(stored.status, TransactionStatus::Approved);
    }
}
