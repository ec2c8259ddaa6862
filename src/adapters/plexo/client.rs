//! Express checkout gateway client.
//!
//! Implements the `PaymentGateway` port. Every request is wrapped as
//! `{Fingerprint, Object, UTCUnixTimeExpiration}`, canonicalized, signed,
//! and posted as `{"Object":<signed text>,"Signature":"<base64>"}`.
//!
//! # Configuration
//!
//! ```ignore
//! let signer = Arc::new(KeyStoreSigner::new(&config.keystore_path, config.keystore_password.clone()));
//! let client = PlexoGatewayClient::new(config, signer)?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::domain::checkout::{GatewayOutcome, Transaction};
use crate::domain::foundation::{Timestamp, TransactionId};
use crate::domain::signing::{envelope_object, CanonicalPayload, SignedEnvelope, SigningError};
use crate::ports::{
    CallbackReport, GatewayError, PaymentGateway, PurchaseSession, RequestSigner,
};

use super::payload::PayloadBuilder;
use super::wire_types::{GatewayResult, SignedMessage, RESULT_EXPIRED, RESULT_OK};

pub struct PlexoGatewayClient {
    config: GatewayConfig,
    payloads: PayloadBuilder,
    signer: Arc<dyn RequestSigner>,
    http_client: reqwest::Client,
}

impl PlexoGatewayClient {
    /// Creates a client whose requests time out after
    /// `config.request_timeout_secs`.
    pub fn new(config: GatewayConfig, signer: Arc<dyn RequestSigner>) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GatewayError::unavailable(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            payloads: PayloadBuilder::new(config.clone()),
            config,
            signer,
            http_client,
        })
    }

    /// Wraps, canonicalizes and signs `object`.
    pub fn seal(&self, object: Value, now: Timestamp) -> Result<SignedEnvelope, GatewayError> {
        let expiration = now.plus_secs(self.config.request_ttl_secs);
        let outer = envelope_object(&self.config.fingerprint, object, expiration);
        let canonical = CanonicalPayload::from_value(&outer)?;
        let signature = self.signer.sign(canonical.as_bytes())?;
        Ok(SignedEnvelope::new(
            self.config.fingerprint.clone(),
            canonical,
            expiration,
            signature,
        ))
    }

    async fn post(
        &self,
        url: &str,
        envelope: &SignedEnvelope,
        transaction_id: &TransactionId,
    ) -> Result<GatewayResult, GatewayError> {
        let body = envelope.to_wire_body()?;

        tracing::debug!(
            transaction_id = %transaction_id,
            endpoint = %url,
            expires_at = envelope.expiration().as_unix_millis(),
            "Sending signed gateway request"
        );

        let response = self
            .http_client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    tracing::warn!(transaction_id = %transaction_id, endpoint = %url, "Gateway request timed out");
                    GatewayError::timeout(format!(
                        "no response within {}s",
                        self.config.request_timeout_secs
                    ))
                } else {
                    tracing::warn!(transaction_id = %transaction_id, endpoint = %url, error = %e, "Gateway unreachable");
                    GatewayError::unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::timeout("response body timed out")
            } else {
                GatewayError::unavailable(format!("failed reading response: {}", e))
            }
        })?;

        if !status.is_success() {
            tracing::warn!(
                transaction_id = %transaction_id,
                endpoint = %url,
                http_status = status.as_u16(),
                body = %text,
                "Gateway returned error status"
            );
            return Err(GatewayError::rejected(format!("HTTP {}", status.as_u16()))
                .with_gateway_body(text));
        }

        let message: SignedMessage = serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(transaction_id = %transaction_id, error = %e, body = %text, "Unparseable gateway response");
            GatewayError::invalid_response(format!("unparseable response: {}", e))
                .with_gateway_body(text.clone())
        })?;

        let result = message.object.object;
        match result.code() {
            RESULT_OK => Ok(result),
            RESULT_EXPIRED => {
                tracing::warn!(transaction_id = %transaction_id, "Gateway reports signed request expired");
                Err(GatewayError::expired(
                    result
                        .error_message
                        .unwrap_or_else(|| "request expired".to_string()),
                )
                .with_gateway_body(text))
            }
            code => {
                tracing::warn!(
                    transaction_id = %transaction_id,
                    result_code = code,
                    body = %text,
                    "Gateway rejected request"
                );
                Err(GatewayError::rejected(format!(
                    "result code {}: {}",
                    code,
                    result.error_message.as_deref().unwrap_or("no message")
                ))
                .with_gateway_body(text))
            }
        }
    }
}

#[async_trait]
impl PaymentGateway for PlexoGatewayClient {
    async fn initiate_purchase(
        &self,
        transaction: &Transaction,
    ) -> Result<PurchaseSession, GatewayError> {
        let object = self
            .payloads
            .authorization(transaction)
            .map_err(SigningError::from)?;
        let envelope = self.seal(object, Timestamp::now())?;

        let result = self
            .post(&self.config.purchase_url(), &envelope, &transaction.id)
            .await?;

        tracing::info!(
            transaction_id = %transaction.id,
            amount = %transaction.total_amount,
            "Gateway accepted purchase authorization"
        );

        Ok(PurchaseSession {
            redirect_uri: result.redirect_uri().map(str::to_string),
        })
    }

    async fn query_status(
        &self,
        id: &TransactionId,
    ) -> Result<Option<GatewayOutcome>, GatewayError> {
        let object = self.payloads.status_inquiry(id).map_err(SigningError::from)?;
        let envelope = self.seal(object, Timestamp::now())?;

        let result = self.post(&self.config.status_url(), &envelope, id).await?;

        let Some(purchase) = result.purchase() else {
            tracing::debug!(transaction_id = %id, "Gateway has no outcome yet");
            return Ok(None);
        };

        if purchase.client_reference_id != id.to_string() {
            tracing::warn!(
                transaction_id = %id,
                reported = %purchase.client_reference_id,
                "Status response references a different transaction"
            );
            return Err(GatewayError::invalid_response(
                "status response for a different reference",
            ));
        }

        Ok(Some(GatewayOutcome::from_code(purchase.status)))
    }

    fn parse_callback(&self, payload: &[u8]) -> Result<CallbackReport, GatewayError> {
        parse_callback(payload)
    }
}

/// Reads `Object.Object.Transactions.Purchase.{ClientReferenceId, Status}`.
pub fn parse_callback(payload: &[u8]) -> Result<CallbackReport, GatewayError> {
    let message: SignedMessage = serde_json::from_slice(payload)
        .map_err(|e| GatewayError::invalid_response(format!("callback structure: {}", e)))?;

    let purchase = message
        .object
        .object
        .purchase()
        .ok_or_else(|| GatewayError::invalid_response("callback has no purchase report"))?;

    let reference = purchase.client_reference_id.trim();
    if reference.is_empty() {
        return Err(GatewayError::invalid_response("callback has empty ClientReferenceId"));
    }

    Ok(CallbackReport {
        reference: reference.to_string(),
        outcome: GatewayOutcome::from_code(purchase.status),
    })
}
