//! Gateway response and callback shapes.
//!
//! Responses and callbacks share the signed layout
//! `{"Object":{"Fingerprint","Object":{...},"UTCUnixTimeExpiration"},"Signature"}`.
//! Only the inner `Object` matters here; response signatures are not
//! verified.

use serde::Deserialize;

/// Result code for a successful gateway operation.
pub const RESULT_OK: i32 = 0;
/// Result code the gateway uses when the signed request has expired.
pub const RESULT_EXPIRED: i32 = 3;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignedMessage {
    pub object: MessageEnvelope,
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageEnvelope {
    #[serde(default)]
    pub fingerprint: Option<String>,
    pub object: GatewayResult,
    #[serde(rename = "UTCUnixTimeExpiration", default)]
    pub expiration: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GatewayResult {
    #[serde(default)]
    pub result_code: Option<i32>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub response: Option<ResponseBody>,
    #[serde(default)]
    pub transactions: Option<Transactions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseBody {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub transactions: Option<Transactions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transactions {
    #[serde(default)]
    pub purchase: Option<PurchaseReport>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PurchaseReport {
    pub client_reference_id: String,
    pub status: i32,
}

impl GatewayResult {
    /// Result code, treating an absent code as success.
    pub fn code(&self) -> i32 {
        self.result_code.unwrap_or(RESULT_OK)
    }

    /// Purchase report, wherever the gateway placed it.
    pub fn purchase(&self) -> Option<&PurchaseReport> {
        self.transactions
            .as_ref()
            .and_then(|t| t.purchase.as_ref())
            .or_else(|| {
                self.response
                    .as_ref()
                    .and_then(|r| r.transactions.as_ref())
                    .and_then(|t| t.purchase.as_ref())
            })
    }

    pub fn redirect_uri(&self) -> Option<&str> {
        self.response.as_ref().and_then(|r| r.uri.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_callback_shape() {
        let body = r#"{
            "Object": {
                "Fingerprint": "FP",
                "Object": { "Transactions": { "Purchase": { "ClientReferenceId": "abc", "Status": 0 } } },
                "UTCUnixTimeExpiration": 1617816171899
            },
            "Signature": "c2ln"
        }"#;

        let message: SignedMessage = serde_json::from_str(body).unwrap();
        let purchase = message.object.object.purchase().unwrap();

        assert_eq!(purchase.client_reference_id, "abc");
        assert_eq!(purchase.status, 0);
        assert_eq!(message.object.expiration, Some(1617816171899));
    }

    #[test]
    fn parses_purchase_response_with_uri() {
        let body = r#"{"Object":{"Object":{"ResultCode":0,"Response":{"Uri":"https://pay.example/s/1"}}}}"#;
        let message: SignedMessage = serde_json::from_str(body).unwrap();

        assert_eq!(message.object.object.code(), RESULT_OK);
        assert_eq!(message.object.object.redirect_uri(), Some("https://pay.example/s/1"));
        assert!(message.object.object.purchase().is_none());
    }

    #[test]
    fn finds_purchase_nested_in_response() {
        let body = r#"{"Object":{"Object":{"ResultCode":0,"Response":{"Transactions":{"Purchase":{"ClientReferenceId":"x","Status":5}}}}}}"#;
        let message: SignedMessage = serde_json::from_str(body).unwrap();
        assert_eq!(message.object.object.purchase().unwrap().status, 5);
    }

    #[test]
    fn missing_reference_fails_to_parse() {
        let body = r#"{"Object":{"Object":{"Transactions":{"Purchase":{"Status":0}}}}}"#;
        assert!(serde_json::from_str::<SignedMessage>(body).is_err());
    }
}
