//! Signed request envelope.
//!
//! Every gateway request is the inner payload wrapped as
//! `{Fingerprint, Object, UTCUnixTimeExpiration}`, canonicalized, signed, and
//! sent as `{"Object":<signed text>,"Signature":"<base64>"}`. The signed text
//! is carried as a pre-serialized fragment so the wire body embeds exactly
//! the bytes that were signed.

use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::{json, Value};
use thiserror::Error;

use super::canonical::to_canonical_string;
use super::numeric::ensure_fractional_amounts;
use crate::domain::foundation::Timestamp;

/// Failures while producing signed text. These indicate a malformed
/// internal object and are never worth retrying.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("payload could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Canonical, numerically patched, minified payload text.
#[derive(Debug, Clone)]
pub struct CanonicalPayload(Box<RawValue>);

impl CanonicalPayload {
    /// Canonicalizes `value` and fixes monetary notation.
    pub fn from_value(value: &Value) -> Result<Self, SigningError> {
        let text = ensure_fractional_amounts(&to_canonical_string(value)?);
        Ok(Self(RawValue::from_string(text)?))
    }

    pub fn as_str(&self) -> &str {
        self.0.get()
    }

    /// The exact bytes to sign.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.get().as_bytes()
    }

    fn as_raw(&self) -> &RawValue {
        &self.0
    }
}

/// Builds the outer object that gets canonicalized and signed.
pub fn envelope_object(fingerprint: &str, object: Value, expiration: Timestamp) -> Value {
    json!({
        "Fingerprint": fingerprint,
        "Object": object,
        "UTCUnixTimeExpiration": expiration.as_unix_millis(),
    })
}

/// A signed request, alive for one request/response cycle.
#[derive(Debug, Clone)]
pub struct SignedEnvelope {
    fingerprint: String,
    canonical_object: CanonicalPayload,
    expiration: Timestamp,
    signature: String,
}

#[derive(Serialize)]
struct WireEnvelope<'a> {
    #[serde(rename = "Object")]
    object: &'a RawValue,
    #[serde(rename = "Signature")]
    signature: &'a str,
}

impl SignedEnvelope {
    pub fn new(
        fingerprint: impl Into<String>,
        canonical_object: CanonicalPayload,
        expiration: Timestamp,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            canonical_object,
            expiration,
            signature: signature.into(),
        }
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn canonical_object(&self) -> &CanonicalPayload {
        &self.canonical_object
    }

    pub fn expiration(&self) -> Timestamp {
        self.expiration
    }

    /// Base64 signature over [`CanonicalPayload::as_bytes`].
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Request body with the signed text written through verbatim.
    pub fn to_wire_body(&self) -> Result<String, SigningError> {
        let wire = WireEnvelope {
            object: self.canonical_object.as_raw(),
            signature: &self.signature,
        };
        Ok(serde_json::to_string(&wire)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expiration() -> Timestamp {
        Timestamp::from_unix_millis(1_617_816_171_899)
    }

    #[test]
    fn envelope_object_is_canonicalized_with_fingerprint_first() {
        let outer = envelope_object("FP", json!({ "Type": 1, "ClientReferenceId": "x" }), expiration());
        let payload = CanonicalPayload::from_value(&outer).unwrap();

        assert_eq!(
            payload.as_str(),
            r#"{"Fingerprint":"FP","Object":{"ClientReferenceId":"x","Type":1},"UTCUnixTimeExpiration":1617816171899}"#
        );
    }

    #[test]
    fn canonical_payload_patches_integer_amounts() {
        let payload = CanonicalPayload::from_value(&json!({ "BilledAmount": 122 })).unwrap();
        assert_eq!(payload.as_str(), r#"{"BilledAmount":122.0}"#);
    }

    #[test]
    fn wire_body_embeds_signed_text_verbatim() {
        let payload =
            CanonicalPayload::from_value(&json!({ "b": 1.0, "a": { "Amount": 5 } })).unwrap();
        let signed_text = payload.as_str().to_string();
        let envelope = SignedEnvelope::new("FP", payload, expiration(), "c2ln");

        let body = envelope.to_wire_body().unwrap();

        assert_eq!(body, format!(r#"{{"Object":{},"Signature":"c2ln"}}"#, signed_text));
        assert!(body.contains(r#""Amount":5.0"#));
        assert!(body.contains(r#""b":1.0"#));
    }

    #[test]
    fn accessors_expose_parts() {
        let payload = CanonicalPayload::from_value(&json!({})).unwrap();
        let envelope = SignedEnvelope::new("FP", payload, expiration(), "sig");
        assert_eq!(envelope.fingerprint(), "FP");
        assert_eq!(envelope.signature(), "sig");
        assert_eq!(envelope.expiration(), expiration());
        assert_eq!(envelope.canonical_object().as_bytes(), b"{}");
    }
}
