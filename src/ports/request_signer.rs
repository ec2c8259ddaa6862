//! Signing port for gateway requests.

use super::GatewayError;

/// Produces the base64 signature the gateway verifies against the exact
/// canonical bytes of a request.
pub trait RequestSigner: Send + Sync {
    /// # Errors
    ///
    /// `KeyMaterial` if the private key cannot be loaded.
    fn sign(&self, payload: &[u8]) -> Result<String, GatewayError>;
}
