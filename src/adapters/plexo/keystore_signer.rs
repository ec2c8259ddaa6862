//! RSA request signer backed by a PKCS#12 keystore.
//!
//! The merchant key is read from the keystore once and kept for the life
//! of the process. Concurrent first use blocks on the same initialization
//! instead of opening the keystore twice.
//!
//! Signatures are SHA-512 with PKCS#1 v1.5 padding, base64 encoded.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::OnceCell;
use p12_keystore::KeyStore;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;

use crate::ports::{GatewayError, RequestSigner};

pub struct KeyStoreSigner {
    keystore_path: PathBuf,
    password: SecretString,
    key: OnceCell<SigningKey<Sha512>>,
}

impl KeyStoreSigner {
    /// Signer that opens `keystore_path` on first use.
    pub fn new(keystore_path: impl Into<PathBuf>, password: SecretString) -> Self {
        Self {
            keystore_path: keystore_path.into(),
            password,
            key: OnceCell::new(),
        }
    }

    /// Signer around an already-loaded key.
    pub fn from_private_key(key: RsaPrivateKey) -> Self {
        Self {
            keystore_path: PathBuf::new(),
            password: SecretString::new(String::new()),
            key: OnceCell::with_value(SigningKey::<Sha512>::new(key)),
        }
    }

    /// Loads the key now so a bad keystore fails startup rather than the
    /// first checkout.
    pub fn preload(&self) -> Result<(), GatewayError> {
        self.signing_key().map(|_| ())
    }

    fn signing_key(&self) -> Result<&SigningKey<Sha512>, GatewayError> {
        self.key.get_or_try_init(|| {
            let key = load_private_key(&self.keystore_path, self.password.expose_secret())?;
            tracing::info!(
                keystore = %self.keystore_path.display(),
                "Loaded gateway signing key"
            );
            Ok(SigningKey::<Sha512>::new(key))
        })
    }
}

impl RequestSigner for KeyStoreSigner {
    fn sign(&self, payload: &[u8]) -> Result<String, GatewayError> {
        let key = self.signing_key()?;
        let signature = key.try_sign(payload).map_err(|e| {
            tracing::error!(error = %e, "RSA signing failed");
            GatewayError::key_material(format!("signing failed: {}", e))
        })?;
        Ok(STANDARD.encode(signature.to_bytes()))
    }
}

/// Reads the single private-key entry out of a PKCS#12 container.
fn load_private_key(path: &Path, password: &str) -> Result<RsaPrivateKey, GatewayError> {
    let data = std::fs::read(path).map_err(|e| {
        tracing::error!(keystore = %path.display(), error = %e, "Keystore unreadable");
        GatewayError::key_material(format!("keystore {} unreadable: {}", path.display(), e))
    })?;

    let keystore = KeyStore::from_pkcs12(&data, password).map_err(|e| {
        tracing::error!(keystore = %path.display(), error = %e, "Keystore could not be opened");
        GatewayError::key_material(format!(
            "keystore {} could not be opened (wrong password or corrupt file): {}",
            path.display(),
            e
        ))
    })?;

    let (alias, chain) = keystore.private_key_chain().ok_or_else(|| {
        tracing::error!(keystore = %path.display(), "Keystore has no private key entry");
        GatewayError::key_material(format!("keystore {} has no private key", path.display()))
    })?;

    RsaPrivateKey::from_pkcs8_der(chain.key()).map_err(|e| {
        tracing::error!(alias = %alias, error = %e, "Keystore key is not an RSA key");
        GatewayError::key_material(format!("entry '{}' is not an RSA private key: {}", alias, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::GatewayErrorCode;
    use p12_keystore::{Certificate, KeyStoreEntry, PrivateKeyChain};
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::pkcs8::EncodePrivateKey;
    use rsa::signature::Verifier;
    use std::io::Write;

    const PASSWORD: &str = "changeit";

    const MERCHANT_CERT: &[u8] =
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/merchant-cert.der"));

    fn test_key() -> RsaPrivateKey {
        RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap()
    }

    fn write_keystore(keystore: &KeyStore, password: &str) -> tempfile::NamedTempFile {
        let data = keystore
            .writer(password)
            .encryption_iterations(1000)
            .mac_iterations(1000)
            .write()
            .unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();
        file
    }

    fn merchant_keystore(key: &RsaPrivateKey) -> tempfile::NamedTempFile {
        let der = key.to_pkcs8_der().unwrap();
        let chain = PrivateKeyChain::new(
            der.as_bytes(),
            b"merchant",
            [Certificate::from_der(MERCHANT_CERT).unwrap()],
        );
        let mut keystore = KeyStore::new();
        keystore.add_entry("merchant", KeyStoreEntry::PrivateKeyChain(chain));
        write_keystore(&keystore, PASSWORD)
    }

    fn verify(key: &RsaPrivateKey, payload: &[u8], signature_b64: &str) -> bool {
        let verifying_key = VerifyingKey::<Sha512>::new(key.to_public_key());
        let bytes = STANDARD.decode(signature_b64).unwrap();
        let signature = Signature::try_from(bytes.as_slice()).unwrap();
        verifying_key.verify(payload, &signature).is_ok()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Signing
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn signature_verifies_with_public_key() {
        let key = test_key();
        let signer = KeyStoreSigner::from_private_key(key.clone());
        let payload = br#"{"Fingerprint":"FP","Object":{"BilledAmount":122.0}}"#;

        let signature = signer.sign(payload).unwrap();

        assert!(verify(&key, payload, &signature));
    }

    #[test]
    fn flipping_any_byte_breaks_verification() {
        let key = test_key();
        let signer = KeyStoreSigner::from_private_key(key.clone());
        let payload = br#"{"Amount":61.0,"Name":"Maceta"}"#.to_vec();
        let signature = signer.sign(&payload).unwrap();

        for i in 0..payload.len() {
            let mut tampered = payload.clone();
            tampered[i] ^= 0x01;
            assert!(!verify(&key, &tampered, &signature), "byte {} flip verified", i);
        }
    }

    #[test]
    fn pkcs1v15_signatures_are_deterministic() {
        let signer = KeyStoreSigner::from_private_key(test_key());
        assert_eq!(signer.sign(b"abc").unwrap(), signer.sign(b"abc").unwrap());
    }

    #[test]
    fn signature_is_standard_base64_of_modulus_length() {
        let signer = KeyStoreSigner::from_private_key(test_key());
        let signature = signer.sign(b"payload").unwrap();
        assert_eq!(STANDARD.decode(signature).unwrap().len(), 128);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Key material failures
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn missing_keystore_is_key_material_error() {
        let dir = tempfile::tempdir().unwrap();
        let signer = KeyStoreSigner::new(
            dir.path().join("absent.p12"),
            SecretString::new("secret".to_string()),
        );

        let err = signer.sign(b"payload").unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::KeyMaterial);
        assert!(!err.retryable);
    }

    #[test]
    fn garbage_keystore_is_key_material_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a pkcs12 container").unwrap();
        let signer = KeyStoreSigner::new(file.path(), SecretString::new("secret".to_string()));

        let err = signer.preload().unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::KeyMaterial);
    }

    #[test]
    fn keystore_key_signs_verifiable_payloads() {
        let key = test_key();
        let file = merchant_keystore(&key);
        let signer = KeyStoreSigner::new(file.path(), SecretString::new(PASSWORD.to_string()));

        signer.preload().unwrap();
        let signature = signer.sign(b"payload").unwrap();

        assert!(verify(&key, b"payload", &signature));
    }

    #[test]
    fn wrong_password_is_key_material_error() {
        let file = merchant_keystore(&test_key());
        let signer = KeyStoreSigner::new(file.path(), SecretString::new("not-the-password".to_string()));

        let err = signer.preload().unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::KeyMaterial);
        assert!(signer.key.get().is_none());
    }

    #[test]
    fn keystore_without_private_key_is_key_material_error() {
        let mut keystore = KeyStore::new();
        keystore.add_entry(
            "gateway",
            KeyStoreEntry::Certificate(Certificate::from_der(MERCHANT_CERT).unwrap()),
        );
        let file = write_keystore(&keystore, PASSWORD);
        let signer = KeyStoreSigner::new(file.path(), SecretString::new(PASSWORD.to_string()));

        let err = signer.sign(b"payload").unwrap_err();

        assert_eq!(err.code, GatewayErrorCode::KeyMaterial);
        assert!(err.message.contains("no private key"), "{}", err.message);
    }

    #[test]
    fn failed_load_is_retried_on_next_use() {
        let dir = tempfile::tempdir().unwrap();
        let signer = KeyStoreSigner::new(
            dir.path().join("late.p12"),
            SecretString::new("secret".to_string()),
        );
        assert!(signer.preload().is_err());
        assert!(signer.preload().is_err());
        assert!(signer.key.get().is_none());
    }
}
