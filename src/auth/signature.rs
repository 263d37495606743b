// Shared-secret signatures for inbound verification callbacks

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Signing secret is not configured")]
    MissingSecret,
    #[error("Invalid signing key: {reason}")]
    InvalidKey { reason: String },
}

/// Boolean predicate over `(signature, payload)`
#[cfg_attr(test, automock)]
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, signature: &str, payload: &[u8]) -> bool;
}

/// Stand-in used when no webhook secret is configured; rejects every callback
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectingSignatureVerifier;

impl SignatureVerifier for RejectingSignatureVerifier {
    fn verify(&self, _signature: &str, _payload: &[u8]) -> bool {
        false
    }
}

/// HMAC-SHA256 over the raw payload bytes, hex encoded
#[derive(Clone)]
pub struct HmacSignatureVerifier {
    secret: Vec<u8>,
}

impl std::fmt::Debug for HmacSignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSignatureVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl HmacSignatureVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, SignatureError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(SignatureError::MissingSecret);
        }
        HmacSha256::new_from_slice(secret).map_err(|e| SignatureError::InvalidKey {
            reason: e.to_string(),
        })?;
        Ok(Self {
            secret: secret.to_vec(),
        })
    }

    fn mac(&self, payload: &[u8]) -> Vec<u8> {
        // Key length was validated in `new`
        let mut mac = match HmacSha256::new_from_slice(&self.secret) {
            Ok(mac) => mac,
            Err(_) => return Vec::new(),
        };
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }

    /// Hex signature a sender holding the same secret would attach
    pub fn sign(&self, payload: &[u8]) -> String {
        hex::encode(self.mac(payload))
    }
}

impl SignatureVerifier for HmacSignatureVerifier {
    fn verify(&self, signature: &str, payload: &[u8]) -> bool {
        let Ok(provided) = hex::decode(signature.trim()) else {
            return false;
        };
        let expected = self.mac(payload);
        if expected.is_empty() || provided.len() != expected.len() {
            return false;
        }
        expected.ct_eq(provided.as_slice()).into()
    }
}
