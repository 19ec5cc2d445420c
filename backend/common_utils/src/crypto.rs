//! Utilities for cryptographic algorithms
use error_stack::ResultExt;
use sha2::Digest;
use subtle::ConstantTimeEq;

use crate::errors::{self, CustomResult};

/// Generates a keyed digest over a message
pub trait SignMessage {
    /// Takes in a secret and a message and generates a digest
    fn sign_message(
        &self,
        secret: &[u8],
        msg: &[u8],
    ) -> CustomResult<Vec<u8>, errors::CryptoError>;
}

/// Checks a supplied signature against a message
pub trait VerifySignature {
    /// Takes in a secret, the signature and the message and verifies the message
    /// against the signature
    fn verify_signature(
        &self,
        secret: &[u8],
        signature: &[u8],
        msg: &[u8],
    ) -> CustomResult<bool, errors::CryptoError>;
}

/// Secret-suffixed SHA-512, `SHA-512(msg || secret)`, the scheme the payment system uses to
/// sign callbacks. Signatures travel as lowercase or uppercase hex.
#[derive(Debug)]
pub struct Sha512;

impl SignMessage for Sha512 {
    fn sign_message(
        &self,
        secret: &[u8],
        msg: &[u8],
    ) -> CustomResult<Vec<u8>, errors::CryptoError> {
        let mut hasher = sha2::Sha512::new();
        hasher.update(msg);
        hasher.update(secret);
        Ok(hasher.finalize().to_vec())
    }
}

impl VerifySignature for Sha512 {
    fn verify_signature(
        &self,
        secret: &[u8],
        signature: &[u8],
        msg: &[u8],
    ) -> CustomResult<bool, errors::CryptoError> {
        let expected = hex::encode(self.sign_message(secret, msg)?);
        if signature.len() != expected.len() {
            return Err(error_stack::report!(errors::CryptoError::SignatureVerificationFailed))
                .attach_printable_lazy(|| {
                    format!("expected {} hex digits, got {}", expected.len(), signature.len())
                });
        }
        let provided = signature.to_ascii_lowercase();
        Ok(expected.as_bytes().ct_eq(&provided).into())
    }
}

/// Hex encoded [Sha512] signature of `msg` under `secret`.
pub fn sign_hex(secret: &[u8], msg: &[u8]) -> CustomResult<String, errors::CryptoError> {
    Sha512.sign_message(secret, msg).map(hex::encode)
}
