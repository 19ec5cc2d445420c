use common_utils::{crypto, CustomResult};
use domain_types::errors::ConnectorError;
use error_stack::ResultExt;
use hyperswitch_masking::{PeekInterface, Secret};

/// Core trait for callback source verification
pub trait SourceVerification {
    /// Get the verification algorithm being used
    fn get_algorithm(&self) -> CustomResult<Box<dyn crypto::VerifySignature + Send>, ConnectorError>;

    /// Get the message/payload that should be verified
    fn get_message(&self, payload: &[u8]) -> CustomResult<Vec<u8>, ConnectorError> {
        Ok(payload.to_owned())
    }

    /// Perform the verification of a signature supplied alongside the payload
    fn verify(
        &self,
        secret: &Secret<String>,
        signature: &str,
        payload: &[u8],
    ) -> CustomResult<bool, ConnectorError> {
        let algorithm = self.get_algorithm()?;
        let message = self.get_message(payload)?;

        algorithm
            .verify_signature(secret.peek().as_bytes(), signature.trim().as_bytes(), &message)
            .change_context(ConnectorError::SignatureInvalid)
    }
}
