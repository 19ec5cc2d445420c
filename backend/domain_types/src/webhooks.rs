use common_utils::ErrorSwitch;

use crate::errors::{ApplicationErrorResponse, ConnectorError};

/// What the platform answers to a payment system callback.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    /// The callback was applied, or was a redelivery of an already applied one.
    Processed,
    /// Non-final status. State is untouched and the payment system is asked to deliver again.
    Temporary,
    Rejected(ApplicationErrorResponse),
}

impl CallbackOutcome {
    /// Error body the callback endpoint answers with, `None` once the callback is applied.
    pub fn error_response(&self) -> Option<ApplicationErrorResponse> {
        match self {
            Self::Processed => None,
            Self::Temporary => Some(ConnectorError::TemporaryStatus.switch()),
            Self::Rejected(error) => Some(error.clone()),
        }
    }

    /// HTTP status the callback endpoint should answer with.
    pub fn http_status(&self) -> u16 {
        self.error_response()
            .map_or(200, |error| error.get_api_error().error_identifier)
    }
}
