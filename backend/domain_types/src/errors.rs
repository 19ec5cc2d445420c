use common_utils::ErrorSwitch;

/// Callback field whose value did not match what the platform holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ValidationField {
    PaymentMethod,
    Amount,
    Currency,
    CallbackTime,
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectorError {
    #[error("Failed to authenticate with the payment system")]
    AuthenticationFailed,
    #[error("Failed to reach the payment system")]
    TransportError,
    #[error("Payment system answered with unexpected status {status_code}")]
    UnexpectedHttpStatus { status_code: u16 },
    #[error("Payment system answered with a malformed body")]
    MalformedResponseBody,
    #[error("Callback signature is invalid")]
    SignatureInvalid,
    #[error("Callback carries a status that is not allowed for this flow")]
    RequestStatusInvalid,
    #[error("Callback field `{field}` does not match the platform record")]
    ValidationError { field: ValidationField },
    #[error("Payment system reported a non-final status")]
    TemporaryStatus,
    #[error("Recurring plan is not active")]
    PlanInactive,
    #[error("Unknown payment method")]
    UnknownPaymentMethod,
    #[error("Failed to update the subscription")]
    SubscriptionUpdateFailed,
    #[error("Missing required field: {field_name}")]
    MissingRequiredField { field_name: &'static str },
    #[error("Failed to obtain authentication type")]
    FailedToObtainAuthType,
    #[error("Invalid connector name")]
    InvalidConnectorName,
    #[error("Failed to encode connector request")]
    RequestEncodingFailed,
    #[error("Order not found")]
    OrderNotFound,
    #[error("Refund not found")]
    RefundNotFound,
    #[error("Failed to persist callback result")]
    PersistenceFailed,
}

impl ConnectorError {
    /// A non-final status is expected to be redelivered, callers must not treat it as a failure.
    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::TemporaryStatus)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiClientError {
    #[error("Failed to encode the request body")]
    UrlEncodingFailed,
    #[error("Header map construction failed")]
    HeaderMapConstructionFailed,
    #[error("Client construction failed")]
    ClientConstructionFailed,
    #[error("Invalid proxy configuration")]
    InvalidProxyConfiguration,
    #[error("Failed to send request: {0}")]
    RequestNotSent(String),
    #[error("Server responded with Request Timeout")]
    RequestTimeoutReceived,
    #[error("Failed to decode response")]
    ResponseDecodingFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },
    #[error("Failed to persist {0}")]
    WriteFailed(&'static str),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ApiError {
    pub sub_code: String,
    pub error_identifier: u16,
    pub error_message: String,
    pub error_object: Option<serde_json::Value>,
}

/// Structured error the billing platform hands back to whoever delivered a call or callback.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApplicationErrorResponse {
    #[error("{}", .0.error_message)]
    BadRequest(ApiError),
    #[error("{}", .0.error_message)]
    NotFound(ApiError),
    #[error("{}", .0.error_message)]
    Unprocessable(ApiError),
    #[error("{}", .0.error_message)]
    InternalServerError(ApiError),
    #[error("{}", .0.error_message)]
    BadGateway(ApiError),
    #[error("{}", .0.error_message)]
    ServiceUnavailable(ApiError),
}

impl ApplicationErrorResponse {
    pub fn get_api_error(&self) -> &ApiError {
        match self {
            Self::BadRequest(api_error)
            | Self::NotFound(api_error)
            | Self::Unprocessable(api_error)
            | Self::InternalServerError(api_error)
            | Self::BadGateway(api_error)
            | Self::ServiceUnavailable(api_error) => api_error,
        }
    }
}

fn api_error(sub_code: &str, error_identifier: u16, error: &ConnectorError) -> ApiError {
    ApiError {
        sub_code: sub_code.to_string(),
        error_identifier,
        error_message: error.to_string(),
        error_object: None,
    }
}

impl ErrorSwitch<ApplicationErrorResponse> for ConnectorError {
    fn switch(&self) -> ApplicationErrorResponse {
        match self {
            Self::AuthenticationFailed => {
                ApplicationErrorResponse::BadGateway(api_error("AUTHENTICATION_FAILED", 502, self))
            }
            Self::TransportError
            | Self::UnexpectedHttpStatus { .. }
            | Self::MalformedResponseBody => {
                ApplicationErrorResponse::BadGateway(api_error("BAD_GATEWAY", 502, self))
            }
            Self::SignatureInvalid => {
                ApplicationErrorResponse::BadRequest(api_error("SIGNATURE_INVALID", 400, self))
            }
            Self::RequestStatusInvalid => ApplicationErrorResponse::BadRequest(api_error(
                "REQUEST_STATUS_INVALID",
                400,
                self,
            )),
            Self::ValidationError { field } => ApplicationErrorResponse::BadRequest(ApiError {
                error_object: Some(serde_json::json!({ "field": field.to_string() })),
                ..api_error("VALIDATION_ERROR", 400, self)
            }),
            Self::UnknownPaymentMethod | Self::MissingRequiredField { .. } => {
                ApplicationErrorResponse::BadRequest(api_error("BAD_REQUEST", 400, self))
            }
            Self::TemporaryStatus => ApplicationErrorResponse::ServiceUnavailable(api_error(
                "TEMPORARY_STATUS",
                503,
                self,
            )),
            Self::PlanInactive => {
                ApplicationErrorResponse::Unprocessable(api_error("PLAN_INACTIVE", 422, self))
            }
            Self::InvalidConnectorName | Self::OrderNotFound | Self::RefundNotFound => {
                ApplicationErrorResponse::NotFound(api_error("NOT_FOUND", 404, self))
            }
            Self::SubscriptionUpdateFailed
            | Self::PersistenceFailed
            | Self::FailedToObtainAuthType
            | Self::RequestEncodingFailed => ApplicationErrorResponse::InternalServerError(
                api_error("INTERNAL_SERVER_ERROR", 500, self),
            ),
        }
    }
}

impl ErrorSwitch<ConnectorError> for ApiClientError {
    fn switch(&self) -> ConnectorError {
        match self {
            Self::UrlEncodingFailed => ConnectorError::RequestEncodingFailed,
            Self::ResponseDecodingFailed => ConnectorError::MalformedResponseBody,
            Self::HeaderMapConstructionFailed
            | Self::ClientConstructionFailed
            | Self::InvalidProxyConfiguration
            | Self::RequestNotSent(_)
            | Self::RequestTimeoutReceived => ConnectorError::TransportError,
        }
    }
}
