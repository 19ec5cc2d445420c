use common_utils::{errors::CustomResult, ErrorSwitch};
use domain_types::{
    errors::{ConnectorError, RepositoryError},
    webhooks::CallbackOutcome,
};
use error_stack::ResultExt;
use external_services::metrics;

/// Lifts a repository read into the connector error space, `NotFound` becoming `not_found`.
pub fn lookup<T>(
    result: CustomResult<T, RepositoryError>,
    not_found: ConnectorError,
) -> CustomResult<T, ConnectorError> {
    match result {
        Ok(value) => Ok(value),
        Err(error) if matches!(error.current_context(), RepositoryError::NotFound { .. }) => {
            Err(error.change_context(not_found))
        }
        Err(error) => Err(error.change_context(ConnectorError::PersistenceFailed)),
    }
}

pub fn persisted<T>(result: CustomResult<T, RepositoryError>) -> CustomResult<T, ConnectorError> {
    result.change_context(ConnectorError::PersistenceFailed)
}

/// Folds a pipeline result into the answer for the payment system and counts it.
pub fn callback_outcome(
    flow: &str,
    connector: &str,
    result: CustomResult<(), ConnectorError>,
) -> CallbackOutcome {
    let outcome = match result {
        Ok(()) => CallbackOutcome::Processed,
        Err(error) if error.current_context().is_temporary() => {
            tracing::info!(flow, connector, "callback carries a non-final status");
            CallbackOutcome::Temporary
        }
        Err(error) => {
            tracing::warn!(flow, connector, ?error, "callback rejected");
            CallbackOutcome::Rejected(error.current_context().switch())
        }
    };
    let label = match &outcome {
        CallbackOutcome::Processed => "processed",
        CallbackOutcome::Temporary => "temporary",
        CallbackOutcome::Rejected(_) => "rejected",
    };
    metrics::CALLBACKS_TOTAL
        .with_label_values(&[flow, connector, label])
        .inc();
    outcome
}
