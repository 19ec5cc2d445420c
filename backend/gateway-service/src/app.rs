use std::sync::Arc;

use composite_service::Payments;
use connector_integration::{access_token::CredentialCache, GatewayRegistry};
use domain_types::{errors::ApiError, webhooks::CallbackOutcome};
use error_stack::ResultExt;
use external_services::metrics;
use interfaces::repository::{OrderRepository, RefundRepository, SubscriptionRepository};

use crate::{configs::Config, error::ConfigurationError, logger};

/// What the callback endpoint answers the payment system with.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CallbackResponse {
    #[serde(skip)]
    pub status: u16,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl From<CallbackOutcome> for CallbackResponse {
    fn from(outcome: CallbackOutcome) -> Self {
        Self {
            status: outcome.http_status(),
            error: outcome
                .error_response()
                .map(|error| error.get_api_error().clone()),
        }
    }
}

/// Process wide state: configuration, the shared token cache and the gateway registry bound
/// to the storage the host application provides.
#[derive(Clone)]
pub struct AppState<O, R, S> {
    pub config: Arc<Config>,
    pub payments: Payments<O, R, S>,
}

impl<O, R, S> AppState<O, R, S>
where
    O: OrderRepository,
    R: RefundRepository,
    S: SubscriptionRepository,
{
    pub fn new(config: Config, orders: O, refunds: R, subscriptions: S) -> Self {
        let credentials = Arc::new(CredentialCache::from_skew_secs(
            config.credentials.expiry_skew_secs,
        ));
        let registry =
            GatewayRegistry::with_defaults(&config.connectors, &config.proxy, credentials);
        logger::info!(
            environment = %config.common.environment,
            cardpay_base_url = %config.connectors.cardpay.base_url,
            "gateway registry ready"
        );

        Self {
            config: Arc::new(config),
            payments: Payments::new(Arc::new(registry), orders, refunds, subscriptions),
        }
    }

    pub async fn payment_callback(
        &self,
        order_id: &str,
        raw_body: &[u8],
        signature: &str,
    ) -> CallbackResponse {
        self.payments
            .process_payment_callback(order_id, raw_body, signature)
            .await
            .into()
    }

    pub async fn refund_callback(
        &self,
        refund_id: &str,
        raw_body: &[u8],
        signature: &str,
    ) -> CallbackResponse {
        self.payments
            .process_refund_callback(refund_id, raw_body, signature)
            .await
            .into()
    }
}

/// Prometheus text exposition of everything registered in this process.
pub fn metrics() -> error_stack::Result<String, ConfigurationError> {
    metrics::metrics_handler().change_context(ConfigurationError::MetricsError)
}
