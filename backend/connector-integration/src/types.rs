use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use common_utils::errors::CustomResult;
use domain_types::{
    errors::ConnectorError,
    types::{Connectors, Proxy},
};
use error_stack::report;
use interfaces::connector_types::PaymentGateway;

use crate::{access_token::CredentialCache, connectors};

pub type BoxedGateway = Arc<dyn PaymentGateway>;

type GatewayFactory = Box<dyn Fn() -> CustomResult<BoxedGateway, ConnectorError> + Send + Sync>;

pub const CARDPAY: &str = "cardpay";
pub const MOCK_OK: &str = "mock_ok";
pub const MOCK_ERROR: &str = "mock_error";

/// Resolves a payment method handler name to its gateway.
///
/// Gateways are built on first use and the same instance is handed out afterwards.
#[derive(Default)]
pub struct GatewayRegistry {
    factories: HashMap<String, GatewayFactory>,
    instances: Mutex<HashMap<String, BoxedGateway>>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the Cardpay client and both test doubles.
    pub fn with_defaults(
        connectors: &Connectors,
        proxy: &Proxy,
        credentials: Arc<CredentialCache>,
    ) -> Self {
        let cardpay_params = connectors.cardpay.clone();
        let proxy = proxy.clone();
        Self::new()
            .register(CARDPAY, move || {
                let gateway =
                    connectors::Cardpay::new(&cardpay_params, &proxy, credentials.clone())?;
                Ok(Arc::new(gateway) as BoxedGateway)
            })
            .register(MOCK_OK, || {
                Ok(Arc::new(connectors::PaymentGatewayMockOk) as BoxedGateway)
            })
            .register(MOCK_ERROR, || {
                Ok(Arc::new(connectors::PaymentGatewayMockError) as BoxedGateway)
            })
    }

    pub fn register<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn() -> CustomResult<BoxedGateway, ConnectorError> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
        self
    }

    pub fn get(&self, name: &str) -> CustomResult<BoxedGateway, ConnectorError> {
        let mut instances = self
            .instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(gateway) = instances.get(name) {
            return Ok(gateway.clone());
        }
        let factory = self.factories.get(name).ok_or_else(|| {
            report!(ConnectorError::InvalidConnectorName)
                .attach_printable(format!("no gateway registered as `{name}`"))
        })?;
        let gateway = factory()?;
        instances.insert(name.to_string(), gateway.clone());
        tracing::info!(gateway = name, "gateway instantiated");
        Ok(gateway)
    }
}
