//! In-process gateways for environments without a payment system.

use common_enums::{OrderStatus, RefundStatus};
use common_utils::{date_time, errors::CustomResult};
use domain_types::{errors::ConnectorError, order::Order, refund::Refund};
use error_stack::report;
use interfaces::connector_types::{PaymentGateway, Requisites};

pub const MOCK_REDIRECT_URL: &str = "https://mock.gateway.local/redirect";
pub const MOCK_PLAN_ID: &str = "mock_plan";
pub const MOCK_TRANSACTION_ID: &str = "mock_transaction";

/// Accepts everything and completes every order on the first callback.
#[derive(Debug, Default)]
pub struct PaymentGatewayMockOk;

#[async_trait::async_trait]
impl PaymentGateway for PaymentGatewayMockOk {
    async fn create_payment(
        &self,
        order: &mut Order,
        _success_url: &str,
        _fail_url: &str,
        _requisites: &Requisites,
    ) -> CustomResult<String, ConnectorError> {
        order.private_status = OrderStatus::Created;
        Ok(MOCK_REDIRECT_URL.to_string())
    }

    fn verify_callback_source(
        &self,
        _order: &Order,
        _raw_body: &[u8],
        _signature: &str,
    ) -> CustomResult<(), ConnectorError> {
        Ok(())
    }

    fn process_payment(
        &self,
        order: &mut Order,
        _raw_body: &[u8],
        _signature: &str,
    ) -> CustomResult<(), ConnectorError> {
        order.private_status = OrderStatus::PaymentSystemComplete;
        order.transaction_id = Some(MOCK_TRANSACTION_ID.to_string());
        order.refund_allowed = order.payment_method.refund_allowed;
        order.updated_at = date_time::now();
        Ok(())
    }

    async fn create_refund(
        &self,
        _order: &Order,
        refund: &mut Refund,
    ) -> CustomResult<(), ConnectorError> {
        refund.status = RefundStatus::InProgress;
        refund.external_id = Some(format!("mock_{}", refund.id));
        Ok(())
    }

    fn process_refund(
        &self,
        _order: &Order,
        refund: &mut Refund,
        _raw_body: &[u8],
        _signature: &str,
    ) -> CustomResult<(), ConnectorError> {
        refund.status = RefundStatus::Completed;
        refund.updated_at = date_time::now();
        Ok(())
    }

    async fn create_recurring_subscription(
        &self,
        order: &mut Order,
        _success_url: &str,
        _fail_url: &str,
        _requisites: &Requisites,
    ) -> CustomResult<(String, String), ConnectorError> {
        order.private_status = OrderStatus::Created;
        Ok((MOCK_REDIRECT_URL.to_string(), MOCK_PLAN_ID.to_string()))
    }

    async fn delete_recurring_subscription(
        &self,
        _order: &Order,
        _subscription_id: &str,
    ) -> CustomResult<(), ConnectorError> {
        Ok(())
    }

    fn is_recurring_callback(&self, _payload: &[u8]) -> bool {
        false
    }

    fn get_recurring_id(&self, _payload: &[u8]) -> Option<String> {
        None
    }

    fn get_transaction_id(&self, _payload: &[u8]) -> Option<String> {
        Some(MOCK_TRANSACTION_ID.to_string())
    }
}

/// Fails every operation as if the payment system were unreachable.
#[derive(Debug, Default)]
pub struct PaymentGatewayMockError;

#[async_trait::async_trait]
impl PaymentGateway for PaymentGatewayMockError {
    async fn create_payment(
        &self,
        _order: &mut Order,
        _success_url: &str,
        _fail_url: &str,
        _requisites: &Requisites,
    ) -> CustomResult<String, ConnectorError> {
        Err(report!(ConnectorError::TransportError))
    }

    fn verify_callback_source(
        &self,
        _order: &Order,
        _raw_body: &[u8],
        _signature: &str,
    ) -> CustomResult<(), ConnectorError> {
        Ok(())
    }

    fn process_payment(
        &self,
        _order: &mut Order,
        _raw_body: &[u8],
        _signature: &str,
    ) -> CustomResult<(), ConnectorError> {
        Err(report!(ConnectorError::TransportError))
    }

    async fn create_refund(
        &self,
        _order: &Order,
        _refund: &mut Refund,
    ) -> CustomResult<(), ConnectorError> {
        Err(report!(ConnectorError::TransportError))
    }

    fn process_refund(
        &self,
        _order: &Order,
        _refund: &mut Refund,
        _raw_body: &[u8],
        _signature: &str,
    ) -> CustomResult<(), ConnectorError> {
        Err(report!(ConnectorError::TransportError))
    }

    async fn create_recurring_subscription(
        &self,
        _order: &mut Order,
        _success_url: &str,
        _fail_url: &str,
        _requisites: &Requisites,
    ) -> CustomResult<(String, String), ConnectorError> {
        Err(report!(ConnectorError::TransportError))
    }

    async fn delete_recurring_subscription(
        &self,
        _order: &Order,
        _subscription_id: &str,
    ) -> CustomResult<(), ConnectorError> {
        Err(report!(ConnectorError::TransportError))
    }

    fn is_recurring_callback(&self, _payload: &[u8]) -> bool {
        false
    }

    fn get_recurring_id(&self, _payload: &[u8]) -> Option<String> {
        None
    }

    fn get_transaction_id(&self, _payload: &[u8]) -> Option<String> {
        None
    }
}
