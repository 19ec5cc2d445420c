use std::collections::HashMap;

use common_utils::CustomResult;
use domain_types::{errors::ConnectorError, order::Order, refund::Refund};

/// Payer supplied requisites keyed by name (`pan`, `cvv`, `ewallet`, `recurring_id`, ...).
pub type Requisites = HashMap<String, String>;

/// Capabilities the billing platform consumes from a payment system.
///
/// Every outbound operation mutates the passed domain objects fail-closed: the rejected state is
/// written before the call and only replaced after a fully parsed successful answer. Callers
/// persist the objects whatever the result.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates the payment on the payment system and returns the URL the payer is redirected to.
    async fn create_payment(
        &self,
        order: &mut Order,
        success_url: &str,
        fail_url: &str,
        requisites: &Requisites,
    ) -> CustomResult<String, ConnectorError>;

    /// Checks that a callback addressed to `order` was signed by the payment system, without
    /// reading or applying it.
    fn verify_callback_source(
        &self,
        order: &Order,
        raw_body: &[u8],
        signature: &str,
    ) -> CustomResult<(), ConnectorError>;

    /// Applies a payment callback to the order.
    fn process_payment(
        &self,
        order: &mut Order,
        raw_body: &[u8],
        signature: &str,
    ) -> CustomResult<(), ConnectorError>;

    async fn create_refund(
        &self,
        order: &Order,
        refund: &mut Refund,
    ) -> CustomResult<(), ConnectorError>;

    /// Applies a refund callback to the refund.
    fn process_refund(
        &self,
        order: &Order,
        refund: &mut Refund,
        raw_body: &[u8],
        signature: &str,
    ) -> CustomResult<(), ConnectorError>;

    /// Creates a plan and a subscription on it, returning `(redirect_url, plan_id)`.
    async fn create_recurring_subscription(
        &self,
        order: &mut Order,
        success_url: &str,
        fail_url: &str,
        requisites: &Requisites,
    ) -> CustomResult<(String, String), ConnectorError>;

    /// Best effort; a failure is reported but local state is never rolled back.
    async fn delete_recurring_subscription(
        &self,
        order: &Order,
        subscription_id: &str,
    ) -> CustomResult<(), ConnectorError>;

    fn is_recurring_callback(&self, payload: &[u8]) -> bool;

    fn get_recurring_id(&self, payload: &[u8]) -> Option<String>;

    fn get_transaction_id(&self, payload: &[u8]) -> Option<String>;
}
