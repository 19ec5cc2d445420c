//! Persistence boundaries. Storage itself lives outside the gateway.

use common_utils::CustomResult;
use domain_types::{
    errors::RepositoryError, order::Order, refund::Refund, subscription::Subscription,
};

#[async_trait::async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get_by_id(&self, id: &str) -> CustomResult<Order, RepositoryError>;

    async fn get_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> CustomResult<Option<Order>, RepositoryError>;

    async fn insert(&self, order: &Order) -> CustomResult<(), RepositoryError>;

    async fn update(&self, order: &Order) -> CustomResult<(), RepositoryError>;
}

#[async_trait::async_trait]
pub trait RefundRepository: Send + Sync {
    async fn get_by_id(&self, id: &str) -> CustomResult<Refund, RepositoryError>;

    async fn update(&self, refund: &Refund) -> CustomResult<(), RepositoryError>;
}

#[async_trait::async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn get_by_id(&self, id: &str) -> CustomResult<Subscription, RepositoryError>;

    async fn get_by_processor_subscription_id(
        &self,
        processor_subscription_id: &str,
    ) -> CustomResult<Option<Subscription>, RepositoryError>;

    /// Subscription opened by the order, not by its renewals.
    async fn get_by_order_id(
        &self,
        order_id: &str,
    ) -> CustomResult<Option<Subscription>, RepositoryError>;

    async fn insert(&self, subscription: &Subscription) -> CustomResult<(), RepositoryError>;

    async fn update(&self, subscription: &Subscription) -> CustomResult<(), RepositoryError>;
}
