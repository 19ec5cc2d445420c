use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use common_enums::{Currency, OrderStatus, RecurringPeriod, RefundStatus};
use common_utils::{crypto::sign_hex, errors::CustomResult, types::MinorUnit};
use composite_service::Payments;
use connector_integration::{access_token::CredentialCache, GatewayRegistry};
use domain_types::{
    errors::RepositoryError,
    order::{
        Order, OrderCustomer, OrderItem, OrderPaymentMethod, PaymentMethodParams,
        PaymentRequisites, RecurringSettings,
    },
    refund::Refund,
    subscription::Subscription,
    types::{ConnectorParams, Connectors, Proxy},
};
use error_stack::report;
use hyperswitch_masking::Secret;
use interfaces::repository::{OrderRepository, RefundRepository, SubscriptionRepository};
use time::macros::datetime;

pub const CALLBACK_SECRET: &str = "callback_secret";
pub const TOKEN_BODY: &str = r#"{"token_type":"bearer","access_token":"access_1","refresh_token":"refresh_1","expires_in":300,"refresh_expires_in":1800}"#;

#[derive(Clone, Default)]
pub struct InMemoryOrders(Arc<Mutex<HashMap<String, Order>>>);

impl InMemoryOrders {
    pub fn with(orders: Vec<Order>) -> Self {
        let store = Self::default();
        for order in orders {
            store.put(order);
        }
        store
    }

    pub fn put(&self, order: Order) {
        self.0.lock().unwrap().insert(order.id.clone(), order);
    }

    pub fn get(&self, id: &str) -> Order {
        self.0.lock().unwrap()[id].clone()
    }

    pub fn all(&self) -> Vec<Order> {
        self.0.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryOrders {
    async fn get_by_id(&self, id: &str) -> CustomResult<Order, RepositoryError> {
        self.0.lock().unwrap().get(id).cloned().ok_or_else(|| {
            report!(RepositoryError::NotFound {
                entity: "order",
                id: id.to_string()
            })
        })
    }

    async fn get_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> CustomResult<Option<Order>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .find(|order| order.transaction_id.as_deref() == Some(transaction_id))
            .cloned())
    }

    async fn insert(&self, order: &Order) -> CustomResult<(), RepositoryError> {
        self.put(order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> CustomResult<(), RepositoryError> {
        self.put(order.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryRefunds(Arc<Mutex<HashMap<String, Refund>>>);

impl InMemoryRefunds {
    pub fn with(refund: Refund) -> Self {
        let store = Self::default();
        store.0.lock().unwrap().insert(refund.id.clone(), refund);
        store
    }

    pub fn get(&self, id: &str) -> Refund {
        self.0.lock().unwrap()[id].clone()
    }
}

#[async_trait::async_trait]
impl RefundRepository for InMemoryRefunds {
    async fn get_by_id(&self, id: &str) -> CustomResult<Refund, RepositoryError> {
        self.0.lock().unwrap().get(id).cloned().ok_or_else(|| {
            report!(RepositoryError::NotFound {
                entity: "refund",
                id: id.to_string()
            })
        })
    }

    async fn update(&self, refund: &Refund) -> CustomResult<(), RepositoryError> {
        self.0
            .lock()
            .unwrap()
            .insert(refund.id.clone(), refund.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemorySubscriptions(Arc<Mutex<HashMap<String, Subscription>>>);

impl InMemorySubscriptions {
    pub fn with(subscription: Subscription) -> Self {
        let store = Self::default();
        store
            .0
            .lock()
            .unwrap()
            .insert(subscription.id.clone(), subscription);
        store
    }

    pub fn get(&self, id: &str) -> Subscription {
        self.0.lock().unwrap()[id].clone()
    }

    pub fn all(&self) -> Vec<Subscription> {
        self.0.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait::async_trait]
impl SubscriptionRepository for InMemorySubscriptions {
    async fn get_by_id(&self, id: &str) -> CustomResult<Subscription, RepositoryError> {
        self.0.lock().unwrap().get(id).cloned().ok_or_else(|| {
            report!(RepositoryError::NotFound {
                entity: "subscription",
                id: id.to_string()
            })
        })
    }

    async fn get_by_processor_subscription_id(
        &self,
        processor_subscription_id: &str,
    ) -> CustomResult<Option<Subscription>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .find(|subscription| {
                subscription.processor_subscription_id.as_deref()
                    == Some(processor_subscription_id)
            })
            .cloned())
    }

    async fn get_by_order_id(
        &self,
        order_id: &str,
    ) -> CustomResult<Option<Subscription>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .find(|subscription| subscription.order_id == order_id)
            .cloned())
    }

    async fn insert(&self, subscription: &Subscription) -> CustomResult<(), RepositoryError> {
        self.update(subscription).await
    }

    async fn update(&self, subscription: &Subscription) -> CustomResult<(), RepositoryError> {
        self.0
            .lock()
            .unwrap()
            .insert(subscription.id.clone(), subscription.clone());
        Ok(())
    }
}

/// Subscription storage that is down: every call fails.
#[derive(Clone, Default)]
pub struct UnavailableSubscriptions;

#[async_trait::async_trait]
impl SubscriptionRepository for UnavailableSubscriptions {
    async fn get_by_id(&self, _id: &str) -> CustomResult<Subscription, RepositoryError> {
        Err(report!(RepositoryError::WriteFailed("subscription")))
    }

    async fn get_by_processor_subscription_id(
        &self,
        _processor_subscription_id: &str,
    ) -> CustomResult<Option<Subscription>, RepositoryError> {
        Err(report!(RepositoryError::WriteFailed("subscription")))
    }

    async fn get_by_order_id(
        &self,
        _order_id: &str,
    ) -> CustomResult<Option<Subscription>, RepositoryError> {
        Err(report!(RepositoryError::WriteFailed("subscription")))
    }

    async fn insert(&self, _subscription: &Subscription) -> CustomResult<(), RepositoryError> {
        Err(report!(RepositoryError::WriteFailed("subscription")))
    }

    async fn update(&self, _subscription: &Subscription) -> CustomResult<(), RepositoryError> {
        Err(report!(RepositoryError::WriteFailed("subscription")))
    }
}

pub type TestPayments = Payments<InMemoryOrders, InMemoryRefunds, InMemorySubscriptions>;

pub fn payments(
    base_url: &str,
    orders: &InMemoryOrders,
    refunds: &InMemoryRefunds,
    subscriptions: &InMemorySubscriptions,
) -> TestPayments {
    payments_with(base_url, orders, refunds, subscriptions.clone())
}

pub fn payments_with<S: SubscriptionRepository>(
    base_url: &str,
    orders: &InMemoryOrders,
    refunds: &InMemoryRefunds,
    subscriptions: S,
) -> Payments<InMemoryOrders, InMemoryRefunds, S> {
    let connectors = Connectors {
        cardpay: ConnectorParams::new(base_url.to_string()),
    };
    let registry = GatewayRegistry::with_defaults(
        &connectors,
        &Proxy::default(),
        Arc::new(CredentialCache::default()),
    );
    Payments::new(
        Arc::new(registry),
        orders.clone(),
        refunds.clone(),
        subscriptions,
    )
}

pub fn order(id: &str) -> Order {
    Order {
        id: id.to_string(),
        project_id: "project_1".to_string(),
        description: "Game key".to_string(),
        customer: OrderCustomer {
            id: "customer_1".to_string(),
            email: Some("buyer@example.com".to_string()),
            ip: None,
            locale: Some("en".to_string()),
        },
        items: vec![OrderItem {
            id: "item_1".to_string(),
            name: "Game key".to_string(),
            description: "Digital copy".to_string(),
            amount: MinorUnit::new(1000),
            currency: Currency::USD,
        }],
        payment_method: OrderPaymentMethod {
            id: "pm_1".to_string(),
            name: "Bank card".to_string(),
            handler: "cardpay".to_string(),
            external_id: "BANKCARD".to_string(),
            group_alias: "bank_card".to_string(),
            refund_allowed: true,
            params: PaymentMethodParams {
                terminal_id: "12345".to_string(),
                secret: Secret::new("terminal_password".to_string()),
                secret_callback: Secret::new(CALLBACK_SECRET.to_string()),
            },
        },
        charge_amount: MinorUnit::new(1000),
        charge_currency: Currency::USD,
        private_status: OrderStatus::New,
        transaction_id: None,
        cancellation: None,
        canceled_at: None,
        refund_allowed: false,
        payment_method_order_closed_at: None,
        payment_requisites: PaymentRequisites::default(),
        recurring_settings: None,
        recurring_subscription_id: None,
        parent_order_id: None,
        is_notifications_sent: false,
        created_at: datetime!(2024-01-01 00:00:00 UTC),
        updated_at: datetime!(2024-01-01 00:00:00 UTC),
    }
}

pub fn recurring_order(id: &str) -> Order {
    Order {
        recurring_settings: Some(RecurringSettings {
            period: RecurringPeriod::Month,
            interval: 1,
        }),
        ..order(id)
    }
}

pub fn refund(order_id: &str) -> Refund {
    Refund {
        id: "refund_1".to_string(),
        order_id: order_id.to_string(),
        external_id: None,
        amount: MinorUnit::new(1000),
        currency: Currency::USD,
        reason: "Customer request".to_string(),
        status: RefundStatus::Created,
        created_at: datetime!(2024-01-02 00:00:00 UTC),
        updated_at: datetime!(2024-01-02 00:00:00 UTC),
    }
}

pub fn subscription(order_id: &str) -> Subscription {
    Subscription {
        id: "subscription_1".to_string(),
        order_id: order_id.to_string(),
        customer_id: "customer_1".to_string(),
        plan_id: "plan_5".to_string(),
        processor_subscription_id: None,
        amount: MinorUnit::new(1000),
        currency: Currency::USD,
        period: RecurringPeriod::Month,
        interval: 1,
        expire_at: None,
        is_active: true,
        last_payment_at: None,
        total_amount: MinorUnit::zero(),
    }
}

pub fn card_requisites() -> HashMap<String, String> {
    HashMap::from([
        ("pan".to_string(), "4000000000000002".to_string()),
        ("cvv".to_string(), "123".to_string()),
        ("month".to_string(), "12".to_string()),
        ("year".to_string(), "2027".to_string()),
        ("card_holder".to_string(), "JOHN DOE".to_string()),
    ])
}

pub fn payment_callback(order_id: &str, transaction_id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "callback_time": "2024-01-01T10:00:00Z",
        "payment_method": "BANKCARD",
        "merchant_order": { "id": order_id },
        "payment_data": {
            "id": transaction_id,
            "status": status,
            "amount": 10.0,
            "currency": "USD"
        },
        "card_account": { "masked_pan": "400000...0002", "holder": "JOHN DOE" }
    })
}

pub fn recurring_callback(
    order_id: &str,
    transaction_id: &str,
    status: &str,
    callback_time: &str,
) -> serde_json::Value {
    serde_json::json!({
        "callback_time": callback_time,
        "payment_method": "BANKCARD",
        "merchant_order": { "id": order_id },
        "recurring_data": {
            "id": transaction_id,
            "status": status,
            "amount": 10.0,
            "currency": "USD",
            "filing": { "id": "filing_9" },
            "subscription": { "id": "cp_sub_1" }
        }
    })
}

pub fn signed(body: &serde_json::Value) -> (Vec<u8>, String) {
    let raw = serde_json::to_vec(body).unwrap();
    let signature = sign_hex(CALLBACK_SECRET.as_bytes(), &raw).unwrap();
    (raw, signature)
}
