use std::sync::Arc;

use common_enums::OrderStatus;
use common_utils::{date_time, errors::CustomResult, generate_uuid, types::MinorUnit};
use connector_integration::GatewayRegistry;
use domain_types::{
    errors::ConnectorError, order::Order, subscription::Subscription, webhooks::CallbackOutcome,
};
use error_stack::{report, ResultExt};
use interfaces::{
    connector_types::{PaymentGateway, Requisites},
    repository::{OrderRepository, RefundRepository, SubscriptionRepository},
};

use crate::utils::{callback_outcome, lookup, persisted};

const PAYMENT_CALLBACK_FLOW: &str = "payment_callback";
const REFUND_CALLBACK_FLOW: &str = "refund_callback";
const UNRESOLVED_CONNECTOR: &str = "unresolved";

/// Drives orders, refunds and subscriptions through the gateway their payment method names and
/// persists what the gateway changed.
#[derive(Clone)]
pub struct Payments<O, R, S> {
    registry: Arc<GatewayRegistry>,
    orders: O,
    refunds: R,
    subscriptions: S,
}

impl<O, R, S> Payments<O, R, S> {
    pub fn new(registry: Arc<GatewayRegistry>, orders: O, refunds: R, subscriptions: S) -> Self {
        Self {
            registry,
            orders,
            refunds,
            subscriptions,
        }
    }
}

impl<O, R, S> Payments<O, R, S>
where
    O: OrderRepository,
    R: RefundRepository,
    S: SubscriptionRepository,
{
    /// Creates the payment and persists the order whatever the gateway answered.
    #[tracing::instrument(skip_all, fields(order_id = %order_id))]
    pub async fn create_payment(
        &self,
        order_id: &str,
        success_url: &str,
        fail_url: &str,
        requisites: &Requisites,
    ) -> CustomResult<String, ConnectorError> {
        let mut order = lookup(
            self.orders.get_by_id(order_id).await,
            ConnectorError::OrderNotFound,
        )?;
        let gateway = self.registry.get(&order.payment_method.handler)?;
        let status_before = order.private_status;

        let result = gateway
            .create_payment(&mut order, success_url, fail_url, requisites)
            .await;
        if order.private_status != status_before {
            persisted(self.orders.update(&order).await)?;
        }
        result
    }

    /// Creates the plan and the subscription, then opens the local subscription record.
    #[tracing::instrument(skip_all, fields(order_id = %order_id))]
    pub async fn create_recurring_subscription(
        &self,
        order_id: &str,
        success_url: &str,
        fail_url: &str,
        requisites: &Requisites,
    ) -> CustomResult<String, ConnectorError> {
        let mut order = lookup(
            self.orders.get_by_id(order_id).await,
            ConnectorError::OrderNotFound,
        )?;
        let gateway = self.registry.get(&order.payment_method.handler)?;
        let status_before = order.private_status;

        let result = gateway
            .create_recurring_subscription(&mut order, success_url, fail_url, requisites)
            .await;
        if order.private_status != status_before {
            persisted(self.orders.update(&order).await)?;
        }
        let (redirect_url, plan_id) = result?;

        let subscription = opened_subscription(&order, plan_id)?;
        self.subscriptions
            .insert(&subscription)
            .await
            .change_context(ConnectorError::SubscriptionUpdateFailed)?;
        Ok(redirect_url)
    }

    #[tracing::instrument(skip_all, fields(refund_id = %refund_id))]
    pub async fn create_refund(&self, refund_id: &str) -> CustomResult<(), ConnectorError> {
        let mut refund = lookup(
            self.refunds.get_by_id(refund_id).await,
            ConnectorError::RefundNotFound,
        )?;
        let order = lookup(
            self.orders.get_by_id(&refund.order_id).await,
            ConnectorError::OrderNotFound,
        )?;
        let gateway = self.registry.get(&order.payment_method.handler)?;
        let status_before = refund.status;

        let result = gateway.create_refund(&order, &mut refund).await;
        if refund.status != status_before {
            persisted(self.refunds.update(&refund).await)?;
        }
        result
    }

    /// Verifies and applies a payment callback addressed to `order_id`.
    #[tracing::instrument(skip_all, fields(order_id = %order_id))]
    pub async fn process_payment_callback(
        &self,
        order_id: &str,
        raw_body: &[u8],
        signature: &str,
    ) -> CallbackOutcome {
        let order = match lookup(
            self.orders.get_by_id(order_id).await,
            ConnectorError::OrderNotFound,
        ) {
            Ok(order) => order,
            Err(error) => {
                return callback_outcome(PAYMENT_CALLBACK_FLOW, UNRESOLVED_CONNECTOR, Err(error))
            }
        };
        let handler = order.payment_method.handler.clone();
        let result = self
            .apply_payment_callback(order, raw_body, signature)
            .await;
        callback_outcome(PAYMENT_CALLBACK_FLOW, &handler, result)
    }

    /// Verifies and applies a refund callback addressed to `refund_id`.
    #[tracing::instrument(skip_all, fields(refund_id = %refund_id))]
    pub async fn process_refund_callback(
        &self,
        refund_id: &str,
        raw_body: &[u8],
        signature: &str,
    ) -> CallbackOutcome {
        let loaded = async {
            let refund = lookup(
                self.refunds.get_by_id(refund_id).await,
                ConnectorError::RefundNotFound,
            )?;
            let order = lookup(
                self.orders.get_by_id(&refund.order_id).await,
                ConnectorError::OrderNotFound,
            )?;
            Ok::<_, error_stack::Report<ConnectorError>>((order, refund))
        }
        .await;
        let (order, mut refund) = match loaded {
            Ok(loaded) => loaded,
            Err(error) => {
                return callback_outcome(REFUND_CALLBACK_FLOW, UNRESOLVED_CONNECTOR, Err(error))
            }
        };

        let result = async {
            let gateway = self.registry.get(&order.payment_method.handler)?;
            let status_before = refund.status;
            gateway.process_refund(&order, &mut refund, raw_body, signature)?;
            if refund.status != status_before {
                persisted(self.refunds.update(&refund).await)?;
            }
            Ok::<_, error_stack::Report<ConnectorError>>(())
        }
        .await;
        callback_outcome(REFUND_CALLBACK_FLOW, &order.payment_method.handler, result)
    }

    async fn apply_payment_callback(
        &self,
        order: Order,
        raw_body: &[u8],
        signature: &str,
    ) -> CustomResult<(), ConnectorError> {
        let gateway = self.registry.get(&order.payment_method.handler)?;
        gateway.verify_callback_source(&order, raw_body, signature)?;

        let subscription = if gateway.is_recurring_callback(raw_body) {
            self.find_subscription(gateway.as_ref(), &order, raw_body)
                .await?
        } else {
            None
        };

        let (mut target, is_renewal) = match subscription.as_ref() {
            Some(subscription) if subscription.has_recorded_payment() => {
                self.renewal_target(gateway.as_ref(), order, raw_body)
                    .await?
            }
            _ => (order, false),
        };

        let status_before = target.private_status;
        gateway.process_payment(&mut target, raw_body, signature)?;
        if target.private_status == status_before {
            return Ok(());
        }

        if is_renewal {
            tracing::info!(
                renewal_order_id = %target.id,
                parent_order_id = ?target.parent_order_id,
                "renewal order created"
            );
            persisted(self.orders.insert(&target).await)?;
        } else {
            persisted(self.orders.update(&target).await)?;
        }

        match subscription {
            Some(subscription) => {
                self.book_subscription(gateway.as_ref(), &target, subscription)
                    .await
            }
            None => Ok(()),
        }
    }

    /// Active subscription the recurring callback belongs to.
    async fn find_subscription(
        &self,
        gateway: &dyn PaymentGateway,
        order: &Order,
        raw_body: &[u8],
    ) -> CustomResult<Option<Subscription>, ConnectorError> {
        let by_processor_id = match gateway.get_recurring_id(raw_body) {
            Some(recurring_id) => persisted(
                self.subscriptions
                    .get_by_processor_subscription_id(&recurring_id)
                    .await,
            )?,
            None => None,
        };
        let subscription = match by_processor_id {
            Some(subscription) => Some(subscription),
            None => {
                let root_order_id = order.parent_order_id.as_deref().unwrap_or(&order.id);
                persisted(self.subscriptions.get_by_order_id(root_order_id).await)?
            }
        };
        Ok(subscription.filter(|subscription| subscription.is_active))
    }

    /// Order a repeated subscription charge applies to: the order already carrying the
    /// transaction, or a fresh renewal of `order`.
    async fn renewal_target(
        &self,
        gateway: &dyn PaymentGateway,
        order: Order,
        raw_body: &[u8],
    ) -> CustomResult<(Order, bool), ConnectorError> {
        let Some(transaction_id) = gateway.get_transaction_id(raw_body) else {
            return Ok((order, false));
        };
        if order.transaction_id.as_deref() == Some(transaction_id.as_str()) {
            return Ok((order, false));
        }
        match persisted(self.orders.get_by_transaction_id(&transaction_id).await)? {
            Some(existing) => Ok((existing, false)),
            None => Ok((order.renewal(date_time::now()), true)),
        }
    }

    async fn book_subscription(
        &self,
        gateway: &dyn PaymentGateway,
        order: &Order,
        mut subscription: Subscription,
    ) -> CustomResult<(), ConnectorError> {
        match order.private_status {
            OrderStatus::PaymentSystemComplete => {
                let paid_at = order
                    .payment_method_order_closed_at
                    .unwrap_or_else(date_time::now);
                subscription.record_payment(paid_at, order.charge_amount)?;
                if subscription.processor_subscription_id.is_none() {
                    subscription.processor_subscription_id =
                        order.recurring_subscription_id.clone();
                }
            }
            OrderStatus::PaymentSystemDeclined | OrderStatus::PaymentSystemCanceled => {
                let processor_subscription_id = subscription
                    .processor_subscription_id
                    .clone()
                    .or_else(|| order.recurring_subscription_id.clone());
                if let Some(processor_subscription_id) = processor_subscription_id {
                    if let Err(error) = gateway
                        .delete_recurring_subscription(order, &processor_subscription_id)
                        .await
                    {
                        tracing::warn!(
                            subscription_id = %subscription.id,
                            ?error,
                            "failed to cancel subscription on the payment system"
                        );
                    }
                }
                subscription.is_active = false;
            }
            OrderStatus::New | OrderStatus::Created | OrderStatus::RejectedOnCreate => {
                return Ok(())
            }
        }
        self.subscriptions
            .update(&subscription)
            .await
            .change_context(ConnectorError::SubscriptionUpdateFailed)
    }
}

fn opened_subscription(
    order: &Order,
    plan_id: String,
) -> CustomResult<Subscription, ConnectorError> {
    let settings = order.recurring_settings.ok_or_else(|| {
        report!(ConnectorError::MissingRequiredField {
            field_name: "recurring_settings"
        })
    })?;
    Ok(Subscription {
        id: generate_uuid(),
        order_id: order.id.clone(),
        customer_id: order.customer.id.clone(),
        plan_id,
        processor_subscription_id: None,
        amount: order.charge_amount,
        currency: order.charge_currency,
        period: settings.period,
        interval: settings.interval,
        expire_at: None,
        is_active: true,
        last_payment_at: None,
        total_amount: MinorUnit::zero(),
    })
}
