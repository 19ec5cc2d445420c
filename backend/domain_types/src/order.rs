use common_enums::{Currency, OrderStatus, RecurringPeriod};
use common_utils::types::MinorUnit;
use hyperswitch_masking::Secret;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub project_id: String,
    pub description: String,
    pub customer: OrderCustomer,
    pub items: Vec<OrderItem>,
    pub payment_method: OrderPaymentMethod,
    pub charge_amount: MinorUnit,
    pub charge_currency: Currency,
    pub private_status: OrderStatus,
    /// Payment id assigned by the payment system, known once a callback completed the order.
    pub transaction_id: Option<String>,
    pub cancellation: Option<OrderCancellation>,
    pub canceled_at: Option<OffsetDateTime>,
    pub refund_allowed: bool,
    pub payment_method_order_closed_at: Option<OffsetDateTime>,
    pub payment_requisites: PaymentRequisites,
    pub recurring_settings: Option<RecurringSettings>,
    pub recurring_subscription_id: Option<String>,
    pub parent_order_id: Option<String>,
    pub is_notifications_sent: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderCustomer {
    pub id: String,
    pub email: Option<String>,
    pub ip: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub amount: MinorUnit,
    pub currency: Currency,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderPaymentMethod {
    pub id: String,
    pub name: String,
    /// Name the gateway registry resolves, e.g. `cardpay`.
    pub handler: String,
    /// Payment method identifier on the payment system side, echoed back in callbacks.
    pub external_id: String,
    pub group_alias: String,
    pub refund_allowed: bool,
    pub params: PaymentMethodParams,
}

/// Merchant terminal credentials for one payment method.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentMethodParams {
    pub terminal_id: String,
    pub secret: Secret<String>,
    pub secret_callback: Secret<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCancellation {
    pub code: Option<String>,
    pub reason: Option<String>,
}

/// Requisites kept on the order after completion; card numbers are stored masked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentRequisites {
    pub masked_pan: Option<String>,
    pub card_holder: Option<String>,
    pub ewallet: Option<String>,
    pub crypto_address: Option<String>,
    /// Stored card reference for merchant initiated charges.
    pub recurring_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurringSettings {
    pub period: RecurringPeriod,
    pub interval: u32,
}

impl Order {
    pub fn is_recurring(&self) -> bool {
        self.recurring_settings.is_some()
    }

    /// Renewal order for the next recurring charge.
    ///
    /// Keeps what was bought and who pays for it. Everything the payment system reported about
    /// the parent charge is left behind, and the new order points back at its parent.
    pub fn renewal(&self, now: OffsetDateTime) -> Self {
        Self {
            id: common_utils::generate_uuid(),
            private_status: OrderStatus::New,
            transaction_id: None,
            cancellation: None,
            canceled_at: None,
            refund_allowed: false,
            payment_method_order_closed_at: None,
            payment_requisites: PaymentRequisites::default(),
            parent_order_id: Some(self.id.clone()),
            is_notifications_sent: false,
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }
}
