use common_enums::{Currency, OrderStatus, PaymentMethodFamily, RecurringPeriod, RefundStatus};
use common_utils::{
    consts::{ITEM_DESCRIPTION_MAX_LENGTH, ITEM_NAME_MAX_LENGTH},
    date_time,
    errors::CustomResult,
    generate_uuid,
    types::{AmountConvertor, FloatMajorUnit, FloatMajorUnitForConnector},
};
use domain_types::{
    errors::{ConnectorError, ValidationField},
    order::{Order, OrderCancellation, OrderCustomer, PaymentRequisites},
    refund::Refund,
};
use error_stack::{report, ResultExt};
use hyperswitch_masking::Secret;
use interfaces::connector_types::Requisites;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Keys of the payer requisites map.
pub mod requisite_keys {
    pub const PAN: &str = "pan";
    pub const CVV: &str = "cvv";
    pub const MONTH: &str = "month";
    pub const YEAR: &str = "year";
    pub const CARD_HOLDER: &str = "card_holder";
    pub const EWALLET: &str = "ewallet";
    pub const ADDRESS: &str = "address";
    pub const STORE_DATA: &str = "store_data";
    pub const RECURRING_ID: &str = "recurring_id";
}

const SUBSCRIPTION_OPERATION_CHANGE_STATUS: &str = "CHANGE_STATUS";
const SUBSCRIPTION_STATUS_CANCELLED: &str = "CANCELLED";
const PLAN_STATUS_ACTIVE: &str = "ACTIVE";

fn requisite<'a>(requisites: &'a Requisites, key: &str) -> Option<&'a str> {
    requisites
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn required_requisite<'a>(
    requisites: &'a Requisites,
    key: &'static str,
) -> Result<&'a str, error_stack::Report<ConnectorError>> {
    requisite(requisites, key)
        .ok_or_else(|| report!(ConnectorError::MissingRequiredField { field_name: key }))
}

fn is_flag_set(requisites: &Requisites, key: &str) -> bool {
    matches!(requisite(requisites, key), Some("1") | Some("true"))
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

fn to_major_unit(
    amount: common_utils::types::MinorUnit,
    currency: Currency,
) -> Result<FloatMajorUnit, error_stack::Report<ConnectorError>> {
    FloatMajorUnitForConnector
        .convert(amount, currency)
        .change_context(ConnectorError::RequestEncodingFailed)
}

/// `MM/YYYY`; two digit years are taken as 20YY.
fn card_expiration(
    month: &str,
    year: &str,
) -> Result<String, error_stack::Report<ConnectorError>> {
    let month = month
        .parse::<u8>()
        .ok()
        .filter(|month| (1..=12).contains(month))
        .ok_or_else(|| {
            report!(ConnectorError::MissingRequiredField {
                field_name: requisite_keys::MONTH
            })
        })?;
    let year = match year.len() {
        2 => format!("20{year}"),
        _ => year.to_string(),
    };
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(report!(ConnectorError::MissingRequiredField {
            field_name: requisite_keys::YEAR
        }));
    }
    Ok(format!("{month:02}/{year}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurringReference {
    Plan(String),
    Filing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringInitiator {
    /// Customer initiated
    Cit,
    /// Merchant initiated
    Mit,
}

/// What is charged, resolved from the payer requisites and the payment method family.
#[derive(Debug, Clone)]
pub enum GatewayOrderRequest {
    BankCard {
        pan: Secret<String>,
        holder: Secret<String>,
        cvv: Secret<String>,
        expiry: String,
    },
    EWallet {
        account_id: String,
    },
    Crypto {
        rollback_address: String,
    },
    Recurring {
        reference: RecurringReference,
        initiator: RecurringInitiator,
    },
}

impl GatewayOrderRequest {
    pub fn from_requisites(
        order: &Order,
        requisites: &Requisites,
    ) -> Result<Self, error_stack::Report<ConnectorError>> {
        if let Some(filing_id) = requisite(requisites, requisite_keys::RECURRING_ID) {
            return Ok(Self::Recurring {
                reference: RecurringReference::Filing(filing_id.to_string()),
                initiator: RecurringInitiator::Mit,
            });
        }

        let family = PaymentMethodFamily::from_group_alias(&order.payment_method.group_alias)
            .ok_or(ConnectorError::UnknownPaymentMethod)
            .attach_printable_lazy(|| {
                format!("group alias `{}`", order.payment_method.group_alias)
            })?;

        match family {
            PaymentMethodFamily::BankCard => Ok(Self::BankCard {
                pan: Secret::new(
                    required_requisite(requisites, requisite_keys::PAN)?
                        .chars()
                        .filter(|c| !c.is_whitespace())
                        .collect(),
                ),
                holder: Secret::new(
                    required_requisite(requisites, requisite_keys::CARD_HOLDER)?.to_string(),
                ),
                cvv: Secret::new(required_requisite(requisites, requisite_keys::CVV)?.to_string()),
                expiry: card_expiration(
                    required_requisite(requisites, requisite_keys::MONTH)?,
                    required_requisite(requisites, requisite_keys::YEAR)?,
                )?,
            }),
            PaymentMethodFamily::EWallet => Ok(Self::EWallet {
                account_id: required_requisite(requisites, requisite_keys::EWALLET)?.to_string(),
            }),
            PaymentMethodFamily::Crypto => Ok(Self::Crypto {
                rollback_address: required_requisite(requisites, requisite_keys::ADDRESS)?
                    .to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CardpayRequestEnvelope {
    pub id: String,
    pub time: String,
}

impl CardpayRequestEnvelope {
    pub fn new() -> Result<Self, error_stack::Report<ConnectorError>> {
        Ok(Self {
            id: generate_uuid(),
            time: date_time::format_processor_date(date_time::now())
                .change_context(ConnectorError::RequestEncodingFailed)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardpayReference {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardpayItem {
    pub name: String,
    pub description: String,
    pub count: u32,
    pub price: FloatMajorUnit,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardpayMerchantOrder {
    pub id: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<CardpayItem>,
}

impl TryFrom<&Order> for CardpayMerchantOrder {
    type Error = error_stack::Report<ConnectorError>;
    fn try_from(order: &Order) -> Result<Self, Self::Error> {
        let items = order
            .items
            .iter()
            .map(|item| {
                Ok(CardpayItem {
                    name: truncate_chars(&item.name, ITEM_NAME_MAX_LENGTH),
                    description: truncate_chars(&item.description, ITEM_DESCRIPTION_MAX_LENGTH),
                    count: 1,
                    price: to_major_unit(item.amount, item.currency)?,
                })
            })
            .collect::<Result<Vec<_>, Self::Error>>()?;
        Ok(Self {
            id: order.id.clone(),
            description: order.description.clone(),
            items,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CardpayPaymentData {
    pub currency: Currency,
    pub amount: FloatMajorUnit,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardpayRecurringData {
    pub currency: Currency,
    pub amount: FloatMajorUnit,
    pub initiator: RecurringInitiator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<CardpayReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filing: Option<CardpayReference>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardpayCard {
    pub pan: Secret<String>,
    pub holder: Secret<String>,
    pub security_code: Secret<String>,
    pub expiration: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardpayCardAccount {
    pub card: CardpayCard,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardpayEWalletAccount {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardpayCryptoAccount {
    pub rollback_address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardpayCustomer {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl From<&OrderCustomer> for CardpayCustomer {
    fn from(customer: &OrderCustomer) -> Self {
        Self {
            id: customer.id.clone(),
            email: customer.email.clone(),
            ip: customer.ip.clone(),
            locale: customer.locale.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CardpayReturnUrls {
    pub success_url: String,
    pub decline_url: String,
    pub cancel_url: String,
}

/// Payment, filing or subscription order as posted to the payment system.
///
/// Exactly one of `payment_data` and `recurring_data` is set.
#[derive(Debug, Clone, Serialize)]
pub struct CardpayOrderRequest {
    pub request: CardpayRequestEnvelope,
    pub merchant_order: CardpayMerchantOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_data: Option<CardpayPaymentData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_data: Option<CardpayRecurringData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_account: Option<CardpayCardAccount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ewallet_account: Option<CardpayEWalletAccount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryptocurrency_account: Option<CardpayCryptoAccount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CardpayCustomer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_urls: Option<CardpayReturnUrls>,
}

pub struct CardpayRouterData<'a> {
    pub order: &'a Order,
    pub success_url: &'a str,
    pub fail_url: &'a str,
    pub requisites: &'a Requisites,
}

impl TryFrom<CardpayRouterData<'_>> for CardpayOrderRequest {
    type Error = error_stack::Report<ConnectorError>;
    fn try_from(item: CardpayRouterData<'_>) -> Result<Self, Self::Error> {
        let order = item.order;
        let gateway_request = GatewayOrderRequest::from_requisites(order, item.requisites)?;
        let currency = order.charge_currency;
        let amount = to_major_unit(order.charge_amount, currency)?;

        let mut request = Self {
            request: CardpayRequestEnvelope::new()?,
            merchant_order: CardpayMerchantOrder::try_from(order)?,
            description: None,
            payment_method: order.payment_method.external_id.clone(),
            payment_data: None,
            recurring_data: None,
            card_account: None,
            ewallet_account: None,
            cryptocurrency_account: None,
            customer: None,
            return_urls: None,
        };

        match gateway_request {
            GatewayOrderRequest::Recurring {
                reference,
                initiator,
            } => {
                let (plan, filing) = match reference {
                    RecurringReference::Plan(id) => (Some(CardpayReference { id }), None),
                    RecurringReference::Filing(id) => (None, Some(CardpayReference { id })),
                };
                request.recurring_data = Some(CardpayRecurringData {
                    currency,
                    amount,
                    initiator,
                    plan,
                    filing,
                });
                return Ok(request);
            }
            GatewayOrderRequest::BankCard {
                pan,
                holder,
                cvv,
                expiry,
            } => {
                request.card_account = Some(CardpayCardAccount {
                    card: CardpayCard {
                        pan,
                        holder,
                        security_code: cvv,
                        expiration: expiry,
                    },
                });
            }
            GatewayOrderRequest::EWallet { account_id } => {
                request.ewallet_account = Some(CardpayEWalletAccount { id: account_id });
            }
            GatewayOrderRequest::Crypto { rollback_address } => {
                request.cryptocurrency_account = Some(CardpayCryptoAccount { rollback_address });
            }
        }

        request.description = Some(order.description.clone());
        request.customer = Some(CardpayCustomer::from(&order.customer));
        request.return_urls = Some(CardpayReturnUrls {
            success_url: item.success_url.to_string(),
            decline_url: item.fail_url.to_string(),
            cancel_url: item.fail_url.to_string(),
        });
        if is_flag_set(item.requisites, requisite_keys::STORE_DATA) {
            request.recurring_data = Some(CardpayRecurringData {
                currency,
                amount,
                initiator: RecurringInitiator::Cit,
                plan: None,
                filing: None,
            });
        } else {
            request.payment_data = Some(CardpayPaymentData { currency, amount });
        }
        Ok(request)
    }
}

impl CardpayOrderRequest {
    pub fn endpoint(&self) -> &'static str {
        if self.recurring_data.is_some() {
            "/api/recurring"
        } else {
            "/api/payments"
        }
    }

    /// Turns the order into a subscription on `plan_id`.
    pub fn attach_plan(&mut self, plan_id: String) -> Result<(), error_stack::Report<ConnectorError>> {
        let plan = Some(CardpayReference { id: plan_id });
        match (self.recurring_data.as_mut(), self.payment_data.take()) {
            (Some(recurring), _) => recurring.plan = plan,
            (None, Some(payment)) => {
                self.recurring_data = Some(CardpayRecurringData {
                    currency: payment.currency,
                    amount: payment.amount,
                    initiator: RecurringInitiator::Cit,
                    plan,
                    filing: None,
                })
            }
            (None, None) => return Err(report!(ConnectorError::RequestEncodingFailed)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardpayRedirectResponse {
    pub redirect_url: Option<String>,
}

// REFUND :
#[derive(Debug, Clone, Serialize)]
pub struct CardpayRefundRequest {
    pub request: CardpayRequestEnvelope,
    pub merchant_order: CardpayRefundMerchantOrder,
    pub payment_data: CardpayReference,
    pub refund_data: CardpayPaymentData,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardpayRefundMerchantOrder {
    pub id: String,
    pub description: String,
}

impl TryFrom<(&Order, &Refund)> for CardpayRefundRequest {
    type Error = error_stack::Report<ConnectorError>;
    fn try_from((order, refund): (&Order, &Refund)) -> Result<Self, Self::Error> {
        let transaction_id = order
            .transaction_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or(ConnectorError::MissingRequiredField {
                field_name: "transaction_id",
            })?;
        Ok(Self {
            request: CardpayRequestEnvelope::new()?,
            merchant_order: CardpayRefundMerchantOrder {
                id: refund.id.clone(),
                description: refund.reason.clone(),
            },
            payment_data: CardpayReference { id: transaction_id },
            refund_data: CardpayPaymentData {
                currency: refund.currency,
                amount: to_major_unit(refund.amount, refund.currency)?,
            },
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardpayRefundResponse {
    pub refund_data: CardpayRefundResponseData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardpayRefundResponseData {
    pub id: String,
    pub status: String,
}

// RECURRING PLAN :
#[derive(Debug, Clone, Serialize)]
pub struct CardpayPlanRequest {
    pub request: CardpayRequestEnvelope,
    pub plan_data: CardpayPlanData,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardpayPlanData {
    pub amount: FloatMajorUnit,
    pub currency: Currency,
    pub interval: u32,
    pub name: String,
    pub period: RecurringPeriod,
}

impl TryFrom<&Order> for CardpayPlanRequest {
    type Error = error_stack::Report<ConnectorError>;
    fn try_from(order: &Order) -> Result<Self, Self::Error> {
        let settings = order
            .recurring_settings
            .ok_or(ConnectorError::MissingRequiredField {
                field_name: "recurring_settings",
            })?;
        Ok(Self {
            request: CardpayRequestEnvelope::new()?,
            plan_data: CardpayPlanData {
                amount: to_major_unit(order.charge_amount, order.charge_currency)?,
                currency: order.charge_currency,
                interval: settings.interval.max(1),
                name: truncate_chars(&order.description, ITEM_NAME_MAX_LENGTH),
                period: settings.period,
            },
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardpayPlanResponse {
    pub plan_data: CardpayPlanResponseData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardpayPlanResponseData {
    pub id: String,
    pub status: String,
}

impl CardpayPlanResponseData {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case(PLAN_STATUS_ACTIVE)
    }
}

// SUBSCRIPTION :
#[derive(Debug, Clone, Serialize)]
pub struct CardpaySubscriptionStatusRequest {
    pub request: CardpayRequestEnvelope,
    pub operation: &'static str,
    pub subscription_data: CardpaySubscriptionStatusData,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardpaySubscriptionStatusData {
    pub status_to: &'static str,
}

impl CardpaySubscriptionStatusRequest {
    pub fn cancel() -> Result<Self, error_stack::Report<ConnectorError>> {
        Ok(Self {
            request: CardpayRequestEnvelope::new()?,
            operation: SUBSCRIPTION_OPERATION_CHANGE_STATUS,
            subscription_data: CardpaySubscriptionStatusData {
                status_to: SUBSCRIPTION_STATUS_CANCELLED,
            },
        })
    }
}

// CALLBACKS :
#[derive(Debug, Clone, Deserialize)]
pub struct CardpayCallbackMerchantOrder {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardpayCallbackTransaction {
    pub id: String,
    pub status: String,
    pub amount: FloatMajorUnit,
    pub currency: String,
    pub decline_reason: Option<String>,
    pub decline_code: Option<String>,
    pub filing: Option<CardpayReference>,
    pub subscription: Option<CardpayReference>,
}

impl CardpayCallbackTransaction {
    /// A decline code or reason becomes a cancellation record; neither means no record.
    pub fn cancellation(&self) -> Option<OrderCancellation> {
        let code = self.decline_code.clone().filter(|code| !code.is_empty());
        let reason = self.decline_reason.clone().filter(|reason| !reason.is_empty());
        if code.is_none() && reason.is_none() {
            return None;
        }
        Some(OrderCancellation { code, reason })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardpayCallbackCardAccount {
    pub masked_pan: Option<String>,
    pub holder: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardpayCallbackEWalletAccount {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardpayCallbackCryptoAccount {
    pub crypto_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardpayPaymentCallback {
    pub callback_time: String,
    pub payment_method: String,
    pub merchant_order: CardpayCallbackMerchantOrder,
    pub payment_data: Option<CardpayCallbackTransaction>,
    pub recurring_data: Option<CardpayCallbackTransaction>,
    pub card_account: Option<CardpayCallbackCardAccount>,
    pub ewallet_account: Option<CardpayCallbackEWalletAccount>,
    pub cryptocurrency_account: Option<CardpayCallbackCryptoAccount>,
}

impl CardpayPaymentCallback {
    pub fn transaction(&self) -> Option<&CardpayCallbackTransaction> {
        self.payment_data.as_ref().or(self.recurring_data.as_ref())
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring_data.is_some()
    }

    /// Subscription id when the charge belongs to one, the filing id otherwise.
    pub fn recurring_id(&self) -> Option<String> {
        let recurring = self.recurring_data.as_ref()?;
        recurring
            .subscription
            .as_ref()
            .or(recurring.filing.as_ref())
            .map(|reference| reference.id.clone())
    }

    pub fn payment_requisites(&self) -> PaymentRequisites {
        PaymentRequisites {
            masked_pan: self
                .card_account
                .as_ref()
                .and_then(|account| account.masked_pan.clone()),
            card_holder: self
                .card_account
                .as_ref()
                .and_then(|account| account.holder.clone()),
            ewallet: self
                .ewallet_account
                .as_ref()
                .and_then(|account| account.id.clone()),
            crypto_address: self
                .cryptocurrency_account
                .as_ref()
                .and_then(|account| account.crypto_address.clone()),
            recurring_id: self
                .recurring_data
                .as_ref()
                .and_then(|recurring| recurring.filing.as_ref())
                .map(|filing| filing.id.clone()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardpayRefundCallback {
    pub callback_time: String,
    pub payment_method: String,
    pub merchant_order: CardpayCallbackMerchantOrder,
    pub payment_data: Option<CardpayReference>,
    pub refund_data: CardpayCallbackTransaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum CardpayPaymentStatus {
    New,
    InProgress,
    Authorized,
    Declined,
    Completed,
    Cancelled,
    Voided,
    Refunded,
    PartiallyRefunded,
    ChargedBack,
    ChargebackResolved,
}

impl CardpayPaymentStatus {
    /// Statuses a payment callback may carry; refund and chargeback states arrive elsewhere.
    pub fn is_payment_allowed(self) -> bool {
        matches!(
            self,
            Self::New
                | Self::InProgress
                | Self::Authorized
                | Self::Declined
                | Self::Completed
                | Self::Cancelled
                | Self::Voided
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum CardpayRefundStatus {
    New,
    Authorized,
    InProgress,
    Pending,
    Refunded,
    Completed,
    Declined,
    Cancelled,
    Voided,
}

impl CardpayRefundStatus {
    pub fn is_refund_allowed(self) -> bool {
        !matches!(self, Self::New)
    }

    /// Answers to a refund creation that mean the payment system took the refund.
    pub fn is_accepted(self) -> bool {
        matches!(
            self,
            Self::Authorized | Self::InProgress | Self::Pending | Self::Refunded | Self::Completed
        )
    }
}

pub fn parse_payment_status(
    status: &str,
) -> Result<CardpayPaymentStatus, error_stack::Report<ConnectorError>> {
    status
        .parse::<CardpayPaymentStatus>()
        .ok()
        .filter(|status| status.is_payment_allowed())
        .ok_or(ConnectorError::RequestStatusInvalid)
        .attach_printable_lazy(|| format!("payment status `{status}`"))
}

pub fn parse_refund_status(
    status: &str,
) -> Result<CardpayRefundStatus, error_stack::Report<ConnectorError>> {
    status
        .parse::<CardpayRefundStatus>()
        .ok()
        .filter(|status| status.is_refund_allowed())
        .ok_or(ConnectorError::RequestStatusInvalid)
        .attach_printable_lazy(|| format!("refund status `{status}`"))
}

/// Final order status for a payment callback; anything non-final is a [ConnectorError::TemporaryStatus].
pub fn get_order_status(
    status: CardpayPaymentStatus,
) -> CustomResult<OrderStatus, ConnectorError> {
    match status {
        CardpayPaymentStatus::Declined => Ok(OrderStatus::PaymentSystemDeclined),
        CardpayPaymentStatus::Cancelled | CardpayPaymentStatus::Voided => {
            Ok(OrderStatus::PaymentSystemCanceled)
        }
        CardpayPaymentStatus::Completed => Ok(OrderStatus::PaymentSystemComplete),
        CardpayPaymentStatus::New
        | CardpayPaymentStatus::InProgress
        | CardpayPaymentStatus::Authorized
        | CardpayPaymentStatus::Refunded
        | CardpayPaymentStatus::PartiallyRefunded
        | CardpayPaymentStatus::ChargedBack
        | CardpayPaymentStatus::ChargebackResolved => Err(report!(ConnectorError::TemporaryStatus)),
    }
}

pub fn get_refund_status(
    status: CardpayRefundStatus,
) -> CustomResult<RefundStatus, ConnectorError> {
    match status {
        CardpayRefundStatus::Declined => Ok(RefundStatus::Declined),
        CardpayRefundStatus::Cancelled | CardpayRefundStatus::Voided => Ok(RefundStatus::Canceled),
        CardpayRefundStatus::Completed | CardpayRefundStatus::Refunded => {
            Ok(RefundStatus::Completed)
        }
        CardpayRefundStatus::New
        | CardpayRefundStatus::Authorized
        | CardpayRefundStatus::InProgress
        | CardpayRefundStatus::Pending => Err(report!(ConnectorError::TemporaryStatus)),
    }
}

/// Business checks shared by payment and refund callbacks.
pub struct CallbackExpectation<'a> {
    pub payment_method: &'a str,
    pub amount: common_utils::types::MinorUnit,
    pub currency: Currency,
}

/// Checks the callback against the platform record and returns the callback time.
pub fn validate_callback(
    expected: &CallbackExpectation<'_>,
    payment_method: &str,
    transaction: &CardpayCallbackTransaction,
    callback_time: &str,
) -> Result<OffsetDateTime, error_stack::Report<ConnectorError>> {
    let mismatch = |field: ValidationField| report!(ConnectorError::ValidationError { field });

    if payment_method != expected.payment_method {
        return Err(mismatch(ValidationField::PaymentMethod)).attach_printable_lazy(|| {
            format!(
                "expected payment method `{}`, got `{payment_method}`",
                expected.payment_method
            )
        });
    }
    if !transaction
        .currency
        .eq_ignore_ascii_case(&expected.currency.to_string())
    {
        return Err(mismatch(ValidationField::Currency));
    }
    let amount = FloatMajorUnitForConnector
        .convert_back(transaction.amount, expected.currency)
        .change_context(ConnectorError::ValidationError {
            field: ValidationField::Amount,
        })?;
    if amount != expected.amount {
        return Err(mismatch(ValidationField::Amount)).attach_printable_lazy(|| {
            format!("expected amount {}, got {amount}", expected.amount)
        });
    }
    date_time::parse_processor_date(callback_time).change_context(
        ConnectorError::ValidationError {
            field: ValidationField::CallbackTime,
        },
    )
}
