/// The three-letter ISO 4217 currency code (e.g., "USD", "EUR") of an order or refund amount.
#[allow(clippy::upper_case_acronyms)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::VariantNames,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Currency {
    AED,
    AUD,
    BHD,
    BRL,
    CAD,
    CHF,
    CLP,
    CNY,
    CZK,
    EUR,
    GBP,
    HKD,
    INR,
    JOD,
    JPY,
    KRW,
    KWD,
    KZT,
    MXN,
    NOK,
    OMR,
    PLN,
    RUB,
    SEK,
    SGD,
    THB,
    TND,
    TRY,
    UAH,
    #[default]
    USD,
    VND,
}

impl Currency {
    pub fn is_zero_decimal_currency(self) -> bool {
        matches!(self, Self::CLP | Self::JPY | Self::KRW | Self::VND)
    }

    pub fn is_three_decimal_currency(self) -> bool {
        matches!(
            self,
            Self::BHD | Self::JOD | Self::KWD | Self::OMR | Self::TND
        )
    }

    /// Number of minor units in one major unit of the currency.
    pub fn minor_unit_factor(self) -> i64 {
        if self.is_zero_decimal_currency() {
            1
        } else if self.is_three_decimal_currency() {
            1000
        } else {
            100
        }
    }
}

/// Lifecycle of an order as far as the payment system is concerned.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    New,
    /// Payment was sent to the payment system and it answered with a redirect.
    Created,
    /// Set before a create call; only replaced once the payment system accepted the order.
    RejectedOnCreate,
    PaymentSystemComplete,
    PaymentSystemDeclined,
    PaymentSystemCanceled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::PaymentSystemComplete | Self::PaymentSystemDeclined | Self::PaymentSystemCanceled
        )
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    #[default]
    Created,
    Rejected,
    InProgress,
    Completed,
    Declined,
    Canceled,
}

impl RefundStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Declined | Self::Canceled)
    }
}

/// Family of payment instruments, decides which account block goes on the wire.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodFamily {
    BankCard,
    EWallet,
    Crypto,
}

impl PaymentMethodFamily {
    /// Resolves the family from the payment method group alias configured for a project.
    pub fn from_group_alias(group_alias: &str) -> Option<Self> {
        match group_alias.to_ascii_lowercase().as_str() {
            "bank_card" | "bankcard" => Some(Self::BankCard),
            "qiwi" | "webmoney" | "neteller" | "alipay" | "yandex" => Some(Self::EWallet),
            "bitcoin" | "crypto" => Some(Self::Crypto),
            _ => None,
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecurringPeriod {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_currency_minor_unit_factor() {
        assert_eq!(Currency::USD.minor_unit_factor(), 100);
        assert_eq!(Currency::JPY.minor_unit_factor(), 1);
        assert_eq!(Currency::KWD.minor_unit_factor(), 1000);
    }

    #[test]
    fn test_order_status_wire_names() {
        assert_eq!(OrderStatus::Created.to_string(), "created");
        assert_eq!(
            OrderStatus::PaymentSystemComplete.to_string(),
            "payment_system_complete"
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::RejectedOnCreate).unwrap(),
            "\"rejected_on_create\""
        );
    }

    #[test]
    fn test_payment_method_family_from_group_alias() {
        assert_eq!(
            PaymentMethodFamily::from_group_alias("BANK_CARD"),
            Some(PaymentMethodFamily::BankCard)
        );
        assert_eq!(
            PaymentMethodFamily::from_group_alias("qiwi"),
            Some(PaymentMethodFamily::EWallet)
        );
        assert_eq!(
            PaymentMethodFamily::from_group_alias("bitcoin"),
            Some(PaymentMethodFamily::Crypto)
        );
        assert_eq!(PaymentMethodFamily::from_group_alias("barter"), None);
    }

    #[test]
    fn test_recurring_period_parse() {
        assert_eq!(RecurringPeriod::from_str("week").unwrap(), RecurringPeriod::Week);
    }
}
