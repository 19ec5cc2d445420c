use common_enums::{Currency, RecurringPeriod};
use common_utils::{errors::CustomResult, types::MinorUnit};
use error_stack::report;
use time::{Date, Duration, Month, OffsetDateTime};

use crate::errors::ConnectorError;

#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: String,
    pub order_id: String,
    pub customer_id: String,
    pub plan_id: String,
    /// Subscription id on the payment system side, as reported in recurring callbacks.
    pub processor_subscription_id: Option<String>,
    pub amount: MinorUnit,
    pub currency: Currency,
    pub period: RecurringPeriod,
    pub interval: u32,
    pub expire_at: Option<OffsetDateTime>,
    pub is_active: bool,
    pub last_payment_at: Option<OffsetDateTime>,
    pub total_amount: MinorUnit,
}

impl Subscription {
    /// Whether a charge was already booked against this subscription.
    pub fn has_recorded_payment(&self) -> bool {
        self.last_payment_at.is_some()
    }

    /// Books a successful charge and moves the expiry one billing cycle forward.
    /// The subscription is left as it was when the new expiry or total is out of range.
    pub fn record_payment(
        &mut self,
        paid_at: OffsetDateTime,
        amount: MinorUnit,
    ) -> CustomResult<(), ConnectorError> {
        let cycle_start = match self.expire_at {
            Some(expire_at) if expire_at > paid_at => expire_at,
            _ => paid_at,
        };
        let expire_at = add_period(cycle_start, self.period, self.interval).ok_or_else(|| {
            report!(ConnectorError::SubscriptionUpdateFailed).attach_printable(format!(
                "{} x {} after {cycle_start} is out of range",
                self.interval, self.period
            ))
        })?;
        let total_amount = self
            .total_amount
            .checked_add(amount)
            .ok_or_else(|| report!(ConnectorError::SubscriptionUpdateFailed))?;

        self.last_payment_at = Some(paid_at);
        self.total_amount = total_amount;
        self.expire_at = Some(expire_at);
        Ok(())
    }
}

/// Adds `interval` periods to `date`, clamping to the last day of shorter months.
/// `None` when the result is not a representable date.
pub fn add_period(
    date: OffsetDateTime,
    period: RecurringPeriod,
    interval: u32,
) -> Option<OffsetDateTime> {
    match period {
        RecurringPeriod::Day => date.checked_add(Duration::days(i64::from(interval))),
        RecurringPeriod::Week => date.checked_add(Duration::weeks(i64::from(interval))),
        RecurringPeriod::Month => add_months(date, i64::from(interval)),
        RecurringPeriod::Year => add_months(date, i64::from(interval) * 12),
    }
}

fn add_months(date: OffsetDateTime, months: i64) -> Option<OffsetDateTime> {
    let zero_based = i64::from(u8::from(date.month())) - 1 + months;
    let year = i32::try_from(zero_based / 12)
        .ok()
        .and_then(|years| date.year().checked_add(years))?;
    let month = u8::try_from(zero_based % 12 + 1)
        .ok()
        .and_then(|month| Month::try_from(month).ok())?;
    let mut day = date.day();
    loop {
        match Date::from_calendar_date(year, month, day) {
            Ok(target) => return Some(date.replace_date(target)),
            Err(_) if day > 28 => day -= 1,
            Err(_) => return None,
        }
    }
}
