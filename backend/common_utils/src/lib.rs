//! Common utilities shared by the billing gateway crates

pub mod consts;
pub mod crypto;
pub mod errors;
pub mod ext_traits;
pub mod pii;
pub mod request;
pub mod types;

pub use errors::{CustomResult, ErrorSwitch, ReportSwitchExt};

/// Date-time helpers used by the payment system wire format.
pub mod date_time {
    use time::{
        format_description::BorrowedFormatItem, macros::format_description, OffsetDateTime,
        PrimitiveDateTime, UtcOffset,
    };

    /// `YYYY-MM-DDTHH:MM:SSZ`, always UTC.
    const PROCESSOR_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

    /// Current UTC time with sub-second precision dropped.
    pub fn now() -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        now.replace_nanosecond(0).unwrap_or(now)
    }

    pub fn format_processor_date(date: OffsetDateTime) -> Result<String, time::error::Format> {
        date.to_offset(UtcOffset::UTC).format(PROCESSOR_DATE_FORMAT)
    }

    pub fn parse_processor_date(value: &str) -> Result<OffsetDateTime, time::error::Parse> {
        PrimitiveDateTime::parse(value, PROCESSOR_DATE_FORMAT).map(PrimitiveDateTime::assume_utc)
    }

}

/// Generate a random identifier for orders and processor request envelopes.
#[inline]
pub fn generate_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}
