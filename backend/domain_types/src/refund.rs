use common_enums::{Currency, RefundStatus};
use common_utils::types::MinorUnit;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct Refund {
    pub id: String,
    pub order_id: String,
    /// Refund id assigned by the payment system.
    pub external_id: Option<String>,
    pub amount: MinorUnit,
    pub currency: Currency,
    pub reason: String,
    pub status: RefundStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
