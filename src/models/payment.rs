use crate::entities::{payment_entity as payments, PaymentMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordPaymentRequest {
    pub member_id: i64,
    pub group_id: i64,
    /// Advisory only; allocation is always FIFO across all pending months.
    pub group_month_id: Option<i64>,
    /// Positive amount in minor units.
    pub amount: i64,
    pub mode: PaymentMode,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AllocationType {
    /// The allocation exactly clears the month.
    Full,
    /// The month still has pending dues after this allocation.
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AllocationLine {
    pub group_month_id: i64,
    pub month_number: i32,
    pub amount: i64,
    pub allocation_type: AllocationType,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordPaymentResponse {
    pub payment_id: i64,
    pub receipt_number: String,
    pub member_id: i64,
    pub member_name: String,
    pub group_id: i64,
    pub group_name: String,
    pub amount: i64,
    pub mode: PaymentMode,
    pub entry_ids: Vec<i64>,
    pub allocations: Vec<AllocationLine>,
    pub advance_amount: i64,
    pub is_member: bool,
    pub payment_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PreviewQuery {
    pub member_id: i64,
    pub group_id: i64,
    pub amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AllocationPreviewResponse {
    pub member_id: i64,
    pub member_name: String,
    pub group_id: i64,
    pub group_name: String,
    pub payment_amount: i64,
    pub allocations: Vec<AllocationLine>,
    pub advance_amount: i64,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentQuery {
    pub member_id: Option<i64>,
    pub group_id: Option<i64>,
    pub group_month_id: Option<i64>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResponse {
    pub id: i64,
    pub receipt_number: String,
    pub member_id: i64,
    pub member_name: Option<String>,
    pub group_id: i64,
    pub group_name: Option<String>,
    pub group_month_id: Option<i64>,
    pub amount: i64,
    pub mode: PaymentMode,
    pub notes: Option<String>,
    pub collected_by: i64,
    pub collected_by_name: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
}

impl From<payments::Model> for PaymentResponse {
    fn from(model: payments::Model) -> Self {
        Self {
            id: model.id,
            receipt_number: model.receipt_number,
            member_id: model.member_id,
            member_name: None,
            group_id: model.group_id,
            group_name: None,
            group_month_id: model.group_month_id,
            amount: model.amount,
            mode: model.mode,
            notes: model.notes,
            collected_by: model.collected_by,
            collected_by_name: None,
            payment_date: model.payment_date,
        }
    }
}
