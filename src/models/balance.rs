use crate::entities::balance_snapshot_entity as balance_snapshots;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    pub member_id: i64,
    pub group_id: i64,
    pub total_due: i64,
    pub total_paid: i64,
    pub pending: i64,
    pub advance: i64,
    pub months_due: i32,
    pub months_paid: i32,
    pub months_partial: i32,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<balance_snapshots::Model> for BalanceResponse {
    fn from(model: balance_snapshots::Model) -> Self {
        Self {
            member_id: model.member_id,
            group_id: model.group_id,
            total_due: model.total_due,
            total_paid: model.total_paid,
            pending: model.pending,
            advance: model.advance,
            months_due: model.months_due,
            months_paid: model.months_paid,
            months_partial: model.months_partial,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MonthPaymentStatus {
    NotStarted,
    Pending,
    Partial,
    Paid,
    Advance,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthTally {
    pub month_number: i32,
    pub group_month_id: Option<i64>,
    pub due: i64,
    pub paid: i64,
    pub pending: i64,
    pub status: MonthPaymentStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupBalanceSummary {
    pub group_id: i64,
    pub group_name: String,
    pub monthly_amount: i64,
    pub total_months: i32,
    pub total_due: i64,
    pub total_paid: i64,
    pub pending: i64,
    pub advance: i64,
    pub months: Vec<MonthTally>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountSummaryResponse {
    pub member_id: i64,
    pub member_name: String,
    pub member_phone: String,
    pub total_due: i64,
    pub total_paid: i64,
    pub pending: i64,
    pub advance: i64,
    pub groups: Vec<GroupBalanceSummary>,
}
