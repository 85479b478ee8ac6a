use crate::entities::{ledger_entry_entity as ledger_entries, EntryKind, LedgerSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LedgerQuery {
    pub member_id: Option<i64>,
    pub group_id: Option<i64>,
    pub kind: Option<EntryKind>,
    pub source: Option<LedgerSource>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LedgerEntryResponse {
    pub id: i64,
    pub member_id: i64,
    pub member_name: Option<String>,
    pub group_id: i64,
    pub group_name: Option<String>,
    pub group_month_id: Option<i64>,
    pub month_number: Option<i32>,
    pub kind: EntryKind,
    pub amount: i64,
    pub source: LedgerSource,
    pub reference_id: Option<i64>,
    pub reference_type: Option<String>,
    pub notes: Option<String>,
    pub created_by: i64,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ledger_entries::Model> for LedgerEntryResponse {
    fn from(model: ledger_entries::Model) -> Self {
        Self {
            id: model.id,
            member_id: model.member_id,
            member_name: None,
            group_id: model.group_id,
            group_name: None,
            group_month_id: model.group_month_id,
            month_number: None,
            kind: model.kind,
            amount: model.amount,
            source: model.source,
            reference_id: model.reference_id,
            reference_type: model.reference_type,
            notes: model.notes,
            created_by: model.created_by,
            created_by_name: None,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MemberLedgerQuery {
    pub month_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustmentRequest {
    pub member_id: i64,
    pub group_id: i64,
    pub group_month_id: Option<i64>,
    pub kind: EntryKind,
    /// Positive amount in minor units.
    pub amount: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub total_members: i64,
    pub total_groups: i64,
    pub total_due: i64,
    pub total_collected: i64,
    pub total_pending: i64,
    pub total_advance: i64,
    pub overdue_members: i64,
    pub overdue_amount: i64,
}
