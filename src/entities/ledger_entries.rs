use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(8))")]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Increases what the member owes.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Decreases what the member owes.
    #[sea_orm(string_value = "credit")]
    Credit,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Debit => write!(f, "debit"),
            EntryKind::Credit => write!(f, "credit"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum LedgerSource {
    #[sea_orm(string_value = "monthly_due")]
    MonthlyDue,
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    #[sea_orm(string_value = "auction")]
    Auction,
    #[sea_orm(string_value = "advance")]
    Advance,
    #[sea_orm(string_value = "refund")]
    Refund,
}

impl std::fmt::Display for LedgerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LedgerSource::MonthlyDue => "monthly_due",
            LedgerSource::Payment => "payment",
            LedgerSource::Adjustment => "adjustment",
            LedgerSource::Auction => "auction",
            LedgerSource::Advance => "advance",
            LedgerSource::Refund => "refund",
        };
        write!(f, "{s}")
    }
}

/// Append-only account ledger. Entries are never updated or deleted;
/// corrections are new adjustment entries. Running balance for a
/// (member, group) pair = sum(debit) - sum(credit). Amounts are positive
/// i64 minor units.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub member_id: i64,
    pub group_id: i64,
    /// Null only for undirected advance credits.
    pub group_month_id: Option<i64>,
    pub kind: EntryKind,
    pub amount: i64,
    pub source: LedgerSource,
    pub reference_id: Option<i64>,
    pub reference_type: Option<String>,
    pub notes: Option<String>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
