use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Denormalized per-(member, group) balance cache. Never the source of
/// truth: always reconstructible from ledger_entries, and only ever
/// written by the balance recalculation routine.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "balance_snapshots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
