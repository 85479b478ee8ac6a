use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

/// A chit group: fixed pool amount, fixed duration, numbered member slots.
/// `monthly_amount` is the per-member contribution (total_amount / total_months).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub total_amount: i64,
    pub monthly_amount: i64,
    pub total_months: i32,
    pub start_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_by: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
