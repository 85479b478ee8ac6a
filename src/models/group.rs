use crate::entities::{
    group_entity as groups, group_member_entity as group_members,
    group_month_entity as group_months, MonthStatus,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    /// Total pool amount in minor units.
    pub total_amount: i64,
    pub total_months: i32,
    /// Per-member monthly contribution in minor units. Defaults to
    /// total_amount / total_months when omitted.
    pub monthly_amount: Option<i64>,
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupResponse {
    pub id: i64,
    pub name: String,
    pub total_amount: i64,
    pub monthly_amount: i64,
    pub total_months: i32,
    pub start_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<groups::Model> for GroupResponse {
    fn from(model: groups::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            total_amount: model.total_amount,
            monthly_amount: model.monthly_amount,
            total_months: model.total_months,
            start_date: model.start_date,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddGroupMemberRequest {
    pub member_id: i64,
    pub slot_number: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupMemberResponse {
    pub id: i64,
    pub group_id: i64,
    pub member_id: i64,
    pub member_name: Option<String>,
    pub slot_number: i32,
    pub is_active: bool,
    pub joined_at: Option<DateTime<Utc>>,
}

impl From<group_members::Model> for GroupMemberResponse {
    fn from(model: group_members::Model) -> Self {
        Self {
            id: model.id,
            group_id: model.group_id,
            member_id: model.member_id,
            member_name: None,
            slot_number: model.slot_number,
            is_active: model.is_active,
            joined_at: model.joined_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupMonthResponse {
    pub id: i64,
    pub group_id: i64,
    pub month_number: i32,
    pub auction_date: Option<NaiveDate>,
    pub winner_member_id: Option<i64>,
    pub payout_amount: Option<i64>,
    pub dividend_per_member: Option<i64>,
    pub status: MonthStatus,
}

impl From<group_months::Model> for GroupMonthResponse {
    fn from(model: group_months::Model) -> Self {
        Self {
            id: model.id,
            group_id: model.group_id,
            month_number: model.month_number,
            auction_date: model.auction_date,
            winner_member_id: model.winner_member_id,
            payout_amount: model.payout_amount,
            dividend_per_member: model.dividend_per_member,
            status: model.status,
        }
    }
}
