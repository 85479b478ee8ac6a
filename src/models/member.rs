use crate::entities::member_entity as members;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMemberRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberResponse {
    pub id: i64,
    pub member_code: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<members::Model> for MemberResponse {
    fn from(model: members::Model) -> Self {
        Self {
            id: model.id,
            member_code: model.member_code,
            name: model.name,
            phone: model.phone,
            email: model.email,
            address: model.address,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}
