use crate::entities::{staff_entity as staff, StaffRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStaffRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<StaffRole>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StaffResponse {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: StaffRole,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<staff::Model> for StaffResponse {
    fn from(model: staff::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            email: model.email,
            role: model.role,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}
