use crate::entities::{staff_entity as staff, StaffRole};
use crate::error::{AppError, AppResult};
use crate::models::{CreateStaffRequest, StaffResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};

#[derive(Clone)]
pub struct StaffService {
    pool: DatabaseConnection,
}

impl StaffService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create_staff(&self, request: CreateStaffRequest) -> AppResult<StaffResponse> {
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError("Name must not be empty".into()));
        }
        if request.phone.trim().is_empty() {
            return Err(AppError::ValidationError("Phone must not be empty".into()));
        }

        let existing = staff::Entity::find()
            .filter(staff::Column::Phone.eq(request.phone.clone()))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ConflictError(format!(
                "Staff with phone {} already exists",
                request.phone
            )));
        }

        let model = staff::ActiveModel {
            name: Set(request.name),
            phone: Set(request.phone),
            email: Set(request.email),
            role: Set(request.role.unwrap_or(StaffRole::Staff)),
            is_active: Set(true),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(StaffResponse::from(model))
    }

    pub async fn get_staff(&self, staff_id: i64) -> AppResult<StaffResponse> {
        let model = staff::Entity::find_by_id(staff_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Staff not found".to_string()))?;
        Ok(StaffResponse::from(model))
    }
}

/// Resolve the acting staff member, rejecting unknown or deactivated ids.
pub async fn require_active_staff<C: ConnectionTrait>(
    conn: &C,
    staff_id: i64,
) -> AppResult<staff::Model> {
    let model = staff::Entity::find_by_id(staff_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Staff not found".to_string()))?;
    if !model.is_active {
        return Err(AppError::ValidationError(
            "Staff account is deactivated".to_string(),
        ));
    }
    Ok(model)
}

/// Resolve the acting staff member and require the admin role.
pub async fn require_admin<C: ConnectionTrait>(conn: &C, staff_id: i64) -> AppResult<staff::Model> {
    let model = require_active_staff(conn, staff_id).await?;
    if model.role != StaffRole::Admin {
        return Err(AppError::PermissionDenied);
    }
    Ok(model)
}
