use crate::entities::member_entity as members;
use crate::error::{AppError, AppResult};
use crate::models::{CreateMemberRequest, MemberResponse, PaginatedResponse, PaginationParams};
use crate::utils::generate_unique_member_code;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

#[derive(Clone)]
pub struct MemberService {
    pool: DatabaseConnection,
}

impl MemberService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create_member(
        &self,
        staff_id: i64,
        request: CreateMemberRequest,
    ) -> AppResult<MemberResponse> {
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError("Name must not be empty".into()));
        }
        if request.phone.trim().is_empty() {
            return Err(AppError::ValidationError("Phone must not be empty".into()));
        }

        let existing = members::Entity::find()
            .filter(members::Column::Phone.eq(request.phone.clone()))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ConflictError(format!(
                "Member with phone {} already exists",
                request.phone
            )));
        }

        let member_code = generate_unique_member_code(&self.pool).await?;

        let model = members::ActiveModel {
            member_code: Set(member_code),
            name: Set(request.name),
            phone: Set(request.phone),
            email: Set(request.email),
            address: Set(request.address),
            is_active: Set(true),
            created_by: Set(Some(staff_id)),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Created member {} ({})", model.id, model.member_code);
        Ok(MemberResponse::from(model))
    }

    pub async fn get_member(&self, member_id: i64) -> AppResult<MemberResponse> {
        let model = members::Entity::find_by_id(member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        Ok(MemberResponse::from(model))
    }

    pub async fn list_members(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<MemberResponse>> {
        let total = members::Entity::find().count(&self.pool).await? as i64;

        let rows = members::Entity::find()
            .order_by_asc(members::Column::Id)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.pool)
            .await?;

        let items = rows.into_iter().map(MemberResponse::from).collect();
        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_limit(),
            total,
        ))
    }
}
