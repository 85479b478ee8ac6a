use crate::entities::{
    group_entity as groups, group_member_entity as group_members,
    group_month_entity as group_months, member_entity as members, MonthStatus,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AddGroupMemberRequest, CreateGroupRequest, GroupMemberResponse, GroupMonthResponse,
    GroupResponse,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

#[derive(Clone)]
pub struct GroupService {
    pool: DatabaseConnection,
}

impl GroupService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create_group(
        &self,
        staff_id: i64,
        request: CreateGroupRequest,
    ) -> AppResult<GroupResponse> {
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError("Name must not be empty".into()));
        }
        if request.total_amount <= 0 {
            return Err(AppError::ValidationError(
                "Total amount must be positive".into(),
            ));
        }
        if request.total_months <= 0 {
            return Err(AppError::ValidationError(
                "Total months must be positive".into(),
            ));
        }

        let monthly_amount = match request.monthly_amount {
            Some(amount) if amount > 0 => amount,
            Some(_) => {
                return Err(AppError::ValidationError(
                    "Monthly amount must be positive".into(),
                ));
            }
            None => request.total_amount / request.total_months as i64,
        };

        let model = groups::ActiveModel {
            name: Set(request.name),
            total_amount: Set(request.total_amount),
            monthly_amount: Set(monthly_amount),
            total_months: Set(request.total_months),
            start_date: Set(request.start_date),
            is_active: Set(true),
            created_by: Set(Some(staff_id)),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Created group {} ({})", model.id, model.name);
        Ok(GroupResponse::from(model))
    }

    pub async fn get_group(&self, group_id: i64) -> AppResult<GroupResponse> {
        let model = groups::Entity::find_by_id(group_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;
        Ok(GroupResponse::from(model))
    }

    /// Assign a member to a numbered slot. Slot and member uniqueness are
    /// both enforced by database constraints; the lookup-first checks give
    /// friendlier messages for the common case.
    pub async fn add_member(
        &self,
        group_id: i64,
        request: AddGroupMemberRequest,
    ) -> AppResult<GroupMemberResponse> {
        let group = groups::Entity::find_by_id(group_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        let member = members::Entity::find_by_id(request.member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        if !member.is_active {
            return Err(AppError::ValidationError(
                "Member account is deactivated".to_string(),
            ));
        }

        if request.slot_number < 1 || request.slot_number > group.total_months {
            return Err(AppError::ValidationError(format!(
                "Slot number must be between 1 and {}",
                group.total_months
            )));
        }

        let slot_taken = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .filter(group_members::Column::SlotNumber.eq(request.slot_number))
            .one(&self.pool)
            .await?;
        if slot_taken.is_some() {
            return Err(AppError::ConflictError(format!(
                "Slot {} is already taken",
                request.slot_number
            )));
        }

        let already_member = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .filter(group_members::Column::MemberId.eq(request.member_id))
            .one(&self.pool)
            .await?;
        if already_member.is_some() {
            return Err(AppError::ConflictError(
                "Member already belongs to this group".to_string(),
            ));
        }

        let result = group_members::ActiveModel {
            group_id: Set(group_id),
            member_id: Set(request.member_id),
            slot_number: Set(request.slot_number),
            is_active: Set(true),
            joined_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await;

        let model = match result {
            Ok(model) => model,
            Err(err) if AppError::is_unique_violation(&err) => {
                return Err(AppError::ConflictError(format!(
                    "Slot {} is already taken",
                    request.slot_number
                )));
            }
            Err(err) => return Err(err.into()),
        };

        let mut response = GroupMemberResponse::from(model);
        response.member_name = Some(member.name);
        Ok(response)
    }

    pub async fn list_group_members(&self, group_id: i64) -> AppResult<Vec<GroupMemberResponse>> {
        groups::Entity::find_by_id(group_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        let rows = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .order_by_asc(group_members::Column::SlotNumber)
            .all(&self.pool)
            .await?;

        let mut responses = Vec::with_capacity(rows.len());
        for row in rows {
            let name = members::Entity::find_by_id(row.member_id)
                .one(&self.pool)
                .await?
                .map(|m| m.name);
            let mut response = GroupMemberResponse::from(row);
            response.member_name = name;
            responses.push(response);
        }
        Ok(responses)
    }

    pub async fn list_group_months(&self, group_id: i64) -> AppResult<Vec<GroupMonthResponse>> {
        groups::Entity::find_by_id(group_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        let rows = group_months::Entity::find()
            .filter(group_months::Column::GroupId.eq(group_id))
            .order_by_asc(group_months::Column::MonthNumber)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(GroupMonthResponse::from).collect())
    }
}

/// Look up the month row for (group, month_number), creating it lazily.
/// Concurrent creation is resolved by the unique (group_id, month_number)
/// index: the loser of the race re-reads the winner's row.
pub async fn get_or_create_month<C: ConnectionTrait>(
    conn: &C,
    group_id: i64,
    month_number: i32,
) -> AppResult<group_months::Model> {
    if let Some(month) = find_month(conn, group_id, month_number).await? {
        return Ok(month);
    }

    let result = group_months::ActiveModel {
        group_id: Set(group_id),
        month_number: Set(month_number),
        status: Set(MonthStatus::Pending),
        created_at: Set(Some(Utc::now())),
        ..Default::default()
    }
    .insert(conn)
    .await;

    match result {
        Ok(model) => Ok(model),
        Err(err) if AppError::is_unique_violation(&err) => {
            find_month(conn, group_id, month_number)
                .await?
                .ok_or_else(|| AppError::NotFound("Group month not found".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

async fn find_month<C: ConnectionTrait>(
    conn: &C,
    group_id: i64,
    month_number: i32,
) -> AppResult<Option<group_months::Model>> {
    let month = group_months::Entity::find()
        .filter(group_months::Column::GroupId.eq(group_id))
        .filter(group_months::Column::MonthNumber.eq(month_number))
        .one(conn)
        .await?;
    Ok(month)
}

/// Active memberships of a group ordered by slot.
pub async fn active_memberships<C: ConnectionTrait>(
    conn: &C,
    group_id: i64,
) -> AppResult<Vec<group_members::Model>> {
    let rows = group_members::Entity::find()
        .filter(group_members::Column::GroupId.eq(group_id))
        .filter(group_members::Column::IsActive.eq(true))
        .order_by_asc(group_members::Column::SlotNumber)
        .all(conn)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[tokio::test]
    async fn test_slot_can_only_be_taken_once() {
        let ctx = TestContext::new(1).await;
        let service = GroupService::new(ctx.pool.clone());
        let newcomer = ctx.create_member("Newcomer", "3000000001").await;

        let result = service
            .add_member(
                ctx.group_id,
                AddGroupMemberRequest {
                    member_id: newcomer,
                    slot_number: 1,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::ConflictError(_))));

        // A free slot works.
        let membership = service
            .add_member(
                ctx.group_id,
                AddGroupMemberRequest {
                    member_id: newcomer,
                    slot_number: 2,
                },
            )
            .await
            .unwrap();
        assert_eq!(membership.slot_number, 2);
    }

    #[tokio::test]
    async fn test_member_cannot_join_twice() {
        let ctx = TestContext::new(1).await;
        let service = GroupService::new(ctx.pool.clone());

        let result = service
            .add_member(
                ctx.group_id,
                AddGroupMemberRequest {
                    member_id: ctx.member_ids[0],
                    slot_number: 2,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::ConflictError(_))));
    }

    #[tokio::test]
    async fn test_slot_number_must_be_in_range() {
        let ctx = TestContext::new(0).await;
        let service = GroupService::new(ctx.pool.clone());
        let member = ctx.create_member("Edge", "3000000002").await;

        for slot in [0, TOTAL_MONTHS + 1] {
            let result = service
                .add_member(
                    ctx.group_id,
                    AddGroupMemberRequest {
                        member_id: member,
                        slot_number: slot,
                    },
                )
                .await;
            assert!(matches!(result, Err(AppError::ValidationError(_))));
        }
    }

    #[tokio::test]
    async fn test_get_or_create_month_is_lazy_and_stable() {
        let ctx = TestContext::new(1).await;

        let first = get_or_create_month(&ctx.pool, ctx.group_id, 4).await.unwrap();
        let second = get_or_create_month(&ctx.pool, ctx.group_id, 4).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.month_number, 4);
        assert_eq!(first.status, MonthStatus::Pending);
    }
}
