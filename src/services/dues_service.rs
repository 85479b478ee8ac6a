use crate::entities::{
    group_entity as groups, ledger_entry_entity as ledger_entries, EntryKind, LedgerSource,
};
use crate::error::{AppError, AppResult};
use crate::models::GenerateDuesResponse;
use crate::services::balance_service::recompute_balance;
use crate::services::group_service::{active_memberships, get_or_create_month};
use crate::services::ledger_service::{append_entry, EntryDraft};
use crate::services::staff_service::require_admin;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait,
};

#[derive(Clone)]
pub struct DuesService {
    pool: DatabaseConnection,
}

impl DuesService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Generate the monthly due debits for every active member of a group.
    /// Idempotent per (group, month): a second run is rejected with a
    /// conflict, both by the lookup below and by the partial unique index on
    /// monthly_due entries should two calls race past the lookup.
    pub async fn generate_dues(
        &self,
        staff_id: i64,
        group_id: i64,
        month_number: i32,
    ) -> AppResult<GenerateDuesResponse> {
        let admin = require_admin(&self.pool, staff_id).await?;

        let group = groups::Entity::find_by_id(group_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        if month_number < 1 || month_number > group.total_months {
            return Err(AppError::ValidationError(format!(
                "Month number must be between 1 and {}",
                group.total_months
            )));
        }

        let txn = self.pool.begin().await?;

        let month = get_or_create_month(&txn, group_id, month_number).await?;

        let existing_dues = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::GroupId.eq(group_id))
            .filter(ledger_entries::Column::GroupMonthId.eq(month.id))
            .filter(ledger_entries::Column::Kind.eq(EntryKind::Debit))
            .filter(ledger_entries::Column::Source.eq(LedgerSource::MonthlyDue))
            .count(&txn)
            .await?;
        if existing_dues > 0 {
            return Err(AppError::ConflictError(format!(
                "Dues already generated for month {month_number} ({existing_dues} entries)"
            )));
        }

        let memberships = active_memberships(&txn, group_id).await?;
        if memberships.is_empty() {
            return Err(AppError::ValidationError(
                "No active members in this group".to_string(),
            ));
        }

        let mut entries_created = 0usize;
        for membership in &memberships {
            let result = append_entry(
                &txn,
                EntryDraft {
                    member_id: membership.member_id,
                    group_id,
                    group_month_id: Some(month.id),
                    kind: EntryKind::Debit,
                    amount: group.monthly_amount,
                    source: LedgerSource::MonthlyDue,
                    reference_id: Some(month.id),
                    reference_type: Some("group_month".to_string()),
                    notes: Some(format!("Monthly due for month {month_number}")),
                    created_by: admin.id,
                },
            )
            .await;

            match result {
                Ok(_) => entries_created += 1,
                Err(AppError::DatabaseError(err)) if AppError::is_unique_violation(&err) => {
                    // A concurrent generation won the race; the transaction
                    // rolls back without having written anything.
                    return Err(AppError::ConflictError(format!(
                        "Dues already generated for month {month_number}"
                    )));
                }
                Err(err) => return Err(err),
            }
        }

        for membership in &memberships {
            recompute_balance(&txn, membership.member_id, group_id).await?;
        }

        txn.commit().await?;

        log::info!(
            "Generated {} monthly due entries for group {} month {}",
            entries_created,
            group_id,
            month_number
        );

        Ok(GenerateDuesResponse {
            group_id,
            group_name: group.name,
            month_number,
            group_month_id: month.id,
            members_count: memberships.len(),
            entries_created,
            total_dues_generated: group.monthly_amount * entries_created as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use sea_orm::QueryOrder;

    #[tokio::test]
    async fn test_generate_dues_creates_one_debit_per_member() {
        let ctx = TestContext::new(3).await;
        let service = DuesService::new(ctx.pool.clone());

        let result = service
            .generate_dues(ctx.admin_id, ctx.group_id, 1)
            .await
            .unwrap();
        assert_eq!(result.members_count, 3);
        assert_eq!(result.entries_created, 3);
        assert_eq!(result.total_dues_generated, 3 * MONTHLY_AMOUNT);

        let entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::GroupId.eq(ctx.group_id))
            .order_by_asc(ledger_entries::Column::Id)
            .all(&ctx.pool)
            .await
            .unwrap();
        assert_eq!(entries.len(), 3);
        for entry in &entries {
            assert_eq!(entry.kind, EntryKind::Debit);
            assert_eq!(entry.source, LedgerSource::MonthlyDue);
            assert_eq!(entry.amount, MONTHLY_AMOUNT);
            assert_eq!(entry.group_month_id, Some(result.group_month_id));
        }
    }

    #[tokio::test]
    async fn test_generate_dues_twice_is_a_conflict() {
        let ctx = TestContext::new(2).await;
        let service = DuesService::new(ctx.pool.clone());

        service
            .generate_dues(ctx.admin_id, ctx.group_id, 1)
            .await
            .unwrap();
        let second = service.generate_dues(ctx.admin_id, ctx.group_id, 1).await;
        assert!(matches!(second, Err(AppError::ConflictError(_))));

        // Exactly one debit per member survived.
        let count = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::GroupId.eq(ctx.group_id))
            .count(&ctx.pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_generate_dues_rejects_month_out_of_range() {
        let ctx = TestContext::new(1).await;
        let service = DuesService::new(ctx.pool.clone());

        let result = service
            .generate_dues(ctx.admin_id, ctx.group_id, TOTAL_MONTHS + 1)
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        let result = service.generate_dues(ctx.admin_id, ctx.group_id, 0).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_generate_dues_rejects_empty_group() {
        let ctx = TestContext::new(0).await;
        let service = DuesService::new(ctx.pool.clone());

        let result = service.generate_dues(ctx.admin_id, ctx.group_id, 1).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_generate_dues_requires_admin() {
        let ctx = TestContext::new(1).await;
        let service = DuesService::new(ctx.pool.clone());

        let result = service.generate_dues(ctx.staff_id, ctx.group_id, 1).await;
        assert!(matches!(result, Err(AppError::PermissionDenied)));
    }
}
