use crate::entities::{
    group_entity as groups, group_month_entity as group_months,
    ledger_entry_entity as ledger_entries, member_entity as members, staff_entity as staff,
    EntryKind, LedgerSource,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AdjustmentRequest, DashboardSummary, LedgerEntryResponse, LedgerQuery, PaginatedResponse,
    PaginationParams,
};
use crate::services::balance_service::recompute_balance;
use crate::services::staff_service::require_admin;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

/// Draft of a ledger entry prior to persistence. The id and timestamp are
/// assigned on append; there is deliberately no way to update or delete an
/// entry once stored.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub member_id: i64,
    pub group_id: i64,
    pub group_month_id: Option<i64>,
    pub kind: EntryKind,
    pub amount: i64,
    pub source: LedgerSource,
    pub reference_id: Option<i64>,
    pub reference_type: Option<String>,
    pub notes: Option<String>,
    pub created_by: i64,
}

/// Validate and persist a draft entry. Callers are expected to run inside a
/// transaction when appending more than one entry.
pub async fn append_entry<C: ConnectionTrait>(
    conn: &C,
    draft: EntryDraft,
) -> AppResult<ledger_entries::Model> {
    if draft.amount <= 0 {
        return Err(AppError::ValidationError(
            "Ledger amount must be positive".to_string(),
        ));
    }

    let model = ledger_entries::ActiveModel {
        member_id: Set(draft.member_id),
        group_id: Set(draft.group_id),
        group_month_id: Set(draft.group_month_id),
        kind: Set(draft.kind),
        amount: Set(draft.amount),
        source: Set(draft.source),
        reference_id: Set(draft.reference_id),
        reference_type: Set(draft.reference_type),
        notes: Set(draft.notes),
        created_by: Set(draft.created_by),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(model)
}

/// All entries for a (member, group) pair, oldest first. The ordering is
/// what every aggregation builds on.
pub async fn entries_for<C: ConnectionTrait>(
    conn: &C,
    member_id: i64,
    group_id: i64,
    month_id: Option<i64>,
) -> AppResult<Vec<ledger_entries::Model>> {
    let mut query = ledger_entries::Entity::find()
        .filter(ledger_entries::Column::MemberId.eq(member_id))
        .filter(ledger_entries::Column::GroupId.eq(group_id));
    if let Some(month_id) = month_id {
        query = query.filter(ledger_entries::Column::GroupMonthId.eq(month_id));
    }
    let rows = query
        .order_by_asc(ledger_entries::Column::CreatedAt)
        .order_by_asc(ledger_entries::Column::Id)
        .all(conn)
        .await?;
    Ok(rows)
}

#[derive(Clone)]
pub struct LedgerService {
    pool: DatabaseConnection,
}

impl LedgerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Staff-facing ledger browser: newest first, filterable, with member /
    /// group / staff names resolved for display.
    pub async fn list_entries(
        &self,
        query: &LedgerQuery,
    ) -> AppResult<PaginatedResponse<LedgerEntryResponse>> {
        let params = PaginationParams {
            page: query.page,
            page_size: query.page_size,
        };

        let mut find = ledger_entries::Entity::find();
        if let Some(member_id) = query.member_id {
            find = find.filter(ledger_entries::Column::MemberId.eq(member_id));
        }
        if let Some(group_id) = query.group_id {
            find = find.filter(ledger_entries::Column::GroupId.eq(group_id));
        }
        if let Some(kind) = query.kind {
            find = find.filter(ledger_entries::Column::Kind.eq(kind));
        }
        if let Some(source) = query.source {
            find = find.filter(ledger_entries::Column::Source.eq(source));
        }

        let total = find.clone().count(&self.pool).await? as i64;

        let rows = find
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .order_by_desc(ledger_entries::Column::Id)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.pool)
            .await?;

        let items = self.enrich_entries(rows).await?;
        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_limit(),
            total,
        ))
    }

    /// Manual correction entry; admin only. The ledger itself is immutable,
    /// so discrepancies are fixed by appending an adjustment and recomputing
    /// the snapshot, all in one transaction.
    pub async fn create_adjustment(
        &self,
        staff_id: i64,
        request: AdjustmentRequest,
    ) -> AppResult<LedgerEntryResponse> {
        let admin = require_admin(&self.pool, staff_id).await?;

        members::Entity::find_by_id(request.member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        groups::Entity::find_by_id(request.group_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        if let Some(month_id) = request.group_month_id {
            let month = group_months::Entity::find_by_id(month_id)
                .one(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound("Group month not found".to_string()))?;
            if month.group_id != request.group_id {
                return Err(AppError::ValidationError(
                    "Group month does not belong to this group".to_string(),
                ));
            }
        }

        let txn = self.pool.begin().await?;

        let entry = append_entry(
            &txn,
            EntryDraft {
                member_id: request.member_id,
                group_id: request.group_id,
                group_month_id: request.group_month_id,
                kind: request.kind,
                amount: request.amount,
                source: LedgerSource::Adjustment,
                reference_id: None,
                reference_type: None,
                notes: Some(
                    request
                        .notes
                        .unwrap_or_else(|| "Manual adjustment".to_string()),
                ),
                created_by: admin.id,
            },
        )
        .await?;

        recompute_balance(&txn, request.member_id, request.group_id).await?;
        txn.commit().await?;

        log::info!(
            "Adjustment entry {} recorded: {} of {} for member {} in group {}",
            entry.id,
            entry.kind,
            entry.amount,
            entry.member_id,
            entry.group_id
        );
        Ok(LedgerEntryResponse::from(entry))
    }

    /// Ledger-wide totals for the staff dashboard.
    pub async fn dashboard_summary(&self) -> AppResult<DashboardSummary> {
        let total_members = members::Entity::find()
            .filter(members::Column::IsActive.eq(true))
            .count(&self.pool)
            .await? as i64;
        let total_groups = groups::Entity::find()
            .filter(groups::Column::IsActive.eq(true))
            .count(&self.pool)
            .await? as i64;

        let entries = ledger_entries::Entity::find().all(&self.pool).await?;
        let mut total_due = 0i64;
        let mut total_collected = 0i64;
        // Per-pair balances give the overdue figures; ledger order does not
        // matter for plain sums.
        let mut per_pair: HashMap<(i64, i64), i64> = HashMap::new();
        for entry in &entries {
            let key = (entry.member_id, entry.group_id);
            match entry.kind {
                EntryKind::Debit => {
                    total_due += entry.amount;
                    *per_pair.entry(key).or_insert(0) += entry.amount;
                }
                EntryKind::Credit => {
                    total_collected += entry.amount;
                    *per_pair.entry(key).or_insert(0) -= entry.amount;
                }
            }
        }

        let diff = total_due - total_collected;
        let overdue: Vec<i64> = per_pair.values().copied().filter(|d| *d > 0).collect();

        Ok(DashboardSummary {
            total_members,
            total_groups,
            total_due,
            total_collected,
            total_pending: diff.max(0),
            total_advance: (-diff).max(0),
            overdue_members: overdue.len() as i64,
            overdue_amount: overdue.iter().sum(),
        })
    }

    /// Per-pair entry history for a member in a group, oldest first.
    pub async fn member_entries(
        &self,
        member_id: i64,
        group_id: i64,
        month_id: Option<i64>,
    ) -> AppResult<Vec<LedgerEntryResponse>> {
        members::Entity::find_by_id(member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        groups::Entity::find_by_id(group_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        let rows = entries_for(&self.pool, member_id, group_id, month_id).await?;
        self.enrich_entries(rows).await
    }

    async fn enrich_entries(
        &self,
        rows: Vec<ledger_entries::Model>,
    ) -> AppResult<Vec<LedgerEntryResponse>> {
        let member_ids: Vec<i64> = rows.iter().map(|e| e.member_id).collect();
        let group_ids: Vec<i64> = rows.iter().map(|e| e.group_id).collect();
        let month_ids: Vec<i64> = rows.iter().filter_map(|e| e.group_month_id).collect();
        let staff_ids: Vec<i64> = rows.iter().map(|e| e.created_by).collect();

        let member_names: HashMap<i64, String> = members::Entity::find()
            .filter(members::Column::Id.is_in(member_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();
        let group_names: HashMap<i64, String> = groups::Entity::find()
            .filter(groups::Column::Id.is_in(group_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|g| (g.id, g.name))
            .collect();
        let month_numbers: HashMap<i64, i32> = group_months::Entity::find()
            .filter(group_months::Column::Id.is_in(month_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|m| (m.id, m.month_number))
            .collect();
        let staff_names: HashMap<i64, String> = staff::Entity::find()
            .filter(staff::Column::Id.is_in(staff_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        Ok(rows
            .into_iter()
            .map(|entry| {
                let mut response = LedgerEntryResponse::from(entry);
                response.member_name = member_names.get(&response.member_id).cloned();
                response.group_name = group_names.get(&response.group_id).cloned();
                response.month_number = response
                    .group_month_id
                    .and_then(|id| month_numbers.get(&id).copied());
                response.created_by_name = staff_names.get(&response.created_by).cloned();
                response
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[tokio::test]
    async fn test_append_rejects_non_positive_amount() {
        let ctx = TestContext::new(1).await;

        for amount in [0, -1] {
            let result = append_entry(
                &ctx.pool,
                EntryDraft {
                    member_id: ctx.member_ids[0],
                    group_id: ctx.group_id,
                    group_month_id: None,
                    kind: EntryKind::Debit,
                    amount,
                    source: LedgerSource::Adjustment,
                    reference_id: None,
                    reference_type: None,
                    notes: None,
                    created_by: ctx.admin_id,
                },
            )
            .await;
            assert!(matches!(result, Err(AppError::ValidationError(_))));
        }
    }

    #[tokio::test]
    async fn test_entries_for_returns_oldest_first() {
        let ctx = TestContext::new(1).await;
        let member_id = ctx.member_ids[0];

        for amount in [100, 200, 300] {
            append_entry(
                &ctx.pool,
                EntryDraft {
                    member_id,
                    group_id: ctx.group_id,
                    group_month_id: None,
                    kind: EntryKind::Debit,
                    amount,
                    source: LedgerSource::Adjustment,
                    reference_id: None,
                    reference_type: None,
                    notes: None,
                    created_by: ctx.admin_id,
                },
            )
            .await
            .unwrap();
        }

        let entries = entries_for(&ctx.pool, member_id, ctx.group_id, None)
            .await
            .unwrap();
        let amounts: Vec<i64> = entries.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![100, 200, 300]);
    }

    #[tokio::test]
    async fn test_adjustment_requires_admin() {
        let ctx = TestContext::new(1).await;
        let service = LedgerService::new(ctx.pool.clone());

        let request = AdjustmentRequest {
            member_id: ctx.member_ids[0],
            group_id: ctx.group_id,
            group_month_id: None,
            kind: EntryKind::Credit,
            amount: 1_000,
            notes: None,
        };

        let result = service.create_adjustment(ctx.staff_id, request).await;
        assert!(matches!(result, Err(AppError::PermissionDenied)));

        let request = AdjustmentRequest {
            member_id: ctx.member_ids[0],
            group_id: ctx.group_id,
            group_month_id: None,
            kind: EntryKind::Credit,
            amount: 1_000,
            notes: Some("Waived late fee".to_string()),
        };
        let entry = service
            .create_adjustment(ctx.admin_id, request)
            .await
            .unwrap();
        assert_eq!(entry.source, LedgerSource::Adjustment);
        assert_eq!(entry.amount, 1_000);
    }

    #[tokio::test]
    async fn test_list_entries_filters_by_kind() {
        let ctx = TestContext::new(2).await;
        ctx.generate_dues(1).await;

        let service = LedgerService::new(ctx.pool.clone());
        let debits = service
            .list_entries(&LedgerQuery {
                member_id: None,
                group_id: Some(ctx.group_id),
                kind: Some(EntryKind::Debit),
                source: None,
                page: None,
                page_size: None,
            })
            .await
            .unwrap();
        assert_eq!(debits.total, 2);
        assert!(debits
            .data
            .iter()
            .all(|e| e.kind == EntryKind::Debit && e.month_number == Some(1)));
    }
}
