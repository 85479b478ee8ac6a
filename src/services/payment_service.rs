use crate::entities::{
    group_entity as groups, group_member_entity as group_members,
    group_month_entity as group_months, ledger_entry_entity as ledger_entries,
    member_entity as members, payment_entity as payments, staff_entity as staff, EntryKind,
    LedgerSource,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AllocationLine, AllocationPreviewResponse, AllocationType, PaginatedResponse,
    PaginationParams, PaymentQuery, PaymentResponse, RecordPaymentRequest, RecordPaymentResponse,
};
use crate::services::balance_service::recompute_balance;
use crate::services::ledger_service::{append_entry, entries_for, EntryDraft};
use crate::services::staff_service::require_active_staff;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

/// One group month with outstanding dues for a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthPending {
    pub group_month_id: i64,
    pub month_number: i32,
    pub pending: i64,
}

/// Deterministic FIFO walk over the pending months. Oldest month first;
/// each step takes min(remaining, pending); whatever is left over becomes
/// the advance. The emitted amounts always sum to `amount` exactly.
pub fn plan_allocation(pending_months: &[MonthPending], amount: i64) -> (Vec<AllocationLine>, i64) {
    let mut remaining = amount;
    let mut lines = Vec::new();

    for month in pending_months {
        if remaining <= 0 {
            break;
        }
        if month.pending <= 0 {
            continue;
        }
        let allocated = remaining.min(month.pending);
        lines.push(AllocationLine {
            group_month_id: month.group_month_id,
            month_number: month.month_number,
            amount: allocated,
            allocation_type: if allocated == month.pending {
                AllocationType::Full
            } else {
                AllocationType::Partial
            },
        });
        remaining -= allocated;
    }

    (lines, remaining.max(0))
}

/// Months of a group with pending dues for a member, ordered by month
/// number. Pending = month debits - month credits; settled months are
/// skipped.
pub async fn pending_months<C: ConnectionTrait>(
    conn: &C,
    member_id: i64,
    group_id: i64,
) -> AppResult<Vec<MonthPending>> {
    let months = group_months::Entity::find()
        .filter(group_months::Column::GroupId.eq(group_id))
        .order_by_asc(group_months::Column::MonthNumber)
        .all(conn)
        .await?;

    let entries = entries_for(conn, member_id, group_id, None).await?;
    let mut per_month: HashMap<i64, i64> = HashMap::new();
    for entry in &entries {
        if let Some(month_id) = entry.group_month_id {
            let delta = match entry.kind {
                EntryKind::Debit => entry.amount,
                EntryKind::Credit => -entry.amount,
            };
            *per_month.entry(month_id).or_insert(0) += delta;
        }
    }

    Ok(months
        .into_iter()
        .filter_map(|month| {
            let pending = per_month.get(&month.id).copied().unwrap_or(0);
            (pending > 0).then_some(MonthPending {
                group_month_id: month.id,
                month_number: month.month_number,
                pending,
            })
        })
        .collect())
}

#[derive(Clone)]
pub struct PaymentService {
    pool: DatabaseConnection,
}

impl PaymentService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Record a collected payment and allocate it across pending dues.
    /// The payment row, every credit entry and the snapshot update commit
    /// in a single transaction; on any error nothing is persisted.
    pub async fn record_payment(
        &self,
        staff_id: i64,
        request: RecordPaymentRequest,
    ) -> AppResult<RecordPaymentResponse> {
        let collector = require_active_staff(&self.pool, staff_id).await?;

        if request.amount <= 0 {
            return Err(AppError::ValidationError(
                "Payment amount must be greater than zero".to_string(),
            ));
        }

        let member = members::Entity::find_by_id(request.member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        let group = groups::Entity::find_by_id(request.group_id)
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

        // Non-members can still pay (e.g. a guarantor settling dues); the
        // response flags it instead of rejecting.
        let is_member = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(request.group_id))
            .filter(group_members::Column::MemberId.eq(request.member_id))
            .filter(group_members::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?
            .is_some();

        let txn = self.pool.begin().await?;

        let payment = payments::ActiveModel {
            receipt_number: Set(Uuid::new_v4().to_string()),
            member_id: Set(request.member_id),
            group_id: Set(request.group_id),
            group_month_id: Set(request.group_month_id),
            amount: Set(request.amount),
            mode: Set(request.mode),
            notes: Set(request.notes.clone()),
            collected_by: Set(collector.id),
            payment_date: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let pending = pending_months(&txn, request.member_id, request.group_id).await?;
        let (allocations, advance_amount) = plan_allocation(&pending, request.amount);

        let mut entry_ids = Vec::with_capacity(allocations.len() + 1);
        for line in &allocations {
            let label = match line.allocation_type {
                AllocationType::Full => "full",
                AllocationType::Partial => "partial",
            };
            let entry = append_entry(
                &txn,
                EntryDraft {
                    member_id: request.member_id,
                    group_id: request.group_id,
                    group_month_id: Some(line.group_month_id),
                    kind: EntryKind::Credit,
                    amount: line.amount,
                    source: LedgerSource::Payment,
                    reference_id: Some(payment.id),
                    reference_type: Some("payment".to_string()),
                    notes: Some(format!(
                        "Payment #{} - month {} ({label})",
                        payment.id, line.month_number
                    )),
                    created_by: collector.id,
                },
            )
            .await?;
            entry_ids.push(entry.id);
        }

        if advance_amount > 0 {
            let entry = append_entry(
                &txn,
                EntryDraft {
                    member_id: request.member_id,
                    group_id: request.group_id,
                    group_month_id: None,
                    kind: EntryKind::Credit,
                    amount: advance_amount,
                    source: LedgerSource::Advance,
                    reference_id: Some(payment.id),
                    reference_type: Some("payment".to_string()),
                    notes: Some(format!("Advance payment from payment #{}", payment.id)),
                    created_by: collector.id,
                },
            )
            .await?;
            entry_ids.push(entry.id);
        }

        recompute_balance(&txn, request.member_id, request.group_id).await?;
        txn.commit().await?;

        log::info!(
            "Payment {} of {} recorded for member {} in group {} ({} allocations, {} advance)",
            payment.id,
            payment.amount,
            request.member_id,
            request.group_id,
            allocations.len(),
            advance_amount
        );

        Ok(RecordPaymentResponse {
            payment_id: payment.id,
            receipt_number: payment.receipt_number,
            member_id: member.id,
            member_name: member.name,
            group_id: group.id,
            group_name: group.name,
            amount: payment.amount,
            mode: payment.mode,
            entry_ids,
            allocations,
            advance_amount,
            is_member,
            payment_date: payment.payment_date,
        })
    }

    /// Dry-run of the FIFO allocation. Advisory only: the pending picture
    /// can change between preview and commit.
    pub async fn preview_allocation(
        &self,
        member_id: i64,
        group_id: i64,
        amount: i64,
    ) -> AppResult<AllocationPreviewResponse> {
        if amount <= 0 {
            return Err(AppError::ValidationError(
                "Payment amount must be greater than zero".to_string(),
            ));
        }

        let member = members::Entity::find_by_id(member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        let group = groups::Entity::find_by_id(group_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        let pending = pending_months(&self.pool, member_id, group_id).await?;
        let (allocations, advance_amount) = plan_allocation(&pending, amount);

        let message = if advance_amount > 0 {
            format!("{advance_amount} will be saved as advance after clearing all dues")
        } else {
            "Payment will be allocated to pending dues".to_string()
        };

        Ok(AllocationPreviewResponse {
            member_id: member.id,
            member_name: member.name,
            group_id: group.id,
            group_name: group.name,
            payment_amount: amount,
            allocations,
            advance_amount,
            message,
        })
    }

    pub async fn list_payments(
        &self,
        query: &PaymentQuery,
    ) -> AppResult<PaginatedResponse<PaymentResponse>> {
        let params = PaginationParams {
            page: query.page,
            page_size: query.page_size,
        };

        let mut find = payments::Entity::find();
        if let Some(member_id) = query.member_id {
            find = find.filter(payments::Column::MemberId.eq(member_id));
        }
        if let Some(group_id) = query.group_id {
            find = find.filter(payments::Column::GroupId.eq(group_id));
        }
        if let Some(month_id) = query.group_month_id {
            find = find.filter(payments::Column::GroupMonthId.eq(month_id));
        }

        let total = find.clone().count(&self.pool).await? as i64;
        let rows = find
            .order_by_desc(payments::Column::PaymentDate)
            .order_by_desc(payments::Column::Id)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.pool)
            .await?;

        let items = self.enrich_payments(rows).await?;
        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_limit(),
            total,
        ))
    }

    pub async fn get_payment(&self, payment_id: i64) -> AppResult<PaymentResponse> {
        let payment = payments::Entity::find_by_id(payment_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;
        let mut items = self.enrich_payments(vec![payment]).await?;
        Ok(items.remove(0))
    }

    async fn enrich_payments(
        &self,
        rows: Vec<payments::Model>,
    ) -> AppResult<Vec<PaymentResponse>> {
        let member_ids: Vec<i64> = rows.iter().map(|p| p.member_id).collect();
        let group_ids: Vec<i64> = rows.iter().map(|p| p.group_id).collect();
        let staff_ids: Vec<i64> = rows.iter().map(|p| p.collected_by).collect();

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
        let staff_names: HashMap<i64, String> = staff::Entity::find()
            .filter(staff::Column::Id.is_in(staff_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        Ok(rows
            .into_iter()
            .map(|payment| {
                let mut response = PaymentResponse::from(payment);
                response.member_name = member_names.get(&response.member_id).cloned();
                response.group_name = group_names.get(&response.group_id).cloned();
                response.collected_by_name = staff_names.get(&response.collected_by).cloned();
                response
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PaymentMode;
    use crate::test_support::*;

    fn months(pending: &[i64]) -> Vec<MonthPending> {
        pending
            .iter()
            .enumerate()
            .map(|(i, p)| MonthPending {
                group_month_id: 100 + i as i64,
                month_number: i as i32 + 1,
                pending: *p,
            })
            .collect()
    }

    #[test]
    fn test_plan_fifo_partial_tail() {
        let (lines, advance) = plan_allocation(&months(&[10_000, 10_000, 10_000]), 15_000);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].month_number, 1);
        assert_eq!(lines[0].amount, 10_000);
        assert_eq!(lines[0].allocation_type, AllocationType::Full);
        assert_eq!(lines[1].month_number, 2);
        assert_eq!(lines[1].amount, 5_000);
        assert_eq!(lines[1].allocation_type, AllocationType::Partial);
        assert_eq!(advance, 0);
    }

    #[test]
    fn test_plan_exact_clear_ends_with_no_advance() {
        let (lines, advance) = plan_allocation(&months(&[10_000, 5_000]), 15_000);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].allocation_type, AllocationType::Full);
        assert_eq!(advance, 0);
    }

    #[test]
    fn test_plan_overpayment_becomes_advance() {
        let (lines, advance) = plan_allocation(&months(&[]), 5_000);
        assert!(lines.is_empty());
        assert_eq!(advance, 5_000);
    }

    #[test]
    fn test_plan_sum_invariant() {
        // Allocations plus advance always reproduce the input exactly.
        let configs: &[&[i64]] = &[
            &[],
            &[1],
            &[10_000],
            &[10_000, 10_000, 10_000],
            &[2_500, 7_500, 499, 1],
            &[100_000, 1, 100_000],
        ];
        for pending in configs {
            for amount in [1i64, 3, 2_500, 9_999, 10_000, 10_001, 250_000] {
                let (lines, advance) = plan_allocation(&months(pending), amount);
                let allocated: i64 = lines.iter().map(|l| l.amount).sum();
                assert_eq!(
                    allocated + advance,
                    amount,
                    "sum invariant violated for pending={pending:?} amount={amount}"
                );
            }
        }
    }

    #[tokio::test]
    async fn test_record_payment_allocates_fifo_and_updates_snapshot() {
        let ctx = TestContext::new(1).await;
        let member_id = ctx.member_ids[0];
        ctx.generate_dues(1).await;
        ctx.generate_dues(2).await;
        ctx.generate_dues(3).await;

        let service = PaymentService::new(ctx.pool.clone());
        let response = service
            .record_payment(
                ctx.staff_id,
                RecordPaymentRequest {
                    member_id,
                    group_id: ctx.group_id,
                    group_month_id: None,
                    amount: MONTHLY_AMOUNT + MONTHLY_AMOUNT / 2,
                    mode: PaymentMode::Cash,
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(response.allocations.len(), 2);
        assert_eq!(response.allocations[0].month_number, 1);
        assert_eq!(response.allocations[0].amount, MONTHLY_AMOUNT);
        assert_eq!(response.allocations[0].allocation_type, AllocationType::Full);
        assert_eq!(response.allocations[1].month_number, 2);
        assert_eq!(response.allocations[1].amount, MONTHLY_AMOUNT / 2);
        assert_eq!(
            response.allocations[1].allocation_type,
            AllocationType::Partial
        );
        assert_eq!(response.advance_amount, 0);
        assert_eq!(response.entry_ids.len(), 2);
        assert!(response.is_member);

        let snapshot = recompute_balance(&ctx.pool, member_id, ctx.group_id)
            .await
            .unwrap();
        assert_eq!(snapshot.total_due, 3 * MONTHLY_AMOUNT);
        assert_eq!(snapshot.total_paid, MONTHLY_AMOUNT + MONTHLY_AMOUNT / 2);
        assert_eq!(snapshot.pending, MONTHLY_AMOUNT + MONTHLY_AMOUNT / 2);
        assert_eq!(snapshot.advance, 0);
        assert_eq!(snapshot.months_paid, 1);
        assert_eq!(snapshot.months_partial, 1);
    }

    #[tokio::test]
    async fn test_record_payment_overpayment_goes_to_advance() {
        let ctx = TestContext::new(1).await;
        let member_id = ctx.member_ids[0];

        // Nothing pending at all: the whole amount is an advance credit.
        let service = PaymentService::new(ctx.pool.clone());
        let response = service
            .record_payment(
                ctx.staff_id,
                RecordPaymentRequest {
                    member_id,
                    group_id: ctx.group_id,
                    group_month_id: None,
                    amount: 5_000,
                    mode: PaymentMode::Gpay,
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert!(response.allocations.is_empty());
        assert_eq!(response.advance_amount, 5_000);

        let advance_entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::MemberId.eq(member_id))
            .filter(ledger_entries::Column::Source.eq(LedgerSource::Advance))
            .all(&ctx.pool)
            .await
            .unwrap();
        assert_eq!(advance_entries.len(), 1);
        assert_eq!(advance_entries[0].amount, 5_000);
        assert_eq!(advance_entries[0].group_month_id, None);

        let snapshot = recompute_balance(&ctx.pool, member_id, ctx.group_id)
            .await
            .unwrap();
        assert_eq!(snapshot.pending, 0);
        assert_eq!(snapshot.advance, 5_000);
    }

    #[tokio::test]
    async fn test_record_payment_exact_clear_no_advance_entry() {
        let ctx = TestContext::new(1).await;
        let member_id = ctx.member_ids[0];
        ctx.generate_dues(1).await;

        let service = PaymentService::new(ctx.pool.clone());
        let response = service
            .record_payment(
                ctx.staff_id,
                RecordPaymentRequest {
                    member_id,
                    group_id: ctx.group_id,
                    group_month_id: None,
                    amount: MONTHLY_AMOUNT,
                    mode: PaymentMode::Cash,
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(response.allocations.len(), 1);
        assert_eq!(response.allocations[0].allocation_type, AllocationType::Full);
        assert_eq!(response.advance_amount, 0);

        let advance_count = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::Source.eq(LedgerSource::Advance))
            .count(&ctx.pool)
            .await
            .unwrap();
        assert_eq!(advance_count, 0);
    }

    #[tokio::test]
    async fn test_record_payment_rejects_non_positive_amount() {
        let ctx = TestContext::new(1).await;
        let service = PaymentService::new(ctx.pool.clone());

        for amount in [0, -100] {
            let result = service
                .record_payment(
                    ctx.staff_id,
                    RecordPaymentRequest {
                        member_id: ctx.member_ids[0],
                        group_id: ctx.group_id,
                        group_month_id: None,
                        amount,
                        mode: PaymentMode::Cash,
                        notes: None,
                    },
                )
                .await;
            assert!(matches!(result, Err(AppError::ValidationError(_))));
        }

        // Nothing was written.
        let count = payments::Entity::find().count(&ctx.pool).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_preview_does_not_mutate() {
        let ctx = TestContext::new(1).await;
        let member_id = ctx.member_ids[0];
        ctx.generate_dues(1).await;

        let service = PaymentService::new(ctx.pool.clone());
        let preview = service
            .preview_allocation(member_id, ctx.group_id, MONTHLY_AMOUNT * 2)
            .await
            .unwrap();
        assert_eq!(preview.allocations.len(), 1);
        assert_eq!(preview.advance_amount, MONTHLY_AMOUNT);

        // No credits were written by the preview.
        let credits = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::Kind.eq(EntryKind::Credit))
            .count(&ctx.pool)
            .await
            .unwrap();
        assert_eq!(credits, 0);
    }
}
