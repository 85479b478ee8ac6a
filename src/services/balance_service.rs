use crate::entities::{
    balance_snapshot_entity as balance_snapshots, group_entity as groups,
    group_member_entity as group_members, group_month_entity as group_months,
    ledger_entry_entity as ledger_entries, member_entity as members, EntryKind,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AccountSummaryResponse, BalanceResponse, GroupBalanceSummary, MonthPaymentStatus, MonthTally,
};
use crate::services::ledger_service::entries_for;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;

/// Split a ledger total into the mutually exclusive pending/advance pair.
pub fn split_balance(total_due: i64, total_paid: i64) -> (i64, i64) {
    let diff = total_due - total_paid;
    if diff > 0 {
        (diff, 0)
    } else {
        (0, -diff)
    }
}

/// Payment status of a single month given its debit and credit sums.
pub fn month_status(due: i64, paid: i64) -> MonthPaymentStatus {
    if due == 0 {
        return MonthPaymentStatus::NotStarted;
    }
    if paid >= due {
        return if paid == due {
            MonthPaymentStatus::Paid
        } else {
            MonthPaymentStatus::Advance
        };
    }
    if paid > 0 {
        return MonthPaymentStatus::Partial;
    }
    MonthPaymentStatus::Pending
}

/// Fold a pair's entries into (total_due, total_paid, per-month sums).
/// Month-less advance credits count toward total_paid only.
fn fold_entries(entries: &[ledger_entries::Model]) -> (i64, i64, HashMap<i64, (i64, i64)>) {
    let mut total_due = 0i64;
    let mut total_paid = 0i64;
    let mut per_month: HashMap<i64, (i64, i64)> = HashMap::new();
    for entry in entries {
        match entry.kind {
            EntryKind::Debit => {
                total_due += entry.amount;
                if let Some(month_id) = entry.group_month_id {
                    per_month.entry(month_id).or_insert((0, 0)).0 += entry.amount;
                }
            }
            EntryKind::Credit => {
                total_paid += entry.amount;
                if let Some(month_id) = entry.group_month_id {
                    per_month.entry(month_id).or_insert((0, 0)).1 += entry.amount;
                }
            }
        }
    }
    (total_due, total_paid, per_month)
}

/// Recalculate the snapshot for one (member, group) pair from the full
/// entry history and persist it. Identical output whether invoked after a
/// single append or a full replay; the snapshot is never written anywhere
/// else.
pub async fn recompute_balance<C: ConnectionTrait>(
    conn: &C,
    member_id: i64,
    group_id: i64,
) -> AppResult<balance_snapshots::Model> {
    let entries = entries_for(conn, member_id, group_id, None).await?;
    let (total_due, total_paid, per_month) = fold_entries(&entries);
    let (pending, advance) = split_balance(total_due, total_paid);

    let mut months_due = 0i32;
    let mut months_paid = 0i32;
    let mut months_partial = 0i32;
    for (due, paid) in per_month.values() {
        if *due == 0 {
            continue;
        }
        months_due += 1;
        if paid >= due {
            months_paid += 1;
        } else if *paid > 0 {
            months_partial += 1;
        }
    }

    let existing = balance_snapshots::Entity::find()
        .filter(balance_snapshots::Column::MemberId.eq(member_id))
        .filter(balance_snapshots::Column::GroupId.eq(group_id))
        .one(conn)
        .await?;

    let model = match existing {
        Some(snapshot) => {
            let mut active = snapshot.into_active_model();
            active.total_due = Set(total_due);
            active.total_paid = Set(total_paid);
            active.pending = Set(pending);
            active.advance = Set(advance);
            active.months_due = Set(months_due);
            active.months_paid = Set(months_paid);
            active.months_partial = Set(months_partial);
            active.updated_at = Set(Some(Utc::now()));
            active.update(conn).await?
        }
        None => {
            balance_snapshots::ActiveModel {
                member_id: Set(member_id),
                group_id: Set(group_id),
                total_due: Set(total_due),
                total_paid: Set(total_paid),
                pending: Set(pending),
                advance: Set(advance),
                months_due: Set(months_due),
                months_paid: Set(months_paid),
                months_partial: Set(months_partial),
                updated_at: Set(Some(Utc::now())),
                ..Default::default()
            }
            .insert(conn)
            .await?
        }
    };

    Ok(model)
}

#[derive(Clone)]
pub struct BalanceService {
    pool: DatabaseConnection,
}

impl BalanceService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Current snapshot for a pair, created lazily on first access.
    pub async fn get_balance(&self, member_id: i64, group_id: i64) -> AppResult<BalanceResponse> {
        members::Entity::find_by_id(member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        groups::Entity::find_by_id(group_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        let existing = balance_snapshots::Entity::find()
            .filter(balance_snapshots::Column::MemberId.eq(member_id))
            .filter(balance_snapshots::Column::GroupId.eq(group_id))
            .one(&self.pool)
            .await?;

        let model = match existing {
            Some(snapshot) => snapshot,
            None => recompute_balance(&self.pool, member_id, group_id).await?,
        };
        Ok(BalanceResponse::from(model))
    }

    /// Complete account picture for one member: every group they belong to,
    /// with a month-by-month tally.
    pub async fn account_summary(&self, member_id: i64) -> AppResult<AccountSummaryResponse> {
        let member = members::Entity::find_by_id(member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let memberships = group_members::Entity::find()
            .filter(group_members::Column::MemberId.eq(member_id))
            .all(&self.pool)
            .await?;

        let mut total_due = 0i64;
        let mut total_paid = 0i64;
        let mut group_summaries = Vec::with_capacity(memberships.len());

        for membership in memberships {
            let group = match groups::Entity::find_by_id(membership.group_id)
                .one(&self.pool)
                .await?
            {
                Some(group) => group,
                None => continue,
            };

            let snapshot = recompute_balance(&self.pool, member_id, group.id).await?;
            let months = self.month_tally(member_id, &group).await?;

            total_due += snapshot.total_due;
            total_paid += snapshot.total_paid;
            group_summaries.push(GroupBalanceSummary {
                group_id: group.id,
                group_name: group.name,
                monthly_amount: group.monthly_amount,
                total_months: group.total_months,
                total_due: snapshot.total_due,
                total_paid: snapshot.total_paid,
                pending: snapshot.pending,
                advance: snapshot.advance,
                months,
            });
        }

        let (pending, advance) = split_balance(total_due, total_paid);
        Ok(AccountSummaryResponse {
            member_id: member.id,
            member_name: member.name,
            member_phone: member.phone,
            total_due,
            total_paid,
            pending,
            advance,
            groups: group_summaries,
        })
    }

    async fn month_tally(
        &self,
        member_id: i64,
        group: &groups::Model,
    ) -> AppResult<Vec<MonthTally>> {
        let months = group_months::Entity::find()
            .filter(group_months::Column::GroupId.eq(group.id))
            .order_by_asc(group_months::Column::MonthNumber)
            .all(&self.pool)
            .await?;
        let by_number: HashMap<i32, &group_months::Model> =
            months.iter().map(|m| (m.month_number, m)).collect();

        let entries = entries_for(&self.pool, member_id, group.id, None).await?;
        let (_, _, per_month) = fold_entries(&entries);

        let mut tally = Vec::with_capacity(group.total_months as usize);
        for month_number in 1..=group.total_months {
            match by_number.get(&month_number) {
                Some(month) => {
                    let (due, paid) = per_month.get(&month.id).copied().unwrap_or((0, 0));
                    tally.push(MonthTally {
                        month_number,
                        group_month_id: Some(month.id),
                        due,
                        paid,
                        pending: (due - paid).max(0),
                        status: month_status(due, paid),
                    });
                }
                None => tally.push(MonthTally {
                    month_number,
                    group_month_id: None,
                    due: 0,
                    paid: 0,
                    pending: 0,
                    status: MonthPaymentStatus::NotStarted,
                }),
            }
        }
        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn test_split_balance_pending() {
        assert_eq!(split_balance(10_000, 4_000), (6_000, 0));
    }

    #[test]
    fn test_split_balance_advance() {
        assert_eq!(split_balance(4_000, 10_000), (0, 6_000));
    }

    #[test]
    fn test_split_balance_settled() {
        assert_eq!(split_balance(5_000, 5_000), (0, 0));
    }

    #[test]
    fn test_month_status() {
        assert_eq!(month_status(0, 0), MonthPaymentStatus::NotStarted);
        assert_eq!(month_status(5_000, 0), MonthPaymentStatus::Pending);
        assert_eq!(month_status(5_000, 2_000), MonthPaymentStatus::Partial);
        assert_eq!(month_status(5_000, 5_000), MonthPaymentStatus::Paid);
        assert_eq!(month_status(5_000, 6_000), MonthPaymentStatus::Advance);
    }

    #[tokio::test]
    async fn test_snapshot_created_lazily_on_first_read() {
        let ctx = TestContext::new(1).await;
        let service = BalanceService::new(ctx.pool.clone());

        let balance = service
            .get_balance(ctx.member_ids[0], ctx.group_id)
            .await
            .unwrap();
        assert_eq!(balance.total_due, 0);
        assert_eq!(balance.total_paid, 0);
        assert_eq!(balance.pending, 0);
        assert_eq!(balance.advance, 0);
    }

    #[tokio::test]
    async fn test_recompute_matches_live_snapshot() {
        use crate::entities::{EntryKind, LedgerSource};
        use crate::services::ledger_service::{append_entry, EntryDraft};

        let ctx = TestContext::new(1).await;
        let member_id = ctx.member_ids[0];

        // Live-updated path: append then recompute, one entry at a time.
        for (kind, amount) in [
            (EntryKind::Debit, 25_000),
            (EntryKind::Debit, 25_000),
            (EntryKind::Credit, 40_000),
        ] {
            append_entry(
                &ctx.pool,
                EntryDraft {
                    member_id,
                    group_id: ctx.group_id,
                    group_month_id: None,
                    kind,
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
            recompute_balance(&ctx.pool, member_id, ctx.group_id)
                .await
                .unwrap();
        }

        let live = recompute_balance(&ctx.pool, member_id, ctx.group_id)
            .await
            .unwrap();

        // Full replay must agree with the incrementally maintained snapshot.
        let replay = recompute_balance(&ctx.pool, member_id, ctx.group_id)
            .await
            .unwrap();
        assert_eq!(live.total_due, 50_000);
        assert_eq!(live.total_paid, 40_000);
        assert_eq!(live.pending, 10_000);
        assert_eq!(live.advance, 0);
        assert_eq!(replay.total_due, live.total_due);
        assert_eq!(replay.total_paid, live.total_paid);
        assert_eq!(replay.pending, live.pending);
        assert_eq!(replay.advance, live.advance);
    }
}
