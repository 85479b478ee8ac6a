use crate::entities::{
    auction_entity as auctions, bid_entity as bids, group_entity as groups,
    group_member_entity as group_members, group_month_entity as group_months,
    member_entity as members, AuctionStatus, BidStatus, MonthStatus,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuctionDetailResponse, AuctionQuery, AuctionResponse, BidResponse, CloseAuctionResponse,
    PlaceBidRequest, ScheduleAuctionRequest,
};
use crate::services::group_service::{active_memberships, get_or_create_month};
use crate::services::staff_service::require_active_staff;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;

/// Winning bid of a chit auction: the lowest amount, ties broken by the
/// earliest bid time. Only pending bids compete.
pub fn select_winning_bid(candidates: &[bids::Model]) -> Option<&bids::Model> {
    candidates
        .iter()
        .filter(|bid| bid.status == BidStatus::Pending)
        .min_by_key(|bid| (bid.amount, bid.bid_time, bid.id))
}

/// Dividend per member: the discount left by the winning bid, split evenly
/// (floor division in minor units).
pub fn compute_dividend(total_amount: i64, winning_amount: i64, member_count: usize) -> i64 {
    (total_amount - winning_amount) / member_count as i64
}

#[derive(Clone)]
pub struct AuctionService {
    pool: DatabaseConnection,
}

impl AuctionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Schedule the auction for a group month, creating the month lazily.
    /// A month can only ever have one auction.
    pub async fn schedule_auction(
        &self,
        staff_id: i64,
        request: ScheduleAuctionRequest,
    ) -> AppResult<AuctionResponse> {
        require_active_staff(&self.pool, staff_id).await?;

        let group = groups::Entity::find_by_id(request.group_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        if request.month_number < 1 || request.month_number > group.total_months {
            return Err(AppError::ValidationError(format!(
                "Month number must be between 1 and {}",
                group.total_months
            )));
        }

        let txn = self.pool.begin().await?;

        let month = get_or_create_month(&txn, request.group_id, request.month_number).await?;

        let existing = auctions::Entity::find()
            .filter(auctions::Column::GroupMonthId.eq(month.id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::ConflictError(format!(
                "Auction already exists for month {}",
                request.month_number
            )));
        }

        let insert = auctions::ActiveModel {
            group_month_id: Set(month.id),
            auction_date: Set(request.auction_date),
            status: Set(AuctionStatus::Scheduled),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        let auction = match insert {
            Ok(auction) => auction,
            Err(err) if AppError::is_unique_violation(&err) => {
                return Err(AppError::ConflictError(format!(
                    "Auction already exists for month {}",
                    request.month_number
                )));
            }
            Err(err) => return Err(err.into()),
        };

        let mut month_active = month.clone().into_active_model();
        month_active.auction_date = Set(Some(request.auction_date.date_naive()));
        month_active.update(&txn).await?;

        txn.commit().await?;

        log::info!(
            "Scheduled auction {} for group {} month {}",
            auction.id,
            request.group_id,
            request.month_number
        );
        Ok(AuctionResponse::from_parts(
            auction,
            group.id,
            Some(group.name),
            month.month_number,
            0,
        ))
    }

    /// Open a scheduled auction for bidding.
    pub async fn open_auction(&self, staff_id: i64, auction_id: i64) -> AppResult<AuctionResponse> {
        require_active_staff(&self.pool, staff_id).await?;

        let auction = self.find_auction(auction_id).await?;
        if auction.status != AuctionStatus::Scheduled {
            return Err(AppError::StateError(format!(
                "Only scheduled auctions can be opened (current status: {})",
                auction.status
            )));
        }

        let mut active = auction.into_active_model();
        active.status = Set(AuctionStatus::Open);
        active.updated_at = Set(Some(Utc::now()));
        let auction = active.update(&self.pool).await?;

        self.to_response(auction).await
    }

    /// Place a bid in an open auction on behalf of a member.
    pub async fn place_bid(
        &self,
        staff_id: i64,
        request: PlaceBidRequest,
    ) -> AppResult<BidResponse> {
        require_active_staff(&self.pool, staff_id).await?;

        let auction = self.find_auction(request.auction_id).await?;
        if auction.status != AuctionStatus::Open {
            return Err(AppError::StateError(format!(
                "Auction is not open for bidding (current status: {})",
                auction.status
            )));
        }

        let (month, group) = self.month_and_group(&auction).await?;

        let member = members::Entity::find_by_id(request.member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let membership = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group.id))
            .filter(group_members::Column::MemberId.eq(member.id))
            .filter(group_members::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?;
        if membership.is_none() {
            return Err(AppError::ValidationError(
                "Member is not an active member of this group".to_string(),
            ));
        }

        // One win per member per group cycle.
        let previous_win = group_months::Entity::find()
            .filter(group_months::Column::GroupId.eq(group.id))
            .filter(group_months::Column::WinnerMemberId.eq(member.id))
            .one(&self.pool)
            .await?;
        if previous_win.is_some() {
            return Err(AppError::ValidationError(
                "Member has already won an auction in this group".to_string(),
            ));
        }

        if request.amount <= 0 {
            return Err(AppError::ValidationError(
                "Bid amount must be positive".to_string(),
            ));
        }
        // A winning bid below the pool total is what funds the dividend.
        if request.amount >= group.total_amount {
            return Err(AppError::ValidationError(
                "Bid amount must be less than the group's total amount".to_string(),
            ));
        }

        let bid = bids::ActiveModel {
            auction_id: Set(auction.id),
            member_id: Set(member.id),
            amount: Set(request.amount),
            status: Set(BidStatus::Pending),
            notes: Set(request.notes),
            bid_time: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Bid {} of {} placed by member {} in auction {} (group {} month {})",
            bid.id,
            bid.amount,
            member.id,
            auction.id,
            group.id,
            month.month_number
        );

        let mut response = BidResponse::from(bid);
        response.member_name = Some(member.name);
        Ok(response)
    }

    /// Close an open auction: pick the winner, settle bid statuses and
    /// complete the group month. Settlement does not write ledger entries;
    /// payout accounting is a downstream concern keyed off this event.
    pub async fn close_auction(
        &self,
        staff_id: i64,
        auction_id: i64,
    ) -> AppResult<CloseAuctionResponse> {
        require_active_staff(&self.pool, staff_id).await?;

        let txn = self.pool.begin().await?;

        let auction = auctions::Entity::find_by_id(auction_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Auction not found".to_string()))?;
        if auction.status != AuctionStatus::Open {
            return Err(AppError::StateError(format!(
                "Only open auctions can be closed (current status: {})",
                auction.status
            )));
        }

        let month = group_months::Entity::find_by_id(auction.group_month_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Group month not found".to_string()))?;
        let group = groups::Entity::find_by_id(month.group_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        let all_bids = bids::Entity::find()
            .filter(bids::Column::AuctionId.eq(auction_id))
            .order_by_asc(bids::Column::Id)
            .all(&txn)
            .await?;

        let winning_bid = select_winning_bid(&all_bids)
            .cloned()
            .ok_or_else(|| AppError::ValidationError("No bids placed in this auction".into()))?;

        let member_count = active_memberships(&txn, group.id).await?.len();
        if member_count == 0 {
            return Err(AppError::ValidationError(
                "No active members in this group".to_string(),
            ));
        }
        let dividend = compute_dividend(group.total_amount, winning_bid.amount, member_count);

        let winner = members::Entity::find_by_id(winning_bid.member_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let mut winning_active = winning_bid.clone().into_active_model();
        winning_active.status = Set(BidStatus::Accepted);
        winning_active.update(&txn).await?;

        let losing_bids: Vec<bids::Model> = all_bids
            .iter()
            .filter(|bid| bid.id != winning_bid.id && bid.status == BidStatus::Pending)
            .cloned()
            .collect();
        for bid in losing_bids {
            let mut active = bid.into_active_model();
            active.status = Set(BidStatus::Rejected);
            active.update(&txn).await?;
        }

        let mut auction_active = auction.into_active_model();
        auction_active.status = Set(AuctionStatus::Closed);
        auction_active.winning_bid_amount = Set(Some(winning_bid.amount));
        auction_active.winner_member_id = Set(Some(winning_bid.member_id));
        auction_active.dividend_per_member = Set(Some(dividend));
        auction_active.updated_at = Set(Some(Utc::now()));
        auction_active.update(&txn).await?;

        let mut month_active = month.into_active_model();
        month_active.winner_member_id = Set(Some(winning_bid.member_id));
        month_active.payout_amount = Set(Some(winning_bid.amount));
        month_active.dividend_per_member = Set(Some(dividend));
        month_active.status = Set(MonthStatus::Completed);
        month_active.update(&txn).await?;

        txn.commit().await?;

        log::info!(
            "Auction {} closed: member {} wins with {} (dividend {} per member)",
            auction_id,
            winning_bid.member_id,
            winning_bid.amount,
            dividend
        );

        Ok(CloseAuctionResponse {
            auction_id,
            winner_member_id: winning_bid.member_id,
            winner_name: winner.name,
            winning_bid_amount: winning_bid.amount,
            payout_amount: winning_bid.amount,
            dividend_per_member: dividend,
        })
    }

    /// Cancel an auction that has not yet closed.
    pub async fn cancel_auction(
        &self,
        staff_id: i64,
        auction_id: i64,
    ) -> AppResult<AuctionResponse> {
        require_active_staff(&self.pool, staff_id).await?;

        let auction = self.find_auction(auction_id).await?;
        if !matches!(
            auction.status,
            AuctionStatus::Scheduled | AuctionStatus::Open
        ) {
            return Err(AppError::StateError(format!(
                "Cannot cancel an auction in status {}",
                auction.status
            )));
        }

        let mut active = auction.into_active_model();
        active.status = Set(AuctionStatus::Cancelled);
        active.updated_at = Set(Some(Utc::now()));
        let auction = active.update(&self.pool).await?;

        self.to_response(auction).await
    }

    pub async fn get_auction(&self, auction_id: i64) -> AppResult<AuctionDetailResponse> {
        let auction = self.find_auction(auction_id).await?;
        let (month, group) = self.month_and_group(&auction).await?;

        let all_bids = bids::Entity::find()
            .filter(bids::Column::AuctionId.eq(auction_id))
            .order_by_asc(bids::Column::Amount)
            .order_by_asc(bids::Column::BidTime)
            .all(&self.pool)
            .await?;

        let member_ids: Vec<i64> = all_bids.iter().map(|b| b.member_id).collect();
        let member_names: HashMap<i64, String> = members::Entity::find()
            .filter(members::Column::Id.is_in(member_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();

        let bids = all_bids
            .into_iter()
            .map(|bid| {
                let mut response = BidResponse::from(bid);
                response.member_name = member_names.get(&response.member_id).cloned();
                response
            })
            .collect();

        let total_members = active_memberships(&self.pool, group.id).await?.len();

        Ok(AuctionDetailResponse {
            id: auction.id,
            group_id: group.id,
            group_name: group.name,
            group_month_id: auction.group_month_id,
            month_number: month.month_number,
            auction_date: auction.auction_date,
            status: auction.status,
            total_members,
            total_amount: group.total_amount,
            bids,
            winning_bid_amount: auction.winning_bid_amount,
            winner_member_id: auction.winner_member_id,
            dividend_per_member: auction.dividend_per_member,
        })
    }

    pub async fn list_auctions(&self, query: &AuctionQuery) -> AppResult<Vec<AuctionResponse>> {
        let mut find = auctions::Entity::find();
        if let Some(status) = query.status {
            find = find.filter(auctions::Column::Status.eq(status));
        }
        let rows = find
            .order_by_desc(auctions::Column::AuctionDate)
            .all(&self.pool)
            .await?;

        let mut responses = Vec::with_capacity(rows.len());
        for auction in rows {
            let (month, group) = self.month_and_group(&auction).await?;
            if let Some(group_id) = query.group_id {
                if group.id != group_id {
                    continue;
                }
            }
            let total_bids = bids::Entity::find()
                .filter(bids::Column::AuctionId.eq(auction.id))
                .all(&self.pool)
                .await?
                .len();
            responses.push(AuctionResponse::from_parts(
                auction,
                group.id,
                Some(group.name),
                month.month_number,
                total_bids,
            ));
        }
        Ok(responses)
    }

    async fn find_auction(&self, auction_id: i64) -> AppResult<auctions::Model> {
        auctions::Entity::find_by_id(auction_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Auction not found".to_string()))
    }

    async fn month_and_group(
        &self,
        auction: &auctions::Model,
    ) -> AppResult<(group_months::Model, groups::Model)> {
        let month = group_months::Entity::find_by_id(auction.group_month_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Group month not found".to_string()))?;
        let group = groups::Entity::find_by_id(month.group_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;
        Ok((month, group))
    }

    async fn to_response(&self, auction: auctions::Model) -> AppResult<AuctionResponse> {
        let (month, group) = self.month_and_group(&auction).await?;
        let total_bids = bids::Entity::find()
            .filter(bids::Column::AuctionId.eq(auction.id))
            .all(&self.pool)
            .await?
            .len();
        Ok(AuctionResponse::from_parts(
            auction,
            group.id,
            Some(group.name),
            month.month_number,
            total_bids,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use chrono::TimeZone;

    fn bid(id: i64, member_id: i64, amount: i64, minute: u32) -> bids::Model {
        bids::Model {
            id,
            auction_id: 1,
            member_id,
            amount,
            status: BidStatus::Pending,
            notes: None,
            bid_time: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
                + chrono::Duration::minutes(minute as i64),
        }
    }

    #[test]
    fn test_winner_is_lowest_bid_with_earliest_tiebreak() {
        // 5000.00 at 10:00, 4500.00 at 10:05, 4500.00 at 09:55 -> the
        // earlier of the two lowest bids wins.
        let candidates = vec![
            bid(1, 11, 500_000, 60),
            bid(2, 12, 450_000, 65),
            bid(3, 13, 450_000, 55),
        ];
        let winner = select_winning_bid(&candidates).unwrap();
        assert_eq!(winner.id, 3);
        assert_eq!(winner.member_id, 13);
    }

    #[test]
    fn test_winner_ignores_settled_bids() {
        let mut lowest = bid(1, 11, 100_000, 0);
        lowest.status = BidStatus::Rejected;
        let candidates = vec![lowest, bid(2, 12, 200_000, 1)];
        let winner = select_winning_bid(&candidates).unwrap();
        assert_eq!(winner.id, 2);
        assert!(select_winning_bid(&[]).is_none());
    }

    #[test]
    fn test_dividend_split() {
        // (100000.00 - 4500.00) / 20 = 4775.00
        assert_eq!(compute_dividend(10_000_000, 450_000, 20), 477_500);
    }

    #[tokio::test]
    async fn test_full_auction_flow() {
        let ctx = TestContext::new(3).await;
        let service = AuctionService::new(ctx.pool.clone());

        let auction = service
            .schedule_auction(
                ctx.staff_id,
                ScheduleAuctionRequest {
                    group_id: ctx.group_id,
                    month_number: 1,
                    auction_date: Utc::now(),
                },
            )
            .await
            .unwrap();
        assert_eq!(auction.status, AuctionStatus::Scheduled);

        service.open_auction(ctx.staff_id, auction.id).await.unwrap();

        for (member_id, amount) in [
            (ctx.member_ids[0], TOTAL_AMOUNT / 2),
            (ctx.member_ids[1], TOTAL_AMOUNT / 4),
            (ctx.member_ids[2], TOTAL_AMOUNT / 3),
        ] {
            service
                .place_bid(
                    ctx.staff_id,
                    PlaceBidRequest {
                        auction_id: auction.id,
                        member_id,
                        amount,
                        notes: None,
                    },
                )
                .await
                .unwrap();
        }

        let closed = service.close_auction(ctx.staff_id, auction.id).await.unwrap();
        assert_eq!(closed.winner_member_id, ctx.member_ids[1]);
        assert_eq!(closed.winning_bid_amount, TOTAL_AMOUNT / 4);
        assert_eq!(
            closed.dividend_per_member,
            (TOTAL_AMOUNT - TOTAL_AMOUNT / 4) / 3
        );

        // The month is settled and the bid statuses are final.
        let detail = service.get_auction(auction.id).await.unwrap();
        assert_eq!(detail.status, AuctionStatus::Closed);
        assert_eq!(detail.winner_member_id, Some(ctx.member_ids[1]));
        let accepted: Vec<_> = detail
            .bids
            .iter()
            .filter(|b| b.status == BidStatus::Accepted)
            .collect();
        let rejected: Vec<_> = detail
            .bids
            .iter()
            .filter(|b| b.status == BidStatus::Rejected)
            .collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(rejected.len(), 2);

        let month = group_months::Entity::find_by_id(detail.group_month_id)
            .one(&ctx.pool)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(month.status, MonthStatus::Completed);
        assert_eq!(month.winner_member_id, Some(ctx.member_ids[1]));
        assert_eq!(month.payout_amount, Some(TOTAL_AMOUNT / 4));
    }

    #[tokio::test]
    async fn test_close_requires_open_state() {
        let ctx = TestContext::new(2).await;
        let service = AuctionService::new(ctx.pool.clone());

        let auction = service
            .schedule_auction(
                ctx.staff_id,
                ScheduleAuctionRequest {
                    group_id: ctx.group_id,
                    month_number: 1,
                    auction_date: Utc::now(),
                },
            )
            .await
            .unwrap();

        // Still scheduled, not open.
        let result = service.close_auction(ctx.staff_id, auction.id).await;
        assert!(matches!(result, Err(AppError::StateError(_))));
    }

    #[tokio::test]
    async fn test_bid_after_close_is_rejected() {
        let ctx = TestContext::new(2).await;
        let service = AuctionService::new(ctx.pool.clone());

        let auction = service
            .schedule_auction(
                ctx.staff_id,
                ScheduleAuctionRequest {
                    group_id: ctx.group_id,
                    month_number: 1,
                    auction_date: Utc::now(),
                },
            )
            .await
            .unwrap();
        service.open_auction(ctx.staff_id, auction.id).await.unwrap();
        service
            .place_bid(
                ctx.staff_id,
                PlaceBidRequest {
                    auction_id: auction.id,
                    member_id: ctx.member_ids[0],
                    amount: TOTAL_AMOUNT / 2,
                    notes: None,
                },
            )
            .await
            .unwrap();
        service.close_auction(ctx.staff_id, auction.id).await.unwrap();

        let result = service
            .place_bid(
                ctx.staff_id,
                PlaceBidRequest {
                    auction_id: auction.id,
                    member_id: ctx.member_ids[1],
                    amount: TOTAL_AMOUNT / 3,
                    notes: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::StateError(_))));

        // Closed is terminal: no reopening or cancelling.
        let result = service.open_auction(ctx.staff_id, auction.id).await;
        assert!(matches!(result, Err(AppError::StateError(_))));
        let result = service.cancel_auction(ctx.staff_id, auction.id).await;
        assert!(matches!(result, Err(AppError::StateError(_))));
    }

    #[tokio::test]
    async fn test_one_win_per_member_per_cycle() {
        let ctx = TestContext::new(2).await;
        let service = AuctionService::new(ctx.pool.clone());

        let first = service
            .schedule_auction(
                ctx.staff_id,
                ScheduleAuctionRequest {
                    group_id: ctx.group_id,
                    month_number: 2,
                    auction_date: Utc::now(),
                },
            )
            .await
            .unwrap();
        service.open_auction(ctx.staff_id, first.id).await.unwrap();
        service
            .place_bid(
                ctx.staff_id,
                PlaceBidRequest {
                    auction_id: first.id,
                    member_id: ctx.member_ids[0],
                    amount: TOTAL_AMOUNT / 2,
                    notes: None,
                },
            )
            .await
            .unwrap();
        service.close_auction(ctx.staff_id, first.id).await.unwrap();

        let fifth = service
            .schedule_auction(
                ctx.staff_id,
                ScheduleAuctionRequest {
                    group_id: ctx.group_id,
                    month_number: 5,
                    auction_date: Utc::now(),
                },
            )
            .await
            .unwrap();
        service.open_auction(ctx.staff_id, fifth.id).await.unwrap();

        let result = service
            .place_bid(
                ctx.staff_id,
                PlaceBidRequest {
                    auction_id: fifth.id,
                    member_id: ctx.member_ids[0],
                    amount: TOTAL_AMOUNT / 2,
                    notes: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        // The other member can still bid.
        service
            .place_bid(
                ctx.staff_id,
                PlaceBidRequest {
                    auction_id: fifth.id,
                    member_id: ctx.member_ids[1],
                    amount: TOTAL_AMOUNT / 2,
                    notes: None,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_bid_validation() {
        let ctx = TestContext::new(1).await;
        let service = AuctionService::new(ctx.pool.clone());

        let auction = service
            .schedule_auction(
                ctx.staff_id,
                ScheduleAuctionRequest {
                    group_id: ctx.group_id,
                    month_number: 1,
                    auction_date: Utc::now(),
                },
            )
            .await
            .unwrap();
        service.open_auction(ctx.staff_id, auction.id).await.unwrap();

        // At or above the pool total leaves no dividend.
        let result = service
            .place_bid(
                ctx.staff_id,
                PlaceBidRequest {
                    auction_id: auction.id,
                    member_id: ctx.member_ids[0],
                    amount: TOTAL_AMOUNT,
                    notes: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        // Outsiders cannot bid.
        let outsider = ctx.create_member("Outsider", "9999999999").await;
        let result = service
            .place_bid(
                ctx.staff_id,
                PlaceBidRequest {
                    auction_id: auction.id,
                    member_id: outsider,
                    amount: TOTAL_AMOUNT / 2,
                    notes: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_close_without_bids_and_duplicate_schedule() {
        let ctx = TestContext::new(1).await;
        let service = AuctionService::new(ctx.pool.clone());

        let auction = service
            .schedule_auction(
                ctx.staff_id,
                ScheduleAuctionRequest {
                    group_id: ctx.group_id,
                    month_number: 1,
                    auction_date: Utc::now(),
                },
            )
            .await
            .unwrap();
        service.open_auction(ctx.staff_id, auction.id).await.unwrap();

        let result = service.close_auction(ctx.staff_id, auction.id).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));

        let result = service
            .schedule_auction(
                ctx.staff_id,
                ScheduleAuctionRequest {
                    group_id: ctx.group_id,
                    month_number: 1,
                    auction_date: Utc::now(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::ConflictError(_))));
    }

    #[tokio::test]
    async fn test_cancel_from_scheduled_and_open() {
        let ctx = TestContext::new(1).await;
        let service = AuctionService::new(ctx.pool.clone());

        let first = service
            .schedule_auction(
                ctx.staff_id,
                ScheduleAuctionRequest {
                    group_id: ctx.group_id,
                    month_number: 1,
                    auction_date: Utc::now(),
                },
            )
            .await
            .unwrap();
        let cancelled = service.cancel_auction(ctx.staff_id, first.id).await.unwrap();
        assert_eq!(cancelled.status, AuctionStatus::Cancelled);

        // A cancelled auction cannot be cancelled again or opened.
        let result = service.cancel_auction(ctx.staff_id, first.id).await;
        assert!(matches!(result, Err(AppError::StateError(_))));
        let result = service.open_auction(ctx.staff_id, first.id).await;
        assert!(matches!(result, Err(AppError::StateError(_))));

        let second = service
            .schedule_auction(
                ctx.staff_id,
                ScheduleAuctionRequest {
                    group_id: ctx.group_id,
                    month_number: 2,
                    auction_date: Utc::now(),
                },
            )
            .await
            .unwrap();
        service.open_auction(ctx.staff_id, second.id).await.unwrap();
        let cancelled = service.cancel_auction(ctx.staff_id, second.id).await.unwrap();
        assert_eq!(cancelled.status, AuctionStatus::Cancelled);
    }
}
