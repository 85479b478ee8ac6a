use crate::entities::{auction_entity as auctions, bid_entity as bids, AuctionStatus, BidStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScheduleAuctionRequest {
    pub group_id: i64,
    pub month_number: i32,
    pub auction_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceBidRequest {
    pub auction_id: i64,
    pub member_id: i64,
    /// Bid amount in minor units; must be below the group's total amount.
    pub amount: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AuctionQuery {
    pub group_id: Option<i64>,
    pub status: Option<AuctionStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BidResponse {
    pub id: i64,
    pub auction_id: i64,
    pub member_id: i64,
    pub member_name: Option<String>,
    pub amount: i64,
    pub status: BidStatus,
    pub bid_time: DateTime<Utc>,
}

impl From<bids::Model> for BidResponse {
    fn from(model: bids::Model) -> Self {
        Self {
            id: model.id,
            auction_id: model.auction_id,
            member_id: model.member_id,
            member_name: None,
            amount: model.amount,
            status: model.status,
            bid_time: model.bid_time,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuctionResponse {
    pub id: i64,
    pub group_id: i64,
    pub group_name: Option<String>,
    pub group_month_id: i64,
    pub month_number: i32,
    pub auction_date: DateTime<Utc>,
    pub status: AuctionStatus,
    pub total_bids: usize,
    pub winning_bid_amount: Option<i64>,
    pub winner_member_id: Option<i64>,
    pub dividend_per_member: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuctionDetailResponse {
    pub id: i64,
    pub group_id: i64,
    pub group_name: String,
    pub group_month_id: i64,
    pub month_number: i32,
    pub auction_date: DateTime<Utc>,
    pub status: AuctionStatus,
    pub total_members: usize,
    pub total_amount: i64,
    pub bids: Vec<BidResponse>,
    pub winning_bid_amount: Option<i64>,
    pub winner_member_id: Option<i64>,
    pub dividend_per_member: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CloseAuctionResponse {
    pub auction_id: i64,
    pub winner_member_id: i64,
    pub winner_name: String,
    pub winning_bid_amount: i64,
    pub payout_amount: i64,
    pub dividend_per_member: i64,
}

impl AuctionResponse {
    pub fn from_parts(
        auction: auctions::Model,
        group_id: i64,
        group_name: Option<String>,
        month_number: i32,
        total_bids: usize,
    ) -> Self {
        Self {
            id: auction.id,
            group_id,
            group_name,
            group_month_id: auction.group_month_id,
            month_number,
            auction_date: auction.auction_date,
            status: auction.status,
            total_bids,
            winning_bid_amount: auction.winning_bid_amount,
            winner_member_id: auction.winner_member_id,
            dividend_per_member: auction.dividend_per_member,
        }
    }
}
