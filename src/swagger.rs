use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    AuctionStatus, BidStatus, EntryKind, LedgerSource, MonthStatus, PaymentMode, StaffRole,
};
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::staff::create_staff,
        handlers::staff::get_staff,
        handlers::members::create_member,
        handlers::members::get_member,
        handlers::members::list_members,
        handlers::groups::create_group,
        handlers::groups::get_group,
        handlers::groups::add_group_member,
        handlers::groups::list_group_members,
        handlers::groups::list_group_months,
        handlers::accounts::list_ledger,
        handlers::accounts::member_ledger,
        handlers::accounts::create_adjustment,
        handlers::accounts::generate_dues,
        handlers::accounts::get_balance,
        handlers::accounts::account_summary,
        handlers::accounts::payment_preview,
        handlers::accounts::dashboard,
        handlers::payments::record_payment,
        handlers::payments::list_payments,
        handlers::payments::get_payment,
        handlers::auctions::schedule_auction,
        handlers::auctions::list_auctions,
        handlers::auctions::get_auction,
        handlers::auctions::open_auction,
        handlers::auctions::place_bid,
        handlers::auctions::close_auction,
        handlers::auctions::cancel_auction,
    ),
    components(
        schemas(
            StaffRole,
            EntryKind,
            LedgerSource,
            MonthStatus,
            AuctionStatus,
            BidStatus,
            PaymentMode,
            CreateStaffRequest,
            StaffResponse,
            CreateMemberRequest,
            MemberResponse,
            CreateGroupRequest,
            GroupResponse,
            AddGroupMemberRequest,
            GroupMemberResponse,
            GroupMonthResponse,
            LedgerQuery,
            MemberLedgerQuery,
            LedgerEntryResponse,
            AdjustmentRequest,
            DashboardSummary,
            GenerateDuesResponse,
            RecordPaymentRequest,
            AllocationType,
            AllocationLine,
            RecordPaymentResponse,
            PreviewQuery,
            AllocationPreviewResponse,
            PaymentQuery,
            PaymentResponse,
            BalanceResponse,
            MonthPaymentStatus,
            MonthTally,
            GroupBalanceSummary,
            AccountSummaryResponse,
            ScheduleAuctionRequest,
            PlaceBidRequest,
            AuctionQuery,
            BidResponse,
            AuctionResponse,
            AuctionDetailResponse,
            CloseAuctionResponse,
            PaginationParams,
        )
    ),
    tags(
        (name = "staff", description = "Staff registry"),
        (name = "members", description = "Member registry"),
        (name = "groups", description = "Chit groups, slots and months"),
        (name = "accounts", description = "Ledger, dues and balances"),
        (name = "payments", description = "Payment collection and allocation"),
        (name = "auctions", description = "Monthly reverse auctions")
    ),
    info(
        title = "Chit Fund Ledger API",
        description = "Rotating-savings group management: append-only account ledger, FIFO payment allocation, balance cache and auction settlement.",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
