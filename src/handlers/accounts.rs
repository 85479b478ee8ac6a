use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::handlers::staff_id_from_request;
use crate::models::*;
use crate::services::{BalanceService, DuesService, LedgerService, PaymentService};

#[utoipa::path(
    get,
    path = "/accounts/ledger",
    tag = "accounts",
    params(
        ("member_id" = Option<i64>, Query, description = "Filter by member"),
        ("group_id" = Option<i64>, Query, description = "Filter by group"),
        ("kind" = Option<String>, Query, description = "debit or credit"),
        ("source" = Option<String>, Query, description = "Entry source"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated ledger entries"),
    )
)]
pub async fn list_ledger(
    ledger_service: web::Data<LedgerService>,
    query: web::Query<LedgerQuery>,
) -> Result<HttpResponse> {
    match ledger_service.list_entries(&query.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/accounts/ledger/adjustment",
    tag = "accounts",
    request_body = AdjustmentRequest,
    responses(
        (status = 200, description = "Adjustment entry created", body = LedgerEntryResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Member or group not found")
    )
)]
pub async fn create_adjustment(
    ledger_service: web::Data<LedgerService>,
    req: HttpRequest,
    request: web::Json<AdjustmentRequest>,
) -> Result<HttpResponse> {
    let staff_id = match staff_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match ledger_service
        .create_adjustment(staff_id, request.into_inner())
        .await
    {
        Ok(entry) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": entry,
            "message": "Adjustment entry created"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/accounts/generate-dues/{group_id}/{month_number}",
    tag = "accounts",
    params(
        ("group_id" = i64, Path, description = "Group id"),
        ("month_number" = i32, Path, description = "Month number (1-based)")
    ),
    responses(
        (status = 200, description = "Dues generated", body = GenerateDuesResponse),
        (status = 409, description = "Dues already generated for this month"),
        (status = 400, description = "Month out of range or no active members")
    )
)]
pub async fn generate_dues(
    dues_service: web::Data<DuesService>,
    req: HttpRequest,
    path: web::Path<(i64, i32)>,
) -> Result<HttpResponse> {
    let staff_id = match staff_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    let (group_id, month_number) = path.into_inner();

    match dues_service
        .generate_dues(staff_id, group_id, month_number)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/accounts/balance/{member_id}/{group_id}",
    tag = "accounts",
    params(
        ("member_id" = i64, Path, description = "Member id"),
        ("group_id" = i64, Path, description = "Group id")
    ),
    responses(
        (status = 200, description = "Balance snapshot", body = BalanceResponse),
        (status = 404, description = "Member or group not found")
    )
)]
pub async fn get_balance(
    balance_service: web::Data<BalanceService>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let (member_id, group_id) = path.into_inner();
    match balance_service.get_balance(member_id, group_id).await {
        Ok(balance) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": balance
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/accounts/member/{member_id}",
    tag = "accounts",
    params(
        ("member_id" = i64, Path, description = "Member id")
    ),
    responses(
        (status = 200, description = "Account summary with per-month tally", body = AccountSummaryResponse),
        (status = 404, description = "Member not found")
    )
)]
pub async fn account_summary(
    balance_service: web::Data<BalanceService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match balance_service.account_summary(path.into_inner()).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/accounts/ledger/{member_id}/{group_id}",
    tag = "accounts",
    params(
        ("member_id" = i64, Path, description = "Member id"),
        ("group_id" = i64, Path, description = "Group id"),
        ("month_id" = Option<i64>, Query, description = "Restrict to one group month")
    ),
    responses(
        (status = 200, description = "Entry history for the pair, oldest first"),
        (status = 404, description = "Member or group not found")
    )
)]
pub async fn member_ledger(
    ledger_service: web::Data<LedgerService>,
    path: web::Path<(i64, i64)>,
    query: web::Query<MemberLedgerQuery>,
) -> Result<HttpResponse> {
    let (member_id, group_id) = path.into_inner();
    match ledger_service
        .member_entries(member_id, group_id, query.month_id)
        .await
    {
        Ok(entries) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": entries
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/accounts/payment-preview",
    tag = "accounts",
    params(
        ("member_id" = i64, Query, description = "Member id"),
        ("group_id" = i64, Query, description = "Group id"),
        ("amount" = i64, Query, description = "Payment amount in minor units")
    ),
    responses(
        (status = 200, description = "FIFO allocation preview (read-only)", body = AllocationPreviewResponse)
    )
)]
pub async fn payment_preview(
    payment_service: web::Data<PaymentService>,
    query: web::Query<PreviewQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    match payment_service
        .preview_allocation(query.member_id, query.group_id, query.amount)
        .await
    {
        Ok(preview) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": preview
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/accounts/dashboard",
    tag = "accounts",
    responses(
        (status = 200, description = "Ledger-wide dashboard totals", body = DashboardSummary)
    )
)]
pub async fn dashboard(ledger_service: web::Data<LedgerService>) -> Result<HttpResponse> {
    match ledger_service.dashboard_summary().await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn accounts_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/accounts")
            .route("/ledger", web::get().to(list_ledger))
            .route("/ledger/adjustment", web::post().to(create_adjustment))
            .route(
                "/ledger/{member_id}/{group_id}",
                web::get().to(member_ledger),
            )
            .route(
                "/generate-dues/{group_id}/{month_number}",
                web::post().to(generate_dues),
            )
            .route(
                "/balance/{member_id}/{group_id}",
                web::get().to(get_balance),
            )
            .route("/member/{member_id}", web::get().to(account_summary))
            .route("/payment-preview", web::get().to(payment_preview))
            .route("/dashboard", web::get().to(dashboard)),
    );
}
