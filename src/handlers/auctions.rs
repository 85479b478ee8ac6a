use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::handlers::staff_id_from_request;
use crate::models::*;
use crate::services::AuctionService;

#[utoipa::path(
    post,
    path = "/auctions",
    tag = "auctions",
    request_body = ScheduleAuctionRequest,
    responses(
        (status = 200, description = "Auction scheduled", body = AuctionResponse),
        (status = 409, description = "Auction already exists for this month")
    )
)]
pub async fn schedule_auction(
    auction_service: web::Data<AuctionService>,
    req: HttpRequest,
    request: web::Json<ScheduleAuctionRequest>,
) -> Result<HttpResponse> {
    let staff_id = match staff_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match auction_service
        .schedule_auction(staff_id, request.into_inner())
        .await
    {
        Ok(auction) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": auction,
            "message": "Auction scheduled"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/auctions",
    tag = "auctions",
    params(
        ("group_id" = Option<i64>, Query, description = "Filter by group"),
        ("status" = Option<String>, Query, description = "Filter by status")
    ),
    responses(
        (status = 200, description = "Auctions, newest first")
    )
)]
pub async fn list_auctions(
    auction_service: web::Data<AuctionService>,
    query: web::Query<AuctionQuery>,
) -> Result<HttpResponse> {
    match auction_service.list_auctions(&query.into_inner()).await {
        Ok(auctions) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": auctions
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/auctions/{auction_id}",
    tag = "auctions",
    params(
        ("auction_id" = i64, Path, description = "Auction id")
    ),
    responses(
        (status = 200, description = "Auction with bidding history", body = AuctionDetailResponse),
        (status = 404, description = "Auction not found")
    )
)]
pub async fn get_auction(
    auction_service: web::Data<AuctionService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match auction_service.get_auction(path.into_inner()).await {
        Ok(auction) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": auction
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auctions/{auction_id}/open",
    tag = "auctions",
    params(
        ("auction_id" = i64, Path, description = "Auction id")
    ),
    responses(
        (status = 200, description = "Auction opened for bidding"),
        (status = 409, description = "Auction is not in the scheduled state")
    )
)]
pub async fn open_auction(
    auction_service: web::Data<AuctionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let staff_id = match staff_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match auction_service
        .open_auction(staff_id, path.into_inner())
        .await
    {
        Ok(auction) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": auction,
            "message": "Auction opened for bidding"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auctions/bid",
    tag = "auctions",
    request_body = PlaceBidRequest,
    responses(
        (status = 200, description = "Bid placed", body = BidResponse),
        (status = 400, description = "Bidder is not eligible or bid is too high"),
        (status = 409, description = "Auction is not open")
    )
)]
pub async fn place_bid(
    auction_service: web::Data<AuctionService>,
    req: HttpRequest,
    request: web::Json<PlaceBidRequest>,
) -> Result<HttpResponse> {
    let staff_id = match staff_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match auction_service
        .place_bid(staff_id, request.into_inner())
        .await
    {
        Ok(bid) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": bid,
            "message": "Bid placed"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auctions/{auction_id}/close",
    tag = "auctions",
    params(
        ("auction_id" = i64, Path, description = "Auction id")
    ),
    responses(
        (status = 200, description = "Auction closed; winner and dividend computed", body = CloseAuctionResponse),
        (status = 400, description = "No bids placed"),
        (status = 409, description = "Auction is not open")
    )
)]
pub async fn close_auction(
    auction_service: web::Data<AuctionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let staff_id = match staff_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match auction_service
        .close_auction(staff_id, path.into_inner())
        .await
    {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result,
            "message": "Auction closed"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auctions/{auction_id}/cancel",
    tag = "auctions",
    params(
        ("auction_id" = i64, Path, description = "Auction id")
    ),
    responses(
        (status = 200, description = "Auction cancelled"),
        (status = 409, description = "Auction already closed")
    )
)]
pub async fn cancel_auction(
    auction_service: web::Data<AuctionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let staff_id = match staff_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match auction_service
        .cancel_auction(staff_id, path.into_inner())
        .await
    {
        Ok(auction) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": auction,
            "message": "Auction cancelled"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auctions_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auctions")
            .route("", web::post().to(schedule_auction))
            .route("", web::get().to(list_auctions))
            .route("/bid", web::post().to(place_bid))
            .route("/{auction_id}", web::get().to(get_auction))
            .route("/{auction_id}/open", web::post().to(open_auction))
            .route("/{auction_id}/close", web::post().to(close_auction))
            .route("/{auction_id}/cancel", web::post().to(cancel_auction)),
    );
}
