use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::handlers::staff_id_from_request;
use crate::models::*;
use crate::services::MemberService;

#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    request_body = CreateMemberRequest,
    responses(
        (status = 200, description = "Member created with generated member code", body = MemberResponse),
        (status = 409, description = "Phone already registered")
    )
)]
pub async fn create_member(
    member_service: web::Data<MemberService>,
    req: HttpRequest,
    request: web::Json<CreateMemberRequest>,
) -> Result<HttpResponse> {
    let staff_id = match staff_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match member_service
        .create_member(staff_id, request.into_inner())
        .await
    {
        Ok(member) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": member
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/members/{member_id}",
    tag = "members",
    params(
        ("member_id" = i64, Path, description = "Member id")
    ),
    responses(
        (status = 200, description = "Member details", body = MemberResponse),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member(
    member_service: web::Data<MemberService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match member_service.get_member(path.into_inner()).await {
        Ok(member) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": member
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated members")
    )
)]
pub async fn list_members(
    member_service: web::Data<MemberService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match member_service.list_members(&query.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn members_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/members")
            .route("", web::post().to(create_member))
            .route("", web::get().to(list_members))
            .route("/{member_id}", web::get().to(get_member)),
    );
}
