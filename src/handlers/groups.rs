use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::handlers::staff_id_from_request;
use crate::models::*;
use crate::services::GroupService;

#[utoipa::path(
    post,
    path = "/groups",
    tag = "groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 200, description = "Group created", body = GroupResponse),
        (status = 400, description = "Invalid amounts or duration")
    )
)]
pub async fn create_group(
    group_service: web::Data<GroupService>,
    req: HttpRequest,
    request: web::Json<CreateGroupRequest>,
) -> Result<HttpResponse> {
    let staff_id = match staff_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match group_service
        .create_group(staff_id, request.into_inner())
        .await
    {
        Ok(group) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": group
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/groups/{group_id}",
    tag = "groups",
    params(
        ("group_id" = i64, Path, description = "Group id")
    ),
    responses(
        (status = 200, description = "Group details", body = GroupResponse),
        (status = 404, description = "Group not found")
    )
)]
pub async fn get_group(
    group_service: web::Data<GroupService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match group_service.get_group(path.into_inner()).await {
        Ok(group) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": group
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/groups/{group_id}/members",
    tag = "groups",
    params(
        ("group_id" = i64, Path, description = "Group id")
    ),
    request_body = AddGroupMemberRequest,
    responses(
        (status = 200, description = "Member assigned to slot", body = GroupMemberResponse),
        (status = 409, description = "Slot already taken")
    )
)]
pub async fn add_group_member(
    group_service: web::Data<GroupService>,
    path: web::Path<i64>,
    request: web::Json<AddGroupMemberRequest>,
) -> Result<HttpResponse> {
    match group_service
        .add_member(path.into_inner(), request.into_inner())
        .await
    {
        Ok(membership) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": membership
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/groups/{group_id}/members",
    tag = "groups",
    params(
        ("group_id" = i64, Path, description = "Group id")
    ),
    responses(
        (status = 200, description = "Group roster ordered by slot")
    )
)]
pub async fn list_group_members(
    group_service: web::Data<GroupService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match group_service.list_group_members(path.into_inner()).await {
        Ok(members) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": members
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/groups/{group_id}/months",
    tag = "groups",
    params(
        ("group_id" = i64, Path, description = "Group id")
    ),
    responses(
        (status = 200, description = "Group months ordered by month number")
    )
)]
pub async fn list_group_months(
    group_service: web::Data<GroupService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match group_service.list_group_months(path.into_inner()).await {
        Ok(months) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": months
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn groups_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/groups")
            .route("", web::post().to(create_group))
            .route("/{group_id}", web::get().to(get_group))
            .route("/{group_id}/members", web::post().to(add_group_member))
            .route("/{group_id}/members", web::get().to(list_group_members))
            .route("/{group_id}/months", web::get().to(list_group_months)),
    );
}
