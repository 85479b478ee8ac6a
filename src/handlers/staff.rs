use actix_web::{web, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::models::*;
use crate::services::StaffService;

#[utoipa::path(
    post,
    path = "/staff",
    tag = "staff",
    request_body = CreateStaffRequest,
    responses(
        (status = 200, description = "Staff account created", body = StaffResponse),
        (status = 409, description = "Phone already registered")
    )
)]
pub async fn create_staff(
    staff_service: web::Data<StaffService>,
    request: web::Json<CreateStaffRequest>,
) -> Result<HttpResponse> {
    match staff_service.create_staff(request.into_inner()).await {
        Ok(staff) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": staff
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/staff/{staff_id}",
    tag = "staff",
    params(
        ("staff_id" = i64, Path, description = "Staff id")
    ),
    responses(
        (status = 200, description = "Staff details", body = StaffResponse),
        (status = 404, description = "Staff not found")
    )
)]
pub async fn get_staff(
    staff_service: web::Data<StaffService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match staff_service.get_staff(path.into_inner()).await {
        Ok(staff) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": staff
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn staff_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/staff")
            .route("", web::post().to(create_staff))
            .route("/{staff_id}", web::get().to(get_staff)),
    );
}
