use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::handlers::staff_id_from_request;
use crate::models::*;
use crate::services::PaymentService;

#[utoipa::path(
    post,
    path = "/payments",
    tag = "payments",
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Payment recorded and allocated", body = RecordPaymentResponse),
        (status = 400, description = "Invalid amount"),
        (status = 404, description = "Member or group not found")
    )
)]
pub async fn record_payment(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    request: web::Json<RecordPaymentRequest>,
) -> Result<HttpResponse> {
    let staff_id = match staff_id_from_request(&req) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match payment_service
        .record_payment(staff_id, request.into_inner())
        .await
    {
        Ok(response) => {
            let message = if response.is_member {
                "Payment recorded successfully".to_string()
            } else {
                "Payment recorded successfully (note: payer is not a member of this group)"
                    .to_string()
            };
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": response,
                "message": message
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payments",
    tag = "payments",
    params(
        ("member_id" = Option<i64>, Query, description = "Filter by member"),
        ("group_id" = Option<i64>, Query, description = "Filter by group"),
        ("group_month_id" = Option<i64>, Query, description = "Filter by month"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Paginated payments")
    )
)]
pub async fn list_payments(
    payment_service: web::Data<PaymentService>,
    query: web::Query<PaymentQuery>,
) -> Result<HttpResponse> {
    match payment_service.list_payments(&query.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payments/{payment_id}",
    tag = "payments",
    params(
        ("payment_id" = i64, Path, description = "Payment id")
    ),
    responses(
        (status = 200, description = "Payment details", body = PaymentResponse),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn get_payment(
    payment_service: web::Data<PaymentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match payment_service.get_payment(path.into_inner()).await {
        Ok(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payments_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("", web::post().to(record_payment))
            .route("", web::get().to(list_payments))
            .route("/{payment_id}", web::get().to(get_payment)),
    );
}
