pub mod accounts;
pub mod auctions;
pub mod groups;
pub mod members;
pub mod payments;
pub mod staff;

pub use accounts::accounts_config;
pub use auctions::auctions_config;
pub use groups::groups_config;
pub use members::members_config;
pub use payments::payments_config;
pub use staff::staff_config;

use crate::error::AppError;
use actix_web::HttpRequest;

/// The acting staff member is conveyed by the X-Staff-Id header; the real
/// authentication layer sits in front of this service.
pub fn staff_id_from_request(req: &HttpRequest) -> Result<i64, AppError> {
    req.headers()
        .get("X-Staff-Id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .ok_or_else(|| AppError::ValidationError("Missing or invalid X-Staff-Id header".into()))
}
