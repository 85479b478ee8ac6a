use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateDuesResponse {
    pub group_id: i64,
    pub group_name: String,
    pub month_number: i32,
    pub group_month_id: i64,
    pub members_count: usize,
    pub entries_created: usize,
    /// members_count * monthly_amount, in minor units.
    pub total_dues_generated: i64,
}
