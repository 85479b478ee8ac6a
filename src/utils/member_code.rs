use crate::entities::member_entity as members;
use crate::error::AppResult;
use rand::Rng;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

/// Generate a unique 10-digit member code.
pub async fn generate_unique_member_code(pool: &DatabaseConnection) -> AppResult<String> {
    loop {
        let member_code = {
            let mut rng = rand::thread_rng();
            rng.gen_range(1000000001_u64..=9999999999_u64).to_string()
        };

        let exists = members::Entity::find()
            .filter(members::Column::MemberCode.eq(member_code.clone()))
            .count(pool)
            .await?;

        if exists == 0 {
            return Ok(member_code);
        }
    }
}
