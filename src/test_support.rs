//! Shared fixtures for service tests: an in-memory SQLite database with the
//! full schema applied, plus a seeded staff/group/member roster.

use crate::entities::{
    group_entity as groups, group_member_entity as group_members, member_entity as members,
    staff_entity as staff, StaffRole,
};
use chrono::Utc;
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

/// Pool total: 1,00,000.00 in minor units.
pub const TOTAL_AMOUNT: i64 = 10_000_000;
pub const TOTAL_MONTHS: i32 = 20;
/// Monthly contribution: total / months.
pub const MONTHLY_AMOUNT: i64 = TOTAL_AMOUNT / TOTAL_MONTHS as i64;

pub struct TestContext {
    pub pool: DatabaseConnection,
    pub admin_id: i64,
    pub staff_id: i64,
    pub group_id: i64,
    pub member_ids: Vec<i64>,
}

impl TestContext {
    /// Fresh database with one group of `member_count` members in slots
    /// 1..=member_count, one admin and one regular staff account.
    pub async fn new(member_count: usize) -> Self {
        // A single connection keeps every query on the same in-memory
        // database.
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let pool = Database::connect(options)
            .await
            .expect("connect to in-memory sqlite");
        migration::Migrator::up(&pool, None)
            .await
            .expect("run migrations");

        let admin = staff::ActiveModel {
            name: Set("Admin".to_string()),
            phone: Set("1000000001".to_string()),
            email: Set(None),
            role: Set(StaffRole::Admin),
            is_active: Set(true),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&pool)
        .await
        .expect("seed admin");

        let collector = staff::ActiveModel {
            name: Set("Collector".to_string()),
            phone: Set("1000000002".to_string()),
            email: Set(None),
            role: Set(StaffRole::Staff),
            is_active: Set(true),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&pool)
        .await
        .expect("seed collector");

        let group = groups::ActiveModel {
            name: Set("Test Group".to_string()),
            total_amount: Set(TOTAL_AMOUNT),
            monthly_amount: Set(MONTHLY_AMOUNT),
            total_months: Set(TOTAL_MONTHS),
            start_date: Set(None),
            is_active: Set(true),
            created_by: Set(Some(admin.id)),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&pool)
        .await
        .expect("seed group");

        let mut ctx = Self {
            pool,
            admin_id: admin.id,
            staff_id: collector.id,
            group_id: group.id,
            member_ids: Vec::new(),
        };

        for i in 0..member_count {
            let member_id = ctx
                .create_member(&format!("Member {}", i + 1), &format!("200000000{i}"))
                .await;
            ctx.add_to_group(member_id, i as i32 + 1).await;
            ctx.member_ids.push(member_id);
        }

        ctx
    }

    /// Create a member without any group membership.
    pub async fn create_member(&self, name: &str, phone: &str) -> i64 {
        let member = members::ActiveModel {
            member_code: Set(phone.to_string()),
            name: Set(name.to_string()),
            phone: Set(phone.to_string()),
            email: Set(None),
            address: Set(None),
            is_active: Set(true),
            created_by: Set(Some(self.admin_id)),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .expect("seed member");
        member.id
    }

    pub async fn add_to_group(&self, member_id: i64, slot_number: i32) {
        group_members::ActiveModel {
            group_id: Set(self.group_id),
            member_id: Set(member_id),
            slot_number: Set(slot_number),
            is_active: Set(true),
            joined_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .expect("seed membership");
    }

    /// Generate monthly dues for the seeded group as the admin.
    pub async fn generate_dues(&self, month_number: i32) {
        crate::services::DuesService::new(self.pool.clone())
            .generate_dues(self.admin_id, self.group_id, month_number)
            .await
            .expect("generate dues");
    }
}
