use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Staff {
    Table,
    Id,
    Name,
    Phone,
    Email,
    Role,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
    MemberCode,
    Name,
    Phone,
    Email,
    Address,
    IsActive,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Groups {
    Table,
    Id,
    Name,
    TotalAmount,
    MonthlyAmount,
    TotalMonths,
    StartDate,
    IsActive,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GroupMembers {
    Table,
    Id,
    GroupId,
    MemberId,
    SlotNumber,
    IsActive,
    JoinedAt,
}

#[derive(DeriveIden)]
enum GroupMonths {
    Table,
    Id,
    GroupId,
    MonthNumber,
    AuctionDate,
    WinnerMemberId,
    PayoutAmount,
    DividendPerMember,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Auctions {
    Table,
    Id,
    GroupMonthId,
    AuctionDate,
    Status,
    WinningBidAmount,
    WinnerMemberId,
    DividendPerMember,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Bids {
    Table,
    Id,
    AuctionId,
    MemberId,
    Amount,
    Status,
    Notes,
    BidTime,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    ReceiptNumber,
    MemberId,
    GroupId,
    GroupMonthId,
    Amount,
    Mode,
    Notes,
    CollectedBy,
    PaymentDate,
}

#[derive(DeriveIden)]
enum LedgerEntries {
    Table,
    Id,
    MemberId,
    GroupId,
    GroupMonthId,
    Kind,
    Amount,
    Source,
    ReferenceId,
    ReferenceType,
    Notes,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BalanceSnapshots {
    Table,
    Id,
    MemberId,
    GroupId,
    TotalDue,
    TotalPaid,
    Pending,
    Advance,
    MonthsDue,
    MonthsPaid,
    MonthsPartial,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Staff::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Staff::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Staff::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Staff::Phone).string_len(15).not_null().unique_key())
                    .col(ColumnDef::new(Staff::Email).string_len(100).null())
                    .col(
                        ColumnDef::new(Staff::Role)
                            .string_len(16)
                            .not_null()
                            .default("staff"),
                    )
                    .col(ColumnDef::new(Staff::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Staff::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("CURRENT_TIMESTAMP"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Members::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Members::MemberCode)
                            .string_len(10)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Members::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Members::Phone).string_len(15).not_null().unique_key())
                    .col(ColumnDef::new(Members::Email).string_len(100).null())
                    .col(ColumnDef::new(Members::Address).text().null())
                    .col(ColumnDef::new(Members::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Members::CreatedBy).big_integer().null())
                    .col(
                        ColumnDef::new(Members::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("CURRENT_TIMESTAMP"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Groups::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Groups::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Groups::TotalAmount).big_integer().not_null())
                    .col(ColumnDef::new(Groups::MonthlyAmount).big_integer().not_null())
                    .col(ColumnDef::new(Groups::TotalMonths).integer().not_null())
                    .col(ColumnDef::new(Groups::StartDate).date().null())
                    .col(ColumnDef::new(Groups::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Groups::CreatedBy).big_integer().null())
                    .col(
                        ColumnDef::new(Groups::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("CURRENT_TIMESTAMP"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GroupMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupMembers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupMembers::GroupId).big_integer().not_null())
                    .col(ColumnDef::new(GroupMembers::MemberId).big_integer().not_null())
                    .col(ColumnDef::new(GroupMembers::SlotNumber).integer().not_null())
                    .col(
                        ColumnDef::new(GroupMembers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(GroupMembers::JoinedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("CURRENT_TIMESTAMP"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // one member per slot, one slot per member
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_group_members_slot")
                    .table(GroupMembers::Table)
                    .col(GroupMembers::GroupId)
                    .col(GroupMembers::SlotNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_group_members_member")
                    .table(GroupMembers::Table)
                    .col(GroupMembers::GroupId)
                    .col(GroupMembers::MemberId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GroupMonths::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupMonths::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupMonths::GroupId).big_integer().not_null())
                    .col(ColumnDef::new(GroupMonths::MonthNumber).integer().not_null())
                    .col(ColumnDef::new(GroupMonths::AuctionDate).date().null())
                    .col(ColumnDef::new(GroupMonths::WinnerMemberId).big_integer().null())
                    .col(ColumnDef::new(GroupMonths::PayoutAmount).big_integer().null())
                    .col(ColumnDef::new(GroupMonths::DividendPerMember).big_integer().null())
                    .col(
                        ColumnDef::new(GroupMonths::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(GroupMonths::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("CURRENT_TIMESTAMP"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_group_months_number")
                    .table(GroupMonths::Table)
                    .col(GroupMonths::GroupId)
                    .col(GroupMonths::MonthNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Auctions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Auctions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Auctions::GroupMonthId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Auctions::AuctionDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Auctions::Status)
                            .string_len(16)
                            .not_null()
                            .default("scheduled"),
                    )
                    .col(ColumnDef::new(Auctions::WinningBidAmount).big_integer().null())
                    .col(ColumnDef::new(Auctions::WinnerMemberId).big_integer().null())
                    .col(ColumnDef::new(Auctions::DividendPerMember).big_integer().null())
                    .col(
                        ColumnDef::new(Auctions::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("CURRENT_TIMESTAMP"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Auctions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("CURRENT_TIMESTAMP"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bids::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bids::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bids::AuctionId).big_integer().not_null())
                    .col(ColumnDef::new(Bids::MemberId).big_integer().not_null())
                    .col(ColumnDef::new(Bids::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Bids::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Bids::Notes).string_len(500).null())
                    .col(
                        ColumnDef::new(Bids::BidTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bids_auction_id")
                    .table(Bids::Table)
                    .col(Bids::AuctionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Payments::ReceiptNumber)
                            .string_len(36)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Payments::MemberId).big_integer().not_null())
                    .col(ColumnDef::new(Payments::GroupId).big_integer().not_null())
                    .col(ColumnDef::new(Payments::GroupMonthId).big_integer().null())
                    .col(ColumnDef::new(Payments::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Payments::Mode)
                            .string_len(16)
                            .not_null()
                            .default("cash"),
                    )
                    .col(ColumnDef::new(Payments::Notes).text().null())
                    .col(ColumnDef::new(Payments::CollectedBy).big_integer().not_null())
                    .col(
                        ColumnDef::new(Payments::PaymentDate)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("CURRENT_TIMESTAMP"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payments_member_group")
                    .table(Payments::Table)
                    .col(Payments::MemberId)
                    .col(Payments::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerEntries::MemberId).big_integer().not_null())
                    .col(ColumnDef::new(LedgerEntries::GroupId).big_integer().not_null())
                    .col(ColumnDef::new(LedgerEntries::GroupMonthId).big_integer().null())
                    .col(ColumnDef::new(LedgerEntries::Kind).string_len(8).not_null())
                    .col(ColumnDef::new(LedgerEntries::Amount).big_integer().not_null())
                    .col(ColumnDef::new(LedgerEntries::Source).string_len(16).not_null())
                    .col(ColumnDef::new(LedgerEntries::ReferenceId).big_integer().null())
                    .col(ColumnDef::new(LedgerEntries::ReferenceType).string_len(50).null())
                    .col(ColumnDef::new(LedgerEntries::Notes).text().null())
                    .col(ColumnDef::new(LedgerEntries::CreatedBy).big_integer().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ledger_member_group")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::MemberId)
                    .col(LedgerEntries::GroupId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ledger_group_month")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::GroupMonthId)
                    .to_owned(),
            )
            .await?;

        // Storage-level idempotency guard: at most one monthly due debit per
        // member per group month, even under concurrent generation.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_ledger_monthly_due \
                 ON ledger_entries (member_id, group_month_id) \
                 WHERE source = 'monthly_due'",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BalanceSnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BalanceSnapshots::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BalanceSnapshots::MemberId).big_integer().not_null())
                    .col(ColumnDef::new(BalanceSnapshots::GroupId).big_integer().not_null())
                    .col(
                        ColumnDef::new(BalanceSnapshots::TotalDue)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::TotalPaid)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::Pending)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::Advance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::MonthsDue)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::MonthsPaid)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::MonthsPartial)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BalanceSnapshots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("CURRENT_TIMESTAMP"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // one snapshot row per member per group
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_balance_member_group")
                    .table(BalanceSnapshots::Table)
                    .col(BalanceSnapshots::MemberId)
                    .col(BalanceSnapshots::GroupId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        Ok(())
    }
}
