pub mod auctions;
pub mod balance_snapshots;
pub mod bids;
pub mod group_members;
pub mod group_months;
pub mod groups;
pub mod ledger_entries;
pub mod members;
pub mod payments;
pub mod staff;

pub use auctions as auction_entity;
pub use balance_snapshots as balance_snapshot_entity;
pub use bids as bid_entity;
pub use group_members as group_member_entity;
pub use group_months as group_month_entity;
pub use groups as group_entity;
pub use ledger_entries as ledger_entry_entity;
pub use members as member_entity;
pub use payments as payment_entity;
pub use staff as staff_entity;

pub use auctions::AuctionStatus;
pub use bids::BidStatus;
pub use group_months::MonthStatus;
pub use ledger_entries::{EntryKind, LedgerSource};
pub use payments::PaymentMode;
pub use staff::StaffRole;
