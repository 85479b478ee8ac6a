pub mod auction;
pub mod balance;
pub mod common;
pub mod dues;
pub mod group;
pub mod ledger;
pub mod member;
pub mod pagination;
pub mod payment;
pub mod staff;

pub use auction::*;
pub use balance::*;
pub use common::*;
pub use dues::*;
pub use group::*;
pub use ledger::*;
pub use member::*;
pub use pagination::*;
pub use payment::*;
pub use staff::*;
