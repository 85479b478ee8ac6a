pub mod auction_service;
pub mod balance_service;
pub mod dues_service;
pub mod group_service;
pub mod ledger_service;
pub mod member_service;
pub mod payment_service;
pub mod staff_service;

pub use auction_service::*;
pub use balance_service::*;
pub use dues_service::*;
pub use group_service::*;
pub use ledger_service::*;
pub use member_service::*;
pub use payment_service::*;
pub use staff_service::*;
