pub mod member_code;

pub use member_code::generate_unique_member_code;
