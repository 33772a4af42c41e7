//! Record types exercised by the harness

pub mod all_types;
pub mod flags;
pub mod guid_list;
pub mod point;
pub mod sub_type;
pub mod user_auth;

pub use all_types::AllTypes;
pub use flags::{FlagsEnum, TypeWithFlagsEnum};
pub use guid_list::WithAListOfGuids;
pub use point::Point;
pub use sub_type::SubType;
pub use user_auth::{Company, UserAuth};
