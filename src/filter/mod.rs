pub mod types;
pub mod filter;

pub use types::*;
pub use filter::{contains_any, filter_eligible_roles};
