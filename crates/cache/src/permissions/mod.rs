//! Role permission sets: resolution from the role/menu graph and the
//! read-through cache in front of it.

mod cache;
mod resolver;
mod set;


pub use cache::PermissionCache;
pub use resolver::{GraphPermissionResolver, PermissionResolver};
pub use set::PermissionSet;
