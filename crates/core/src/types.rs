//! Domain types shared across the opsgate crates

mod action;
mod ids;
mod principal;

pub use action::ScaleAction;
pub use ids::{PrincipalId, RoleId};
pub use principal::{Principal, RequestContext};
