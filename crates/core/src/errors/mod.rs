//! Error types and result extensions for opsgate operations

mod builders;
mod display;
mod extensions;
mod types;


pub use extensions::*;
pub use types::{AuthFailure, Error, Result, StoreKind};
