//! Authentication and authorization for opsgate.
//!
//! - [`SessionAuthority`] issues signed tokens and enforces one live session
//!   per principal through the credential store.
//! - [`Authenticator`] turns a username and password into a session.
//! - [`AccessGate`] wraps handlers with the allow-list, bearer authentication
//!   and permission check.

pub mod authenticator;
pub mod gate;
pub mod password;
pub mod session;

pub use authenticator::Authenticator;
pub use gate::{bearer_token, AccessGate};
pub use password::{hash_password, hash_password_with_cost, verify_password, DEFAULT_COST};
pub use session::{
    generate_seed_hex, signing_key_from_hex, Claims, SessionAuthority, Token, DEFAULT_ISSUER,
};
