//! Core domain types, errors, and constants for opsgate.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum, the `AuthFailure` reason taxonomy and the
//!   `Result` alias shared by every crate in the workspace.
//! - **`types`**: identifier newtypes, `Principal`, `RequestContext` and the
//!   `ScaleAction` enum.
//! - **`directory`**: read-only traits over the relational store (users,
//!   menus, role-menu links) and an in-memory implementation.
//! - **`constants`**: session lifetime, cache key layout and batch defaults.

pub mod constants;
pub mod directory;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    directory::{
        InMemoryDirectory, MenuRecord, PermissionGraph, PrincipalDirectory, RoleMenuLink,
        UserRecord,
    },
    errors::{AuthFailure, Error, Result, ResultExt, StoreKind},
    types::*,
};
