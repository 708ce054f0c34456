use opsgate_core::PERMISSION_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The effective permission strings of one role.
///
/// Ordered so the cached representation is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a permission; blank strings are ignored
    pub fn insert(&mut self, permission: impl AsRef<str>) -> bool {
        let permission = permission.as_ref().trim();
        if permission.is_empty() {
            return false;
        }
        self.0.insert(permission.to_string())
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Comma-joined form stored in the cache; the empty set is `""`
    pub fn to_cache_value(&self) -> String {
        let mut out = String::new();
        for (i, permission) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(PERMISSION_SEPARATOR);
            }
            out.push_str(permission);
        }
        out
    }

    pub fn from_cache_value(value: &str) -> Self {
        value.split(PERMISSION_SEPARATOR).collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = PermissionSet::new();
        for permission in iter {
            set.insert(permission);
        }
        set
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.to_cache_value())
    }
}
