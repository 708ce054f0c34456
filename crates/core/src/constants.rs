/// Constants used throughout the opsgate codebase
use std::time::Duration;

// Session lifetime, shared by tokens, credential entries and cached permission sets
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

// Role that always resolves to the full permission universe
pub const SUPER_ADMIN_ROLE_ID: u64 = 1;

// Cache key layout
pub const TOKEN_KEY_PREFIX: &str = "token";
pub const ROLE_PERMISSIONS_KEY_PREFIX: &str = "role";
pub const ROLE_PERMISSIONS_KEY_SUFFIX: &str = "permissions";

// Serialized permission set separator
pub const PERMISSION_SEPARATOR: char = ',';

// Authorization header scheme
pub const BEARER_SCHEME: &str = "Bearer";

// Operations reachable without authentication
pub const DEFAULT_PUBLIC_OPERATIONS: &[&str] = &[
    "/api/system/user/login",
    "/api/system/user/logout",
    "/api/system/user/create",
];

// Batch orchestration defaults
pub const DEFAULT_MAX_CONCURRENT: usize = 5;
pub const DEFAULT_DISPATCH_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Desired replica counts per action
pub const SCALE_UP_REPLICAS: i32 = 1;
pub const SCALE_DOWN_REPLICAS: i32 = 0;

// Audit timestamp layout
pub const AUDIT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Environment variable names
pub const OPSGATE_LOG_VAR: &str = "OPSGATE_LOG";
pub const OPSGATE_CONFIG_VAR: &str = "OPSGATE_CONFIG";
