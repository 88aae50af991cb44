use serde::{Deserialize, Serialize};

/// Pivot row linking a user to a role. Unique per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleUser {
    pub user_id: i64,
    pub role_id: i64,
}

/// Pivot row linking a role to a permission. Unique per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RolePermission {
    pub role_id: i64,
    pub permission_id: i64,
}
