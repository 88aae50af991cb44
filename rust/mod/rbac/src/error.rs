use rbac_sql::SQLError;
use thiserror::Error;

/// Errors surfaced by the rbac module.
///
/// Membership misses and redundant attaches are not errors; they come back
/// as `Ok(false)` / `Ok(true)`.
#[derive(Debug, Error)]
pub enum RbacError {
    /// Any failure reported by the storage collaborator, passed through as-is.
    #[error("storage: {0}")]
    Storage(#[from] SQLError),

    /// A result row could not be turned into a model.
    #[error("hydration: {0}")]
    Hydration(String),

    #[error("config: {0}")]
    Config(String),
}
