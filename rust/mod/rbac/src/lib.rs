//! RBAC module: users hold roles, roles grant permissions.
//!
//! # Resources
//!
//! - **Permission**: named capability, matched by slug
//! - **Role**: named permission set, matched by slug
//! - **RoleUser / RolePermission**: pivot rows linking the three
//!
//! [`Authorization`] wraps any [`Principal`] and answers `is` / `can`
//! questions from lazily loaded, per-instance caches. [`User`] is the
//! SQL-backed principal.
//!
//! # Usage
//!
//! ```ignore
//! use rbac::{Authorization, RbacConfig, User};
//!
//! let config = RbacConfig::load(path)?;
//! rbac::schema::init_schema(sql.as_ref(), &config.tables)?;
//!
//! let user = User::find(sql, config.tables, 7)?.expect("user");
//! let mut authz = Authorization::new(user);
//! authz.attach_role(&Role::with_slug("admin"))?;
//! assert!(authz.can("manage_users")?);
//! ```

pub mod authorization;
pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod principal;
pub mod schema;
pub mod user;

pub use authorization::Authorization;
pub use cache::Cached;
pub use config::{RbacConfig, Tables};
pub use error::RbacError;
pub use model::{Permission, Role, RoleColumn, RolePermission, RoleUser};
pub use principal::{PendingRoles, PivotFilter, Principal, Relation, RelationParams};
pub use user::User;
