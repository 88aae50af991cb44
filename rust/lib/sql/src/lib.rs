//! Storage layer for the rbac module: a minimal SQL execution trait, an
//! embedded SQLite backend and a small query builder.

pub mod builder;
pub mod error;
pub mod sqlite;
pub mod traits;

pub use builder::{Direction, QueryBuilder};
pub use error::SQLError;
pub use sqlite::SqliteStore;
pub use traits::{Row, SQLStore, Statement, Value};
