mod hydrate;
mod permission;
mod pivot;
mod role;

pub use hydrate::*;
pub use permission::*;
pub use pivot::*;
pub use role::*;
