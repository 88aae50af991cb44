//! The storage-facing contract a principal (the entity roles are attached
//! to) has to fulfil before it can be wrapped in an
//! [`Authorization`](crate::Authorization).

use rbac_sql::{Direction, QueryBuilder, Row};

use crate::config::Tables;
use crate::error::RbacError;
use crate::model::{Role, RoleColumn};

/// Relations a principal declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Many-to-many: principal -> roles, through the user/role pivot.
    Roles,
    /// One-to-many: principal -> its own pivot rows.
    RolesPivot,
}

impl Relation {
    pub fn name(&self) -> &'static str {
        match self {
            Relation::Roles => "roles",
            Relation::RolesPivot => "rolesPivot",
        }
    }
}

/// Filter and sort parameters passed through to the relation load.
#[derive(Debug, Clone, Default)]
pub struct RelationParams {
    pub order_by: Option<(RoleColumn, Direction)>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl RelationParams {
    /// No ordering and no paging: the load returns every related row.
    pub fn is_unfiltered(&self) -> bool {
        self.order_by.is_none() && self.limit.is_none() && self.offset.is_none()
    }

    pub fn order_by(mut self, column: RoleColumn, direction: Direction) -> Self {
        self.order_by = Some((column, direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Roles staged for the next [`Principal::persist`].
#[derive(Debug, Clone, Default)]
pub struct PendingRoles {
    roles: Vec<Role>,
}

impl PendingRoles {
    pub fn new(roles: Vec<Role>) -> Self {
        Self { roles }
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }
}

/// Which pivot rows a delete removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PivotFilter {
    All,
    /// Rows whose role carries this slug.
    RoleSlug(String),
}

/// Storage operations the authorization component needs from its host entity.
pub trait Principal {
    /// Identity, used for pivot rows and logging.
    fn principal_id(&self) -> i64;

    fn tables(&self) -> &Tables;

    /// Fetch rows for a declared relation.
    fn load_related(
        &self,
        relation: Relation,
        params: &RelationParams,
    ) -> Result<Vec<Row>, RbacError>;

    /// Start a free-form query against the principal's store.
    fn query_builder(&self) -> QueryBuilder {
        QueryBuilder::new()
    }

    fn execute(&self, query: &QueryBuilder) -> Result<Vec<Row>, RbacError>;

    /// Commit the staged roles together with any other dirty state in one
    /// transaction. `Ok(false)` means the principal refused to save.
    fn persist(&mut self, pending: PendingRoles) -> Result<bool, RbacError>;

    /// Remove this principal's pivot rows. Returns the number removed.
    fn delete_pivot_rows(&self, filter: PivotFilter) -> Result<u64, RbacError>;
}
