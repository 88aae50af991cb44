use std::fmt;
use std::sync::Arc;

use rbac_sql::{Direction, QueryBuilder, Row, SQLStore, Statement, Value};
use tracing::{debug, warn};

use crate::config::Tables;
use crate::error::RbacError;
use crate::model::RoleColumn;
use crate::principal::{PendingRoles, PivotFilter, Principal, Relation, RelationParams};

/// A user row bound to the store it was loaded from.
pub struct User {
    id: i64,
    name: String,
    email: Option<String>,
    dirty: bool,
    sql: Arc<dyn SQLStore>,
    tables: Tables,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl User {
    /// Insert a new user.
    pub fn create(
        sql: Arc<dyn SQLStore>,
        tables: Tables,
        name: &str,
        email: Option<&str>,
    ) -> Result<Self, RbacError> {
        let stmt = format!(
            "INSERT INTO {} (name, email) VALUES (?1, ?2) RETURNING id",
            tables.users
        );
        let email_value = email.map_or(Value::Null, Value::from);
        let rows = sql.query(&stmt, &[Value::from(name), email_value])?;
        let id = rows
            .first()
            .and_then(|r| r.get_i64("id"))
            .ok_or_else(|| RbacError::Hydration("insert returned no id".into()))?;

        debug!(user_id = id, "created user");
        Ok(Self {
            id,
            name: name.to_string(),
            email: email.map(str::to_string),
            dirty: false,
            sql,
            tables,
        })
    }

    /// Load a user by id. `Ok(None)` if there is no such user.
    pub fn find(
        sql: Arc<dyn SQLStore>,
        tables: Tables,
        id: i64,
    ) -> Result<Option<Self>, RbacError> {
        let stmt = format!("SELECT id, name, email FROM {} WHERE id = ?1", tables.users);
        let rows = sql.query(&stmt, &[Value::Integer(id)])?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };

        Ok(Some(Self {
            id,
            name: row.get_str("name").unwrap_or_default().to_string(),
            email: row.get_str("email").map(str::to_string),
            dirty: false,
            sql,
            tables,
        }))
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.dirty = true;
    }

    pub fn set_email(&mut self, email: Option<String>) {
        self.email = email;
        self.dirty = true;
    }

    /// Whether there are column changes not yet persisted.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Persist column changes without touching roles.
    pub fn save(&mut self) -> Result<bool, RbacError> {
        self.persist(PendingRoles::default())
    }

    /// Slugs in `pending` that match no stored role.
    pub fn unknown_roles(&self, pending: &PendingRoles) -> Result<Vec<String>, RbacError> {
        if pending.is_empty() {
            return Ok(Vec::new());
        }
        let slugs: Vec<Value> = pending
            .roles()
            .iter()
            .map(|r| Value::from(r.slug.as_str()))
            .collect();
        let rows = QueryBuilder::new()
            .columns(&["slug"])
            .from(&self.tables.roles, None)
            .in_where("slug", slugs)
            .execute(self.sql.as_ref())?;

        Ok(pending
            .roles()
            .iter()
            .filter(|r| !rows.iter().any(|row| row.get_str("slug") == Some(r.slug.as_str())))
            .map(|r| r.slug.clone())
            .collect())
    }

    fn roles_query(&self, params: &RelationParams) -> QueryBuilder {
        let mut query = QueryBuilder::new()
            .columns(&[
                "r.id AS id",
                "r.name AS name",
                "r.slug AS slug",
                "r.description AS description",
            ])
            .from(&self.tables.role_users, Some("ru"))
            .join(&self.tables.roles, "ru.role_id = r.id", Some("r"))
            .where_eq("ru.user_id", Value::Integer(self.id));

        let (column, direction) = params
            .order_by
            .unwrap_or((RoleColumn::Id, Direction::Asc));
        query = query.order_by(&format!("r.{}", column.as_str()), direction);
        paginate(query, params)
    }

    fn pivot_query(&self, params: &RelationParams) -> QueryBuilder {
        let query = QueryBuilder::new()
            .columns(&["user_id", "role_id"])
            .from(&self.tables.role_users, None)
            .where_eq("user_id", Value::Integer(self.id))
            .order_by("role_id", Direction::Asc);
        paginate(query, params)
    }
}

fn paginate(mut query: QueryBuilder, params: &RelationParams) -> QueryBuilder {
    if let Some(limit) = params.limit {
        query = query.limit(limit);
    }
    if let Some(offset) = params.offset {
        query = query.offset(offset);
    }
    query
}

impl Principal for User {
    fn principal_id(&self) -> i64 {
        self.id
    }

    fn tables(&self) -> &Tables {
        &self.tables
    }

    fn load_related(
        &self,
        relation: Relation,
        params: &RelationParams,
    ) -> Result<Vec<Row>, RbacError> {
        debug!(user_id = self.id, relation = relation.name(), "loading relation");
        let query = match relation {
            Relation::Roles => self.roles_query(params),
            Relation::RolesPivot => self.pivot_query(params),
        };
        self.execute(&query)
    }

    fn execute(&self, query: &QueryBuilder) -> Result<Vec<Row>, RbacError> {
        Ok(query.execute(self.sql.as_ref())?)
    }

    fn persist(&mut self, pending: PendingRoles) -> Result<bool, RbacError> {
        if self.name.trim().is_empty() {
            warn!(user_id = self.id, "refusing to save user with empty name");
            return Ok(false);
        }

        let mut batch = Vec::with_capacity(pending.len() + 1);
        if self.dirty {
            batch.push(Statement::new(
                format!("UPDATE {} SET name = ?1, email = ?2 WHERE id = ?3", self.tables.users),
                vec![
                    Value::from(self.name.as_str()),
                    self.email.as_deref().map_or(Value::Null, Value::from),
                    Value::Integer(self.id),
                ],
            ));
        }

        for slug in self.unknown_roles(&pending)? {
            warn!(user_id = self.id, role = %slug, "staged role does not exist, not attached");
        }

        // Roles are matched by slug, so the staged value's id is never trusted.
        let attach = format!(
            "INSERT OR IGNORE INTO {} (user_id, role_id) SELECT ?1, id FROM {} WHERE slug = ?2",
            self.tables.role_users, self.tables.roles
        );
        for role in pending.roles() {
            batch.push(Statement::new(
                attach.clone(),
                vec![Value::Integer(self.id), Value::from(role.slug.as_str())],
            ));
        }

        let affected = self.sql.exec_batch(&batch)?;
        self.dirty = false;
        debug!(
            user_id = self.id,
            staged = pending.len(),
            affected,
            "persisted user"
        );
        Ok(true)
    }

    fn delete_pivot_rows(&self, filter: PivotFilter) -> Result<u64, RbacError> {
        let deleted = match &filter {
            PivotFilter::All => self.sql.exec(
                &format!("DELETE FROM {} WHERE user_id = ?1", self.tables.role_users),
                &[Value::Integer(self.id)],
            )?,
            PivotFilter::RoleSlug(slug) => self.sql.exec(
                &format!(
                    "DELETE FROM {} WHERE user_id = ?1 AND role_id IN (SELECT id FROM {} WHERE slug = ?2)",
                    self.tables.role_users, self.tables.roles
                ),
                &[Value::Integer(self.id), Value::from(slug.as_str())],
            )?,
        };
        debug!(user_id = self.id, ?filter, deleted, "deleted pivot rows");
        Ok(deleted)
    }
}
