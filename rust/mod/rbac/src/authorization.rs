use std::borrow::Cow;

use rbac_sql::Value;
use tracing::{debug, info};

use crate::cache::Cached;
use crate::error::RbacError;
use crate::model::{hydrate, Permission, Role};
use crate::principal::{PendingRoles, PivotFilter, Principal, Relation, RelationParams};

/// Role and permission checks for a principal.
///
/// Roles and permissions are loaded on first use and kept for the lifetime
/// of this value. Attach and detach drop both caches once storage confirms
/// the change; permissions are derived from roles, so they go together.
///
/// Not synchronized. Share across threads behind your own lock.
#[derive(Debug)]
pub struct Authorization<P: Principal> {
    principal: P,
    roles: Cached<Vec<Role>>,
    permissions: Cached<Vec<Permission>>,
}

impl<P: Principal> Authorization<P> {
    pub fn new(principal: P) -> Self {
        Self {
            principal,
            roles: Cached::Unloaded,
            permissions: Cached::Unloaded,
        }
    }

    pub fn principal(&self) -> &P {
        &self.principal
    }

    /// Mutable access to the principal. Role changes made this way bypass
    /// the caches; call [`refresh`](Self::refresh) afterwards.
    pub fn principal_mut(&mut self) -> &mut P {
        &mut self.principal
    }

    pub fn into_inner(self) -> P {
        self.principal
    }

    /// Drop cached roles and permissions.
    pub fn refresh(&mut self) {
        self.roles.invalidate();
        self.permissions.invalidate();
    }

    /// Roles held by the principal.
    ///
    /// Only the full, unfiltered set is cached. Ordered or paged requests
    /// go to storage every time and leave the cache alone, so membership
    /// checks never see a partial set.
    pub fn roles(&mut self, params: &RelationParams) -> Result<Cow<'_, [Role]>, RbacError> {
        if params.is_unfiltered() {
            return Ok(Cow::Borrowed(self.held_roles()?));
        }
        Ok(Cow::Owned(load_roles(&self.principal, params)?))
    }

    fn held_roles(&mut self) -> Result<&[Role], RbacError> {
        let principal = &self.principal;
        self.roles
            .try_fill(|| load_roles(principal, &RelationParams::default()))?;
        Ok(self.roles.get().map(Vec::as_slice).unwrap_or_default())
    }

    /// Distinct permissions granted by any held role.
    ///
    /// One query for the roles (unless cached) and one for all of their
    /// permissions together.
    pub fn permissions(&mut self) -> Result<&[Permission], RbacError> {
        if !self.permissions.is_loaded() {
            let role_ids: Vec<Value> = self
                .held_roles()?
                .iter()
                .map(|r| Value::Integer(r.id))
                .collect();
            let permissions = self.load_permissions(role_ids)?;
            self.permissions = Cached::Loaded(permissions);
        }
        Ok(self.permissions.get().map(Vec::as_slice).unwrap_or_default())
    }

    fn load_permissions(&self, role_ids: Vec<Value>) -> Result<Vec<Permission>, RbacError> {
        let tables = self.principal.tables();
        let query = self
            .principal
            .query_builder()
            .distinct()
            .columns(&[
                "p.id AS id",
                "p.name AS name",
                "p.slug AS slug",
                "p.description AS description",
            ])
            .from(&tables.role_permissions, Some("rp"))
            .join(&tables.permissions, "rp.permission_id = p.id", Some("p"))
            .in_where("rp.role_id", role_ids);

        let permissions: Vec<Permission> = hydrate(self.principal.execute(&query)?)?;
        debug!(
            principal_id = self.principal.principal_id(),
            count = permissions.len(),
            "loaded permissions"
        );
        Ok(permissions)
    }

    /// Whether the principal holds a role with this slug.
    pub fn is(&mut self, role_slug: &str) -> Result<bool, RbacError> {
        self.has_role(&Role::with_slug(role_slug))
    }

    /// Whether the principal holds a role with the same slug as `role`.
    pub fn has_role(&mut self, role: &Role) -> Result<bool, RbacError> {
        let held = self
            .held_roles()?
            .iter()
            .any(|r| r.same_slug(role));
        debug!(
            principal_id = self.principal.principal_id(),
            role = %role.slug,
            held,
            "role check"
        );
        Ok(held)
    }

    /// Whether any held role grants a permission with this slug.
    pub fn can(&mut self, permission_slug: &str) -> Result<bool, RbacError> {
        self.has_permission(&Permission::with_slug(permission_slug))
    }

    /// Alias for [`can`](Self::can).
    pub fn is_allowed(&mut self, permission_slug: &str) -> Result<bool, RbacError> {
        self.can(permission_slug)
    }

    pub fn has_permission(&mut self, permission: &Permission) -> Result<bool, RbacError> {
        let granted = self
            .permissions()?
            .iter()
            .any(|p| p.same_slug(permission));
        debug!(
            principal_id = self.principal.principal_id(),
            permission = %permission.slug,
            granted,
            "permission check"
        );
        Ok(granted)
    }

    /// Attach a role. Already holding a role with that slug is a successful
    /// no-op that writes nothing.
    pub fn attach_role(&mut self, role: &Role) -> Result<bool, RbacError> {
        if self.has_role(role)? {
            debug!(
                principal_id = self.principal.principal_id(),
                role = %role.slug,
                "role already held"
            );
            return Ok(true);
        }
        self.persist_roles(vec![role.clone()])
    }

    /// Attach every role not already held, in a single write.
    ///
    /// The write happens even when nothing is left to attach, so any other
    /// pending principal changes are still saved.
    pub fn attach_all_roles(&mut self, roles: &[Role]) -> Result<bool, RbacError> {
        let mut to_attach = Vec::with_capacity(roles.len());
        for role in roles {
            if !self.has_role(role)? {
                to_attach.push(role.clone());
            }
        }
        self.persist_roles(to_attach)
    }

    fn persist_roles(&mut self, roles: Vec<Role>) -> Result<bool, RbacError> {
        let slugs: Vec<String> = roles.iter().map(|r| r.slug.clone()).collect();
        let saved = self.principal.persist(PendingRoles::new(roles))?;
        if saved {
            self.refresh();
        }
        info!(
            principal_id = self.principal.principal_id(),
            roles = ?slugs,
            saved,
            "attach roles"
        );
        Ok(saved)
    }

    /// Detach the role with the same slug as `role`. Returns the number of
    /// assignments removed; zero is not an error.
    pub fn detach_role(&mut self, role: &Role) -> Result<u64, RbacError> {
        self.detach(PivotFilter::RoleSlug(role.slug.clone()))
    }

    /// Detach every role.
    pub fn detach_all_roles(&mut self) -> Result<u64, RbacError> {
        self.detach(PivotFilter::All)
    }

    fn detach(&mut self, filter: PivotFilter) -> Result<u64, RbacError> {
        let removed = self.principal.delete_pivot_rows(filter.clone())?;
        self.refresh();
        info!(
            principal_id = self.principal.principal_id(),
            ?filter,
            removed,
            "detach roles"
        );
        Ok(removed)
    }
}

fn load_roles<P: Principal>(principal: &P, params: &RelationParams) -> Result<Vec<Role>, RbacError> {
    let rows = principal.load_related(Relation::Roles, params)?;
    let roles: Vec<Role> = hydrate(rows)?;
    debug!(
        principal_id = principal.principal_id(),
        count = roles.len(),
        "loaded roles"
    );
    Ok(roles)
}
