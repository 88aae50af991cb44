use rbac_sql::SQLStore;

use crate::config::Tables;
use crate::error::RbacError;

/// Initialize the SQLite schema for users, roles, permissions and both pivots.
pub fn init_schema(sql: &dyn SQLStore, tables: &Tables) -> Result<(), RbacError> {
    let Tables {
        users,
        roles,
        permissions,
        role_users,
        role_permissions,
    } = tables;

    let statements = [
        // Users: the principals roles are attached to
        format!(
            "CREATE TABLE IF NOT EXISTS {users} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {roles} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT ''
            )"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {permissions} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT ''
            )"
        ),
        // Pivot: user <-> role
        format!(
            "CREATE TABLE IF NOT EXISTS {role_users} (
                user_id INTEGER NOT NULL,
                role_id INTEGER NOT NULL,
                PRIMARY KEY (user_id, role_id),
                FOREIGN KEY (user_id) REFERENCES {users}(id) ON DELETE CASCADE,
                FOREIGN KEY (role_id) REFERENCES {roles}(id) ON DELETE CASCADE
            )"
        ),
        format!("CREATE INDEX IF NOT EXISTS idx_{role_users}_role ON {role_users}(role_id)"),
        // Pivot: role <-> permission
        format!(
            "CREATE TABLE IF NOT EXISTS {role_permissions} (
                role_id INTEGER NOT NULL,
                permission_id INTEGER NOT NULL,
                PRIMARY KEY (role_id, permission_id),
                FOREIGN KEY (role_id) REFERENCES {roles}(id) ON DELETE CASCADE,
                FOREIGN KEY (permission_id) REFERENCES {permissions}(id) ON DELETE CASCADE
            )"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{role_permissions}_permission \
             ON {role_permissions}(permission_id)"
        ),
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])?;
    }

    Ok(())
}
