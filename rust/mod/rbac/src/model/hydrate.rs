use rbac_sql::{Row, Value};
use serde::de::DeserializeOwned;

use crate::error::RbacError;

/// Turn a result set into models, one per row.
///
/// Each row becomes a JSON object keyed by column name. NULL columns are
/// left out so `#[serde(default)]` fields fall back to their defaults.
pub fn hydrate<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, RbacError> {
    rows.into_iter().map(hydrate_row).collect()
}

fn hydrate_row<T: DeserializeOwned>(row: Row) -> Result<T, RbacError> {
    let mut object = serde_json::Map::with_capacity(row.columns.len());
    for (name, value) in row.columns {
        let json = match value {
            Value::Null => continue,
            Value::Integer(i) => serde_json::Value::from(i),
            Value::Real(f) => serde_json::Value::from(f),
            Value::Text(s) => serde_json::Value::String(s),
            Value::Blob(b) => serde_json::Value::from(b),
        };
        object.insert(name, json);
    }
    serde_json::from_value(serde_json::Value::Object(object))
        .map_err(|e| RbacError::Hydration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Permission, Role, RoleUser};

    fn row(columns: Vec<(&str, Value)>) -> Row {
        Row {
            columns: columns
                .into_iter()
                .map(|(n, v)| (n.to_string(), v))
                .collect(),
        }
    }

    #[test]
    fn test_hydrate_roles() {
        let roles: Vec<Role> = hydrate(vec![row(vec![
            ("id", Value::Integer(3)),
            ("name", Value::from("Editor")),
            ("slug", Value::from("editor")),
            ("description", Value::Null),
        ])])
        .unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].id, 3);
        assert_eq!(roles[0].slug, "editor");
        assert_eq!(roles[0].description, "");
    }

    #[test]
    fn test_hydrate_pivot() {
        let pivots: Vec<RoleUser> = hydrate(vec![row(vec![
            ("user_id", Value::Integer(1)),
            ("role_id", Value::Integer(9)),
        ])])
        .unwrap();
        assert_eq!(pivots, vec![RoleUser { user_id: 1, role_id: 9 }]);
    }

    #[test]
    fn test_missing_slug_fails() {
        let result: Result<Vec<Permission>, _> =
            hydrate(vec![row(vec![("id", Value::Integer(1))])]);
        assert!(matches!(result, Err(RbacError::Hydration(_))));
    }
}
