use std::fmt;

use crate::error::SQLError;
use crate::traits::{Row, SQLStore, Value};

/// Sort direction for `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("ASC"),
            Direction::Desc => f.write_str("DESC"),
        }
    }
}

#[derive(Debug, Clone)]
struct Source {
    table: String,
    alias: Option<String>,
}

impl Source {
    fn render(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {}", self.table, alias),
            None => self.table.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct Join {
    source: Source,
    on: String,
}

#[derive(Debug, Clone)]
enum Condition {
    Eq(String, Value),
    In(String, Vec<Value>),
}

/// Builds a single `SELECT` statement.
///
/// Table, column and join expressions are trusted input and are spliced
/// into the SQL text as-is. Only values go through bound parameters.
///
/// ```ignore
/// let rows = QueryBuilder::new()
///     .distinct()
///     .columns(&["p.id", "p.slug"])
///     .from("role_permissions", Some("rp"))
///     .join("permissions", "rp.permission_id = p.id", Some("p"))
///     .in_where("rp.role_id", vec![Value::Integer(1), Value::Integer(2)])
///     .execute(store)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    distinct: bool,
    columns: Vec<String>,
    from: Option<Source>,
    joins: Vec<Join>,
    conditions: Vec<Condition>,
    order: Vec<(String, Direction)>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select only distinct rows.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Append selected columns. No columns selects `*`.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    pub fn from(mut self, table: &str, alias: Option<&str>) -> Self {
        self.from = Some(Source {
            table: table.to_string(),
            alias: alias.map(str::to_string),
        });
        self
    }

    /// Inner join `table` on the given condition.
    pub fn join(mut self, table: &str, on: &str, alias: Option<&str>) -> Self {
        self.joins.push(Join {
            source: Source {
                table: table.to_string(),
                alias: alias.map(str::to_string),
            },
            on: on.to_string(),
        });
        self
    }

    pub fn where_eq(mut self, column: &str, value: Value) -> Self {
        self.conditions.push(Condition::Eq(column.to_string(), value));
        self
    }

    /// `column IN (values)`. An empty list matches nothing.
    pub fn in_where(mut self, column: &str, values: Vec<Value>) -> Self {
        self.conditions.push(Condition::In(column.to_string(), values));
        self
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order.push((column.to_string(), direction));
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

    /// Render the statement with numbered `?N` placeholders.
    pub fn to_sql(&self) -> Result<(String, Vec<Value>), SQLError> {
        let from = self
            .from
            .as_ref()
            .ok_or_else(|| SQLError::Query("query has no FROM source".into()))?;

        let mut params: Vec<Value> = Vec::new();
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(&from.render());

        for join in &self.joins {
            sql.push_str(&format!(" JOIN {} ON {}", join.source.render(), join.on));
        }

        let mut clauses = Vec::new();
        for cond in &self.conditions {
            match cond {
                Condition::Eq(col, val) => {
                    params.push(val.clone());
                    clauses.push(format!("{} = ?{}", col, params.len()));
                }
                Condition::In(_, vals) if vals.is_empty() => {
                    clauses.push("1 = 0".to_string());
                }
                Condition::In(col, vals) => {
                    let mut placeholders = Vec::with_capacity(vals.len());
                    for val in vals {
                        params.push(val.clone());
                        placeholders.push(format!("?{}", params.len()));
                    }
                    clauses.push(format!("{} IN ({})", col, placeholders.join(", ")));
                }
            }
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|(col, dir)| format!("{} {}", col, dir))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        // SQLite requires LIMIT before OFFSET; -1 means unbounded.
        match (self.limit, self.offset) {
            (None, None) => {}
            (limit, offset) => {
                params.push(Value::Integer(limit.map_or(-1, |l| l as i64)));
                sql.push_str(&format!(" LIMIT ?{}", params.len()));
                if let Some(offset) = offset {
                    params.push(Value::Integer(offset as i64));
                    sql.push_str(&format!(" OFFSET ?{}", params.len()));
                }
            }
        }

        Ok((sql, params))
    }

    pub fn execute(&self, store: &dyn SQLStore) -> Result<Vec<Row>, SQLError> {
        let (sql, params) = self.to_sql()?;
        store.query(&sql, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteStore;

    #[test]
    fn test_render_distinct_join_in() {
        let (sql, params) = QueryBuilder::new()
            .distinct()
            .columns(&["p.id", "p.slug"])
            .from("role_permissions", Some("rp"))
            .join("permissions", "rp.permission_id = p.id", Some("p"))
            .in_where("rp.role_id", vec![Value::Integer(1), Value::Integer(2)])
            .to_sql()
            .unwrap();

        assert_eq!(
            sql,
            "SELECT DISTINCT p.id, p.slug FROM role_permissions AS rp \
             JOIN permissions AS p ON rp.permission_id = p.id \
             WHERE rp.role_id IN (?1, ?2)"
        );
        assert_eq!(params, vec![Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn test_empty_in_matches_nothing() {
        let (sql, params) = QueryBuilder::new()
            .from("roles", None)
            .in_where("id", vec![])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT * FROM roles WHERE 1 = 0");
        assert!(params.is_empty());
    }

    #[test]
    fn test_placeholders_number_across_clauses() {
        let (sql, params) = QueryBuilder::new()
            .from("roles", Some("r"))
            .where_eq("r.name", "x".into())
            .in_where("r.id", vec![Value::Integer(7)])
            .order_by("r.slug", Direction::Desc)
            .offset(5)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM roles AS r WHERE r.name = ?1 AND r.id IN (?2) \
             ORDER BY r.slug DESC LIMIT ?3 OFFSET ?4"
        );
        assert_eq!(params[2], Value::Integer(-1));
        assert_eq!(params[3], Value::Integer(5));
    }

    #[test]
    fn test_missing_from_is_error() {
        let result = QueryBuilder::new().columns(&["1"]).to_sql();
        assert!(matches!(result, Err(SQLError::Query(_))));
    }

    #[test]
    fn test_execute_deduplicates() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.exec("CREATE TABLE t (k INTEGER, v TEXT)", &[]).unwrap();
        for (k, v) in [(1i64, "a"), (2, "a"), (3, "b")] {
            store
                .exec("INSERT INTO t (k, v) VALUES (?1, ?2)", &[k.into(), v.into()])
                .unwrap();
        }

        let rows = QueryBuilder::new()
            .distinct()
            .columns(&["v"])
            .from("t", None)
            .in_where("k", vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
            .order_by("v", Direction::Asc)
            .execute(&store)
            .unwrap();
        let values: Vec<&str> = rows.iter().filter_map(|r| r.get_str("v")).collect();
        assert_eq!(values, vec!["a", "b"]);
    }
}
