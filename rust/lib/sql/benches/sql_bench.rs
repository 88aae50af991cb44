use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rbac_sql::{QueryBuilder, SQLStore, SqliteStore, Statement, Value};

const ROLES: i64 = 50;
const PERMISSIONS: i64 = 500;

/// Roles each granting a sliding window of 40 permissions, so neighbouring
/// roles overlap heavily.
fn seeded_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .exec(
            "CREATE TABLE permissions (id INTEGER PRIMARY KEY, slug TEXT NOT NULL)",
            &[],
        )
        .unwrap();
    store
        .exec(
            "CREATE TABLE role_permissions (role_id INTEGER NOT NULL, permission_id INTEGER NOT NULL, \
             PRIMARY KEY (role_id, permission_id))",
            &[],
        )
        .unwrap();

    let mut batch = Vec::new();
    for p in 0..PERMISSIONS {
        batch.push(Statement::new(
            "INSERT INTO permissions (id, slug) VALUES (?1, ?2)",
            vec![Value::Integer(p), Value::Text(format!("perm-{}", p))],
        ));
    }
    for r in 0..ROLES {
        for p in (r * 5)..(r * 5 + 40) {
            batch.push(Statement::new(
                "INSERT INTO role_permissions (role_id, permission_id) VALUES (?1, ?2)",
                vec![Value::Integer(r), Value::Integer(p % PERMISSIONS)],
            ));
        }
    }
    store.exec_batch(&batch).unwrap();
    store
}

fn bench_batch_insert(c: &mut Criterion) {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .exec(
            "CREATE TABLE role_users (user_id INTEGER NOT NULL, role_id INTEGER NOT NULL, \
             PRIMARY KEY (user_id, role_id))",
            &[],
        )
        .unwrap();

    let mut user = 0i64;
    c.bench_function("sqlite_batch_pivot_insert_10", |b| {
        b.iter(|| {
            let batch: Vec<Statement> = (0..10)
                .map(|r| {
                    Statement::new(
                        "INSERT OR IGNORE INTO role_users (user_id, role_id) VALUES (?1, ?2)",
                        vec![Value::Integer(black_box(user)), Value::Integer(r)],
                    )
                })
                .collect();
            store.exec_batch(&batch).unwrap();
            user += 1;
        });
    });
}

fn bench_distinct_permissions(c: &mut Criterion) {
    let store = seeded_store();
    let role_ids: Vec<Value> = (0..10).map(Value::Integer).collect();

    c.bench_function("sqlite_distinct_permissions_10_roles", |b| {
        b.iter(|| {
            let rows = QueryBuilder::new()
                .distinct()
                .columns(&["p.id", "p.slug"])
                .from("role_permissions", Some("rp"))
                .join("permissions", "rp.permission_id = p.id", Some("p"))
                .in_where("rp.role_id", black_box(role_ids.clone()))
                .execute(&store)
                .unwrap();
            // Ten overlapping windows of 40 starting 5 apart.
            assert_eq!(rows.len(), 85);
        });
    });
}

criterion_group!(benches, bench_batch_insert, bench_distinct_permissions);
criterion_main!(benches);
