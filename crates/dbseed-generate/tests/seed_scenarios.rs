use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use dbseed_core::{ColumnDescriptor, SeedSchema, TableDescriptor};
use dbseed_generate::{
    InMemoryRowStore, InsertStatement, RowStore, RowStoreError, SeedEngine, SeedError,
    SeedOptions, SeedValue, TableStatus,
};
use rand::RngCore;

fn load_schema(name: &str) -> SeedSchema {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let contents =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing json at {}", path.display()));
    serde_json::from_str(&contents).expect("parse schema")
}

fn seeded_options() -> SeedOptions {
    SeedOptions {
        seed: Some(2024),
        ..SeedOptions::default()
    }
}

fn int_values(store: &InMemoryRowStore, table: &str, column: &str) -> Vec<i64> {
    store
        .column_values(table, column)
        .into_iter()
        .filter_map(SeedValue::as_i64)
        .collect()
}

fn users_and_orders() -> SeedSchema {
    SeedSchema::new(vec![
        TableDescriptor::new(
            "Users",
            vec![
                ColumnDescriptor::new("id", "int")
                    .primary_key()
                    .with_default("identity"),
            ],
        ),
        TableDescriptor::new(
            "Orders",
            vec![
                ColumnDescriptor::new("id", "int")
                    .primary_key()
                    .with_default("identity"),
                ColumnDescriptor::new("userId", "int").references("Users", "id"),
            ],
        ),
    ])
}

#[test]
fn users_then_orders_with_resolved_references() {
    let schema = users_and_orders();
    let mut store = InMemoryRowStore::from_schema(&schema);

    let report = SeedEngine::new(seeded_options())
        .run(&schema, &mut store)
        .expect("run seeding");

    assert_eq!(report.order, vec!["Users".to_string(), "Orders".to_string()]);
    assert_eq!(store.row_count("Users"), 3);
    assert_eq!(store.row_count("Orders"), 3);
    assert_eq!(report.tables_seeded, 2);
    assert_eq!(report.rows_inserted, 6);

    let user_ids: BTreeSet<i64> = int_values(&store, "Users", "id").into_iter().collect();
    assert_eq!(user_ids, BTreeSet::from([1, 2, 3]));
    for user_id in int_values(&store, "Orders", "userId") {
        assert!(user_ids.contains(&user_id), "{user_id} is not a seeded user");
    }
}

#[test]
fn cycle_aborts_run_and_seeds_nothing() {
    let schema = SeedSchema::new(vec![
        TableDescriptor::new(
            "A",
            vec![
                ColumnDescriptor::new("id", "int").primary_key(),
                ColumnDescriptor::new("bId", "int").references("B", "id"),
            ],
        ),
        TableDescriptor::new(
            "B",
            vec![
                ColumnDescriptor::new("id", "int").primary_key(),
                ColumnDescriptor::new("aId", "int").references("A", "id"),
            ],
        ),
    ]);
    let mut store = InMemoryRowStore::from_schema(&schema);

    let err = SeedEngine::new(seeded_options())
        .run(&schema, &mut store)
        .expect_err("cycle must abort");
    assert!(matches!(err, SeedError::CyclicDependency { .. }));
    assert!(err.to_string().contains("bad schema design"));
    assert_eq!(store.row_count("A"), 0);
    assert_eq!(store.row_count("B"), 0);
}

#[test]
fn blocked_table_keeps_order_and_starves_dependents() {
    let schema = SeedSchema::new(vec![
        TableDescriptor::new(
            "Users",
            vec![
                ColumnDescriptor::new("id", "int")
                    .primary_key()
                    .with_default("identity"),
                ColumnDescriptor::new("roleId", "int").references("Roles", "id"),
            ],
        ),
        TableDescriptor::new(
            "Roles",
            vec![
                ColumnDescriptor::new("id", "int")
                    .primary_key()
                    .with_default("identity"),
                ColumnDescriptor::new("name", "varchar(40)"),
            ],
        ),
    ]);
    let mut options = seeded_options();
    options.block_list.insert("Roles".to_string());
    let mut store = InMemoryRowStore::from_schema(&schema);

    let report = SeedEngine::new(options)
        .run(&schema, &mut store)
        .expect("run seeding");

    let roles = report.order.iter().position(|t| t == "Roles").expect("roles");
    let users = report.order.iter().position(|t| t == "Users").expect("users");
    assert!(roles < users);
    assert_eq!(store.row_count("Roles"), 0);

    assert_eq!(report.table("Roles").expect("roles").status, TableStatus::Blocked);
    let users = report.table("Users").expect("users report");
    assert_eq!(users.status, TableStatus::Failed);
    assert!(
        users
            .error
            .as_deref()
            .is_some_and(|error| error.contains("referenced row missing"))
    );
    assert_eq!(report.failures().count(), 1);
}

#[test]
fn self_referencing_table_starts_with_null() {
    let schema = SeedSchema::new(vec![
        TableDescriptor::new(
            "Employees",
            vec![
                ColumnDescriptor::new("id", "int")
                    .primary_key()
                    .with_default("identity"),
                ColumnDescriptor::new("managerId", "int").references("Employees", "id"),
            ],
        )
        .with_seed_count(5),
    ]);
    let mut store = InMemoryRowStore::from_schema(&schema);

    SeedEngine::new(seeded_options())
        .run(&schema, &mut store)
        .expect("run seeding");

    let rows = store.rows("Employees");
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].get("managerId"), Some(&SeedValue::Null));
    for (idx, row) in rows.iter().enumerate().skip(1) {
        let manager = row
            .get("managerId")
            .and_then(SeedValue::as_i64)
            .expect("later rows reference a prior row");
        assert!(manager >= 1 && manager <= idx as i64);
    }
}

#[test]
fn shop_fixture_seeds_every_table() {
    let schema = load_schema("shop.schema.json");
    let mut store = InMemoryRowStore::from_schema(&schema);

    let report = SeedEngine::new(seeded_options())
        .run(&schema, &mut store)
        .expect("run seeding");

    assert!(report.is_complete(), "failures: {:?}", report.failures().collect::<Vec<_>>());
    assert_eq!(report.tables_seeded, 3);
    let position = |name: &str| report.order.iter().position(|t| t == name).expect(name);
    assert!(position("Users") < position("Orders"));
    assert!(position("Orders") < position("OrderNotes"));

    for row in store.rows("Users") {
        let email = row.get("email").and_then(SeedValue::as_str).expect("email");
        assert!(email.ends_with("@example.com"));
        assert!(!row.contains_key("updatedAt"));
    }
    for row in store.rows("Orders") {
        assert_eq!(row.get("createdBy"), Some(&SeedValue::Int(1)));
        assert!(matches!(row.get("total"), Some(SeedValue::Float(_))));
    }

    let order_ids: BTreeSet<i64> = int_values(&store, "Orders", "id").into_iter().collect();
    for order_id in int_values(&store, "OrderNotes", "orderId") {
        assert!(order_ids.contains(&order_id));
    }
}

#[test]
fn same_seed_produces_same_rows() {
    let schema = load_schema("shop.schema.json");
    let mut options = seeded_options();
    options.base_time = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0));

    let engine = SeedEngine::new(options);
    let mut first = InMemoryRowStore::from_schema(&schema);
    let mut second = InMemoryRowStore::from_schema(&schema);
    engine.run(&schema, &mut first).expect("first run");
    engine.run(&schema, &mut second).expect("second run");

    for table in ["Users", "Orders", "OrderNotes"] {
        assert_eq!(first.rows(table), second.rows(table), "{table} differs");
    }
}

/// In-memory store that fails the Nth insert into one table and every
/// `max_value` query against another.
struct FailingStore {
    inner: InMemoryRowStore,
    insert_table: &'static str,
    fail_on_insert: usize,
    inserts_seen: usize,
    query_table: &'static str,
}

impl RowStore for FailingStore {
    fn max_value(&mut self, table: &str, column: &str) -> Result<Option<i64>, RowStoreError> {
        if table == self.query_table {
            return Err(RowStoreError::Query {
                table: table.to_string(),
                message: "connection reset".to_string(),
            });
        }
        self.inner.max_value(table, column)
    }

    fn random_value(
        &mut self,
        table: &str,
        column: &str,
        rng: &mut dyn RngCore,
    ) -> Result<Option<SeedValue>, RowStoreError> {
        self.inner.random_value(table, column, rng)
    }

    fn insert(&mut self, statement: &InsertStatement) -> Result<(), RowStoreError> {
        if statement.table == self.insert_table {
            self.inserts_seen += 1;
            if self.inserts_seen == self.fail_on_insert {
                return Err(RowStoreError::Insert {
                    table: statement.table.clone(),
                    message: "check constraint violated".to_string(),
                });
            }
        }
        self.inner.insert(statement)
    }
}

#[test]
fn row_store_errors_stop_only_the_failing_table() {
    let schema = SeedSchema::new(vec![
        TableDescriptor::new(
            "Events",
            vec![
                ColumnDescriptor::new("id", "int")
                    .primary_key()
                    .with_default("identity"),
                ColumnDescriptor::new("name", "varchar(40)").with_max_length(40),
            ],
        ),
        TableDescriptor::new(
            "Codes",
            vec![ColumnDescriptor::new("id", "int").primary_key()],
        ),
        TableDescriptor::new(
            "Tags",
            vec![
                ColumnDescriptor::new("id", "int")
                    .primary_key()
                    .with_default("identity"),
                ColumnDescriptor::new("label", "varchar(20)").with_max_length(20),
            ],
        ),
    ]);
    let mut store = FailingStore {
        inner: InMemoryRowStore::from_schema(&schema),
        insert_table: "Events",
        fail_on_insert: 3,
        inserts_seen: 0,
        query_table: "Codes",
    };

    let report = SeedEngine::new(seeded_options())
        .run(&schema, &mut store)
        .expect("run seeding");

    let events = report.table("Events").expect("events");
    assert_eq!(events.status, TableStatus::Partial);
    assert_eq!(events.rows_inserted, 2);
    assert_eq!(store.inner.row_count("Events"), 2);

    let codes = report.table("Codes").expect("codes");
    assert_eq!(codes.status, TableStatus::Failed);
    assert_eq!(codes.rows_inserted, 0);

    let tags = report.table("Tags").expect("tags");
    assert_eq!(tags.status, TableStatus::Seeded);
    assert_eq!(store.inner.row_count("Tags"), 3);

    let failures: Vec<(&str, &str)> = report.failures().collect();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].0, "Events");
    assert!(failures[0].1.contains("check constraint violated"));
    assert_eq!(failures[1].0, "Codes");
    assert!(failures[1].1.contains("connection reset"));

    assert_eq!(report.tables_partial, 1);
    assert_eq!(report.tables_failed, 1);
    assert_eq!(report.tables_seeded, 1);
    assert_eq!(report.rows_inserted, 5);
    assert!(!report.is_complete());
}
