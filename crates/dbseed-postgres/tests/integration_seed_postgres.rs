use std::{env, fs};

use anyhow::{Context, Result};
use dbseed_core::SeedSchema;
use dbseed_generate::{RowStore, SeedEngine, SeedOptions, SeedValue};
use dbseed_postgres::{PgRowStore, PgTarget};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn database_url() -> Option<String> {
    env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .ok()
}

fn fixture(name: &str) -> Result<String> {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    fs::read_to_string(&path).with_context(|| format!("reading fixture {path}"))
}

#[test]
fn seeds_shop_schema_in_dependency_order() -> Result<()> {
    let Some(url) = database_url() else {
        eprintln!("skipping: set TEST_DATABASE_URL or DATABASE_URL for integration tests");
        return Ok(());
    };

    let mut store =
        PgRowStore::connect(&PgTarget::from_url(url)).context("connecting to Postgres")?;
    store
        .execute_script(&fixture("shop.sql")?)
        .context("creating fixture tables")?;

    let schema: SeedSchema =
        serde_json::from_str(&fixture("shop.schema.json")?).context("parsing schema")?;
    let options = SeedOptions {
        seed: Some(11),
        ..SeedOptions::default()
    };
    let report = SeedEngine::new(options).run(&schema, &mut store)?;

    assert!(
        report.is_complete(),
        "failures: {:?}",
        report.failures().collect::<Vec<_>>()
    );
    assert_eq!(
        report.order,
        vec!["dbseed_users", "dbseed_orders", "dbseed_order_notes"]
    );
    assert_eq!(report.rows_inserted, 9);

    assert_eq!(store.max_value("dbseed_orders", "id")?, Some(3));
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let user_id = store
        .random_value("dbseed_users", "id", &mut rng)?
        .context("seeded user")?;
    assert!(matches!(user_id, SeedValue::Int(1..=3)));

    let attributes = store
        .random_value("dbseed_orders", "attributes", &mut rng)?
        .context("seeded order attributes")?;
    let SeedValue::Json(attributes) = attributes else {
        anyhow::bail!("attributes decoded as {attributes:?}");
    };
    assert_eq!(attributes["source"], "dbseed_orders.attributes");

    store.close();
    Ok(())
}
