use anyhow::Result;
use serde_json::json;
use storefront_maint::config::toml_config::PricesConfig;
use storefront_maint::{JsonFileStore, MaintenanceEngine, PriceMigrationPipeline};
use tempfile::TempDir;

async fn seed_products(dir: &TempDir) -> Result<()> {
    let products = json!([
        {"id": "mug", "name": "Mug", "price": "20", "priceInr": "1700"},
        {"id": "lamp", "name": "Lamp", "price": "$20 - $50", "priceInr": "₹1500-150000"},
        {"id": "tee", "name": "Tee", "price": 15, "priceInr": 150000},
        {"id": "card", "name": "Gift card", "price": "Contact us", "priceInr": null},
        {"id": "done", "name": "Poster", "price": "$9", "priceInr": "₹750"}
    ]);
    tokio::fs::write(
        dir.path().join("products.json"),
        serde_json::to_vec_pretty(&products)?,
    )
    .await?;
    Ok(())
}

async fn read_products(dir: &TempDir) -> Result<Vec<serde_json::Value>> {
    let content = tokio::fs::read(dir.path().join("products.json")).await?;
    Ok(serde_json::from_slice(&content)?)
}

#[tokio::test]
async fn test_price_migration_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    seed_products(&temp_dir).await?;

    let pipeline = PriceMigrationPipeline::new(
        JsonFileStore::new(temp_dir.path()),
        &PricesConfig::default(),
        false,
    );
    let summary = MaintenanceEngine::new(pipeline).run().await?;

    assert_eq!(summary.documents, 5);
    assert_eq!(summary.updated, 4);
    assert_eq!(summary.pending, 0);
    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.skipped, 0);

    let products = read_products(&temp_dir).await?;
    let by_id = |id: &str| {
        products
            .iter()
            .find(|p| p["id"] == id)
            .cloned()
            .unwrap_or_default()
    };

    assert_eq!(by_id("mug")["price"], json!("$20"));
    assert_eq!(by_id("mug")["priceInr"], json!("₹1,700"));
    assert_eq!(by_id("lamp")["price"], json!("$20-$50"));
    assert_eq!(by_id("lamp")["priceInr"], json!("₹1,500-₹1,50,000"));
    assert_eq!(by_id("tee")["price"], json!("$15"));
    assert_eq!(by_id("tee")["priceInr"], json!("₹1,50,000"));
    assert_eq!(by_id("card")["price"], json!("$Contact us"));
    assert_eq!(by_id("card")["priceInr"], json!(null));
    assert_eq!(by_id("mug")["name"], json!("Mug"));

    Ok(())
}

#[tokio::test]
async fn test_second_run_is_a_no_op() -> Result<()> {
    let temp_dir = TempDir::new()?;
    seed_products(&temp_dir).await?;

    let run = || async {
        let pipeline = PriceMigrationPipeline::new(
            JsonFileStore::new(temp_dir.path()),
            &PricesConfig::default(),
            false,
        );
        MaintenanceEngine::new(pipeline).run().await
    };

    let first = run().await?;
    assert_eq!(first.updated, 4);
    let after_first = read_products(&temp_dir).await?;

    let second = run().await?;
    assert_eq!(second.updated, 0);
    assert_eq!(second.unchanged, 5);
    assert_eq!(read_products(&temp_dir).await?, after_first);

    Ok(())
}

#[tokio::test]
async fn test_dry_run_leaves_store_untouched() -> Result<()> {
    let temp_dir = TempDir::new()?;
    seed_products(&temp_dir).await?;
    let before = read_products(&temp_dir).await?;

    let pipeline = PriceMigrationPipeline::new(
        JsonFileStore::new(temp_dir.path()),
        &PricesConfig::default(),
        true,
    );
    let summary = MaintenanceEngine::new(pipeline).run().await?;

    assert_eq!(summary.updated, 0);
    assert_eq!(summary.pending, 4);
    assert!(summary.output.starts_with("dry run"));
    assert!(summary
        .to_string()
        .starts_with("5 documents: 0 updated, 4 pending, 1 unchanged"));
    assert_eq!(read_products(&temp_dir).await?, before);

    Ok(())
}
