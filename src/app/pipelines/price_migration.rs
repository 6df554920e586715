use crate::app::pipelines::apply_updates;
use crate::config::toml_config::{PriceFieldConfig, PricesConfig};
use crate::core::currency::normalize_currency;
use crate::core::{
    Document, DocumentStore, DocumentUpdate, LoadOutcome, Pipeline, TransformResult,
};
use crate::domain::model::PriceInput;
use crate::utils::error::Result;
use std::collections::HashMap;

/// Rewrites configured price fields into their canonical currency form.
/// Fields that already match are left untouched, so reruns are no-ops.
pub struct PriceMigrationPipeline<D: DocumentStore> {
    store: D,
    collection: String,
    fields: Vec<PriceFieldConfig>,
    dry_run: bool,
}

impl<D: DocumentStore> PriceMigrationPipeline<D> {
    pub fn new(store: D, config: &PricesConfig, dry_run: bool) -> Self {
        Self {
            store,
            collection: config.collection.clone(),
            fields: config.fields.clone(),
            dry_run,
        }
    }

    /// Changed fields for one document, plus whether any field was unusable.
    fn normalize_document(&self, document: &Document) -> (HashMap<String, serde_json::Value>, bool) {
        let mut changed = HashMap::new();
        let mut malformed = false;

        for field in &self.fields {
            let Some(stored) = document.get(&field.name) else {
                continue;
            };

            if !PriceInput::is_price_like(stored) {
                tracing::warn!(
                    "⚠️ {}/{}: field '{}' is not a price ({}), skipping",
                    self.collection,
                    document.id,
                    field.name,
                    stored
                );
                malformed = true;
                continue;
            }

            let Some(normalized) = normalize_currency(PriceInput::from_json(stored), field.currency)
            else {
                continue;
            };

            if stored.as_str() == Some(normalized.as_str()) {
                continue;
            }

            tracing::debug!(
                "{}/{}: {} {} -> {}",
                self.collection,
                document.id,
                field.name,
                stored,
                normalized
            );
            changed.insert(field.name.clone(), serde_json::Value::String(normalized));
        }

        (changed, malformed)
    }
}

#[async_trait::async_trait]
impl<D: DocumentStore> Pipeline for PriceMigrationPipeline<D> {
    fn name(&self) -> &str {
        "normalize-prices"
    }

    async fn extract(&self) -> Result<Vec<Document>> {
        self.store.list_documents(&self.collection).await
    }

    async fn transform(&self, documents: Vec<Document>) -> Result<TransformResult> {
        let mut result = TransformResult::default();

        for document in &documents {
            let (fields, malformed) = self.normalize_document(document);
            if !fields.is_empty() {
                result.updates.push(DocumentUpdate {
                    id: document.id.clone(),
                    fields,
                });
            } else if malformed {
                result.skipped += 1;
            } else {
                result.unchanged += 1;
            }
        }

        Ok(result)
    }

    async fn load(&self, result: &TransformResult) -> Result<LoadOutcome> {
        let applied =
            apply_updates(&self.store, &self.collection, &result.updates, self.dry_run).await?;

        let output = if self.dry_run {
            format!(
                "dry run: {} documents in '{}' would be updated",
                result.updates.len(),
                self.collection
            )
        } else {
            format!("{} documents updated in '{}'", applied, self.collection)
        };
        Ok(LoadOutcome { applied, output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Currency;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStore {
        documents: Vec<Document>,
        writes: Arc<Mutex<Vec<(String, HashMap<String, serde_json::Value>)>>>,
    }

    impl DocumentStore for MockStore {
        async fn list_documents(&self, _collection: &str) -> Result<Vec<Document>> {
            Ok(self.documents.clone())
        }

        async fn update_document(
            &self,
            _collection: &str,
            id: &str,
            fields: &HashMap<String, serde_json::Value>,
        ) -> Result<()> {
            self.writes
                .lock()
                .await
                .push((id.to_string(), fields.clone()));
            Ok(())
        }
    }

    fn config() -> PricesConfig {
        PricesConfig {
            collection: "products".to_string(),
            fields: vec![
                PriceFieldConfig {
                    name: "price".to_string(),
                    currency: Currency::Usd,
                },
                PriceFieldConfig {
                    name: "priceInr".to_string(),
                    currency: Currency::Inr,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_transform_only_queues_changed_fields() {
        let pipeline = PriceMigrationPipeline::new(MockStore::default(), &config(), false);
        let documents = vec![
            Document::new("a")
                .with_field("price", json!("20"))
                .with_field("priceInr", json!("₹1,700")),
            Document::new("b")
                .with_field("price", json!("$20-$50"))
                .with_field("priceInr", json!(150000)),
            Document::new("c")
                .with_field("price", json!("$5"))
                .with_field("priceInr", json!(null)),
            Document::new("d").with_field("price", json!({"amount": 5})),
            Document::new("e"),
        ];

        let result = pipeline.transform(documents).await.unwrap();

        assert_eq!(result.updates.len(), 2);
        assert_eq!(result.updates[0].id, "a");
        assert_eq!(result.updates[0].fields.len(), 1);
        assert_eq!(result.updates[0].fields["price"], json!("$20"));
        assert_eq!(result.updates[1].id, "b");
        assert_eq!(result.updates[1].fields["priceInr"], json!("₹1,50,000"));
        assert!(!result.updates[1].fields.contains_key("price"));
        assert_eq!(result.unchanged, 2);
        assert_eq!(result.skipped, 1);
    }

    #[tokio::test]
    async fn test_load_writes_updates() {
        let store = MockStore::default();
        let pipeline = PriceMigrationPipeline::new(store.clone(), &config(), false);
        let result = pipeline
            .transform(vec![Document::new("a").with_field("price", json!(9))])
            .await
            .unwrap();

        let outcome = pipeline.load(&result).await.unwrap();

        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.output, "1 documents updated in 'products'");
        let writes = store.writes.lock().await;
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "a");
        assert_eq!(writes[0].1["price"], json!("$9"));
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let store = MockStore::default();
        let pipeline = PriceMigrationPipeline::new(store.clone(), &config(), true);
        let result = pipeline
            .transform(vec![Document::new("a").with_field("price", json!("9"))])
            .await
            .unwrap();

        let outcome = pipeline.load(&result).await.unwrap();

        assert_eq!(outcome.applied, 0);
        assert!(outcome.output.starts_with("dry run: 1 documents"));
        assert!(store.writes.lock().await.is_empty());
    }
}
