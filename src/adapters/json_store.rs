use crate::adapters::document_from_json;
use crate::core::{Document, DocumentStore, DocumentUpdate};
use crate::utils::error::{MaintError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Document store backed by one `<collection>.json` array per collection.
///
/// A batch of updates is applied in memory and committed with a single
/// rewrite: the new content goes to a sibling temp file which is then
/// renamed over the collection, so a failed run leaves the previous file
/// intact.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{}.json", collection))
    }

    async fn read_collection(&self, collection: &str) -> Result<Vec<serde_json::Value>> {
        let path = self.collection_path(collection);
        tracing::debug!("Reading collection '{}' from {}", collection, path.display());
        let content = tokio::fs::read(&path).await?;
        let values: Vec<serde_json::Value> = serde_json::from_slice(&content)?;
        Ok(values)
    }

    async fn write_collection(&self, collection: &str, values: &[serde_json::Value]) -> Result<()> {
        let path = self.collection_path(collection);
        let staging = self.root.join(format!(".{}.json.tmp", collection));
        let content = serde_json::to_vec_pretty(values)?;

        let mut file = tokio::fs::File::create(&staging).await?;
        file.write_all(&content).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&staging, &path).await?;
        tracing::debug!("Committed collection '{}' to {}", collection, path.display());
        Ok(())
    }
}

fn matches_id(value: &serde_json::Value, id: &str) -> bool {
    match value.get("id") {
        Some(serde_json::Value::String(s)) => s == id,
        Some(serde_json::Value::Number(n)) => n.to_string() == id,
        _ => false,
    }
}

impl DocumentStore for JsonFileStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>> {
        self.read_collection(collection)
            .await?
            .into_iter()
            .map(|value| document_from_json(collection, value))
            .collect()
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: &HashMap<String, serde_json::Value>,
    ) -> Result<()> {
        let update = DocumentUpdate {
            id: id.to_string(),
            fields: fields.clone(),
        };
        self.update_documents(collection, std::slice::from_ref(&update))
            .await
    }

    /// All-or-nothing: an unknown id fails the batch before anything is written.
    async fn update_documents(&self, collection: &str, updates: &[DocumentUpdate]) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut values = self.read_collection(collection).await?;
        for update in updates {
            let target = values
                .iter_mut()
                .find(|value| matches_id(value, &update.id))
                .and_then(|value| value.as_object_mut())
                .ok_or_else(|| MaintError::DocumentNotFound {
                    collection: collection.to_string(),
                    id: update.id.clone(),
                })?;

            for (name, value) in &update.fields {
                target.insert(name.clone(), value.clone());
            }
        }

        self.write_collection(collection, &values).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn seed(dir: &TempDir, collection: &str, value: serde_json::Value) {
        let path = dir.path().join(format!("{}.json", collection));
        tokio::fs::write(path, serde_json::to_vec(&value).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_documents() {
        let dir = TempDir::new().unwrap();
        seed(
            &dir,
            "products",
            json!([
                {"id": "p1", "price": "$20"},
                {"id": 7, "price": 1700}
            ]),
        )
        .await;

        let store = JsonFileStore::new(dir.path());
        let docs = store.list_documents("products").await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "p1");
        assert_eq!(docs[0].get("price"), Some(&json!("$20")));
        assert!(docs[0].get("id").is_none());
        assert_eq!(docs[1].id, "7");
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let dir = TempDir::new().unwrap();
        seed(
            &dir,
            "products",
            json!([{"id": "p1", "price": "20", "name": "Mug"}]),
        )
        .await;

        let store = JsonFileStore::new(dir.path());
        let mut fields = HashMap::new();
        fields.insert("price".to_string(), json!("$20"));
        store.update_document("products", "p1", &fields).await.unwrap();

        let docs = store.list_documents("products").await.unwrap();
        assert_eq!(docs[0].get("price"), Some(&json!("$20")));
        assert_eq!(docs[0].get("name"), Some(&json!("Mug")));
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let dir = TempDir::new().unwrap();
        seed(&dir, "products", json!([{"id": "p1"}])).await;

        let store = JsonFileStore::new(dir.path());
        let err = store
            .update_document("products", "nope", &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MaintError::DocumentNotFound { .. }));
    }

    #[tokio::test]
    async fn test_batch_is_committed_in_one_rewrite() {
        let dir = TempDir::new().unwrap();
        seed(
            &dir,
            "products",
            json!([
                {"id": "p1", "price": "20"},
                {"id": 2, "price": 1700},
                {"id": "p3", "price": "$5"}
            ]),
        )
        .await;

        let update = |id: &str, price: &str| DocumentUpdate {
            id: id.to_string(),
            fields: HashMap::from([("price".to_string(), json!(price))]),
        };
        let store = JsonFileStore::new(dir.path());
        store
            .update_documents("products", &[update("p1", "$20"), update("2", "$1700")])
            .await
            .unwrap();

        let docs = store.list_documents("products").await.unwrap();
        assert_eq!(docs[0].get("price"), Some(&json!("$20")));
        assert_eq!(docs[1].get("price"), Some(&json!("$1700")));
        assert_eq!(docs[2].get("price"), Some(&json!("$5")));

        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["products.json".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_collection_intact() {
        let dir = TempDir::new().unwrap();
        seed(&dir, "products", json!([{"id": "p1", "price": "20"}])).await;
        let path = dir.path().join("products.json");
        let before = tokio::fs::read(&path).await.unwrap();

        let updates = vec![
            DocumentUpdate {
                id: "p1".to_string(),
                fields: HashMap::from([("price".to_string(), json!("$20"))]),
            },
            DocumentUpdate {
                id: "missing".to_string(),
                fields: HashMap::new(),
            },
        ];
        let store = JsonFileStore::new(dir.path());
        let err = store.update_documents("products", &updates).await.unwrap_err();

        assert!(matches!(err, MaintError::DocumentNotFound { ref id, .. } if id == "missing"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_missing_collection_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        let err = store.list_documents("ghosts").await.unwrap_err();
        assert!(matches!(err, MaintError::IoError(_)));
    }
}
