// Adapters layer: concrete document stores and report storage.

pub mod json_store;
pub mod rest_store;
pub mod storage;

use crate::config::toml_config::{MaintConfig, StoreKind};
use crate::core::{Document, DocumentStore, DocumentUpdate};
use crate::utils::error::{MaintError, Result};
use crate::utils::validation::validate_required_field;
use json_store::JsonFileStore;
use rest_store::RestDocumentStore;
use std::collections::HashMap;

/// The store selected by `[store] type`.
#[derive(Debug)]
pub enum ConfiguredStore {
    Json(JsonFileStore),
    Rest(RestDocumentStore),
}

impl ConfiguredStore {
    pub fn from_config(config: &MaintConfig) -> Result<Self> {
        match config.store.r#type {
            StoreKind::Json => {
                let path = validate_required_field("store.path", &config.store.path)?;
                Ok(ConfiguredStore::Json(JsonFileStore::new(path)))
            }
            StoreKind::Rest => {
                let endpoint = validate_required_field("store.endpoint", &config.store.endpoint)?;
                Ok(ConfiguredStore::Rest(RestDocumentStore::new(
                    endpoint,
                    config.store.token.clone(),
                    config.store_timeout(),
                )?))
            }
        }
    }
}

impl DocumentStore for ConfiguredStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>> {
        match self {
            ConfiguredStore::Json(store) => store.list_documents(collection).await,
            ConfiguredStore::Rest(store) => store.list_documents(collection).await,
        }
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: &HashMap<String, serde_json::Value>,
    ) -> Result<()> {
        match self {
            ConfiguredStore::Json(store) => store.update_document(collection, id, fields).await,
            ConfiguredStore::Rest(store) => store.update_document(collection, id, fields).await,
        }
    }

    async fn update_documents(&self, collection: &str, updates: &[DocumentUpdate]) -> Result<()> {
        match self {
            ConfiguredStore::Json(store) => store.update_documents(collection, updates).await,
            ConfiguredStore::Rest(store) => store.update_documents(collection, updates).await,
        }
    }
}

/// Splits a raw JSON object into a [`Document`]; `id` may be a string or number.
pub(crate) fn document_from_json(collection: &str, value: serde_json::Value) -> Result<Document> {
    let serde_json::Value::Object(mut object) = value else {
        return Err(MaintError::ProcessingError {
            message: format!("collection '{}' contains a non-object entry", collection),
        });
    };

    let id = match object.remove("id") {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => {
            return Err(MaintError::ProcessingError {
                message: format!("collection '{}' contains a document without an id", collection),
            })
        }
    };

    Ok(Document {
        id,
        data: object.into_iter().collect(),
    })
}
