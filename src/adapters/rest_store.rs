use crate::adapters::document_from_json;
use crate::core::{Document, DocumentStore};
use crate::utils::error::{MaintError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Document store reached over a JSON HTTP API.
///
/// `GET {endpoint}/{collection}` lists documents, either as a bare array or
/// wrapped in `{"documents": [...]}`. `PATCH {endpoint}/{collection}/{id}`
/// merges the body's fields into the document.
#[derive(Debug, Clone)]
pub struct RestDocumentStore {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl RestDocumentStore {
    pub fn new(endpoint: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| MaintError::InvalidConfigValueError {
            field: "store.endpoint".to_string(),
            value: endpoint.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| MaintError::ConfigError {
                message: format!("store endpoint '{}' cannot take a path", self.endpoint),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(MaintError::StoreError {
            status: status.as_u16(),
            message,
        })
    }
}

impl DocumentStore for RestDocumentStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>> {
        let url = self.url_for(&[collection])?;
        tracing::debug!("GET {}", url);

        let response = self.authorize(self.client.get(url)).send().await?;
        let body: serde_json::Value = Self::check_status(response).await?.json().await?;

        let items = match body {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(mut wrapper) => match wrapper.remove("documents") {
                Some(serde_json::Value::Array(items)) => items,
                _ => {
                    return Err(MaintError::ProcessingError {
                        message: format!(
                            "listing '{}' returned an object without a documents array",
                            collection
                        ),
                    })
                }
            },
            _ => {
                return Err(MaintError::ProcessingError {
                    message: format!("listing '{}' did not return JSON documents", collection),
                })
            }
        };

        items
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
        let url = self.url_for(&[collection, id])?;
        tracing::debug!("PATCH {} ({} fields)", url, fields.len());

        let response = self
            .authorize(self.client.patch(url).json(fields))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(MaintError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        Self::check_status(response).await?;
        Ok(())
    }
}
