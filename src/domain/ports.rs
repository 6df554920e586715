use crate::domain::model::{Document, DocumentUpdate, LoadOutcome, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait DocumentStore: Send + Sync {
    fn list_documents(
        &self,
        collection: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Document>>> + Send;

    /// Merges `fields` into the document's top level.
    fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: &HashMap<String, serde_json::Value>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Applies a job's updates in order. Stores that can commit a batch in
    /// one write override this.
    fn update_documents(
        &self,
        collection: &str,
        updates: &[DocumentUpdate],
    ) -> impl std::future::Future<Output = Result<()>> + Send {
        async move {
            for update in updates {
                self.update_document(collection, &update.id, &update.fields)
                    .await?;
            }
            Ok(())
        }
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    fn name(&self) -> &str;
    async fn extract(&self) -> Result<Vec<Document>>;
    async fn transform(&self, documents: Vec<Document>) -> Result<TransformResult>;
    async fn load(&self, result: &TransformResult) -> Result<LoadOutcome>;
}
