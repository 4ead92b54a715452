//! In-process document store.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Collection, DocumentStore, RepositoryError};

/// Document store held in memory. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<(Uuid, Value)>>>,
}

impl MemoryDocumentStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Text form of a field for equality matching, the way `body ->> field` reads it.
fn field_text(document: &Value, field: &str) -> Option<String> {
    match document.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn check_unique(
    collection: Collection,
    documents: &[(Uuid, Value)],
    id: Uuid,
    document: &Value,
) -> Result<(), RepositoryError> {
    for field in collection.unique_fields() {
        let Some(value) = field_text(document, field) else {
            continue;
        };
        let taken = documents
            .iter()
            .any(|(other, d)| *other != id && field_text(d, field).as_deref() == Some(&value));
        if taken {
            return Err(RepositoryError::Conflict(format!(
                "duplicate {field} in {collection}"
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(
        &self,
        collection: Collection,
        id: Uuid,
        document: Value,
    ) -> Result<(), RepositoryError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();

        if documents.iter().any(|(existing, _)| *existing == id) {
            return Err(RepositoryError::Conflict(format!(
                "duplicate document in {collection}"
            )));
        }
        check_unique(collection, documents, id, &document)?;

        documents.push((id, document));
        Ok(())
    }

    async fn replace(
        &self,
        collection: Collection,
        id: Uuid,
        document: Value,
    ) -> Result<(), RepositoryError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();

        check_unique(collection, documents, id, &document)?;

        let slot = documents
            .iter_mut()
            .find(|(existing, _)| *existing == id)
            .ok_or(RepositoryError::NotFound)?;
        slot.1 = document;
        Ok(())
    }

    async fn replace_if(
        &self,
        collection: Collection,
        id: Uuid,
        field: &str,
        expected: &str,
        document: Value,
    ) -> Result<bool, RepositoryError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();

        check_unique(collection, documents, id, &document)?;

        let Some(slot) = documents
            .iter_mut()
            .find(|(existing, d)| {
                *existing == id && field_text(d, field).as_deref() == Some(expected)
            })
        else {
            return Ok(false);
        };
        slot.1 = document;
        Ok(true)
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Value>, RepositoryError> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).and_then(|documents| {
            documents
                .iter()
                .find(|(existing, _)| *existing == id)
                .map(|(_, d)| d.clone())
        }))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Value>, RepositoryError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|documents| documents.iter().map(|(_, d)| d.clone()).collect())
            .unwrap_or_default())
    }

    async fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Value>, RepositoryError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|(_, d)| d.get(field).and_then(Value::as_str) == Some(value))
                    .map(|(_, d)| d.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn count(&self, collection: Collection) -> Result<u64, RepositoryError> {
        let collections = self.collections.read().await;
        let len = collections.get(&collection).map_or(0, Vec::len);
        Ok(len as u64)
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, RepositoryError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(&collection) else {
            return Ok(false);
        };
        let before = documents.len();
        documents.retain(|(existing, _)| *existing != id);
        Ok(documents.len() != before)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
