use crate::repository::{Collection, Repository, RepositoryError, Result};
use crate::validation::Document;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// In-process store used by the route tests.
#[derive(Default)]
pub struct MemoryRepository {
    collections: Mutex<HashMap<Collection, Vec<Document>>>,
}

impl MemoryRepository {
    pub fn count(&self, collection: Collection) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, value)| document.get(key) == Some(value))
}

fn has_id(document: &Document, id: &str) -> bool {
    document.get("id").and_then(Value::as_str) == Some(id)
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_all(&self, collection: Collection, filter: Document) -> Result<Vec<Document>> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .rev()
                    .filter(|document| matches(document, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: Collection, filter: Document) -> Result<Option<Document>> {
        let collections = self.collections.lock().unwrap();
        Ok(collections.get(&collection).and_then(|documents| {
            documents
                .iter()
                .find(|document| matches(document, &filter))
                .cloned()
        }))
    }

    async fn find_by_id(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.lock().unwrap();
        Ok(collections
            .get(&collection)
            .and_then(|documents| documents.iter().find(|d| has_id(d, id)).cloned()))
    }

    async fn insert(&self, collection: Collection, mut document: Document) -> Result<Document> {
        let mut collections = self.collections.lock().unwrap();
        let documents = collections.entry(collection).or_default();
        if collection == Collection::Subscriptions {
            if let Some(email) = document.get("email") {
                if documents.iter().any(|d| d.get("email") == Some(email)) {
                    return Err(RepositoryError::Duplicate(format!("email {}", email)));
                }
            }
        }
        document.insert(
            "id".to_string(),
            Value::String(Uuid::new_v4().simple().to_string()),
        );
        documents.push(document.clone());
        Ok(document)
    }

    async fn replace(
        &self,
        collection: Collection,
        id: &str,
        mut document: Document,
    ) -> Result<Option<Document>> {
        let mut collections = self.collections.lock().unwrap();
        let Some(slot) = collections
            .get_mut(&collection)
            .and_then(|documents| documents.iter_mut().find(|d| has_id(d, id)))
        else {
            return Ok(None);
        };
        document.insert("id".to_string(), Value::String(id.to_string()));
        *slot = document.clone();
        Ok(Some(document))
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let mut collections = self.collections.lock().unwrap();
        let Some(documents) = collections.get_mut(&collection) else {
            return Ok(false);
        };
        let before = documents.len();
        documents.retain(|d| !has_id(d, id));
        Ok(documents.len() < before)
    }
}
