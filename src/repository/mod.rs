pub mod database;
#[cfg(test)]
pub mod memory;

use crate::validation::Document;
use async_trait::async_trait;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RepositoryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Blogs,
    Countries,
    Destinations,
    Feedbacks,
    Subscriptions,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Blogs => "blogs",
            Collection::Countries => "countries",
            Collection::Destinations => "destinations",
            Collection::Feedbacks => "feedbacks",
            Collection::Subscriptions => "subscriptions",
        }
    }
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("duplicate key: {0}")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("error converting document: {0}")]
    Conversion(String),
}

/// Document store addressed by collection and opaque string id.
///
/// Documents go in without an `id` and come back with one.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn find_all(&self, collection: Collection, filter: Document) -> Result<Vec<Document>>;

    async fn find_one(&self, collection: Collection, filter: Document) -> Result<Option<Document>>;

    /// Ids the store could never have produced resolve to `None`.
    async fn find_by_id(&self, collection: Collection, id: &str) -> Result<Option<Document>>;

    async fn insert(&self, collection: Collection, document: Document) -> Result<Document>;

    async fn replace(
        &self,
        collection: Collection,
        id: &str,
        document: Document,
    ) -> Result<Option<Document>>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool>;
}
