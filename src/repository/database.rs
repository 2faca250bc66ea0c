use crate::config::config::Config;
use crate::repository::{Collection, Repository, RepositoryError, Result};
use crate::validation::Document;
use async_trait::async_trait;
use futures::TryStreamExt;
use log::{error, info};
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document as BsonDocument};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, IndexModel};
use serde_json::Value;

const DUPLICATE_KEY_CODE: i32 = 11000;

pub struct Database {
    db: mongodb::Database,
}

impl Database {
    pub async fn connect(config: &Config) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.mongodb_uri).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        let client = Client::with_options(options)?;
        let db = client.database(&config.mongodb_database);

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        db.collection::<BsonDocument>(Collection::Subscriptions.name())
            .create_index(email_index)
            .await?;

        info!("Connected to MongoDB database {}", config.mongodb_database);
        Ok(Database { db })
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<BsonDocument> {
        self.db.collection(collection.name())
    }
}

#[async_trait]
impl Repository for Database {
    async fn find_all(&self, collection: Collection, filter: Document) -> Result<Vec<Document>> {
        let cursor = self
            .collection(collection)
            .find(to_bson(filter)?)
            .sort(doc! { "_id": -1 })
            .await?;
        let documents: Vec<BsonDocument> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(to_json).collect())
    }

    async fn find_one(&self, collection: Collection, filter: Document) -> Result<Option<Document>> {
        let found = self
            .collection(collection)
            .find_one(to_bson(filter)?)
            .await?;
        Ok(found.map(to_json))
    }

    async fn find_by_id(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        let found = self
            .collection(collection)
            .find_one(doc! { "_id": oid })
            .await?;
        Ok(found.map(to_json))
    }

    async fn insert(&self, collection: Collection, document: Document) -> Result<Document> {
        let mut record = to_bson(document)?;
        record.remove("id");
        let oid = ObjectId::new();
        record.insert("_id", oid);

        self.collection(collection)
            .insert_one(&record)
            .await
            .map_err(write_error)?;
        Ok(to_json(record))
    }

    async fn replace(
        &self,
        collection: Collection,
        id: &str,
        document: Document,
    ) -> Result<Option<Document>> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        let mut record = to_bson(document)?;
        record.remove("id");

        let result = self
            .collection(collection)
            .replace_one(doc! { "_id": oid }, &record)
            .await
            .map_err(write_error)?;
        if result.matched_count == 0 {
            return Ok(None);
        }
        record.insert("_id", oid);
        Ok(Some(to_json(record)))
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let Some(oid) = parse_id(id) else {
            return Ok(false);
        };
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": oid })
            .await?;
        Ok(result.deleted_count > 0)
    }
}

fn parse_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

fn to_bson(document: Document) -> Result<BsonDocument> {
    bson::to_document(&document).map_err(|e| RepositoryError::Conversion(e.to_string()))
}

// `_id` becomes a hex `id`; everything else goes through relaxed extended JSON.
fn to_json(mut record: BsonDocument) -> Document {
    let id = record.remove("_id");
    let mut document = match Bson::Document(record).into_relaxed_extjson() {
        Value::Object(map) => map,
        other => {
            error!("Stored record did not convert to a JSON object: {}", other);
            Document::new()
        }
    };
    if let Some(Bson::ObjectId(oid)) = id {
        document.insert("id".to_string(), Value::String(oid.to_hex()));
    }
    document
}

fn write_error(err: mongodb::error::Error) -> RepositoryError {
    if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = err.kind.as_ref() {
        if write_error.code == DUPLICATE_KEY_CODE {
            return RepositoryError::Duplicate(write_error.message.clone());
        }
    }
    RepositoryError::Database(err)
}
