//! The document store of the application.
//!
//! Routes and the advanced results only talk to the [`DocumentStore`] trait,
//! the application runs with either the [`MongoStore`] or the [`MemoryStore`].
use std::fmt;

use async_trait::async_trait;
use bson::{oid::ObjectId, Document};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use primitives::query::{Filter, Predicate, SortKey};

pub use self::{memory::MemoryStore, mongo::MongoStore};

pub mod derived;
pub mod memory;
pub mod mongo;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("Serializing document: {0}")]
    Serialization(#[from] bson::ser::Error),
    #[error("Deserializing document: {0}")]
    Deserialization(#[from] bson::de::Error),
    /// A unique field already has the inserted value.
    #[error("Duplicate value in collection `{0}`")]
    Duplicate(String),
    #[error("The lock of the in-memory store was poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// `None` returns all the fields, otherwise only `_id` and the listed fields.
    pub projection: Option<Vec<String>>,
    pub sort: Vec<SortKey>,
    pub skip: u64,
    /// `None` returns all documents
    pub limit: Option<u64>,
}

#[async_trait]
pub trait DocumentStore: fmt::Debug + Send + Sync {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    async fn insert(&self, collection: &str, document: Document) -> Result<(), StoreError>;

    /// Sets the fields of `changes` on the document with the given `_id`.
    ///
    /// Returns the updated document or `None` if there is no document with this `_id`.
    async fn update(
        &self,
        collection: &str,
        id: ObjectId,
        changes: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Returns the number of deleted documents.
    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;
}

pub fn id_filter(id: ObjectId) -> Filter {
    Filter::eq("_id", id)
}

pub async fn find_by_id(
    store: &dyn DocumentStore,
    collection: &str,
    id: ObjectId,
) -> Result<Option<Document>, StoreError> {
    let options = FindOptions {
        limit: Some(1),
        ..Default::default()
    };

    Ok(store
        .find(collection, &id_filter(id), options)
        .await?
        .into_iter()
        .next())
}

pub async fn fetch_by_id<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    id: ObjectId,
) -> Result<Option<T>, StoreError> {
    match find_by_id(store, collection, id).await? {
        Some(document) => Ok(Some(bson::from_document(document)?)),
        None => Ok(None),
    }
}

/// Fetches all the matching documents in the order they were created.
pub async fn fetch_all<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    filter: &Filter,
) -> Result<Vec<T>, StoreError> {
    let options = FindOptions {
        sort: vec![SortKey::ascending("createdAt")],
        ..Default::default()
    };

    store
        .find(collection, filter, options)
        .await?
        .into_iter()
        .map(|document| bson::from_document(document).map_err(StoreError::from))
        .collect()
}

pub async fn insert_item<T: Serialize>(
    store: &dyn DocumentStore,
    collection: &str,
    item: &T,
) -> Result<Document, StoreError> {
    let document = bson::to_document(item)?;
    store.insert(collection, document.clone()).await?;

    Ok(document)
}

/// Checks for an existing document with the same value of a unique field,
/// ignoring the document with `except` id.
pub async fn is_duplicate(
    store: &dyn DocumentStore,
    collection: &str,
    field: &str,
    value: impl Into<bson::Bson>,
    except: Option<ObjectId>,
) -> Result<bool, StoreError> {
    let filter = Filter::eq(field, value);
    let options = FindOptions {
        projection: Some(vec![]),
        ..Default::default()
    };

    let matching = store.find(collection, &filter, options).await?;

    Ok(matching
        .iter()
        .any(|document| except.is_none() || document.get_object_id("_id").ok() != except))
}

/// Shorthand for the `field: { $in: ids }` filter.
pub fn in_filter(field: &str, ids: impl IntoIterator<Item = ObjectId>) -> Filter {
    Filter::new().with(
        field,
        Predicate::In(ids.into_iter().map(bson::Bson::ObjectId).collect()),
    )
}
