use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures::TryStreamExt;
use mongodb::{
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Client, Database,
};

use primitives::query::{Direction, Filter, Predicate, SortKey};

use super::{DocumentStore, FindOptions, StoreError};

/// The MongoDB server error code of a unique index violation
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Only parses the URL and creates the [`Client`],
    /// the driver connects on the first operation.
    pub async fn connect(url: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(url).await?;

        Ok(Self {
            database: client.database(database),
        })
    }

    fn collection(&self, name: &str) -> mongodb::Collection<Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        // past the last document that MongoDB can address
        if i64::try_from(options.skip).is_err() {
            return Ok(vec![]);
        }

        let find_options = mongodb::options::FindOptions::builder()
            .projection(options.projection.as_deref().map(projection_to_document))
            .sort((!options.sort.is_empty()).then(|| sort_to_document(&options.sort)))
            .skip(Some(options.skip))
            .limit(options.limit.map(limit_to_i64))
            .build();

        let cursor = self
            .collection(collection)
            .find(filter_to_document(filter), find_options)
            .await?;

        Ok(cursor.try_collect::<Vec<_>>().await?)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        Ok(self
            .collection(collection)
            .count_documents(filter_to_document(filter), None)
            .await?)
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.collection(collection)
            .insert_one(document, None)
            .await
            .map_err(|error| duplicate_or(error, collection))?;

        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: ObjectId,
        changes: Document,
    ) -> Result<Option<Document>, StoreError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection(collection)
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": changes }, options)
            .await
            .map_err(|error| duplicate_or(error, collection))
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let result = self
            .collection(collection)
            .delete_many(filter_to_document(filter), None)
            .await?;

        Ok(result.deleted_count)
    }
}

fn duplicate_or(error: mongodb::error::Error, collection: &str) -> StoreError {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY =>
        {
            StoreError::Duplicate(collection.to_string())
        }
        _ => StoreError::Mongo(error),
    }
}

/// Translates the filter to a MongoDB query document.
///
/// Multiple predicates on the same field are merged,
/// e.g. `{ "averageCost": { "$gte": 10000, "$lte": 20000 } }`.
pub fn filter_to_document(filter: &Filter) -> Document {
    let mut query = Document::new();

    for field_filter in filter.iter() {
        let (operator, value) = match &field_filter.predicate {
            Predicate::Equals(value) => ("$eq", value.clone()),
            Predicate::GreaterThan(value) => ("$gt", value.clone()),
            Predicate::GreaterOrEqual(value) => ("$gte", value.clone()),
            Predicate::LessThan(value) => ("$lt", value.clone()),
            Predicate::LessOrEqual(value) => ("$lte", value.clone()),
            Predicate::In(values) => ("$in", Bson::Array(values.clone())),
        };

        match query.get_mut(&field_filter.field) {
            Some(Bson::Document(operators)) => {
                operators.insert(operator, value);
            }
            _ => {
                let mut operators = Document::new();
                operators.insert(operator, value);
                query.insert(field_filter.field.clone(), operators);
            }
        }
    }

    query
}

/// A negative limit means a single batch for MongoDB, so large limits are clamped.
pub fn limit_to_i64(limit: u64) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

pub fn sort_to_document(sort: &[SortKey]) -> Document {
    sort.iter()
        .map(|key| {
            let direction = match key.direction {
                Direction::Ascending => 1,
                Direction::Descending => -1,
            };

            (key.field.clone(), Bson::Int32(direction))
        })
        .collect()
}

/// `_id` is always returned by MongoDB unless excluded.
pub fn projection_to_document(fields: &[String]) -> Document {
    std::iter::once(("_id".to_string(), Bson::Int32(1)))
        .chain(fields.iter().map(|field| (field.clone(), Bson::Int32(1))))
        .collect()
}
