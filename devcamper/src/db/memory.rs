//! A [`DocumentStore`] keeping all collections in memory.
//!
//! It evaluates the typed filters with the MongoDB semantics the application relies on:
//! numbers compare across `Int32`, `Int64` and `Double`, array fields match when any
//! element matches and a missing field matches no predicate.
use std::{cmp::Ordering, collections::HashMap, sync::RwLock};

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};

use primitives::query::{Direction, FieldFilter, Filter, Predicate, SortKey};

use super::{DocumentStore, FindOptions, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;

        let mut matching = collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| matches_filter(document, filter))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        // `sort_by` is stable, documents with equal keys keep the insertion order
        matching.sort_by(|a, b| compare_documents(a, b, &options.sort));

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = options
            .limit
            .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(matching
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|document| match &options.projection {
                Some(fields) => project(document, fields),
                None => document.clone(),
            })
            .collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;

        let count = collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| matches_filter(document, filter))
                    .count()
            })
            .unwrap_or_default();

        Ok(count as u64)
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Poisoned)?;

        let documents = collections.entry(collection.to_string()).or_default();

        let id = document.get("_id");
        if id.is_some() && documents.iter().any(|existing| existing.get("_id") == id) {
            return Err(StoreError::Duplicate(collection.to_string()));
        }

        documents.push(document);

        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: ObjectId,
        changes: Document,
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Poisoned)?;

        let document = collections.get_mut(collection).and_then(|documents| {
            documents
                .iter_mut()
                .find(|document| document.get_object_id("_id").ok() == Some(id))
        });

        Ok(document.map(|document| {
            for (field, value) in changes {
                set_path(document, &field, value);
            }

            document.clone()
        }))
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Poisoned)?;

        let deleted = match collections.get_mut(collection) {
            Some(documents) => {
                let before = documents.len();
                documents.retain(|document| !matches_filter(document, filter));

                before - documents.len()
            }
            None => 0,
        };

        Ok(deleted as u64)
    }
}

pub fn matches_filter(document: &Document, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|field_filter| matches_field(document, field_filter))
}

fn matches_field(document: &Document, field_filter: &FieldFilter) -> bool {
    let value = match get_path(document, &field_filter.field) {
        Some(value) => value,
        None => return false,
    };

    // a predicate on an array field matches if any of its elements match
    let candidates: Vec<&Bson> = match value {
        Bson::Array(elements) => elements.iter().collect(),
        value => vec![value],
    };

    candidates
        .into_iter()
        .any(|candidate| matches_predicate(candidate, &field_filter.predicate))
}

fn matches_predicate(value: &Bson, predicate: &Predicate) -> bool {
    let ordering = |expected: &Bson| compare_values(value, expected);

    match predicate {
        Predicate::Equals(expected) => ordering(expected) == Some(Ordering::Equal),
        Predicate::GreaterThan(expected) => ordering(expected) == Some(Ordering::Greater),
        Predicate::GreaterOrEqual(expected) => {
            matches!(ordering(expected), Some(Ordering::Greater | Ordering::Equal))
        }
        Predicate::LessThan(expected) => ordering(expected) == Some(Ordering::Less),
        Predicate::LessOrEqual(expected) => {
            matches!(ordering(expected), Some(Ordering::Less | Ordering::Equal))
        }
        Predicate::In(values) => values
            .iter()
            .any(|expected| ordering(expected) == Some(Ordering::Equal)),
    }
}

/// Compares values of the same type, numbers compare across their BSON types.
///
/// Returns `None` for values which cannot be compared, e.g. a string and a number.
fn compare_values(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (as_number(a), as_number(b)) {
        (Some(a), Some(b)) => return a.partial_cmp(&b),
        (None, None) => {}
        _ => return None,
    }

    match (a, b) {
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::Boolean(a), Bson::Boolean(b)) => Some(a.cmp(b)),
        (Bson::ObjectId(a), Bson::ObjectId(b)) => Some(a.bytes().cmp(&b.bytes())),
        (Bson::DateTime(a), Bson::DateTime(b)) => Some(a.cmp(b)),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        (a, b) if a == b => Some(Ordering::Equal),
        _ => None,
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(number) => Some(f64::from(*number)),
        Bson::Int64(number) => Some(*number as f64),
        Bson::Double(number) => Some(*number),
        _ => None,
    }
}

/// The sort order between values of different types, missing and `null` values come first.
fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) => 0,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) => 1,
        Some(Bson::String(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::ObjectId(_)) => 5,
        Some(Bson::Boolean(_)) => 6,
        Some(Bson::DateTime(_)) => 7,
        Some(_) => 8,
    }
}

fn compare_for_sort(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let by_type = type_rank(a).cmp(&type_rank(b));
    if by_type != Ordering::Equal {
        return by_type;
    }

    match (a, b) {
        (Some(a), Some(b)) => compare_values(a, b).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

pub fn compare_documents(a: &Document, b: &Document, sort: &[SortKey]) -> Ordering {
    for key in sort {
        let ordering = compare_for_sort(get_path(a, &key.field), get_path(b, &key.field));

        if ordering != Ordering::Equal {
            return match key.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            };
        }
    }

    Ordering::Equal
}

/// Gets the value of a dotted path, e.g. `location.city`.
fn get_path<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let (parent, field) = match path.rsplit_once('.') {
        Some((parent, field)) => (parent, field),
        None => return document.get(path),
    };

    match get_path(document, parent)? {
        Bson::Document(embedded) => embedded.get(field),
        _ => None,
    }
}

/// Sets the value of a dotted path, creating the embedded documents on the way.
fn set_path(document: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        Some((head, rest)) => {
            if !matches!(document.get(head), Some(Bson::Document(_))) {
                document.insert(head, Document::new());
            }

            if let Some(Bson::Document(embedded)) = document.get_mut(head) {
                set_path(embedded, rest, value);
            }
        }
        None => {
            document.insert(path, value);
        }
    }
}

/// Keeps `_id` and the given field paths.
fn project(document: &Document, fields: &[String]) -> Document {
    let mut projected = Document::new();

    if let Some(id) = document.get("_id") {
        projected.insert("_id", id.clone());
    }

    for field in fields {
        if let Some(value) = get_path(document, field) {
            set_path(&mut projected, field, value.clone());
        }
    }

    projected
}
