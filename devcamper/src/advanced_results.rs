//! Filtering, sorting, field selection, pagination and relation population
//! of any resource list.
//!
//! The list routes parse their query parameters into a [`QuerySpec`] against the
//! [`Schema`] of the resource and pass it to [`advanced_results`]:
//!
//! `GET /api/v1/bootcamps?averageCost[lte]=10000&select=name,averageCost&sort=-averageCost&page=2&limit=10`
use std::collections::HashMap;

use bson::{oid::ObjectId, Bson, Document};
use serde_json::Value;

use primitives::{
    devcamper::AdvancedResultsResponse,
    query::{Filter, Populate, Predicate, QueryParams, QuerySpec, Relation, ResultPage},
    util::json::document_to_json,
    Schema,
};

use crate::{
    db::{DocumentStore, FindOptions, StoreError},
    response::ResponseError,
};

/// Counts the matching documents of `collection` and fetches the requested page.
///
/// `total` counts all the documents matching the filter, regardless of the page.
pub async fn advanced_results(
    store: &dyn DocumentStore,
    collection: &str,
    query: &QuerySpec,
) -> Result<ResultPage, StoreError> {
    let total = store.count(collection, &query.filter).await?;

    let options = FindOptions {
        projection: query.select.clone(),
        sort: query.sort.clone(),
        skip: query.page.skip(),
        limit: Some(query.page.limit),
    };
    let mut items = store.find(collection, &query.filter, options).await?;

    if let Some(populate) = &query.populate {
        populate_items(store, &mut items, populate).await?;
    }

    Ok(ResultPage {
        items,
        total,
        pagination: query.page.pagination(total),
    })
}

/// Parses the raw query string of the request, fetches the page and
/// builds the response body.
pub async fn list_resource(
    store: &dyn DocumentStore,
    schema: &Schema,
    raw_query: Option<&str>,
    default_limit: u64,
    populate: Option<Populate>,
) -> Result<AdvancedResultsResponse<Value>, ResponseError> {
    let query = QueryParams::parse(raw_query.unwrap_or_default())?
        .into_query(schema, default_limit)?
        .with_populate(populate);

    let result = advanced_results(store, schema.collection, &query).await?;

    Ok(AdvancedResultsResponse::new(
        result.items.iter().map(document_to_json).collect(),
        result.pagination,
    ))
}

/// The fields requested from the related documents.
///
/// `extra` is needed for matching the related documents to the items.
fn related_projection(populate: &Populate, extra: &str) -> Option<Vec<String>> {
    if populate.select.is_empty() {
        return None;
    }

    let mut fields = populate.select.clone();
    if !fields.iter().any(|field| field == extra) {
        fields.push(extra.to_string());
    }

    Some(fields)
}

async fn populate_items(
    store: &dyn DocumentStore,
    items: &mut [Document],
    populate: &Populate,
) -> Result<(), StoreError> {
    match populate.relation {
        Relation::HasMany {
            collection,
            foreign_field,
        } => {
            let ids = items
                .iter()
                .filter_map(|item| item.get_object_id("_id").ok())
                .map(Bson::ObjectId)
                .collect::<Vec<_>>();

            let filter = Filter::new().with(foreign_field, Predicate::In(ids));
            let options = FindOptions {
                projection: related_projection(populate, foreign_field),
                ..Default::default()
            };
            let related = store.find(collection, &filter, options).await?;

            let requested_foreign_field =
                populate.select.is_empty() || populate.select.iter().any(|f| f == foreign_field);

            let mut by_owner: HashMap<ObjectId, Vec<Bson>> = HashMap::new();
            for mut document in related {
                let owner = match document.get_object_id(foreign_field) {
                    Ok(owner) => owner,
                    Err(_) => continue,
                };
                if !requested_foreign_field {
                    document.remove(foreign_field);
                }

                by_owner
                    .entry(owner)
                    .or_default()
                    .push(Bson::Document(document));
            }

            for item in items.iter_mut() {
                let related = item
                    .get_object_id("_id")
                    .ok()
                    .and_then(|id| by_owner.remove(&id))
                    .unwrap_or_default();

                item.insert(populate.path, Bson::Array(related));
            }
        }
        Relation::BelongsTo {
            collection,
            local_field,
        } => {
            let ids = items
                .iter()
                .filter_map(|item| item.get_object_id(local_field).ok())
                .map(Bson::ObjectId)
                .collect::<Vec<_>>();

            let filter = Filter::new().with("_id", Predicate::In(ids));
            let options = FindOptions {
                projection: related_projection(populate, "_id"),
                ..Default::default()
            };
            let related = store
                .find(collection, &filter, options)
                .await?
                .into_iter()
                .filter_map(|document| {
                    let id = document.get_object_id("_id").ok()?;

                    Some((id, document))
                })
                .collect::<HashMap<_, _>>();

            for item in items.iter_mut() {
                // not selected
                if !item.contains_key(local_field) {
                    continue;
                }

                let document = item
                    .get_object_id(local_field)
                    .ok()
                    .and_then(|id| related.get(&id))
                    .map_or(Bson::Null, |document| Bson::Document(document.clone()));

                item.insert(populate.path, document);
            }
        }
    }

    Ok(())
}
