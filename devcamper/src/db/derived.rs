//! Keeps the data derived from the courses and reviews of a bootcamp up to date.
use bson::{doc, oid::ObjectId, Bson};

use primitives::{
    bootcamp,
    course::{self, average_cost},
    query::Filter,
    review::{self, average_rating},
};

use super::{DocumentStore, FindOptions, StoreError};

async fn field_values(
    store: &dyn DocumentStore,
    collection: &str,
    bootcamp_id: ObjectId,
    field: &str,
) -> Result<Vec<f64>, StoreError> {
    let options = FindOptions {
        projection: Some(vec![field.to_string()]),
        ..Default::default()
    };

    let documents = store
        .find(collection, &Filter::eq("bootcamp", bootcamp_id), options)
        .await?;

    Ok(documents
        .iter()
        .filter_map(|document| match document.get(field) {
            Some(Bson::Double(value)) => Some(*value),
            Some(Bson::Int32(value)) => Some(f64::from(*value)),
            Some(Bson::Int64(value)) => Some(*value as f64),
            _ => None,
        })
        .collect())
}

/// Recalculates the `averageCost` of the bootcamp from its courses' tuition.
pub async fn update_average_cost(
    store: &dyn DocumentStore,
    bootcamp_id: ObjectId,
) -> Result<Option<f64>, StoreError> {
    let tuitions = field_values(store, course::COLLECTION, bootcamp_id, "tuition").await?;
    let average = average_cost(&tuitions);

    store
        .update(
            bootcamp::COLLECTION,
            bootcamp_id,
            doc! { "averageCost": average },
        )
        .await?;

    Ok(average)
}

/// Recalculates the `averageRating` of the bootcamp from its reviews.
pub async fn update_average_rating(
    store: &dyn DocumentStore,
    bootcamp_id: ObjectId,
) -> Result<Option<f64>, StoreError> {
    let ratings = field_values(store, review::COLLECTION, bootcamp_id, "rating").await?;
    let average = average_rating(&ratings);

    store
        .update(
            bootcamp::COLLECTION,
            bootcamp_id,
            doc! { "averageRating": average },
        )
        .await?;

    Ok(average)
}

/// Deletes the bootcamp with all of its courses and reviews.
///
/// Returns `false` if the bootcamp does not exist.
pub async fn delete_bootcamp(
    store: &dyn DocumentStore,
    bootcamp_id: ObjectId,
) -> Result<bool, StoreError> {
    let of_bootcamp = Filter::eq("bootcamp", bootcamp_id);

    store.delete(course::COLLECTION, &of_bootcamp).await?;
    store.delete(review::COLLECTION, &of_bootcamp).await?;

    let deleted = store
        .delete(bootcamp::COLLECTION, &super::id_filter(bootcamp_id))
        .await?;

    Ok(deleted > 0)
}
