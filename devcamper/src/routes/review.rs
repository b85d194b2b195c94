//! `/api/v1/reviews` and `/api/v1/bootcamps/:id/reviews` routes
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, RawQuery},
    http::StatusCode,
    Extension, Json,
};
use bson::Document;
use serde_json::Value;

use primitives::{
    bootcamp,
    devcamper::{AdvancedResultsResponse, DataResponse, ListResponse, SuccessResponse},
    query::{Filter, Populate, Predicate},
    review::{self, CreateReview, ModifyReview},
    util::json::document_to_json,
    Review,
};

use crate::{
    advanced_results::list_resource,
    authenticator::Authenticator,
    db::{
        derived::update_average_rating, fetch_all, fetch_by_id, find_by_id, id_filter, insert_item,
    },
    response::ResponseError,
    Application, Auth,
};

use super::{bootcamp::load_bootcamp, non_empty, not_found, parse_id};

const REVIEW: &str = "Review";

async fn load_review<A: Authenticator + 'static>(
    app: &Application<A>,
    id: &str,
) -> Result<Review, ResponseError> {
    let id = parse_id(id, REVIEW)?;

    fetch_by_id::<Review>(app.store.as_ref(), review::COLLECTION, id)
        .await?
        .ok_or_else(|| not_found(REVIEW, id))
}

fn check_owner(auth: &Auth, review: &Review, action: &str) -> Result<(), ResponseError> {
    if auth.can_modify(review.user) {
        Ok(())
    } else {
        Err(ResponseError::Forbidden(format!(
            "User {} is not authorized to {} review {}",
            auth.user_id, action, review.id
        )))
    }
}

/// `GET /api/v1/reviews`
pub async fn list_reviews<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    RawQuery(query): RawQuery,
) -> Result<Json<AdvancedResultsResponse<Value>>, ResponseError> {
    let bootcamp =
        Populate::belongs_to("bootcamp", bootcamp::COLLECTION).select(["name", "description"]);

    let response = list_resource(
        app.store.as_ref(),
        &review::SCHEMA,
        query.as_deref(),
        app.config.default_limit,
        Some(bootcamp),
    )
    .await?;

    Ok(Json(response))
}

/// `GET /api/v1/bootcamps/:id/reviews`
pub async fn bootcamp_reviews<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Path(bootcamp_id): Path<String>,
) -> Result<Json<ListResponse<Value>>, ResponseError> {
    let bootcamp = load_bootcamp(&app, &bootcamp_id).await?;

    let reviews = fetch_all::<Document>(
        app.store.as_ref(),
        review::COLLECTION,
        &Filter::eq("bootcamp", bootcamp.id),
    )
    .await?;

    Ok(Json(ListResponse::new(
        reviews.iter().map(document_to_json).collect(),
    )))
}

/// `GET /api/v1/reviews/:id`
pub async fn get_review<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Value>>, ResponseError> {
    let id = parse_id(&id, REVIEW)?;

    let document = find_by_id(app.store.as_ref(), review::COLLECTION, id)
        .await?
        .ok_or_else(|| not_found(REVIEW, id))?;

    Ok(Json(DataResponse::new(document_to_json(&document))))
}

/// `POST /api/v1/bootcamps/:id/reviews`
///
/// A user can review every bootcamp only once.
pub async fn create_review<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Extension(auth): Extension<Auth>,
    Path(bootcamp_id): Path<String>,
    request: Result<Json<CreateReview>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<Value>>), ResponseError> {
    let bootcamp = load_bootcamp(&app, &bootcamp_id).await?;

    let Json(create) = request?;
    let review = create.into_review(bootcamp.id, auth.user_id)?;

    let store = app.store.as_ref();

    let of_user = Filter::eq("bootcamp", bootcamp.id)
        .with("user", Predicate::Equals(auth.user_id.into()));
    if store.count(review::COLLECTION, &of_user).await? > 0 {
        return Err(ResponseError::BadRequest(
            "You have already reviewed this bootcamp".to_string(),
        ));
    }

    let document = insert_item(store, review::COLLECTION, &review).await?;
    update_average_rating(store, bootcamp.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(document_to_json(&document))),
    ))
}

/// `PUT /api/v1/reviews/:id`
pub async fn update_review<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<String>,
    request: Result<Json<ModifyReview>, JsonRejection>,
) -> Result<Json<DataResponse<Value>>, ResponseError> {
    let review = load_review(&app, &id).await?;
    check_owner(&auth, &review, "update")?;

    let Json(modify) = request?;
    modify.validate()?;
    let changes = non_empty(modify.into_changes()?)?;

    let store = app.store.as_ref();
    let updated = store
        .update(review::COLLECTION, review.id, changes)
        .await?
        .ok_or_else(|| not_found(REVIEW, review.id))?;
    update_average_rating(store, review.bootcamp).await?;

    Ok(Json(DataResponse::new(document_to_json(&updated))))
}

/// `DELETE /api/v1/reviews/:id`
pub async fn delete_review<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ResponseError> {
    let review = load_review(&app, &id).await?;
    check_owner(&auth, &review, "delete")?;

    let store = app.store.as_ref();
    store.delete(review::COLLECTION, &id_filter(review.id)).await?;
    update_average_rating(store, review.bootcamp).await?;

    Ok(Json(SuccessResponse::default()))
}
