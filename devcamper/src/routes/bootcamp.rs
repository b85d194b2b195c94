//! `/api/v1/bootcamps` routes
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, RawQuery},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;
use slog::info;

use primitives::{
    bootcamp::{self, CreateBootcamp, ModifyBootcamp},
    course,
    devcamper::{AdvancedResultsResponse, DataResponse, SuccessResponse},
    query::{Filter, Populate},
    util::json::document_to_json,
    Bootcamp,
};

use crate::{
    advanced_results::list_resource,
    authenticator::Authenticator,
    db::{derived, fetch_by_id, find_by_id, insert_item, is_duplicate},
    response::ResponseError,
    Application, Auth,
};

use super::{non_empty, not_found, parse_id};

const BOOTCAMP: &str = "Bootcamp";

/// Fetches the bootcamp of the `:id` path parameter.
pub(crate) async fn load_bootcamp<A: Authenticator + 'static>(
    app: &Application<A>,
    id: &str,
) -> Result<Bootcamp, ResponseError> {
    let id = parse_id(id, BOOTCAMP)?;

    fetch_by_id::<Bootcamp>(app.store.as_ref(), bootcamp::COLLECTION, id)
        .await?
        .ok_or_else(|| not_found(BOOTCAMP, id))
}

/// `GET /api/v1/bootcamps`
///
/// Every bootcamp comes with all of its `courses`.
pub async fn list_bootcamps<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    RawQuery(query): RawQuery,
) -> Result<Json<AdvancedResultsResponse<Value>>, ResponseError> {
    let courses = Populate::has_many("courses", course::COLLECTION, "bootcamp");

    let response = list_resource(
        app.store.as_ref(),
        &bootcamp::SCHEMA,
        query.as_deref(),
        app.config.default_limit,
        Some(courses),
    )
    .await?;

    Ok(Json(response))
}

/// `GET /api/v1/bootcamps/:id`
pub async fn get_bootcamp<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Value>>, ResponseError> {
    let id = parse_id(&id, BOOTCAMP)?;

    let document = find_by_id(app.store.as_ref(), bootcamp::COLLECTION, id)
        .await?
        .ok_or_else(|| not_found(BOOTCAMP, id))?;

    Ok(Json(DataResponse::new(document_to_json(&document))))
}

/// `POST /api/v1/bootcamps`
///
/// A publisher can own at most [`Config::bootcamps_per_publisher`](primitives::Config::bootcamps_per_publisher)
/// bootcamps, admins are not limited.
pub async fn create_bootcamp<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Extension(auth): Extension<Auth>,
    request: Result<Json<CreateBootcamp>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<Value>>), ResponseError> {
    let Json(create) = request?;
    create.validate()?;

    let store = app.store.as_ref();

    if !auth.role.is_admin() {
        let published = store
            .count(bootcamp::COLLECTION, &Filter::eq("user", auth.user_id))
            .await?;

        if published >= app.config.bootcamps_per_publisher {
            return Err(ResponseError::BadRequest(format!(
                "The user with ID {} has already published a bootcamp",
                auth.user_id
            )));
        }
    }

    if is_duplicate(store, bootcamp::COLLECTION, "name", create.name.trim(), None).await? {
        return Err(ResponseError::BadRequest(
            "Duplicate field value entered".to_string(),
        ));
    }

    let bootcamp = create.into_bootcamp(auth.user_id);
    let document = insert_item(store, bootcamp::COLLECTION, &bootcamp).await?;

    info!(&app.logger, "Bootcamp {} created by {}", bootcamp.id, auth.user_id; "module" => "bootcamp");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(document_to_json(&document))),
    ))
}

/// `PUT /api/v1/bootcamps/:id`
pub async fn update_bootcamp<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<String>,
    request: Result<Json<ModifyBootcamp>, JsonRejection>,
) -> Result<Json<DataResponse<Value>>, ResponseError> {
    let bootcamp = load_bootcamp(&app, &id).await?;

    if !auth.can_modify(bootcamp.user) {
        return Err(ResponseError::Forbidden(format!(
            "User {} is not authorized to update this bootcamp",
            auth.user_id
        )));
    }

    let Json(modify) = request?;
    modify.validate()?;

    let store = app.store.as_ref();

    if let Some(name) = &modify.name {
        if is_duplicate(store, bootcamp::COLLECTION, "name", name.trim(), Some(bootcamp.id)).await? {
            return Err(ResponseError::BadRequest(
                "Duplicate field value entered".to_string(),
            ));
        }
    }

    let changes = non_empty(modify.into_changes()?)?;
    let updated = store
        .update(bootcamp::COLLECTION, bootcamp.id, changes)
        .await?
        .ok_or_else(|| not_found(BOOTCAMP, bootcamp.id))?;

    Ok(Json(DataResponse::new(document_to_json(&updated))))
}

/// `DELETE /api/v1/bootcamps/:id`
///
/// Deletes all the courses and reviews of the bootcamp too.
pub async fn delete_bootcamp<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ResponseError> {
    let bootcamp = load_bootcamp(&app, &id).await?;

    if !auth.can_modify(bootcamp.user) {
        return Err(ResponseError::Forbidden(format!(
            "User {} is not authorized to delete this bootcamp",
            auth.user_id
        )));
    }

    if !derived::delete_bootcamp(app.store.as_ref(), bootcamp.id).await? {
        return Err(not_found(BOOTCAMP, bootcamp.id));
    }

    info!(&app.logger, "Bootcamp {} deleted by {}", bootcamp.id, auth.user_id; "module" => "bootcamp");

    Ok(Json(SuccessResponse::default()))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use primitives::{
        bootcamp::Career,
        review,
        test_util::{
            dummy_bootcamp, dummy_course, dummy_review, ADMIN_ID, PUBLISHER_2_ID, PUBLISHER_ID,
            USER_ID,
        },
        user::Role,
    };

    use super::*;
    use crate::test_util::{seed, setup_dummy_app};

    fn publisher() -> Auth {
        Auth {
            user_id: *PUBLISHER_ID,
            role: Role::Publisher,
        }
    }

    fn admin() -> Auth {
        Auth {
            user_id: *ADMIN_ID,
            role: Role::Admin,
        }
    }

    fn create_request(name: &str) -> CreateBootcamp {
        CreateBootcamp {
            name: name.to_string(),
            description: "Full stack web development".to_string(),
            website: Some("https://devworks.com".to_string()),
            email: Some("enroll@devworks.com".to_string()),
            address: "233 Bay State Rd Boston MA 02215".to_string(),
            careers: vec![Career::WebDevelopment],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_and_get_bootcamp() {
        let app = Arc::new(setup_dummy_app().await);

        let (status, Json(created)) = create_bootcamp(
            Extension(app.clone()),
            Extension(publisher()),
            Ok(Json(create_request(" Devworks Bootcamp "))),
        )
        .await
        .expect("Should create bootcamp");

        assert_eq!(StatusCode::CREATED, status);
        assert_eq!(json!("Devworks Bootcamp"), created.data["name"]);
        assert_eq!(json!("devworks-bootcamp"), created.data["slug"]);
        assert_eq!(json!(PUBLISHER_ID.to_hex()), created.data["user"]);
        assert_eq!(json!(null), created.data["averageCost"]);

        let id = created.data["_id"]
            .as_str()
            .expect("Should have an id")
            .to_string();

        let Json(fetched) = get_bootcamp(Extension(app.clone()), Path(id))
            .await
            .expect("Should get bootcamp");

        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn publisher_bootcamp_limit_and_duplicate_names() {
        let app = Arc::new(setup_dummy_app().await);
        seed(
            &app,
            bootcamp::COLLECTION,
            &[dummy_bootcamp("Devworks Bootcamp", *PUBLISHER_ID, 0)],
        )
        .await;

        let already_published = create_bootcamp(
            Extension(app.clone()),
            Extension(publisher()),
            Ok(Json(create_request("ModernTech Bootcamp"))),
        )
        .await
        .expect_err("Should fail");
        assert_eq!(
            ResponseError::BadRequest(format!(
                "The user with ID {} has already published a bootcamp",
                *PUBLISHER_ID
            )),
            already_published
        );

        // admins are not limited, but names are still unique
        let duplicate = create_bootcamp(
            Extension(app.clone()),
            Extension(admin()),
            Ok(Json(create_request("Devworks Bootcamp"))),
        )
        .await
        .expect_err("Should fail");
        assert_eq!(
            ResponseError::BadRequest("Duplicate field value entered".to_string()),
            duplicate
        );

        create_bootcamp(
            Extension(app.clone()),
            Extension(admin()),
            Ok(Json(create_request("ModernTech Bootcamp"))),
        )
        .await
        .expect("Admin should create a second bootcamp");
    }

    #[tokio::test]
    async fn invalid_bootcamp_is_rejected() {
        let app = Arc::new(setup_dummy_app().await);

        let error = create_bootcamp(
            Extension(app.clone()),
            Extension(publisher()),
            Ok(Json(CreateBootcamp::default())),
        )
        .await
        .expect_err("Should fail");

        assert_eq!(
            ResponseError::FailedValidation(
                "Please add a name, Please add a description, Please add an address, Please add at least one career"
                    .to_string()
            ),
            error
        );
    }

    #[tokio::test]
    async fn missing_and_malformed_ids() {
        let app = Arc::new(setup_dummy_app().await);
        let missing = bson::oid::ObjectId::new();

        let error = get_bootcamp(Extension(app.clone()), Path(missing.to_hex()))
            .await
            .expect_err("Should fail");
        assert_eq!(
            ResponseError::NotFound(format!("Bootcamp not found with id of {}", missing)),
            error
        );

        let error = get_bootcamp(Extension(app.clone()), Path("not-an-id".to_string()))
            .await
            .expect_err("Should fail");
        assert_eq!(
            ResponseError::NotFound("Bootcamp not found with id of not-an-id".to_string()),
            error
        );
    }

    #[tokio::test]
    async fn only_the_owner_or_an_admin_modify_the_bootcamp() {
        let app = Arc::new(setup_dummy_app().await);
        let bootcamp = dummy_bootcamp("Devworks Bootcamp", *PUBLISHER_ID, 0);
        seed(&app, bootcamp::COLLECTION, &[bootcamp.clone()]).await;

        let other_publisher = Auth {
            user_id: *PUBLISHER_2_ID,
            role: Role::Publisher,
        };
        let rename = |name: &str| ModifyBootcamp {
            name: Some(name.to_string()),
            ..Default::default()
        };

        let forbidden = update_bootcamp(
            Extension(app.clone()),
            Extension(other_publisher),
            Path(bootcamp.id.to_hex()),
            Ok(Json(rename("Stolen Bootcamp"))),
        )
        .await
        .expect_err("Should fail");
        assert_eq!(
            ResponseError::Forbidden(format!(
                "User {} is not authorized to update this bootcamp",
                *PUBLISHER_2_ID
            )),
            forbidden
        );

        let Json(updated) = update_bootcamp(
            Extension(app.clone()),
            Extension(publisher()),
            Path(bootcamp.id.to_hex()),
            Ok(Json(rename("Devworks Academy"))),
        )
        .await
        .expect("Owner should update");
        assert_eq!(json!("Devworks Academy"), updated.data["name"]);
        assert_eq!(json!("devworks-academy"), updated.data["slug"]);
        // untouched fields are kept
        assert_eq!(json!(bootcamp.description), updated.data["description"]);

        let Json(updated) = update_bootcamp(
            Extension(app.clone()),
            Extension(admin()),
            Path(bootcamp.id.to_hex()),
            Ok(Json(ModifyBootcamp {
                housing: Some(true),
                ..Default::default()
            })),
        )
        .await
        .expect("Admin should update");
        assert_eq!(json!(true), updated.data["housing"]);
        assert_eq!(json!("Devworks Academy"), updated.data["name"]);

        let no_changes = update_bootcamp(
            Extension(app.clone()),
            Extension(admin()),
            Path(bootcamp.id.to_hex()),
            Ok(Json(ModifyBootcamp::default())),
        )
        .await
        .expect_err("Should fail");
        assert!(matches!(no_changes, ResponseError::BadRequest(_)));
    }

    #[tokio::test]
    async fn deleting_cascades_to_courses_and_reviews() {
        let app = Arc::new(setup_dummy_app().await);
        let bootcamp = dummy_bootcamp("Devworks Bootcamp", *PUBLISHER_ID, 0);
        let other = dummy_bootcamp("ModernTech Bootcamp", *PUBLISHER_2_ID, 1);

        seed(&app, bootcamp::COLLECTION, &[bootcamp.clone(), other.clone()]).await;
        seed(
            &app,
            course::COLLECTION,
            &[
                dummy_course("Front End", 8000.0, &bootcamp),
                dummy_course("Back End", 12000.0, &other),
            ],
        )
        .await;
        seed(
            &app,
            review::COLLECTION,
            &[dummy_review(8, &bootcamp, *USER_ID)],
        )
        .await;

        let forbidden = delete_bootcamp(
            Extension(app.clone()),
            Extension(publisher()),
            Path(other.id.to_hex()),
        )
        .await
        .expect_err("Should fail");
        assert!(matches!(forbidden, ResponseError::Forbidden(_)));

        let Json(response) = delete_bootcamp(
            Extension(app.clone()),
            Extension(publisher()),
            Path(bootcamp.id.to_hex()),
        )
        .await
        .expect("Should delete");
        assert_eq!(SuccessResponse::default(), response);

        let store = app.store.as_ref();
        assert_eq!(
            1,
            store
                .count(bootcamp::COLLECTION, &Filter::new())
                .await
                .unwrap()
        );
        assert_eq!(
            vec![other.id],
            store
                .find(course::COLLECTION, &Filter::new(), Default::default())
                .await
                .unwrap()
                .iter()
                .map(|course| course.get_object_id("bootcamp").unwrap())
                .collect::<Vec<_>>()
        );
        assert_eq!(
            0,
            store
                .count(review::COLLECTION, &Filter::new())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn bootcamps_list_with_courses() {
        let app = Arc::new(setup_dummy_app().await);
        let devworks = dummy_bootcamp("Devworks Bootcamp", *PUBLISHER_ID, 0);
        let moderntech = dummy_bootcamp("ModernTech Bootcamp", *PUBLISHER_2_ID, 1);
        seed(&app, bootcamp::COLLECTION, &[devworks.clone(), moderntech]).await;
        seed(
            &app,
            course::COLLECTION,
            &[dummy_course("Front End", 8000.0, &devworks)],
        )
        .await;

        let Json(response) = list_bootcamps(
            Extension(app.clone()),
            RawQuery(Some("select=name&sort=name".to_string())),
        )
        .await
        .expect("Should list");

        assert_eq!(2, response.count);
        assert_eq!(json!("Devworks Bootcamp"), response.data[0]["name"]);
        assert_eq!(None, response.data[0].get("description"));
        assert_eq!(json!("Front End"), response.data[0]["courses"][0]["title"]);
        assert_eq!(json!([]), response.data[1]["courses"]);

        let error = list_bootcamps(
            Extension(app.clone()),
            RawQuery(Some("averageCost[lte]=cheap".to_string())),
        )
        .await
        .expect_err("Should fail");
        assert!(matches!(error, ResponseError::BadRequest(_)));
    }
}
