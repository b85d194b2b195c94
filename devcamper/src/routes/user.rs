//! `/api/v1/users` routes, available only to admins
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, RawQuery},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;
use slog::info;

use primitives::{
    devcamper::{AdvancedResultsResponse, DataResponse, SuccessResponse},
    user::{self, CreateUser, ModifyUser},
    util::json::document_to_json,
};

use crate::{
    advanced_results::list_resource,
    authenticator::Authenticator,
    db::{find_by_id, id_filter, insert_item, is_duplicate},
    response::ResponseError,
    Application, Auth,
};

use super::{non_empty, not_found, parse_id};

const USER: &str = "User";

fn duplicate_email() -> ResponseError {
    ResponseError::BadRequest("Duplicate field value entered".to_string())
}

/// `GET /api/v1/users`
pub async fn list_users<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    RawQuery(query): RawQuery,
) -> Result<Json<AdvancedResultsResponse<Value>>, ResponseError> {
    let response = list_resource(
        app.store.as_ref(),
        &user::SCHEMA,
        query.as_deref(),
        app.config.default_limit,
        None,
    )
    .await?;

    Ok(Json(response))
}

/// `GET /api/v1/users/:id`
pub async fn get_user<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Value>>, ResponseError> {
    let id = parse_id(&id, USER)?;

    let document = find_by_id(app.store.as_ref(), user::COLLECTION, id)
        .await?
        .ok_or_else(|| not_found(USER, id))?;

    Ok(Json(DataResponse::new(document_to_json(&document))))
}

/// `POST /api/v1/users`
pub async fn create_user<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Extension(auth): Extension<Auth>,
    request: Result<Json<CreateUser>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<Value>>), ResponseError> {
    let Json(create) = request?;
    create.validate()?;

    let new_user = create.into_user();
    let store = app.store.as_ref();

    if is_duplicate(store, user::COLLECTION, "email", new_user.email.as_str(), None).await? {
        return Err(duplicate_email());
    }

    let document = insert_item(store, user::COLLECTION, &new_user).await?;

    info!(&app.logger, "User {} ({}) created by {}", new_user.id, new_user.role, auth.user_id; "module" => "user");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(document_to_json(&document))),
    ))
}

/// `PUT /api/v1/users/:id`
pub async fn update_user<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Path(id): Path<String>,
    request: Result<Json<ModifyUser>, JsonRejection>,
) -> Result<Json<DataResponse<Value>>, ResponseError> {
    let id = parse_id(&id, USER)?;

    let Json(modify) = request?;
    modify.validate()?;
    let changes = non_empty(modify.into_changes()?)?;

    let store = app.store.as_ref();

    if let Ok(email) = changes.get_str("email") {
        if is_duplicate(store, user::COLLECTION, "email", email, Some(id)).await? {
            return Err(duplicate_email());
        }
    }

    let updated = store
        .update(user::COLLECTION, id, changes)
        .await?
        .ok_or_else(|| not_found(USER, id))?;

    Ok(Json(DataResponse::new(document_to_json(&updated))))
}

/// `DELETE /api/v1/users/:id`
pub async fn delete_user<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ResponseError> {
    let id = parse_id(&id, USER)?;

    let deleted = app
        .store
        .delete(user::COLLECTION, &id_filter(id))
        .await?;

    if deleted == 0 {
        return Err(not_found(USER, id));
    }

    Ok(Json(SuccessResponse::default()))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use primitives::{
        test_util::{ADMIN_ID, USER_ID},
        user::Role,
    };

    use super::*;
    use crate::test_util::setup_dummy_app;

    fn admin() -> Auth {
        Auth {
            user_id: *ADMIN_ID,
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn create_user_with_unique_email() {
        let app = Arc::new(setup_dummy_app().await);

        let request = CreateUser {
            name: "John Doe".to_string(),
            email: " John@Gmail.com ".to_string(),
            role: Role::Publisher,
        };

        let (status, Json(created)) = create_user(
            Extension(app.clone()),
            Extension(admin()),
            Ok(Json(request.clone())),
        )
        .await
        .expect("Should create user");

        assert_eq!(StatusCode::CREATED, status);
        assert_eq!(json!("john@gmail.com"), created.data["email"]);
        assert_eq!(json!("publisher"), created.data["role"]);

        let duplicate = create_user(Extension(app.clone()), Extension(admin()), Ok(Json(request)))
            .await
            .expect_err("Should fail");
        assert_eq!(duplicate_email(), duplicate);
    }

    #[tokio::test]
    async fn update_and_delete_user() {
        let app = Arc::new(setup_dummy_app().await);

        let taken = update_user(
            Extension(app.clone()),
            Path(USER_ID.to_hex()),
            Ok(Json(ModifyUser {
                email: Some("ADMIN-ACCOUNT@devcamper.io".to_string()),
                ..Default::default()
            })),
        )
        .await
        .expect_err("Should fail");
        assert_eq!(duplicate_email(), taken);

        let Json(updated) = update_user(
            Extension(app.clone()),
            Path(USER_ID.to_hex()),
            Ok(Json(ModifyUser {
                role: Some(Role::Publisher),
                ..Default::default()
            })),
        )
        .await
        .expect("Should update");
        assert_eq!(json!("publisher"), updated.data["role"]);
        assert_eq!(json!("User Account"), updated.data["name"]);

        let Json(deleted) = delete_user(Extension(app.clone()), Path(USER_ID.to_hex()))
            .await
            .expect("Should delete");
        assert_eq!(SuccessResponse::default(), deleted);

        let missing = get_user(Extension(app.clone()), Path(USER_ID.to_hex()))
            .await
            .expect_err("Should fail");
        assert_eq!(not_found(USER, *USER_ID), missing);
    }

    #[tokio::test]
    async fn users_list() {
        let app = Arc::new(setup_dummy_app().await);

        let Json(response) = list_users(
            Extension(app.clone()),
            RawQuery(Some("role=publisher&sort=name".to_string())),
        )
        .await
        .expect("Should list");

        assert_eq!(2, response.count);
        assert_eq!(json!("Publisher Account"), response.data[0]["name"]);
        assert_eq!(json!("Second Publisher"), response.data[1]["name"]);
    }
}
