//! `/api/v1/auth` routes
use std::sync::Arc;

use axum::{Extension, Json};
use serde_json::Value;

use primitives::{devcamper::DataResponse, user, util::json::document_to_json};

use crate::{
    authenticator::Authenticator, db::find_by_id, response::ResponseError, Application, Auth,
};

/// `GET /api/v1/auth/me`
///
/// The user authenticated by the Bearer token of the request.
pub async fn get_me<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Extension(auth): Extension<Auth>,
) -> Result<Json<DataResponse<Value>>, ResponseError> {
    let document = find_by_id(app.store.as_ref(), user::COLLECTION, auth.user_id)
        .await?
        .ok_or(ResponseError::Unauthorized)?;

    Ok(Json(DataResponse::new(document_to_json(&document))))
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use primitives::{test_util::PUBLISHER_ID, user::Role};

    use super::*;
    use crate::test_util::setup_dummy_app;

    #[tokio::test]
    async fn current_user() {
        let app = Arc::new(setup_dummy_app().await);
        let auth = Auth {
            user_id: *PUBLISHER_ID,
            role: Role::Publisher,
        };

        let Json(me) = get_me(Extension(app), Extension(auth))
            .await
            .expect("Should get the current user");

        assert_eq!(json!(PUBLISHER_ID.to_hex()), me.data["_id"]);
        assert_eq!(json!("Publisher Account"), me.data["name"]);
        assert_eq!(json!("publisher"), me.data["role"]);
    }
}
