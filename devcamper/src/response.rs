use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use primitives::{
    devcamper::ErrorResponse, query::QueryError, validation::ValidationError,
};

use crate::db::StoreError;

/// The message returned to the client for every [`ResponseError::Internal`].
pub const SERVER_ERROR: &str = "Server Error";

#[derive(Debug, PartialEq, Eq)]
pub enum ResponseError {
    NotFound(String),
    BadRequest(String),
    FailedValidation(String),
    Unauthorized,
    Forbidden(String),
    /// The cause is logged, but never sent to the client.
    Internal(String),
}

/// Attached to the response of a [`ResponseError::Internal`],
/// so the request logging can log the cause of the error.
#[derive(Debug, Clone)]
pub struct InternalError(pub String);

impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ResponseError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ResponseError::BadRequest(message) | ResponseError::FailedValidation(message) => {
                (StatusCode::BAD_REQUEST, message)
            }
            ResponseError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Not authorized to access this route".to_string(),
            ),
            ResponseError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            ResponseError::Internal(cause) => {
                let mut response = (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(SERVER_ERROR)),
                )
                    .into_response();
                response.extensions_mut().insert(InternalError(cause));

                return response;
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

impl From<QueryError> for ResponseError {
    fn from(error: QueryError) -> Self {
        ResponseError::BadRequest(error.to_string())
    }
}

impl From<ValidationError> for ResponseError {
    fn from(error: ValidationError) -> Self {
        ResponseError::FailedValidation(error.to_string())
    }
}

impl From<JsonRejection> for ResponseError {
    fn from(rejection: JsonRejection) -> Self {
        ResponseError::BadRequest(rejection.to_string())
    }
}

impl From<StoreError> for ResponseError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Duplicate(_) => {
                ResponseError::BadRequest("Duplicate field value entered".to_string())
            }
            error => ResponseError::Internal(error.to_string()),
        }
    }
}

impl From<bson::ser::Error> for ResponseError {
    fn from(error: bson::ser::Error) -> Self {
        ResponseError::Internal(error.to_string())
    }
}

#[cfg(test)]
mod test {
    use crate::middleware::body_to_string;

    use super::*;

    #[tokio::test]
    async fn error_responses() {
        let not_found =
            ResponseError::NotFound("Bootcamp not found with id of 1".to_string()).into_response();
        assert_eq!(StatusCode::NOT_FOUND, not_found.status());
        assert_eq!(
            ErrorResponse::new("Bootcamp not found with id of 1"),
            serde_json::from_str::<ErrorResponse>(&body_to_string(not_found).await)
                .expect("Should deserialize")
        );

        let unauthorized = ResponseError::Unauthorized.into_response();
        assert_eq!(StatusCode::UNAUTHORIZED, unauthorized.status());

        let validation = ResponseError::from(ValidationError(vec![
            "Please add a name".to_string(),
            "Please add an address".to_string(),
        ]))
        .into_response();
        assert_eq!(StatusCode::BAD_REQUEST, validation.status());
        assert_eq!(
            r#"{"success":false,"error":"Please add a name, Please add an address"}"#,
            body_to_string(validation).await
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_the_cause() {
        let internal = ResponseError::from(StoreError::Poisoned).into_response();

        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, internal.status());
        assert_eq!(
            Some("The lock of the in-memory store was poisoned"),
            internal
                .extensions()
                .get::<InternalError>()
                .map(|error| error.0.as_str())
        );
        assert_eq!(
            r#"{"success":false,"error":"Server Error"}"#,
            body_to_string(internal).await
        );

        assert_eq!(
            ResponseError::BadRequest("Duplicate field value entered".to_string()),
            ResponseError::from(StoreError::Duplicate("bootcamps".to_string()))
        );
    }
}
