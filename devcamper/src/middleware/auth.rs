use std::sync::Arc;

use axum::{
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
};
use slog::debug;

use primitives::{user, user::Role, User};

use crate::{
    authenticator::Authenticator, db::fetch_by_id, response::ResponseError, Application, Auth,
};

/// Sets [`Auth`] if a valid Bearer token was provided.
///
/// Requests without an `Authorization` header continue without [`Auth`].
/// A header without the `Bearer` scheme, an invalid token or a token of a
/// user who no longer exists result in [`ResponseError::Unauthorized`].
pub async fn authenticate<A: Authenticator + 'static, B>(
    mut request: Request<B>,
    next: Next<B>,
) -> Result<axum::response::Response, ResponseError> {
    let app = request
        .extensions()
        .get::<Arc<Application<A>>>()
        .expect("Application should always be present")
        .clone();

    let token = match request.headers().get(AUTHORIZATION) {
        Some(header) => header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ResponseError::Unauthorized)?
            .to_string(),
        None => return Ok(next.run(request).await),
    };

    let user_id = app.authenticator.verify(&token).await.map_err(|error| {
        debug!(&app.logger, "Authentication failed: {}", error; "module" => "auth");

        ResponseError::Unauthorized
    })?;

    let user = fetch_by_id::<User>(app.store.as_ref(), user::COLLECTION, user_id)
        .await?
        .ok_or(ResponseError::Unauthorized)?;

    request.extensions_mut().insert(Auth {
        user_id: user.id,
        role: user.role,
    });

    Ok(next.run(request).await)
}

pub async fn authentication_required<B>(
    request: Request<B>,
    next: Next<B>,
) -> Result<axum::response::Response, ResponseError> {
    if request.extensions().get::<Auth>().is_some() {
        Ok(next.run(request).await)
    } else {
        Err(ResponseError::Unauthorized)
    }
}

fn authorize<B>(request: &Request<B>, roles: &[Role]) -> Result<(), ResponseError> {
    let auth = request
        .extensions()
        .get::<Auth>()
        .ok_or(ResponseError::Unauthorized)?;

    if roles.contains(&auth.role) {
        Ok(())
    } else {
        Err(ResponseError::Forbidden(format!(
            "User role {} is not authorized to access this route",
            auth.role
        )))
    }
}

/// Requires a [`Role::Publisher`] or [`Role::Admin`]
pub async fn publisher_or_admin<B>(
    request: Request<B>,
    next: Next<B>,
) -> Result<axum::response::Response, ResponseError> {
    authorize(&request, &[Role::Publisher, Role::Admin])?;

    Ok(next.run(request).await)
}

/// Requires a [`Role::User`] or [`Role::Admin`]
pub async fn user_or_admin<B>(
    request: Request<B>,
    next: Next<B>,
) -> Result<axum::response::Response, ResponseError> {
    authorize(&request, &[Role::User, Role::Admin])?;

    Ok(next.run(request).await)
}

pub async fn admin_only<B>(
    request: Request<B>,
    next: Next<B>,
) -> Result<axum::response::Response, ResponseError> {
    authorize(&request, &[Role::Admin])?;

    Ok(next.run(request).await)
}
