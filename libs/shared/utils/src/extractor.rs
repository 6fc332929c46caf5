use std::sync::Arc;

use axum::{
    extract::{FromRequest, State},
    http::Request,
    middleware::Next,
    response::Response,
    body::Body,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_config::AppConfig;

use crate::jwt::validate_token;

fn authenticate(config: &AppConfig, request: &Request<Body>) -> Result<User, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    validate_token(token, &config.supabase_jwt_secret).map_err(AppError::Auth)
}

/// Require a valid bearer token and expose the caller as an `Extension<User>`.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&config, &request)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Like `auth_middleware`, but only lets shop administrators through.
pub async fn admin_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&config, &request)?;

    if !user.is_admin() {
        warn!("User {} attempted an admin operation without the admin role", user.id);
        return Err(AppError::Forbidden("Administrator access required".to_string()));
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// `Json` whose rejections use the API error envelope instead of axum's plain-text body.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}
