//! Middleware for JWT token validation and authentication

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};

use crate::{AppState, jwt::TokenType, routes::AuthError};

/// Require a valid, non-revoked access token
///
/// On success the token's [`crate::jwt::Claims`] are added to the request
/// extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthError::Unauthorized)?
        .to_string();

    let claims = state.jwt_service.validate_token(&token).map_err(|e| {
        debug!("Rejected token: {}", e);
        AuthError::Unauthorized
    })?;

    if claims.token_type != TokenType::Access {
        return Err(AuthError::Unauthorized);
    }

    let is_blacklisted = state
        .jwt_service
        .is_token_blacklisted(&state.redis_pool, &token)
        .await
        .map_err(|e| {
            error!("Failed to check if token is blacklisted: {}", e);
            AuthError::InternalServerError
        })?;

    if is_blacklisted {
        return Err(AuthError::Unauthorized);
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
