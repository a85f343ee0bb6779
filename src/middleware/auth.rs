use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{AppState, error::AppError};

/// Verifies the bearer access token and injects its claims as a request extension
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

    let claims = state.tokens.verify_access(bearer.token())?;
    tracing::debug!("Authenticated request for user {}", claims.sub);

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
