use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use sea_orm::EntityTrait;

use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::utils::jwt::verify_token;
use crate::AppState;

/// Validate the bearer token and load the referenced user. A token whose
/// user row no longer exists is rejected, not just an invalid signature.
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let auth = auth
        .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))?;

    let claims = verify_token(auth.token(), &state.config.jwt_secret)?;

    let user = user::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not authorized, user not found".to_string()))?;

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Require admin role
pub async fn require_admin(
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let user = request
        .extensions()
        .get::<user::Model>()
        .ok_or_else(|| AppError::Unauthorized("No authentication found".to_string()))?;

    if user.role != UserRole::Admin {
        return Err(AppError::Forbidden(
            "Not authorized, admin access required".to_string(),
        ));
    }

    Ok(next.run(request).await)
}
