//! Bearer-token authentication extractor for Axum handlers.

pub mod identity;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use oneira_core::error::CoreError;
use oneira_core::types::Id;

use crate::auth::identity::IdentityError;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a Bearer token in the `Authorization`
/// header, verified against the external identity service.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's id as the identity service knows it.
    pub user_id: Id,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let user_id = state.identity.verify_token(token).await.map_err(|e| match e {
            IdentityError::InvalidToken => {
                AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
            }
            other => AppError::Core(CoreError::Upstream {
                service: "identity",
                message: other.to_string(),
            }),
        })?;

        Ok(AuthUser { user_id })
    }
}
