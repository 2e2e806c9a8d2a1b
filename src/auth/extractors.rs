use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use super::{jwt::SessionKeys, session::SESSION_COOKIE_NAME};
use crate::{db::models::Role, error::AppError, state::AppState};

/// Email of the caller, taken from a valid session cookie.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(AppError::Unauthenticated)?;

        let keys = SessionKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired session token");
            AppError::Unauthenticated
        })?;

        Ok(AuthUser(claims.email))
    }
}

/// An authenticated caller whose stored role is `admin`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(email) = AuthUser::from_request_parts(parts, state).await?;

        match state.store.find_user(&email).await? {
            Some(user) if user.role == Role::Admin => Ok(AdminUser(email)),
            _ => {
                warn!(%email, "admin route denied");
                Err(AppError::Forbidden)
            }
        }
    }
}
