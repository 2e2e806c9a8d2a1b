use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::{
    extractors::AuthUser,
    jwt::SessionKeys,
    services::{ensure_owner, is_valid_email},
    session::{logout_cookie, session_cookie},
};
use crate::{
    db::models::Role,
    error::{AppError, AppResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminCheckResponse {
    pub admin: bool,
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/jwt", post(issue_token))
        .route("/logout", get(logout))
}

pub fn admin_check_routes() -> Router<AppState> {
    Router::new().route("/users/admin/:email", get(is_admin))
}

#[instrument(skip(state, jar, payload))]
pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<TokenRequest>,
) -> AppResult<(CookieJar, Json<SuccessResponse>)> {
    let email = payload.email.trim().to_string();
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }

    let keys = SessionKeys::from(&state.config.jwt);
    let token = keys.sign(&email)?;
    let cookie = session_cookie(token, state.config.production, state.config.jwt.ttl_days);

    info!(%email, "session issued");
    Ok((jar.add(cookie), Json(SuccessResponse { success: true })))
}

#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    let jar = jar.add(logout_cookie(state.config.production));
    (jar, Json(SuccessResponse { success: true }))
}

#[instrument(skip(state))]
pub async fn is_admin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(email): Path<String>,
) -> AppResult<Json<AdminCheckResponse>> {
    ensure_owner(&auth, &email)?;
    let admin = state
        .store
        .find_user(&email)
        .await?
        .is_some_and(|u| u.role == Role::Admin);
    Ok(Json(AdminCheckResponse { admin }))
}
