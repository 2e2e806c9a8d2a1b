use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{CreateUserRequest, RoleUpdate, StatusUpdate};
use crate::{
    auth::{
        extractors::{AdminUser, AuthUser},
        services::{ensure_owner, is_valid_email},
    },
    db::models::{MemberStatus, NewUser, RequestedUser, UpdateOutcome, User},
    error::{AppError, AppResult},
    state::AppState,
};

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:email", post(create_user))
        .route("/userInfo/:email", get(get_user))
        .route("/profile/:email", get(get_user))
}

pub fn member_routes() -> Router<AppState> {
    Router::new().route("/oneUser/:email", patch(request_premium))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/all-user/:email", get(list_other_users))
        .route("/user/role/:email", patch(update_role))
        .route("/user/status/:email", patch(update_status))
        .route("/req-user", get(list_requested))
}

/// Idempotent: an existing account is returned as stored.
#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    body: Option<Json<CreateUserRequest>>,
) -> AppResult<Json<User>> {
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }

    if let Some(existing) = state.store.find_user(&email).await? {
        return Ok(Json(existing));
    }

    let body = body.map(|Json(b)| b).unwrap_or_default();
    let user = state
        .store
        .insert_user(NewUser {
            email,
            name: body.name,
            photo_url: body.photo_url,
        })
        .await?;
    info!(user_id = %user.id, email = %user.email, "user created");
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<Option<User>>> {
    Ok(Json(state.store.find_user(&email).await?))
}

#[instrument(skip(state))]
pub async fn list_other_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(email): Path<String>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.store.list_users_except(&email).await?))
}

/// Member asks for premium; an admin later grants it through `update_status`.
#[instrument(skip(state))]
pub async fn request_premium(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(email): Path<String>,
) -> AppResult<Json<UpdateOutcome>> {
    ensure_owner(&auth, &email)?;

    match state.store.find_user(&email).await? {
        None
        | Some(User {
            status: MemberStatus::Requested,
            ..
        }) => {
            return Err(AppError::BadRequest(
                "You have already requested, wait for some time.".into(),
            ))
        }
        Some(User {
            status: MemberStatus::Premium,
            ..
        }) => return Err(AppError::BadRequest("You are already a premium member.".into())),
        Some(_) => {}
    }

    let result = state
        .store
        .set_user_status(&email, MemberStatus::Requested)
        .await?;
    info!(%email, "premium requested");
    Ok(Json(result))
}

#[instrument(skip(state))]
pub async fn update_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(email): Path<String>,
    Json(body): Json<RoleUpdate>,
) -> AppResult<Json<UpdateOutcome>> {
    let result = state.store.set_user_role(&email, body.role).await?;
    info!(%admin, %email, role = %body.role, "role updated");
    Ok(Json(result))
}

#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(email): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> AppResult<Json<UpdateOutcome>> {
    let result = state.store.set_user_status(&email, body.status).await?;
    info!(%admin, %email, status = %body.status, "status updated");
    Ok(Json(result))
}

#[instrument(skip(state))]
pub async fn list_requested(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<RequestedUser>>> {
    Ok(Json(state.store.list_requested_users().await?))
}
