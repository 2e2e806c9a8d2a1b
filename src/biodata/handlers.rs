use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{BiodataCreated, BiodataQuery, BiodataUpdated};
use crate::{
    auth::{extractors::AuthUser, services::ensure_owner},
    db::models::{Biodata, BiodataFields, PremiumProfile, SortQuery},
    error::AppResult,
    state::AppState,
};

/// How many premium profiles the home page shows.
const PREMIUM_SHOWCASE_LIMIT: usize = 6;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/bioData/:email", get(get_by_email))
        .route("/all-biodata", get(search))
        .route("/premium-biodata", get(premium_showcase))
}

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/all-bioData/:email", patch(upsert))
        .route("/bioDataDetails/:id", get(get_details))
}

/// Creates the caller's biodata on first save, patches it afterwards.
///
/// New records get `max(bioDataId) + 1`. The read and the insert are separate
/// storage calls, so two first saves racing each other can pick the same id; the
/// unique index on `biodata_id` makes the loser fail instead of storing a duplicate.
#[instrument(skip(state, fields))]
pub async fn upsert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(email): Path<String>,
    Json(fields): Json<BiodataFields>,
) -> AppResult<Response> {
    ensure_owner(&auth, &email)?;

    if state.store.find_biodata_by_email(&email).await?.is_some() {
        let update_result = state.store.update_biodata(&email, fields).await?;
        info!(%email, modified = update_result.modified_count, "biodata updated");
        return Ok(Json(BiodataUpdated {
            message: "User BioData Updated",
            update_result,
        })
        .into_response());
    }

    let next_id = state.store.max_biodata_id().await?.unwrap_or(0) + 1;
    let insert_result = state.store.insert_biodata(&email, next_id, fields).await?;
    info!(%email, biodata_id = next_id, "biodata created");
    Ok(Json(BiodataCreated {
        message: "User BioData Created",
        insert_result,
    })
    .into_response())
}

#[instrument(skip(state))]
pub async fn get_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<Option<Biodata>>> {
    Ok(Json(state.store.find_biodata_by_email(&email).await?))
}

#[instrument(skip(state))]
pub async fn get_details(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Option<Biodata>>> {
    Ok(Json(state.store.find_biodata_by_id(id).await?))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<BiodataQuery>,
) -> AppResult<Json<Vec<Biodata>>> {
    let filter = query.into_filter()?;
    Ok(Json(state.store.search_biodata(&filter).await?))
}

#[instrument(skip(state))]
pub async fn premium_showcase(
    State(state): State<AppState>,
    Query(query): Query<SortQuery>,
) -> AppResult<Json<Vec<PremiumProfile>>> {
    let profiles = state
        .store
        .list_premium_profiles(query.strict(), PREMIUM_SHOWCASE_LIMIT)
        .await?;
    Ok(Json(profiles))
}
