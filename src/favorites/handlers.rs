use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{extractors::AuthUser, services::ensure_owner},
    db::models::{DeleteOutcome, Favorite, InsertOutcome, NewFavorite},
    error::AppResult,
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    /// Defaults to the caller.
    pub customer_email: Option<String>,
    pub biodata_id: i64,
    pub name: Option<String>,
    pub permanent_division: Option<String>,
    pub occupation: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/favouriteBio", post(add_favorite))
        .route("/favBioData/:email", get(list_favorites))
        .route("/favOneBiodata/:id", delete(remove_favorite))
}

#[instrument(skip(state))]
pub async fn add_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<FavoriteRequest>,
) -> AppResult<Json<InsertOutcome>> {
    let customer_email = body.customer_email.unwrap_or_else(|| auth.0.clone());
    ensure_owner(&auth, &customer_email)?;

    let result = state
        .store
        .insert_favorite(NewFavorite {
            customer_email,
            biodata_id: body.biodata_id,
            name: body.name,
            permanent_division: body.permanent_division,
            occupation: body.occupation,
        })
        .await?;
    info!(email = %auth.0, biodata_id = body.biodata_id, "favorite added");
    Ok(Json(result))
}

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(email): Path<String>,
) -> AppResult<Json<Vec<Favorite>>> {
    ensure_owner(&auth, &email)?;
    Ok(Json(state.store.list_favorites(&email).await?))
}

/// Unknown ids, or favorites belonging to someone else, delete nothing.
#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteOutcome>> {
    let result = state.store.delete_favorite(id, &email).await?;
    info!(%email, %id, deleted = result.deleted_count, "favorite removed");
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_utils::TestApp;

    #[tokio::test]
    async fn favorites_are_listed_per_owner() {
        let app = TestApp::new();
        let alice = app.session("alice@x.com");
        let bob = app.session("bob@x.com");

        let res = app
            .post(
                "/favouriteBio",
                Some(&alice),
                json!({ "biodataId": 3, "name": "Karim", "occupation": "Pilot" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["acknowledged"], true);
        app.post("/favouriteBio", Some(&bob), json!({ "biodataId": 9 }))
            .await;

        let res = app.get("/favBioData/alice@x.com", Some(&alice)).await;
        let list = res.body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["customerEmail"], "alice@x.com");
        assert_eq!(list[0]["biodataId"], 3);
        assert_eq!(list[0]["occupation"], "Pilot");
    }

    #[tokio::test]
    async fn favorite_for_another_customer_is_unauthorized() {
        let app = TestApp::new();
        let alice = app.session("alice@x.com");
        let res = app
            .post(
                "/favouriteBio",
                Some(&alice),
                json!({ "customerEmail": "bob@x.com", "biodataId": 1 }),
            )
            .await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);

        let res = app.get("/favBioData/bob@x.com", Some(&alice)).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_and_ignores_unknown_ids() {
        let app = TestApp::new();
        let alice = app.session("alice@x.com");
        let first = app
            .post("/favouriteBio", Some(&alice), json!({ "biodataId": 1 }))
            .await;
        app.post("/favouriteBio", Some(&alice), json!({ "biodataId": 2 }))
            .await;
        let id = first.body["insertedId"].as_str().unwrap().to_string();

        let res = app.delete(&format!("/favOneBiodata/{id}"), Some(&alice)).await;
        assert_eq!(
            res.body,
            json!({ "acknowledged": true, "deletedCount": 1 })
        );

        let res = app.delete(&format!("/favOneBiodata/{id}"), Some(&alice)).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["deletedCount"], 0);

        let left = app.get("/favBioData/alice@x.com", Some(&alice)).await;
        assert_eq!(left.body.as_array().unwrap().len(), 1);
        assert_eq!(left.body[0]["biodataId"], 2);
    }

    #[tokio::test]
    async fn delete_cannot_touch_another_users_favorite() {
        let app = TestApp::new();
        let alice = app.session("alice@x.com");
        let bob = app.session("bob@x.com");
        let res = app
            .post("/favouriteBio", Some(&alice), json!({ "biodataId": 1 }))
            .await;
        let id = res.body["insertedId"].as_str().unwrap().to_string();

        let res = app.delete(&format!("/favOneBiodata/{id}"), Some(&bob)).await;
        assert_eq!(res.body["deletedCount"], 0);
        let left = app.get("/favBioData/alice@x.com", Some(&alice)).await;
        assert_eq!(left.body.as_array().unwrap().len(), 1);
    }
}
