use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::ReviewRequest;
use crate::{
    auth::extractors::{AdminUser, AuthUser},
    db::models::{InsertOutcome, Review, SortQuery},
    error::AppResult,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/client-review", get(list_reviews))
        .route("/success-story", post(create_review))
        .route("/reviewFor-admin", get(list_reviews_for_admin))
}

#[instrument(skip(state))]
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<SortQuery>,
) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(state.store.list_reviews(query.lenient()).await?))
}

#[instrument(skip(state, body))]
pub async fn create_review(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    Json(body): Json<ReviewRequest>,
) -> AppResult<Json<InsertOutcome>> {
    let review = body.into_new_review()?;
    let result = state.store.insert_review(review).await?;
    info!(%email, id = %result.inserted_id, "success story submitted");
    Ok(Json(result))
}

#[instrument(skip(state))]
pub async fn list_reviews_for_admin(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(state.store.list_reviews(None).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::db::models::{MemberStatus, Role};
    use crate::test_utils::TestApp;

    async fn submit(app: &TestApp, session: &str, name: &str, date: Value) {
        let res = app
            .post(
                "/success-story",
                Some(session),
                json!({
                    "name": name,
                    "selfBiodataId": 1,
                    "partnerBiodataId": 2,
                    "reviewStar": 5,
                    "successStory": "We met here",
                    "marriageDate": date,
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["acknowledged"], true);
    }

    fn names(body: &Value) -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn reviews_sort_by_marriage_date() {
        let app = TestApp::new();
        let session = app.session("alice@x.com");
        submit(&app, &session, "middle", json!("2022-06-15")).await;
        submit(&app, &session, "undated", Value::Null).await;
        submit(&app, &session, "late", json!("2024-01-01T00:00:00Z")).await;
        submit(&app, &session, "early", json!("2019-03-10")).await;

        let res = app.get("/client-review", None).await;
        assert_eq!(names(&res.body), ["middle", "undated", "late", "early"]);

        let res = app.get("/client-review?sort=asc", None).await;
        assert_eq!(names(&res.body), ["undated", "early", "middle", "late"]);

        let res = app.get("/client-review?sort=whatever", None).await;
        assert_eq!(names(&res.body), ["late", "middle", "early", "undated"]);
    }

    #[tokio::test]
    async fn submitted_review_round_trips_fields() {
        let app = TestApp::new();
        let session = app.session("alice@x.com");
        submit(&app, &session, "pair", json!("2022-06-15")).await;

        let res = app.get("/client-review", None).await;
        let review = &res.body[0];
        assert_eq!(review["selfBiodataId"], 1);
        assert_eq!(review["partnerBiodataId"], 2);
        assert_eq!(review["reviewStar"], 5);
        assert_eq!(review["marriageDate"], "2022-06-15T00:00:00Z");
        assert!(review["_id"].is_string());
    }

    #[tokio::test]
    async fn submitting_requires_session_and_valid_date() {
        let app = TestApp::new();
        let res = app
            .post("/success-story", None, json!({ "name": "x" }))
            .await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);

        let session = app.session("alice@x.com");
        let res = app
            .post(
                "/success-story",
                Some(&session),
                json!({ "marriageDate": "someday" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_listing_is_admin_only() {
        let app = TestApp::new();
        app.seed_user("admin@x.com", Role::Admin, MemberStatus::Normal)
            .await;
        app.seed_user("alice@x.com", Role::Customer, MemberStatus::Normal)
            .await;
        let alice = app.session("alice@x.com");
        submit(&app, &alice, "first", json!("2020-01-01")).await;
        submit(&app, &alice, "second", json!("2021-01-01")).await;

        let res = app.get("/reviewFor-admin", Some(&alice)).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);

        let admin = app.session("admin@x.com");
        let res = app.get("/reviewFor-admin", Some(&admin)).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(names(&res.body), ["first", "second"]);
    }
}
