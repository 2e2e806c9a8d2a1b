use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::extractors::AdminUser,
    db::models::{BiodataType, MemberStatus},
    error::AppResult,
    state::AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_bio_data: u64,
    pub total_premium: u64,
    pub total_male_bio: u64,
    pub total_female_bio: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicStats {
    pub total_bio_data: u64,
    pub total_male_bio: u64,
    pub total_female_bio: u64,
    pub couple_paired: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin-stat", get(admin_stats))
        .route("/public-stat", get(public_stats))
}

#[instrument(skip(state))]
pub async fn admin_stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<AdminStats>> {
    let store = &state.store;
    let (total_bio_data, total_premium, total_male_bio, total_female_bio, total_revenue) = tokio::try_join!(
        store.count_biodata(None),
        store.count_users_with_status(MemberStatus::Premium),
        store.count_biodata(Some(BiodataType::Male)),
        store.count_biodata(Some(BiodataType::Female)),
        store.total_revenue(),
    )?;

    Ok(Json(AdminStats {
        total_bio_data,
        total_premium,
        total_male_bio,
        total_female_bio,
        total_revenue,
    }))
}

#[instrument(skip(state))]
pub async fn public_stats(State(state): State<AppState>) -> AppResult<Json<PublicStats>> {
    let store = &state.store;
    let (total_bio_data, total_male_bio, total_female_bio, couple_paired) = tokio::try_join!(
        store.count_biodata(None),
        store.count_biodata(Some(BiodataType::Male)),
        store.count_biodata(Some(BiodataType::Female)),
        store.count_reviews(),
    )?;

    Ok(Json(PublicStats {
        total_bio_data,
        total_male_bio,
        total_female_bio,
        couple_paired,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::db::models::{
        BiodataFields, BiodataType, MemberStatus, NewPayment, NewReview, Role,
    };
    use crate::test_utils::TestApp;

    async fn seed_biodata(app: &TestApp, email: &str, id: i64, kind: Option<BiodataType>) {
        app.state
            .store
            .insert_biodata(
                email,
                id,
                BiodataFields {
                    biodata_type: kind,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    async fn seed_payment(app: &TestApp, price: f64) {
        app.state
            .store
            .insert_payment(NewPayment {
                email: "payer@x.com".into(),
                price,
                biodata_id: Some(1),
                transaction_id: None,
                name: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn public_stats_count_biodata_and_couples() {
        let app = TestApp::new();
        seed_biodata(&app, "a@x.com", 1, Some(BiodataType::Male)).await;
        seed_biodata(&app, "b@x.com", 2, Some(BiodataType::Female)).await;
        seed_biodata(&app, "c@x.com", 3, Some(BiodataType::Male)).await;
        seed_biodata(&app, "d@x.com", 4, None).await;
        app.state
            .store
            .insert_review(NewReview::default())
            .await
            .unwrap();

        let res = app.get("/public-stat", None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(
            res.body,
            json!({
                "totalBioData": 4,
                "totalMaleBio": 2,
                "totalFemaleBio": 1,
                "couplePaired": 1,
            })
        );
    }

    #[tokio::test]
    async fn admin_stats_omit_revenue_without_payments() {
        let app = TestApp::new();
        app.seed_user("admin@x.com", Role::Admin, MemberStatus::Premium)
            .await;
        app.seed_user("alice@x.com", Role::Customer, MemberStatus::Requested)
            .await;
        let admin = app.session("admin@x.com");

        let res = app.get("/admin-stat", Some(&admin)).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(
            res.body,
            json!({
                "totalBioData": 0,
                "totalPremium": 1,
                "totalMaleBio": 0,
                "totalFemaleBio": 0,
            })
        );
    }

    #[tokio::test]
    async fn admin_stats_sum_payment_prices() {
        let app = TestApp::new();
        app.seed_user("admin@x.com", Role::Admin, MemberStatus::Normal)
            .await;
        seed_payment(&app, 5.0).await;
        seed_payment(&app, 7.5).await;
        let admin = app.session("admin@x.com");

        let res = app.get("/admin-stat", Some(&admin)).await;
        assert_eq!(res.body["totalRevenue"], 12.5);
        assert_eq!(res.body["totalPremium"], 0);
    }

    #[tokio::test]
    async fn admin_stats_reject_customers_and_anonymous() {
        let app = TestApp::new();
        app.seed_user("alice@x.com", Role::Customer, MemberStatus::Premium)
            .await;
        let res = app.get("/admin-stat", None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);

        let alice = app.session("alice@x.com");
        let res = app.get("/admin-stat", Some(&alice)).await;
        assert_eq!(res.status, StatusCode::FORBIDDEN);
    }
}
