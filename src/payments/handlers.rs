use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::dto::{IntentRequest, IntentResponse, PaymentRequest, PaymentSaved};
use crate::{
    auth::{extractors::AuthUser, services::ensure_owner},
    db::models::{ContactRequest, DeleteOutcome, NewPayment},
    error::{AppError, AppResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create-payment-intent", post(create_intent))
        .route("/payments", post(save_payment))
        .route("/contact-req/:email", get(list_contact_requests))
        .route("/contact-req-dlt/:id", delete(delete_contact_request))
}

#[instrument(skip(state))]
pub async fn create_intent(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    Json(body): Json<IntentRequest>,
) -> AppResult<Json<IntentResponse>> {
    let amount = body.amount_minor()?;
    let client_secret = state.payments.create_intent(amount).await.map_err(|e| {
        error!(error = %e, %email, amount, "payment intent failed");
        AppError::Internal(e.into())
    })?;
    Ok(Json(IntentResponse { client_secret }))
}

/// Stores what the client reports; the charge is not re-checked with the processor.
#[instrument(skip(state))]
pub async fn save_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<PaymentRequest>,
) -> AppResult<Json<PaymentSaved>> {
    let email = body.email.unwrap_or_else(|| auth.0.clone());
    ensure_owner(&auth, &email)?;
    if !body.price.is_finite() || body.price < 0.0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }

    let payment_result = state
        .store
        .insert_payment(NewPayment {
            email,
            price: body.price,
            biodata_id: body.biodata_id,
            transaction_id: body.transaction_id,
            name: body.name,
        })
        .await?;
    info!(email = %auth.0, price = body.price, "payment recorded");
    Ok(Json(PaymentSaved { payment_result }))
}

#[instrument(skip(state))]
pub async fn list_contact_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(email): Path<String>,
) -> AppResult<Json<Vec<ContactRequest>>> {
    ensure_owner(&auth, &email)?;
    Ok(Json(state.store.list_contact_requests(&email).await?))
}

#[instrument(skip(state))]
pub async fn delete_contact_request(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteOutcome>> {
    let result = state.store.delete_payment(id, &email).await?;
    info!(%email, %id, deleted = result.deleted_count, "contact request removed");
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::db::models::{MemberStatus, Role};
    use crate::test_utils::TestApp;

    #[tokio::test]
    async fn intent_returns_processor_secret_for_amount_in_cents() {
        let app = TestApp::new();
        let session = app.session("alice@x.com");
        let res = app
            .post("/create-payment-intent", Some(&session), json!({ "price": 5 }))
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, json!({ "clientSecret": "pi_fake_500_secret" }));
    }

    #[tokio::test]
    async fn intent_requires_session_and_positive_price() {
        let app = TestApp::new();
        let res = app
            .post("/create-payment-intent", None, json!({ "price": 5 }))
            .await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);

        let session = app.session("alice@x.com");
        let res = app
            .post("/create-payment-intent", Some(&session), json!({ "price": 0 }))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn contact_requests_carry_payer_status_and_name() {
        let app = TestApp::new();
        app.seed_user("alice@x.com", Role::Customer, MemberStatus::Premium)
            .await;
        let session = app.session("alice@x.com");

        let res = app
            .post(
                "/payments",
                Some(&session),
                json!({ "price": 5, "biodataId": 12, "transactionId": "pi_123" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["paymentResult"]["acknowledged"], true);

        let res = app.get("/contact-req/alice@x.com", Some(&session)).await;
        let list = res.body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["email"], "alice@x.com");
        assert_eq!(list[0]["biodataId"], 12);
        assert_eq!(list[0]["transactionId"], "pi_123");
        assert_eq!(list[0]["userStatus"], "Premium");
        assert_eq!(list[0]["userName"], "alice");
    }

    #[tokio::test]
    async fn contact_requests_of_others_are_unauthorized() {
        let app = TestApp::new();
        let session = app.session("alice@x.com");
        let res = app.get("/contact-req/bob@x.com", Some(&session)).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);

        let res = app
            .post(
                "/payments",
                Some(&session),
                json!({ "email": "bob@x.com", "price": 5 }),
            )
            .await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn deleting_a_contact_request_is_exact_and_idempotent() {
        let app = TestApp::new();
        app.seed_user("alice@x.com", Role::Customer, MemberStatus::Normal)
            .await;
        let session = app.session("alice@x.com");
        let saved = app
            .post("/payments", Some(&session), json!({ "price": 5, "biodataId": 1 }))
            .await;
        app.post("/payments", Some(&session), json!({ "price": 5, "biodataId": 2 }))
            .await;
        let id = saved.body["paymentResult"]["insertedId"]
            .as_str()
            .unwrap()
            .to_string();

        let res = app
            .delete(&format!("/contact-req-dlt/{id}"), Some(&session))
            .await;
        assert_eq!(res.body["deletedCount"], 1);
        let res = app
            .delete(&format!("/contact-req-dlt/{id}"), Some(&session))
            .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["deletedCount"], 0);

        let left = app.get("/contact-req/alice@x.com", Some(&session)).await;
        assert_eq!(left.body.as_array().unwrap().len(), 1);
        assert_eq!(left.body[0]["biodataId"], 2);
    }

    #[tokio::test]
    async fn malformed_id_is_rejected_before_the_store() {
        let app = TestApp::new();
        let session = app.session("alice@x.com");
        let res = app
            .delete("/contact-req-dlt/not-a-uuid", Some(&session))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }
}
