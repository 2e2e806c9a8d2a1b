//! Helpers for driving the full router against the in-memory store.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    app::build_app,
    auth::jwt::SessionKeys,
    db::models::{MemberStatus, NewUser, Role, User},
    state::AppState,
};

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::fake();
        let router = build_app(state.clone());
        Self { state, router }
    }

    /// `Cookie` header value carrying a valid session for `email`.
    pub fn session(&self, email: &str) -> String {
        let keys = SessionKeys::from(&self.state.config.jwt);
        format!("token={}", keys.sign(email).expect("sign session"))
    }

    pub async fn seed_user(&self, email: &str, role: Role, status: MemberStatus) -> User {
        let store = &self.state.store;
        store
            .insert_user(NewUser {
                email: email.into(),
                name: Some(email.split('@').next().unwrap_or_default().to_string()),
                photo_url: None,
            })
            .await
            .expect("insert user");
        store.set_user_role(email, role).await.expect("set role");
        store
            .set_user_status(email, status)
            .await
            .expect("set status");
        store
            .find_user(email)
            .await
            .expect("find user")
            .expect("seeded user")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        session: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = session {
            builder = builder.header(header::COOKIE, cookie);
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let res = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("router is infallible");
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, session: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, session, None).await
    }

    pub async fn post(&self, uri: &str, session: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, session, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, session: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, session, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, session: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, session, None).await
    }
}
