//! Shared fixtures for the HTTP-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use taskdeck_server::{app_state::AppState, data_context::DataContext, map_routes, settings::Settings};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub fn test_settings(database_path: String, conceal_foreign_tasks: bool) -> Settings {
    Settings {
        tcp_socket_binding: "127.0.0.1".into(),
        tcp_socket_port: 5000,
        database_path,
        jwt_secret: "integration-test-secret-with-plenty-of-characters".into(),
        jwt_expiration_in_minutes: 60,
        client_url: "http://localhost:5173".into(),
        static_dir: None,
        secure_cookies: false,
        conceal_foreign_tasks,
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_concealment(false)
    }

    pub fn with_concealment(conceal_foreign_tasks: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.redb").display().to_string();
        let settings = test_settings(path, conceal_foreign_tasks);
        let data_context = DataContext::open(&settings.database_path).unwrap();
        TestApp {
            router: map_routes(Arc::new(AppState::new(data_context, settings))),
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, headers, body }
    }

    pub async fn call(&self, method: Method, uri: &str, session: Option<&str>, body: Option<Value>) -> TestResponse {
        self.send(request(method, uri, session, body)).await
    }

    /// Register a user and return the `token=…` pair to send back as a cookie.
    pub async fn register(&self, name: &str, email: &str) -> String {
        let response = self
            .call(
                Method::POST,
                "/api/v1/register",
                None,
                Some(json!({ "name": name, "email": email, "password": "secret123" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        session_from(&response.headers).expect("register sets a session cookie")
    }

    pub async fn create_task(&self, session: &str, body: Value) -> Value {
        let response = self.call(Method::POST, "/api/v1/tasks", Some(session), Some(body)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }
}

pub fn request(method: Method, uri: &str, session: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = session {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// The `name=value` part of the Set-Cookie header, if any.
pub fn session_from(headers: &HeaderMap) -> Option<String> {
    let cookie = headers.get(header::SET_COOKIE)?.to_str().ok()?;
    cookie.split(';').next().map(str::to_string)
}
