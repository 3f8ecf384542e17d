use futures::future::join_all;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    delete_task_response::DeleteTaskResponse, login_request::LoginRequest, message_response::MessageResponse,
    register_request::RegisterRequest, routes::API_PREFIX, task::Task, task_error::TaskError,
    task_fields::{normalize_tags, TagsInput, TaskFields},
    task_priority::TaskPriority, user_edit_request::UserEditRequest,
    user_get_response::UserGetResponse,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer; `message` is the server's, or a fallback.
    #[error("{message} ({status})")]
    Api { status: u16, message: String },

    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Invalid(#[from] TaskError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Longest title, description or tag the client sends.
pub const MAX_TEXT_LEN: usize = 500;

/// Keeps the session cookie between calls.
#[derive(Clone)]
pub struct TaskClient {
    http: Client,
    base_url: String,
}

impl TaskClient {
    /// `base_url` is the server origin, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder().cookie_store(true).build()?;
        Ok(TaskClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    // ── Session ────────────────────────────────────────────────

    pub async fn register(&self, request: &RegisterRequest) -> Result<UserGetResponse, ClientError> {
        let response = self.request(Method::POST, "/register").json(request).send().await?;
        parse(response, "Registration failed").await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserGetResponse, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.request(Method::POST, "/login").json(&body).send().await?;
        parse(response, "Login failed").await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self.request(Method::GET, "/logout").send().await?;
        parse::<MessageResponse>(response, "Logout failed").await.map(|_| ())
    }

    /// True if the current session is accepted. Transport errors still propagate.
    pub async fn login_status(&self) -> Result<bool, ClientError> {
        let response = self.request(Method::GET, "/login-status").send().await?;
        Ok(response.status().is_success())
    }

    pub async fn profile(&self) -> Result<UserGetResponse, ClientError> {
        let response = self.request(Method::GET, "/user").send().await?;
        parse(response, "Failed to fetch user profile").await
    }

    pub async fn update_profile(&self, edit: &UserEditRequest) -> Result<UserGetResponse, ClientError> {
        let response = self.request(Method::PATCH, "/user").json(edit).send().await?;
        parse(response, "Failed to update user profile").await
    }

    // ── Tasks ──────────────────────────────────────────────────

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let response = self.request(Method::GET, "/tasks").send().await?;
        parse(response, "Failed to fetch tasks").await
    }

    /// Sends the sanitized fields. A blank title never leaves the client.
    pub async fn create_task(&self, fields: &TaskFields) -> Result<Task, ClientError> {
        let fields = sanitize(fields);
        let changes = fields.clone().normalize()?;
        if changes.title.is_none() {
            return Err(TaskError::Validation("Title is required".to_string()).into());
        }
        let response = self.request(Method::POST, "/tasks").json(&fields).send().await?;
        parse(response, "Failed to create task").await
    }

    pub async fn get_task(&self, id: Uuid) -> Result<Task, ClientError> {
        let response = self.request(Method::GET, &task_path(id)).send().await?;
        parse(response, "Failed to fetch task").await
    }

    pub async fn update_task(&self, id: Uuid, fields: &TaskFields) -> Result<Task, ClientError> {
        let response = self.request(Method::PATCH, &task_path(id)).json(fields).send().await?;
        parse(response, "Failed to update task").await
    }

    pub async fn delete_task(&self, id: Uuid) -> Result<DeleteTaskResponse, ClientError> {
        let response = self.request(Method::DELETE, &task_path(id)).send().await?;
        parse(response, "Failed to delete task").await
    }

    // ── Bulk ───────────────────────────────────────────────────

    /// One outcome per id, in input order. Requests run concurrently and
    /// nothing is rolled back when some fail.
    pub async fn bulk_update(&self, ids: &[Uuid], fields: &TaskFields) -> Vec<(Uuid, Result<Task, ClientError>)> {
        let results = join_all(ids.iter().map(|id| self.update_task(*id, fields))).await;
        log_failures("bulk update", ids, &results);
        ids.iter().copied().zip(results).collect()
    }

    pub async fn bulk_complete(&self, ids: &[Uuid]) -> Vec<(Uuid, Result<Task, ClientError>)> {
        let fields = TaskFields {
            completed: Some(true),
            ..Default::default()
        };
        self.bulk_update(ids, &fields).await
    }

    pub async fn bulk_set_priority(
        &self,
        ids: &[Uuid],
        priority: TaskPriority,
    ) -> Vec<(Uuid, Result<Task, ClientError>)> {
        let fields = TaskFields {
            priority: Some(priority),
            ..Default::default()
        };
        self.bulk_update(ids, &fields).await
    }

    pub async fn bulk_delete(&self, ids: &[Uuid]) -> Vec<(Uuid, Result<DeleteTaskResponse, ClientError>)> {
        let results = join_all(ids.iter().map(|id| self.delete_task(*id))).await;
        log_failures("bulk delete", ids, &results);
        ids.iter().copied().zip(results).collect()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}{}", self.base_url, API_PREFIX, path))
    }
}

/// Trim title, description and tags and cap each at `MAX_TEXT_LEN` characters.
/// Tags go out as a list with blanks dropped.
pub fn sanitize(fields: &TaskFields) -> TaskFields {
    TaskFields {
        title: fields.title.as_deref().map(cap),
        description: fields.description.as_ref().map(|d| d.as_deref().map(cap)),
        tags: fields.tags.clone().map(|tags| {
            tags.map(|tags| TagsInput::List(normalize_tags(tags).iter().map(|t| cap(t)).collect()))
        }),
        ..fields.clone()
    }
}

fn cap(text: &str) -> String {
    text.trim().chars().take(MAX_TEXT_LEN).collect()
}

fn task_path(id: Uuid) -> String {
    format!("/tasks/{id}")
}

async fn parse<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = response
        .json::<MessageResponse>()
        .await
        .map(|body| body.message)
        .unwrap_or_else(|_| fallback.to_string());
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

fn log_failures<T>(operation: &str, ids: &[Uuid], results: &[Result<T, ClientError>]) {
    for (id, result) in ids.iter().zip(results) {
        if let Err(e) = result {
            tracing::error!(%id, error = %e, "{operation} failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = TaskClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:5000");
    }

    #[tokio::test]
    async fn blank_title_never_leaves_the_client() {
        // Nothing listens on this port; a request would fail with Http.
        let client = TaskClient::new("http://127.0.0.1:9").unwrap();

        let err = client.create_task(&TaskFields::with_title("   ")).await.unwrap_err();
        assert!(matches!(err, ClientError::Invalid(TaskError::Validation(_))));

        let err = client.create_task(&TaskFields::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::Invalid(TaskError::Validation(_))));
    }

    #[test]
    fn sanitize_trims_and_caps_text() {
        let fields = TaskFields {
            title: Some(format!("  {}  ", "t".repeat(600))),
            description: Some(Some(" notes ".into())),
            tags: Some(Some(TagsInput::Csv(format!("home, ,{}", "x".repeat(501))))),
            priority: Some(TaskPriority::High),
            ..Default::default()
        };

        let sent = sanitize(&fields);
        assert_eq!(sent.title.as_deref().map(str::len), Some(MAX_TEXT_LEN));
        assert_eq!(sent.description, Some(Some("notes".to_string())));
        assert_eq!(
            sent.tags,
            Some(Some(TagsInput::List(vec!["home".to_string(), "x".repeat(MAX_TEXT_LEN)])))
        );
        assert_eq!(sent.priority, Some(TaskPriority::High));
    }

    #[test]
    fn sanitize_keeps_explicit_clears() {
        let fields = TaskFields {
            description: Some(None),
            tags: Some(None),
            ..Default::default()
        };
        let sent = sanitize(&fields);
        assert_eq!(sent.description, Some(None));
        assert_eq!(sent.tags, Some(None));
        assert!(sent.title.is_none());
    }

    #[test]
    fn api_error_exposes_status() {
        let err = ClientError::Api {
            status: 403,
            message: "Unauthorized access".into(),
        };
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.to_string(), "Unauthorized access (403)");
    }
}
