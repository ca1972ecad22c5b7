use crate::client::session::Session;
use crate::types::{
    CreateProjectRequest, CreateUserRequest, LoginResponse, Project, ProjectCreatedResponse,
    ProjectDetailsUpdate, Role, UserResponse, UserSnapshot, UsersResponse,
};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::sync::Arc;

/// Normalized client-facing error: the server's `{"message": ...}` when one
/// exists, a generic message otherwise.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
    pub message: String,
}

impl ClientError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// HTTP client for the Keyplan API that mirrors the server's session rules:
/// it attaches the bearer token to requests aimed at the API base, and treats
/// any 401/403 on an authenticated call as "session no longer valid",
/// triggering a logout before surfacing the error.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:3001/api`.
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Authenticates and establishes the session. On failure the session is
    /// left untouched - the caller may be showing a login form to an already
    /// logged-in user.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<UserSnapshot> {
        let url = format!("{}/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(normalized_error(response).await);
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|_| ClientError::new("Invalid login response from server."))?;

        if body.token.is_empty() {
            return Err(ClientError::new("Invalid login response from server."));
        }

        self.session.establish(body.user.clone(), &body.token);
        Ok(body.user)
    }

    pub async fn get_users(&self) -> ClientResult<Vec<UserSnapshot>> {
        let response = self.send(Method::GET, "/users", None::<&()>).await?;
        let body: UsersResponse = parse_json(response).await?;
        Ok(body.users)
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> ClientResult<UserSnapshot> {
        let response = self.send(Method::POST, "/users", Some(request)).await?;
        let body: UserResponse = parse_json(response).await?;
        Ok(body.user)
    }

    pub async fn set_user_active(&self, user_id: i64, is_active: bool) -> ClientResult<UserSnapshot> {
        let response = self
            .send(
                Method::PATCH,
                &format!("/users/{user_id}"),
                Some(&serde_json::json!({ "isActive": is_active })),
            )
            .await?;
        let body: UserResponse = parse_json(response).await?;
        Ok(body.user)
    }

    pub async fn set_user_role(&self, user_id: i64, role: Role) -> ClientResult<UserSnapshot> {
        let response = self
            .send(
                Method::PATCH,
                &format!("/users/{user_id}"),
                Some(&serde_json::json!({ "role": role })),
            )
            .await?;
        let body: UserResponse = parse_json(response).await?;
        Ok(body.user)
    }

    pub async fn delete_user(&self, user_id: i64) -> ClientResult<()> {
        self.send(Method::DELETE, &format!("/users/{user_id}"), None::<&()>)
            .await?;
        Ok(())
    }

    pub async fn create_project(&self, request: &CreateProjectRequest) -> ClientResult<i64> {
        let response = self.send(Method::POST, "/projects", Some(request)).await?;
        let body: ProjectCreatedResponse = parse_json(response).await?;
        Ok(body.project_id)
    }

    pub async fn update_project_details(
        &self,
        project_id: i64,
        details: &ProjectDetailsUpdate,
    ) -> ClientResult<()> {
        self.send(
            Method::PATCH,
            &format!("/projects/{project_id}/details"),
            Some(details),
        )
        .await?;
        Ok(())
    }

    pub async fn list_projects(&self) -> ClientResult<Vec<Project>> {
        let response = self.send(Method::GET, "/projects", None::<&()>).await?;
        parse_json(response).await
    }

    /// Sends an authenticated request. Paths are always resolved against the
    /// API base, so the bearer credential never travels to a foreign host.
    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.http.request(method, &url);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                // The token is no longer good (or never was). Drop the
                // session; logout is idempotent, so overlapping in-flight
                // failures are harmless.
                tracing::warn!(url, "authentication failure on API call; logging out");
                self.session.logout();
                Err(ClientError::new(
                    "Session expired or invalid. Please log in again.",
                ))
            }
            status if !status.is_success() => Err(normalized_error(response).await),
            _ => Ok(response),
        }
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    response
        .json()
        .await
        .map_err(|_| ClientError::new("Invalid response from server."))
}

async fn normalized_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("Server error ({})", status.as_u16()));

    ClientError::new(message)
}

fn transport_error(e: reqwest::Error) -> ClientError {
    ClientError::new(format!("Network error: {e}"))
}
