use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= Roles and Identities =============

/// Closed role enumeration. Unknown role strings are rejected at every
/// boundary (token decode, user creation, user update, row mapping) instead
/// of silently defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }

    /// Parses a role string, rejecting anything outside the closed set.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "client" => Some(Role::Client),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored user row. `password_hash` never leaves the server; responses use
/// [`UserSnapshot`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub first_name: String,
    pub last_name: String,
}

/// The user view sent over the wire and cached client-side for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for UserSnapshot {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            role: u.role,
            is_active: u.is_active,
            first_name: u.first_name,
            last_name: u.last_name,
        }
    }
}

/// The authenticated caller attached to a request by the auth middleware.
/// Handlers trust this and nothing else for authorization decisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Identity {
    pub id: i64,
    pub role: Role,
}

/// JWT claims as carried on the wire. `id` is optional here solely so the
/// middleware can distinguish a structurally valid token that lacks a numeric
/// id (an internal inconsistency, 500) from an unverifiable token (403).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

// ============= Authentication Wire Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserSnapshot,
    pub token: String,
}

// ============= User Management Wire Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// Optional; defaults to `client`. Unknown values are rejected with 400.
    pub role: Option<String>,
}

/// Partial update; role strings are validated in the handler so an unknown
/// role yields the API's own 400 rather than a deserialization rejection.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<UserSnapshot>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub message: String,
    pub user: UserSnapshot,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ============= Project Wire Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    /// Organigramme type code (`pg`, `im`, `pg + im`).
    #[serde(rename = "type")]
    pub kind: String,
    pub creation_date: String,
    pub security_level: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreatedResponse {
    pub message: String,
    pub project_id: i64,
}

/// Step-two detail fields. All optional; an update with no recognized field
/// is rejected.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetailsUpdate {
    pub logement_doors: Option<i64>,
    pub has_private_cellars: Option<bool>,
    pub common_doors: Option<i64>,
    pub extra_common_keys: Option<i64>,
    pub pg_keys: Option<i64>,
    #[serde(rename = "totalDoorsPG")]
    pub total_doors_pg: Option<i64>,
}

impl ProjectDetailsUpdate {
    pub fn is_empty(&self) -> bool {
        self.logement_doors.is_none()
            && self.has_private_cellars.is_none()
            && self.common_doors.is_none()
            && self.extra_common_keys.is_none()
            && self.pg_keys.is_none()
            && self.total_doors_pg.is_none()
    }
}

/// A stored project, owner-scoped. The owner id always comes from the token,
/// never from a request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub creation_date: String,
    pub security_level: String,
    pub user_id: i64,
    pub logement_doors: Option<i64>,
    pub has_private_cellars: Option<bool>,
    pub common_doors: Option<i64>,
    pub extra_common_keys: Option<i64>,
    pub pg_keys: Option<i64>,
    #[serde(rename = "totalDoorsPG")]
    pub total_doors_pg: Option<i64>,
}

/// Dropdown entry for the option-list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OptionItem {
    pub code: String,
    pub label: String,
}

// ============= Error Types =============

/// Application error taxonomy. Each variant maps to one HTTP status and a
/// `{"message": ...}` JSON body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Login request without email or password.
    #[error("Email and password are required.")]
    MissingCredentials,

    /// Unknown email or wrong password. Deliberately generic so responses do
    /// not reveal whether the email exists.
    #[error("Invalid credentials.")]
    InvalidCredentials,

    /// Known account with `is_active == false`. Deliberately distinguishable
    /// from [`AppError::InvalidCredentials`].
    #[error("Your account has been disabled.")]
    AccountDisabled,

    /// Protected route called without a bearer token.
    #[error("Access denied. Missing token.")]
    Unauthorized,

    /// Present-but-unverifiable token, or insufficient role.
    #[error("{0}")]
    Forbidden(String),

    /// An authorized admin targeting their own account with a mutation the
    /// system refuses (role demotion, deactivation, deletion).
    #[error("{0}")]
    InvalidSelfAction(String),

    #[error("{0}")]
    NotFound(String),

    /// Unique email violation.
    #[error("This email is already in use.")]
    Conflict,

    /// A verified token reached a handler without a numeric user id.
    #[error("Internal authentication error.")]
    InternalAuthInconsistency,

    /// Field-level validation failure.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AppError::MissingCredentials => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::AccountDisabled => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidSelfAction(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::InternalAuthInconsistency => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({
            "message": self.to_string()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn role_parsing_is_closed() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("client"), Some(Role::Client));
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn role_serde_rejects_unknown_values() {
        let role: Role = serde_json::from_str("\"admin\"").expect("known role");
        assert_eq!(role, Role::Admin);

        let err = serde_json::from_str::<Role>("\"root\"");
        assert!(err.is_err(), "unknown role string must not deserialize");
    }

    #[test]
    fn snapshot_uses_camel_case_wire_names() {
        let snapshot = UserSnapshot {
            id: 1,
            email: "a@b.c".into(),
            role: Role::Client,
            is_active: true,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["isActive"], true);
        assert!(json.get("is_active").is_none());
    }

    #[test]
    fn error_statuses_match_taxonomy() {
        assert_eq!(
            AppError::MissingCredentials.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::AccountDisabled.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::InvalidSelfAction("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InternalAuthInconsistency.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn claims_tolerate_missing_id() {
        // A token built elsewhere could omit the id; decoding must not fail
        // so the middleware can fail closed with its own distinct error.
        let claims: Claims = serde_json::from_str(r#"{"role":"admin","iat":1,"exp":2}"#).unwrap();
        assert!(claims.id.is_none());
    }
}
