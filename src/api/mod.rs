//! HTTP API Handlers and Routes
//!
//! The REST layer, built on Axum.
//!
//! # Endpoints
//!
//! ## Public
//! - `POST /api/login` - authenticate, receive user snapshot + JWT
//! - `GET /api/security-levels` - security-level dropdown options
//! - `GET /api/organigramme-types` - organigramme-type dropdown options
//! - `GET /api/health` - health check
//!
//! ## Protected (`Authorization: Bearer <token>`)
//! - `GET /api/users`, `POST /api/users` - admin only
//! - `PATCH /api/users/{id}`, `DELETE /api/users/{id}` - admin only, with
//!   self-action protection
//! - `GET /api/projects`, `POST /api/projects` - owner-scoped
//! - `PATCH /api/projects/{id}/details` - owner-scoped
//!
//! Missing token is 401; present-but-invalid token is 403.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use utoipa::OpenApi;

/// OpenAPI description of the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::projects::create_project,
        handlers::projects::update_project_details,
        handlers::projects::list_projects,
        handlers::options::security_levels,
        handlers::options::organigramme_types,
    ),
    components(schemas(
        crate::types::Role,
        crate::types::UserSnapshot,
        crate::types::LoginRequest,
        crate::types::LoginResponse,
        crate::types::CreateUserRequest,
        crate::types::UpdateUserRequest,
        crate::types::UsersResponse,
        crate::types::UserResponse,
        crate::types::MessageResponse,
        crate::types::CreateProjectRequest,
        crate::types::ProjectCreatedResponse,
        crate::types::ProjectDetailsUpdate,
        crate::types::Project,
        crate::types::OptionItem,
    )),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "users", description = "User management (admin)"),
        (name = "projects", description = "Door/key projects"),
        (name = "options", description = "Dropdown option lists")
    )
)]
pub struct ApiDoc;
