use crate::auth::jwt::AuthService;
use crate::AppState;
use axum::{
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use std::sync::Arc;

/// Builds the application router. Protected routes are layered with the auth
/// middleware; role checks stay in the handlers.
pub fn create_router(auth_service: Arc<AuthService>) -> Router<AppState> {
    let public_routes = Router::new()
        // Public routes (no auth required)
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/login", post(crate::api::handlers::auth::login))
        .route(
            "/api/security-levels",
            get(crate::api::handlers::options::security_levels),
        )
        .route(
            "/api/organigramme-types",
            get(crate::api::handlers::options::organigramme_types),
        );

    let protected_routes = Router::new()
        // Protected routes (auth required; admin gates live in the handlers)
        .route(
            "/api/users",
            get(crate::api::handlers::users::list_users)
                .post(crate::api::handlers::users::create_user),
        )
        .route(
            "/api/users/{id}",
            patch(crate::api::handlers::users::update_user)
                .delete(crate::api::handlers::users::delete_user),
        )
        .route(
            "/api/projects",
            get(crate::api::handlers::projects::list_projects)
                .post(crate::api::handlers::projects::create_project),
        )
        .route(
            "/api/projects/{id}/details",
            patch(crate::api::handlers::projects::update_project_details),
        )
        .layer(middleware::from_fn(move |req, next| {
            crate::auth::middleware::auth_middleware(auth_service.clone(), req, next)
        }));

    public_routes.merge(protected_routes)
}

async fn root() -> &'static str {
    "Keyplan backend OK"
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
