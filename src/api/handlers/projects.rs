use crate::{
    auth::middleware::AuthUser,
    db::NewProject,
    types::{
        AppError, CreateProjectRequest, MessageResponse, Project, ProjectCreatedResponse,
        ProjectDetailsUpdate, Result,
    },
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// Create a project. The owner is always the authenticated caller; a user id
/// in the body would be ignored because the request type has no such field.
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectCreatedResponse),
        (status = 400, description = "Missing project data"),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    tag = "projects",
    security(("bearer" = []))
)]
pub async fn create_project(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectCreatedResponse>)> {
    if payload.name.trim().is_empty()
        || payload.kind.trim().is_empty()
        || payload.creation_date.trim().is_empty()
        || payload.security_level.trim().is_empty()
    {
        return Err(AppError::InvalidInput(
            "Missing data for project creation.".to_string(),
        ));
    }

    let project_id = state
        .store
        .create_project(
            identity.id,
            NewProject {
                name: payload.name,
                kind: payload.kind,
                creation_date: payload.creation_date,
                security_level: payload.security_level,
            },
        )
        .await?;

    tracing::info!(project_id, user_id = identity.id, "project created");

    Ok((
        StatusCode::CREATED,
        Json(ProjectCreatedResponse {
            message: "Project created successfully!".to_string(),
            project_id,
        }),
    ))
}

/// Update a project's step-two detail fields. Owner-scoped: a project that
/// belongs to someone else is indistinguishable from a missing one.
#[utoipa::path(
    patch,
    path = "/api/projects/{id}/details",
    params(("id" = i64, Path, description = "Project id")),
    request_body = ProjectDetailsUpdate,
    responses(
        (status = 200, description = "Details updated", body = MessageResponse),
        (status = 400, description = "No valid detail field"),
        (status = 404, description = "Project not found or not owned by caller")
    ),
    tag = "projects",
    security(("bearer" = []))
)]
pub async fn update_project_details(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ProjectDetailsUpdate>,
) -> Result<Json<MessageResponse>> {
    if !state
        .store
        .update_project_details(id, identity.id, &payload)
        .await?
    {
        return Err(AppError::NotFound(
            "Project not found or not authorized.".to_string(),
        ));
    }

    tracing::info!(project_id = id, user_id = identity.id, "project details updated");

    Ok(Json(MessageResponse {
        message: "Project details updated successfully!".to_string(),
    }))
}

/// List the caller's projects, newest first.
#[utoipa::path(
    get,
    path = "/api/projects",
    responses(
        (status = 200, description = "Caller's projects", body = Vec<Project>),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token")
    ),
    tag = "projects",
    security(("bearer" = []))
)]
pub async fn list_projects(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<Project>>> {
    let projects = state.store.list_projects(identity.id).await?;
    Ok(Json(projects))
}
