use crate::{
    auth::middleware::{require_admin, AuthUser},
    db::{NewUser, UserUpdate},
    types::{
        AppError, CreateUserRequest, MessageResponse, Result, Role, UpdateUserRequest,
        UserResponse, UsersResponse,
    },
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// List all user accounts (admin only).
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = UsersResponse),
        (status = 401, description = "Missing token"),
        (status = 403, description = "Invalid token or not an administrator")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<UsersResponse>> {
    require_admin(&identity)?;

    let users = state.store.list_users().await?;
    Ok(Json(UsersResponse { users }))
}

/// Create a user account (admin only). The password hash is computed here,
/// once; it is never re-derivable afterwards.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 403, description = "Not an administrator"),
        (status = 409, description = "Email already in use")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    require_admin(&identity)?;

    if payload.email.trim().is_empty()
        || payload.password.is_empty()
        || payload.first_name.trim().is_empty()
        || payload.last_name.trim().is_empty()
    {
        return Err(AppError::InvalidInput(
            "The email, password, firstName and lastName fields are required.".to_string(),
        ));
    }

    // Absent role defaults to client; an unknown role string is rejected
    // rather than silently downgraded.
    let role = match payload.role.as_deref() {
        None => Role::Client,
        Some(value) => Role::parse(value)
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid role: {value}")))?,
    };

    let password_hash = state.auth_service.hash_password(&payload.password)?;
    let user = state
        .store
        .create_user(NewUser {
            email: payload.email,
            password_hash,
            role,
            first_name: payload.first_name,
            last_name: payload.last_name,
        })
        .await?;

    tracing::info!(user_id = user.id, admin_id = identity.id, "user created");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "User created successfully!".to_string(),
            user: user.into(),
        }),
    ))
}

/// Partially update a user account (admin only).
///
/// Self-protection: an admin cannot demote or deactivate their own account
/// through this endpoint. Those violations are 400, not 403 - the caller is
/// authorized to be here, only the target is forbidden.
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "Target user id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid field or self-action violation"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    require_admin(&identity)?;

    let update = validate_update(&payload)?;
    if update.is_empty() {
        return Err(AppError::InvalidInput(
            "No valid field to update.".to_string(),
        ));
    }

    if id == identity.id {
        if matches!(update.role, Some(role) if role != Role::Admin) {
            return Err(AppError::InvalidSelfAction(
                "You cannot remove your own administrator role.".to_string(),
            ));
        }
        if update.is_active == Some(false) {
            return Err(AppError::InvalidSelfAction(
                "You cannot deactivate your own administrator account.".to_string(),
            ));
        }
    }

    if !state.store.update_user(id, &update).await? {
        return Err(AppError::NotFound("User not found.".to_string()));
    }

    let user = state
        .store
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    tracing::info!(user_id = id, admin_id = identity.id, "user updated");

    Ok(Json(UserResponse {
        message: "User updated successfully!".to_string(),
        user: user.into(),
    }))
}

/// Delete a user account (admin only). Hard row removal; self-deletion is a
/// 400 self-action violation.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "Target user id")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Self-delete attempt"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    require_admin(&identity)?;

    if id == identity.id {
        tracing::warn!(admin_id = identity.id, "self-delete attempt");
        return Err(AppError::InvalidSelfAction(
            "You cannot delete your own administrator account.".to_string(),
        ));
    }

    if !state.store.delete_user(id).await? {
        return Err(AppError::NotFound("User not found.".to_string()));
    }

    tracing::info!(user_id = id, admin_id = identity.id, "user deleted");

    Ok(Json(MessageResponse {
        message: "User deleted successfully.".to_string(),
    }))
}

/// Validates the raw patch body field by field, turning it into an
/// already-checked [`UserUpdate`].
fn validate_update(payload: &UpdateUserRequest) -> Result<UserUpdate> {
    let mut update = UserUpdate::default();

    if let Some(role) = &payload.role {
        update.role = Some(
            Role::parse(role)
                .ok_or_else(|| AppError::InvalidInput(format!("Invalid role: {role}")))?,
        );
    }

    update.is_active = payload.is_active;

    if let Some(first_name) = &payload.first_name {
        if first_name.trim().is_empty() {
            return Err(AppError::InvalidInput("Invalid first name.".to_string()));
        }
        update.first_name = Some(first_name.clone());
    }

    if let Some(last_name) = &payload.last_name {
        if last_name.trim().is_empty() {
            return Err(AppError::InvalidInput("Invalid last name.".to_string()));
        }
        update.last_name = Some(last_name.clone());
    }

    if let Some(email) = &payload.email {
        if !is_plausible_email(email.trim()) {
            return Err(AppError::InvalidInput("Invalid email format.".to_string()));
        }
        update.email = Some(email.clone());
    }

    Ok(update)
}

/// Shape check only: something@something.something, no whitespace.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
        && !domain.contains('@')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_plausibility() {
        assert!(is_plausible_email("user@example.com"));
        assert!(is_plausible_email("a.b@c.d"));
        assert!(!is_plausible_email("userexample.com"));
        assert!(!is_plausible_email("user@example"));
        assert!(!is_plausible_email("user@@example.com"));
        assert!(!is_plausible_email("user @example.com"));
        assert!(!is_plausible_email("user@.com"));
        assert!(!is_plausible_email(""));
    }

    #[test]
    fn update_validation_rejects_unknown_role() {
        let payload = UpdateUserRequest {
            role: Some("root".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            validate_update(&payload),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn update_validation_rejects_blank_names() {
        let payload = UpdateUserRequest {
            first_name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(validate_update(&payload).is_err());
    }
}
