use crate::{
    types::{AppError, LoginRequest, LoginResponse, Result},
    AppState,
};
use axum::{extract::State, Json};

/// Login with email and password.
///
/// Unknown email and wrong password produce the same generic 401 so the
/// endpoint cannot be used to enumerate accounts. A known-but-disabled
/// account is the one deliberate exception (403).
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account disabled")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::MissingCredentials);
    }

    let user = state
        .store
        .get_user_by_email(&payload.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !user.is_active {
        tracing::info!(user_id = user.id, "login rejected: account disabled");
        return Err(AppError::AccountDisabled);
    }

    if !state
        .auth_service
        .verify_password(&payload.password, &user.password_hash)?
    {
        return Err(AppError::InvalidCredentials);
    }

    // Minimal payload: id and role only, nothing sensitive.
    let token = state.auth_service.issue_token(user.id, user.role)?;
    tracing::info!(user_id = user.id, role = %user.role, "login succeeded");

    Ok(Json(LoginResponse {
        message: "Login successful!".to_string(),
        user: user.into(),
        token,
    }))
}
