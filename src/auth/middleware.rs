use crate::auth::jwt::AuthService;
use crate::types::{AppError, Identity, Result, Role};
use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticates every request routed through it, before any handler logic.
///
/// * Missing or non-bearer `Authorization` header: 401, handler never runs.
/// * Present but unverifiable token (signature, form, expiry): 403. The
///   401/403 split is deliberate and load-bearing for clients.
/// * Verified claims without a numeric id: 500, fail closed rather than run
///   a handler with an unidentified caller.
///
/// Role checks are not done here; they are a second, handler-local step.
pub async fn auth_middleware(
    auth_service: Arc<AuthService>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let claims = auth_service.verify_token(token)?;

    let id = claims.id.ok_or_else(|| {
        tracing::error!("verified token carries no numeric user id");
        AppError::InternalAuthInconsistency
    })?;

    req.extensions_mut().insert(Identity {
        id,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Extractor for the authenticated identity attached by [`auth_middleware`].
pub struct AuthUser(pub Identity);

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Handler-local admin gate.
pub fn require_admin(identity: &Identity) -> Result<()> {
    if identity.role != Role::Admin {
        tracing::debug!(user_id = identity.id, role = %identity.role, "admin route denied");
        return Err(AppError::Forbidden(
            "Access denied. Administrator role required.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_admin_accepts_admins_only() {
        let admin = Identity {
            id: 1,
            role: Role::Admin,
        };
        let client = Identity {
            id: 2,
            role: Role::Client,
        };

        assert!(require_admin(&admin).is_ok());
        assert!(matches!(
            require_admin(&client),
            Err(AppError::Forbidden(_))
        ));
    }
}
