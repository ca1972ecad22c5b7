use crate::auth::jwt::decode_unverified;
use crate::client::session::Session;
use crate::types::Role;

/// Outcome of a navigation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin,
}

/// Gates a protected client route.
///
/// The decision is made from the decoded token's role, not the cached display
/// snapshot: the snapshot can outlive a role change an admin performed
/// elsewhere, while the token is what the server will actually honor. An
/// empty `required_roles` slice means any authenticated identity may enter.
pub fn can_activate(session: &Session, required_roles: &[Role]) -> GuardDecision {
    let Some(token) = session.token() else {
        tracing::debug!("route guard: no token, redirecting to login");
        return GuardDecision::RedirectToLogin;
    };

    let Some(claims) = decode_unverified(&token) else {
        tracing::debug!("route guard: undecodable token, redirecting to login");
        return GuardDecision::RedirectToLogin;
    };

    if claims.id.is_none() {
        return GuardDecision::RedirectToLogin;
    }

    if !required_roles.is_empty() && !required_roles.contains(&claims.role) {
        tracing::debug!(role = %claims.role, "route guard: role mismatch");
        return GuardDecision::RedirectToLogin;
    }

    GuardDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::AuthService;
    use crate::client::session::{NoopNavigator, Session};
    use crate::client::storage::{MemoryStorage, SessionStorage, TOKEN_KEY, USER_KEY};
    use crate::types::UserSnapshot;
    use std::sync::Arc;

    fn service() -> AuthService {
        AuthService::new(Some("guard-test-secret-32-chars-long!!".to_string()), 3600)
    }

    fn session_with_token(token: Option<&str>) -> Session {
        let storage = Arc::new(MemoryStorage::new());
        if let Some(token) = token {
            storage.set(TOKEN_KEY, token);
        }
        Session::restore(storage, Arc::new(NoopNavigator))
    }

    #[test]
    fn denies_without_token() {
        let session = session_with_token(None);
        assert_eq!(
            can_activate(&session, &[Role::Client]),
            GuardDecision::RedirectToLogin
        );
    }

    #[test]
    fn denies_undecodable_token() {
        let session = session_with_token(Some("not-a-jwt"));
        assert_eq!(can_activate(&session, &[]), GuardDecision::RedirectToLogin);
    }

    #[test]
    fn allows_matching_role() {
        let token = service().issue_token(1, Role::Admin).unwrap();
        let session = session_with_token(Some(&token));

        assert_eq!(can_activate(&session, &[Role::Admin]), GuardDecision::Allow);
        assert_eq!(can_activate(&session, &[]), GuardDecision::Allow);
    }

    #[test]
    fn denies_role_mismatch() {
        let token = service().issue_token(1, Role::Client).unwrap();
        let session = session_with_token(Some(&token));

        assert_eq!(
            can_activate(&session, &[Role::Admin]),
            GuardDecision::RedirectToLogin
        );
    }

    #[test]
    fn token_role_beats_stale_snapshot() {
        // The cached snapshot still claims admin, but the token says client.
        // The guard must follow the token.
        let token = service().issue_token(1, Role::Client).unwrap();
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, &token);
        let stale = UserSnapshot {
            id: 1,
            email: "a@b.c".into(),
            role: Role::Admin,
            is_active: true,
            first_name: "Stale".into(),
            last_name: "Snapshot".into(),
        };
        storage.set(USER_KEY, &serde_json::to_string(&stale).unwrap());
        let session = Session::restore(storage, Arc::new(NoopNavigator));

        assert_eq!(session.current().map(|u| u.role), Some(Role::Admin));
        assert_eq!(
            can_activate(&session, &[Role::Admin]),
            GuardDecision::RedirectToLogin
        );
    }
}
