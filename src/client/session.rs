use crate::client::storage::{SessionStorage, TOKEN_KEY, USER_KEY};
use crate::types::UserSnapshot;
use std::sync::Arc;
use tokio::sync::watch;

/// Navigation seam invoked on logout, the analogue of redirecting to the
/// login screen. Embedders plug their routing in here.
pub trait Navigator: Send + Sync {
    fn to_login(&self);
}

/// Navigator that goes nowhere, for headless embedders and tests.
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn to_login(&self) {}
}

/// Client-held session state: the persisted token + user snapshot and a
/// replay-latest stream of the current identity.
///
/// This is an explicitly constructed state holder with a single writer (the
/// session itself); readers subscribe and always observe the latest value.
/// The persisted snapshot is for display only - authorization-sensitive
/// client gating goes through the decoded token (see the route guard).
pub struct Session {
    storage: Arc<dyn SessionStorage>,
    navigator: Arc<dyn Navigator>,
    current: watch::Sender<Option<UserSnapshot>>,
}

impl Session {
    /// Rehydrates the session from storage. A snapshot that fails to parse
    /// clears both persisted entries and starts unauthenticated; this path
    /// never fails.
    pub fn restore(storage: Arc<dyn SessionStorage>, navigator: Arc<dyn Navigator>) -> Self {
        let initial = load_snapshot(storage.as_ref());
        let (current, _) = watch::channel(initial);

        Self {
            storage,
            navigator,
            current,
        }
    }

    /// Stores the authenticated identity. Token and snapshot are written
    /// together and the stream is updated last, so subscribers observing a
    /// user can always read a matching token.
    pub(crate) fn establish(&self, user: UserSnapshot, token: &str) {
        self.storage.set(TOKEN_KEY, token);
        match serde_json::to_string(&user) {
            Ok(json) => self.storage.set(USER_KEY, &json),
            Err(e) => tracing::warn!(error = %e, "failed to serialize user snapshot"),
        }
        self.current.send_replace(Some(user));
    }

    /// Clears the persisted token + snapshot, resets the stream, and asks the
    /// navigator for the login screen. Safe to call any number of times.
    pub fn logout(&self) {
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(USER_KEY);
        self.current.send_replace(None);
        self.navigator.to_login();
    }

    /// The persisted token, if any. Used by the request interceptor.
    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    /// The latest known identity (display snapshot).
    pub fn current(&self) -> Option<UserSnapshot> {
        self.current.borrow().clone()
    }

    /// Subscribes to identity changes. New subscribers immediately see the
    /// latest value; every update is an atomic value replacement.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserSnapshot>> {
        self.current.subscribe()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }
}

fn load_snapshot(storage: &dyn SessionStorage) -> Option<UserSnapshot> {
    let raw = storage.get(USER_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!(error = %e, "corrupted user snapshot; clearing session");
            storage.remove(USER_KEY);
            storage.remove(TOKEN_KEY);
            None
        }
    }
}
