// Response-error interceptors.
//
// The gateway hands every failed call to each registered interceptor
// exactly once, before the error reaches the caller. Global policies
// (like reacting to an expired session) live here instead of at every
// call site.

use std::sync::Arc;

use tracing::warn;

use crate::error::Error;
use crate::navigation::{Navigator, Route};
use crate::session::SessionStore;

/// Observer of failed gateway calls.
pub trait Interceptor: Send + Sync {
    fn on_error(&self, error: &Error);
}

/// Clears the session and redirects to the login boundary on 401.
pub struct AuthExpiryInterceptor {
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
}

impl AuthExpiryInterceptor {
    pub fn new(session: Arc<SessionStore>, navigator: Arc<Navigator>) -> Self {
        Self { session, navigator }
    }
}

impl Interceptor for AuthExpiryInterceptor {
    fn on_error(&self, error: &Error) {
        if !error.is_auth_expired() {
            return;
        }

        warn!("backend rejected the session token; logging out");
        if let Err(e) = self.session.logout() {
            warn!(error = %e, "failed to clear stored tokens");
        }
        self.navigator.redirect(Route::Login);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::session::{Identity, Role, Tokens};

    fn logged_in() -> Arc<SessionStore> {
        let store = Arc::new(SessionStore::ephemeral());
        store
            .login(
                Identity {
                    name: "Ops".into(),
                    email: "ops@example.com".into(),
                    role: Role::Admin,
                },
                Tokens {
                    access: "t".into(),
                    refresh: None,
                },
            )
            .unwrap();
        store
    }

    #[test]
    fn auth_expiry_clears_session_and_redirects() {
        let session = logged_in();
        let nav = Arc::new(Navigator::default());
        let hook = AuthExpiryInterceptor::new(session.clone(), nav.clone());

        hook.on_error(&Error::AuthExpired);

        assert!(!session.is_authenticated());
        assert_eq!(nav.current(), Route::Login);
    }

    #[test]
    fn other_errors_leave_session_alone() {
        let session = logged_in();
        let nav = Arc::new(Navigator::default());
        let hook = AuthExpiryInterceptor::new(session.clone(), nav.clone());

        hook.on_error(&Error::Http {
            status: 500,
            message: "boom".into(),
            body: String::new(),
        });

        assert!(session.is_authenticated());
        assert_eq!(nav.current(), Route::Dashboard);
    }
}
