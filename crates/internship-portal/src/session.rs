use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::domain::Role;
use crate::navigation::{Page, Redirect};

/// Token and role remembered for the viewer between page loads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    role: Option<Role>,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: Some(token.into()),
            role: Some(role),
        }
    }

    pub fn from_parts(token: Option<String>, role: Option<Role>) -> Self {
        Self {
            token: token.filter(|value| !value.is_empty()),
            role,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_student(&self) -> bool {
        self.is_logged_in() && self.role == Some(Role::Student)
    }

    pub fn is_admin(&self) -> bool {
        self.is_logged_in() && self.role == Some(Role::Admin)
    }

    /// `Authorization` header value for authenticated requests.
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {token}"))
    }
}

/// Interior-mutable session shared by an API client and the pages using it.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: RwLock<Session>,
}

impl SessionStore {
    pub fn new(session: Session) -> Self {
        Self {
            inner: RwLock::new(session),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.snapshot().is_logged_in()
    }

    pub fn role(&self) -> Option<Role> {
        self.snapshot().role
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.token = Some(token.into());
    }

    pub fn set_role(&self, role: Option<Role>) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.role = role;
    }

    /// Forget the token and role and send the viewer to the login page.
    pub fn logout(&self) -> Redirect {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Session::default();
        debug!("session cleared");
        Redirect(Page::Login)
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self::new(self.snapshot())
    }
}

/// Admin-only pages: anyone else is sent to login before anything renders.
pub fn require_admin(session: &Session) -> Result<(), Redirect> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(Redirect(Page::Login))
    }
}

/// Student-only pages.
pub fn require_student(session: &Session) -> Result<(), Redirect> {
    if session.is_student() {
        Ok(())
    } else {
        Err(Redirect(Page::Login))
    }
}

/// Login and registration pages bounce viewers who are already logged in.
pub fn redirect_if_logged_in(session: &Session) -> Option<Redirect> {
    session
        .is_logged_in()
        .then(|| Redirect(Page::dashboard_for(session.role())))
}
