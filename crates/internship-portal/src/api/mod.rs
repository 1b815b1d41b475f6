//! Client contract for the portal backend.
//!
//! Every page talks to the backend through [`PortalApi`]. Reads and mutations answer with the
//! `{ ok, data?, error? }` envelope; login answers with `{ ok, access_token?, role?, error? }`.
//! A transport failure (connection refused, undecodable body) is reported separately as an
//! [`ApiError`] so pages can tell "the server said no" from "the server never answered".

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Application, ApplicationId, ApplicationUpload, CurrentUser, Decision, Internship,
    NewInternship, PortalStats, Role, StudentRegistration,
};
use crate::navigation::Redirect;
use crate::session::{Session, SessionStore};

pub use http::HttpPortalApi;
pub use memory::{InMemoryPortalApi, SimulatedFailure, Verb};

/// Response envelope shared by list reads and mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Failure without a server-supplied message.
    pub fn rejected() -> Self {
        Self {
            ok: false,
            data: None,
            error: None,
        }
    }

    /// Server message, or `fallback` when the server sent none.
    pub fn error_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.error
            .as_deref()
            .filter(|message| !message.is_empty())
            .unwrap_or(fallback)
    }

    pub fn into_data(self) -> Option<T> {
        if self.ok {
            self.data
        } else {
            None
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Body of a successful mutation (`{"message": "..."}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}

/// Login envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub ok: bool,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The backend could not be reached or answered with something unreadable.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unreadable response from {path}: {message}")]
    Decode { path: String, message: String },
    #[error("invalid endpoint '{0}'")]
    Endpoint(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Everything the pages need from the backend and the viewer's session.
#[async_trait]
pub trait PortalApi: Send + Sync {
    fn session(&self) -> &SessionStore;

    async fn get_internships(&self) -> ApiResult<Vec<Internship>>;
    async fn create_internship(&self, payload: &NewInternship) -> ApiResult<Acknowledgement>;
    async fn get_all_applications(&self) -> ApiResult<Vec<Application>>;
    async fn get_application_status(&self) -> ApiResult<Vec<Application>>;
    async fn approve_application(&self, id: ApplicationId) -> ApiResult<Acknowledgement>;
    async fn reject_application(&self, id: ApplicationId) -> ApiResult<Acknowledgement>;
    async fn apply_for_internship(&self, upload: ApplicationUpload)
        -> ApiResult<Acknowledgement>;
    async fn register_student(&self, payload: &StudentRegistration)
        -> ApiResult<Acknowledgement>;
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;
    async fn get_current_user(&self) -> ApiResult<CurrentUser>;
    async fn get_stats(&self) -> ApiResult<PortalStats>;

    async fn decide(&self, id: ApplicationId, decision: Decision) -> ApiResult<Acknowledgement> {
        match decision {
            Decision::Approve => self.approve_application(id).await,
            Decision::Reject => self.reject_application(id).await,
        }
    }

    fn is_logged_in(&self) -> bool {
        self.session().is_logged_in()
    }

    fn role(&self) -> Option<Role> {
        self.session().role()
    }

    fn set_token(&self, token: &str) {
        self.session().set_token(token);
    }

    fn set_role(&self, role: Option<Role>) {
        self.session().set_role(role);
    }

    fn logout(&self) -> Redirect {
        self.session().logout()
    }
}

/// A client that can be re-bound to another viewer's session while sharing its transport.
pub trait ScopedApi: PortalApi + Clone + 'static {
    fn scoped(&self, session: Session) -> Self;
}
