use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{
    Acknowledgement, ApiError, ApiResponse, ApiResult, LoginResponse, PortalApi, ScopedApi,
};
use crate::config::ApiConfig;
use crate::domain::{
    Application, ApplicationId, ApplicationUpload, CurrentUser, Internship, NewInternship,
    PortalStats, Role, StudentRegistration,
};
use crate::session::{Session, SessionStore};

/// `PortalApi` over HTTP against the portal backend.
#[derive(Debug)]
pub struct HttpPortalApi {
    client: Client,
    base_url: Arc<Url>,
    session: SessionStore,
}

/// Error bodies come as `{"error": ...}` from the portal and `{"msg": ...}` from the token layer.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    access_token: Option<String>,
    role: Option<Role>,
}

impl HttpPortalApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                path: config.base_url.to_string(),
                source,
            })?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Base URLs must end with `/` so relative joins stay under the API prefix.
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url: Arc::new(base_url),
            session: SessionStore::default(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Headers for a raw authenticated JSON request.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(value) = self
            .session
            .snapshot()
            .authorization()
            .and_then(|value| HeaderValue::from_str(&value).ok())
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|_| ApiError::Endpoint(path.to_string()))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.snapshot().token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, path: &str, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|source| {
            warn!(%path, error = %source, "portal backend unreachable");
            ApiError::Transport {
                path: path.to_string(),
                source,
            }
        })?;
        debug!(%path, status = %response.status(), "portal backend responded");
        Ok(response)
    }

    async fn envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        response: Response,
    ) -> ApiResult<T> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                path: path.to_string(),
                source,
            })?;

        if status.is_success() {
            return serde_json::from_slice::<T>(&body)
                .map(ApiResponse::success)
                .map_err(|err| ApiError::Decode {
                    path: path.to_string(),
                    message: err.to_string(),
                });
        }

        let error = serde_json::from_slice::<ErrorBody>(&body).unwrap_or_default();
        Ok(match error.error.or(error.msg) {
            Some(message) => ApiResponse::failure(message),
            None => ApiResponse::rejected(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.endpoint(path)?;
        let response = self
            .send(path, self.authorized(self.client.get(url)))
            .await?;
        self.envelope(path, response).await
    }

    async fn post_empty(&self, path: &str) -> ApiResult<Acknowledgement> {
        let url = self.endpoint(path)?;
        let response = self
            .send(path, self.authorized(self.client.post(url)))
            .await?;
        self.envelope(path, response).await
    }

    async fn post_json<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<Acknowledgement> {
        let url = self.endpoint(path)?;
        let response = self
            .send(path, self.authorized(self.client.post(url).json(body)))
            .await?;
        self.envelope(path, response).await
    }
}

impl Clone for HttpPortalApi {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: Arc::clone(&self.base_url),
            session: self.session.clone(),
        }
    }
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    fn session(&self) -> &SessionStore {
        &self.session
    }

    async fn get_internships(&self) -> ApiResult<Vec<Internship>> {
        self.get("internships").await
    }

    async fn create_internship(&self, payload: &NewInternship) -> ApiResult<Acknowledgement> {
        self.post_json("internships", payload).await
    }

    async fn get_all_applications(&self) -> ApiResult<Vec<Application>> {
        self.get("applications").await
    }

    async fn get_application_status(&self) -> ApiResult<Vec<Application>> {
        self.get("status").await
    }

    async fn approve_application(&self, id: ApplicationId) -> ApiResult<Acknowledgement> {
        self.post_empty(&format!("applications/{id}/approve")).await
    }

    async fn reject_application(&self, id: ApplicationId) -> ApiResult<Acknowledgement> {
        self.post_empty(&format!("applications/{id}/reject")).await
    }

    async fn apply_for_internship(
        &self,
        upload: ApplicationUpload,
    ) -> ApiResult<Acknowledgement> {
        let path = "apply";
        let url = self.endpoint(path)?;
        let ApplicationUpload {
            internship_id,
            cover_letter,
            cv,
        } = upload;
        let form = Form::new()
            .text("internship_id", internship_id.to_string())
            .text("cover_letter", cover_letter)
            .part("cv", Part::bytes(cv.bytes).file_name(cv.file_name));

        let response = self
            .send(path, self.authorized(self.client.post(url).multipart(form)))
            .await?;
        self.envelope(path, response).await
    }

    async fn register_student(
        &self,
        payload: &StudentRegistration,
    ) -> ApiResult<Acknowledgement> {
        self.post_json("register/student", payload).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let path = "login";
        let url = self.endpoint(path)?;
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self.send(path, self.client.post(url).json(&body)).await?;

        let envelope: ApiResponse<TokenBody> = self.envelope(path, response).await?;
        let ok = envelope.ok;
        let error = envelope.error.clone();
        Ok(match envelope.into_data() {
            Some(token) => LoginResponse {
                ok,
                access_token: token.access_token,
                role: token.role,
                error,
            },
            None => LoginResponse {
                ok,
                error,
                ..LoginResponse::default()
            },
        })
    }

    async fn get_current_user(&self) -> ApiResult<CurrentUser> {
        self.get("me").await
    }

    async fn get_stats(&self) -> ApiResult<PortalStats> {
        self.get("stats").await
    }
}

impl ScopedApi for HttpPortalApi {
    fn scoped(&self, session: Session) -> Self {
        Self {
            client: self.client.clone(),
            base_url: Arc::clone(&self.base_url),
            session: SessionStore::new(session),
        }
    }
}
