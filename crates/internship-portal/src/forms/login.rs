use serde::Deserialize;
use tracing::{info, warn};

use super::{ErrorRegion, FormOutcome, SubmitControl, ValidationErrors, SERVER_UNREACHABLE};
use crate::api::{LoginResponse, PortalApi};
use crate::navigation::Page;
use crate::view::layout::message_region;
use crate::view::markup::Escaped;

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginFields {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginFields {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_email("email", &self.email);
        errors.require("password", &self.password);
        errors.into_result(())
    }
}

/// Login page form. A successful login stores the token and role, then redirects by role.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub fields: LoginFields,
    error: ErrorRegion,
    submit: SubmitControl,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::with_fields(LoginFields::default())
    }
}

impl LoginForm {
    pub fn with_fields(fields: LoginFields) -> Self {
        Self {
            fields,
            error: ErrorRegion::default(),
            submit: SubmitControl::new("Login", "Logging in..."),
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.message()
    }

    pub fn submit_control(&self) -> &SubmitControl {
        &self.submit
    }

    pub async fn submit<A: PortalApi + ?Sized>(&mut self, api: &A) -> FormOutcome {
        if let Err(errors) = self.fields.validate() {
            return FormOutcome::Invalid(errors);
        }
        if !self.submit.begin() {
            return FormOutcome::Busy;
        }
        self.error.hide();

        let outcome = match api.login(self.fields.email.trim(), &self.fields.password).await {
            Ok(LoginResponse {
                ok: true,
                access_token: Some(token),
                role,
                ..
            }) => {
                api.set_token(&token);
                info!(role = ?role, "login succeeded");
                let to = Page::dashboard_for(role.as_ref());
                api.set_role(role);
                FormOutcome::Redirect { to, notice: None }
            }
            Ok(response) => FormOutcome::Failed(
                response
                    .error
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| LOGIN_FAILED.to_string()),
            ),
            Err(err) => {
                warn!(error = %err, "login request failed");
                FormOutcome::Failed(SERVER_UNREACHABLE.to_string())
            }
        };

        self.submit.finish();
        if let FormOutcome::Failed(message) = &outcome {
            self.error.show(message.clone());
        }
        outcome
    }

    pub fn render(&self) -> String {
        format!(
            r#"<form id="loginForm" method="post" action="{action}">
{error}
<div class="mb-3"><label for="email" class="form-label">Email</label>
<input type="email" class="form-control" id="email" name="email" value="{email}" required></div>
<div class="mb-3"><label for="password" class="form-label">Password</label>
<input type="password" class="form-control" id="password" name="password" required></div>
{button}
<p class="mt-3 text-center">No account? <a href="{register}">Register</a></p>
</form>"#,
            action = Page::Login.path(),
            error = message_region("error-message", "danger", self.error()),
            email = Escaped(&self.fields.email),
            button = self.submit.render("loginButton"),
            register = Page::Register.path(),
        )
    }
}
