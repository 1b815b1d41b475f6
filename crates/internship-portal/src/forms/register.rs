use serde::Deserialize;
use tracing::warn;

use super::{ErrorRegion, FormOutcome, SubmitControl, ValidationErrors, SERVER_UNREACHABLE};
use crate::api::PortalApi;
use crate::domain::StudentRegistration;
use crate::navigation::Page;
use crate::view::layout::message_region;
use crate::view::markup::Escaped;

pub const REGISTERED: &str = "Registration successful! Redirecting to login...";
const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegisterFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub year: String,
}

impl RegisterFields {
    pub fn validate(&self) -> Result<StudentRegistration, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.require_email("email", &self.email);
        errors.require("password", &self.password);
        errors.require("course", &self.course);
        let year = errors.require_number::<u16>("year", &self.year);

        let registration = StudentRegistration {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            course: self.course.trim().to_string(),
            year: year.unwrap_or_default(),
        };
        errors.into_result(registration)
    }
}

/// Student self-registration form.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub fields: RegisterFields,
    error: ErrorRegion,
    success: Option<&'static str>,
    submit: SubmitControl,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self::with_fields(RegisterFields::default())
    }
}

impl RegisterForm {
    pub fn with_fields(fields: RegisterFields) -> Self {
        Self {
            fields,
            error: ErrorRegion::default(),
            success: None,
            submit: SubmitControl::new("Register", "Registering..."),
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.message()
    }

    pub fn success(&self) -> Option<&str> {
        self.success
    }

    pub fn submit_control(&self) -> &SubmitControl {
        &self.submit
    }

    pub async fn submit<A: PortalApi + ?Sized>(&mut self, api: &A) -> FormOutcome {
        let registration = match self.fields.validate() {
            Ok(registration) => registration,
            Err(errors) => return FormOutcome::Invalid(errors),
        };
        if !self.submit.begin() {
            return FormOutcome::Busy;
        }
        self.error.hide();
        self.success = None;

        let outcome = match api.register_student(&registration).await {
            Ok(response) if response.ok => {
                self.success = Some(REGISTERED);
                FormOutcome::Redirect {
                    to: Page::Login,
                    notice: Some(REGISTERED.to_string()),
                }
            }
            Ok(response) => FormOutcome::Failed(response.error_or(REGISTRATION_FAILED).to_string()),
            Err(err) => {
                warn!(error = %err, "registration request failed");
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
        let fields = &self.fields;
        format!(
            r#"<form id="registerForm" method="post" action="{action}">
{error}
{success}
<div class="mb-3"><label for="name" class="form-label">Full Name</label>
<input type="text" class="form-control" id="name" name="name" value="{name}" required></div>
<div class="mb-3"><label for="email" class="form-label">Email</label>
<input type="email" class="form-control" id="email" name="email" value="{email}" required></div>
<div class="mb-3"><label for="password" class="form-label">Password</label>
<input type="password" class="form-control" id="password" name="password" required></div>
<div class="mb-3"><label for="course" class="form-label">Course</label>
<input type="text" class="form-control" id="course" name="course" value="{course}" required></div>
<div class="mb-3"><label for="year" class="form-label">Year</label>
<input type="number" min="1" class="form-control" id="year" name="year" value="{year}" required></div>
{button}
</form>"#,
            action = Page::Register.path(),
            error = message_region("error-message", "danger", self.error()),
            success = message_region("success-message", "success", self.success),
            name = Escaped(&fields.name),
            email = Escaped(&fields.email),
            course = Escaped(&fields.course),
            year = Escaped(&fields.year),
            button = self.submit.render("registerButton"),
        )
    }
}
