use serde::Deserialize;
use tracing::{info, warn};

use super::{ErrorRegion, FormOutcome, SubmitControl, ValidationErrors, CONNECTION_ERROR};
use crate::api::PortalApi;
use crate::domain::NewInternship;
use crate::navigation::Page;
use crate::view::layout::message_region;
use crate::view::markup::Escaped;

pub const CREATED: &str = "Internship created successfully!";
const CREATE_FAILED: &str = "Failed to create internship";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InternshipFields {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub slots: String,
}

impl InternshipFields {
    pub fn validate(&self) -> Result<NewInternship, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title);
        errors.require("company", &self.company);
        errors.require("description", &self.description);
        errors.require("duration", &self.duration);
        let slots = errors.require_number::<u32>("slots", &self.slots);

        errors.into_result(NewInternship {
            title: self.title.trim().to_string(),
            company: self.company.trim().to_string(),
            description: self.description.trim().to_string(),
            duration: self.duration.trim().to_string(),
            slots: slots.unwrap_or_default(),
        })
    }
}

/// "Create New Internship" modal on the admin internships page.
#[derive(Debug, Clone)]
pub struct InternshipForm {
    pub fields: InternshipFields,
    error: ErrorRegion,
    submit: SubmitControl,
    open: bool,
}

impl Default for InternshipForm {
    fn default() -> Self {
        Self::with_fields(InternshipFields::default())
    }
}

impl InternshipForm {
    pub fn with_fields(fields: InternshipFields) -> Self {
        Self {
            fields,
            error: ErrorRegion::default(),
            submit: SubmitControl::new("Create Internship", "Creating..."),
            open: false,
        }
    }

    pub fn open(&mut self) {
        self.error.hide();
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn error(&self) -> Option<&str> {
        self.error.message()
    }

    pub fn submit_control(&self) -> &SubmitControl {
        &self.submit
    }

    pub async fn submit<A: PortalApi + ?Sized>(&mut self, api: &A) -> FormOutcome {
        let payload = match self.fields.validate() {
            Ok(payload) => payload,
            Err(errors) => return FormOutcome::Invalid(errors),
        };
        if !self.submit.begin() {
            return FormOutcome::Busy;
        }
        self.error.hide();

        let outcome = match api.create_internship(&payload).await {
            Ok(response) if response.ok => {
                info!(title = %payload.title, company = %payload.company, "internship created");
                self.fields = InternshipFields::default();
                self.open = false;
                FormOutcome::Completed {
                    notice: Some(CREATED.to_string()),
                }
            }
            Ok(response) => FormOutcome::Failed(response.error_or(CREATE_FAILED).to_string()),
            Err(err) => {
                warn!(error = %err, "create internship request failed");
                FormOutcome::Failed(CONNECTION_ERROR.to_string())
            }
        };

        self.submit.finish();
        if let FormOutcome::Failed(message) = &outcome {
            self.open = true;
            self.error.show(message.clone());
        }
        outcome
    }

    pub fn render(&self) -> String {
        let fields = &self.fields;
        format!(
            r#"<div class="modal fade{shown}" id="createInternshipModal" tabindex="-1">
<div class="modal-dialog"><div class="modal-content">
<div class="modal-header"><h5 class="modal-title">Create New Internship</h5></div>
<form id="createInternshipForm" method="post" action="{action}">
<div class="modal-body">
{error}
<div class="mb-3"><label for="title" class="form-label">Title</label>
<input type="text" class="form-control" id="title" name="title" value="{title}" required></div>
<div class="mb-3"><label for="company" class="form-label">Company</label>
<input type="text" class="form-control" id="company" name="company" value="{company}" required></div>
<div class="mb-3"><label for="description" class="form-label">Description</label>
<textarea class="form-control" id="description" name="description" rows="4" required>{description}</textarea></div>
<div class="mb-3"><label for="duration" class="form-label">Duration</label>
<input type="text" class="form-control" id="duration" name="duration" value="{duration}" required></div>
<div class="mb-3"><label for="slots" class="form-label">Slots</label>
<input type="number" min="1" class="form-control" id="slots" name="slots" value="{slots}" required></div>
</div>
<div class="modal-footer">{button}</div>
</form>
</div></div>
</div>"#,
            shown = if self.open { " show d-block" } else { "" },
            action = Page::AdminInternships.path(),
            error = message_region("error-message", "danger", self.error()),
            title = Escaped(&fields.title),
            company = Escaped(&fields.company),
            description = Escaped(&fields.description),
            duration = Escaped(&fields.duration),
            slots = Escaped(&fields.slots),
            button = self.submit.render("createInternshipButton"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{InMemoryPortalApi, ScopedApi, SimulatedFailure, Verb};
    use crate::domain::Role;
    use crate::session::Session;

    fn admin() -> InMemoryPortalApi {
        let api =
            InMemoryPortalApi::new().with_account("Ada", "ada@portal.test", "pw", Role::Admin);
        let token = api.token_of("ada@portal.test").expect("seeded");
        api.scoped(Session::new(token, Role::Admin))
    }

    fn filled() -> InternshipFields {
        InternshipFields {
            title: "Backend Intern".to_string(),
            company: "Acme".to_string(),
            description: "Build services".to_string(),
            duration: "3 months".to_string(),
            slots: "2".to_string(),
        }
    }

    #[tokio::test]
    async fn blank_title_sends_nothing() {
        let api = admin();
        let mut form = InternshipForm::with_fields(InternshipFields {
            title: String::new(),
            ..filled()
        });
        assert!(matches!(form.submit(&api).await, FormOutcome::Invalid(_)));
        assert_eq!(api.calls(Verb::CreateInternship), 0);
    }

    #[tokio::test]
    async fn success_clears_fields_and_closes_modal() {
        let api = admin();
        let mut form = InternshipForm::with_fields(filled());
        form.open();
        let outcome = form.submit(&api).await;
        assert_eq!(
            outcome,
            FormOutcome::Completed {
                notice: Some(CREATED.to_string())
            }
        );
        assert_eq!(form.fields, InternshipFields::default());
        assert!(!form.is_open());
        assert_eq!(api.internships().len(), 1);
        assert_eq!(api.internships()[0].slots, 2);
    }

    #[tokio::test]
    async fn rejection_without_message_uses_fallback() {
        let api = admin();
        api.fail(Verb::CreateInternship, SimulatedFailure::Rejected(None));
        let mut form = InternshipForm::with_fields(filled());
        let outcome = form.submit(&api).await;
        assert_eq!(outcome, FormOutcome::Failed(CREATE_FAILED.to_string()));
        assert_eq!(form.fields.title, "Backend Intern");
        assert!(form.is_open());
        assert!(!form.submit_control().is_disabled());
    }

    #[tokio::test]
    async fn transport_failure_reports_connection_error() {
        let api = admin();
        api.fail(Verb::CreateInternship, SimulatedFailure::Unreachable);
        let mut form = InternshipForm::with_fields(filled());
        form.submit(&api).await;
        assert_eq!(form.error(), Some(CONNECTION_ERROR));
    }
}
