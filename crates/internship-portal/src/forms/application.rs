use tracing::{info, warn};

use super::{ErrorRegion, FormOutcome, SubmitControl, ValidationErrors, CONNECTION_ERROR};
use crate::api::PortalApi;
use crate::domain::{ApplicationUpload, CvAttachment, InternshipId};
use crate::navigation::Page;
use crate::view::layout::message_region;
use crate::view::markup::Escaped;

pub const SUBMITTED: &str = "Application submitted successfully!";
const SUBMIT_FAILED: &str = "Failed to submit application";
const CV_MISSING: &str = "Please upload your CV";

/// Values of the apply modal. Filled from a multipart body, so not derived from a form decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFields {
    pub internship_id: String,
    pub cover_letter: String,
    pub cv: Option<CvAttachment>,
}

impl ApplicationFields {
    pub fn validate(&self) -> Result<InternshipId, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let id = errors.require_number::<InternshipId>("internship_id", &self.internship_id);
        match id {
            Some(id) => errors.into_result(id),
            None => Err(errors),
        }
    }
}

/// Apply modal on the internship catalog.
#[derive(Debug, Clone)]
pub struct ApplicationForm {
    pub fields: ApplicationFields,
    error: ErrorRegion,
    submit: SubmitControl,
    open: bool,
}

impl Default for ApplicationForm {
    fn default() -> Self {
        Self::with_fields(ApplicationFields::default())
    }
}

impl ApplicationForm {
    pub fn with_fields(fields: ApplicationFields) -> Self {
        Self {
            fields,
            error: ErrorRegion::default(),
            submit: SubmitControl::new("Submit Application", "Submitting..."),
            open: false,
        }
    }

    /// Reset the modal for `internship` and show it.
    pub fn open(&mut self, internship: InternshipId) {
        self.fields = ApplicationFields {
            internship_id: internship.to_string(),
            ..ApplicationFields::default()
        };
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
        let internship_id = match self.fields.validate() {
            Ok(id) => id,
            Err(errors) => return FormOutcome::Invalid(errors),
        };
        let Some(cv) = self.fields.cv.clone() else {
            self.error.show(CV_MISSING);
            return FormOutcome::Failed(CV_MISSING.to_string());
        };
        if !self.submit.begin() {
            return FormOutcome::Busy;
        }
        self.error.hide();

        let upload = ApplicationUpload {
            internship_id,
            cover_letter: self.fields.cover_letter.clone(),
            cv,
        };
        let outcome = match api.apply_for_internship(upload).await {
            Ok(response) if response.ok => {
                info!(internship = %internship_id, "application submitted");
                self.open = false;
                FormOutcome::Redirect {
                    to: Page::StudentDashboard,
                    notice: Some(SUBMITTED.to_string()),
                }
            }
            Ok(response) => FormOutcome::Failed(response.error_or(SUBMIT_FAILED).to_string()),
            Err(err) => {
                warn!(error = %err, internship = %internship_id, "apply request failed");
                FormOutcome::Failed(CONNECTION_ERROR.to_string())
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
            r#"<div class="modal fade{shown}" id="applyModal" tabindex="-1">
<div class="modal-dialog"><div class="modal-content">
<div class="modal-header"><h5 class="modal-title">Apply for Internship</h5></div>
<form id="applyForm" method="post" action="/apply" enctype="multipart/form-data">
<div class="modal-body">
{error}
<input type="hidden" id="internshipId" name="internship_id" value="{internship_id}">
<div class="mb-3"><label for="coverLetter" class="form-label">Cover Letter</label>
<textarea class="form-control" id="coverLetter" name="cover_letter" rows="5">{cover_letter}</textarea></div>
<div class="mb-3"><label for="cv" class="form-label">CV</label>
<input type="file" class="form-control" id="cv" name="cv" accept=".pdf,.doc,.docx" required></div>
</div>
<div class="modal-footer">{button}</div>
</form>
</div></div>
</div>"#,
            shown = if self.open { " show d-block" } else { "" },
            error = message_region("apply-error-message", "danger", self.error()),
            internship_id = Escaped(&self.fields.internship_id),
            cover_letter = Escaped(&self.fields.cover_letter),
            button = self.submit.render("submitApplicationButton"),
        )
    }
}
