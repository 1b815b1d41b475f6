//! Internship catalog with role-gated apply buttons and the apply modal.

use std::fmt::Write as _;

use super::markup::Escaped;
use super::{DelegatedClick, DispatchError, ListController, ListTemplate, LoadBanners, LoadOutcome};
use crate::api::PortalApi;
use crate::domain::{Internship, InternshipId};
use crate::forms::ApplicationForm;
use crate::session::Session;

pub const BANNERS: LoadBanners = LoadBanners {
    rejected: r#"<div class="alert alert-danger">Failed to load internships.</div>"#,
    unreachable: r#"<div class="alert alert-danger">Error loading internships. Please try again later.</div>"#,
};

/// Apply clicks reload the page with the modal open for the clicked internship.
const APPLY_SCRIPT: &str = r#"<script>
document.getElementById('internships-container').addEventListener('click', function (event) {
  const control = event.target.closest('[data-action="apply"]');
  if (control && !control.disabled) window.location.search = '?apply=' + control.dataset.target;
});
</script>"#;

const EMPTY: &str = r#"<div class="col-12 text-center p-5 bg-light rounded">
<h4>No internships available</h4>
<p>Please check back later for new opportunities.</p>
</div>"#;

/// Who may press "Apply". Advisory only; the backend enforces the real check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyGate {
    Anonymous,
    OtherRole,
    Student,
}

impl ApplyGate {
    pub fn for_session(session: &Session) -> Self {
        if !session.is_logged_in() {
            Self::Anonymous
        } else if session.is_student() {
            Self::Student
        } else {
            Self::OtherRole
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Anonymous => "Login to Apply",
            Self::OtherRole => "Student Only",
            Self::Student => "Apply Now",
        }
    }

    pub const fn enabled(self) -> bool {
        matches!(self, Self::Student)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CatalogTemplate {
    gate: ApplyGate,
}

impl ListTemplate for CatalogTemplate {
    type Item = Internship;

    fn empty_state(&self) -> &str {
        EMPTY
    }

    fn render_item(&self, internship: &Internship, out: &mut String) {
        let _ = write!(
            out,
            r#"<div class="col-md-6 col-lg-4 mb-4" data-id="{id}">
<div class="card h-100 shadow-sm">
<div class="card-body">
<h5 class="card-title">{title}</h5>
<h6 class="card-subtitle mb-2 text-muted">{company}</h6>
<span class="badge bg-info mb-2">{duration}</span>
<span class="badge bg-primary mb-2">{slots} Slots</span>
<p class="card-text mt-3">{description}</p>
</div>
<div class="card-footer bg-white border-top-0 pb-3">
<button class="btn btn-outline-primary w-100 apply-btn" data-action="apply" data-target="{id}"{disabled}>{label}</button>
</div>
</div>
</div>
"#,
            id = internship.id,
            title = Escaped(&internship.title),
            company = Escaped(&internship.company),
            duration = Escaped(&internship.duration),
            slots = internship.slots,
            description = Escaped(&internship.description),
            disabled = if self.gate.enabled() { "" } else { " disabled" },
            label = self.gate.label(),
        );
    }
}

/// Catalog page state: the internship list and the apply modal.
pub struct CatalogPage {
    list: ListController<CatalogTemplate>,
    form: ApplicationForm,
}

impl CatalogPage {
    pub fn new(session: &Session) -> Self {
        Self {
            list: ListController::new(
                CatalogTemplate {
                    gate: ApplyGate::for_session(session),
                },
                BANNERS,
            ),
            form: ApplicationForm::default(),
        }
    }

    pub async fn load<A: PortalApi + ?Sized>(&mut self, api: &A) -> LoadOutcome {
        self.list.accept(api.get_internships().await)
    }

    pub fn gate(&self) -> ApplyGate {
        self.list.template().gate
    }

    pub fn internships(&self) -> &[Internship] {
        self.list.items()
    }

    pub fn html(&self) -> &str {
        self.list.html()
    }

    pub fn form(&self) -> &ApplicationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ApplicationForm {
        &mut self.form
    }

    /// Handle a click inside the list. Returns whether the apply modal was opened.
    pub fn dispatch(&mut self, click: &DelegatedClick) -> Result<bool, DispatchError> {
        if click.action != "apply" {
            return Err(DispatchError::UnknownAction(click.action.clone()));
        }
        let id: InternshipId = click
            .target
            .parse()
            .map_err(|_| DispatchError::InvalidTarget(click.target.clone()))?;
        if !self.gate().enabled() || !self.internships().iter().any(|i| i.id == id) {
            return Ok(false);
        }
        self.form.open(id);
        Ok(true)
    }

    pub fn render(&self) -> String {
        let mut body = String::from(
            r#"<h2 class="mb-4">Available Internships</h2>
<div id="internships-container" class="row">
"#,
        );
        body.push_str(self.html());
        body.push_str("</div>\n");
        if self.gate().enabled() {
            body.push_str(&self.form.render());
            body.push_str(APPLY_SCRIPT);
        }
        body
    }
}
