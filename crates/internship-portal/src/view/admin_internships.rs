use std::fmt::Write as _;

use super::markup::{excerpt, format_date, Escaped};
use super::{ListController, ListTemplate, LoadBanners, LoadOutcome};
use crate::api::PortalApi;
use crate::domain::Internship;
use crate::forms::{FormOutcome, InternshipForm};

pub const BANNERS: LoadBanners = LoadBanners {
    rejected: r#"<div class="alert alert-danger">Failed to load internships.</div>"#,
    unreachable: r#"<div class="alert alert-danger">Error loading internships.</div>"#,
};

const EMPTY: &str = r#"<div class="col-12 text-center p-5 bg-light rounded">
<h4>No internships created yet</h4>
<p>Click the "Create New Internship" button to add one.</p>
</div>"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct AdminInternshipsTemplate;

impl ListTemplate for AdminInternshipsTemplate {
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
<div class="d-flex justify-content-between align-items-start">
<h5 class="card-title">{title}</h5>
<span class="badge bg-primary">{slots} Slots</span>
</div>
<h6 class="card-subtitle mb-2 text-muted">{company}</h6>
<span class="badge bg-info text-dark mb-2">{duration}</span>
<p class="card-text mt-2 small text-muted">Posted: {posted}</p>
<p class="card-text">{description}</p>
</div>
</div>
</div>
"#,
            id = internship.id,
            title = Escaped(&internship.title),
            slots = internship.slots,
            company = Escaped(&internship.company),
            duration = Escaped(&internship.duration),
            posted = format_date(internship.date_posted.as_deref()),
            description = Escaped(&excerpt(&internship.description, 100)),
        );
    }
}

/// Admin internship list plus the creation modal.
pub struct AdminInternshipsPage {
    list: ListController<AdminInternshipsTemplate>,
    form: InternshipForm,
    notice: Option<String>,
}

impl Default for AdminInternshipsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminInternshipsPage {
    pub fn new() -> Self {
        Self {
            list: ListController::new(AdminInternshipsTemplate, BANNERS),
            form: InternshipForm::default(),
            notice: None,
        }
    }

    pub async fn load<A: PortalApi + ?Sized>(&mut self, api: &A) -> LoadOutcome {
        self.list.accept(api.get_internships().await)
    }

    /// Submit the creation modal; a successful create refetches the list.
    pub async fn submit_form<A: PortalApi + ?Sized>(&mut self, api: &A) -> FormOutcome {
        let outcome = self.form.submit(api).await;
        if let FormOutcome::Completed { notice } = &outcome {
            self.notice = notice.clone();
            self.load(api).await;
        }
        outcome
    }

    pub fn internships(&self) -> &[Internship] {
        self.list.items()
    }

    pub fn html(&self) -> &str {
        self.list.html()
    }

    pub fn form(&self) -> &InternshipForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut InternshipForm {
        &mut self.form
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn render(&self) -> String {
        let mut body = String::new();
        if let Some(notice) = &self.notice {
            let _ = writeln!(
                body,
                r#"<div class="alert alert-success">{}</div>"#,
                Escaped(notice)
            );
        }
        let _ = write!(
            body,
            r#"<div class="d-flex justify-content-between align-items-center mb-4">
<h2>Manage Internships</h2>
<a class="btn btn-primary" href="?create=1">Create New Internship</a>
</div>
<div id="internships-container" class="row">
{list}</div>
{modal}"#,
            list = self.html(),
            modal = self.form.render(),
        );
        body
    }
}
