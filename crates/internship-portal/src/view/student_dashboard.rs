use std::fmt::Write as _;

use tracing::warn;

use super::markup::{format_date, status_badge, Escaped};
use super::{ListController, ListTemplate, LoadBanners, LoadOutcome};
use crate::api::PortalApi;
use crate::domain::{Application, CurrentUser};
use crate::navigation::Page;

pub const BANNERS: LoadBanners = LoadBanners {
    rejected: r#"<div class="alert alert-danger">Failed to load applications.</div>"#,
    unreachable: r#"<div class="alert alert-danger">Error loading dashboard. Please try again later.</div>"#,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct StudentApplicationsTemplate;

impl ListTemplate for StudentApplicationsTemplate {
    type Item = Application;

    fn empty_state(&self) -> &str {
        r#"<div class="col-12 text-center p-5 bg-light rounded">
<h4>No applications yet</h4>
<p>Browse internships and apply to get started!</p>
<a href="/internships" class="btn btn-primary mt-2">Browse Internships</a>
</div>"#
    }

    fn render_item(&self, application: &Application, out: &mut String) {
        let title = application
            .title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or("Internship");
        let company = application
            .company
            .as_deref()
            .filter(|company| !company.is_empty())
            .unwrap_or("Company");
        let cover_letter = application
            .cover_letter
            .as_deref()
            .filter(|letter| !letter.is_empty())
            .unwrap_or("No cover letter submitted.");

        let _ = write!(
            out,
            r#"<div class="col-md-6 mb-4" data-id="{id}">
<div class="card h-100 shadow-sm">
<div class="card-body">
<div class="d-flex justify-content-between align-items-start mb-2">
<h5 class="card-title">{title}</h5>
<span class="badge {badge}">{status}</span>
</div>
<h6 class="card-subtitle mb-3 text-muted">{company}</h6>
<p class="card-text"><small class="text-muted">Applied on: {applied}</small></p>
<hr>
<h6>My Application:</h6>
<p class="card-text small">{cover_letter}</p>
"#,
            id = application.id,
            title = Escaped(title),
            badge = status_badge(application.status),
            status = application.status,
            company = Escaped(company),
            applied = format_date(application.applied_at.as_deref()),
            cover_letter = Escaped(cover_letter),
        );
        if let Some(cv) = application.cv_file.as_deref().filter(|cv| !cv.is_empty()) {
            let _ = writeln!(out, r#"<p class="mb-0 small">CV: {}</p>"#, Escaped(cv));
        }
        out.push_str("</div>\n</div>\n</div>\n");
    }

    fn render_items(&self, items: &[&Application], out: &mut String) {
        out.push_str("<div class=\"row\">\n");
        for application in items {
            self.render_item(application, out);
        }
        out.push_str("</div>\n");
    }
}

/// The logged-in student's own applications.
pub struct StudentDashboard {
    user: Option<CurrentUser>,
    list: ListController<StudentApplicationsTemplate>,
}

impl Default for StudentDashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentDashboard {
    pub fn new() -> Self {
        Self {
            user: None,
            list: ListController::new(StudentApplicationsTemplate, BANNERS),
        }
    }

    /// Fetch the viewer, then their applications. An unreachable backend stops at the first call.
    pub async fn load<A: PortalApi + ?Sized>(&mut self, api: &A) -> LoadOutcome {
        match api.get_current_user().await {
            Ok(response) => self.user = response.into_data(),
            Err(err) => {
                warn!(error = %err, "student dashboard could not load the viewer");
                self.user = None;
                return self.list.accept(Err(err));
            }
        }
        self.list.accept(api.get_application_status().await)
    }

    pub fn greeting_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|user| user.display_name("Student"))
            .unwrap_or("Student")
    }

    pub fn applications(&self) -> &[Application] {
        self.list.items()
    }

    pub fn html(&self) -> &str {
        self.list.html()
    }

    pub fn render(&self) -> String {
        format!(
            r#"<div class="d-flex justify-content-between align-items-center mb-4">
<h2>Welcome, <span id="student-name">{name}</span></h2>
<a class="btn btn-outline-primary" href="{catalog}">Browse Internships</a>
</div>
<h4 class="mb-3">My Applications</h4>
<div id="applications-container">
{list}</div>
"#,
            name = Escaped(self.greeting_name()),
            catalog = Page::Internships.path(),
            list = self.html(),
        )
    }
}
