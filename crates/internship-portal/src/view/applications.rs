//! Admin application review: status filter plus approve/reject with optimistic local updates.
//!
//! Only the initial load fetches. Filtering and decisions re-render from the shadow copy, and
//! a decision on one application is refused while an earlier decision on it is still in flight.

use std::collections::HashSet;
use std::fmt::{self, Write as _};
use std::str::FromStr;

use tracing::{info, warn};

use super::markup::{format_date, status_badge, Escaped};
use super::{DelegatedClick, DispatchError, ListController, ListTemplate, LoadBanners, LoadOutcome};
use crate::api::{Acknowledgement, ApiResult, PortalApi};
use crate::domain::{
    Application, ApplicationId, ApplicationStatus, Decision, TransitionError, UnknownStatus,
};

pub const BANNERS: LoadBanners = LoadBanners {
    rejected: r#"<div class="alert alert-danger">Failed to load applications.</div>"#,
    unreachable: r#"<div class="alert alert-danger">Error loading applications.</div>"#,
};

const EMPTY: &str = r#"<div class="text-center p-5 bg-light rounded">
<h4>No applications found</h4>
</div>"#;

/// Asks for confirmation before a decision button submits, reading the prompt from
/// `data-confirm`. Once a card's form is submitted its controls stay disabled and further
/// submissions from it are dropped.
const CONFIRM_SCRIPT: &str = r#"<script>
const applicationsContainer = document.getElementById('applications-container');
applicationsContainer.addEventListener('click', function (event) {
  const control = event.target.closest('[data-action]');
  if (control && !window.confirm(control.dataset.confirm)) event.preventDefault();
});
applicationsContainer.addEventListener('submit', function (event) {
  const card = event.target.closest('[data-id]');
  if (!card) return;
  if (card.dataset.busy) {
    event.preventDefault();
    return;
  }
  card.dataset.busy = 'true';
  card.querySelectorAll('[data-action]').forEach(function (control) {
    control.disabled = true;
  });
});
document.getElementById('statusFilter').addEventListener('change', function () {
  this.form.submit();
});
</script>"#;

/// The status `<select>` value. Empty means every status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApplicationStatus),
}

impl StatusFilter {
    pub fn matches(self, application: &Application) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => application.status == status,
        }
    }

    pub fn value(self) -> &'static str {
        match self {
            Self::All => "",
            Self::Only(status) => status.label(),
        }
    }

    /// Query string that keeps this filter across a round trip, empty for `All`.
    pub fn query(self) -> String {
        match self {
            Self::All => String::new(),
            Self::Only(status) => format!("?status={}", status.label()),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().is_empty() {
            return Ok(Self::All);
        }
        raw.parse().map(Self::Only)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

pub fn confirmation_prompt(decision: Decision) -> String {
    format!(
        "Are you sure you want to {} this application?",
        decision.verb()
    )
}

/// Why a decision was not sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationRefused {
    #[error("application {0} is not loaded")]
    NotFound(ApplicationId),
    #[error(transparent)]
    Terminal(#[from] TransitionError),
    #[error("a decision on application {0} is already in flight")]
    InFlight(ApplicationId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Backend accepted; the shadow copy now holds the new status.
    Applied(ApplicationStatus),
    /// Backend refused or never answered; `alert` is what the admin is told.
    Failed { alert: String },
    /// The admin declined the confirmation prompt.
    Cancelled,
    Refused(MutationRefused),
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationsTemplate {
    busy: HashSet<ApplicationId>,
    filter: StatusFilter,
}

impl ApplicationsTemplate {
    fn render_actions(&self, application: &Application, out: &mut String) {
        let disabled = if self.busy.contains(&application.id) {
            " disabled"
        } else {
            ""
        };
        out.push_str(r#"<div class="d-grid gap-2 w-100">"#);
        for (decision, class, label) in [
            (Decision::Approve, "btn-success", "Accept Application"),
            (Decision::Reject, "btn-danger", "Reject Application"),
        ] {
            let _ = write!(
                out,
                r#"
<form method="post" action="/admin/applications/{id}/{verb}{query}" class="d-grid">
<button type="submit" class="btn {class} action-btn" data-action="{verb}" data-target="{id}" data-confirm="{prompt}"{disabled}>{label}</button>
</form>"#,
                id = application.id,
                verb = decision.verb(),
                query = self.filter.query(),
                prompt = confirmation_prompt(decision),
            );
        }
        out.push_str("\n</div>");
    }
}

impl ListTemplate for ApplicationsTemplate {
    type Item = Application;

    fn empty_state(&self) -> &str {
        EMPTY
    }

    fn render_item(&self, application: &Application, out: &mut String) {
        let text = |value: &Option<String>| Escaped(value.as_deref().unwrap_or("")).to_string();
        let year = application
            .year
            .map(|year| year.to_string())
            .unwrap_or_default();
        let cover_letter = application
            .cover_letter
            .as_deref()
            .filter(|letter| !letter.is_empty())
            .unwrap_or("No cover letter.");

        let _ = write!(
            out,
            r#"<div class="card mb-3 shadow-sm application-card" data-id="{id}">
<div class="card-body">
<div class="row">
<div class="col-md-8">
<div class="d-flex align-items-center mb-2">
<h5 class="card-title mb-0 me-2">{name}</h5>
<span class="badge {badge}">{status}</span>
</div>
<h6 class="text-muted mb-2">Applied for: {title} ({company})</h6>
<p class="mb-1"><strong>Email:</strong> {email}</p>
<p class="mb-1"><strong>Course:</strong> {course} (Year {year})</p>
<div class="mt-3 p-3 bg-light rounded">
<strong>Cover Letter:</strong>
<p class="mb-0 small">{cover_letter}</p>
</div>
"#,
            id = application.id,
            name = text(&application.student_name),
            badge = status_badge(application.status),
            status = application.status,
            title = text(&application.title),
            company = text(&application.company),
            email = text(&application.student_email),
            course = text(&application.course),
            cover_letter = Escaped(cover_letter),
        );
        if let Some(cv) = application.cv_file.as_deref().filter(|cv| !cv.is_empty()) {
            let _ = writeln!(
                out,
                r#"<div class="mt-2"><span class="text-muted">CV Attached: {}</span></div>"#,
                Escaped(cv)
            );
        }
        let _ = write!(
            out,
            r#"</div>
<div class="col-md-4 d-flex flex-column justify-content-center align-items-end border-start">
<div class="text-end mb-3"><small class="text-muted">Applied: {}</small></div>
"#,
            format_date(application.applied_at.as_deref())
        );
        if application.status.is_pending() {
            self.render_actions(application, out);
        } else {
            let _ = write!(
                out,
                r#"<div class="alert {} w-100 text-center mb-0">Application {}</div>"#,
                if application.status == ApplicationStatus::Approved {
                    "alert-success"
                } else {
                    "alert-danger"
                },
                application.status
            );
        }
        out.push_str("\n</div>\n</div>\n</div>\n</div>\n");
    }
}

/// Admin "Manage Applications" page state.
pub struct ApplicationsPage {
    list: ListController<ApplicationsTemplate>,
    filter: StatusFilter,
    alert: Option<String>,
}

impl Default for ApplicationsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationsPage {
    pub fn new() -> Self {
        Self {
            list: ListController::new(ApplicationsTemplate::default(), BANNERS),
            filter: StatusFilter::All,
            alert: None,
        }
    }

    pub async fn load<A: PortalApi + ?Sized>(&mut self, api: &A) -> LoadOutcome {
        let outcome = self.list.accept(api.get_all_applications().await);
        if outcome.is_loaded() {
            self.refresh();
        }
        outcome
    }

    /// Show only applications matching `filter`. Never fetches.
    pub fn set_filter(&mut self, filter: StatusFilter) -> usize {
        self.filter = filter;
        self.refresh()
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    fn refresh(&mut self) -> usize {
        if !self.list.is_loaded() {
            return 0;
        }
        let filter = self.filter;
        self.list.template_mut().filter = filter;
        self.list.render_where(|application| filter.matches(application))
    }

    pub fn applications(&self) -> &[Application] {
        self.list.items()
    }

    pub fn html(&self) -> &str {
        self.list.html()
    }

    /// Last mutation failure, shown as an alert.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn is_in_flight(&self, id: ApplicationId) -> bool {
        self.list.template().busy.contains(&id)
    }

    /// Check a decision may be sent and disable the application's controls.
    pub fn begin_mutation(
        &mut self,
        id: ApplicationId,
        decision: Decision,
    ) -> Result<(), MutationRefused> {
        let status = self
            .applications()
            .iter()
            .find(|application| application.id == id)
            .map(|application| application.status)
            .ok_or(MutationRefused::NotFound(id))?;
        status.apply(decision)?;
        if !self.list.template_mut().busy.insert(id) {
            return Err(MutationRefused::InFlight(id));
        }
        self.alert = None;
        self.refresh();
        Ok(())
    }

    /// Fold the backend's answer into the shadow copy and re-enable the controls.
    pub fn complete_mutation(
        &mut self,
        id: ApplicationId,
        decision: Decision,
        result: ApiResult<Acknowledgement>,
    ) -> MutationOutcome {
        self.list.template_mut().busy.remove(&id);

        let outcome = match result {
            Ok(response) if response.ok => {
                let mut applied = decision.outcome();
                if let Some(application) = self
                    .list
                    .items_mut()
                    .iter_mut()
                    .find(|application| application.id == id)
                {
                    if let Ok(next) = application.status.apply(decision) {
                        application.status = next;
                    }
                    applied = application.status;
                }
                info!(application = %id, status = %applied, "application decided");
                MutationOutcome::Applied(applied)
            }
            Ok(response) => {
                let alert = format!(
                    "Failed to update status: {}",
                    response.error_or("Unknown error")
                );
                warn!(application = %id, %alert, "decision rejected by backend");
                MutationOutcome::Failed { alert }
            }
            Err(err) => {
                warn!(application = %id, error = %err, "decision request failed");
                MutationOutcome::Failed {
                    alert: "Connection error".to_string(),
                }
            }
        };

        if let MutationOutcome::Failed { alert } = &outcome {
            self.alert = Some(alert.clone());
        }
        self.refresh();
        outcome
    }

    /// Send a confirmed decision.
    pub async fn mutate<A: PortalApi + ?Sized>(
        &mut self,
        api: &A,
        id: ApplicationId,
        decision: Decision,
    ) -> MutationOutcome {
        if let Err(refused) = self.begin_mutation(id, decision) {
            return MutationOutcome::Refused(refused);
        }
        let result = api.decide(id, decision).await;
        self.complete_mutation(id, decision, result)
    }

    /// Handle a click on a decision control, asking `confirm` first.
    pub async fn dispatch<A, C>(
        &mut self,
        api: &A,
        click: &DelegatedClick,
        confirm: C,
    ) -> Result<MutationOutcome, DispatchError>
    where
        A: PortalApi + ?Sized,
        C: FnOnce(&str) -> bool,
    {
        let decision: Decision = click
            .action
            .parse()
            .map_err(|_| DispatchError::UnknownAction(click.action.clone()))?;
        let id: ApplicationId = click
            .target
            .parse()
            .map_err(|_| DispatchError::InvalidTarget(click.target.clone()))?;
        if !confirm(&confirmation_prompt(decision)) {
            return Ok(MutationOutcome::Cancelled);
        }
        Ok(self.mutate(api, id, decision).await)
    }

    pub fn render(&self) -> String {
        let mut body = String::from(
            r#"<div class="d-flex justify-content-between align-items-center mb-4">
<h2>Manage Applications</h2>
<form method="get" class="d-flex">
<select id="statusFilter" name="status" class="form-select">
"#,
        );
        let options = std::iter::once(StatusFilter::All)
            .chain(ApplicationStatus::ALL.into_iter().map(StatusFilter::Only));
        for option in options {
            let _ = writeln!(
                body,
                r#"<option value="{value}"{selected}>{label}</option>"#,
                value = option.value(),
                selected = if option == self.filter { " selected" } else { "" },
                label = match option {
                    StatusFilter::All => "All Statuses",
                    StatusFilter::Only(status) => status.label(),
                },
            );
        }
        body.push_str("</select>\n</form>\n</div>\n");
        if let Some(alert) = &self.alert {
            let _ = writeln!(
                body,
                r#"<div class="alert alert-warning" role="alert">{}</div>"#,
                Escaped(alert)
            );
        }
        let _ = write!(
            body,
            "<div id=\"applications-container\">\n{}</div>\n{CONFIRM_SCRIPT}",
            self.html()
        );
        body
    }
}
