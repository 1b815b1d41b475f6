use serde_json::{json, Value};
use tracing::warn;

use super::markup::Escaped;
use crate::api::PortalApi;
use crate::domain::{CurrentUser, PortalStats};
use crate::navigation::Page;

const CHART_SCRIPT: &str = r#"<script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
<script>
new Chart(document.getElementById('statsChart'), JSON.parse(document.getElementById('statsChartData').textContent));
</script>"#;

/// Counters and chart data for the admin landing page.
#[derive(Debug, Clone, Default)]
pub struct AdminDashboard {
    user: Option<CurrentUser>,
    stats: Option<PortalStats>,
}

impl AdminDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the viewer and the counters. Failures leave the tiles at zero.
    pub async fn load<A: PortalApi + ?Sized>(&mut self, api: &A) -> bool {
        self.user = match api.get_current_user().await {
            Ok(response) => response.into_data(),
            Err(err) => {
                warn!(error = %err, "admin dashboard could not load the viewer");
                return false;
            }
        };
        self.stats = match api.get_stats().await {
            Ok(response) if response.ok => response.data,
            Ok(response) => {
                warn!(error = ?response.error, "stats rejected by backend");
                None
            }
            Err(err) => {
                warn!(error = %err, "stats request failed");
                None
            }
        };
        self.stats.is_some()
    }

    pub fn greeting_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|user| user.display_name("Admin"))
            .unwrap_or("Admin")
    }

    pub fn stats(&self) -> PortalStats {
        self.stats.unwrap_or_default()
    }

    /// Bar chart configuration for the Pending/Approved/Rejected split.
    pub fn chart(&self) -> Value {
        let stats = self.stats();
        json!({
            "type": "bar",
            "data": {
                "labels": ["Pending", "Approved", "Rejected"],
                "datasets": [{
                    "label": "Applications Status",
                    "data": [
                        stats.pending_applications,
                        stats.approved_applications,
                        stats.rejected_applications
                    ],
                    "backgroundColor": [
                        "rgba(255, 193, 7, 0.7)",
                        "rgba(25, 135, 84, 0.7)",
                        "rgba(220, 53, 69, 0.7)"
                    ],
                    "borderColor": [
                        "rgba(255, 193, 7, 1)",
                        "rgba(25, 135, 84, 1)",
                        "rgba(220, 53, 69, 1)"
                    ],
                    "borderWidth": 1
                }]
            },
            "options": {
                "responsive": true,
                "scales": { "y": { "beginAtZero": true, "ticks": { "stepSize": 1 } } }
            },
        })
    }

    pub fn render(&self) -> String {
        let stats = self.stats();
        let tile = |id: &str, label: &str, value: u64, class: &str| {
            format!(
                r#"<div class="col-md-3 mb-3"><div class="card text-white {class} h-100"><div class="card-body">
<h6 class="card-title">{label}</h6>
<p class="display-6 mb-0" id="{id}">{value}</p>
</div></div></div>"#
            )
        };
        format!(
            r#"<h2 class="mb-4">Welcome, <span id="admin-name">{name}</span></h2>
<div class="row mb-4">
{internships}
{applications}
{pending}
{approved}
</div>
<div class="row mb-4">
<div class="col-md-6"><a class="btn btn-primary w-100" href="{manage_internships}">Manage Internships</a></div>
<div class="col-md-6"><a class="btn btn-outline-primary w-100" href="{manage_applications}">Manage Applications</a></div>
</div>
<div class="card"><div class="card-body"><canvas id="statsChart"></canvas></div></div>
<script type="application/json" id="statsChartData">{chart}</script>
{CHART_SCRIPT}"#,
            name = Escaped(self.greeting_name()),
            internships = tile(
                "stat-total-internships",
                "Total Internships",
                stats.total_internships,
                "bg-primary"
            ),
            applications = tile(
                "stat-total-applications",
                "Total Applications",
                stats.total_applications,
                "bg-info"
            ),
            pending = tile("stat-pending", "Pending", stats.pending_applications, "bg-warning"),
            approved = tile("stat-approved", "Approved", stats.approved_applications, "bg-success"),
            manage_internships = Page::AdminInternships.path(),
            manage_applications = Page::AdminApplications.path(),
            chart = self.chart(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{InMemoryPortalApi, ScopedApi, SimulatedFailure, Verb};
    use crate::domain::{
        Application, ApplicationId, ApplicationStatus, InternshipId, Role,
    };
    use crate::session::Session;

    fn application(id: i64, status: ApplicationStatus) -> Application {
        Application {
            id: ApplicationId(id),
            internship_id: InternshipId(1),
            student_name: None,
            student_email: None,
            course: None,
            year: None,
            cover_letter: None,
            cv_file: None,
            status,
            applied_at: None,
            title: None,
            company: None,
        }
    }

    fn admin() -> InMemoryPortalApi {
        let api = InMemoryPortalApi::new()
            .with_applications(vec![
                application(1, ApplicationStatus::Pending),
                application(2, ApplicationStatus::Pending),
                application(3, ApplicationStatus::Rejected),
            ])
            .with_account("Ada", "ada@portal.test", "pw", Role::Admin);
        let token = api.token_of("ada@portal.test").expect("seeded");
        api.scoped(Session::new(token, Role::Admin))
    }

    #[tokio::test]
    async fn tiles_and_chart_follow_stats() {
        let mut dashboard = AdminDashboard::new();
        assert!(dashboard.load(&admin()).await);
        assert_eq!(dashboard.greeting_name(), "Ada");
        assert_eq!(dashboard.chart()["data"]["datasets"][0]["data"], json!([2, 0, 1]));

        let html = dashboard.render();
        assert!(html.contains(r#"id="stat-pending">2<"#));
        assert!(html.contains(r#"id="stat-total-applications">3<"#));
    }

    #[tokio::test]
    async fn failed_stats_leave_zeroes() {
        let api = admin();
        api.fail(Verb::GetStats, SimulatedFailure::Unreachable);
        let mut dashboard = AdminDashboard::new();
        assert!(!dashboard.load(&api).await);
        assert_eq!(dashboard.stats(), PortalStats::default());
        assert!(dashboard.render().contains(r#"id="stat-approved">0<"#));
    }

    #[tokio::test]
    async fn anonymous_user_gets_generic_greeting() {
        let mut dashboard = AdminDashboard::new();
        dashboard.load(&InMemoryPortalApi::new()).await;
        assert_eq!(dashboard.greeting_name(), "Admin");
    }
}
