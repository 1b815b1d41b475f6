use std::fmt::Write as _;

use super::markup::{excerpt, Escaped};
use super::{ListController, ListTemplate, LoadBanners, LoadOutcome};
use crate::api::PortalApi;
use crate::domain::Internship;
use crate::navigation::Page;
use crate::session::Session;

/// Teaser cards shown on the landing page.
pub const TEASER_COUNT: usize = 3;
const EXCERPT_CHARS: usize = 100;

pub const BANNERS: LoadBanners = LoadBanners {
    rejected: r#"<div class="alert alert-danger">Failed to load internships.</div>"#,
    unreachable: r#"<div class="alert alert-danger">Error loading internships.</div>"#,
};

const EMPTY: &str = r#"<div class="col-12 text-center p-5 bg-light rounded">
<h4>No internships available at the moment</h4>
</div>"#;

#[derive(Debug, Clone, Copy)]
pub struct HomeTemplate {
    logged_in: bool,
}

impl ListTemplate for HomeTemplate {
    type Item = Internship;

    fn empty_state(&self) -> &str {
        EMPTY
    }

    fn render_item(&self, internship: &Internship, out: &mut String) {
        let _ = write!(
            out,
            r#"<div class="col-md-4 mb-4" data-id="{id}">
<div class="card h-100 shadow-sm">
<div class="card-body">
<h5 class="card-title">{title}</h5>
<h6 class="card-subtitle mb-2 text-muted">{company}</h6>
<p class="card-text">{description}</p>
<span class="badge bg-primary">{slots} Slots</span>
</div>
</div>
</div>
"#,
            id = internship.id,
            title = Escaped(&internship.title),
            company = Escaped(&internship.company),
            description = Escaped(&excerpt(&internship.description, EXCERPT_CHARS)),
            slots = internship.slots,
        );
    }

    fn render_items(&self, items: &[&Internship], out: &mut String) {
        for internship in items.iter().take(TEASER_COUNT) {
            self.render_item(internship, out);
        }
        if items.len() > TEASER_COUNT {
            let target = if self.logged_in {
                Page::Internships
            } else {
                Page::Login
            };
            let _ = write!(
                out,
                r#"<div class="col-12 text-center mt-3">
<a href="{}" class="btn btn-outline-primary">View All Internships</a>
</div>
"#,
                target.path()
            );
        }
    }
}

pub struct HomePage {
    list: ListController<HomeTemplate>,
}

impl HomePage {
    pub fn new(session: &Session) -> Self {
        Self {
            list: ListController::new(
                HomeTemplate {
                    logged_in: session.is_logged_in(),
                },
                BANNERS,
            ),
        }
    }

    pub async fn load<A: PortalApi + ?Sized>(&mut self, api: &A) -> LoadOutcome {
        self.list.accept(api.get_internships().await)
    }

    pub fn html(&self) -> &str {
        self.list.html()
    }

    pub fn render(&self) -> String {
        format!(
            r#"<div class="p-5 mb-4 bg-light rounded-3">
<h1 class="display-5 fw-bold">Find your internship</h1>
<p class="col-md-8 fs-5">Browse openings, apply with your CV and follow your applications in one place.</p>
</div>
<h2 class="mb-4">Latest Internships</h2>
<div id="internships-container" class="row">
{}</div>
"#,
            self.html()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryPortalApi;
    use crate::domain::{InternshipId, Role};

    fn internships(count: i64) -> Vec<Internship> {
        (1..=count)
            .map(|id| Internship {
                id: InternshipId(id),
                title: format!("Role {id}"),
                company: "Acme".to_string(),
                description: "x".repeat(150),
                duration: "3 months".to_string(),
                slots: 1,
                date_posted: Some(format!("2025-01-{id:02}")),
            })
            .collect()
    }

    #[tokio::test]
    async fn shows_three_teasers_with_excerpts() {
        let api = InMemoryPortalApi::new().with_internships(internships(5));
        let mut page = HomePage::new(&Session::default());
        page.load(&api).await;
        assert_eq!(page.html().matches("data-id=").count(), 3);
        assert!(page.html().contains(&format!("{}...", "x".repeat(100))));
    }

    #[tokio::test]
    async fn view_all_link_depends_on_login() {
        let api = InMemoryPortalApi::new().with_internships(internships(4));

        let mut anonymous = HomePage::new(&Session::default());
        anonymous.load(&api).await;
        assert!(anonymous
            .html()
            .contains(r#"href="/login" class="btn btn-outline-primary">View All"#));

        let mut student = HomePage::new(&Session::new("t", Role::Student));
        student.load(&api).await;
        assert!(student.html().contains(r#"href="/internships""#));
    }

    #[tokio::test]
    async fn three_or_fewer_have_no_view_all_link() {
        let api = InMemoryPortalApi::new().with_internships(internships(3));
        let mut page = HomePage::new(&Session::default());
        page.load(&api).await;
        assert!(!page.html().contains("View All Internships"));
    }

    #[tokio::test]
    async fn empty_home_message() {
        let mut page = HomePage::new(&Session::default());
        page.load(&InMemoryPortalApi::new()).await;
        assert!(page.render().contains("No internships available at the moment"));
    }
}
