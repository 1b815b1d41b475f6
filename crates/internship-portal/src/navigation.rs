use std::fmt::Write as _;

use crate::domain::Role;
use crate::session::Session;

/// Pages of the portal that controllers can redirect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Login,
    Register,
    Internships,
    StudentDashboard,
    AdminDashboard,
    AdminInternships,
    AdminApplications,
}

impl Page {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Internships => "/internships",
            Self::StudentDashboard => "/dashboard",
            Self::AdminDashboard => "/admin",
            Self::AdminInternships => "/admin/internships",
            Self::AdminApplications => "/admin/applications",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Internship Portal",
            Self::Login => "Login",
            Self::Register => "Register",
            Self::Internships => "Internships",
            Self::StudentDashboard => "My Applications",
            Self::AdminDashboard => "Admin Dashboard",
            Self::AdminInternships => "Manage Internships",
            Self::AdminApplications => "Manage Applications",
        }
    }

    /// Landing page for a logged-in viewer. Anything that is not admin lands on the
    /// student dashboard.
    pub fn dashboard_for(role: Option<&Role>) -> Self {
        match role {
            Some(Role::Admin) => Self::AdminDashboard,
            _ => Self::StudentDashboard,
        }
    }
}

/// Client-side redirect issued by guards, forms and logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect(pub Page);

impl Redirect {
    pub const fn page(self) -> Page {
        self.0
    }

    pub const fn location(self) -> &'static str {
        self.0.path()
    }
}

/// Navigation links for the current viewer.
///
/// Logged-in viewers get their dashboard and a logout link; anonymous viewers get login and
/// register links.
pub fn render_nav(session: &Session) -> String {
    let mut html = String::from(r#"<ul class="navbar-nav ms-auto">"#);
    let links: [(&str, &str); 2] = if session.is_logged_in() {
        [
            (Page::dashboard_for(session.role()).path(), "Dashboard"),
            ("/logout", "Logout"),
        ]
    } else {
        [(Page::Login.path(), "Login"), (Page::Register.path(), "Register")]
    };

    let _ = write!(
        html,
        r#"<li class="nav-item"><a class="nav-link" href="{}">Internships</a></li>"#,
        Page::Internships.path()
    );
    for (href, label) in links {
        let _ = write!(
            html,
            r#"<li class="nav-item"><a class="nav-link" href="{href}">{label}</a></li>"#
        );
    }
    html.push_str("</ul>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_depends_on_role() {
        assert_eq!(
            Page::dashboard_for(Some(&Role::Admin)),
            Page::AdminDashboard
        );
        assert_eq!(
            Page::dashboard_for(Some(&Role::Student)),
            Page::StudentDashboard
        );
        assert_eq!(Page::dashboard_for(None), Page::StudentDashboard);
    }

    #[test]
    fn nav_links_follow_login_state() {
        let anonymous = render_nav(&Session::default());
        assert!(anonymous.contains(r#"href="/login""#));
        assert!(!anonymous.contains("Logout"));

        let admin = render_nav(&Session::new("token", Role::Admin));
        assert!(admin.contains(r#"href="/admin""#));
        assert!(admin.contains(r#"href="/logout""#));
    }
}
