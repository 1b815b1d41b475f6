use std::fmt::Write as _;

use super::markup::Escaped;
use crate::navigation::{render_nav, Page};
use crate::session::Session;

const STYLESHEET: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.2/dist/css/bootstrap.min.css";

/// Wrap a page body in the shared document shell and navigation bar.
pub fn render_document(page: Page, session: &Session, body: &str) -> String {
    let mut html = String::with_capacity(body.len() + 1024);
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="{STYLESHEET}">
</head>
<body>
<nav class="navbar navbar-expand-lg navbar-dark bg-primary">
<div class="container">
<a class="navbar-brand" href="/">Internship Portal</a>
{nav}
</div>
</nav>
<main class="container py-4">
{body}
</main>
</body>
</html>"#,
        title = page.title(),
        nav = render_nav(session),
    );
    html
}

/// Inline message region shown above a form. Hidden when there is nothing to say.
pub fn message_region(id: &str, kind: &str, message: Option<&str>) -> String {
    match message {
        Some(message) => format!(
            r#"<div id="{id}" class="alert alert-{kind}">{}</div>"#,
            Escaped(message)
        ),
        None => format!(
            r#"<div id="{id}" class="alert alert-{kind}" style="display: none"></div>"#
        ),
    }
}
