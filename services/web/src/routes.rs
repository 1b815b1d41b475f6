use crate::infra::AppState;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect as SeeOther, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use internship_portal::api::{PortalApi, ScopedApi};
use internship_portal::domain::{CvAttachment, Role};
use internship_portal::forms::{
    ApplicationFields, FormOutcome, InternshipFields, LoginFields, LoginForm, RegisterFields,
    RegisterForm,
};
use internship_portal::navigation::{Page, Redirect};
use internship_portal::session::{redirect_if_logged_in, require_admin, require_student, Session};
use internship_portal::view::admin_dashboard::AdminDashboard;
use internship_portal::view::admin_internships::AdminInternshipsPage;
use internship_portal::view::applications::{ApplicationsPage, MutationOutcome, StatusFilter};
use internship_portal::view::catalog::CatalogPage;
use internship_portal::view::home::HomePage;
use internship_portal::view::layout::{message_region, render_document};
use internship_portal::view::student_dashboard::StudentDashboard;
use internship_portal::view::DelegatedClick;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};
use url::form_urlencoded;

const TOKEN_COOKIE: &str = "portal_token";
const ROLE_COOKIE: &str = "portal_role";
const NOTICE_COOKIE: &str = "portal_notice";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CatalogQuery {
    #[serde(default)]
    pub(crate) apply: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CreateQuery {
    #[serde(default)]
    pub(crate) create: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatusQuery {
    #[serde(default)]
    pub(crate) status: String,
}

impl StatusQuery {
    fn filter(&self) -> StatusFilter {
        self.status.parse().unwrap_or_else(|err| {
            debug!(error = %err, "unknown status filter, showing all");
            StatusFilter::All
        })
    }
}

/// Every page route, rendered server-side through the page controllers.
pub(crate) fn portal_router<A: ScopedApi>(api: A) -> Router {
    Router::new()
        .route("/", get(home::<A>))
        .route("/internships", get(catalog::<A>))
        .route("/login", get(login_page::<A>).post(login_submit::<A>))
        .route("/register", get(register_page::<A>).post(register_submit::<A>))
        .route("/logout", get(logout::<A>))
        .route("/apply", post(apply::<A>))
        .route("/dashboard", get(student_dashboard::<A>))
        .route("/admin", get(admin_dashboard::<A>))
        .route(
            "/admin/internships",
            get(admin_internships::<A>).post(create_internship::<A>),
        )
        .route("/admin/applications", get(admin_applications::<A>))
        .route(
            "/admin/applications/:id/:action",
            post(decide_application::<A>),
        )
        .with_state(api)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

fn session_from(jar: &CookieJar) -> Session {
    Session::from_parts(
        jar.get(TOKEN_COOKIE).map(|cookie| cookie.value().to_string()),
        jar.get(ROLE_COOKIE).map(|cookie| Role::from(cookie.value())),
    )
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn remember(mut jar: CookieJar, session: &Session) -> CookieJar {
    if let Some(token) = session.token() {
        jar = jar.add(session_cookie(TOKEN_COOKIE, token.to_string()));
    }
    if let Some(role) = session.role() {
        jar = jar.add(session_cookie(ROLE_COOKIE, role.to_string()));
    }
    jar
}

fn forget(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(ROLE_COOKIE).path("/"))
}

/// One-shot notice shown on the page after a redirect. Percent-encoded to stay a valid cookie
/// value.
fn flash(jar: CookieJar, notice: Option<String>) -> CookieJar {
    match notice {
        Some(notice) => {
            let encoded: String = form_urlencoded::byte_serialize(notice.as_bytes()).collect();
            jar.add(session_cookie(NOTICE_COOKIE, encoded))
        }
        None => jar,
    }
}

fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let notice = jar.get(NOTICE_COOKIE).and_then(|cookie| {
        form_urlencoded::parse(cookie.value().as_bytes())
            .next()
            .map(|(text, _)| text.into_owned())
    });
    match notice {
        Some(notice) => (jar.remove(Cookie::build(NOTICE_COOKIE).path("/")), Some(notice)),
        None => (jar, None),
    }
}

fn go(Redirect(page): Redirect) -> Response {
    SeeOther::to(page.path()).into_response()
}

fn document(page: Page, session: &Session, notice: Option<&str>, body: &str) -> Html<String> {
    let mut content = String::new();
    if notice.is_some() {
        content.push_str(&message_region("notice", "success", notice));
        content.push('\n');
    }
    content.push_str(body);
    Html(render_document(page, session, &content))
}

fn form_card(title: &str, form: &str) -> String {
    format!(
        r#"<div class="row justify-content-center"><div class="col-md-6 col-lg-5">
<div class="card shadow-sm"><div class="card-body p-4">
<h2 class="card-title text-center mb-4">{title}</h2>
{form}
</div></div>
</div></div>"#
    )
}

/// Status and leading markup for a form that did not move on.
fn unfinished(outcome: &FormOutcome) -> (StatusCode, String) {
    match outcome {
        FormOutcome::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            message_region("validation-message", "warning", Some(&errors.to_string())),
        ),
        FormOutcome::Failed(_) => (StatusCode::UNPROCESSABLE_ENTITY, String::new()),
        _ => (StatusCode::OK, String::new()),
    }
}

async fn home<A: ScopedApi>(State(api): State<A>, jar: CookieJar) -> Response {
    let session = session_from(&jar);
    let viewer = api.scoped(session.clone());
    let mut page = HomePage::new(&session);
    page.load(&viewer).await;
    let (jar, notice) = take_flash(jar);
    (jar, document(Page::Home, &session, notice.as_deref(), &page.render())).into_response()
}

async fn catalog<A: ScopedApi>(
    State(api): State<A>,
    jar: CookieJar,
    Query(query): Query<CatalogQuery>,
) -> Response {
    let session = session_from(&jar);
    let viewer = api.scoped(session.clone());
    let mut page = CatalogPage::new(&session);
    page.load(&viewer).await;
    if let Some(target) = query.apply {
        if let Err(err) = page.dispatch(&DelegatedClick::new("apply", target)) {
            debug!(error = %err, "ignored catalog click");
        }
    }
    let (jar, notice) = take_flash(jar);
    (
        jar,
        document(Page::Internships, &session, notice.as_deref(), &page.render()),
    )
        .into_response()
}

async fn login_page<A: ScopedApi>(State(_api): State<A>, jar: CookieJar) -> Response {
    let session = session_from(&jar);
    if let Some(redirect) = redirect_if_logged_in(&session) {
        return go(redirect);
    }
    let (jar, notice) = take_flash(jar);
    let body = form_card("Login", &LoginForm::default().render());
    (jar, document(Page::Login, &session, notice.as_deref(), &body)).into_response()
}

async fn login_submit<A: ScopedApi>(
    State(api): State<A>,
    jar: CookieJar,
    Form(fields): Form<LoginFields>,
) -> Response {
    let viewer = api.scoped(Session::default());
    let mut form = LoginForm::with_fields(fields);
    let outcome = form.submit(&viewer).await;
    if let FormOutcome::Redirect { to, .. } = outcome {
        let jar = remember(jar, &viewer.session().snapshot());
        return (jar, go(Redirect(to))).into_response();
    }
    let (status, lead) = unfinished(&outcome);
    let body = form_card("Login", &format!("{lead}{}", form.render()));
    (status, document(Page::Login, &Session::default(), None, &body)).into_response()
}

async fn register_page<A: ScopedApi>(State(_api): State<A>, jar: CookieJar) -> Response {
    let session = session_from(&jar);
    if let Some(redirect) = redirect_if_logged_in(&session) {
        return go(redirect);
    }
    let body = form_card("Student Registration", &RegisterForm::default().render());
    document(Page::Register, &session, None, &body).into_response()
}

async fn register_submit<A: ScopedApi>(
    State(api): State<A>,
    jar: CookieJar,
    Form(fields): Form<RegisterFields>,
) -> Response {
    let viewer = api.scoped(Session::default());
    let mut form = RegisterForm::with_fields(fields);
    let outcome = form.submit(&viewer).await;
    if let FormOutcome::Redirect { to, notice } = outcome {
        return (flash(jar, notice), go(Redirect(to))).into_response();
    }
    let (status, lead) = unfinished(&outcome);
    let body = form_card("Student Registration", &format!("{lead}{}", form.render()));
    (status, document(Page::Register, &Session::default(), None, &body)).into_response()
}

async fn logout<A: ScopedApi>(State(api): State<A>, jar: CookieJar) -> Response {
    let viewer = api.scoped(session_from(&jar));
    let redirect = viewer.logout();
    (forget(jar), go(redirect)).into_response()
}

async fn read_upload(mut multipart: Multipart) -> Result<ApplicationFields, MultipartError> {
    let mut fields = ApplicationFields::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("internship_id") => fields.internship_id = field.text().await?,
            Some("cover_letter") => fields.cover_letter = field.text().await?,
            Some("cv") => {
                let file_name = field.file_name().unwrap_or("cv").to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    fields.cv = Some(CvAttachment {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }
    Ok(fields)
}

async fn apply<A: ScopedApi>(
    State(api): State<A>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Response, MultipartError> {
    let session = session_from(&jar);
    if let Err(redirect) = require_student(&session) {
        return Ok(go(redirect));
    }
    let upload = read_upload(multipart).await?;
    let viewer = api.scoped(session.clone());

    let mut page = CatalogPage::new(&session);
    page.load(&viewer).await;
    let form = page.form_mut();
    if let Ok(id) = upload.internship_id.parse() {
        form.open(id);
    }
    form.fields = upload;

    let outcome = form.submit(&viewer).await;
    if let FormOutcome::Redirect { to, notice } = outcome {
        return Ok((flash(jar, notice), go(Redirect(to))).into_response());
    }
    let (status, lead) = unfinished(&outcome);
    let body = format!("{lead}{}", page.render());
    Ok((status, document(Page::Internships, &session, None, &body)).into_response())
}

async fn student_dashboard<A: ScopedApi>(State(api): State<A>, jar: CookieJar) -> Response {
    let session = session_from(&jar);
    if let Err(redirect) = require_student(&session) {
        return go(redirect);
    }
    let mut page = StudentDashboard::new();
    page.load(&api.scoped(session.clone())).await;
    let (jar, notice) = take_flash(jar);
    (
        jar,
        document(Page::StudentDashboard, &session, notice.as_deref(), &page.render()),
    )
        .into_response()
}

async fn admin_dashboard<A: ScopedApi>(State(api): State<A>, jar: CookieJar) -> Response {
    let session = session_from(&jar);
    if let Err(redirect) = require_admin(&session) {
        return go(redirect);
    }
    let mut page = AdminDashboard::new();
    page.load(&api.scoped(session.clone())).await;
    document(Page::AdminDashboard, &session, None, &page.render()).into_response()
}

async fn admin_internships<A: ScopedApi>(
    State(api): State<A>,
    jar: CookieJar,
    Query(query): Query<CreateQuery>,
) -> Response {
    let session = session_from(&jar);
    if let Err(redirect) = require_admin(&session) {
        return go(redirect);
    }
    let mut page = AdminInternshipsPage::new();
    page.load(&api.scoped(session.clone())).await;
    if query.create.is_some() {
        page.form_mut().open();
    }
    document(Page::AdminInternships, &session, None, &page.render()).into_response()
}

async fn create_internship<A: ScopedApi>(
    State(api): State<A>,
    jar: CookieJar,
    Form(fields): Form<InternshipFields>,
) -> Response {
    let session = session_from(&jar);
    if let Err(redirect) = require_admin(&session) {
        return go(redirect);
    }
    let viewer = api.scoped(session.clone());
    let mut page = AdminInternshipsPage::new();
    page.load(&viewer).await;
    page.form_mut().open();
    page.form_mut().fields = fields;

    let outcome = page.submit_form(&viewer).await;
    let (status, lead) = unfinished(&outcome);
    let body = format!("{lead}{}", page.render());
    (status, document(Page::AdminInternships, &session, None, &body)).into_response()
}

async fn admin_applications<A: ScopedApi>(
    State(api): State<A>,
    jar: CookieJar,
    Query(query): Query<StatusQuery>,
) -> Response {
    let session = session_from(&jar);
    if let Err(redirect) = require_admin(&session) {
        return go(redirect);
    }
    let mut page = ApplicationsPage::new();
    page.load(&api.scoped(session.clone())).await;
    page.set_filter(query.filter());
    document(Page::AdminApplications, &session, None, &page.render()).into_response()
}

/// Form target of the Accept/Reject buttons. The browser has already asked for confirmation.
async fn decide_application<A: ScopedApi>(
    State(api): State<A>,
    jar: CookieJar,
    Path((id, action)): Path<(String, String)>,
    Query(query): Query<StatusQuery>,
) -> Response {
    let session = session_from(&jar);
    if let Err(redirect) = require_admin(&session) {
        return go(redirect);
    }
    let viewer = api.scoped(session.clone());
    let mut page = ApplicationsPage::new();
    page.load(&viewer).await;
    page.set_filter(query.filter());
    let back = format!("{}{}", Page::AdminApplications.path(), page.filter().query());

    let click = DelegatedClick::new(action, id);
    let (status, lead) = match page.dispatch(&viewer, &click, |_| true).await {
        Ok(MutationOutcome::Applied(status)) => {
            info!(application = %click.target, %status, "decision recorded");
            return SeeOther::to(&back).into_response();
        }
        Ok(MutationOutcome::Cancelled) => return SeeOther::to(&back).into_response(),
        Ok(MutationOutcome::Failed { .. }) => (StatusCode::BAD_GATEWAY, String::new()),
        Ok(MutationOutcome::Refused(refused)) => (
            StatusCode::CONFLICT,
            message_region("mutation-message", "warning", Some(&refused.to_string())),
        ),
        Err(err) => (
            StatusCode::NOT_FOUND,
            message_region("mutation-message", "warning", Some(&err.to_string())),
        ),
    };
    let body = format!("{lead}{}", page.render());
    (status, document(Page::AdminApplications, &session, None, &body)).into_response()
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{sample_backend, SAMPLE_ADMIN, SAMPLE_STUDENT};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use internship_portal::api::InMemoryPortalApi;
    use internship_portal::domain::{ApplicationId, ApplicationStatus};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn build_router(backend: &InMemoryPortalApi) -> Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        portal_router(backend.clone()).layer(Extension(state))
    }

    fn cookies_for(backend: &InMemoryPortalApi, email: &str, role: &str) -> String {
        let token = backend.token_of(email).expect("seeded account");
        format!("{TOKEN_COOKIE}={token}; {ROLE_COOKIE}={role}")
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf-8 page")
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn home_renders_three_teasers_and_view_all() {
        let backend = sample_backend();
        let response = build_router(&backend)
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("View All Internships"));
        assert!(html.contains(r#"href="/login" class="btn btn-outline-primary""#));
    }

    #[tokio::test]
    async fn admin_pages_redirect_anonymous_viewers_to_login() {
        let backend = sample_backend();
        for path in ["/admin", "/admin/applications", "/admin/internships", "/dashboard"] {
            let response = build_router(&backend)
                .oneshot(Request::get(path).body(Body::empty()).expect("request"))
                .await
                .expect("router dispatch");
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
            assert_eq!(location(&response), "/login");
        }
    }

    #[tokio::test]
    async fn login_sets_session_cookies_and_redirects_by_role() {
        let backend = sample_backend();
        let (email, password) = SAMPLE_ADMIN;
        let body = format!("email={}&password={password}", email.replace('@', "%40"));
        let response = build_router(&backend)
            .oneshot(
                Request::post("/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin");
        let cookies: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        assert!(cookies.iter().any(|cookie| cookie.starts_with("portal_token=")));
        assert!(cookies.iter().any(|cookie| cookie.starts_with("portal_role=admin")));
    }

    #[tokio::test]
    async fn bad_login_rerenders_form_with_error() {
        let backend = sample_backend();
        let response = build_router(&backend)
            .oneshot(
                Request::post("/login")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("email=nobody%40portal.test&password=x"))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("Invalid credentials"));
        assert!(html.contains(r#"value="nobody@portal.test""#));
    }

    #[tokio::test]
    async fn logged_in_viewer_skips_login_page() {
        let backend = sample_backend();
        let response = build_router(&backend)
            .oneshot(
                Request::get("/login")
                    .header(header::COOKIE, cookies_for(&backend, SAMPLE_STUDENT.0, "student"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(location(&response), "/dashboard");
    }

    #[tokio::test]
    async fn status_query_filters_applications() {
        let backend = sample_backend();
        let response = build_router(&backend)
            .oneshot(
                Request::get("/admin/applications?status=Approved")
                    .header(header::COOKIE, cookies_for(&backend, SAMPLE_ADMIN.0, "admin"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert_eq!(html.matches("application-card").count(), 1);
        assert!(html.contains("Riley Chen"));
        assert!(html.contains(r#"<option value="Approved" selected>"#));
    }

    #[tokio::test]
    async fn approve_route_updates_backend_and_redirects() {
        let backend = sample_backend();
        let response = build_router(&backend)
            .oneshot(
                Request::post("/admin/applications/1/approve")
                    .header(header::COOKIE, cookies_for(&backend, SAMPLE_ADMIN.0, "admin"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin/applications");
        let decided = backend
            .applications()
            .into_iter()
            .find(|application| application.id == ApplicationId(1))
            .expect("seeded application");
        assert_eq!(decided.status, ApplicationStatus::Approved);
    }

    #[tokio::test]
    async fn decision_keeps_the_status_filter() {
        let backend = sample_backend();
        let response = build_router(&backend)
            .oneshot(
                Request::post("/admin/applications/1/reject?status=Pending")
                    .header(header::COOKIE, cookies_for(&backend, SAMPLE_ADMIN.0, "admin"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin/applications?status=Pending");
    }

    #[tokio::test]
    async fn refused_decision_rerenders_with_the_status_filter() {
        let backend = sample_backend();
        let response = build_router(&backend)
            .oneshot(
                Request::post("/admin/applications/2/approve?status=Approved")
                    .header(header::COOKIE, cookies_for(&backend, SAMPLE_ADMIN.0, "admin"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let html = body_text(response).await;
        assert!(html.contains(r#"<option value="Approved" selected>"#));
        assert_eq!(html.matches("application-card").count(), 1);
    }

    #[tokio::test]
    async fn deciding_a_closed_application_conflicts() {
        let backend = sample_backend();
        let response = build_router(&backend)
            .oneshot(
                Request::post("/admin/applications/2/reject")
                    .header(header::COOKIE, cookies_for(&backend, SAMPLE_ADMIN.0, "admin"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(body_text(response).await.contains("already Approved"));
    }

    #[tokio::test]
    async fn multipart_apply_redirects_to_dashboard_with_notice() {
        let backend = sample_backend();
        let body = concat!(
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"internship_id\"\r\n\r\n",
            "2\r\n",
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"cover_letter\"\r\n\r\n",
            "Numbers are my thing.\r\n",
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"cv\"; filename=\"cv.pdf\"\r\n",
            "Content-Type: application/pdf\r\n\r\n",
            "%PDF-1.4\r\n",
            "--XBOUNDARY--\r\n",
        );
        let response = build_router(&backend)
            .oneshot(
                Request::post("/apply")
                    .header(header::COOKIE, cookies_for(&backend, SAMPLE_STUDENT.0, "student"))
                    .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
        assert!(response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .any(|value| value.to_str().unwrap_or_default().starts_with("portal_notice=")));
        assert_eq!(backend.applications().len(), 4);
    }

    #[tokio::test]
    async fn flash_notice_round_trips_through_cookie() {
        let jar = flash(CookieJar::new(), Some("Application submitted successfully!".to_string()));
        let (_, notice) = take_flash(jar);
        assert_eq!(notice.as_deref(), Some("Application submitted successfully!"));
    }

    #[tokio::test]
    async fn health_and_readiness_endpoints_respond() {
        let backend = sample_backend();
        let router = build_router(&backend);
        let health = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("router dispatch");
        assert_eq!(health.status(), StatusCode::OK);

        let ready = router
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("router dispatch");
        assert_eq!(ready.status(), StatusCode::OK);
    }
}
