use crate::infra::{sample_backend, SAMPLE_ADMIN, SAMPLE_STUDENT};
use clap::{Args, ValueEnum};
use internship_portal::api::{InMemoryPortalApi, PortalApi, ScopedApi};
use internship_portal::domain::{ApplicationStatus, CvAttachment, Decision};
use internship_portal::error::AppError;
use internship_portal::forms::{FormOutcome, LoginFields, LoginForm};
use internship_portal::navigation::Page;
use internship_portal::session::Session;
use internship_portal::view::admin_dashboard::AdminDashboard;
use internship_portal::view::admin_internships::AdminInternshipsPage;
use internship_portal::view::applications::{ApplicationsPage, StatusFilter};
use internship_portal::view::catalog::CatalogPage;
use internship_portal::view::home::HomePage;
use internship_portal::view::layout::render_document;
use internship_portal::view::student_dashboard::StudentDashboard;
use internship_portal::view::DelegatedClick;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum DemoPage {
    Home,
    Catalog,
    StudentDashboard,
    AdminDashboard,
    AdminInternships,
    AdminApplications,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the full HTML document for this page instead of the walkthrough summary.
    #[arg(long, value_enum)]
    pub(crate) page: Option<DemoPage>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let backend = sample_backend();
    let student = login(&backend, SAMPLE_STUDENT).await;
    let admin = login(&backend, SAMPLE_ADMIN).await;

    if let Some(page) = args.page {
        println!("{}", render_page(page, &backend, &student, &admin).await);
        return Ok(());
    }

    println!("Internship portal walkthrough (in-memory backend)");

    let mut home = HomePage::new(&Session::default());
    let outcome = home.load(&backend.scoped(Session::default())).await;
    println!("\nHome page: {outcome:?}");

    let student_session = student.session().snapshot();
    let mut catalog = CatalogPage::new(&student_session);
    catalog.load(&student).await;
    println!(
        "Catalog as student: {} listings, apply gate {:?}",
        catalog.internships().len(),
        catalog.gate()
    );

    let target = catalog
        .internships()
        .last()
        .map(|internship| internship.id.to_string())
        .unwrap_or_default();
    match catalog.dispatch(&DelegatedClick::new("apply", target.clone())) {
        Ok(true) => {
            let form = catalog.form_mut();
            form.fields.cover_letter = "Security is where I want to grow.".to_string();
            form.fields.cv = Some(CvAttachment {
                file_name: "jordan-lee.pdf".to_string(),
                bytes: b"%PDF-1.4 demo".to_vec(),
            });
            let outcome = form.submit(&student).await;
            println!("  Applied to internship {target}: {}", describe(&outcome));
        }
        Ok(false) => println!("  Apply button is gated for this viewer"),
        Err(err) => println!("  Click ignored: {err}"),
    }

    let mut dashboard = StudentDashboard::new();
    dashboard.load(&student).await;
    println!(
        "Student dashboard for {}: {} applications",
        dashboard.greeting_name(),
        dashboard.applications().len()
    );

    let mut review = ApplicationsPage::new();
    review.load(&admin).await;
    let shown = review.set_filter(StatusFilter::Only(ApplicationStatus::Pending));
    println!("\nAdmin review: {shown} pending of {}", review.applications().len());
    let pending: Vec<_> = review
        .applications()
        .iter()
        .filter(|application| application.status == ApplicationStatus::Pending)
        .map(|application| application.id)
        .collect();
    for (index, id) in pending.into_iter().enumerate() {
        let decision = if index % 2 == 0 {
            Decision::Approve
        } else {
            Decision::Reject
        };
        let outcome = review.mutate(&admin, id, decision).await;
        println!("  {} application {id}: {outcome:?}", decision.verb());
    }

    let mut stats = AdminDashboard::new();
    stats.load(&admin).await;
    let counts = stats.stats();
    println!(
        "Admin dashboard: {} internships, {} applications ({} pending, {} approved, {} rejected)",
        counts.total_internships,
        counts.total_applications,
        counts.pending_applications,
        counts.approved_applications,
        counts.rejected_applications
    );

    println!("\nRe-run with --page <name> to print a full rendered page.");
    Ok(())
}

async fn login(backend: &InMemoryPortalApi, (email, password): (&str, &str)) -> InMemoryPortalApi {
    let api = backend.scoped(Session::default());
    let mut form = LoginForm::with_fields(LoginFields {
        email: email.to_string(),
        password: password.to_string(),
    });
    let outcome = form.submit(&api).await;
    if !outcome.is_success() {
        println!("Login for {email} failed: {}", describe(&outcome));
    }
    api
}

fn describe(outcome: &FormOutcome) -> String {
    match outcome {
        FormOutcome::Invalid(errors) => format!("invalid ({errors})"),
        FormOutcome::Busy => "already submitting".to_string(),
        FormOutcome::Redirect { to, notice } => format!(
            "{} then redirect to {}",
            notice.as_deref().unwrap_or("ok"),
            to.path()
        ),
        FormOutcome::Completed { notice } => notice.clone().unwrap_or_else(|| "done".to_string()),
        FormOutcome::Failed(message) => format!("failed: {message}"),
    }
}

async fn render_page(
    page: DemoPage,
    backend: &InMemoryPortalApi,
    student: &InMemoryPortalApi,
    admin: &InMemoryPortalApi,
) -> String {
    let anonymous = Session::default();
    match page {
        DemoPage::Home => {
            let mut view = HomePage::new(&anonymous);
            view.load(&backend.scoped(anonymous.clone())).await;
            render_document(Page::Home, &anonymous, &view.render())
        }
        DemoPage::Catalog => {
            let session = student.session().snapshot();
            let mut view = CatalogPage::new(&session);
            view.load(student).await;
            render_document(Page::Internships, &session, &view.render())
        }
        DemoPage::StudentDashboard => {
            let mut view = StudentDashboard::new();
            view.load(student).await;
            render_document(Page::StudentDashboard, &student.session().snapshot(), &view.render())
        }
        DemoPage::AdminDashboard => {
            let mut view = AdminDashboard::new();
            view.load(admin).await;
            render_document(Page::AdminDashboard, &admin.session().snapshot(), &view.render())
        }
        DemoPage::AdminInternships => {
            let mut view = AdminInternshipsPage::new();
            view.load(admin).await;
            render_document(Page::AdminInternships, &admin.session().snapshot(), &view.render())
        }
        DemoPage::AdminApplications => {
            let mut view = ApplicationsPage::new();
            view.load(admin).await;
            render_document(Page::AdminApplications, &admin.session().snapshot(), &view.render())
        }
    }
}
