use internship_portal::api::{InMemoryPortalApi, PortalApi, ScopedApi, Verb};
use internship_portal::domain::{
    ApplicationId, ApplicationStatus, CvAttachment, Decision, Internship, InternshipId, Role,
};
use internship_portal::forms::{
    FormOutcome, InternshipFields, LoginFields, LoginForm, RegisterFields, RegisterForm,
};
use internship_portal::navigation::Page;
use internship_portal::session::{require_admin, Session};
use internship_portal::view::admin_internships::AdminInternshipsPage;
use internship_portal::view::applications::{ApplicationsPage, MutationOutcome, StatusFilter};
use internship_portal::view::catalog::CatalogPage;
use internship_portal::view::student_dashboard::StudentDashboard;
use internship_portal::view::{DelegatedClick, LoadOutcome};

fn backend() -> InMemoryPortalApi {
    InMemoryPortalApi::new()
        .with_internships(vec![Internship {
            id: InternshipId(1),
            title: "Platform Intern".to_string(),
            company: "Acme".to_string(),
            description: "Keep the build green".to_string(),
            duration: "3 months".to_string(),
            slots: 2,
            date_posted: Some("2025-01-10 09:00:00".to_string()),
        }])
        .with_account("Ada Admin", "ada@portal.test", "admin-pw", Role::Admin)
}

async fn login(backend: &InMemoryPortalApi, email: &str, password: &str) -> InMemoryPortalApi {
    let api = backend.scoped(Session::default());
    let mut form = LoginForm::with_fields(LoginFields {
        email: email.to_string(),
        password: password.to_string(),
    });
    let outcome = form.submit(&api).await;
    assert!(outcome.is_success(), "login failed: {outcome:?}");
    api
}

#[tokio::test]
async fn student_applies_and_admin_approves() {
    let backend = backend();

    let anonymous = backend.scoped(Session::default());
    let mut register = RegisterForm::with_fields(RegisterFields {
        name: "Sam Student".to_string(),
        email: "sam@portal.test".to_string(),
        password: "student-pw".to_string(),
        course: "Computer Science".to_string(),
        year: "3".to_string(),
    });
    assert!(matches!(
        register.submit(&anonymous).await,
        FormOutcome::Redirect { to: Page::Login, .. }
    ));

    let student = login(&backend, "sam@portal.test", "student-pw").await;
    let mut catalog = CatalogPage::new(&student.session().snapshot());
    assert_eq!(catalog.load(&student).await, LoadOutcome::Loaded(1));
    assert_eq!(catalog.dispatch(&DelegatedClick::new("apply", "1")), Ok(true));
    catalog.form_mut().fields.cover_letter = "I like green builds.".to_string();
    catalog.form_mut().fields.cv = Some(CvAttachment {
        file_name: "sam.pdf".to_string(),
        bytes: b"%PDF-1.4".to_vec(),
    });
    let applied = catalog.form_mut().submit(&student).await;
    assert!(matches!(
        applied,
        FormOutcome::Redirect { to: Page::StudentDashboard, .. }
    ));

    let mut dashboard = StudentDashboard::new();
    dashboard.load(&student).await;
    assert_eq!(dashboard.greeting_name(), "Sam Student");
    assert!(dashboard.html().contains("Pending"));

    let admin = login(&backend, "ada@portal.test", "admin-pw").await;
    assert!(require_admin(&admin.session().snapshot()).is_ok());
    let mut review = ApplicationsPage::new();
    review.load(&admin).await;
    review.set_filter(StatusFilter::Only(ApplicationStatus::Pending));
    let id = review.applications()[0].id;
    let outcome = review
        .dispatch(&admin, &DelegatedClick::new("approve", id.to_string()), |_| true)
        .await;
    assert_eq!(outcome, Ok(MutationOutcome::Applied(ApplicationStatus::Approved)));
    assert_eq!(admin.calls(Verb::GetAllApplications), 1);

    let mut dashboard = StudentDashboard::new();
    dashboard.load(&student).await;
    assert_eq!(dashboard.applications()[0].status, ApplicationStatus::Approved);
}

#[tokio::test]
async fn admin_creates_internship_and_sees_it_listed() {
    let backend = backend();
    let admin = login(&backend, "ada@portal.test", "admin-pw").await;

    let mut page = AdminInternshipsPage::new();
    page.load(&admin).await;
    page.form_mut().fields = InternshipFields {
        title: "Security Intern".to_string(),
        company: "Acme".to_string(),
        description: "Threat modelling".to_string(),
        duration: "6 months".to_string(),
        slots: "1".to_string(),
    };
    assert!(page.submit_form(&admin).await.is_success());
    assert!(page.html().contains("Security Intern"));

    let anonymous = backend.scoped(Session::default());
    let mut catalog = CatalogPage::new(&Session::default());
    catalog.load(&anonymous).await;
    assert_eq!(catalog.internships().len(), 2);
}

#[tokio::test]
async fn decided_application_cannot_be_decided_again() {
    let backend = backend();
    let admin = login(&backend, "ada@portal.test", "admin-pw").await;
    let student = backend
        .clone()
        .with_account("Lee", "lee@portal.test", "pw", Role::Student);
    let student = login(&student, "lee@portal.test", "pw").await;
    let mut catalog = CatalogPage::new(&student.session().snapshot());
    catalog.load(&student).await;
    catalog.dispatch(&DelegatedClick::new("apply", "1")).expect("known action");
    catalog.form_mut().fields.cv = Some(CvAttachment {
        file_name: "lee.pdf".to_string(),
        bytes: vec![1, 2, 3],
    });
    catalog.form_mut().submit(&student).await;

    let mut review = ApplicationsPage::new();
    review.load(&admin).await;
    let id: ApplicationId = review.applications()[0].id;
    assert!(matches!(
        review.mutate(&admin, id, Decision::Reject).await,
        MutationOutcome::Applied(ApplicationStatus::Rejected)
    ));
    assert!(matches!(
        review.mutate(&admin, id, Decision::Approve).await,
        MutationOutcome::Refused(_)
    ));
    assert_eq!(admin.calls(Verb::ApproveApplication), 0);
}
