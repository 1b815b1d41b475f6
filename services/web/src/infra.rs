use internship_portal::api::InMemoryPortalApi;
use internship_portal::domain::{
    Application, ApplicationId, ApplicationStatus, Internship, InternshipId, Role,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) const SAMPLE_ADMIN: (&str, &str) = ("admin@portal.test", "admin-pass");
pub(crate) const SAMPLE_STUDENT: (&str, &str) = ("student@portal.test", "student-pass");

pub(crate) fn sample_internships() -> Vec<Internship> {
    let listing = |id: i64, title: &str, company: &str, description: &str, slots: u32| Internship {
        id: InternshipId(id),
        title: title.to_string(),
        company: company.to_string(),
        description: description.to_string(),
        duration: "3 months".to_string(),
        slots,
        date_posted: Some(format!("2025-01-{:02} 09:00:00", id * 3)),
    };
    vec![
        listing(
            1,
            "Backend Engineering Intern",
            "Northwind",
            "Design and ship HTTP services, write integration tests and help run the on-call \
             rotation for the internal developer platform.",
            2,
        ),
        listing(
            2,
            "Data Analyst Intern",
            "Contoso",
            "Build dashboards and clean up reporting pipelines for the finance team.",
            1,
        ),
        listing(
            3,
            "Product Design Intern",
            "Fabrikam",
            "Prototype onboarding flows and run usability sessions with real customers.",
            1,
        ),
        listing(
            4,
            "Security Intern",
            "Northwind",
            "Threat-model new features and triage dependency advisories.",
            1,
        ),
    ]
}

pub(crate) fn sample_applications() -> Vec<Application> {
    let listings = sample_internships();
    let application = |id: i64,
                       internship: i64,
                       name: &str,
                       email: &str,
                       status: ApplicationStatus| {
        let listing = listings
            .iter()
            .find(|listing| listing.id == InternshipId(internship));
        Application {
            id: ApplicationId(id),
            internship_id: InternshipId(internship),
            student_name: Some(name.to_string()),
            student_email: Some(email.to_string()),
            course: Some("Computer Science".to_string()),
            year: Some(3),
            cover_letter: (id % 2 == 1)
                .then(|| "I have shipped two side projects in Rust.".to_string()),
            cv_file: Some(format!("{id}_{internship}_cv.pdf")),
            status,
            applied_at: Some("2025-02-14 12:30:00".to_string()),
            title: listing.map(|listing| listing.title.clone()),
            company: listing.map(|listing| listing.company.clone()),
        }
    };
    vec![
        application(1, 1, "Jordan Lee", SAMPLE_STUDENT.0, ApplicationStatus::Pending),
        application(2, 2, "Riley Chen", "riley.chen@uni.test", ApplicationStatus::Approved),
        application(3, 1, "Casey Park", "casey.park@uni.test", ApplicationStatus::Rejected),
    ]
}

/// In-memory backend seeded with listings, applications and one account per role.
pub(crate) fn sample_backend() -> InMemoryPortalApi {
    let (admin_email, admin_password) = SAMPLE_ADMIN;
    let (student_email, student_password) = SAMPLE_STUDENT;
    InMemoryPortalApi::new()
        .with_internships(sample_internships())
        .with_applications(sample_applications())
        .with_account("Morgan Admin", admin_email, admin_password, Role::Admin)
        .with_account("Jordan Lee", student_email, student_password, Role::Student)
}
