use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::{
    Acknowledgement, ApiError, ApiResponse, ApiResult, LoginResponse, PortalApi, ScopedApi,
};
use crate::domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationUpload, CurrentUser, Decision,
    Internship, InternshipId, NewInternship, PortalStats, Role, StudentRegistration,
};
use crate::session::{Session, SessionStore};

/// Backend operations, used to count calls and script failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    GetInternships,
    CreateInternship,
    GetAllApplications,
    GetApplicationStatus,
    ApproveApplication,
    RejectApplication,
    ApplyForInternship,
    RegisterStudent,
    Login,
    GetCurrentUser,
    GetStats,
}

/// How a scripted verb fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedFailure {
    /// Answer `{ ok: false, error }`.
    Rejected(Option<String>),
    /// Behave as if the backend never answered.
    Unreachable,
}

#[derive(Debug, Clone)]
struct Account {
    id: i64,
    name: String,
    email: String,
    password: String,
    role: Role,
}

#[derive(Debug, Default)]
struct Backend {
    internships: Vec<Internship>,
    applications: Vec<Application>,
    accounts: Vec<Account>,
    calls: BTreeMap<Verb, usize>,
    failures: BTreeMap<Verb, SimulatedFailure>,
}

impl Backend {
    fn next_internship_id(&self) -> InternshipId {
        InternshipId(self.internships.iter().map(|i| i.id.0).max().unwrap_or(0) + 1)
    }

    fn next_application_id(&self) -> ApplicationId {
        ApplicationId(self.applications.iter().map(|a| a.id.0).max().unwrap_or(0) + 1)
    }

    fn account_for_token(&self, token: Option<&str>) -> Option<&Account> {
        let token = token?;
        self.accounts
            .iter()
            .find(|account| token_for(account) == token)
    }
}

fn token_for(account: &Account) -> String {
    format!("memory-token-{}-{}", account.role, account.id)
}

/// In-process stand-in for the portal backend.
///
/// State is shared between clones and scoped copies, so a demo or a router test can log in
/// through one handle and read through another.
#[derive(Debug, Default)]
pub struct InMemoryPortalApi {
    backend: Arc<Mutex<Backend>>,
    session: SessionStore,
}

impl InMemoryPortalApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_internships(self, internships: Vec<Internship>) -> Self {
        self.lock().internships = internships;
        self
    }

    pub fn with_applications(self, applications: Vec<Application>) -> Self {
        self.lock().applications = applications;
        self
    }

    /// Register an account that can log in. Look up its token with [`Self::token_of`].
    pub fn with_account(self, name: &str, email: &str, password: &str, role: Role) -> Self {
        {
            let mut backend = self.lock();
            let id = backend.accounts.len() as i64 + 1;
            backend.accounts.push(Account {
                id,
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                role,
            });
        }
        self
    }

    /// Token the backend issues to `email`, for seeding a logged-in session.
    pub fn token_of(&self, email: &str) -> Option<String> {
        self.lock()
            .accounts
            .iter()
            .find(|account| account.email == email)
            .map(token_for)
    }

    /// Make every later call to `verb` fail the given way.
    pub fn fail(&self, verb: Verb, failure: SimulatedFailure) {
        self.lock().failures.insert(verb, failure);
    }

    pub fn recover(&self, verb: Verb) {
        self.lock().failures.remove(&verb);
    }

    pub fn calls(&self, verb: Verb) -> usize {
        self.lock().calls.get(&verb).copied().unwrap_or(0)
    }

    pub fn applications(&self) -> Vec<Application> {
        self.lock().applications.clone()
    }

    pub fn internships(&self) -> Vec<Internship> {
        self.lock().internships.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call and apply any scripted failure before the verb runs.
    fn enter<T>(&self, verb: Verb) -> Result<Option<ApiResponse<T>>, ApiError> {
        let mut backend = self.lock();
        *backend.calls.entry(verb).or_default() += 1;
        match backend.failures.get(&verb) {
            None => Ok(None),
            Some(SimulatedFailure::Rejected(Some(message))) => {
                Ok(Some(ApiResponse::failure(message.clone())))
            }
            Some(SimulatedFailure::Rejected(None)) => Ok(Some(ApiResponse::rejected())),
            Some(SimulatedFailure::Unreachable) => {
                Err(ApiError::Unavailable(format!("{verb:?} not answered")))
            }
        }
    }

    fn viewer(&self) -> Option<Account> {
        let token = self.session.snapshot().token().map(str::to_string);
        self.lock().account_for_token(token.as_deref()).cloned()
    }

    fn require(&self, role: Role) -> Result<Account, ApiResponse<()>> {
        match self.viewer() {
            Some(account) if account.role == role => Ok(account),
            Some(_) if role == Role::Admin => Err(ApiResponse::failure("Admin access required")),
            Some(_) => Err(ApiResponse::failure("Student access required")),
            None => Err(ApiResponse::failure("Missing Authorization Header")),
        }
    }

    fn set_status(&self, id: ApplicationId, decision: Decision) -> ApiResponse<Acknowledgement> {
        if let Err(denied) = self.require(Role::Admin) {
            return relabel(denied);
        }
        let mut backend = self.lock();
        match backend.applications.iter_mut().find(|app| app.id == id) {
            Some(application) => {
                application.status = decision.outcome();
                ApiResponse::success(Acknowledgement {
                    message: Some(format!(
                        "Application {} successfully",
                        decision.outcome().label().to_lowercase()
                    )),
                })
            }
            None => ApiResponse::failure("Application not found"),
        }
    }
}

fn relabel<T>(response: ApiResponse<()>) -> ApiResponse<T> {
    ApiResponse {
        ok: response.ok,
        data: None,
        error: response.error,
    }
}

impl Clone for InMemoryPortalApi {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            session: self.session.clone(),
        }
    }
}

#[async_trait]
impl PortalApi for InMemoryPortalApi {
    fn session(&self) -> &SessionStore {
        &self.session
    }

    async fn get_internships(&self) -> ApiResult<Vec<Internship>> {
        if let Some(failure) = self.enter(Verb::GetInternships)? {
            return Ok(failure);
        }
        let mut internships = self.lock().internships.clone();
        internships.sort_by(|a, b| b.date_posted.cmp(&a.date_posted));
        Ok(ApiResponse::success(internships))
    }

    async fn create_internship(&self, payload: &NewInternship) -> ApiResult<Acknowledgement> {
        if let Some(failure) = self.enter(Verb::CreateInternship)? {
            return Ok(failure);
        }
        if let Err(denied) = self.require(Role::Admin) {
            return Ok(relabel(denied));
        }
        let mut backend = self.lock();
        let id = backend.next_internship_id();
        backend.internships.push(Internship {
            id,
            title: payload.title.clone(),
            company: payload.company.clone(),
            description: payload.description.clone(),
            duration: payload.duration.clone(),
            slots: payload.slots,
            date_posted: Some(Utc::now().to_rfc3339()),
        });
        Ok(ApiResponse::success(Acknowledgement {
            message: Some("Internship created successfully".to_string()),
        }))
    }

    async fn get_all_applications(&self) -> ApiResult<Vec<Application>> {
        if let Some(failure) = self.enter(Verb::GetAllApplications)? {
            return Ok(failure);
        }
        if let Err(denied) = self.require(Role::Admin) {
            return Ok(relabel(denied));
        }
        Ok(ApiResponse::success(self.lock().applications.clone()))
    }

    async fn get_application_status(&self) -> ApiResult<Vec<Application>> {
        if let Some(failure) = self.enter(Verb::GetApplicationStatus)? {
            return Ok(failure);
        }
        let student = match self.require(Role::Student) {
            Ok(account) => account,
            Err(denied) => return Ok(relabel(denied)),
        };
        let own = self
            .lock()
            .applications
            .iter()
            .filter(|app| app.student_email.as_deref() == Some(student.email.as_str()))
            .cloned()
            .collect();
        Ok(ApiResponse::success(own))
    }

    async fn approve_application(&self, id: ApplicationId) -> ApiResult<Acknowledgement> {
        if let Some(failure) = self.enter(Verb::ApproveApplication)? {
            return Ok(failure);
        }
        Ok(self.set_status(id, Decision::Approve))
    }

    async fn reject_application(&self, id: ApplicationId) -> ApiResult<Acknowledgement> {
        if let Some(failure) = self.enter(Verb::RejectApplication)? {
            return Ok(failure);
        }
        Ok(self.set_status(id, Decision::Reject))
    }

    async fn apply_for_internship(
        &self,
        upload: ApplicationUpload,
    ) -> ApiResult<Acknowledgement> {
        if let Some(failure) = self.enter(Verb::ApplyForInternship)? {
            return Ok(failure);
        }
        let student = match self.require(Role::Student) {
            Ok(account) => account,
            Err(denied) => return Ok(relabel(denied)),
        };

        let mut backend = self.lock();
        let internship = match backend
            .internships
            .iter()
            .find(|internship| internship.id == upload.internship_id)
        {
            Some(internship) => internship.clone(),
            None => return Ok(ApiResponse::failure("Internship not found")),
        };
        let duplicate = backend.applications.iter().any(|app| {
            app.internship_id == upload.internship_id
                && app.student_email.as_deref() == Some(student.email.as_str())
        });
        if duplicate {
            return Ok(ApiResponse::failure("Already applied"));
        }

        let id = backend.next_application_id();
        let cv_file = format!(
            "{}_{}_{}",
            student.id, upload.internship_id, upload.cv.file_name
        );
        backend.applications.push(Application {
            id,
            internship_id: upload.internship_id,
            student_name: Some(student.name.clone()),
            student_email: Some(student.email.clone()),
            course: None,
            year: None,
            cover_letter: Some(upload.cover_letter).filter(|text| !text.is_empty()),
            cv_file: Some(cv_file),
            status: ApplicationStatus::Pending,
            applied_at: Some(Utc::now().to_rfc3339()),
            title: Some(internship.title),
            company: Some(internship.company),
        });
        Ok(ApiResponse::success(Acknowledgement {
            message: Some("Application submitted successfully".to_string()),
        }))
    }

    async fn register_student(
        &self,
        payload: &StudentRegistration,
    ) -> ApiResult<Acknowledgement> {
        if let Some(failure) = self.enter(Verb::RegisterStudent)? {
            return Ok(failure);
        }
        let mut backend = self.lock();
        if backend
            .accounts
            .iter()
            .any(|account| account.email == payload.email)
        {
            return Ok(ApiResponse::failure("Email already exists"));
        }
        let id = backend.accounts.len() as i64 + 1;
        backend.accounts.push(Account {
            id,
            name: payload.name.clone(),
            email: payload.email.clone(),
            password: payload.password.clone(),
            role: Role::Student,
        });
        Ok(ApiResponse::success(Acknowledgement {
            message: Some("Student registered successfully".to_string()),
        }))
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        if let Some(failure) = self.enter::<()>(Verb::Login)? {
            return Ok(LoginResponse {
                ok: false,
                error: failure.error,
                ..LoginResponse::default()
            });
        }
        let backend = self.lock();
        let account = backend
            .accounts
            .iter()
            .find(|account| account.email == email && account.password == password);
        Ok(match account {
            Some(account) => LoginResponse {
                ok: true,
                access_token: Some(token_for(account)),
                role: Some(account.role.clone()),
                error: None,
            },
            None => LoginResponse {
                ok: false,
                error: Some("Invalid credentials".to_string()),
                ..LoginResponse::default()
            },
        })
    }

    async fn get_current_user(&self) -> ApiResult<CurrentUser> {
        if let Some(failure) = self.enter(Verb::GetCurrentUser)? {
            return Ok(failure);
        }
        Ok(match self.viewer() {
            Some(account) => ApiResponse::success(CurrentUser {
                id: Some(account.id),
                name: Some(account.name),
                email: Some(account.email),
                role: Some(account.role),
            }),
            None => ApiResponse::failure("Missing Authorization Header"),
        })
    }

    async fn get_stats(&self) -> ApiResult<PortalStats> {
        if let Some(failure) = self.enter(Verb::GetStats)? {
            return Ok(failure);
        }
        if let Err(denied) = self.require(Role::Admin) {
            return Ok(relabel(denied));
        }
        let backend = self.lock();
        let count = |status: ApplicationStatus| {
            backend
                .applications
                .iter()
                .filter(|app| app.status == status)
                .count() as u64
        };
        Ok(ApiResponse::success(PortalStats {
            total_internships: backend.internships.len() as u64,
            total_applications: backend.applications.len() as u64,
            pending_applications: count(ApplicationStatus::Pending),
            approved_applications: count(ApplicationStatus::Approved),
            rejected_applications: count(ApplicationStatus::Rejected),
            total_students: backend
                .accounts
                .iter()
                .filter(|account| account.role == Role::Student)
                .count() as u64,
        }))
    }
}

impl ScopedApi for InMemoryPortalApi {
    fn scoped(&self, session: Session) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            session: SessionStore::new(session),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_api() -> InMemoryPortalApi {
        let api =
            InMemoryPortalApi::new().with_account("Ada", "ada@portal.test", "pw", Role::Admin);
        let token = api.token_of("ada@portal.test").expect("seeded");
        api.scoped(Session::new(token, Role::Admin))
    }

    #[tokio::test]
    async fn counts_calls_per_verb() {
        let api = admin_api();
        api.get_all_applications().await.expect("answered");
        api.get_all_applications().await.expect("answered");
        assert_eq!(api.calls(Verb::GetAllApplications), 2);
        assert_eq!(api.calls(Verb::GetInternships), 0);
    }

    #[tokio::test]
    async fn scripted_failures_apply_until_recovered() {
        let api = admin_api();
        api.fail(Verb::GetStats, SimulatedFailure::Unreachable);
        assert!(matches!(api.get_stats().await, Err(ApiError::Unavailable(_))));

        api.recover(Verb::GetStats);
        assert!(api.get_stats().await.expect("answered").ok);
    }

    #[tokio::test]
    async fn students_cannot_read_admin_feed() {
        let api =
            InMemoryPortalApi::new().with_account("Sam", "sam@portal.test", "pw", Role::Student);
        let token = api.token_of("sam@portal.test").expect("seeded");
        let student = api.scoped(Session::new(token, Role::Student));
        let response = student.get_all_applications().await.expect("answered");
        assert_eq!(response.error.as_deref(), Some("Admin access required"));
    }

    #[tokio::test]
    async fn login_issues_token_for_known_account() {
        let api =
            InMemoryPortalApi::new().with_account("Sam", "sam@portal.test", "pw", Role::Student);
        let ok = api.login("sam@portal.test", "pw").await.expect("answered");
        assert!(ok.ok);
        assert_eq!(ok.role, Some(Role::Student));

        let bad = api.login("sam@portal.test", "nope").await.expect("answered");
        assert_eq!(bad.error.as_deref(), Some("Invalid credentials"));
    }
}
