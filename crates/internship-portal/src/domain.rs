use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned internship identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternshipId(pub i64);

/// Server-assigned application identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub i64);

macro_rules! numeric_id {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                raw.trim().parse::<i64>().map($name)
            }
        }
    };
}

numeric_id!(InternshipId);
numeric_id!(ApplicationId);

/// Internship listing as published by the backend. Read-only on this side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Internship {
    pub id: InternshipId,
    pub title: String,
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slots: u32,
    #[serde(default)]
    pub date_posted: Option<String>,
}

/// Optional listing columns may arrive as explicit `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A student's application as returned by the admin and student feeds.
///
/// The admin feed joins student details, the student feed does not, so those fields are
/// optional. Both feeds join the internship title and company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub internship_id: InternshipId,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub student_email: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub cv_file: Option<String>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub applied_at: Option<String>,
    #[serde(default, alias = "internship_title")]
    pub title: Option<String>,
    #[serde(default, alias = "company_name")]
    pub company: Option<String>,
}

/// Review state of an application.
///
/// Any status string the backend sends beyond the three known ones decodes as `Unknown`,
/// which is shown but never actionable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Unknown => "Unknown",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Apply a review decision. Only pending applications may move.
    pub fn apply(self, decision: Decision) -> Result<Self, TransitionError> {
        if !self.is_pending() {
            return Err(TransitionError::Terminal(self));
        }
        Ok(decision.outcome())
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == raw.trim())
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("application is already {0}")]
    Terminal(ApplicationStatus),
}

/// Admin review decision on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    pub const fn outcome(self) -> ApplicationStatus {
        match self {
            Self::Approve => ApplicationStatus::Approved,
            Self::Reject => ApplicationStatus::Rejected,
        }
    }
}

impl FromStr for Decision {
    type Err = UnknownDecision;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(UnknownDecision(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown decision '{0}'")]
pub struct UnknownDecision(pub String);

/// Coarse capability tag issued by the backend at login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Student,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Student => "student",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "admin" => Self::Admin,
            "student" => Self::Student,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the logged-in viewer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl CurrentUser {
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(fallback)
    }
}

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalStats {
    pub total_internships: u64,
    pub total_applications: u64,
    pub pending_applications: u64,
    pub approved_applications: u64,
    pub rejected_applications: u64,
    pub total_students: u64,
}

/// Body of an internship-creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInternship {
    pub title: String,
    pub company: String,
    pub description: String,
    pub duration: String,
    pub slots: u32,
}

/// Body of a student self-registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub course: String,
    pub year: u16,
}

/// Uploaded CV carried in the multipart `cv` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Multipart application submission: `internship_id`, `cover_letter`, `cv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationUpload {
    pub internship_id: InternshipId,
    pub cover_letter: String,
    pub cv: CvAttachment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_moves_to_decision_outcome() {
        assert_eq!(
            ApplicationStatus::Pending.apply(Decision::Approve),
            Ok(ApplicationStatus::Approved)
        );
        assert_eq!(
            ApplicationStatus::Pending.apply(Decision::Reject),
            Ok(ApplicationStatus::Rejected)
        );
    }

    #[test]
    fn terminal_statuses_refuse_transitions() {
        for status in [ApplicationStatus::Approved, ApplicationStatus::Rejected] {
            for decision in [Decision::Approve, Decision::Reject] {
                assert_eq!(
                    status.apply(decision),
                    Err(TransitionError::Terminal(status))
                );
            }
        }
    }

    #[test]
    fn student_feed_aliases_deserialize_into_title_and_company() {
        let raw = r#"{
            "id": 7,
            "internship_id": 3,
            "status": "Pending",
            "internship_title": "Data Intern",
            "company_name": "Acme",
            "student_id": 12
        }"#;
        let application: Application = serde_json::from_str(raw).expect("valid payload");
        assert_eq!(application.title.as_deref(), Some("Data Intern"));
        assert_eq!(application.company.as_deref(), Some("Acme"));
        assert!(application.cover_letter.is_none());
    }

    #[test]
    fn null_listing_columns_fall_back_to_defaults() {
        let raw = r#"[
            {"id": 1, "title": "Ops", "company": "Acme",
             "description": null, "duration": null, "slots": null},
            {"id": 2, "title": "Data", "company": "Initech",
             "description": "SQL", "duration": "3 months", "slots": 2}
        ]"#;
        let listings: Vec<Internship> = serde_json::from_str(raw).expect("null columns tolerated");
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].description, "");
        assert_eq!(listings[0].slots, 0);
        assert_eq!(listings[1].duration, "3 months");
    }

    #[test]
    fn unrecognised_status_decodes_as_unknown_and_refuses_decisions() {
        let raw = r#"{"id": 9, "internship_id": 1, "status": "Withdrawn"}"#;
        let application: Application = serde_json::from_str(raw).expect("lenient status");
        assert_eq!(application.status, ApplicationStatus::Unknown);
        assert_eq!(
            application.status.apply(Decision::Approve),
            Err(TransitionError::Terminal(ApplicationStatus::Unknown))
        );
    }

    #[test]
    fn unknown_roles_are_preserved() {
        let role: Role = serde_json::from_str("\"mentor\"").expect("string role");
        assert_eq!(role, Role::Other("mentor".to_string()));
        assert_eq!(serde_json::to_string(&Role::Student).unwrap(), "\"student\"");
    }

    #[test]
    fn stats_default_missing_counters_to_zero() {
        let stats: PortalStats =
            serde_json::from_str(r#"{"pending_applications": 4}"#).expect("partial stats");
        assert_eq!(stats.pending_applications, 4);
        assert_eq!(stats.total_internships, 0);
    }

    #[test]
    fn current_user_falls_back_when_name_missing() {
        let user = CurrentUser::default();
        assert_eq!(user.display_name("Admin"), "Admin");
    }
}
