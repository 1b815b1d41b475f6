//! Form-submission controllers.
//!
//! Every form follows the same flow: check required fields before touching the network, mark
//! the submit control as working, send, then either move on (redirect or close the modal) or
//! write the failure into the inline error region. The submit control is restored on both
//! paths.

pub mod application;
pub mod internship;
pub mod login;
pub mod register;

use std::fmt;

use crate::navigation::Page;

pub use application::{ApplicationFields, ApplicationForm};
pub use internship::{InternshipFields, InternshipForm};
pub use login::{LoginFields, LoginForm};
pub use register::{RegisterFields, RegisterForm};

/// Shown when the backend cannot be reached from the login or register forms.
pub const SERVER_UNREACHABLE: &str = "Connection error. Please make sure the server is running.";
/// Shown when the backend cannot be reached from the in-page modals.
pub const CONNECTION_ERROR: &str = "Connection error. Please try again.";

/// A required field that is missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Field problems found before submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|error| error.field)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Record a blank required field.
    pub fn require(&mut self, field: &'static str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.push(field, "Please fill out this field.");
            false
        } else {
            true
        }
    }

    /// Record a required e-mail field that is blank or obviously malformed.
    pub fn require_email(&mut self, field: &'static str, value: &str) {
        if !self.require(field, value) {
            return;
        }
        let valid = value
            .trim()
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && !domain.is_empty())
            .unwrap_or(false);
        if !valid {
            self.push(field, "Please enter an email address.");
        }
    }

    /// Parse a required whole-number field.
    pub fn require_number<N: std::str::FromStr>(
        &mut self,
        field: &'static str,
        value: &str,
    ) -> Option<N> {
        if !self.require(field, value) {
            return None;
        }
        match value.trim().parse::<N>() {
            Ok(number) => Some(number),
            Err(_) => {
                self.push(field, "Please enter a number.");
                None
            }
        }
    }

    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// The submit button: disabled with a working label while a request is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    idle: &'static str,
    working: &'static str,
    busy: bool,
}

impl SubmitControl {
    pub const fn new(idle: &'static str, working: &'static str) -> Self {
        Self {
            idle,
            working,
            busy: false,
        }
    }

    /// Enter the working state. Returns `false` if a submission is already in flight.
    pub fn begin(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    pub fn finish(&mut self) {
        self.busy = false;
    }

    pub fn is_disabled(&self) -> bool {
        self.busy
    }

    pub fn label(&self) -> &'static str {
        if self.busy {
            self.working
        } else {
            self.idle
        }
    }

    pub fn render(&self, id: &str) -> String {
        format!(
            r#"<button type="submit" id="{id}" class="btn btn-primary w-100"{}>{}</button>"#,
            if self.busy { " disabled" } else { "" },
            self.label()
        )
    }
}

/// Inline region holding the last submission failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorRegion {
    message: Option<String>,
}

impl ErrorRegion {
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn hide(&mut self) {
        self.message = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Result of pressing a form's submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Required fields missing; nothing was sent.
    Invalid(ValidationErrors),
    /// Another submission from this form is still in flight; nothing was sent.
    Busy,
    /// Move to another page, optionally announcing something first.
    Redirect { to: Page, notice: Option<String> },
    /// Modal closed and form cleared.
    Completed { notice: Option<String> },
    /// Shown in the inline error region; the form keeps its values.
    Failed(String),
}

impl FormOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Redirect { .. } | Self::Completed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_whitespace_fields_are_required() {
        let mut errors = ValidationErrors::new();
        assert!(!errors.require("title", "   "));
        assert!(errors.require("company", "Acme"));
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["title"]);
    }

    #[test]
    fn email_needs_both_sides_of_at() {
        let mut errors = ValidationErrors::new();
        errors.require_email("email", "student@");
        errors.require_email("email", "student@uni.edu");
        assert_eq!(errors.errors().len(), 1);
    }

    #[test]
    fn numbers_must_parse() {
        let mut errors = ValidationErrors::new();
        assert_eq!(errors.require_number::<u32>("slots", "4"), Some(4));
        assert_eq!(errors.require_number::<u32>("slots", "four"), None);
        assert_eq!(errors.to_string(), "slots: Please enter a number.");
    }

    #[test]
    fn submit_control_refuses_second_begin() {
        let mut control = SubmitControl::new("Create Internship", "Creating...");
        assert!(control.begin());
        assert_eq!(control.label(), "Creating...");
        assert!(control.render("submit").contains(" disabled"));
        assert!(!control.begin());
        control.finish();
        assert_eq!(control.label(), "Create Internship");
        assert!(!control.is_disabled());
    }
}
