//! Request validation.
//!
//! Every request body implements [`Validate`], turning the raw payload into a
//! typed, normalized value. Checks never short-circuit: each failing rule adds
//! one [`FieldError`] and the whole list is reported together.

mod auth;
mod notifications;
mod projects;
mod users;

pub use projects::project_filter;
pub use users::role_filter;

use std::str::FromStr;

use axum::extract::{FromRequest, Request};
use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::api::AppJson;
use crate::errors::AppError;

/// One violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A request body that can be checked and normalized.
pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, Vec<FieldError>>;
}

/// JSON body that passed validation; handlers receive the normalized output.
pub struct Validated<T: Validate>(pub T::Output);

impl<S, T> FromRequest<S> for Validated<T>
where
    S: Send + Sync,
    T: Validate + DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AppJson(payload) = AppJson::<T>::from_request(req, state).await?;
        payload
            .validate()
            .map(Validated)
            .map_err(AppError::Validation)
    }
}

/// Collects rule violations for one request.
#[derive(Debug, Default)]
pub struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Non-empty after trimming. Returns the trimmed value.
    pub fn present(&mut self, field: &str, value: Option<&str>, message: &str) -> Option<String> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => {
                self.fail(field, message);
                None
            }
        }
    }

    /// Character count of the trimmed value within `min..=max`.
    pub fn length(&mut self, field: &str, value: Option<&str>, min: usize, max: usize, message: &str) {
        let count = value.map(|v| v.trim().chars().count()).unwrap_or(0);
        if count < min || count > max {
            self.fail(field, message);
        }
    }

    /// Optional text: trimmed and bounded when present.
    pub fn optional_text(
        &mut self,
        field: &str,
        value: Option<&str>,
        max: usize,
        message: &str,
    ) -> Option<String> {
        let trimmed = value?.trim();
        if trimmed.chars().count() > max {
            self.fail(field, message);
        }
        Some(trimmed.to_string())
    }

    /// Exact, case-sensitive membership in a closed set.
    pub fn one_of<T: FromStr>(&mut self, field: &str, value: Option<&str>, message: &str) -> Option<T> {
        match value.and_then(|v| v.parse().ok()) {
            Some(parsed) => Some(parsed),
            None => {
                self.fail(field, message);
                None
            }
        }
    }

    /// Like [`Checker::one_of`] but absence is fine.
    pub fn optional_one_of<T: FromStr>(
        &mut self,
        field: &str,
        value: Option<&str>,
        message: &str,
    ) -> Option<T> {
        value.and_then(|v| self.one_of(field, Some(v), message))
    }

    /// Finite number with `min <= value` and, when given, `value <= max`.
    pub fn range(
        &mut self,
        field: &str,
        value: Option<f64>,
        min: f64,
        max: Option<f64>,
        message: &str,
    ) -> Option<f64> {
        match value {
            Some(v) if v.is_finite() && v >= min && max.map_or(true, |m| v <= m) => Some(v),
            _ => {
                self.fail(field, message);
                None
            }
        }
    }

    /// Whole number within `min..=max`.
    pub fn whole(
        &mut self,
        field: &str,
        value: Option<f64>,
        min: i64,
        max: i64,
        range_message: &str,
        whole_message: &str,
    ) -> Option<i64> {
        let v = self.range(field, value, min as f64, Some(max as f64), range_message)?;
        if v.fract() != 0.0 {
            self.fail(field, whole_message);
            return None;
        }
        Some(v as i64)
    }

    /// Syntactically valid email, returned normalized.
    pub fn email(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim) {
            Some(v) if v.to_string().validate_email() => Some(normalize_email(v)),
            _ => {
                self.fail(field, "Valid email is required");
                None
            }
        }
    }

    /// `YYYY-MM-DD` or an RFC 3339 timestamp, reduced to its date.
    pub fn date(&mut self, field: &str, value: Option<&str>, message: &str) -> Option<NaiveDate> {
        match value.map(str::trim).and_then(parse_date) {
            Some(date) => Some(date),
            None => {
                self.fail(field, message);
                None
            }
        }
    }

    /// Report every violation, or build the output once all rules passed.
    ///
    /// `build` sees the values the individual checks returned; it yields
    /// `None` only if a check failed, which is already recorded.
    pub fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, Vec<FieldError>> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        build().ok_or_else(|| vec![FieldError::new("body", "Request could not be validated")])
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Case-fold an address; Gmail addresses also lose dots and `+tags`.
pub fn normalize_email(email: &str) -> String {
    let lowered = email.trim().to_lowercase();
    match lowered.rsplit_once('@') {
        Some((local, "gmail.com" | "googlemail.com")) => {
            let local = local.split('+').next().unwrap_or(local).replace('.', "");
            format!("{}@gmail.com", local)
        }
        _ => email.trim().to_lowercase(),
    }
}

/// Message for a closed set, e.g. `Role must be one of: client, developer, admin`.
pub fn one_of_message(label: &str, options: &[&str]) -> String {
    format!("{} must be one of: {}", label, options.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_checks_do_not_short_circuit() {
        let mut checker = Checker::new();
        checker.present("name", Some("   "), "Name is required");
        checker.length("name", Some("   "), 2, 50, "Name must be between 2 and 50 characters");
        checker.one_of::<Role>("role", Some("superuser"), "bad role");

        let errors = checker.finish(|| Some(())).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], FieldError::new("name", "Name is required"));
        assert_eq!(errors[2].field, "role");
    }

    #[test]
    fn test_present_trims() {
        let mut checker = Checker::new();
        assert_eq!(
            checker.present("title", Some("  Mobile App  "), "Title is required"),
            Some("Mobile App".to_string())
        );
        assert!(checker.errors.is_empty());
    }

    #[test]
    fn test_length_counts_characters() {
        let mut checker = Checker::new();
        checker.length("name", Some("Zoë"), 2, 3, "too long");
        assert!(checker.errors.is_empty());
        checker.length("name", Some("Zoëy"), 2, 3, "too long");
        assert!(!checker.errors.is_empty());
    }

    #[test]
    fn test_range_bounds() {
        let mut checker = Checker::new();
        assert_eq!(checker.range("budget", Some(0.0), 0.0, None, "m"), Some(0.0));
        assert_eq!(checker.range("budget", Some(-1.0), 0.0, None, "m"), None);
        assert_eq!(checker.range("progress", Some(101.0), 0.0, Some(100.0), "m"), None);
        assert_eq!(checker.range("budget", Some(f64::NAN), 0.0, None, "m"), None);
        assert_eq!(checker.finish(|| Some(())).unwrap_err().len(), 3);
    }

    #[test]
    fn test_whole_rejects_fractions() {
        let mut checker = Checker::new();
        assert_eq!(checker.whole("progress", Some(40.0), 0, 100, "r", "w"), Some(40));
        assert_eq!(checker.whole("progress", Some(40.5), 0, 100, "r", "w"), None);
        let errors = checker.finish(|| Some(())).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("progress", "w")]);
    }

    #[test]
    fn test_email_validation_and_normalization() {
        let mut checker = Checker::new();
        assert_eq!(
            checker.email("email", Some(" Ann@X.com ")),
            Some("ann@x.com".to_string())
        );
        assert_eq!(checker.email("email", Some("not-an-email")), None);
        assert_eq!(checker.email("email", None), None);
        assert_eq!(checker.finish(|| Some(())).unwrap_err().len(), 2);
    }

    #[test]
    fn test_gmail_normalization() {
        assert_eq!(normalize_email("J.Doe+work@GoogleMail.com"), "jdoe@gmail.com");
        assert_eq!(normalize_email("j.doe+work@example.com"), "j.doe+work@example.com");
    }

    #[test]
    fn test_dates() {
        let mut checker = Checker::new();
        assert_eq!(
            checker.date("deadline", Some("2024-08-15"), "m"),
            NaiveDate::from_ymd_opt(2024, 8, 15)
        );
        assert_eq!(
            checker.date("deadline", Some("2024-08-15T10:00:00Z"), "m"),
            NaiveDate::from_ymd_opt(2024, 8, 15)
        );
        assert_eq!(checker.date("deadline", Some("15/08/2024"), "m"), None);
        assert!(!checker.errors.is_empty());
    }

    #[test]
    fn test_one_of_message() {
        assert_eq!(
            one_of_message("Role", &["client", "developer", "admin"]),
            "Role must be one of: client, developer, admin"
        );
    }
}
