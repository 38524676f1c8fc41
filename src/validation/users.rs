//! Rule sets for user bodies.

use super::{Checker, FieldError, Validate};
use crate::errors::AppError;
use crate::models::{CreateUserRequest, NewUser, Role, UpdateUserRequest, UserPatch};

pub(super) const NAME_REQUIRED: &str = "Name is required";
pub(super) const NAME_LENGTH: &str = "Name must be between 2 and 50 characters";
pub(super) const ROLE_INVALID: &str = "Role must be one of: client, developer, admin";
pub(super) const COMPANY_LENGTH: &str = "Company name must not exceed 100 characters";
pub(super) const BIO_LENGTH: &str = "Bio must not exceed 500 characters";
const AVATAR_INVALID: &str = "Avatar must be an http(s) URL";

/// Trimmed skills with blanks removed.
pub(super) fn clean_skills(skills: Option<Vec<String>>) -> Option<Vec<String>> {
    skills.map(|list| {
        list.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

fn avatar(checker: &mut Checker, value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if !(value.starts_with("https://") || value.starts_with("http://")) {
        checker.fail("avatar", AVATAR_INVALID);
    }
    Some(value.to_string())
}

impl Validate for CreateUserRequest {
    type Output = NewUser;

    fn validate(self) -> Result<NewUser, Vec<FieldError>> {
        let mut c = Checker::new();

        let name = c.present("name", self.name.as_deref(), NAME_REQUIRED);
        c.length("name", self.name.as_deref(), 2, 50, NAME_LENGTH);
        let email = c.email("email", self.email.as_deref());
        let role: Option<Role> = c.one_of("role", self.role.as_deref(), ROLE_INVALID);
        let company = c.optional_text("company", self.company.as_deref(), 100, COMPANY_LENGTH);
        let bio = c.optional_text("bio", self.bio.as_deref(), 500, BIO_LENGTH);
        let avatar = avatar(&mut c, self.avatar.as_deref());

        c.finish(|| {
            Some(NewUser {
                name: name?,
                email: email?,
                role: role?,
                company,
                skills: clean_skills(self.skills),
                bio,
                avatar,
                password_hash: None,
            })
        })
    }
}

impl Validate for UpdateUserRequest {
    type Output = UserPatch;

    fn validate(self) -> Result<UserPatch, Vec<FieldError>> {
        let mut c = Checker::new();

        if self.name.is_some() {
            c.length("name", self.name.as_deref(), 2, 50, NAME_LENGTH);
        }
        let email = match self.email.as_deref() {
            Some(email) => c.email("email", Some(email)),
            None => None,
        };
        let role = c.optional_one_of("role", self.role.as_deref(), ROLE_INVALID);
        let company = c.optional_text("company", self.company.as_deref(), 100, COMPANY_LENGTH);
        let bio = c.optional_text("bio", self.bio.as_deref(), 500, BIO_LENGTH);
        let avatar = avatar(&mut c, self.avatar.as_deref());

        c.finish(|| {
            Some(UserPatch {
                name: self.name.map(|n| n.trim().to_string()),
                email,
                role,
                company,
                skills: clean_skills(self.skills),
                bio,
                avatar,
            })
        })
    }
}

/// Parse an optional `role` filter from a query or path.
pub fn role_filter(value: Option<&str>) -> Result<Option<Role>, AppError> {
    let mut c = Checker::new();
    let role = c.optional_one_of("role", value, ROLE_INVALID);
    c.finish(|| Some(role)).map_err(AppError::Validation)
}
