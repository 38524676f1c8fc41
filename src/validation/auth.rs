use super::users::{clean_skills, BIO_LENGTH, COMPANY_LENGTH, NAME_LENGTH, NAME_REQUIRED, ROLE_INVALID};
use super::{Checker, FieldError, Validate};
use crate::models::{Credentials, LoginRequest, NewUser, RegisterRequest, Registration};

const PASSWORD_REQUIRED: &str = "Password is required";
const PASSWORD_LENGTH: &str = "Password must be at least 6 characters long";

impl Validate for LoginRequest {
    type Output = Credentials;

    fn validate(self) -> Result<Credentials, Vec<FieldError>> {
        let mut c = Checker::new();

        let email = c.email("email", self.email.as_deref());
        // Passwords are compared as sent, never trimmed.
        let password = match self.password {
            Some(p) if !p.is_empty() => Some(p),
            _ => {
                c.fail("password", PASSWORD_REQUIRED);
                None
            }
        };
        let role = c.one_of("role", self.role.as_deref(), ROLE_INVALID);

        c.finish(|| {
            Some(Credentials {
                email: email?,
                password: password?,
                role: role?,
            })
        })
    }
}

impl Validate for RegisterRequest {
    type Output = Registration;

    fn validate(self) -> Result<Registration, Vec<FieldError>> {
        let mut c = Checker::new();

        let name = c.present("name", self.name.as_deref(), NAME_REQUIRED);
        c.length("name", self.name.as_deref(), 2, 50, NAME_LENGTH);
        let email = c.email("email", self.email.as_deref());
        let password = match self.password {
            Some(p) if p.chars().count() >= 6 => Some(p),
            _ => {
                c.fail("password", PASSWORD_LENGTH);
                None
            }
        };
        let role = c.one_of("role", self.role.as_deref(), ROLE_INVALID);
        let company = c.optional_text("company", self.company.as_deref(), 100, COMPANY_LENGTH);
        let bio = c.optional_text("bio", self.bio.as_deref(), 500, BIO_LENGTH);

        c.finish(|| {
            Some(Registration {
                user: NewUser {
                    name: name?,
                    email: email?,
                    role: role?,
                    company,
                    skills: clean_skills(self.skills),
                    bio,
                    avatar: None,
                    password_hash: None,
                },
                password: password?,
            })
        })
    }
}
