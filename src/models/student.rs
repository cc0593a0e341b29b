//! Represents a student account holder, assignable to at most one spot.

use crate::errors::FieldErrors;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered student. Passwords never appear here; credentials live in
/// the `accounts` table as Argon2id hashes.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Generated integer primary key.
    pub id: i64,

    pub name: String,

    /// Student registration number, at most 10 characters.
    pub ra: String,

    /// Id of the spot this student holds, if any.
    pub spot_id: Option<i64>,

    /// Login identity, unique across accounts.
    pub email: String,
}

/// Write payload for creating or replacing a student.
///
/// The password pair is transient input: required on `/user/register`,
/// ignored everywhere else.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentBody {
    pub name: String,
    pub ra: String,
    #[serde(default)]
    pub spot_id: Option<i64>,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

const RA_MAX_LEN: usize = 10;
const PASSWORD_MIN_LEN: usize = 6;

impl StudentBody {
    /// Shape checks shared by every student write.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        self.check_shape(&mut errors);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Registration adds the password rules on top of the shape checks.
    pub fn validate_with_credentials(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        self.check_shape(&mut errors);

        match self.password.as_deref() {
            None | Some("") => errors
                .entry("password")
                .or_default()
                .push("The password field is required.".into()),
            Some(password) if password.len() < PASSWORD_MIN_LEN => {
                errors.entry("password").or_default().push(format!(
                    "The password field must be at least {} characters long.",
                    PASSWORD_MIN_LEN
                ));
            }
            Some(_) => {}
        }
        if self.confirm_password != self.password {
            errors
                .entry("confirmPassword")
                .or_default()
                .push("The password and confirmPassword fields do not match.".into());
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn check_shape(&self, errors: &mut FieldErrors) {
        if self.name.trim().is_empty() {
            errors
                .entry("name")
                .or_default()
                .push("The name field is required.".into());
        }
        if self.ra.trim().is_empty() {
            errors
                .entry("ra")
                .or_default()
                .push("The ra field is required.".into());
        } else if self.ra.len() > RA_MAX_LEN {
            errors.entry("ra").or_default().push(format!(
                "The ra field must be at most {} characters long.",
                RA_MAX_LEN
            ));
        }
        if self.email.trim().is_empty() {
            errors
                .entry("email")
                .or_default()
                .push("The email field is required.".into());
        } else if !self.email.contains('@') {
            errors
                .entry("email")
                .or_default()
                .push("The email field is not a valid e-mail address.".into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> StudentBody {
        StudentBody {
            name: "Bob".into(),
            ra: "12345".into(),
            spot_id: None,
            email: "b@x.com".into(),
            password: Some("p4ssword".into()),
            confirm_password: Some("p4ssword".into()),
        }
    }

    #[test]
    fn accepts_a_complete_registration() {
        assert!(body().validate_with_credentials().is_ok());
    }

    #[test]
    fn rejects_mismatched_password_pair() {
        let mut b = body();
        b.confirm_password = Some("different".into());
        let errors = b.validate_with_credentials().unwrap_err();
        assert!(errors.contains_key("confirmPassword"));
    }

    #[test]
    fn password_not_required_outside_registration() {
        let mut b = body();
        b.password = None;
        b.confirm_password = None;
        assert!(b.validate().is_ok());
    }

    #[test]
    fn rejects_long_ra_and_bad_email() {
        let mut b = body();
        b.ra = "12345678901".into();
        b.email = "not-an-email".into();
        let errors = b.validate().unwrap_err();
        assert!(errors.contains_key("ra"));
        assert!(errors.contains_key("email"));
    }
}
