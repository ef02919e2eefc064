use serde::Deserialize;
use time::Date;

use crate::auth::services::is_valid_email;
use crate::error::ApiError;

/// Full contact body, used for both create and update (PUT semantics).
#[derive(Debug, Deserialize)]
pub struct ContactPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(with = "crate::contacts::repo_types::calendar_date")]
    pub birthday: Date,
    pub notes: Option<String>,
}

impl ContactPayload {
    pub fn validate(&self, today: Date) -> Result<(), ApiError> {
        let name_ok = |s: &str| (2..=50).contains(&s.len());
        if !name_ok(&self.first_name) || !name_ok(&self.last_name) {
            return Err(ApiError::Validation(
                "Names must be between 2 and 50 characters".into(),
            ));
        }
        if !is_valid_email(&self.email) {
            return Err(ApiError::Validation("Invalid email".into()));
        }
        if !(6..=20).contains(&self.phone_number.len()) {
            return Err(ApiError::Validation(
                "Phone number must be between 6 and 20 characters".into(),
            ));
        }
        if self.notes.as_deref().is_some_and(|n| n.len() > 150) {
            return Err(ApiError::Validation(
                "Notes must be at most 150 characters".into(),
            ));
        }
        if self.birthday > today {
            return Err(ApiError::Validation(
                "Birthday cannot be in the future".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub text: String,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct BirthdayRequest {
    pub days: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn payload() -> ContactPayload {
        ContactPayload {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane.doe@example.com".into(),
            phone_number: "+380501112233".into(),
            birthday: date!(1990 - 06 - 15),
            notes: None,
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(payload().validate(date!(2024 - 12 - 28)).is_ok());
    }

    #[test]
    fn future_birthday_is_rejected() {
        let mut p = payload();
        p.birthday = date!(2025 - 01 - 01);
        assert!(p.validate(date!(2024 - 12 - 28)).is_err());
        // today itself is allowed
        p.birthday = date!(2024 - 12 - 28);
        assert!(p.validate(date!(2024 - 12 - 28)).is_ok());
    }

    #[test]
    fn field_lengths_are_enforced() {
        let mut p = payload();
        p.first_name = "J".into();
        assert!(p.validate(date!(2024 - 12 - 28)).is_err());

        let mut p = payload();
        p.phone_number = "12345".into();
        assert!(p.validate(date!(2024 - 12 - 28)).is_err());

        let mut p = payload();
        p.notes = Some("x".repeat(151));
        assert!(p.validate(date!(2024 - 12 - 28)).is_err());

        let mut p = payload();
        p.email = "nope".into();
        assert!(p.validate(date!(2024 - 12 - 28)).is_err());
    }
}
