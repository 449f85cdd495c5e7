use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Form field named in a validation message
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Field {
    /// Password (or its confirmation)
    Password,
    /// Phone number
    Phone,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password => f.write_str("Password"),
            Self::Phone => f.write_str("Phone"),
        }
    }
}

/// A single broken input rule, checked before any query runs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Password and confirmation differ
    #[error("Passwords do not match!")]
    PasswordMismatch,

    /// Name, email or password left blank
    #[error("Please fill all required fields!")]
    MissingRequiredFields,

    /// A field stored as an integer did not parse as one
    #[error("{0} must be numeric!")]
    NotNumeric(Field),

    /// Booking date before today
    #[error("Appointment date {0} is in the past")]
    DateInPast(NaiveDate),

    /// Bill amount is not a usable number
    #[error("Invalid amount!")]
    InvalidAmount,

    /// Feedback option index outside the offered list
    #[error("Rating option {0} is out of range")]
    RatingOutOfRange(usize),

    /// Time slot text not on the booking list
    #[error("Unknown time slot: {0}")]
    UnknownTimeSlot(String),
}

/// Validation utilities for form input
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Every listed field must contain something other than whitespace
    pub fn require_filled(fields: &[&str]) -> Result<(), ValidationError> {
        if fields.iter().any(|value| value.trim().is_empty()) {
            return Err(ValidationError::MissingRequiredFields);
        }
        Ok(())
    }

    /// Password and confirmation must be identical
    pub fn confirm_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
        if password != confirmation {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }

    /// Passwords are numeric. Returns the canonical integer.
    ///
    /// Leading zeros and surrounding whitespace do not matter, so "0123" and
    /// " 123" are the same password.
    pub fn numeric_password(password: &str) -> Result<i64, ValidationError> {
        password
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::NotNumeric(Field::Password))
    }

    /// Phone numbers are stored as integers; an empty phone becomes 0.
    pub fn numeric_phone(phone: &str) -> Result<i64, ValidationError> {
        let trimmed = phone.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        trimmed
            .parse::<i64>()
            .map_err(|_| ValidationError::NotNumeric(Field::Phone))
    }

    /// Appointments cannot be booked for a day before `today`
    pub fn booking_date(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
        if date < today {
            return Err(ValidationError::DateInPast(date));
        }
        Ok(date)
    }

    /// Parse a bill amount: finite and not negative
    pub fn bill_amount(amount: &str) -> Result<f64, ValidationError> {
        let value = amount
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidAmount)?;

        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InvalidAmount);
        }

        Ok(value)
    }

    /// Trim trailing whitespace the way the login lookup does
    #[must_use]
    pub fn login_email(email: &str) -> &str {
        email.trim_end()
    }

    /// Strip control characters from free text, keeping line breaks and tabs
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect::<String>()
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_missing() {
        assert_eq!(
            InputValidator::require_filled(&["Ann", "  "]),
            Err(ValidationError::MissingRequiredFields)
        );
        assert!(InputValidator::require_filled(&["Ann", "a@b.c"]).is_ok());
    }

    #[test]
    fn password_numbers_are_canonical() {
        assert_eq!(InputValidator::numeric_password("0123"), Ok(123));
        assert_eq!(
            InputValidator::numeric_password("abc"),
            Err(ValidationError::NotNumeric(Field::Password))
        );
    }

    #[test]
    fn empty_phone_is_zero() {
        assert_eq!(InputValidator::numeric_phone(""), Ok(0));
        assert_eq!(InputValidator::numeric_phone("5551234"), Ok(5_551_234));
    }

    #[test]
    fn amount_rejects_nan_and_negative() {
        assert_eq!(InputValidator::bill_amount("nan"), Err(ValidationError::InvalidAmount));
        assert_eq!(InputValidator::bill_amount("-1"), Err(ValidationError::InvalidAmount));
        assert_eq!(InputValidator::bill_amount("12.50"), Ok(12.5));
    }
}
