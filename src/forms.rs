//! Form state for every data-entry screen.
//!
//! A form holds what the user typed. Turning it into an insert payload runs
//! the input rules first, so nothing reaches the database unless the form
//! is valid. The form itself is never consumed: on failure the caller still
//! has the entered values.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::credentials::PasswordHasher;
use crate::error::{ClinicError, Result};
use crate::models::{
    AppointmentId, AppointmentStatus, Gender, NewAppointment, NewFeedback, NewOphthalmologist, NewPatient,
    OphthalmologistId, PatientId, Rating, TimeSlot,
};
use crate::validation::{InputValidator, ValidationError};

/// Shown when booking or rating without choosing an ophthalmologist
pub const NO_OPHTHALMOLOGIST_SELECTED: &str = "No ophthalmologist selected!";
/// Shown when saving a record without choosing patient and appointment
pub const NO_RECORD_SELECTION: &str = "Please select patient and appointment!";
/// Shown when billing with nobody to bill
pub const NO_PATIENTS_AVAILABLE: &str = "No patients available!";
/// Shown when the billed patient has no appointment to attach the bill to
pub const NO_APPOINTMENT_FOR_PATIENT: &str = "No appointment found for this patient!";

/// Patient sign-up form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRegistrationForm {
    /// Full name
    pub name: String,
    /// Gender picked from the list
    pub gender: Gender,
    /// Date of birth
    pub date_of_birth: NaiveDate,
    /// Login email
    pub email: String,
    /// Phone as typed; may be empty
    pub phone: String,
    /// Numeric password as typed
    pub password: String,
    /// Repeated password
    pub confirm_password: String,
}

impl PatientRegistrationForm {
    /// Check the form and build the row to insert.
    ///
    /// Rules run in a fixed order and the first failure wins: matching
    /// confirmation, required fields, numeric password, numeric phone.
    pub fn to_new_patient(&self, hasher: &PasswordHasher) -> std::result::Result<NewPatient, ValidationError> {
        InputValidator::confirm_password(&self.password, &self.confirm_password)?;
        InputValidator::require_filled(&[&self.name, &self.email, &self.password])?;
        let secret = InputValidator::numeric_password(&self.password)?;
        let phone = InputValidator::numeric_phone(&self.phone)?;

        Ok(NewPatient {
            name: InputValidator::sanitize_text(&self.name),
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            email: self.email.trim().to_string(),
            phone,
            password_hash: hasher.hash(&secret.to_string()),
        })
    }
}

/// Ophthalmologist sign-up form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OphthalmologistRegistrationForm {
    /// Full name
    pub name: String,
    /// Login email
    pub email: String,
    /// Phone as typed; may be empty
    pub phone: String,
    /// Numeric password as typed
    pub password: String,
    /// Clinic name
    pub clinic_name: String,
    /// Clinic address
    pub clinic_address: String,
}

impl OphthalmologistRegistrationForm {
    /// Same rules as the patient form, minus the confirmation step
    pub fn to_new_ophthalmologist(
        &self,
        hasher: &PasswordHasher,
    ) -> std::result::Result<NewOphthalmologist, ValidationError> {
        InputValidator::require_filled(&[&self.name, &self.email, &self.password])?;
        let secret = InputValidator::numeric_password(&self.password)?;
        let phone = InputValidator::numeric_phone(&self.phone)?;

        Ok(NewOphthalmologist {
            name: InputValidator::sanitize_text(&self.name),
            email: self.email.trim().to_string(),
            phone,
            clinic_name: InputValidator::sanitize_text(&self.clinic_name),
            clinic_address: InputValidator::sanitize_text(&self.clinic_address),
            password_hash: hasher.hash(&secret.to_string()),
        })
    }
}

/// Email and password, shared by both login screens
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoginForm {
    /// Email as typed
    pub email: String,
    /// Password as typed
    pub password: String,
}

impl LoginForm {
    /// Lookup key and canonical secret. The password is checked before any
    /// query runs.
    pub fn credentials(&self) -> std::result::Result<(&str, String), ValidationError> {
        let secret = InputValidator::numeric_password(&self.password)?;
        Ok((InputValidator::login_email(&self.email), secret.to_string()))
    }
}

/// Appointment booking form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingForm {
    /// Chosen ophthalmologist
    pub ophthalmologist_id: Option<OphthalmologistId>,
    /// Chosen day
    pub date: NaiveDate,
    /// Chosen slot
    pub slot: TimeSlot,
}

impl BookingForm {
    /// Pending appointment for `patient`, refusing days before `today`
    pub fn to_new_appointment(&self, patient: PatientId, today: NaiveDate) -> Result<NewAppointment> {
        let ophthalmologist_id = self
            .ophthalmologist_id
            .ok_or(ClinicError::NoSelection(NO_OPHTHALMOLOGIST_SELECTED))?;
        let date = InputValidator::booking_date(self.date, today)?;

        Ok(NewAppointment {
            patient_id: patient,
            ophthalmologist_id,
            date,
            time: self.slot.on(date),
            status: AppointmentStatus::Pending,
        })
    }
}

/// Consultation record form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordForm {
    /// Chosen patient
    pub patient_id: Option<PatientId>,
    /// Chosen appointment of that patient
    pub appointment_id: Option<AppointmentId>,
    /// Diagnosis text
    pub diagnosis: String,
    /// Treatment text
    pub treatment: String,
    /// Prescription text
    pub prescription: String,
}

impl RecordForm {
    /// The chosen patient and appointment
    pub fn selection(&self) -> Result<(PatientId, AppointmentId)> {
        match (self.patient_id, self.appointment_id) {
            (Some(patient), Some(appointment)) => Ok((patient, appointment)),
            _ => Err(ClinicError::NoSelection(NO_RECORD_SELECTION)),
        }
    }
}

/// Bill creation form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BillForm {
    /// Chosen patient; the first candidate when unset
    pub patient_id: Option<PatientId>,
    /// Falls back to the patient's first appointment when unset
    pub appointment_id: Option<AppointmentId>,
    /// Amount as typed
    pub amount: String,
}

/// Feedback form
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedbackForm {
    /// Ophthalmologist being rated
    pub ophthalmologist_id: Option<OphthalmologistId>,
    /// Index into [`Rating::OPTIONS`]
    pub rating_option: usize,
    /// Free-text comments
    pub comments: String,
}

impl FeedbackForm {
    /// Feedback row from `patient`, dated `now`
    pub fn to_new_feedback(&self, patient: PatientId, now: NaiveDateTime) -> Result<NewFeedback> {
        let ophthalmologist_id = self
            .ophthalmologist_id
            .ok_or(ClinicError::NoSelection(NO_OPHTHALMOLOGIST_SELECTED))?;
        let rating = Rating::from_option_index(self.rating_option)?;

        Ok(NewFeedback {
            patient_id: patient,
            ophthalmologist_id,
            rating,
            comments: InputValidator::sanitize_text(&self.comments),
            date: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Field;

    const FAST: PasswordHasher = PasswordHasher::new(1_000);

    fn patient_form() -> PatientRegistrationForm {
        PatientRegistrationForm {
            name: "Ana Ruiz".to_string(),
            gender: Gender::Female,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 2).unwrap(),
            email: "ana@example.com".to_string(),
            phone: "5550100".to_string(),
            password: "1234".to_string(),
            confirm_password: "1234".to_string(),
        }
    }

    #[test]
    fn mismatch_is_reported_before_missing_fields() {
        let form = PatientRegistrationForm {
            name: String::new(),
            confirm_password: "9".to_string(),
            ..patient_form()
        };
        assert_eq!(form.to_new_patient(&FAST), Err(ValidationError::PasswordMismatch));
    }

    #[test]
    fn non_numeric_password_beats_bad_phone() {
        let form = PatientRegistrationForm {
            password: "abc".to_string(),
            confirm_password: "abc".to_string(),
            phone: "call me".to_string(),
            ..patient_form()
        };
        assert_eq!(form.to_new_patient(&FAST), Err(ValidationError::NotNumeric(Field::Password)));
    }

    #[test]
    fn valid_patient_form_hashes_canonical_password() {
        let patient = patient_form().to_new_patient(&FAST).unwrap();
        assert_eq!(patient.phone, 5_550_100);
        assert!(FAST.verify("1234", &patient.password_hash));
    }

    #[test]
    fn ophthalmologist_form_requires_numeric_phone() {
        let form = OphthalmologistRegistrationForm {
            name: "Dr. Lee".to_string(),
            email: "lee@clinic.test".to_string(),
            phone: "12-34".to_string(),
            password: "77".to_string(),
            clinic_name: "Clear View".to_string(),
            clinic_address: "1 Main St".to_string(),
        };
        assert_eq!(
            form.to_new_ophthalmologist(&FAST).unwrap_err(),
            ValidationError::NotNumeric(Field::Phone)
        );
    }

    #[test]
    fn login_trims_trailing_email_whitespace() {
        let form = LoginForm {
            email: "ana@example.com  ".to_string(),
            password: "0042".to_string(),
        };
        assert_eq!(form.credentials().unwrap(), ("ana@example.com", "42".to_string()));
    }

    #[test]
    fn booking_needs_an_ophthalmologist() {
        let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let form = BookingForm {
            ophthalmologist_id: None,
            date: today,
            slot: TimeSlot::TenAm,
        };
        let err = form.to_new_appointment(PatientId(1), today).unwrap_err();
        assert_eq!(err.to_string(), NO_OPHTHALMOLOGIST_SELECTED);
    }

    #[test]
    fn booking_rejects_yesterday_and_accepts_today() {
        let today = NaiveDate::from_ymd_opt(2030, 1, 2).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let mut form = BookingForm {
            ophthalmologist_id: Some(OphthalmologistId(3)),
            date: yesterday,
            slot: TimeSlot::TwoPm,
        };
        assert!(matches!(
            form.to_new_appointment(PatientId(1), today),
            Err(ClinicError::Validation(ValidationError::DateInPast(_)))
        ));

        form.date = today;
        let appointment = form.to_new_appointment(PatientId(1), today).unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.time.to_string(), "2030-01-02 14:00:00");
    }

    #[test]
    fn feedback_option_zero_is_five_stars() {
        let now = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
        let form = FeedbackForm {
            ophthalmologist_id: Some(OphthalmologistId(2)),
            rating_option: 0,
            comments: "Great".to_string(),
        };
        assert_eq!(form.to_new_feedback(PatientId(1), now).unwrap().rating.value(), 5);
    }

    #[test]
    fn record_selection_requires_both_choices() {
        let form = RecordForm {
            patient_id: Some(PatientId(1)),
            ..RecordForm::default()
        };
        assert_eq!(form.selection().unwrap_err().to_string(), NO_RECORD_SELECTION);
    }
}
