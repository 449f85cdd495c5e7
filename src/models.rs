//! Data models for the clinic
//!
//! Row types for the six tables, the insert payloads that create them, and
//! the small enumerations (statuses, gender, time slots, ratings) that the
//! database stores as plain integers or strings.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

row_id!(
    /// Primary key of a patient row
    PatientId
);
row_id!(
    /// Primary key of an ophthalmologist row
    OphthalmologistId
);
row_id!(
    /// Primary key of an appointment row
    AppointmentId
);
row_id!(
    /// Primary key of a patient record row
    RecordId
);
row_id!(
    /// Primary key of a bill row
    BillId
);
row_id!(
    /// Primary key of a feedback row
    FeedbackId
);

/// Appointment state as stored in `appointment_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    /// Waiting for the ophthalmologist (code 0)
    Pending,
    /// Accepted by the ophthalmologist (code 1)
    Approved,
    /// Declined by the ophthalmologist (code 2)
    Rejected,
}

impl AppointmentStatus {
    /// Integer code used in the database
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Pending => 0,
            Self::Approved => 1,
            Self::Rejected => 2,
        }
    }

    /// Decode a stored status code
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Approved),
            2 => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Label shown in appointment tables
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ToSql for AppointmentStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for AppointmentStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = i64::column_result(value)?;
        Self::from_code(code).ok_or(FromSqlError::OutOfRange(code))
    }
}

/// Bill state as stored in `payment_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Not paid yet (code 0)
    Unpaid,
    /// Paid (code 1)
    Paid,
}

impl PaymentStatus {
    /// Integer code used in the database
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Unpaid => 0,
            Self::Paid => 1,
        }
    }

    /// Decode a stored status code
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Unpaid),
            1 => Some(Self::Paid),
            _ => None,
        }
    }

    /// Label shown in billing tables
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unpaid => "Unpaid",
            Self::Paid => "Paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ToSql for PaymentStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for PaymentStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = i64::column_result(value)?;
        Self::from_code(code).ok_or(FromSqlError::OutOfRange(code))
    }
}

/// Patient gender as offered on the registration form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
    /// Other or undisclosed
    Other,
}

impl Gender {
    /// Stored text value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            "other" | "o" => Ok(Self::Other),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

impl ToSql for Gender {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Gender {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// Bookable hour of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeSlot {
    /// 10:00 AM
    TenAm,
    /// 11:00 AM
    ElevenAm,
    /// 12:00 PM
    Noon,
    /// 01:00 PM
    OnePm,
    /// 02:00 PM
    TwoPm,
    /// 03:00 PM
    ThreePm,
    /// 04:00 PM
    FourPm,
    /// 05:00 PM
    FivePm,
}

impl TimeSlot {
    /// Every slot, in the order the booking form lists them
    pub const ALL: [Self; 8] = [
        Self::TenAm,
        Self::ElevenAm,
        Self::Noon,
        Self::OnePm,
        Self::TwoPm,
        Self::ThreePm,
        Self::FourPm,
        Self::FivePm,
    ];

    /// 24-hour clock hour of the slot
    #[must_use]
    pub const fn hour(self) -> u32 {
        match self {
            Self::TenAm => 10,
            Self::ElevenAm => 11,
            Self::Noon => 12,
            Self::OnePm => 13,
            Self::TwoPm => 14,
            Self::ThreePm => 15,
            Self::FourPm => 16,
            Self::FivePm => 17,
        }
    }

    /// Label as shown on the booking form
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TenAm => "10:00 AM",
            Self::ElevenAm => "11:00 AM",
            Self::Noon => "12:00 PM",
            Self::OnePm => "01:00 PM",
            Self::TwoPm => "02:00 PM",
            Self::ThreePm => "03:00 PM",
            Self::FourPm => "04:00 PM",
            Self::FivePm => "05:00 PM",
        }
    }

    /// Time of day the slot starts
    #[must_use]
    pub fn time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), 0, 0).unwrap_or_default()
    }

    /// Timestamp of this slot on the given day
    #[must_use]
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.time())
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeSlot {
    type Err = ValidationError;

    /// Accepts the form label ("02:00 PM") or a 24-hour time ("14:00").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|slot| {
                slot.label().eq_ignore_ascii_case(wanted)
                    || slot.time().format("%H:%M").to_string() == wanted
            })
            .ok_or_else(|| ValidationError::UnknownTimeSlot(wanted.to_string()))
    }
}

/// Feedback score between 1 and 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Options offered by the feedback form, best first
    pub const OPTIONS: [&'static str; 5] = [
        "5 - Excellent",
        "4 - Good",
        "3 - Average",
        "2 - Poor",
        "1 - Very Poor",
    ];

    /// Build a rating from its numeric value
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= 1 && value <= 5 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Rating for the n-th entry of [`Rating::OPTIONS`]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_option_index(index: usize) -> Result<Self, ValidationError> {
        if index < Self::OPTIONS.len() {
            Ok(Self(5 - index as u8))
        } else {
            Err(ValidationError::RatingOutOfRange(index))
        }
    }

    /// Numeric value, 1 to 5
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

impl ToSql for Rating {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(self.0)))
    }
}

impl FromSql for Rating {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        u8::try_from(raw)
            .ok()
            .and_then(Self::new)
            .ok_or(FromSqlError::OutOfRange(raw))
    }
}

/// Database representation of a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Patient {
    /// Database primary key
    pub id: PatientId,
    /// Full name
    pub name: String,
    /// Gender
    pub gender: Gender,
    /// Date of birth
    pub date_of_birth: NaiveDate,
    /// Email address used to log in
    pub email: String,
    /// Phone number as stored (0 when none was given)
    pub phone: i64,
    /// Encoded salted password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Payload for inserting a patient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    /// Full name
    pub name: String,
    /// Gender
    pub gender: Gender,
    /// Date of birth
    pub date_of_birth: NaiveDate,
    /// Email address used to log in
    pub email: String,
    /// Phone number (0 when none was given)
    pub phone: i64,
    /// Encoded salted password hash
    pub password_hash: String,
}

/// Database representation of an ophthalmologist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ophthalmologist {
    /// Database primary key
    pub id: OphthalmologistId,
    /// Full name
    pub name: String,
    /// Email address used to log in
    pub email: String,
    /// Phone number as stored (0 when none was given)
    pub phone: i64,
    /// Name of the clinic they practice at
    pub clinic_name: String,
    /// Address of the clinic
    pub clinic_address: String,
    /// Encoded salted password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Payload for inserting an ophthalmologist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOphthalmologist {
    /// Full name
    pub name: String,
    /// Email address used to log in
    pub email: String,
    /// Phone number (0 when none was given)
    pub phone: i64,
    /// Name of the clinic
    pub clinic_name: String,
    /// Address of the clinic
    pub clinic_address: String,
    /// Encoded salted password hash
    pub password_hash: String,
}

/// Database representation of an appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Appointment {
    /// Database primary key
    pub id: AppointmentId,
    /// Patient who booked
    pub patient_id: PatientId,
    /// Ophthalmologist booked with
    pub ophthalmologist_id: OphthalmologistId,
    /// Day of the appointment
    pub date: NaiveDate,
    /// Day and slot time combined
    pub time: NaiveDateTime,
    /// Review state
    pub status: AppointmentStatus,
}

/// Payload for inserting an appointment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    /// Patient who books
    pub patient_id: PatientId,
    /// Ophthalmologist booked with
    pub ophthalmologist_id: OphthalmologistId,
    /// Day of the appointment
    pub date: NaiveDate,
    /// Day and slot time combined
    pub time: NaiveDateTime,
    /// Initial state, normally pending
    pub status: AppointmentStatus,
}

/// Appointment joined with both participants' names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentDetail {
    /// The appointment row
    #[serde(flatten)]
    pub appointment: Appointment,
    /// Patient's name
    pub patient_name: String,
    /// Ophthalmologist's name
    pub ophthalmologist_name: String,
}

/// Database representation of a consultation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientRecord {
    /// Database primary key
    pub id: RecordId,
    /// Patient examined
    pub patient_id: PatientId,
    /// Ophthalmologist who wrote the record
    pub ophthalmologist_id: OphthalmologistId,
    /// Appointment the record belongs to
    pub appointment_id: AppointmentId,
    /// When the record was written
    pub date: NaiveDateTime,
    /// Diagnosis
    pub diagnosis: String,
    /// Treatment plan
    pub treatment: String,
    /// Prescription
    pub prescription: String,
}

/// Payload for inserting a consultation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// Patient examined
    pub patient_id: PatientId,
    /// Ophthalmologist writing the record
    pub ophthalmologist_id: OphthalmologistId,
    /// Appointment the record belongs to
    pub appointment_id: AppointmentId,
    /// When the record was written
    pub date: NaiveDateTime,
    /// Diagnosis
    pub diagnosis: String,
    /// Treatment plan
    pub treatment: String,
    /// Prescription
    pub prescription: String,
}

/// Record joined with the author's name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordDetail {
    /// The record row
    #[serde(flatten)]
    pub record: PatientRecord,
    /// Ophthalmologist's name
    pub ophthalmologist_name: String,
}

/// Database representation of a bill
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bill {
    /// Database primary key
    pub id: BillId,
    /// Patient billed
    pub patient_id: PatientId,
    /// Appointment billed for
    pub appointment_id: AppointmentId,
    /// Amount due
    pub amount: f64,
    /// Whether it has been paid
    pub status: PaymentStatus,
    /// When the bill was issued
    pub date: NaiveDateTime,
}

/// Payload for inserting a bill
#[derive(Debug, Clone, PartialEq)]
pub struct NewBill {
    /// Patient billed
    pub patient_id: PatientId,
    /// Appointment billed for
    pub appointment_id: AppointmentId,
    /// Amount due
    pub amount: f64,
    /// Initial state, normally unpaid
    pub status: PaymentStatus,
    /// When the bill was issued
    pub date: NaiveDateTime,
}

/// Bill joined with both participants' names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillDetail {
    /// The bill row
    #[serde(flatten)]
    pub bill: Bill,
    /// Patient's name
    pub patient_name: String,
    /// Name of the ophthalmologist who saw the appointment
    pub ophthalmologist_name: String,
}

/// Database representation of patient feedback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    /// Database primary key
    pub id: FeedbackId,
    /// Patient giving feedback
    pub patient_id: PatientId,
    /// Ophthalmologist receiving it
    pub ophthalmologist_id: OphthalmologistId,
    /// Score
    pub rating: Rating,
    /// Free-text comments
    pub comments: String,
    /// When it was submitted
    pub date: NaiveDateTime,
}

/// Payload for inserting feedback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    /// Patient giving feedback
    pub patient_id: PatientId,
    /// Ophthalmologist receiving it
    pub ophthalmologist_id: OphthalmologistId,
    /// Score
    pub rating: Rating,
    /// Free-text comments
    pub comments: String,
    /// When it was submitted
    pub date: NaiveDateTime,
}

/// Feedback joined with the patient's name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackDetail {
    /// The feedback row
    #[serde(flatten)]
    pub feedback: Feedback,
    /// Patient's name
    pub patient_name: String,
}
