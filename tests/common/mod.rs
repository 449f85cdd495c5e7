//! Shared fixtures for the integration tests

#![allow(dead_code)]

use chrono::{Duration, Local, NaiveDate};
use eye_clinic::forms::{LoginForm, OphthalmologistRegistrationForm, PatientRegistrationForm};
use eye_clinic::models::Gender;
use eye_clinic::{ClinicService, Database, Navigator, PasswordHasher};
use tempfile::TempDir;

/// Cheap hashing so tests stay fast
pub const FAST: PasswordHasher = PasswordHasher::new(1_000);

/// Fresh database in a temporary directory; keep the directory alive
pub fn open_database() -> (TempDir, Database) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let url = format!("sqlite:{}", dir.path().join("clinic.db").display());
    let database = Database::new(&url).expect("Failed to create database");
    (dir, database)
}

/// Service over a fresh database, plus the database for raw checks
pub fn clinic() -> (TempDir, Database, ClinicService) {
    let (dir, database) = open_database();
    let service = ClinicService::sqlite(database.clone(), FAST);
    (dir, database, service)
}

/// Navigator over a fresh database
pub fn navigator() -> (TempDir, Database, Navigator) {
    let (dir, database, service) = clinic();
    (dir, database, Navigator::new(service))
}

pub fn patient_form(name: &str, email: &str, password: &str) -> PatientRegistrationForm {
    PatientRegistrationForm {
        name: name.to_string(),
        gender: Gender::Female,
        date_of_birth: NaiveDate::from_ymd_opt(1988, 6, 15).expect("valid date"),
        email: email.to_string(),
        phone: "5550100".to_string(),
        password: password.to_string(),
        confirm_password: password.to_string(),
    }
}

pub fn ophthalmologist_form(name: &str, email: &str, password: &str) -> OphthalmologistRegistrationForm {
    OphthalmologistRegistrationForm {
        name: name.to_string(),
        email: email.to_string(),
        phone: String::new(),
        password: password.to_string(),
        clinic_name: "Clear View".to_string(),
        clinic_address: "12 Harbor Rd".to_string(),
    }
}

pub fn login(email: &str, password: &str) -> LoginForm {
    LoginForm {
        email: email.to_string(),
        password: password.to_string(),
    }
}

/// A day safely in the future
pub fn future_date(days: i64) -> NaiveDate {
    Local::now().date_naive() + Duration::days(days)
}

/// Single integer from a raw select
pub fn count(database: &Database, sql: &str) -> i64 {
    match database.execute_query(sql, &[], true) {
        eye_clinic::QueryOutcome::Rows { rows, .. } => match rows.first().and_then(|row| row.first()) {
            Some(rusqlite::types::Value::Integer(value)) => *value,
            other => panic!("unexpected value {other:?}"),
        },
        other => panic!("query failed: {other:?}"),
    }
}
