mod common;

use chrono::NaiveDate;
use eye_clinic::models::{
    AppointmentStatus, Gender, NewAppointment, NewPatient, OphthalmologistId, PatientId, TimeSlot,
};
use eye_clinic::repository::{AppointmentRepository, PatientRepository, SqliteRepository};
use eye_clinic::{ClinicError, QueryOutcome};
use rusqlite::types::Value;

use common::{count, open_database};

fn new_patient(email: &str) -> NewPatient {
    NewPatient {
        name: "Test Patient".to_string(),
        gender: Gender::Other,
        date_of_birth: NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid date"),
        email: email.to_string(),
        phone: 0,
        password_hash: "pbkdf2-sha256$1$AA$AA".to_string(),
    }
}

#[test]
fn test_database_creation_and_initialization() {
    let (_dir, db) = open_database();

    // Test that we can get a connection; the pool holds one, so return it before querying
    {
        let _conn = db.get_connection().expect("Failed to get database connection");
    }

    let tables = count(
        &db,
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
         ('Patient', 'Ophthalmologist', 'Appointment', 'Patient_Record', 'Bill', 'Feedback')",
    );
    assert_eq!(tables, 6);
}

#[test]
fn test_reopening_keeps_existing_rows() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let url = format!("sqlite://{}", dir.path().join("reopen.db").display());

    {
        let db = eye_clinic::Database::new(&url).expect("Failed to create database");
        let repo = SqliteRepository::new(db);
        PatientRepository::insert(&repo, &new_patient("keep@example.com")).expect("Failed to insert patient");
    }

    let db = eye_clinic::Database::new(&url).expect("Failed to reopen database");
    assert_eq!(count(&db, "SELECT COUNT(*) FROM Patient"), 1);
}

#[test]
fn test_email_lookup_ignores_trailing_spaces() {
    let (_dir, db) = open_database();
    let repo = SqliteRepository::new(db);

    let first = PatientRepository::insert(&repo, &new_patient("ana@example.com   ")).expect("insert");
    let second = PatientRepository::insert(&repo, &new_patient("ana@example.com")).expect("insert");
    PatientRepository::insert(&repo, &new_patient("other@example.com")).expect("insert");

    let found = PatientRepository::find_by_email(&repo, "ana@example.com").expect("lookup");
    let ids: Vec<PatientId> = found.iter().map(|patient| patient.id).collect();
    assert_eq!(ids, vec![first, second]);
}

#[test]
fn test_foreign_keys_are_enforced() {
    let (_dir, db) = open_database();
    let repo = SqliteRepository::new(db);
    let date = NaiveDate::from_ymd_opt(2030, 2, 3).expect("valid date");

    let result = AppointmentRepository::insert(
        &repo,
        &NewAppointment {
            patient_id: PatientId(99),
            ophthalmologist_id: OphthalmologistId(99),
            date,
            time: TimeSlot::TenAm.on(date),
            status: AppointmentStatus::Pending,
        },
    );
    assert!(matches!(result, Err(ClinicError::Database(_))));
}

#[test]
fn test_execute_query_reports_writes_and_failures() {
    let (_dir, db) = open_database();

    let outcome = db.execute_query(
        "INSERT INTO Ophthalmologist (name, email, phonenumber, clinicname, clinicaddress, password_hash) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        &[
            Value::Text("Dr. Raw".to_string()),
            Value::Text("raw@clinic.test".to_string()),
            Value::Integer(0),
            Value::Text("Raw Clinic".to_string()),
            Value::Text("1 Raw St".to_string()),
            Value::Text("x".to_string()),
        ],
        false,
    );
    assert_eq!(outcome, QueryOutcome::Committed(1));

    // Rating outside 1..=5 violates the table's check constraint
    let rejected = db.execute_query(
        "INSERT INTO Feedback (patient_id, ophthalmologist_id, rating, comments, feedback_date) \
         VALUES (1, 1, 6, '', '2030-01-01 00:00:00')",
        &[],
        false,
    );
    assert_eq!(rejected, QueryOutcome::Failed);
    assert!(!rejected.succeeded());

    match db.execute_query("SELECT name FROM Ophthalmologist", &[], true) {
        QueryOutcome::Rows { columns, rows } => {
            assert_eq!(columns, vec!["name".to_string()]);
            assert_eq!(rows, vec![vec![Value::Text("Dr. Raw".to_string())]]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_status_update_is_scoped_to_owner() {
    let (_dir, db) = open_database();
    let repo = SqliteRepository::new(db.clone());
    let patient = PatientRepository::insert(&repo, &new_patient("p@example.com")).expect("insert patient");
    db.execute_query(
        "INSERT INTO Ophthalmologist (name, email, phonenumber, clinicname, clinicaddress, password_hash) \
         VALUES ('A', 'a@c', 0, 'C', 'D', 'x'), ('B', 'b@c', 0, 'C', 'D', 'x')",
        &[],
        false,
    );

    let date = NaiveDate::from_ymd_opt(2030, 2, 3).expect("valid date");
    let appointment = AppointmentRepository::insert(
        &repo,
        &NewAppointment {
            patient_id: patient,
            ophthalmologist_id: OphthalmologistId(1),
            date,
            time: TimeSlot::OnePm.on(date),
            status: AppointmentStatus::Pending,
        },
    )
    .expect("insert appointment");

    assert!(!repo
        .update_status(appointment, OphthalmologistId(2), AppointmentStatus::Approved)
        .expect("update"));
    assert!(repo
        .update_status(appointment, OphthalmologistId(1), AppointmentStatus::Approved)
        .expect("update"));

    let stored = AppointmentRepository::find_by_id(&repo, appointment)
        .expect("lookup")
        .expect("appointment exists");
    assert_eq!(stored.status, AppointmentStatus::Approved);
    assert_eq!(stored.time.to_string(), "2030-02-03 13:00:00");

    assert!(!repo.delete(appointment, PatientId(42)).expect("delete"));
    assert!(repo.delete(appointment, patient).expect("delete"));
    assert!(AppointmentRepository::find_by_id(&repo, appointment).expect("lookup").is_none());
}
