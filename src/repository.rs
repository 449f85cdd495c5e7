//! Repository pattern for data access
//!
//! One trait per table, so the clinic workflows depend on these
//! capabilities rather than on SQL. [`SqliteRepository`] implements all of
//! them over a [`Database`].

#[cfg(test)]
use mockall::automock;
use rusqlite::{params, Row};

use crate::db::Database;
use crate::error::Result;
use crate::models::{
    Appointment, AppointmentDetail, AppointmentId, AppointmentStatus, Bill, BillDetail, BillId, Feedback,
    FeedbackDetail, FeedbackId, NewAppointment, NewBill, NewFeedback, NewOphthalmologist, NewPatient, NewRecord,
    Ophthalmologist, OphthalmologistId, Patient, PatientId, PatientRecord, PaymentStatus, RecordDetail, RecordId,
};
use crate::schema::{appointments, bills, feedback, ophthalmologists, patients, records};

/// Patient rows
#[cfg_attr(test, automock)]
pub trait PatientRepository {
    /// Insert a patient and return the new id
    fn insert(&self, patient: &NewPatient) -> Result<PatientId>;
    /// Look up a patient by primary key
    fn find_by_id(&self, id: PatientId) -> Result<Option<Patient>>;
    /// Patients whose right-trimmed email equals `email`, oldest first
    fn find_by_email(&self, email: &str) -> Result<Vec<Patient>>;
    /// Distinct patients holding at least one appointment with the ophthalmologist
    fn with_appointments(&self, ophthalmologist: OphthalmologistId) -> Result<Vec<Patient>>;
    /// Distinct patients the ophthalmologist has written records for
    fn with_records(&self, ophthalmologist: OphthalmologistId) -> Result<Vec<Patient>>;
}

/// Ophthalmologist rows
#[cfg_attr(test, automock)]
pub trait OphthalmologistRepository {
    /// Insert an ophthalmologist and return the new id
    fn insert(&self, ophthalmologist: &NewOphthalmologist) -> Result<OphthalmologistId>;
    /// Look up an ophthalmologist by primary key
    fn find_by_id(&self, id: OphthalmologistId) -> Result<Option<Ophthalmologist>>;
    /// Ophthalmologists whose right-trimmed email equals `email`, oldest first
    fn find_by_email(&self, email: &str) -> Result<Vec<Ophthalmologist>>;
    /// Every ophthalmologist
    fn list(&self) -> Result<Vec<Ophthalmologist>>;
    /// Distinct ophthalmologists the patient has had appointments with
    fn seen_by(&self, patient: PatientId) -> Result<Vec<Ophthalmologist>>;
}

/// Appointment rows
#[cfg_attr(test, automock)]
pub trait AppointmentRepository {
    /// Insert an appointment and return the new id
    fn insert(&self, appointment: &NewAppointment) -> Result<AppointmentId>;
    /// Look up an appointment by primary key
    fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>>;
    /// The patient's appointments, latest day first
    fn for_patient(&self, patient: PatientId) -> Result<Vec<AppointmentDetail>>;
    /// The ophthalmologist's appointments, earliest day first
    fn for_ophthalmologist(&self, ophthalmologist: OphthalmologistId) -> Result<Vec<AppointmentDetail>>;
    /// Appointments between one patient and one ophthalmologist, latest day first
    fn between(&self, patient: PatientId, ophthalmologist: OphthalmologistId) -> Result<Vec<Appointment>>;
    /// Set the status of one of the ophthalmologist's appointments; false if no such row
    fn update_status(
        &self,
        id: AppointmentId,
        ophthalmologist: OphthalmologistId,
        status: AppointmentStatus,
    ) -> Result<bool>;
    /// Delete one of the patient's appointments; false if no such row
    fn delete(&self, id: AppointmentId, patient: PatientId) -> Result<bool>;
}

/// Consultation record rows
#[cfg_attr(test, automock)]
pub trait RecordRepository {
    /// Insert a record and return the new id
    fn insert(&self, record: &NewRecord) -> Result<RecordId>;
    /// The patient's most recent record
    fn latest_for_patient(&self, patient: PatientId) -> Result<Option<RecordDetail>>;
    /// All of the patient's records, newest first
    fn for_patient(&self, patient: PatientId) -> Result<Vec<RecordDetail>>;
    /// Records one ophthalmologist wrote for one patient, newest first
    fn between(&self, patient: PatientId, ophthalmologist: OphthalmologistId) -> Result<Vec<RecordDetail>>;
}

/// Bill rows
#[cfg_attr(test, automock)]
pub trait BillRepository {
    /// Insert a bill and return the new id
    fn insert(&self, bill: &NewBill) -> Result<BillId>;
    /// Look up a bill by primary key
    fn find_by_id(&self, id: BillId) -> Result<Option<Bill>>;
    /// The patient's bills, newest first
    fn for_patient(&self, patient: PatientId) -> Result<Vec<BillDetail>>;
    /// Bills for the ophthalmologist's appointments, newest first
    fn for_ophthalmologist(&self, ophthalmologist: OphthalmologistId) -> Result<Vec<BillDetail>>;
    /// Set the status of one of the patient's bills; false if no such row
    fn update_status(&self, id: BillId, patient: PatientId, status: PaymentStatus) -> Result<bool>;
}

/// Feedback rows
#[cfg_attr(test, automock)]
pub trait FeedbackRepository {
    /// Insert feedback and return the new id
    fn insert(&self, feedback: &NewFeedback) -> Result<FeedbackId>;
    /// Feedback the ophthalmologist has received, newest first
    fn for_ophthalmologist(&self, ophthalmologist: OphthalmologistId) -> Result<Vec<FeedbackDetail>>;
}

/// SQLite-backed implementation of every repository trait
#[derive(Clone)]
pub struct SqliteRepository {
    database: Database,
}

impl SqliteRepository {
    /// Wrap an open database
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }

    fn select_patients(&self, sql: &str, param: impl rusqlite::ToSql) -> Result<Vec<Patient>> {
        self.database.query_rows(sql, params![param], map_patient)
    }

    fn select_ophthalmologists(&self, sql: &str, param: impl rusqlite::ToSql) -> Result<Vec<Ophthalmologist>> {
        self.database.query_rows(sql, params![param], map_ophthalmologist)
    }
}

/// Map a database row to a `Patient`
fn map_patient(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(patients::ID)?,
        name: row.get(patients::NAME)?,
        gender: row.get(patients::GENDER)?,
        date_of_birth: row.get(patients::DATE_OF_BIRTH)?,
        email: row.get(patients::EMAIL)?,
        phone: row.get(patients::PHONE)?,
        password_hash: row.get(patients::PASSWORD_HASH)?,
    })
}

/// Map a database row to an `Ophthalmologist`
fn map_ophthalmologist(row: &Row<'_>) -> rusqlite::Result<Ophthalmologist> {
    Ok(Ophthalmologist {
        id: row.get(ophthalmologists::ID)?,
        name: row.get(ophthalmologists::NAME)?,
        email: row.get(ophthalmologists::EMAIL)?,
        phone: row.get(ophthalmologists::PHONE)?,
        clinic_name: row.get(ophthalmologists::CLINIC_NAME)?,
        clinic_address: row.get(ophthalmologists::CLINIC_ADDRESS)?,
        password_hash: row.get(ophthalmologists::PASSWORD_HASH)?,
    })
}

fn map_appointment(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(appointments::ID)?,
        patient_id: row.get(appointments::PATIENT_ID)?,
        ophthalmologist_id: row.get(appointments::OPHTHALMOLOGIST_ID)?,
        date: row.get(appointments::DATE)?,
        time: row.get(appointments::TIME)?,
        status: row.get(appointments::STATUS)?,
    })
}

fn map_appointment_detail(row: &Row<'_>) -> rusqlite::Result<AppointmentDetail> {
    Ok(AppointmentDetail {
        appointment: map_appointment(row)?,
        patient_name: row.get("patient_name")?,
        ophthalmologist_name: row.get("ophthalmologist_name")?,
    })
}

fn map_record_detail(row: &Row<'_>) -> rusqlite::Result<RecordDetail> {
    Ok(RecordDetail {
        record: PatientRecord {
            id: row.get(records::ID)?,
            patient_id: row.get(records::PATIENT_ID)?,
            ophthalmologist_id: row.get(records::OPHTHALMOLOGIST_ID)?,
            appointment_id: row.get(records::APPOINTMENT_ID)?,
            date: row.get(records::DATE)?,
            diagnosis: row.get(records::DIAGNOSIS)?,
            treatment: row.get(records::TREATMENT)?,
            prescription: row.get(records::PRESCRIPTION)?,
        },
        ophthalmologist_name: row.get("ophthalmologist_name")?,
    })
}

fn map_bill(row: &Row<'_>) -> rusqlite::Result<Bill> {
    Ok(Bill {
        id: row.get(bills::ID)?,
        patient_id: row.get(bills::PATIENT_ID)?,
        appointment_id: row.get(bills::APPOINTMENT_ID)?,
        amount: row.get(bills::AMOUNT)?,
        status: row.get(bills::STATUS)?,
        date: row.get(bills::DATE)?,
    })
}

fn map_bill_detail(row: &Row<'_>) -> rusqlite::Result<BillDetail> {
    Ok(BillDetail {
        bill: map_bill(row)?,
        patient_name: row.get("patient_name")?,
        ophthalmologist_name: row.get("ophthalmologist_name")?,
    })
}

fn map_feedback_detail(row: &Row<'_>) -> rusqlite::Result<FeedbackDetail> {
    Ok(FeedbackDetail {
        feedback: Feedback {
            id: row.get(feedback::ID)?,
            patient_id: row.get(feedback::PATIENT_ID)?,
            ophthalmologist_id: row.get(feedback::OPHTHALMOLOGIST_ID)?,
            rating: row.get(feedback::RATING)?,
            comments: row.get(feedback::COMMENTS)?,
            date: row.get(feedback::DATE)?,
        },
        patient_name: row.get("patient_name")?,
    })
}

/// Appointment columns plus both participants' right-trimmed names
fn appointment_detail_select() -> String {
    format!(
        "SELECT a.{id}, a.{pid}, a.{oid}, a.{date}, a.{time}, a.{status}, \
         RTRIM(p.{pname}) AS patient_name, RTRIM(o.{oname}) AS ophthalmologist_name \
         FROM {table} a \
         JOIN {ptable} p ON a.{pid} = p.{pkey} \
         JOIN {otable} o ON a.{oid} = o.{okey}",
        id = appointments::ID,
        pid = appointments::PATIENT_ID,
        oid = appointments::OPHTHALMOLOGIST_ID,
        date = appointments::DATE,
        time = appointments::TIME,
        status = appointments::STATUS,
        pname = patients::NAME,
        oname = ophthalmologists::NAME,
        table = appointments::TABLE,
        ptable = patients::TABLE,
        pkey = patients::ID,
        otable = ophthalmologists::TABLE,
        okey = ophthalmologists::ID,
    )
}

/// Bill columns plus the patient's name and the name of the ophthalmologist
/// who saw the billed appointment
fn bill_detail_select() -> String {
    format!(
        "SELECT b.{id}, b.{pid}, b.{aid}, b.{amount}, b.{status}, b.{date}, \
         RTRIM(p.{pname}) AS patient_name, RTRIM(o.{oname}) AS ophthalmologist_name \
         FROM {table} b \
         JOIN {ptable} p ON b.{pid} = p.{pkey} \
         JOIN {atable} a ON b.{aid} = a.{akey} \
         JOIN {otable} o ON a.{aoid} = o.{okey}",
        id = bills::ID,
        pid = bills::PATIENT_ID,
        aid = bills::APPOINTMENT_ID,
        amount = bills::AMOUNT,
        status = bills::STATUS,
        date = bills::DATE,
        pname = patients::NAME,
        oname = ophthalmologists::NAME,
        table = bills::TABLE,
        ptable = patients::TABLE,
        pkey = patients::ID,
        atable = appointments::TABLE,
        akey = appointments::ID,
        aoid = appointments::OPHTHALMOLOGIST_ID,
        otable = ophthalmologists::TABLE,
        okey = ophthalmologists::ID,
    )
}

fn record_detail_select() -> String {
    format!(
        "SELECT r.{id}, r.{pid}, r.{oid}, r.{aid}, r.{date}, \
         RTRIM(r.{diagnosis}) AS {diagnosis}, r.{treatment}, RTRIM(r.{prescription}) AS {prescription}, \
         RTRIM(o.{oname}) AS ophthalmologist_name \
         FROM {table} r \
         JOIN {otable} o ON r.{oid} = o.{okey}",
        id = records::ID,
        pid = records::PATIENT_ID,
        oid = records::OPHTHALMOLOGIST_ID,
        aid = records::APPOINTMENT_ID,
        date = records::DATE,
        diagnosis = records::DIAGNOSIS,
        treatment = records::TREATMENT,
        prescription = records::PRESCRIPTION,
        oname = ophthalmologists::NAME,
        table = records::TABLE,
        otable = ophthalmologists::TABLE,
        okey = ophthalmologists::ID,
    )
}

impl PatientRepository for SqliteRepository {
    fn insert(&self, patient: &NewPatient) -> Result<PatientId> {
        let id = self.database.insert(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?, ?)",
                patients::TABLE,
                patients::NAME,
                patients::GENDER,
                patients::DATE_OF_BIRTH,
                patients::EMAIL,
                patients::PHONE,
                patients::PASSWORD_HASH
            ),
            params![
                patient.name,
                patient.gender,
                patient.date_of_birth,
                patient.email,
                patient.phone,
                patient.password_hash
            ],
        )?;
        Ok(PatientId(id))
    }

    fn find_by_id(&self, id: PatientId) -> Result<Option<Patient>> {
        self.database.query_optional(
            &format!("SELECT * FROM {} WHERE {} = ?", patients::TABLE, patients::ID),
            params![id],
            map_patient,
        )
    }

    fn find_by_email(&self, email: &str) -> Result<Vec<Patient>> {
        self.select_patients(
            &format!(
                "SELECT * FROM {} WHERE RTRIM({}) = ? ORDER BY {}",
                patients::TABLE,
                patients::EMAIL,
                patients::ID
            ),
            email,
        )
    }

    fn with_appointments(&self, ophthalmologist: OphthalmologistId) -> Result<Vec<Patient>> {
        self.select_patients(
            &format!(
                "SELECT DISTINCT p.* FROM {} p JOIN {} a ON p.{} = a.{} WHERE a.{} = ? ORDER BY p.{}",
                patients::TABLE,
                appointments::TABLE,
                patients::ID,
                appointments::PATIENT_ID,
                appointments::OPHTHALMOLOGIST_ID,
                patients::ID
            ),
            ophthalmologist,
        )
    }

    fn with_records(&self, ophthalmologist: OphthalmologistId) -> Result<Vec<Patient>> {
        self.select_patients(
            &format!(
                "SELECT DISTINCT p.* FROM {} p JOIN {} r ON p.{} = r.{} WHERE r.{} = ? ORDER BY p.{}",
                patients::TABLE,
                records::TABLE,
                patients::ID,
                records::PATIENT_ID,
                records::OPHTHALMOLOGIST_ID,
                patients::ID
            ),
            ophthalmologist,
        )
    }
}

impl OphthalmologistRepository for SqliteRepository {
    fn insert(&self, ophthalmologist: &NewOphthalmologist) -> Result<OphthalmologistId> {
        let id = self.database.insert(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?, ?)",
                ophthalmologists::TABLE,
                ophthalmologists::NAME,
                ophthalmologists::EMAIL,
                ophthalmologists::PHONE,
                ophthalmologists::CLINIC_NAME,
                ophthalmologists::CLINIC_ADDRESS,
                ophthalmologists::PASSWORD_HASH
            ),
            params![
                ophthalmologist.name,
                ophthalmologist.email,
                ophthalmologist.phone,
                ophthalmologist.clinic_name,
                ophthalmologist.clinic_address,
                ophthalmologist.password_hash
            ],
        )?;
        Ok(OphthalmologistId(id))
    }

    fn find_by_id(&self, id: OphthalmologistId) -> Result<Option<Ophthalmologist>> {
        self.database.query_optional(
            &format!(
                "SELECT * FROM {} WHERE {} = ?",
                ophthalmologists::TABLE,
                ophthalmologists::ID
            ),
            params![id],
            map_ophthalmologist,
        )
    }

    fn find_by_email(&self, email: &str) -> Result<Vec<Ophthalmologist>> {
        self.select_ophthalmologists(
            &format!(
                "SELECT * FROM {} WHERE RTRIM({}) = ? ORDER BY {}",
                ophthalmologists::TABLE,
                ophthalmologists::EMAIL,
                ophthalmologists::ID
            ),
            email,
        )
    }

    fn list(&self) -> Result<Vec<Ophthalmologist>> {
        self.database.query_rows(
            &format!(
                "SELECT * FROM {} ORDER BY {}",
                ophthalmologists::TABLE,
                ophthalmologists::ID
            ),
            [],
            map_ophthalmologist,
        )
    }

    fn seen_by(&self, patient: PatientId) -> Result<Vec<Ophthalmologist>> {
        self.select_ophthalmologists(
            &format!(
                "SELECT DISTINCT o.* FROM {} o JOIN {} a ON o.{} = a.{} WHERE a.{} = ? ORDER BY o.{}",
                ophthalmologists::TABLE,
                appointments::TABLE,
                ophthalmologists::ID,
                appointments::OPHTHALMOLOGIST_ID,
                appointments::PATIENT_ID,
                ophthalmologists::ID
            ),
            patient,
        )
    }
}

impl AppointmentRepository for SqliteRepository {
    fn insert(&self, appointment: &NewAppointment) -> Result<AppointmentId> {
        let id = self.database.insert(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?)",
                appointments::TABLE,
                appointments::PATIENT_ID,
                appointments::OPHTHALMOLOGIST_ID,
                appointments::DATE,
                appointments::TIME,
                appointments::STATUS
            ),
            params![
                appointment.patient_id,
                appointment.ophthalmologist_id,
                appointment.date,
                appointment.time,
                appointment.status
            ],
        )?;
        Ok(AppointmentId(id))
    }

    fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        self.database.query_optional(
            &format!("SELECT * FROM {} WHERE {} = ?", appointments::TABLE, appointments::ID),
            params![id],
            map_appointment,
        )
    }

    fn for_patient(&self, patient: PatientId) -> Result<Vec<AppointmentDetail>> {
        self.database.query_rows(
            &format!(
                "{} WHERE a.{} = ? ORDER BY a.{} DESC, a.{} DESC, a.{} DESC",
                appointment_detail_select(),
                appointments::PATIENT_ID,
                appointments::DATE,
                appointments::TIME,
                appointments::ID
            ),
            params![patient],
            map_appointment_detail,
        )
    }

    fn for_ophthalmologist(&self, ophthalmologist: OphthalmologistId) -> Result<Vec<AppointmentDetail>> {
        self.database.query_rows(
            &format!(
                "{} WHERE a.{} = ? ORDER BY a.{} ASC, a.{} ASC, a.{} ASC",
                appointment_detail_select(),
                appointments::OPHTHALMOLOGIST_ID,
                appointments::DATE,
                appointments::TIME,
                appointments::ID
            ),
            params![ophthalmologist],
            map_appointment_detail,
        )
    }

    fn between(&self, patient: PatientId, ophthalmologist: OphthalmologistId) -> Result<Vec<Appointment>> {
        self.database.query_rows(
            &format!(
                "SELECT * FROM {} WHERE {} = ? AND {} = ? ORDER BY {} DESC, {} DESC",
                appointments::TABLE,
                appointments::PATIENT_ID,
                appointments::OPHTHALMOLOGIST_ID,
                appointments::DATE,
                appointments::ID
            ),
            params![patient, ophthalmologist],
            map_appointment,
        )
    }

    fn update_status(
        &self,
        id: AppointmentId,
        ophthalmologist: OphthalmologistId,
        status: AppointmentStatus,
    ) -> Result<bool> {
        let changed = self.database.execute(
            &format!(
                "UPDATE {} SET {} = ? WHERE {} = ? AND {} = ?",
                appointments::TABLE,
                appointments::STATUS,
                appointments::ID,
                appointments::OPHTHALMOLOGIST_ID
            ),
            params![status, id, ophthalmologist],
        )?;
        Ok(changed > 0)
    }

    fn delete(&self, id: AppointmentId, patient: PatientId) -> Result<bool> {
        let removed = self.database.execute(
            &format!(
                "DELETE FROM {} WHERE {} = ? AND {} = ?",
                appointments::TABLE,
                appointments::ID,
                appointments::PATIENT_ID
            ),
            params![id, patient],
        )?;
        Ok(removed > 0)
    }
}

impl RecordRepository for SqliteRepository {
    fn insert(&self, record: &NewRecord) -> Result<RecordId> {
        let id = self.database.insert(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?, ?, ?)",
                records::TABLE,
                records::PATIENT_ID,
                records::OPHTHALMOLOGIST_ID,
                records::APPOINTMENT_ID,
                records::DATE,
                records::DIAGNOSIS,
                records::PRESCRIPTION,
                records::TREATMENT
            ),
            params![
                record.patient_id,
                record.ophthalmologist_id,
                record.appointment_id,
                record.date,
                record.diagnosis,
                record.prescription,
                record.treatment
            ],
        )?;
        Ok(RecordId(id))
    }

    fn latest_for_patient(&self, patient: PatientId) -> Result<Option<RecordDetail>> {
        self.database.query_optional(
            &format!(
                "{} WHERE r.{} = ? ORDER BY r.{} DESC, r.{} DESC LIMIT 1",
                record_detail_select(),
                records::PATIENT_ID,
                records::DATE,
                records::ID
            ),
            params![patient],
            map_record_detail,
        )
    }

    fn for_patient(&self, patient: PatientId) -> Result<Vec<RecordDetail>> {
        self.database.query_rows(
            &format!(
                "{} WHERE r.{} = ? ORDER BY r.{} DESC, r.{} DESC",
                record_detail_select(),
                records::PATIENT_ID,
                records::DATE,
                records::ID
            ),
            params![patient],
            map_record_detail,
        )
    }

    fn between(&self, patient: PatientId, ophthalmologist: OphthalmologistId) -> Result<Vec<RecordDetail>> {
        self.database.query_rows(
            &format!(
                "{} WHERE r.{} = ? AND r.{} = ? ORDER BY r.{} DESC, r.{} DESC",
                record_detail_select(),
                records::PATIENT_ID,
                records::OPHTHALMOLOGIST_ID,
                records::DATE,
                records::ID
            ),
            params![patient, ophthalmologist],
            map_record_detail,
        )
    }
}

impl BillRepository for SqliteRepository {
    fn insert(&self, bill: &NewBill) -> Result<BillId> {
        let id = self.database.insert(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?)",
                bills::TABLE,
                bills::PATIENT_ID,
                bills::APPOINTMENT_ID,
                bills::AMOUNT,
                bills::STATUS,
                bills::DATE
            ),
            params![bill.patient_id, bill.appointment_id, bill.amount, bill.status, bill.date],
        )?;
        Ok(BillId(id))
    }

    fn find_by_id(&self, id: BillId) -> Result<Option<Bill>> {
        self.database.query_optional(
            &format!("SELECT * FROM {} WHERE {} = ?", bills::TABLE, bills::ID),
            params![id],
            map_bill,
        )
    }

    fn for_patient(&self, patient: PatientId) -> Result<Vec<BillDetail>> {
        self.database.query_rows(
            &format!(
                "{} WHERE b.{} = ? ORDER BY b.{} DESC, b.{} DESC",
                bill_detail_select(),
                bills::PATIENT_ID,
                bills::DATE,
                bills::ID
            ),
            params![patient],
            map_bill_detail,
        )
    }

    fn for_ophthalmologist(&self, ophthalmologist: OphthalmologistId) -> Result<Vec<BillDetail>> {
        self.database.query_rows(
            &format!(
                "{} WHERE a.{} = ? ORDER BY b.{} DESC, b.{} DESC",
                bill_detail_select(),
                appointments::OPHTHALMOLOGIST_ID,
                bills::DATE,
                bills::ID
            ),
            params![ophthalmologist],
            map_bill_detail,
        )
    }

    fn update_status(&self, id: BillId, patient: PatientId, status: PaymentStatus) -> Result<bool> {
        let changed = self.database.execute(
            &format!(
                "UPDATE {} SET {} = ? WHERE {} = ? AND {} = ?",
                bills::TABLE,
                bills::STATUS,
                bills::ID,
                bills::PATIENT_ID
            ),
            params![status, id, patient],
        )?;
        Ok(changed > 0)
    }
}

impl FeedbackRepository for SqliteRepository {
    fn insert(&self, entry: &NewFeedback) -> Result<FeedbackId> {
        let id = self.database.insert(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?, ?, ?, ?, ?)",
                feedback::TABLE,
                feedback::PATIENT_ID,
                feedback::OPHTHALMOLOGIST_ID,
                feedback::RATING,
                feedback::COMMENTS,
                feedback::DATE
            ),
            params![
                entry.patient_id,
                entry.ophthalmologist_id,
                entry.rating,
                entry.comments,
                entry.date
            ],
        )?;
        Ok(FeedbackId(id))
    }

    fn for_ophthalmologist(&self, ophthalmologist: OphthalmologistId) -> Result<Vec<FeedbackDetail>> {
        self.database.query_rows(
            &format!(
                "SELECT f.*, RTRIM(p.{}) AS patient_name FROM {} f \
                 JOIN {} p ON f.{} = p.{} \
                 WHERE f.{} = ? ORDER BY f.{} DESC, f.{} DESC",
                patients::NAME,
                feedback::TABLE,
                patients::TABLE,
                feedback::PATIENT_ID,
                patients::ID,
                feedback::OPHTHALMOLOGIST_ID,
                feedback::DATE,
                feedback::ID
            ),
            params![ophthalmologist],
            map_feedback_detail,
        )
    }
}
