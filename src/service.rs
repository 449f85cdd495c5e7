//! Use-case operations behind every screen.
//!
//! Each button on a screen maps to one method here. Methods take the
//! current [`Session`] explicitly; writes return a [`Result`] for the front
//! end to show, reads degrade to an empty list and a warning in the log.

use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::credentials::PasswordHasher;
use crate::db::Database;
use crate::error::{ClinicError, Result};
use crate::forms::{
    BillForm, BookingForm, FeedbackForm, LoginForm, OphthalmologistRegistrationForm, PatientRegistrationForm,
    RecordForm, NO_APPOINTMENT_FOR_PATIENT, NO_PATIENTS_AVAILABLE,
};
use crate::metrics;
use crate::models::{
    AppointmentId, AppointmentStatus, BillId, FeedbackId, NewBill, NewRecord, OphthalmologistId, PatientId,
    PaymentStatus, RecordId,
};
use crate::repository::{
    AppointmentRepository, BillRepository, FeedbackRepository, OphthalmologistRepository, PatientRepository,
    RecordRepository, SqliteRepository,
};
use crate::session::Session;
use crate::validation::InputValidator;
use crate::views::{
    AppointmentRow, BillRow, BillingCandidate, FeedbackRow, OphthalmologistOption, PatientOption, RecordRow,
};

/// The repositories a [`ClinicService`] works against
pub struct Repositories {
    /// Patient rows
    pub patients: Box<dyn PatientRepository>,
    /// Ophthalmologist rows
    pub ophthalmologists: Box<dyn OphthalmologistRepository>,
    /// Appointment rows
    pub appointments: Box<dyn AppointmentRepository>,
    /// Consultation records
    pub records: Box<dyn RecordRepository>,
    /// Bills
    pub bills: Box<dyn BillRepository>,
    /// Feedback
    pub feedback: Box<dyn FeedbackRepository>,
}

impl Repositories {
    /// Every repository backed by the same SQLite database
    #[must_use]
    pub fn sqlite(database: Database) -> Self {
        let repository = SqliteRepository::new(database);
        Self {
            patients: Box::new(repository.clone()),
            ophthalmologists: Box::new(repository.clone()),
            appointments: Box::new(repository.clone()),
            records: Box::new(repository.clone()),
            bills: Box::new(repository.clone()),
            feedback: Box::new(repository),
        }
    }
}

/// Clinic workflows for both roles
pub struct ClinicService {
    repositories: Repositories,
    hasher: PasswordHasher,
}

impl ClinicService {
    /// Service over the given repositories
    #[must_use]
    pub const fn new(repositories: Repositories, hasher: PasswordHasher) -> Self {
        Self { repositories, hasher }
    }

    /// Service over a SQLite database
    #[must_use]
    pub fn sqlite(database: Database, hasher: PasswordHasher) -> Self {
        Self::new(Repositories::sqlite(database), hasher)
    }

    // ----- accounts -----

    /// Register a patient. Nothing is written unless the form is valid.
    pub fn register_patient(&self, form: &PatientRegistrationForm) -> Result<PatientId> {
        track("register_patient", || {
            let patient = form.to_new_patient(&self.hasher)?;
            let id = self.repositories.patients.insert(&patient)?;
            info!(patient_id = %id, "Patient registered");
            Ok(id)
        })
    }

    /// Register an ophthalmologist
    pub fn register_ophthalmologist(&self, form: &OphthalmologistRegistrationForm) -> Result<OphthalmologistId> {
        track("register_ophthalmologist", || {
            let ophthalmologist = form.to_new_ophthalmologist(&self.hasher)?;
            let id = self.repositories.ophthalmologists.insert(&ophthalmologist)?;
            info!(ophthalmologist_id = %id, "Ophthalmologist registered");
            Ok(id)
        })
    }

    /// Log a patient in. The first account with this email whose stored
    /// credential matches becomes the session.
    pub fn login_patient(&self, form: &LoginForm) -> Result<Session> {
        track("login_patient", || {
            let (email, secret) = form.credentials()?;
            self.repositories
                .patients
                .find_by_email(email)?
                .into_iter()
                .find(|patient| self.hasher.verify(&secret, &patient.password_hash))
                .map(|patient| {
                    info!(patient_id = %patient.id, "Patient logged in");
                    Session::Patient(patient.id)
                })
                .ok_or(ClinicError::InvalidCredentials)
        })
    }

    /// Log an ophthalmologist in
    pub fn login_ophthalmologist(&self, form: &LoginForm) -> Result<Session> {
        track("login_ophthalmologist", || {
            let (email, secret) = form.credentials()?;
            self.repositories
                .ophthalmologists
                .find_by_email(email)?
                .into_iter()
                .find(|ophthalmologist| self.hasher.verify(&secret, &ophthalmologist.password_hash))
                .map(|ophthalmologist| {
                    info!(ophthalmologist_id = %ophthalmologist.id, "Ophthalmologist logged in");
                    Session::Ophthalmologist(ophthalmologist.id)
                })
                .ok_or(ClinicError::InvalidCredentials)
        })
    }

    /// Name of whoever is logged in, for the home screens
    #[must_use]
    pub fn account_name(&self, session: &Session) -> Option<String> {
        let name = match *session {
            Session::Anonymous => return None,
            Session::Patient(id) => self
                .repositories
                .patients
                .find_by_id(id)
                .map(|found| found.map(|patient| patient.name)),
            Session::Ophthalmologist(id) => self
                .repositories
                .ophthalmologists
                .find_by_id(id)
                .map(|found| found.map(|ophthalmologist| ophthalmologist.name)),
        };
        name.unwrap_or_else(|err| {
            warn!(error = %err, "Failed to load account name");
            None
        })
        .map(|name| name.trim_end().to_string())
    }

    // ----- appointments -----

    /// Every ophthalmologist, labelled "name - clinic"
    #[must_use]
    pub fn bookable_ophthalmologists(&self) -> Vec<OphthalmologistOption> {
        read_or_empty(
            "bookable_ophthalmologists",
            self.repositories
                .ophthalmologists
                .list()
                .map(|rows| rows.into_iter().map(Into::into).collect()),
        )
    }

    /// Book a pending appointment for the logged-in patient
    pub fn book_appointment(&self, session: &Session, form: &BookingForm) -> Result<AppointmentId> {
        track("book_appointment", || {
            let patient = session.patient()?;
            let appointment = form.to_new_appointment(patient, today())?;
            if self
                .repositories
                .ophthalmologists
                .find_by_id(appointment.ophthalmologist_id)?
                .is_none()
            {
                return Err(ClinicError::NotFound(format!(
                    "ophthalmologist {}",
                    appointment.ophthalmologist_id
                )));
            }

            let id = self.repositories.appointments.insert(&appointment)?;
            info!(
                appointment_id = %id,
                patient_id = %patient,
                ophthalmologist_id = %appointment.ophthalmologist_id,
                time = %appointment.time,
                "Appointment booked"
            );
            Ok(id)
        })
    }

    /// The logged-in patient's appointments, latest first
    #[must_use]
    pub fn patient_appointments(&self, session: &Session) -> Vec<AppointmentRow> {
        read_or_empty(
            "patient_appointments",
            session.patient().and_then(|patient| {
                self.repositories
                    .appointments
                    .for_patient(patient)
                    .map(|rows| rows.into_iter().map(AppointmentRow::for_patient).collect())
            }),
        )
    }

    /// Delete one of the logged-in patient's appointments
    pub fn cancel_appointment(&self, session: &Session, id: AppointmentId) -> Result<()> {
        track("cancel_appointment", || {
            let patient = session.patient()?;
            if !self.repositories.appointments.delete(id, patient)? {
                return Err(ClinicError::NotFound(format!("appointment {id}")));
            }
            info!(appointment_id = %id, patient_id = %patient, "Appointment cancelled");
            Ok(())
        })
    }

    /// The logged-in ophthalmologist's appointments, earliest first
    #[must_use]
    pub fn ophthalmologist_appointments(&self, session: &Session) -> Vec<AppointmentRow> {
        read_or_empty(
            "ophthalmologist_appointments",
            session.ophthalmologist().and_then(|ophthalmologist| {
                self.repositories
                    .appointments
                    .for_ophthalmologist(ophthalmologist)
                    .map(|rows| rows.into_iter().map(AppointmentRow::for_ophthalmologist).collect())
            }),
        )
    }

    /// Approve one of the logged-in ophthalmologist's appointments
    pub fn approve_appointment(&self, session: &Session, id: AppointmentId) -> Result<()> {
        track("approve_appointment", || {
            self.decide(session, id, AppointmentStatus::Approved)
        })
    }

    /// Reject one of the logged-in ophthalmologist's appointments
    pub fn reject_appointment(&self, session: &Session, id: AppointmentId) -> Result<()> {
        track("reject_appointment", || {
            self.decide(session, id, AppointmentStatus::Rejected)
        })
    }

    fn decide(&self, session: &Session, id: AppointmentId, status: AppointmentStatus) -> Result<()> {
        let ophthalmologist = session.ophthalmologist()?;
        let current = self
            .repositories
            .appointments
            .find_by_id(id)?
            .filter(|appointment| appointment.ophthalmologist_id == ophthalmologist)
            .ok_or_else(|| ClinicError::NotFound(format!("appointment {id}")))?;

        if current.status != AppointmentStatus::Pending && current.status != status {
            warn!(
                appointment_id = %id,
                from = %current.status,
                to = %status,
                "Changing the status of an already decided appointment"
            );
        }

        if !self.repositories.appointments.update_status(id, ophthalmologist, status)? {
            return Err(ClinicError::NotFound(format!("appointment {id}")));
        }
        info!(appointment_id = %id, status = %status, "Appointment status updated");
        Ok(())
    }

    // ----- records -----

    /// Patients who have booked with the logged-in ophthalmologist
    #[must_use]
    pub fn record_patients(&self, session: &Session) -> Vec<PatientOption> {
        read_or_empty(
            "record_patients",
            session.ophthalmologist().and_then(|ophthalmologist| {
                self.repositories
                    .patients
                    .with_appointments(ophthalmologist)
                    .map(|rows| rows.into_iter().map(Into::into).collect())
            }),
        )
    }

    /// Appointments between `patient` and the logged-in ophthalmologist, latest first
    #[must_use]
    pub fn record_appointments(&self, session: &Session, patient: PatientId) -> Vec<AppointmentId> {
        read_or_empty(
            "record_appointments",
            session.ophthalmologist().and_then(|ophthalmologist| {
                self.appointment_ids(patient, ophthalmologist)
            }),
        )
    }

    /// Write a consultation record for one of the pair's appointments
    pub fn save_record(&self, session: &Session, form: &RecordForm) -> Result<RecordId> {
        track("save_record", || {
            let ophthalmologist = session.ophthalmologist()?;
            let (patient, appointment) = form.selection()?;
            if !self.appointment_ids(patient, ophthalmologist)?.contains(&appointment) {
                return Err(ClinicError::NotFound(format!(
                    "appointment {appointment} for patient {patient}"
                )));
            }

            let record = NewRecord {
                patient_id: patient,
                ophthalmologist_id: ophthalmologist,
                appointment_id: appointment,
                date: now(),
                diagnosis: InputValidator::sanitize_text(&form.diagnosis),
                treatment: InputValidator::sanitize_text(&form.treatment),
                prescription: InputValidator::sanitize_text(&form.prescription),
            };
            let id = self.repositories.records.insert(&record)?;
            info!(record_id = %id, patient_id = %patient, appointment_id = %appointment, "Record saved");
            Ok(id)
        })
    }

    /// The logged-in patient's most recent record
    #[must_use]
    pub fn latest_record(&self, session: &Session) -> Option<RecordRow> {
        session
            .patient()
            .and_then(|patient| self.repositories.records.latest_for_patient(patient))
            .unwrap_or_else(|err| {
                warn!(view = "latest_record", error = %err, "Failed to load rows");
                None
            })
            .map(Into::into)
    }

    /// All of the logged-in patient's records, newest first
    #[must_use]
    pub fn medical_history(&self, session: &Session) -> Vec<RecordRow> {
        read_or_empty(
            "medical_history",
            session.patient().and_then(|patient| {
                self.repositories
                    .records
                    .for_patient(patient)
                    .map(|rows| rows.into_iter().map(Into::into).collect())
            }),
        )
    }

    /// Patients the logged-in ophthalmologist has written records for
    #[must_use]
    pub fn treated_patients(&self, session: &Session) -> Vec<PatientOption> {
        read_or_empty(
            "treated_patients",
            session.ophthalmologist().and_then(|ophthalmologist| {
                self.repositories
                    .patients
                    .with_records(ophthalmologist)
                    .map(|rows| rows.into_iter().map(Into::into).collect())
            }),
        )
    }

    /// Records the logged-in ophthalmologist wrote for `patient`, newest first
    #[must_use]
    pub fn patient_history_for_ophthalmologist(&self, session: &Session, patient: PatientId) -> Vec<RecordRow> {
        read_or_empty(
            "patient_history_for_ophthalmologist",
            session.ophthalmologist().and_then(|ophthalmologist| {
                self.repositories
                    .records
                    .between(patient, ophthalmologist)
                    .map(|rows| rows.into_iter().map(Into::into).collect())
            }),
        )
    }

    // ----- billing -----

    /// The logged-in patient's bills, newest first
    #[must_use]
    pub fn patient_bills(&self, session: &Session) -> Vec<BillRow> {
        read_or_empty(
            "patient_bills",
            session.patient().and_then(|patient| {
                self.repositories
                    .bills
                    .for_patient(patient)
                    .map(|rows| rows.into_iter().map(BillRow::for_patient).collect())
            }),
        )
    }

    /// Mark one of the logged-in patient's bills as paid
    pub fn pay_bill(&self, session: &Session, id: BillId) -> Result<()> {
        track("pay_bill", || {
            let patient = session.patient()?;
            let bill = self
                .repositories
                .bills
                .find_by_id(id)?
                .filter(|bill| bill.patient_id == patient)
                .ok_or_else(|| ClinicError::NotFound(format!("bill {id}")))?;
            if bill.status == PaymentStatus::Paid {
                warn!(bill_id = %id, "Bill is already paid");
            }

            if !self.repositories.bills.update_status(id, patient, PaymentStatus::Paid)? {
                return Err(ClinicError::NotFound(format!("bill {id}")));
            }
            info!(bill_id = %id, patient_id = %patient, "Bill paid");
            Ok(())
        })
    }

    /// Patients the logged-in ophthalmologist can bill, with their appointments
    #[must_use]
    pub fn billing_candidates(&self, session: &Session) -> Vec<BillingCandidate> {
        read_or_empty(
            "billing_candidates",
            session
                .ophthalmologist()
                .and_then(|ophthalmologist| self.candidates(ophthalmologist)),
        )
    }

    /// Bills for the logged-in ophthalmologist's appointments, newest first
    #[must_use]
    pub fn ophthalmologist_bills(&self, session: &Session) -> Vec<BillRow> {
        read_or_empty(
            "ophthalmologist_bills",
            session.ophthalmologist().and_then(|ophthalmologist| {
                self.repositories
                    .bills
                    .for_ophthalmologist(ophthalmologist)
                    .map(|rows| rows.into_iter().map(BillRow::for_ophthalmologist).collect())
            }),
        )
    }

    /// Issue an unpaid bill.
    ///
    /// Without a chosen patient the first candidate is billed; without a
    /// chosen appointment the patient's first listed appointment is used.
    pub fn create_bill(&self, session: &Session, form: &BillForm) -> Result<BillId> {
        track("create_bill", || {
            let ophthalmologist = session.ophthalmologist()?;
            let candidates = self.candidates(ophthalmologist)?;
            if candidates.is_empty() {
                return Err(ClinicError::NoSelection(NO_PATIENTS_AVAILABLE));
            }
            let amount = InputValidator::bill_amount(&form.amount)?;

            let candidate = match form.patient_id {
                Some(patient) => candidates
                    .iter()
                    .find(|candidate| candidate.patient_id == patient)
                    .ok_or_else(|| ClinicError::NotFound(format!("patient {patient}")))?,
                None => &candidates[0],
            };
            let appointment = match form.appointment_id {
                Some(id) => candidate.appointment_ids.contains(&id).then_some(id),
                None => candidate.appointment_ids.first().copied(),
            }
            .ok_or(ClinicError::NoSelection(NO_APPOINTMENT_FOR_PATIENT))?;

            if self
                .repositories
                .bills
                .for_ophthalmologist(ophthalmologist)?
                .iter()
                .any(|existing| existing.bill.appointment_id == appointment)
            {
                warn!(appointment_id = %appointment, "Appointment already has a bill");
            }

            let bill = NewBill {
                patient_id: candidate.patient_id,
                appointment_id: appointment,
                amount,
                status: PaymentStatus::Unpaid,
                date: now(),
            };
            let id = self.repositories.bills.insert(&bill)?;
            info!(bill_id = %id, patient_id = %bill.patient_id, amount, "Bill created");
            Ok(id)
        })
    }

    // ----- feedback -----

    /// Ophthalmologists the logged-in patient has had appointments with
    #[must_use]
    pub fn feedback_targets(&self, session: &Session) -> Vec<OphthalmologistOption> {
        read_or_empty(
            "feedback_targets",
            session.patient().and_then(|patient| {
                self.repositories
                    .ophthalmologists
                    .seen_by(patient)
                    .map(|rows| rows.into_iter().map(Into::into).collect())
            }),
        )
    }

    /// Rate one of the ophthalmologists the logged-in patient has had
    /// appointments with
    pub fn submit_feedback(&self, session: &Session, form: &FeedbackForm) -> Result<FeedbackId> {
        track("submit_feedback", || {
            let patient = session.patient()?;
            let feedback = form.to_new_feedback(patient, now())?;
            if !self
                .repositories
                .ophthalmologists
                .seen_by(patient)?
                .iter()
                .any(|seen| seen.id == feedback.ophthalmologist_id)
            {
                return Err(ClinicError::NotFound(format!(
                    "ophthalmologist {} among those who saw patient {patient}",
                    feedback.ophthalmologist_id
                )));
            }

            let id = self.repositories.feedback.insert(&feedback)?;
            info!(
                feedback_id = %id,
                ophthalmologist_id = %feedback.ophthalmologist_id,
                rating = feedback.rating.value(),
                "Feedback submitted"
            );
            Ok(id)
        })
    }

    /// Feedback the logged-in ophthalmologist has received, newest first
    #[must_use]
    pub fn received_feedback(&self, session: &Session) -> Vec<FeedbackRow> {
        read_or_empty(
            "received_feedback",
            session.ophthalmologist().and_then(|ophthalmologist| {
                self.repositories
                    .feedback
                    .for_ophthalmologist(ophthalmologist)
                    .map(|rows| rows.into_iter().map(Into::into).collect())
            }),
        )
    }

    fn appointment_ids(&self, patient: PatientId, ophthalmologist: OphthalmologistId) -> Result<Vec<AppointmentId>> {
        Ok(self
            .repositories
            .appointments
            .between(patient, ophthalmologist)?
            .into_iter()
            .map(|appointment| appointment.id)
            .collect())
    }

    fn candidates(&self, ophthalmologist: OphthalmologistId) -> Result<Vec<BillingCandidate>> {
        self.repositories
            .patients
            .with_appointments(ophthalmologist)?
            .into_iter()
            .map(|patient| {
                Ok(BillingCandidate {
                    patient_id: patient.id,
                    appointment_ids: self.appointment_ids(patient.id, ophthalmologist)?,
                    patient_name: patient.name.trim_end().to_string(),
                })
            })
            .collect()
    }
}

/// Run a use case, logging and counting its outcome
fn track<T>(use_case: &'static str, op: impl FnOnce() -> Result<T>) -> Result<T> {
    let result = op();
    match &result {
        Ok(_) => debug!(use_case, "Use case succeeded"),
        Err(err) => warn!(use_case, error = %err, "Use case failed"),
    }
    metrics::record_use_case(use_case, result.is_ok());
    result
}

fn read_or_empty<T>(view: &'static str, rows: Result<Vec<T>>) -> Vec<T> {
    rows.unwrap_or_else(|err| {
        warn!(view, error = %err, "Failed to load rows");
        Vec::new()
    })
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Appointment, Gender, NewPatient, Patient};
    use crate::repository::{
        MockAppointmentRepository, MockBillRepository, MockFeedbackRepository, MockOphthalmologistRepository,
        MockPatientRepository, MockRecordRepository,
    };
    use crate::validation::{Field, ValidationError};
    use mockall::predicate::eq;

    const FAST: PasswordHasher = PasswordHasher::new(1_000);

    #[derive(Default)]
    struct Mocks {
        patients: MockPatientRepository,
        ophthalmologists: MockOphthalmologistRepository,
        appointments: MockAppointmentRepository,
        records: MockRecordRepository,
        bills: MockBillRepository,
        feedback: MockFeedbackRepository,
    }

    impl Mocks {
        fn into_service(self) -> ClinicService {
            ClinicService::new(
                Repositories {
                    patients: Box::new(self.patients),
                    ophthalmologists: Box::new(self.ophthalmologists),
                    appointments: Box::new(self.appointments),
                    records: Box::new(self.records),
                    bills: Box::new(self.bills),
                    feedback: Box::new(self.feedback),
                },
                FAST,
            )
        }
    }

    fn registration() -> PatientRegistrationForm {
        PatientRegistrationForm {
            name: "Ana Ruiz".to_string(),
            gender: Gender::Female,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 2).unwrap(),
            email: "ana@example.com".to_string(),
            phone: String::new(),
            password: "1234".to_string(),
            confirm_password: "1234".to_string(),
        }
    }

    fn patient(id: i64, password: &str) -> Patient {
        Patient {
            id: PatientId(id),
            name: "Ana Ruiz".to_string(),
            gender: Gender::Female,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 2).unwrap(),
            email: "ana@example.com".to_string(),
            phone: 0,
            password_hash: FAST.hash(password),
        }
    }

    #[test]
    fn mismatched_passwords_never_insert() {
        let mut mocks = Mocks::default();
        mocks.patients.expect_insert().never();
        let service = mocks.into_service();

        let form = PatientRegistrationForm {
            confirm_password: "4321".to_string(),
            ..registration()
        };
        let err = service.register_patient(&form).unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match!");
    }

    #[test]
    fn non_numeric_phone_never_inserts() {
        let mut mocks = Mocks::default();
        mocks.patients.expect_insert().never();
        let service = mocks.into_service();

        let form = PatientRegistrationForm {
            phone: "555-0100".to_string(),
            ..registration()
        };
        assert!(matches!(
            service.register_patient(&form),
            Err(ClinicError::Validation(ValidationError::NotNumeric(Field::Phone)))
        ));
    }

    #[test]
    fn valid_registration_inserts_hashed_credential() {
        let mut mocks = Mocks::default();
        mocks
            .patients
            .expect_insert()
            .withf(|new: &NewPatient| new.phone == 0 && FAST.verify("1234", &new.password_hash))
            .times(1)
            .returning(|_| Ok(PatientId(7)));
        let service = mocks.into_service();

        assert_eq!(service.register_patient(&registration()).unwrap(), PatientId(7));
    }

    #[test]
    fn login_picks_the_candidate_whose_password_verifies() {
        let mut mocks = Mocks::default();
        mocks
            .patients
            .expect_find_by_email()
            .withf(|email| email.to_string() == "ana@example.com")
            .returning(|_| Ok(vec![patient(1, "1111"), patient(2, "2222")]));
        let service = mocks.into_service();

        let form = LoginForm {
            email: "ana@example.com ".to_string(),
            password: "2222".to_string(),
        };
        assert_eq!(service.login_patient(&form).unwrap(), Session::Patient(PatientId(2)));
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        let mut mocks = Mocks::default();
        mocks
            .patients
            .expect_find_by_email()
            .returning(|_| Ok(vec![patient(1, "1111")]));
        let service = mocks.into_service();

        let form = LoginForm {
            email: "ana@example.com".to_string(),
            password: "9999".to_string(),
        };
        assert!(matches!(service.login_patient(&form), Err(ClinicError::InvalidCredentials)));
    }

    #[test]
    fn non_numeric_login_runs_no_query() {
        let mut mocks = Mocks::default();
        mocks.ophthalmologists.expect_find_by_email().never();
        let service = mocks.into_service();

        let form = LoginForm {
            email: "lee@clinic.test".to_string(),
            password: "secret".to_string(),
        };
        assert_eq!(
            service.login_ophthalmologist(&form).unwrap_err().to_string(),
            "Password must be numeric!"
        );
    }

    #[test]
    fn booking_requires_a_patient_session() {
        let mut mocks = Mocks::default();
        mocks.appointments.expect_insert().never();
        let service = mocks.into_service();

        let form = BookingForm {
            ophthalmologist_id: Some(OphthalmologistId(1)),
            date: today(),
            slot: crate::models::TimeSlot::TenAm,
        };
        let session = Session::Ophthalmologist(OphthalmologistId(1));
        assert!(matches!(
            service.book_appointment(&session, &form),
            Err(ClinicError::NotAuthenticated(_))
        ));
    }

    #[test]
    fn cancelling_someone_elses_appointment_is_not_found() {
        let mut mocks = Mocks::default();
        mocks
            .appointments
            .expect_delete()
            .with(eq(AppointmentId(5)), eq(PatientId(1)))
            .returning(|_, _| Ok(false));
        let service = mocks.into_service();

        let session = Session::Patient(PatientId(1));
        assert!(matches!(
            service.cancel_appointment(&session, AppointmentId(5)),
            Err(ClinicError::NotFound(_))
        ));
    }

    #[test]
    fn approving_updates_status_for_own_appointment() {
        let date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let mut mocks = Mocks::default();
        mocks.appointments.expect_find_by_id().returning(move |id| {
            Ok(Some(Appointment {
                id,
                patient_id: PatientId(1),
                ophthalmologist_id: OphthalmologistId(4),
                date,
                time: date.and_hms_opt(10, 0, 0).unwrap(),
                status: AppointmentStatus::Pending,
            }))
        });
        mocks
            .appointments
            .expect_update_status()
            .with(eq(AppointmentId(3)), eq(OphthalmologistId(4)), eq(AppointmentStatus::Approved))
            .times(1)
            .returning(|_, _, _| Ok(true));
        let service = mocks.into_service();

        let session = Session::Ophthalmologist(OphthalmologistId(4));
        service.approve_appointment(&session, AppointmentId(3)).unwrap();

        let other = Session::Ophthalmologist(OphthalmologistId(9));
        assert!(matches!(
            service.reject_appointment(&other, AppointmentId(3)),
            Err(ClinicError::NotFound(_))
        ));
    }

    #[test]
    fn billing_without_candidates_reports_no_patients() {
        let mut mocks = Mocks::default();
        mocks.patients.expect_with_appointments().returning(|_| Ok(Vec::new()));
        mocks.bills.expect_insert().never();
        let service = mocks.into_service();

        let form = BillForm {
            amount: "not a number".to_string(),
            ..BillForm::default()
        };
        let session = Session::Ophthalmologist(OphthalmologistId(4));
        assert_eq!(
            service.create_bill(&session, &form).unwrap_err().to_string(),
            NO_PATIENTS_AVAILABLE
        );
    }

    #[test]
    fn billing_checks_amount_before_appointment() {
        let mut mocks = Mocks::default();
        mocks
            .patients
            .expect_with_appointments()
            .returning(|_| Ok(vec![patient(1, "1")]));
        mocks.appointments.expect_between().returning(|_, _| Ok(Vec::new()));
        mocks.bills.expect_insert().never();
        let service = mocks.into_service();
        let session = Session::Ophthalmologist(OphthalmologistId(4));

        let bad_amount = BillForm {
            amount: "abc".to_string(),
            ..BillForm::default()
        };
        assert_eq!(
            service.create_bill(&session, &bad_amount).unwrap_err().to_string(),
            "Invalid amount!"
        );

        let no_appointment = BillForm {
            amount: "80".to_string(),
            ..BillForm::default()
        };
        assert_eq!(
            service.create_bill(&session, &no_appointment).unwrap_err().to_string(),
            NO_APPOINTMENT_FOR_PATIENT
        );
    }

    #[test]
    fn failed_reads_become_empty_lists() {
        let mut mocks = Mocks::default();
        mocks
            .bills
            .expect_for_patient()
            .returning(|_| Err(ClinicError::NotFound("boom".to_string())));
        let service = mocks.into_service();

        assert!(service.patient_bills(&Session::Patient(PatientId(1))).is_empty());
        assert!(service.patient_bills(&Session::Anonymous).is_empty());
    }
}
