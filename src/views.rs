//! Rows shown in the clinic's tables and pick lists.
//!
//! Each row carries the actions the user may take on it, so the front end
//! only renders what it is given.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::{
    AppointmentDetail, AppointmentId, AppointmentStatus, BillDetail, BillId, FeedbackDetail, FeedbackId,
    Ophthalmologist, OphthalmologistId, Patient, PatientId, PaymentStatus, Rating, RecordDetail, RecordId,
};

/// Something the user can do to an appointment row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AppointmentAction {
    /// Patient withdraws the booking
    Cancel,
    /// Ophthalmologist accepts a pending booking
    Approve,
    /// Ophthalmologist declines a pending booking
    Reject,
}

/// One line of an appointment table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentRow {
    /// Appointment id
    pub id: AppointmentId,
    /// Day
    pub date: NaiveDate,
    /// Day and slot
    pub time: NaiveDateTime,
    /// The other party: the ophthalmologist for a patient, and the reverse
    pub counterpart: String,
    /// Review state
    pub status: AppointmentStatus,
    /// Actions offered on this row
    pub actions: Vec<AppointmentAction>,
}

impl AppointmentRow {
    /// Row on a patient's history; every appointment can be cancelled
    #[must_use]
    pub fn for_patient(detail: AppointmentDetail) -> Self {
        Self {
            id: detail.appointment.id,
            date: detail.appointment.date,
            time: detail.appointment.time,
            counterpart: detail.ophthalmologist_name,
            status: detail.appointment.status,
            actions: vec![AppointmentAction::Cancel],
        }
    }

    /// Row on an ophthalmologist's review list; only pending rows can be decided
    #[must_use]
    pub fn for_ophthalmologist(detail: AppointmentDetail) -> Self {
        let actions = if detail.appointment.status == AppointmentStatus::Pending {
            vec![AppointmentAction::Approve, AppointmentAction::Reject]
        } else {
            Vec::new()
        };

        Self {
            id: detail.appointment.id,
            date: detail.appointment.date,
            time: detail.appointment.time,
            counterpart: detail.patient_name,
            status: detail.appointment.status,
            actions,
        }
    }

    /// Whether `action` is offered on this row
    #[must_use]
    pub fn offers(&self, action: AppointmentAction) -> bool {
        self.actions.contains(&action)
    }
}

/// Something the user can do to a bill row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BillAction {
    /// Patient settles the bill
    Pay,
}

/// One line of a billing table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillRow {
    /// Bill id
    pub id: BillId,
    /// Billed patient
    pub patient_name: String,
    /// Ophthalmologist who saw the billed appointment
    pub ophthalmologist_name: String,
    /// When the bill was issued
    pub date: NaiveDateTime,
    /// Amount due
    pub amount: f64,
    /// Paid or unpaid
    pub status: PaymentStatus,
    /// Actions offered on this row
    pub actions: Vec<BillAction>,
}

impl BillRow {
    /// Row on a patient's bill list; unpaid bills can be paid
    #[must_use]
    pub fn for_patient(detail: BillDetail) -> Self {
        let actions = if detail.bill.status == PaymentStatus::Unpaid {
            vec![BillAction::Pay]
        } else {
            Vec::new()
        };
        Self::with_actions(detail, actions)
    }

    /// Row on an ophthalmologist's bill list; read-only
    #[must_use]
    pub fn for_ophthalmologist(detail: BillDetail) -> Self {
        Self::with_actions(detail, Vec::new())
    }

    fn with_actions(detail: BillDetail, actions: Vec<BillAction>) -> Self {
        Self {
            id: detail.bill.id,
            patient_name: detail.patient_name,
            ophthalmologist_name: detail.ophthalmologist_name,
            date: detail.bill.date,
            amount: detail.bill.amount,
            status: detail.bill.status,
            actions,
        }
    }

    /// Whether the bill can be paid from this row
    #[must_use]
    pub fn can_pay(&self) -> bool {
        self.actions.contains(&BillAction::Pay)
    }
}

/// One consultation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRow {
    /// Record id
    pub id: RecordId,
    /// When the record was written
    pub date: NaiveDateTime,
    /// Author
    pub ophthalmologist_name: String,
    /// Diagnosis text
    pub diagnosis: String,
    /// Treatment text
    pub treatment: String,
    /// Prescription text
    pub prescription: String,
}

impl From<RecordDetail> for RecordRow {
    fn from(detail: RecordDetail) -> Self {
        Self {
            id: detail.record.id,
            date: detail.record.date,
            ophthalmologist_name: detail.ophthalmologist_name,
            diagnosis: detail.record.diagnosis,
            treatment: detail.record.treatment,
            prescription: detail.record.prescription,
        }
    }
}

/// One received feedback entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRow {
    /// Feedback id
    pub id: FeedbackId,
    /// Who wrote it
    pub patient_name: String,
    /// Score, shown as `n/5`
    pub rating: Rating,
    /// Free text
    pub comments: String,
    /// When it was submitted
    pub date: NaiveDateTime,
}

impl From<FeedbackDetail> for FeedbackRow {
    fn from(detail: FeedbackDetail) -> Self {
        Self {
            id: detail.feedback.id,
            patient_name: detail.patient_name,
            rating: detail.feedback.rating,
            comments: detail.feedback.comments,
            date: detail.feedback.date,
        }
    }
}

/// Patient entry in a pick list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientOption {
    /// Patient id
    pub id: PatientId,
    /// Right-trimmed name
    pub name: String,
}

impl From<Patient> for PatientOption {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name.trim_end().to_string(),
        }
    }
}

/// Ophthalmologist entry in a pick list, labelled "name - clinic"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OphthalmologistOption {
    /// Ophthalmologist id
    pub id: OphthalmologistId,
    /// "name - clinic"
    pub label: String,
}

impl From<Ophthalmologist> for OphthalmologistOption {
    fn from(ophthalmologist: Ophthalmologist) -> Self {
        Self {
            id: ophthalmologist.id,
            label: format!(
                "{} - {}",
                ophthalmologist.name.trim_end(),
                ophthalmologist.clinic_name.trim_end()
            ),
        }
    }
}

/// A patient who can be billed, with the appointments a bill may cover
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingCandidate {
    /// Patient id
    pub patient_id: PatientId,
    /// Right-trimmed name
    pub patient_name: String,
    /// Newest first; the first entry is the default
    pub appointment_ids: Vec<AppointmentId>,
}
