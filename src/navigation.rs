//! Screen switching and the logged-in session.
//!
//! The [`Navigator`] owns the service and the session. Opening a screen runs
//! its refresh hook, if it has one, and keeps the loaded rows until the next
//! reload.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ClinicError, Result};
use crate::forms::{BookingForm, FeedbackForm, LoginForm, OphthalmologistRegistrationForm, PatientRegistrationForm};
use crate::models::{AppointmentId, FeedbackId, OphthalmologistId, PatientId};
use crate::service::ClinicService;
use crate::session::{Role, Session};
use crate::views::{
    AppointmentRow, BillRow, BillingCandidate, FeedbackRow, OphthalmologistOption, PatientOption, RecordRow,
};

/// Every screen of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Screen {
    /// Start screen with the login and registration choices
    Initial,
    /// Patient sign-up form
    PatientRegistration,
    /// Ophthalmologist sign-up form
    OphthalmologistRegistration,
    /// Patient login form
    PatientLogin,
    /// Ophthalmologist login form
    OphthalmologistLogin,
    /// Patient menu
    PatientHome,
    /// Ophthalmologist menu
    OphthalmologistHome,
    /// Booking form with the ophthalmologist list
    BookAppointment,
    /// Appointments to review
    OphthalmologistAppointments,
    /// The patient's appointments
    AppointmentHistory,
    /// Consultation record form
    AddRecord,
    /// The patient's most recent record
    PatientLatestRecord,
    /// All of the patient's records
    PatientMedicalHistory,
    /// Records written for a chosen patient
    OphthalmologistMedicalHistory,
    /// The patient's bills
    PatientBilling,
    /// Bill creation and issued bills
    OphthalmologistBilling,
    /// Feedback form
    PatientFeedback,
    /// Received feedback
    OphthalmologistFeedback,
}

impl Screen {
    /// All screens in menu order
    pub const ALL: [Self; 18] = [
        Self::Initial,
        Self::PatientRegistration,
        Self::OphthalmologistRegistration,
        Self::PatientLogin,
        Self::OphthalmologistLogin,
        Self::PatientHome,
        Self::OphthalmologistHome,
        Self::BookAppointment,
        Self::OphthalmologistAppointments,
        Self::AppointmentHistory,
        Self::AddRecord,
        Self::PatientLatestRecord,
        Self::PatientMedicalHistory,
        Self::OphthalmologistMedicalHistory,
        Self::PatientBilling,
        Self::OphthalmologistBilling,
        Self::PatientFeedback,
        Self::OphthalmologistFeedback,
    ];

    /// Command-line name, e.g. `book-appointment`
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::PatientRegistration => "patient-registration",
            Self::OphthalmologistRegistration => "ophthalmologist-registration",
            Self::PatientLogin => "patient-login",
            Self::OphthalmologistLogin => "ophthalmologist-login",
            Self::PatientHome => "patient-home",
            Self::OphthalmologistHome => "ophthalmologist-home",
            Self::BookAppointment => "book-appointment",
            Self::OphthalmologistAppointments => "ophthalmologist-appointments",
            Self::AppointmentHistory => "appointment-history",
            Self::AddRecord => "add-record",
            Self::PatientLatestRecord => "patient-latest-record",
            Self::PatientMedicalHistory => "patient-medical-history",
            Self::OphthalmologistMedicalHistory => "ophthalmologist-medical-history",
            Self::PatientBilling => "patient-billing",
            Self::OphthalmologistBilling => "ophthalmologist-billing",
            Self::PatientFeedback => "patient-feedback",
            Self::OphthalmologistFeedback => "ophthalmologist-feedback",
        }
    }

    /// Role a session needs to open this screen; `None` for the public screens
    #[must_use]
    pub const fn required_role(self) -> Option<Role> {
        match self {
            Self::Initial
            | Self::PatientRegistration
            | Self::OphthalmologistRegistration
            | Self::PatientLogin
            | Self::OphthalmologistLogin => None,
            Self::PatientHome
            | Self::BookAppointment
            | Self::AppointmentHistory
            | Self::PatientLatestRecord
            | Self::PatientMedicalHistory
            | Self::PatientBilling
            | Self::PatientFeedback => Some(Role::Patient),
            Self::OphthalmologistHome
            | Self::OphthalmologistAppointments
            | Self::AddRecord
            | Self::OphthalmologistMedicalHistory
            | Self::OphthalmologistBilling
            | Self::OphthalmologistFeedback => Some(Role::Ophthalmologist),
        }
    }

    /// Home screen for a role
    #[must_use]
    pub const fn home(role: Role) -> Self {
        match role {
            Role::Patient => Self::PatientHome,
            Role::Ophthalmologist => Self::OphthalmologistHome,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Screen {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|screen| screen.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ClinicError::NotFound(format!("screen {wanted}")))
    }
}

/// Rows loaded by a screen's refresh hook
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum ScreenData {
    /// Screen has nothing to load
    #[default]
    Empty,
    /// Ophthalmologist pick list
    Ophthalmologists(Vec<OphthalmologistOption>),
    /// Appointment table
    Appointments(Vec<AppointmentRow>),
    /// Patient pick list
    Patients(Vec<PatientOption>),
    /// Single most recent record, if any
    LatestRecord(Option<RecordRow>),
    /// Record table
    Records(Vec<RecordRow>),
    /// Patient bill table
    Bills(Vec<BillRow>),
    /// Ophthalmologist billing: who can be billed and what was billed
    Billing {
        /// Patients with appointments to bill
        candidates: Vec<BillingCandidate>,
        /// Bills already issued
        bills: Vec<BillRow>,
    },
    /// Received feedback table
    Feedback(Vec<FeedbackRow>),
}

/// Loads a screen's rows for the current session
pub type RefreshHook = fn(&ClinicService, &Session) -> ScreenData;

fn refresh_hooks() -> HashMap<Screen, RefreshHook> {
    let mut hooks: HashMap<Screen, RefreshHook> = HashMap::new();
    hooks.insert(Screen::BookAppointment, |service, _| {
        ScreenData::Ophthalmologists(service.bookable_ophthalmologists())
    });
    hooks.insert(Screen::OphthalmologistAppointments, |service, session| {
        ScreenData::Appointments(service.ophthalmologist_appointments(session))
    });
    hooks.insert(Screen::AppointmentHistory, |service, session| {
        ScreenData::Appointments(service.patient_appointments(session))
    });
    hooks.insert(Screen::AddRecord, |service, session| {
        ScreenData::Patients(service.record_patients(session))
    });
    hooks.insert(Screen::PatientLatestRecord, |service, session| {
        ScreenData::LatestRecord(service.latest_record(session))
    });
    hooks.insert(Screen::PatientMedicalHistory, |service, session| {
        ScreenData::Records(service.medical_history(session))
    });
    hooks.insert(Screen::OphthalmologistMedicalHistory, |service, session| {
        ScreenData::Patients(service.treated_patients(session))
    });
    hooks.insert(Screen::PatientBilling, |service, session| {
        ScreenData::Bills(service.patient_bills(session))
    });
    hooks.insert(Screen::OphthalmologistBilling, |service, session| ScreenData::Billing {
        candidates: service.billing_candidates(session),
        bills: service.ophthalmologist_bills(session),
    });
    hooks.insert(Screen::PatientFeedback, |service, session| {
        ScreenData::Ophthalmologists(service.feedback_targets(session))
    });
    hooks.insert(Screen::OphthalmologistFeedback, |service, session| {
        ScreenData::Feedback(service.received_feedback(session))
    });
    hooks
}

/// Holds the session and the current screen, and dispatches between screens
pub struct Navigator {
    service: ClinicService,
    session: Session,
    current: Screen,
    data: ScreenData,
    hooks: HashMap<Screen, RefreshHook>,
}

impl Navigator {
    /// Start anonymous on the initial screen
    #[must_use]
    pub fn new(service: ClinicService) -> Self {
        Self {
            service,
            session: Session::Anonymous,
            current: Screen::Initial,
            data: ScreenData::Empty,
            hooks: refresh_hooks(),
        }
    }

    /// Open `screen`. Fails, leaving the current screen as it was, when the
    /// session's role may not open it.
    pub fn navigate(&mut self, screen: Screen) -> Result<()> {
        if let Some(role) = screen.required_role() {
            if self.session.role() != Some(role) {
                return Err(ClinicError::NotAuthenticated(role));
            }
        }

        self.data = self.load(screen);
        debug!(from = %self.current, to = %screen, "Switching screen");
        self.current = screen;
        Ok(())
    }

    /// Run the current screen's refresh hook again
    pub fn reload(&mut self) {
        self.data = self.load(self.current);
    }

    fn load(&self, screen: Screen) -> ScreenData {
        self.hooks
            .get(&screen)
            .map_or(ScreenData::Empty, |hook| hook(&self.service, &self.session))
    }

    /// Forget the session and go back to the initial screen
    pub fn logout(&mut self) {
        if let Some(role) = self.session.role() {
            info!(%role, "Logged out");
        }
        self.session = Session::Anonymous;
        self.current = Screen::Initial;
        self.data = ScreenData::Empty;
    }

    /// Log a patient in and open the patient home screen
    pub fn login_patient(&mut self, form: &LoginForm) -> Result<()> {
        self.session = self.service.login_patient(form)?;
        self.navigate(Screen::PatientHome)
    }

    /// Log an ophthalmologist in and open the ophthalmologist home screen
    pub fn login_ophthalmologist(&mut self, form: &LoginForm) -> Result<()> {
        self.session = self.service.login_ophthalmologist(form)?;
        self.navigate(Screen::OphthalmologistHome)
    }

    /// Register a patient and return to the initial screen
    pub fn register_patient(&mut self, form: &PatientRegistrationForm) -> Result<PatientId> {
        let id = self.service.register_patient(form)?;
        self.navigate(Screen::Initial)?;
        Ok(id)
    }

    /// Register an ophthalmologist and return to the initial screen
    pub fn register_ophthalmologist(&mut self, form: &OphthalmologistRegistrationForm) -> Result<OphthalmologistId> {
        let id = self.service.register_ophthalmologist(form)?;
        self.navigate(Screen::Initial)?;
        Ok(id)
    }

    /// Book an appointment and return to the patient home screen
    pub fn book_appointment(&mut self, form: &BookingForm) -> Result<AppointmentId> {
        let id = self.service.book_appointment(&self.session, form)?;
        self.navigate(Screen::PatientHome)?;
        Ok(id)
    }

    /// Submit feedback and return to the patient home screen
    pub fn submit_feedback(&mut self, form: &FeedbackForm) -> Result<FeedbackId> {
        let id = self.service.submit_feedback(&self.session, form)?;
        self.navigate(Screen::PatientHome)?;
        Ok(id)
    }

    /// Run a use case with the current session, then reload the current
    /// screen if it succeeded
    pub fn perform<T>(&mut self, op: impl FnOnce(&ClinicService, &Session) -> Result<T>) -> Result<T> {
        let outcome = op(&self.service, &self.session)?;
        self.reload();
        Ok(outcome)
    }

    /// Run a read-only query with the current session
    pub fn query<T>(&self, op: impl FnOnce(&ClinicService, &Session) -> T) -> T {
        op(&self.service, &self.session)
    }

    /// Who is logged in
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The screen currently shown
    #[must_use]
    pub const fn current(&self) -> Screen {
        self.current
    }

    /// Rows loaded for the current screen
    #[must_use]
    pub const fn data(&self) -> &ScreenData {
        &self.data
    }

    /// Whether `screen` loads rows when opened
    #[must_use]
    pub fn has_refresh_hook(&self, screen: Screen) -> bool {
        self.hooks.contains_key(&screen)
    }
}
