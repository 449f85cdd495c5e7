//! Who is logged in.

use std::fmt;

use serde::Serialize;

use crate::error::{ClinicError, Result};
use crate::models::{OphthalmologistId, PatientId};

/// The two kinds of account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    /// Books appointments, reads records, pays bills
    Patient,
    /// Reviews appointments, writes records, issues bills
    Ophthalmologist,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patient => f.write_str("patient"),
            Self::Ophthalmologist => f.write_str("ophthalmologist"),
        }
    }
}

/// The authenticated identity of a running instance. At most one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Session {
    /// Nobody is logged in
    #[default]
    Anonymous,
    /// A patient is logged in
    Patient(PatientId),
    /// An ophthalmologist is logged in
    Ophthalmologist(OphthalmologistId),
}

impl Session {
    /// Role of the logged-in account, if any
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::Anonymous => None,
            Self::Patient(_) => Some(Role::Patient),
            Self::Ophthalmologist(_) => Some(Role::Ophthalmologist),
        }
    }

    /// Patient id, or an error if no patient is logged in
    pub fn patient(&self) -> Result<PatientId> {
        match self {
            Self::Patient(id) => Ok(*id),
            _ => Err(ClinicError::NotAuthenticated(Role::Patient)),
        }
    }

    /// Ophthalmologist id, or an error if no ophthalmologist is logged in
    pub fn ophthalmologist(&self) -> Result<OphthalmologistId> {
        match self {
            Self::Ophthalmologist(id) => Ok(*id),
            _ => Err(ClinicError::NotAuthenticated(Role::Ophthalmologist)),
        }
    }

    /// True when nobody is logged in
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}
