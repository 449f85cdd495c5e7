//! Database schema definitions
//!
//! Table and column names used with rusqlite. The DDL itself lives in
//! `migrations/` and is applied by [`crate::db::Database::new`].

/// Patients table schema
pub mod patients {
    /// Table name
    pub const TABLE: &str = "Patient";
    /// Primary key column
    pub const ID: &str = "patient_id";
    /// Full name column
    pub const NAME: &str = "name";
    /// Gender column (Male, Female, Other)
    pub const GENDER: &str = "gender";
    /// Date of birth column
    pub const DATE_OF_BIRTH: &str = "date_of_birth";
    /// Email address column, also the login key
    pub const EMAIL: &str = "email";
    /// Phone number column, stored as an integer
    pub const PHONE: &str = "phonenumber";
    /// Salted password hash column
    pub const PASSWORD_HASH: &str = "password_hash";
}

/// Ophthalmologists table schema
pub mod ophthalmologists {
    /// Table name
    pub const TABLE: &str = "Ophthalmologist";
    /// Primary key column
    pub const ID: &str = "ophthalmologist_id";
    /// Full name column
    pub const NAME: &str = "name";
    /// Email address column, also the login key
    pub const EMAIL: &str = "email";
    /// Phone number column, stored as an integer
    pub const PHONE: &str = "phonenumber";
    /// Clinic name column
    pub const CLINIC_NAME: &str = "clinicname";
    /// Clinic address column
    pub const CLINIC_ADDRESS: &str = "clinicaddress";
    /// Salted password hash column
    pub const PASSWORD_HASH: &str = "password_hash";
}

/// Appointments table schema
pub mod appointments {
    /// Table name
    pub const TABLE: &str = "Appointment";
    /// Primary key column
    pub const ID: &str = "appointment_id";
    /// Foreign key to the patients table
    pub const PATIENT_ID: &str = "patient_id";
    /// Foreign key to the ophthalmologists table
    pub const OPHTHALMOLOGIST_ID: &str = "ophthalmologist_id";
    /// Calendar day of the appointment
    pub const DATE: &str = "appointment_date";
    /// Full timestamp (day plus slot time)
    pub const TIME: &str = "appointment_time";
    /// Status code: 0 pending, 1 approved, 2 rejected
    pub const STATUS: &str = "appointment_status";
}

/// Patient records table schema
pub mod records {
    /// Table name
    pub const TABLE: &str = "Patient_Record";
    /// Primary key column
    pub const ID: &str = "record_id";
    /// Foreign key to the patients table
    pub const PATIENT_ID: &str = "patient_id";
    /// Foreign key to the ophthalmologists table
    pub const OPHTHALMOLOGIST_ID: &str = "ophthalmologist_id";
    /// Foreign key to the appointments table
    pub const APPOINTMENT_ID: &str = "appointment_id";
    /// Timestamp when the record was written
    pub const DATE: &str = "record_date";
    /// Diagnosis column
    pub const DIAGNOSIS: &str = "diagnosis";
    /// Prescription column
    pub const PRESCRIPTION: &str = "prescription";
    /// Treatment plan column
    pub const TREATMENT: &str = "treatment_details";
}

/// Bills table schema
pub mod bills {
    /// Table name
    pub const TABLE: &str = "Bill";
    /// Primary key column
    pub const ID: &str = "bill_id";
    /// Foreign key to the patients table
    pub const PATIENT_ID: &str = "patient_id";
    /// Foreign key to the appointments table
    pub const APPOINTMENT_ID: &str = "appointment_id";
    /// Amount due
    pub const AMOUNT: &str = "amount";
    /// Status code: 0 unpaid, 1 paid
    pub const STATUS: &str = "payment_status";
    /// Timestamp the bill was issued
    pub const DATE: &str = "payment_date";
}

/// Feedback table schema
pub mod feedback {
    /// Table name
    pub const TABLE: &str = "Feedback";
    /// Primary key column
    pub const ID: &str = "feedback_id";
    /// Foreign key to the patients table
    pub const PATIENT_ID: &str = "patient_id";
    /// Foreign key to the ophthalmologists table
    pub const OPHTHALMOLOGIST_ID: &str = "ophthalmologist_id";
    /// Rating from 1 to 5
    pub const RATING: &str = "rating";
    /// Free-text comments
    pub const COMMENTS: &str = "comments";
    /// Timestamp of submission
    pub const DATE: &str = "feedback_date";
}
