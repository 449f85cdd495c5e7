//! Eye Clinic - Patient and Ophthalmologist Workflows
//!
//! A Rust library for running a small ophthalmology practice on top of a
//! single SQLite database.
//!
//! # Features
//!
//! - Patient and ophthalmologist registration and login with salted credentials
//! - Appointment booking, approval, rejection and cancellation
//! - Consultation records and medical history
//! - Billing and payment
//! - Patient feedback
//! - Screen navigation with per-screen refresh hooks

/// Configuration management
pub mod config;
/// Salted password hashing
pub mod credentials;
/// Database operations and connection pooling
pub mod db;
/// Error types
pub mod error;
/// Form state and input rules per screen
pub mod forms;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Screens, refresh hooks and the navigator
pub mod navigation;
/// Repository pattern for data access
pub mod repository;
/// Database schema definitions
pub mod schema;
/// Use-case operations
pub mod service;
/// The logged-in identity
pub mod session;
/// Input validation and sanitization
pub mod validation;
/// Table rows and pick-list entries
pub mod views;

// Re-export key components for easier access
pub use credentials::PasswordHasher;
pub use db::{Database, QueryOutcome};
pub use error::{ClinicError, Result};
pub use navigation::{Navigator, Screen, ScreenData};
pub use service::ClinicService;
pub use session::{Role, Session};
