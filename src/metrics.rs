//! Metrics for database statements and clinic workflows.
//!
//! Everything goes through the `metrics` facade; nothing is exported unless
//! the embedding binary installs a recorder.

use std::time::Duration;

use metrics::{counter, histogram};

/// Counter of executed statements, labelled by kind and outcome
pub const DB_QUERIES_TOTAL: &str = "clinic_db_queries_total";
/// Histogram of statement durations in seconds
pub const DB_QUERY_DURATION: &str = "clinic_db_query_duration_seconds";
/// Counter of use-case operations, labelled by name and outcome
pub const USE_CASES_TOTAL: &str = "clinic_use_cases_total";

const fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

/// Record one database statement
pub fn record_query(kind: &'static str, duration: Duration, success: bool) {
    counter!(DB_QUERIES_TOTAL, "kind" => kind, "status" => outcome(success)).increment(1);
    histogram!(DB_QUERY_DURATION, "kind" => kind).record(duration.as_secs_f64());
}

/// Record one use-case operation such as `book_appointment`
pub fn record_use_case(name: &'static str, success: bool) {
    counter!(USE_CASES_TOTAL, "use_case" => name, "status" => outcome(success)).increment(1);
}
