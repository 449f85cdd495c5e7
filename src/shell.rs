//! Interactive front end driving the [`Navigator`] from text commands.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use eye_clinic::forms::{
    BillForm, BookingForm, FeedbackForm, LoginForm, OphthalmologistRegistrationForm, PatientRegistrationForm,
    RecordForm,
};
use eye_clinic::models::{AppointmentId, BillId, Gender, OphthalmologistId, PatientId, Rating, TimeSlot};
use eye_clinic::views::{AppointmentRow, BillRow};
use eye_clinic::{Navigator, Screen, ScreenData};
use rusqlite::types::Value;
use tracing::debug;

const PROMPT: &str = "clinic> ";

#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Patient,
    Ophthalmologist,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Open a screen by name
    Go { screen: Screen },
    /// List every screen
    Screens,
    /// Redraw the current screen
    Show {
        /// Print the loaded rows as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Log in and open the home screen
    Login {
        #[arg(value_enum)]
        role: RoleArg,
        email: String,
        password: String,
    },
    /// Log out and return to the initial screen
    Logout,
    /// Create a patient account
    RegisterPatient {
        #[arg(long)]
        name: String,
        #[arg(long)]
        gender: Gender,
        /// Date of birth, YYYY-MM-DD
        #[arg(long)]
        dob: NaiveDate,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Create an ophthalmologist account
    RegisterOphthalmologist {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        clinic: String,
        #[arg(long, default_value = "")]
        address: String,
    },
    /// Book an appointment
    Book {
        #[arg(long)]
        ophthalmologist: Option<OphthalmologistId>,
        /// Day, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Slot such as "02:00 PM" or 14:00
        #[arg(long)]
        slot: TimeSlot,
    },
    /// Cancel one of your appointments
    Cancel { appointment: AppointmentId },
    /// Approve a pending appointment
    Approve { appointment: AppointmentId },
    /// Reject a pending appointment
    Reject { appointment: AppointmentId },
    /// List a patient's appointments with you
    AppointmentsFor { patient: PatientId },
    /// Write a consultation record
    Record {
        #[arg(long)]
        patient: Option<PatientId>,
        #[arg(long)]
        appointment: Option<AppointmentId>,
        #[arg(long, default_value = "")]
        diagnosis: String,
        #[arg(long, default_value = "")]
        treatment: String,
        #[arg(long, default_value = "")]
        prescription: String,
    },
    /// Show the records you wrote for a patient
    History { patient: PatientId },
    /// Issue a bill
    Bill {
        #[arg(long)]
        patient: Option<PatientId>,
        #[arg(long)]
        appointment: Option<AppointmentId>,
        #[arg(long)]
        amount: String,
    },
    /// Pay one of your bills
    Pay { bill: BillId },
    /// Rate an ophthalmologist
    Feedback {
        #[arg(long)]
        ophthalmologist: Option<OphthalmologistId>,
        /// Option number from the list, 0 for "5 - Excellent"
        #[arg(long, default_value_t = 0)]
        rating: usize,
        #[arg(long, default_value = "")]
        comments: String,
    },
    /// Leave the shell
    #[command(alias = "quit")]
    Exit,
}

enum Flow {
    Continue,
    Exit,
}

/// Reads commands line by line and renders the navigator's screens
pub(crate) struct Shell {
    navigator: Navigator,
}

impl Shell {
    pub(crate) const fn new(navigator: Navigator) -> Self {
        Self { navigator }
    }

    /// Run until `exit` or end of input
    pub(crate) fn run(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        render(&self.navigator, out)?;
        write!(out, "{PROMPT}")?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            let tokens = tokenize(&line);
            if !tokens.is_empty() {
                match ShellLine::try_parse_from(&tokens) {
                    Ok(parsed) => {
                        if matches!(self.execute(parsed.command, out)?, Flow::Exit) {
                            break;
                        }
                    }
                    Err(err) => write!(out, "{err}")?,
                }
            }
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn execute(&mut self, command: ShellCommand, out: &mut impl Write) -> io::Result<Flow> {
        let navigator = &mut self.navigator;
        let outcome = match command {
            ShellCommand::Exit => return Ok(Flow::Exit),
            ShellCommand::Screens => {
                for screen in Screen::ALL {
                    writeln!(out, "  {screen}")?;
                }
                return Ok(Flow::Continue);
            }
            ShellCommand::Show { json: true } => {
                writeln!(out, "{}", serde_json::to_string_pretty(navigator.data())?)?;
                return Ok(Flow::Continue);
            }
            ShellCommand::Show { json: false } => Ok(None),
            ShellCommand::Go { screen } => navigator.navigate(screen).map(|()| None),
            ShellCommand::Logout => {
                navigator.logout();
                Ok(None)
            }
            ShellCommand::Login { role, email, password } => {
                let form = LoginForm { email, password };
                let logged_in = match role {
                    RoleArg::Patient => navigator.login_patient(&form),
                    RoleArg::Ophthalmologist => navigator.login_ophthalmologist(&form),
                };
                logged_in.map(|()| None)
            }
            ShellCommand::RegisterPatient {
                name,
                gender,
                dob,
                email,
                phone,
                password,
                confirm,
            } => navigator
                .register_patient(&PatientRegistrationForm {
                    name,
                    gender,
                    date_of_birth: dob,
                    email,
                    phone,
                    password,
                    confirm_password: confirm,
                })
                .map(|id| Some(format!("Patient registered (id {id})"))),
            ShellCommand::RegisterOphthalmologist {
                name,
                email,
                phone,
                password,
                clinic,
                address,
            } => navigator
                .register_ophthalmologist(&OphthalmologistRegistrationForm {
                    name,
                    email,
                    phone,
                    password,
                    clinic_name: clinic,
                    clinic_address: address,
                })
                .map(|id| Some(format!("Ophthalmologist registered (id {id})"))),
            ShellCommand::Book {
                ophthalmologist,
                date,
                slot,
            } => {
                let form = BookingForm {
                    ophthalmologist_id: ophthalmologist,
                    date,
                    slot,
                };
                navigator
                    .book_appointment(&form)
                    .map(|id| Some(format!("Appointment booked (id {id})")))
            }
            ShellCommand::Cancel { appointment } => navigator
                .perform(|service, session| service.cancel_appointment(session, appointment))
                .map(|()| Some("Appointment cancelled".to_string())),
            ShellCommand::Approve { appointment } => navigator
                .perform(|service, session| service.approve_appointment(session, appointment))
                .map(|()| Some("Appointment approved".to_string())),
            ShellCommand::Reject { appointment } => navigator
                .perform(|service, session| service.reject_appointment(session, appointment))
                .map(|()| Some("Appointment rejected".to_string())),
            ShellCommand::AppointmentsFor { patient } => {
                let ids = navigator.query(|service, session| service.record_appointments(session, patient));
                let listed = ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
                Ok(Some(format!("Appointments: {}", or_none(&listed))))
            }
            ShellCommand::Record {
                patient,
                appointment,
                diagnosis,
                treatment,
                prescription,
            } => {
                let form = RecordForm {
                    patient_id: patient,
                    appointment_id: appointment,
                    diagnosis,
                    treatment,
                    prescription,
                };
                navigator
                    .perform(|service, session| service.save_record(session, &form))
                    .map(|id| Some(format!("Record saved (id {id})")))
            }
            ShellCommand::History { patient } => {
                let rows =
                    navigator.query(|service, session| service.patient_history_for_ophthalmologist(session, patient));
                write_records(out, &rows)?;
                return Ok(Flow::Continue);
            }
            ShellCommand::Bill {
                patient,
                appointment,
                amount,
            } => {
                let form = BillForm {
                    patient_id: patient,
                    appointment_id: appointment,
                    amount,
                };
                navigator
                    .perform(|service, session| service.create_bill(session, &form))
                    .map(|id| Some(format!("Bill created (id {id})")))
            }
            ShellCommand::Pay { bill } => navigator
                .perform(|service, session| service.pay_bill(session, bill))
                .map(|()| Some("Bill paid".to_string())),
            ShellCommand::Feedback {
                ophthalmologist,
                rating,
                comments,
            } => {
                let form = FeedbackForm {
                    ophthalmologist_id: ophthalmologist,
                    rating_option: rating,
                    comments,
                };
                navigator
                    .submit_feedback(&form)
                    .map(|_| Some("Thank you for your feedback".to_string()))
            }
        };

        match outcome {
            Ok(message) => {
                if let Some(message) = message {
                    writeln!(out, "{message}")?;
                }
                render(navigator, out)?;
            }
            Err(err) => {
                debug!(error = %err, "Command failed");
                writeln!(out, "Warning: {err}")?;
            }
        }
        Ok(Flow::Continue)
    }
}

/// Split a line on whitespace, keeping quoted sections together
pub(crate) fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_token = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

fn render(navigator: &Navigator, out: &mut impl Write) -> io::Result<()> {
    let screen = navigator.current();
    writeln!(out, "== {screen} ==")?;

    if matches!(screen, Screen::PatientHome | Screen::OphthalmologistHome) {
        if let Some(name) = navigator.query(|service, session| service.account_name(session)) {
            writeln!(out, "Welcome, {name}")?;
        }
    }

    match navigator.data() {
        ScreenData::Empty => {}
        ScreenData::Ophthalmologists(options) => {
            writeln!(out, "Ophthalmologists:")?;
            for option in options {
                writeln!(out, "  [{}] {}", option.id, option.label)?;
            }
            if screen == Screen::BookAppointment {
                let slots = TimeSlot::ALL.map(TimeSlot::label).join(", ");
                writeln!(out, "Slots: {slots}")?;
            } else {
                for (index, label) in Rating::OPTIONS.iter().enumerate() {
                    writeln!(out, "  rating {index}: {label}")?;
                }
            }
        }
        ScreenData::Appointments(rows) => write_appointments(out, rows)?,
        ScreenData::Patients(patients) => {
            writeln!(out, "Patients:")?;
            for patient in patients {
                writeln!(out, "  [{}] {}", patient.id, patient.name)?;
            }
        }
        ScreenData::LatestRecord(record) => match record {
            Some(record) => write_records(out, std::slice::from_ref(record))?,
            None => writeln!(out, "No records found.")?,
        },
        ScreenData::Records(rows) => write_records(out, rows)?,
        ScreenData::Bills(rows) => write_bills(out, rows)?,
        ScreenData::Billing { candidates, bills } => {
            writeln!(out, "Billable patients:")?;
            for candidate in candidates {
                let ids = candidate
                    .appointment_ids
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                writeln!(
                    out,
                    "  [{}] {} (appointments: {})",
                    candidate.patient_id,
                    candidate.patient_name,
                    or_none(&ids)
                )?;
            }
            write_bills(out, bills)?;
        }
        ScreenData::Feedback(rows) => {
            let lines: Vec<Vec<String>> = rows
                .iter()
                .map(|row| {
                    vec![
                        row.patient_name.clone(),
                        row.rating.to_string(),
                        row.comments.clone(),
                        row.date.format("%Y-%m-%d").to_string(),
                    ]
                })
                .collect();
            write_table(out, &["Patient", "Rating", "Comments", "Date"], &lines)?;
        }
    }
    Ok(())
}

fn write_appointments(out: &mut impl Write, rows: &[AppointmentRow]) -> io::Result<()> {
    let lines: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let actions = row
                .actions
                .iter()
                .map(|action| format!("{action:?}").to_lowercase())
                .collect::<Vec<_>>()
                .join("/");
            vec![
                row.id.to_string(),
                row.date.format("%Y-%m-%d").to_string(),
                row.time.format("%H:%M").to_string(),
                row.counterpart.clone(),
                row.status.to_string(),
                actions,
            ]
        })
        .collect();
    write_table(out, &["Id", "Date", "Time", "With", "Status", "Actions"], &lines)
}

fn write_records(out: &mut impl Write, rows: &[eye_clinic::views::RecordRow]) -> io::Result<()> {
    let lines: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.date.format("%Y-%m-%d %H:%M").to_string(),
                row.ophthalmologist_name.clone(),
                row.diagnosis.clone(),
                row.treatment.clone(),
                row.prescription.clone(),
            ]
        })
        .collect();
    write_table(
        out,
        &["Date", "Ophthalmologist", "Diagnosis", "Treatment", "Prescription"],
        &lines,
    )
}

fn write_bills(out: &mut impl Write, rows: &[BillRow]) -> io::Result<()> {
    let lines: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.id.to_string(),
                row.patient_name.clone(),
                row.ophthalmologist_name.clone(),
                row.date.format("%Y-%m-%d").to_string(),
                format!("${:.2}", row.amount),
                row.status.to_string(),
                (if row.can_pay() { "pay" } else { "" }).to_string(),
            ]
        })
        .collect();
    write_table(
        out,
        &["Id", "Patient", "Ophthalmologist", "Date", "Amount", "Status", "Actions"],
        &lines,
    )
}

fn write_table(out: &mut impl Write, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "(no rows)");
    }

    let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| format!("{header:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", header.trim_end())?;
    for row in rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

/// Print raw query rows as a table
pub(crate) fn write_rows(out: &mut impl Write, columns: &[String], rows: &[Vec<Value>]) -> io::Result<()> {
    let headers: Vec<&str> = columns.iter().map(String::as_str).collect();
    let lines: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|value| match value {
                    Value::Null => "NULL".to_string(),
                    Value::Integer(integer) => integer.to_string(),
                    Value::Real(real) => real.to_string(),
                    Value::Text(text) => text.clone(),
                    Value::Blob(blob) => format!("<{} bytes>", blob.len()),
                })
                .collect()
        })
        .collect();
    write_table(out, &headers, &lines)
}

pub(crate) fn write_line(out: &mut impl Write, line: &str) -> io::Result<()> {
    writeln!(out, "{line}")
}

fn or_none(listed: &str) -> &str {
    if listed.is_empty() {
        "none"
    } else {
        listed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eye_clinic::{ClinicService, Database, PasswordHasher};

    #[test]
    fn tokenize_keeps_quoted_text_together() {
        assert_eq!(
            tokenize(r#"book --date 2030-01-01 --slot "02:00 PM""#),
            vec!["book", "--date", "2030-01-01", "--slot", "02:00 PM"]
        );
        assert_eq!(tokenize("  "), Vec::<String>::new());
        assert_eq!(tokenize("record --diagnosis ''"), vec!["record", "--diagnosis", ""]);
    }

    #[test]
    fn table_pads_columns() {
        let mut out = Vec::new();
        write_table(&mut out, &["Id", "Name"], &[vec!["1".to_string(), "Ana".to_string()]]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Id  Name\n1   Ana\n");
    }

    #[test]
    fn scripted_session_registers_logs_in_and_books() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::new(dir.path().join("shell.db").to_str().unwrap()).unwrap();
        let service = ClinicService::sqlite(database, PasswordHasher::new(1_000));
        let mut shell = Shell::new(Navigator::new(service));

        let script = "\
register-ophthalmologist --name \"Dr. Lee\" --email lee@clinic.test --password 77 --clinic \"Clear View\"
register-patient --name Ana --gender female --dob 1990-01-02 --email ana@example.com --password 12 --confirm 12
login patient ana@example.com 12
go book-appointment
book --ophthalmologist 1 --date 2999-01-01 --slot \"02:00 PM\"
go appointment-history
show --json
go ophthalmologist-home
exit
";
        let mut out = Vec::new();
        shell.run(script.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Ophthalmologist registered (id 1)"));
        assert!(text.contains("Welcome, Ana"));
        assert!(text.contains("[1] Dr. Lee - Clear View"));
        assert!(text.contains("Appointment booked (id 1)"));
        assert!(text.contains("2999-01-01  14:00  Dr. Lee  Pending  cancel"));
        assert!(text.contains("\"Appointments\""));
        assert!(text.contains("Warning: You must be logged in as ophthalmologist to do that"));
    }
}
