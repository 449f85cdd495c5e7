mod common;

use eye_clinic::forms::{BookingForm, FeedbackForm, PatientRegistrationForm};
use eye_clinic::models::{BillId, TimeSlot};
use eye_clinic::views::AppointmentAction;
use eye_clinic::{ClinicError, Role, Screen, ScreenData, Session};

use common::{future_date, login, navigator, ophthalmologist_form, patient_form};

#[test]
fn test_registration_returns_to_initial_screen() {
    let (_dir, _db, mut nav) = navigator();
    nav.navigate(Screen::PatientRegistration).expect("public screen");

    let id = nav
        .register_patient(&patient_form("Ana", "ana@example.com", "12"))
        .expect("register");
    assert_eq!(nav.current(), Screen::Initial);
    assert!(nav.session().is_anonymous());

    nav.navigate(Screen::PatientLogin).expect("public screen");
    nav.login_patient(&login("ana@example.com", "12")).expect("login");
    assert_eq!(nav.session(), &Session::Patient(id));
    assert_eq!(nav.current(), Screen::PatientHome);
}

#[test]
fn test_failed_registration_keeps_screen_and_form() {
    let (_dir, _db, mut nav) = navigator();
    nav.navigate(Screen::PatientRegistration).expect("public screen");

    let form = PatientRegistrationForm {
        phone: "n/a".to_string(),
        ..patient_form("Ana", "ana@example.com", "12")
    };
    assert!(nav.register_patient(&form).is_err());
    assert_eq!(nav.current(), Screen::PatientRegistration);
    assert_eq!(form.phone, "n/a");
}

#[test]
fn test_failed_login_leaves_session_unset() {
    let (_dir, _db, mut nav) = navigator();
    nav.register_ophthalmologist(&ophthalmologist_form("Dr. Lee", "lee@clinic.test", "5"))
        .expect("register");

    nav.navigate(Screen::OphthalmologistLogin).expect("public screen");
    assert!(nav.login_ophthalmologist(&login("lee@clinic.test", "6")).is_err());
    assert!(nav.session().is_anonymous());
    assert_eq!(nav.current(), Screen::OphthalmologistLogin);
}

#[test]
fn test_role_guard_and_logout() {
    let (_dir, _db, mut nav) = navigator();
    nav.register_ophthalmologist(&ophthalmologist_form("Dr. Lee", "lee@clinic.test", "5"))
        .expect("register");
    nav.login_ophthalmologist(&login("lee@clinic.test", "5")).expect("login");
    assert_eq!(nav.current(), Screen::OphthalmologistHome);

    assert!(matches!(
        nav.navigate(Screen::PatientBilling),
        Err(ClinicError::NotAuthenticated(Role::Patient))
    ));
    assert_eq!(nav.current(), Screen::OphthalmologistHome);

    nav.navigate(Screen::OphthalmologistFeedback).expect("own screen");
    assert_eq!(nav.data(), &ScreenData::Feedback(Vec::new()));

    nav.logout();
    assert!(nav.session().is_anonymous());
    assert_eq!(nav.current(), Screen::Initial);
    assert_eq!(nav.data(), &ScreenData::Empty);
    assert!(nav.navigate(Screen::OphthalmologistFeedback).is_err());
}

#[test]
fn test_perform_reloads_current_screen() {
    let (_dir, _db, mut nav) = navigator();
    nav.register_ophthalmologist(&ophthalmologist_form("Dr. Lee", "lee@clinic.test", "5"))
        .expect("register");
    nav.register_patient(&patient_form("Ana", "ana@example.com", "12"))
        .expect("register");

    nav.login_patient(&login("ana@example.com", "12")).expect("login");
    nav.navigate(Screen::BookAppointment).expect("patient screen");
    let doctor = match nav.data() {
        ScreenData::Ophthalmologists(options) => options[0].id,
        other => panic!("unexpected data: {other:?}"),
    };

    nav.navigate(Screen::AppointmentHistory).expect("patient screen");
    assert_eq!(nav.data(), &ScreenData::Appointments(Vec::new()));
    let appointment = nav
        .perform(|service, session| {
            service.book_appointment(
                session,
                &BookingForm {
                    ophthalmologist_id: Some(doctor),
                    date: future_date(7),
                    slot: TimeSlot::TwoPm,
                },
            )
        })
        .expect("book");
    match nav.data() {
        ScreenData::Appointments(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].id, appointment);
        }
        other => panic!("unexpected data: {other:?}"),
    }

    nav.logout();
    nav.login_ophthalmologist(&login("lee@clinic.test", "5")).expect("login");
    nav.navigate(Screen::OphthalmologistAppointments).expect("own screen");
    nav.perform(|service, session| service.approve_appointment(session, appointment))
        .expect("approve");

    match nav.data() {
        ScreenData::Appointments(rows) => {
            assert!(!rows[0].offers(AppointmentAction::Approve));
            assert!(!rows[0].offers(AppointmentAction::Reject));
        }
        other => panic!("unexpected data: {other:?}"),
    }
}

#[test]
fn test_failed_operation_does_not_reload() {
    let (_dir, _db, mut nav) = navigator();
    nav.register_patient(&patient_form("Ana", "ana@example.com", "12"))
        .expect("register");
    nav.login_patient(&login("ana@example.com", "12")).expect("login");
    nav.navigate(Screen::PatientBilling).expect("patient screen");

    let result = nav.perform(|service, session| service.pay_bill(session, BillId(1)));
    assert!(matches!(result, Err(ClinicError::NotFound(_))));
    assert_eq!(nav.current(), Screen::PatientBilling);
    assert_eq!(nav.data(), &ScreenData::Bills(Vec::new()));
}

#[test]
fn test_booking_and_feedback_return_to_patient_home() {
    let (_dir, _db, mut nav) = navigator();
    nav.register_ophthalmologist(&ophthalmologist_form("Dr. Lee", "lee@clinic.test", "5"))
        .expect("register");
    nav.register_patient(&patient_form("Ana", "ana@example.com", "12"))
        .expect("register");
    nav.login_patient(&login("ana@example.com", "12")).expect("login");

    nav.navigate(Screen::BookAppointment).expect("patient screen");
    let doctor = match nav.data() {
        ScreenData::Ophthalmologists(options) => options[0].id,
        other => panic!("unexpected data: {other:?}"),
    };
    let past = BookingForm {
        ophthalmologist_id: Some(doctor),
        date: future_date(-1),
        slot: TimeSlot::TenAm,
    };
    assert!(nav.book_appointment(&past).is_err());
    assert_eq!(nav.current(), Screen::BookAppointment);

    nav.book_appointment(&BookingForm {
        date: future_date(3),
        ..past
    })
    .expect("book");
    assert_eq!(nav.current(), Screen::PatientHome);

    nav.navigate(Screen::PatientFeedback).expect("patient screen");
    nav.submit_feedback(&FeedbackForm {
        ophthalmologist_id: Some(doctor),
        rating_option: 1,
        comments: "Kind staff".to_string(),
    })
    .expect("feedback");
    assert_eq!(nav.current(), Screen::PatientHome);
}
