use super::common::*;
use crate::workflows::enrollment::access::SharedCodePolicy;
use crate::workflows::enrollment::evaluation::Verdict;
use crate::workflows::enrollment::service::{AdmissionService, AdmissionServiceError};
use crate::workflows::enrollment::store::{SessionId, StoreError};
use crate::workflows::enrollment::validation::{ScoreForm, ValidationError};
use std::sync::Arc;

#[test]
fn start_session_rejects_blank_names() {
    let (service, store) = build_service();

    match service.start_session(None, "   ") {
        Err(AdmissionServiceError::EmptyName(_)) => {}
        other => panic!("expected empty name error, got {other:?}"),
    }
    assert!(store.is_empty());
}

#[test]
fn start_session_trims_and_reuses_session() {
    let (service, store) = build_service();

    let ticket = service.start_session(None, "  Sari ").expect("sign in");
    assert_eq!(ticket.identity, name("Sari"));

    let again = service
        .start_session(Some(ticket.session_id), "Budi")
        .expect("switch identity");
    assert_eq!(again.session_id, ticket.session_id);
    assert_eq!(store.len(), 1);

    let menu = service.menu(&ticket.session_id).expect("menu loads");
    assert_eq!(menu.identity, name("Budi"));
    assert_eq!(menu.registered_names, vec![name("Sari"), name("Budi")]);
    assert!(menu.applicant_names.is_empty());
}

#[test]
fn operations_require_a_signed_in_student() {
    let (service, _) = build_service();
    let session = SessionId::generate();

    assert!(matches!(
        service.menu(&session),
        Err(AdmissionServiceError::NotSignedIn)
    ));
    assert!(matches!(
        service.register(&session, &passing_form()),
        Err(AdmissionServiceError::NotSignedIn)
    ));
    assert!(matches!(
        service.simulate(&session, &passing_form()),
        Err(AdmissionServiceError::NotSignedIn)
    ));
    assert!(matches!(
        service.history(&session),
        Err(AdmissionServiceError::NotSignedIn)
    ));
}

#[test]
fn register_adds_each_name_once() {
    let (service, store) = build_service();
    let session = service.start_session(None, "Sari").expect("sign in").session_id;

    let first = service
        .register(&session, &passing_form().with_distance("3.2"))
        .expect("first registration");
    assert!(first.newly_registered);

    let second = service
        .register(&session, &borderline_form().with_distance("9"))
        .expect("second registration is a no-op");
    assert!(!second.newly_registered);
    assert_eq!(second.record, first.record);
    assert_eq!(second.record.distance, Some(3.2));

    let state = stored_state(&store, &session);
    assert_eq!(state.list().len(), 1);
    assert_eq!(state.list()[0].distance, Some(3.2));

    let menu = service.menu(&session).expect("menu loads");
    assert_eq!(menu.applicant_names, vec![name("Sari")]);
}

#[test]
fn invalid_registration_commits_nothing() {
    let (service, store) = build_service();
    let session = service.start_session(None, "Sari").expect("sign in").session_id;
    let before = stored_state(&store, &session);

    for form in [
        passing_form().with_distance("-1"),
        ScoreForm::new("abc", "70", "70", "60").with_distance("1"),
        ScoreForm::new("80", "-70", "70", "60").with_distance("1"),
    ] {
        match service.register(&session, &form) {
            Err(AdmissionServiceError::Validation(ValidationError::InvalidField { .. })) => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    assert_eq!(stored_state(&store, &session), before);
}

#[test]
fn simulate_appends_history_in_order() {
    let (service, _) = build_service();
    let session = service.start_session(None, "Sari").expect("sign in").session_id;

    let first = service
        .simulate(&session, &borderline_form())
        .expect("first simulation");
    assert_eq!(first.verdict(), Verdict::Rejected);
    assert_eq!(first.attempt.average, 65.0);
    assert_eq!(first.history.len(), 1);

    let second = service
        .simulate(&session, &passing_form())
        .expect("second simulation");
    assert_eq!(second.verdict(), Verdict::Accepted);
    assert_eq!(second.history.len(), 2);

    let history = service.history(&session).expect("history loads");
    let verdicts: Vec<_> = history.iter().map(|attempt| attempt.verdict).collect();
    assert_eq!(verdicts, [Verdict::Rejected, Verdict::Accepted]);
    assert!(history[0].recorded_at <= history[1].recorded_at);
}

#[test]
fn simulate_does_not_register_applicants() {
    let (service, store) = build_service();
    let session = service.start_session(None, "Sari").expect("sign in").session_id;

    service
        .simulate(&session, &passing_form())
        .expect("simulation runs");

    assert!(stored_state(&store, &session).list().is_empty());
}

#[test]
fn invalid_simulation_leaves_history_untouched() {
    let (service, _) = build_service();
    let session = service.start_session(None, "Sari").expect("sign in").session_id;
    service
        .simulate(&session, &passing_form())
        .expect("valid simulation");

    let result = service.simulate(&session, &ScoreForm::new("80", "70", "abc", "60"));
    assert!(matches!(result, Err(AdmissionServiceError::Validation(_))));
    assert_eq!(service.history(&session).expect("history").len(), 1);
}

#[test]
fn history_is_kept_per_student_name() {
    let (service, _) = build_service();
    let session = service.start_session(None, "Sari").expect("sign in").session_id;
    service
        .simulate(&session, &passing_form())
        .expect("simulation runs");

    service
        .start_session(Some(session), "Budi")
        .expect("switch identity");
    assert!(service.history(&session).expect("history").is_empty());

    service
        .start_session(Some(session), "Sari")
        .expect("switch back");
    assert_eq!(service.history(&session).expect("history").len(), 1);
}

#[test]
fn teacher_view_requires_the_shared_code() {
    let (service, _) = build_service();
    let session = service.start_session(None, "Sari").expect("sign in").session_id;
    service
        .register(&session, &passing_form().with_distance("1"))
        .expect("registered");

    assert!(matches!(
        service.applicants(&session),
        Err(AdmissionServiceError::Forbidden)
    ));
    assert!(matches!(
        service.teacher_sign_in(Some(session), "wrong"),
        Err(AdmissionServiceError::Unauthorized)
    ));
    assert!(matches!(
        service.applicants(&session),
        Err(AdmissionServiceError::Forbidden)
    ));

    let granted = service
        .teacher_sign_in(Some(session), TEACHER_CODE)
        .expect("code accepted");
    assert_eq!(granted, session);

    let applicants = service.applicants(&session).expect("teacher view");
    assert_eq!(applicants.len(), 1);
    assert_eq!(applicants[0].name, name("Sari"));

    let csv = service
        .export_applicants_csv(&session)
        .expect("export renders");
    assert!(csv.contains("Sari,80,70,70,60,1"));
}

#[test]
fn teacher_sign_in_without_session_creates_one() {
    let (service, store) = build_service();
    let session = service
        .teacher_sign_in(None, TEACHER_CODE)
        .expect("code accepted");

    assert!(service.applicants(&session).expect("empty view").is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn store_failures_propagate() {
    let service = AdmissionService::new(
        Arc::new(UnavailableStore),
        Arc::new(SharedCodePolicy::new(TEACHER_CODE)),
    );

    match service.start_session(None, "Sari") {
        Err(AdmissionServiceError::Store(StoreError::Unavailable(reason))) => {
            assert_eq!(reason, "offline")
        }
        other => panic!("expected store error, got {other:?}"),
    }
}

#[test]
fn sign_out_forgets_the_session() {
    let (service, store) = build_service();
    let session = service.start_session(None, "Sari").expect("sign in").session_id;
    service
        .register(&session, &passing_form())
        .expect("registered");
    assert_eq!(store.len(), 1);

    service.sign_out(&session).expect("signed out");
    assert!(store.is_empty());
    assert!(matches!(
        service.menu(&session),
        Err(AdmissionServiceError::NotSignedIn)
    ));

    service.sign_out(&session).expect("unknown session is a no-op");
}

#[test]
fn sign_out_surfaces_store_failures() {
    let service = AdmissionService::new(
        Arc::new(UnavailableStore),
        Arc::new(SharedCodePolicy::new(TEACHER_CODE)),
    );
    assert!(matches!(
        service.sign_out(&SessionId::generate()),
        Err(AdmissionServiceError::Store(StoreError::Unavailable(_)))
    ));
}
