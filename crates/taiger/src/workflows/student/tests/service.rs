use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::common::*;
use crate::workflows::student::domain::{ApplicationId, StudentId};
use crate::workflows::student::gateway::{GatewayError, Severity};
use crate::workflows::student::lock::{LockPolicy, LockReason, Role};
use crate::workflows::student::service::{
    DashboardServiceError, StudentDashboardService, UnlockOutcome, UnlockRejected,
};
use crate::workflows::student::session::ViewSession;
use crate::workflows::student::tasks::{TaskAggregator, TaskBoard, TaskFlags};

fn student_id() -> StudentId {
    StudentId(STUDENT_ID.to_string())
}

fn app_id(id: &str) -> ApplicationId {
    ApplicationId(id.to_string())
}

#[test]
fn dashboard_combines_tasks_controls_and_banners() {
    let (service, _, _) = build_service(RefreshBehavior::Succeed);

    let view = service
        .dashboard(&student_id(), Role::Agent, now())
        .expect("dashboard");

    assert_eq!(view.student_name, "Mei Lin");
    assert!(!view.archived);
    assert_eq!(view.tasks.total, 9);
    assert_eq!(view.tasks.percentage, 100);
    assert!(view.banners.is_empty());

    let reasons: Vec<Option<LockReason>> = view
        .applications
        .iter()
        .map(|app| app.controls.as_ref().and_then(|controls| controls.status.reason))
        .collect();
    assert_eq!(
        reasons,
        vec![
            Some(LockReason::NonApprovalCountry),
            Some(LockReason::StaleData),
            None
        ]
    );
    assert!(view.applications[0].decided);
    assert!(!view.applications[2].decided);
}

#[test]
fn unknown_student_surfaces_gateway_not_found() {
    let (service, _, _) = build_service(RefreshBehavior::Succeed);

    let err = service
        .dashboard(&StudentId("nobody".to_string()), Role::Admin, now())
        .expect_err("missing student");

    assert!(matches!(
        err,
        DashboardServiceError::Gateway(GatewayError::NotFound)
    ));
}

#[test]
fn board_reuses_summary_for_the_same_snapshot() {
    let board = TaskBoard::new();
    let aggregator = TaskAggregator::default();
    let snapshot = Arc::new(complete_student());

    let first = board.summary(&snapshot, &aggregator);
    let second = board.summary(&snapshot, &aggregator);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(board.len(), 1);

    let mut edited = complete_student();
    edited.birthday = None;
    let refetched = Arc::new(edited);
    let third = board.summary(&refetched, &aggregator);
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(third.completed + 1, first.completed);

    board.invalidate(&student_id());
    assert_eq!(board.len(), 0);
}

#[test]
fn successful_unlock_refetches_and_notifies() {
    let (service, gateway, notifier) = build_service(RefreshBehavior::Succeed);
    let session = ViewSession::new();

    let outcome = service
        .unlock(&session, &student_id(), &app_id("app-de"), Role::Agent, now())
        .expect("unlock");

    let UnlockOutcome::Refreshed(view) = outcome else {
        panic!("expected refreshed view");
    };
    let controls = view.applications[0].controls.as_ref().expect("controls");
    assert!(!controls.status.is_locked);
    assert!(controls.unlock.is_none());

    assert_eq!(gateway.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.fetches.load(Ordering::SeqCst), 2);
    assert!(!gateway.snapshot(STUDENT_ID).applications[0].is_locked);

    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity, Severity::Success);
    assert_eq!(events[0].application_id, Some(app_id("app-de")));
}

#[test]
fn rejected_refresh_reports_the_server_message() {
    let (service, gateway, notifier) =
        build_service(RefreshBehavior::Reject(Some("program still outdated".to_string())));
    let before = gateway.snapshot(STUDENT_ID);

    let outcome = service
        .unlock(&ViewSession::new(), &student_id(), &app_id("app-de"), Role::Admin, now())
        .expect("unlock");

    assert_eq!(
        outcome,
        UnlockOutcome::Failed {
            message: "program still outdated".to_string()
        }
    );
    assert!(Arc::ptr_eq(&before, &gateway.snapshot(STUDENT_ID)));
    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity, Severity::Error);
    assert_eq!(events[0].message, "program still outdated");
}

#[test]
fn rejected_refresh_without_message_uses_a_generic_one() {
    let (service, _, notifier) = build_service(RefreshBehavior::Reject(None));

    let outcome = service
        .unlock(&ViewSession::new(), &student_id(), &app_id("app-de"), Role::Admin, now())
        .expect("unlock");

    assert!(matches!(outcome, UnlockOutcome::Failed { .. }));
    assert!(!notifier.events()[0].message.is_empty());
}

#[test]
fn transport_failure_is_reported_not_raised() {
    let (service, gateway, notifier) = build_service(RefreshBehavior::Unavailable);

    let outcome = service
        .unlock(&ViewSession::new(), &student_id(), &app_id("app-de"), Role::Manager, now())
        .expect("unlock");

    let UnlockOutcome::Failed { message } = outcome else {
        panic!("expected failure");
    };
    assert!(message.contains("connection reset"));
    assert!(gateway.snapshot(STUDENT_ID).applications[0].is_locked);
    assert_eq!(notifier.events()[0].severity, Severity::Error);
}

#[test]
fn unlock_is_refused_when_not_offered_or_disabled() {
    let (service, gateway, notifier) = build_service(RefreshBehavior::Succeed);
    let session = ViewSession::new();

    let cases = [
        ("app-de", Role::Student, UnlockRejected::NotOffered),
        ("app-us", Role::Admin, UnlockRejected::NotOffered),
        ("app-stale", Role::Admin, UnlockRejected::Disabled),
    ];
    for (application, role, expected) in cases {
        let err = service
            .unlock(&session, &student_id(), &app_id(application), role, now())
            .expect_err("refused");
        assert!(
            matches!(err, DashboardServiceError::Rejected(rejected) if rejected == expected),
            "{application} as {role}: {err:?}"
        );
    }

    assert_eq!(gateway.refreshes.load(Ordering::SeqCst), 0);
    assert!(notifier.events().is_empty());
}

#[test]
fn unknown_application_is_not_found() {
    let (service, _, _) = build_service(RefreshBehavior::Succeed);

    let err = service
        .unlock(&ViewSession::new(), &student_id(), &app_id("app-xx"), Role::Admin, now())
        .expect_err("missing application");

    assert!(matches!(err, DashboardServiceError::ApplicationNotFound(id) if id == app_id("app-xx")));
}

#[test]
fn response_after_view_closed_is_discarded() {
    let session = Arc::new(ViewSession::new());
    let gateway = Arc::new(ClosingGateway {
        inner: MemoryGateway::new(vec![locked_student(days_ago(30))], RefreshBehavior::Succeed),
        session: Arc::clone(&session),
    });
    let notifier = Arc::new(MemoryNotifier::default());
    let service = StudentDashboardService::new(
        gateway.clone(),
        notifier.clone(),
        LockPolicy::default(),
        TaskFlags::default(),
    );

    let outcome = service
        .unlock(&session, &student_id(), &app_id("app-de"), Role::Editor, now())
        .expect("unlock");

    assert_eq!(outcome, UnlockOutcome::Discarded);
    assert!(session.is_closed());
    assert!(notifier.events().is_empty());
    assert_eq!(gateway.inner.fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn newer_request_supersedes_older_ticket() {
    let session = ViewSession::new();
    let first = session.begin();
    let second = session.begin();

    assert!(!session.is_current(first));
    assert_eq!(session.accept(second, "latest"), Some("latest"));
    assert_eq!(session.accept(first, "stale"), None);

    session.close();
    assert!(!session.is_current(second));
}
