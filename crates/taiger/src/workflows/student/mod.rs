//! Student dashboard decision core: application lock gating and task aggregation.
//!
//! Both evaluators are pure functions over a student snapshot fetched through a
//! [`StudentGateway`]. The service layer adds the unlock workflow and memoises task
//! summaries per snapshot.

pub mod domain;
pub mod gateway;
pub mod lock;
pub mod router;
pub mod service;
pub mod session;
pub mod tasks;

#[cfg(test)]
mod tests;

pub use domain::{
    AcademicBackground, Answer, Application, ApplicationId, ApplicationPreference, BaseDocument,
    CourseRow, DocumentStatus, GraduationStatus, LanguageRecord, LanguageStatus, Program,
    ProgramId, ProgramRef, Student, StudentId, ThreadEntry, ThreadRef, ThreadSummary, UniAssist,
    UniAssistStatus, University,
};
pub use gateway::{
    GatewayError, Notification, Notifier, NotifyError, RefreshResponse, Severity, StudentGateway,
};
pub use lock::{
    calculate_application_lock_status, classify_program, LockAssessment, LockControls,
    LockEvaluator, LockPolicy, LockReason, LockStatus, ProgramClassification, Role, UnknownRole,
    UnlockAction, DEFAULT_APPROVAL_COUNTRIES, DEFAULT_STALE_AFTER_DAYS, MAX_STALE_AFTER_DAYS,
};
pub use router::dashboard_router;
pub use service::{
    ApplicationLockView, DashboardServiceError, StudentDashboardService, StudentDashboardView,
    UnlockOutcome, UnlockRejected,
};
pub use session::{RequestTicket, ViewSession};
pub use tasks::{
    build_student_tasks, unread_banners, Banner, TaskAggregator, TaskBoard, TaskFlags, TaskItem,
    TaskPriority, TaskSummary,
};
