use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::student::domain::{
    AcademicBackground, Answer, Application, ApplicationId, ApplicationPreference, BaseDocument,
    CourseRow, DocumentStatus, GraduationStatus, LanguageRecord, LanguageStatus, Program,
    ProgramId, ProgramRef, Student, StudentId, ThreadEntry, ThreadRef, ThreadSummary, University,
};
use crate::workflows::student::gateway::{
    GatewayError, Notification, Notifier, NotifyError, RefreshResponse, StudentGateway,
};
use crate::workflows::student::lock::{LockEvaluator, LockPolicy};
use crate::workflows::student::session::ViewSession;
use crate::workflows::student::tasks::TaskFlags;
use crate::workflows::student::StudentDashboardService;

pub(super) const STUDENT_ID: &str = "stu-001";

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub(super) fn evaluator() -> LockEvaluator {
    LockEvaluator::new(LockPolicy::default())
}

pub(super) fn program(id: &str, country: &str, updated_at: Option<DateTime<Utc>>) -> Program {
    Program {
        id: ProgramId(id.to_string()),
        school: Some("TU Munich".to_string()),
        program_name: Some(format!("Program {id}")),
        degree: Some("M.Sc.".to_string()),
        semester: Some("WS".to_string()),
        country: Some(country.to_string()),
        updated_at,
        ..Program::default()
    }
}

pub(super) fn application(id: &str, program: Option<Program>, is_locked: bool) -> Application {
    Application {
        id: ApplicationId(id.to_string()),
        program_id: program.map(|program| ProgramRef::Embedded(Box::new(program))),
        is_locked,
        ..Application::default()
    }
}

pub(super) fn decided(mut application: Application) -> Application {
    application.decided = Answer::Yes;
    application
}

pub(super) fn thread(id: Option<&str>, is_final_version: bool, author: Option<&str>) -> ThreadEntry {
    ThreadEntry {
        doc_thread_id: id.map(|id| {
            ThreadRef::Populated(ThreadSummary {
                id: id.to_string(),
                file_type: Some("CV".to_string()),
            })
        }),
        is_final_version,
        latest_message_left_by_id: author.map(str::to_string),
    }
}

/// Student with every always-counted unit complete and no applications.
pub(super) fn complete_student() -> Student {
    Student {
        id: StudentId(STUDENT_ID.to_string()),
        firstname: Some("Mei".to_string()),
        lastname: Some("Lin".to_string()),
        firstname_chinese: Some("美".to_string()),
        lastname_chinese: Some("林".to_string()),
        birthday: Some("2001-04-12".to_string()),
        academic_background: AcademicBackground {
            university: University {
                attended_high_school: Some("Taipei First Girls".to_string()),
                attended_university: Some("NTU".to_string()),
                attended_university_program: Some("Electrical Engineering".to_string()),
                is_graduated: GraduationStatus::Pending,
            },
            language: LanguageRecord {
                english_is_passed: LanguageStatus::Passed,
                english_certificate: Some("IELTS".to_string()),
                english_score: Some("7.0".to_string()),
                german_is_passed: LanguageStatus::NotNeeded,
                ..LanguageRecord::default()
            },
        },
        application_preference: ApplicationPreference {
            expected_application_date: Some("2025".to_string()),
            expected_application_semester: Some("WS".to_string()),
            target_application_field: Some("Computer Engineering".to_string()),
            target_degree: Some("Master".to_string()),
            target_program_language: Some("English".to_string()),
        },
        profile: vec![
            BaseDocument {
                name: "Passport".to_string(),
                status: DocumentStatus::Accepted,
                required: true,
            },
            BaseDocument {
                name: "Bachelor_Transcript".to_string(),
                status: DocumentStatus::Uploaded,
                required: true,
            },
        ],
        courses: vec![CourseRow {
            all_course_english: Some("Signals and Systems".to_string()),
            ..CourseRow::default()
        }],
        ..Student::default()
    }
}

#[derive(Debug, Clone)]
pub(super) enum RefreshBehavior {
    Succeed,
    Reject(Option<String>),
    Unavailable,
}

/// In-memory stand-in for the TaiGer API. A successful refresh re-stamps the program and
/// clears the application lock flag, producing a new snapshot.
pub(super) struct MemoryGateway {
    students: Mutex<HashMap<StudentId, Arc<Student>>>,
    behavior: RefreshBehavior,
    refreshed_at: DateTime<Utc>,
    pub(super) fetches: AtomicUsize,
    pub(super) refreshes: AtomicUsize,
}

impl MemoryGateway {
    pub(super) fn new(students: Vec<Student>, behavior: RefreshBehavior) -> Self {
        let students = students
            .into_iter()
            .map(|student| (student.id.clone(), Arc::new(student)))
            .collect();
        Self {
            students: Mutex::new(students),
            behavior,
            refreshed_at: now(),
            fetches: AtomicUsize::new(0),
            refreshes: AtomicUsize::new(0),
        }
    }

    pub(super) fn snapshot(&self, id: &str) -> Arc<Student> {
        let guard = self.students.lock().expect("gateway mutex poisoned");
        Arc::clone(guard.get(&StudentId(id.to_string())).expect("student seeded"))
    }
}

impl StudentGateway for MemoryGateway {
    fn fetch_student_view(&self, id: &StudentId) -> Result<Arc<Student>, GatewayError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let guard = self.students.lock().expect("gateway mutex poisoned");
        guard.get(id).cloned().ok_or(GatewayError::NotFound)
    }

    fn refresh_application_lock(
        &self,
        id: &ApplicationId,
    ) -> Result<RefreshResponse, GatewayError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            RefreshBehavior::Succeed => {}
            RefreshBehavior::Reject(message) => {
                return Ok(RefreshResponse {
                    success: false,
                    message: message.clone(),
                })
            }
            RefreshBehavior::Unavailable => {
                return Err(GatewayError::Unavailable("connection reset".to_string()))
            }
        }

        let mut guard = self.students.lock().expect("gateway mutex poisoned");
        for snapshot in guard.values_mut() {
            if snapshot.application(id).is_none() {
                continue;
            }
            let mut student = Student::clone(snapshot);
            for application in student.applications.iter_mut().filter(|app| &app.id == id) {
                application.is_locked = false;
                if let Some(ProgramRef::Embedded(program)) = application.program_id.as_mut() {
                    program.updated_at = Some(self.refreshed_at);
                }
            }
            *snapshot = Arc::new(student);
            return Ok(RefreshResponse {
                success: true,
                message: None,
            });
        }

        Ok(RefreshResponse {
            success: false,
            message: Some("application not found".to_string()),
        })
    }
}

/// Closes the view session while the refresh request is in flight.
pub(super) struct ClosingGateway {
    pub(super) inner: MemoryGateway,
    pub(super) session: Arc<ViewSession>,
}

impl StudentGateway for ClosingGateway {
    fn fetch_student_view(&self, id: &StudentId) -> Result<Arc<Student>, GatewayError> {
        self.inner.fetch_student_view(id)
    }

    fn refresh_application_lock(
        &self,
        id: &ApplicationId,
    ) -> Result<RefreshResponse, GatewayError> {
        self.session.close();
        self.inner.refresh_application_lock(id)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

/// Student with one application per lock scenario.
pub(super) fn locked_student(updated_at: DateTime<Utc>) -> Student {
    let mut student = complete_student();
    student.applications = vec![
        decided(application(
            "app-de",
            Some(program("prog-de", "de", Some(updated_at))),
            true,
        )),
        decided(application(
            "app-stale",
            Some(program("prog-stale", "de", Some(updated_at - Duration::days(400)))),
            true,
        )),
        application(
            "app-us",
            Some(program("prog-us", "us", Some(updated_at))),
            true,
        ),
    ];
    student
}

pub(super) fn build_service(
    behavior: RefreshBehavior,
) -> (
    StudentDashboardService<MemoryGateway, MemoryNotifier>,
    Arc<MemoryGateway>,
    Arc<MemoryNotifier>,
) {
    let gateway = Arc::new(MemoryGateway::new(
        vec![locked_student(days_ago(30))],
        behavior,
    ));
    let notifier = Arc::new(MemoryNotifier::default());
    let service = StudentDashboardService::new(
        gateway.clone(),
        notifier.clone(),
        LockPolicy::default(),
        TaskFlags::default(),
    );
    (service, gateway, notifier)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
