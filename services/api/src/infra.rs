use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use taiger::error::AppError;
use taiger::workflows::student::{
    ApplicationId, GatewayError, Notification, Notifier, NotifyError, ProgramRef, RefreshResponse,
    Severity, Student, StudentGateway, StudentId,
};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

type Snapshots = HashMap<StudentId, Arc<Student>>;

/// Student store backed by seeded snapshots. A refresh re-stamps the program and clears the
/// application lock, replacing the snapshot so callers see a new `Arc`.
#[derive(Default, Clone)]
pub(crate) struct InMemoryStudentGateway {
    students: Arc<Mutex<Snapshots>>,
}

impl InMemoryStudentGateway {
    pub(crate) fn from_students(students: Vec<Student>) -> Self {
        let students = students
            .into_iter()
            .map(|student| (student.id.clone(), Arc::new(student)))
            .collect();
        Self {
            students: Arc::new(Mutex::new(students)),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Snapshots>, GatewayError> {
        self.students
            .lock()
            .map_err(|_| GatewayError::Unavailable("student store poisoned".to_string()))
    }
}

impl StudentGateway for InMemoryStudentGateway {
    fn fetch_student_view(&self, id: &StudentId) -> Result<Arc<Student>, GatewayError> {
        self.lock()?.get(id).cloned().ok_or(GatewayError::NotFound)
    }

    fn refresh_application_lock(
        &self,
        id: &ApplicationId,
    ) -> Result<RefreshResponse, GatewayError> {
        let mut guard = self.lock()?;
        let Some(snapshot) = guard
            .values_mut()
            .find(|student| student.application(id).is_some())
        else {
            return Ok(RefreshResponse {
                success: false,
                message: Some(format!("application {id} not found")),
            });
        };

        let mut student = Student::clone(snapshot);
        let refreshed_at = Utc::now();
        for application in student.applications.iter_mut().filter(|app| &app.id == id) {
            let Some(ProgramRef::Embedded(program)) = application.program_id.as_mut() else {
                return Ok(RefreshResponse {
                    success: false,
                    message: Some("program details are not available".to_string()),
                });
            };
            program.updated_at = Some(refreshed_at);
            application.is_locked = false;
        }
        *snapshot = Arc::new(student);

        Ok(RefreshResponse {
            success: true,
            message: None,
        })
    }
}

/// Notifier that forwards user notifications to the log.
#[derive(Default, Clone, Copy)]
pub(crate) struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        let application = notification
            .application_id
            .as_ref()
            .map(|id| id.0.as_str())
            .unwrap_or("-");
        match notification.severity {
            Severity::Success => info!(application, message = %notification.message, "notify"),
            Severity::Error => warn!(application, message = %notification.message, "notify"),
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeedFile {
    Many(Vec<Student>),
    One(Box<Student>),
}

pub(crate) fn parse_students(raw: &str) -> Result<Vec<Student>, AppError> {
    let students = match serde_json::from_str::<SeedFile>(raw) {
        Ok(SeedFile::Many(students)) => students,
        Ok(SeedFile::One(student)) => vec![*student],
        // Re-parse as a list to surface a useful error location.
        Err(_) => serde_json::from_str::<Vec<Student>>(raw)?,
    };
    Ok(students)
}

pub(crate) fn load_students(path: &Path) -> Result<Vec<Student>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    parse_students(&raw)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 timestamp ({err})"))
}
