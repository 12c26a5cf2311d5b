use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{ApplicationId, Student, StudentId};
use super::gateway::{GatewayError, Notification, Notifier, NotifyError, StudentGateway};
use super::lock::{LockControls, LockEvaluator, LockPolicy, Role};
use super::session::ViewSession;
use super::tasks::{unread_banners, Banner, TaskAggregator, TaskBoard, TaskFlags, TaskSummary};

/// Service composing the gateway, the lock evaluator, and the task aggregator.
pub struct StudentDashboardService<G, N> {
    gateway: Arc<G>,
    notifier: Arc<N>,
    evaluator: Arc<LockEvaluator>,
    aggregator: TaskAggregator,
    board: TaskBoard,
}

impl<G, N> StudentDashboardService<G, N>
where
    G: StudentGateway + 'static,
    N: Notifier + 'static,
{
    pub fn new(gateway: Arc<G>, notifier: Arc<N>, policy: LockPolicy, flags: TaskFlags) -> Self {
        Self {
            gateway,
            notifier,
            evaluator: Arc::new(LockEvaluator::new(policy)),
            aggregator: TaskAggregator::new(flags),
            board: TaskBoard::new(),
        }
    }

    pub fn evaluator(&self) -> &LockEvaluator {
        &self.evaluator
    }

    /// Fetch the student snapshot and derive everything the dashboard renders.
    pub fn dashboard(
        &self,
        student_id: &StudentId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<StudentDashboardView, DashboardServiceError> {
        let student = self.gateway.fetch_student_view(student_id)?;
        Ok(self.view_of(&student, role, now))
    }

    /// Build the view for an already fetched snapshot.
    pub fn view_of(
        &self,
        student: &Arc<Student>,
        role: Role,
        now: DateTime<Utc>,
    ) -> StudentDashboardView {
        let summary = self.board.summary(student, &self.aggregator);
        debug!(
            student = %student.id,
            cached_students = self.board.len(),
            open_tasks = summary.tasks.len(),
            "task summary ready"
        );
        let applications = student
            .applications
            .iter()
            .map(|application| ApplicationLockView {
                application_id: application.id.clone(),
                program: application.program_label(),
                decided: application.is_program_decided(),
                controls: LockControls::resolve(Some(application), role, &self.evaluator, now),
            })
            .collect();

        StudentDashboardView {
            student_id: student.id.clone(),
            student_name: student.display_name(),
            archived: student.archiv,
            tasks: TaskSummary::clone(&summary),
            applications,
            banners: unread_banners(student),
            meeting_enable: self.aggregator.flags().meeting_enable,
        }
    }

    /// Ask the server to re-verify the program behind an application and unlock it.
    ///
    /// Failures are reported through the notifier and leave every local state untouched.
    /// Success triggers a scoped refetch of the dashboard.
    pub fn unlock(
        &self,
        session: &ViewSession,
        student_id: &StudentId,
        application_id: &ApplicationId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<UnlockOutcome, DashboardServiceError> {
        let ticket = session.begin();
        let student = self.gateway.fetch_student_view(student_id)?;
        let application = student
            .application(application_id)
            .ok_or_else(|| DashboardServiceError::ApplicationNotFound(application_id.clone()))?;

        let controls = LockControls::resolve(Some(application), role, &self.evaluator, now)
            .ok_or(UnlockRejected::NotOffered)?;
        match controls.unlock {
            None => return Err(UnlockRejected::NotOffered.into()),
            Some(action) if !action.enabled => return Err(UnlockRejected::Disabled.into()),
            Some(_) => {}
        }

        info!(
            student = %student_id,
            application = %application_id,
            %role,
            "requesting application unlock"
        );
        let response = self.gateway.refresh_application_lock(application_id);

        let Some(response) = session.accept(ticket, response) else {
            debug!(
                application = %application_id,
                "view closed before unlock completed; discarding response"
            );
            return Ok(UnlockOutcome::Discarded);
        };

        let failure = match response {
            Ok(reply) if reply.success => None,
            Ok(reply) => Some(
                reply
                    .message
                    .unwrap_or_else(|| "the server rejected the refresh request".to_string()),
            ),
            Err(err) => Some(err.to_string()),
        };

        if let Some(message) = failure {
            warn!(application = %application_id, %message, "application unlock failed");
            self.notifier
                .notify(Notification::error(application_id, message.clone()))?;
            return Ok(UnlockOutcome::Failed { message });
        }

        self.board.invalidate(student_id);
        let view = self.dashboard(student_id, role, now)?;
        self.notifier.notify(Notification::success(
            application_id,
            "Application refreshed",
        ))?;

        Ok(UnlockOutcome::Refreshed(Box::new(view)))
    }
}

/// Dashboard payload: prioritised tasks, lock affordances per application, unread banners.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentDashboardView {
    pub student_id: StudentId,
    pub student_name: String,
    pub archived: bool,
    pub tasks: TaskSummary,
    pub applications: Vec<ApplicationLockView>,
    pub banners: Vec<Banner>,
    pub meeting_enable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationLockView {
    pub application_id: ApplicationId,
    pub program: String,
    pub decided: bool,
    /// `None` when the application has no embedded program to judge.
    pub controls: Option<LockControls>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnlockOutcome {
    Refreshed(Box<StudentDashboardView>),
    Failed { message: String },
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnlockRejected {
    #[error("unlock is not available for this application")]
    NotOffered,
    #[error("program data is stale; refresh the program before unlocking")]
    Disabled,
}

/// Error raised by the dashboard service.
#[derive(Debug, thiserror::Error)]
pub enum DashboardServiceError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error(transparent)]
    Rejected(#[from] UnlockRejected),
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
}
