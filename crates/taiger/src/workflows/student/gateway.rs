use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, Student, StudentId};

/// Remote TaiGer API the dashboards read from. Implementations own transport and caching.
pub trait StudentGateway: Send + Sync {
    fn fetch_student_view(&self, id: &StudentId) -> Result<Arc<Student>, GatewayError>;
    fn refresh_application_lock(
        &self,
        id: &ApplicationId,
    ) -> Result<RefreshResponse, GatewayError>;
}

/// Server reply to a refresh/unlock request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("student not found")]
    NotFound,
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for transient user notifications (toasts, snackbars, e-mail adapters).
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
}

impl Notification {
    pub fn success(application_id: &ApplicationId, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
            application_id: Some(application_id.clone()),
        }
    }

    pub fn error(application_id: &ApplicationId, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            application_id: Some(application_id.clone()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
