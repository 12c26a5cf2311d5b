use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::domain::{Application, ApplicationId};
use super::policy::{LockReason, LockStatus};
use super::LockEvaluator;

/// Role of the person looking at a dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    Admin,
    Manager,
    Agent,
    Editor,
    Student,
    #[default]
    Guest,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Agent => "Agent",
            Role::Editor => "Editor",
            Role::Student => "Student",
            Role::Guest => "Guest",
        }
    }

    pub const fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Manager | Role::Agent | Role::Editor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "agent" => Ok(Role::Agent),
            "editor" => Ok(Role::Editor),
            "student" => Ok(Role::Student),
            "guest" => Ok(Role::Guest),
            _ => Err(UnknownRole(value.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.label().to_string()
    }
}

/// Unlock button state. Present only when the action is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnlockAction {
    pub enabled: bool,
}

/// Lock-related affordances the presentation layer renders for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockControls {
    pub application_id: ApplicationId,
    pub status: LockStatus,
    pub approval_country: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock: Option<UnlockAction>,
    pub check_program: bool,
}

impl LockControls {
    /// Returns `None` when there is nothing to render: no application or no program.
    pub fn resolve(
        application: Option<&Application>,
        role: Role,
        evaluator: &LockEvaluator,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let application = application?;
        let assessment = evaluator.assess(application, now)?;
        let status = assessment.status;
        let approval_country = assessment.classification.is_approval_country;
        let staff = role.is_staff();

        let unlock = (!approval_country && status.is_locked && staff).then(|| UnlockAction {
            enabled: status.reason != Some(LockReason::StaleData),
        });

        Some(Self {
            application_id: application.id.clone(),
            status,
            approval_country,
            unlock,
            check_program: status.is_locked && staff,
        })
    }

    pub fn show_lock_icon(&self) -> bool {
        self.status.is_locked
    }
}
