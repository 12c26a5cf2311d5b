use serde::{Deserialize, Serialize};

use super::super::domain::Application;
use super::freshness::ProgramClassification;

/// Why an application is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockReason {
    NonApprovalCountry,
    StaleData,
    LockedDefault,
}

impl LockReason {
    pub const fn label(self) -> &'static str {
        match self {
            LockReason::NonApprovalCountry => "NON_APPROVAL_COUNTRY",
            LockReason::StaleData => "STALE_DATA",
            LockReason::LockedDefault => "LOCKED_DEFAULT",
        }
    }

    pub const fn summary(self) -> &'static str {
        match self {
            LockReason::NonApprovalCountry => "locked until staff confirm the program data",
            LockReason::StaleData => "program data is outdated and must be refreshed",
            LockReason::LockedDefault => "program data unavailable",
        }
    }
}

/// Derived lock decision for one application. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockStatus {
    pub is_locked: bool,
    pub reason: Option<LockReason>,
}

impl LockStatus {
    pub const UNLOCKED: LockStatus = LockStatus {
        is_locked: false,
        reason: None,
    };

    pub const fn locked(reason: LockReason) -> Self {
        Self {
            is_locked: true,
            reason: Some(reason),
        }
    }

    pub fn summary(&self) -> &'static str {
        match self.reason {
            Some(reason) => reason.summary(),
            None => "unlocked",
        }
    }
}

/// First matching row wins. Staleness overrides every unlock flag.
pub(crate) fn decide_lock(
    application: &Application,
    classification: Option<ProgramClassification>,
) -> LockStatus {
    let Some(classification) = classification else {
        return LockStatus::locked(LockReason::LockedDefault);
    };

    if classification.is_stale {
        return LockStatus::locked(LockReason::StaleData);
    }

    if !classification.is_approval_country && application.is_locked {
        return LockStatus::locked(LockReason::NonApprovalCountry);
    }

    LockStatus::UNLOCKED
}
