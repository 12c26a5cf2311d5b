mod config;
mod controls;
mod freshness;
mod policy;

pub use config::{
    LockPolicy, DEFAULT_APPROVAL_COUNTRIES, DEFAULT_STALE_AFTER_DAYS, MAX_STALE_AFTER_DAYS,
};
pub use controls::{LockControls, Role, UnknownRole, UnlockAction};
pub use freshness::{classify_program, ProgramClassification};
pub use policy::{LockReason, LockStatus};

use super::domain::Application;
use chrono::{DateTime, Utc};
use policy::decide_lock;
use serde::Serialize;

/// Stateless evaluator applying the lock policy to applications.
#[derive(Debug, Clone, Default)]
pub struct LockEvaluator {
    policy: LockPolicy,
}

impl LockEvaluator {
    pub fn new(policy: LockPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &LockPolicy {
        &self.policy
    }

    /// Classification and decision for one application, or `None` when it has no program.
    pub fn assess(&self, application: &Application, now: DateTime<Utc>) -> Option<LockAssessment> {
        let program = application.program()?;
        let classification = classify_program(program, &self.policy, now);

        Some(LockAssessment {
            classification,
            status: decide_lock(application, Some(classification)),
        })
    }

    /// Total lock decision. An application without a program fails closed.
    pub fn evaluate(&self, application: &Application, now: DateTime<Utc>) -> LockStatus {
        match self.assess(application, now) {
            Some(assessment) => assessment.status,
            None => decide_lock(application, None),
        }
    }
}

/// Lock decision together with the classification it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockAssessment {
    pub classification: ProgramClassification,
    pub status: LockStatus,
}

/// Convenience wrapper over [`LockEvaluator::evaluate`] for one-off checks.
pub fn calculate_application_lock_status(
    application: &Application,
    policy: &LockPolicy,
    now: DateTime<Utc>,
) -> LockStatus {
    let classification = application
        .program()
        .map(|program| classify_program(program, policy, now));
    decide_lock(application, classification)
}
