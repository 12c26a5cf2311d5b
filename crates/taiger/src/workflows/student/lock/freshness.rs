use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::domain::Program;
use super::config::LockPolicy;

/// Freshness and country classification of a single program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramClassification {
    pub is_stale: bool,
    pub is_approval_country: bool,
}

pub fn classify_program(
    program: &Program,
    policy: &LockPolicy,
    now: DateTime<Utc>,
) -> ProgramClassification {
    ProgramClassification {
        is_stale: is_stale(program.updated_at, policy, now),
        is_approval_country: policy.is_approval_country(program.country.as_deref()),
    }
}

// Unknown age counts as stale so staff have to verify the program first.
fn is_stale(updated_at: Option<DateTime<Utc>>, policy: &LockPolicy, now: DateTime<Utc>) -> bool {
    match updated_at {
        Some(updated_at) => now.signed_duration_since(updated_at) >= policy.stale_after(),
        None => true,
    }
}
