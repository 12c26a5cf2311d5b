use std::collections::BTreeSet;

use chrono::Duration;

/// Programs whose metadata is older than this many days are stale.
pub const DEFAULT_STALE_AFTER_DAYS: i64 = 182;

/// Upper bound on the freshness threshold, roughly one hundred years.
pub const MAX_STALE_AFTER_DAYS: i64 = 36_500;

/// Countries whose program data must be re-verified by staff instead of unlocked by flag.
pub const DEFAULT_APPROVAL_COUNTRIES: [&str; 7] = ["au", "ca", "ch", "in", "nl", "uk", "us"];

/// Injected lock policy: the approval-country set and the freshness threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockPolicy {
    approval_countries: BTreeSet<String>,
    stale_after_days: i64,
}

impl LockPolicy {
    pub fn new<I, S>(approval_countries: I, stale_after_days: i64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let approval_countries = approval_countries
            .into_iter()
            .filter_map(|country| normalize_country(country.as_ref()))
            .collect();

        Self {
            approval_countries,
            stale_after_days: stale_after_days.clamp(0, MAX_STALE_AFTER_DAYS),
        }
    }

    pub fn is_approval_country(&self, country: Option<&str>) -> bool {
        country
            .and_then(normalize_country)
            .map(|country| self.approval_countries.contains(&country))
            .unwrap_or(false)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::try_days(self.stale_after_days).unwrap_or(Duration::MAX)
    }

    pub fn stale_after_days(&self) -> i64 {
        self.stale_after_days
    }

    pub fn approval_countries(&self) -> impl Iterator<Item = &str> {
        self.approval_countries.iter().map(String::as_str)
    }
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_APPROVAL_COUNTRIES, DEFAULT_STALE_AFTER_DAYS)
    }
}

fn normalize_country(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}
