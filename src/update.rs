use chrono::{DateTime, Utc};

use crate::engine::PreferenceEngine;
use crate::model::UpdateCheckFrequency;

// ── Scheduling ────────────────────────────────────────────────────────────────

/// Whether an automatic update check is due. `Manual` never auto-checks; a
/// missing last-check timestamp means the check has never run and is due now.
pub fn check_due(
    frequency: UpdateCheckFrequency,
    last_check: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    if frequency == UpdateCheckFrequency::Manual {
        return false;
    }
    match last_check {
        None => true,
        Some(last) => (now - last).num_days() >= frequency.days(),
    }
}

// ── Version comparison ────────────────────────────────────────────────────────

/// Numeric dotted-version comparison, tolerant of a leading `v`/`V` and of
/// differing component counts. Non-numeric components count as zero.
pub fn version_is_newer(latest: &str, current: &str) -> bool {
    fn components(s: &str) -> Vec<u64> {
        s.trim()
            .trim_start_matches(['v', 'V'])
            .split('.')
            .map(|part| part.trim().parse().unwrap_or(0))
            .collect()
    }

    let a = components(latest);
    let b = components(current);
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        if x != y {
            return x > y;
        }
    }
    false
}

// ── In-flight gate ────────────────────────────────────────────────────────────

/// Gate for the release-feed request. The request itself lives with the
/// host; this type only guarantees that two checks never overlap and that a
/// finished check stamps the last-check field through the engine.
#[derive(Debug, Default)]
pub struct UpdateChecker {
    in_flight: bool,
}

impl UpdateChecker {
    pub fn new() -> UpdateChecker {
        UpdateChecker::default()
    }

    /// Caller-visible "check in progress" flag.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Check-then-set entry. Returns `false` if a check is already running;
    /// the caller must not start a second request in that case.
    pub fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Completion, success or failure: clears the flag and records when the
    /// check happened.
    pub fn finish(&mut self, engine: &mut PreferenceEngine, now: DateTime<Utc>) {
        self.in_flight = false;
        engine.update_structural(|s| s.last_update_check = Some(now));
    }
}
