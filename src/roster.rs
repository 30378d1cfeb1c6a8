use std::collections::HashMap;

use crate::aggregate::empty_summary;
use crate::models::{ClassAttendanceSummary, ClassRef, RosterEntry};
use crate::policy::AttendancePolicy;

/// Joins a user's enrolled classes with their precomputed summaries for the
/// dashboard view. Every enrolled class produces exactly one entry, in the
/// enrollment order of `classes`; a class with no summary (zero events
/// fetched, aggregation skipped) gets a synthesized zero summary instead of
/// being dropped. No I/O happens here.
pub fn build_roster(
    classes: &[ClassRef],
    summaries: &HashMap<String, ClassAttendanceSummary>,
    policy: &AttendancePolicy,
) -> Vec<RosterEntry> {
    classes
        .iter()
        .map(|class| RosterEntry {
            class: class.clone(),
            summary: summaries
                .get(&class.class_id)
                .cloned()
                .unwrap_or_else(|| empty_summary(class, policy)),
        })
        .collect()
}
