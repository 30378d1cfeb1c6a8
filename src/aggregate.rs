use std::collections::HashMap;

use crate::classify::classify;
use crate::models::{
    AttendanceRecord, AttendanceStatus, ClassAttendanceSummary, ClassRef, SessionEvent,
};
use crate::policy::AttendancePolicy;

/// Computes one class's attendance summary from its full event list and the
/// user's records for that class.
///
/// Every event is classified exactly once: by its record's status when one
/// exists, as unrecorded otherwise. Records whose event is not in `events`
/// are ignored. When `records` contains duplicates for the same event, the
/// last one in input order wins; for distinct events the input order has no
/// effect on the result.
pub fn aggregate(
    class: &ClassRef,
    events: &[SessionEvent],
    records: &[AttendanceRecord],
    policy: &AttendancePolicy,
) -> ClassAttendanceSummary {
    let mut by_event: HashMap<&str, &AttendanceRecord> = HashMap::new();
    for record in records {
        by_event.insert(record.event_id.as_str(), record);
    }

    let mut present_count = 0;
    let mut tardy_count = 0;
    let mut absent_count = 0;
    let mut unrecorded_count = 0;

    for event in events {
        match by_event.get(event.event_id.as_str()).map(|r| r.status) {
            Some(AttendanceStatus::Present) => present_count += 1,
            Some(AttendanceStatus::Tardy) => tardy_count += 1,
            Some(AttendanceStatus::Absent) => absent_count += 1,
            // Unknown is a recorded data gap; it joins the unrecorded
            // bucket rather than counting toward attendance.
            Some(AttendanceStatus::Unknown) | None => unrecorded_count += 1,
        }
    }

    let total_events = events.len();
    let credit = present_count as f64 + policy.tardy_credit.weight() * tardy_count as f64;
    let rate_percent = if total_events == 0 {
        0
    } else {
        (credit / total_events as f64 * 100.0).round() as u8
    };

    ClassAttendanceSummary {
        class_id: class.class_id.clone(),
        display_name: class.display_name.clone(),
        present_count,
        tardy_count,
        absent_count,
        unrecorded_count,
        attended_count: present_count + tardy_count,
        total_events,
        rate_percent,
        band: classify(rate_percent, policy.thresholds),
        strikes: absent_count,
    }
}

/// Summary for a class with no fetched events or records: rate 0, band
/// computed from 0, no strikes. Used by the roster merge so every enrolled
/// class still shows up.
pub fn empty_summary(class: &ClassRef, policy: &AttendancePolicy) -> ClassAttendanceSummary {
    aggregate(class, &[], &[], policy)
}
