use std::fmt::Write;

use crate::models::RosterEntry;
use crate::policy::AttendancePolicy;
use crate::strikes::compute_strikes;

pub fn build_report(user_label: &str, roster: &[RosterEntry], policy: &AttendancePolicy) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# OneFace Attendance Report");
    let _ = writeln!(
        output,
        "Generated for {} across {} classes (good >= {}%, warning >= {}%)",
        user_label,
        roster.len(),
        policy.thresholds.good,
        policy.thresholds.warning
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Class Overview");

    if roster.is_empty() {
        let _ = writeln!(output, "No enrolled classes.");
    } else {
        for entry in roster {
            let summary = &entry.summary;
            let _ = writeln!(
                output,
                "- {}: {}% {} ({} present, {} tardy, {} absent, {} unrecorded of {} sessions)",
                entry.class.display_name,
                summary.rate_percent,
                summary.band.label(),
                summary.present_count,
                summary.tardy_count,
                summary.absent_count,
                summary.unrecorded_count,
                summary.total_events
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Strike Watch");

    let mut flagged = 0;
    for entry in roster {
        let assessment = compute_strikes(&entry.summary, policy.max_strikes);
        if assessment.exceeded {
            let _ = writeln!(
                output,
                "- {}: {}/{} absences, limit exceeded",
                entry.class.display_name, assessment.strikes, policy.max_strikes
            );
            flagged += 1;
        } else if assessment.one_away {
            let _ = writeln!(
                output,
                "- {}: {}/{} absences, one more reaches the limit",
                entry.class.display_name, assessment.strikes, policy.max_strikes
            );
            flagged += 1;
        }
    }
    if flagged == 0 {
        let _ = writeln!(output, "No classes at or near the strike limit.");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Perfect Attendance");

    let perfect: Vec<&RosterEntry> = roster
        .iter()
        .filter(|entry| {
            entry.summary.total_events > 0
                && entry.summary.attended_count == entry.summary.total_events
        })
        .collect();

    if perfect.is_empty() {
        let _ = writeln!(output, "None this term.");
    } else {
        for entry in perfect {
            let _ = writeln!(
                output,
                "- {} ({} sessions)",
                entry.class.display_name, entry.summary.total_events
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::models::{AttendanceRecord, AttendanceStatus, ClassRef, SessionEvent};

    fn entry(name: &str, statuses: &[Option<AttendanceStatus>]) -> RosterEntry {
        let class = ClassRef {
            class_id: name.to_lowercase().replace(' ', "-"),
            display_name: name.into(),
            schedule_label: "MW 11:30".into(),
            location: "JO 3.516".into(),
        };
        let events: Vec<SessionEvent> = (0..statuses.len())
            .map(|n| SessionEvent {
                event_id: format!("{}-{n}", class.class_id),
                class_id: class.class_id.clone(),
                title: format!("Session {n}"),
                occurs_at: None,
                kind: "class".into(),
            })
            .collect();
        let records: Vec<AttendanceRecord> = statuses
            .iter()
            .enumerate()
            .filter_map(|(n, status)| {
                status.map(|status| AttendanceRecord {
                    user_id: "u-1".into(),
                    event_id: format!("{}-{n}", class.class_id),
                    class_id: class.class_id.clone(),
                    status,
                    minutes_late: None,
                })
            })
            .collect();
        let summary = aggregate(&class, &events, &records, &AttendancePolicy::default());
        RosterEntry { class, summary }
    }

    #[test]
    fn report_covers_every_class() {
        let roster = vec![
            entry("CS 3162.002", &[Some(AttendanceStatus::Present); 4]),
            entry(
                "MKT 3300.001",
                &[
                    Some(AttendanceStatus::Present),
                    Some(AttendanceStatus::Absent),
                    Some(AttendanceStatus::Absent),
                    None,
                ],
            ),
        ];
        let report = build_report("u-1", &roster, &AttendancePolicy::default());

        assert!(report.contains("# OneFace Attendance Report"));
        assert!(report.contains("- CS 3162.002: 100% good (4 present"));
        assert!(report.contains("- MKT 3300.001: 25% critical (1 present, 0 tardy, 2 absent, 1 unrecorded of 4 sessions)"));
        assert!(report.contains("- MKT 3300.001: 2/3 absences, one more reaches the limit"));
        assert!(report.contains("- CS 3162.002 (4 sessions)"));
    }

    #[test]
    fn exceeded_classes_are_called_out() {
        let roster = vec![entry("CS 4347.001", &[Some(AttendanceStatus::Absent); 3])];
        let report = build_report("u-1", &roster, &AttendancePolicy::default());
        assert!(report.contains("- CS 4347.001: 3/3 absences, limit exceeded"));
        assert!(report.contains("None this term."));
    }

    #[test]
    fn empty_roster_has_empty_state_lines() {
        let report = build_report("u-1", &[], &AttendancePolicy::default());
        assert!(report.contains("No enrolled classes."));
        assert!(report.contains("No classes at or near the strike limit."));
        assert!(report.contains("None this term."));
    }

    #[test]
    fn report_is_deterministic() {
        let roster = vec![entry("ACM Projects", &[Some(AttendanceStatus::Tardy); 2])];
        let policy = AttendancePolicy::default();
        assert_eq!(
            build_report("u-1", &roster, &policy),
            build_report("u-1", &roster, &policy)
        );
    }
}
