use serde::Serialize;

use crate::models::ClassAttendanceSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrikeAssessment {
    pub strikes: usize,
    pub one_away: bool,
    pub exceeded: bool,
}

/// Strikes are accumulated absences only. Unrecorded events are a data gap,
/// not a policy violation, and never count.
pub fn compute_strikes(summary: &ClassAttendanceSummary, max_strikes: usize) -> StrikeAssessment {
    let strikes = summary.absent_count;
    StrikeAssessment {
        strikes,
        one_away: strikes + 1 == max_strikes,
        exceeded: strikes >= max_strikes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Band;

    fn summary_with_absences(absent_count: usize) -> ClassAttendanceSummary {
        ClassAttendanceSummary {
            class_id: "c-1".into(),
            display_name: "CS 3162.002".into(),
            present_count: 10,
            tardy_count: 0,
            absent_count,
            unrecorded_count: 2,
            attended_count: 10,
            total_events: 12 + absent_count,
            rate_percent: 80,
            band: Band::Warning,
            strikes: absent_count,
        }
    }

    #[test]
    fn one_away_at_penultimate_strike() {
        let assessment = compute_strikes(&summary_with_absences(2), 3);
        assert_eq!(assessment.strikes, 2);
        assert!(assessment.one_away);
        assert!(!assessment.exceeded);
    }

    #[test]
    fn exceeded_at_the_limit() {
        let assessment = compute_strikes(&summary_with_absences(3), 3);
        assert!(!assessment.one_away);
        assert!(assessment.exceeded);

        let assessment = compute_strikes(&summary_with_absences(5), 3);
        assert!(assessment.exceeded);
    }

    #[test]
    fn clean_record_has_no_flags() {
        let assessment = compute_strikes(&summary_with_absences(0), 3);
        assert_eq!(assessment.strikes, 0);
        assert!(!assessment.one_away);
        assert!(!assessment.exceeded);
    }

    #[test]
    fn unrecorded_events_are_not_strikes() {
        // Two unrecorded events in the fixture; only absences count.
        let assessment = compute_strikes(&summary_with_absences(1), 3);
        assert_eq!(assessment.strikes, 1);
    }

    #[test]
    fn max_strikes_is_a_parameter() {
        let assessment = compute_strikes(&summary_with_absences(4), 5);
        assert!(assessment.one_away);
        assert!(!assessment.exceeded);

        let assessment = compute_strikes(&summary_with_absences(0), 0);
        assert!(!assessment.one_away);
        assert!(assessment.exceeded);
    }
}
