use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{AttendanceRecord, AttendanceStatus, SessionEvent};

/// One row of the per-class drill-down table and its CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    pub event_id: String,
    pub session_name: String,
    pub date: Option<NaiveDate>,
    pub status: AttendanceStatus,
    pub minutes_late: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortField {
    #[default]
    Date,
    Session,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Repeated clicks on the same column header flip the direction.
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Pairs every event of a class with the user's record for it. Events with
/// no record appear with `Unknown` status so the drill-down always shows
/// the full session list. Duplicate records follow the aggregator's
/// last-wins rule. Rows come back in the order of `events`.
pub fn build_history(events: &[SessionEvent], records: &[AttendanceRecord]) -> Vec<HistoryRow> {
    let mut by_event: HashMap<&str, &AttendanceRecord> = HashMap::new();
    for record in records {
        by_event.insert(record.event_id.as_str(), record);
    }

    events
        .iter()
        .map(|event| {
            let record = by_event.get(event.event_id.as_str());
            HistoryRow {
                event_id: event.event_id.clone(),
                session_name: event.title.clone(),
                date: event.occurs_at,
                status: record.map_or(AttendanceStatus::Unknown, |r| r.status),
                minutes_late: record.and_then(|r| r.minutes_late),
            }
        })
        .collect()
}

/// Stable sort by the active column. Rows without a date sort before dated
/// ones when ascending.
pub fn sort_history(rows: &mut [HistoryRow], field: SortField, direction: SortDirection) {
    match field {
        SortField::Date => rows.sort_by(|a, b| a.date.cmp(&b.date)),
        SortField::Session => rows.sort_by(|a, b| a.session_name.cmp(&b.session_name)),
        SortField::Status => rows.sort_by(|a, b| a.status.label().cmp(b.status.label())),
    }
    if direction == SortDirection::Descending {
        rows.reverse();
    }
}

/// The status cell as rendered in the table and the CSV: tardy rows spell
/// out the lateness, everything else shows the plain status.
pub fn status_cell(row: &HistoryRow) -> String {
    match row.status {
        AttendanceStatus::Tardy => {
            let minutes = row.minutes_late.unwrap_or(0);
            let unit = if minutes == 1 { "min" } else { "mins" };
            format!("Tardy: {minutes} {unit} late")
        }
        status => status.label().to_string(),
    }
}

/// Serializes the rows in their current order as `Date,Session,Status` CSV.
pub fn export_csv(rows: &[HistoryRow]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Date", "Session", "Status"])?;
    for row in rows {
        let date = row.date.map(|d| d.to_string()).unwrap_or_default();
        writer.write_record([date.as_str(), row.session_name.as_str(), &status_cell(row)])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush csv writer: {err}"))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, title: &str, date: Option<&str>) -> SessionEvent {
        SessionEvent {
            event_id: id.into(),
            class_id: "c-1".into(),
            title: title.into(),
            occurs_at: date.map(|d| d.parse().unwrap()),
            kind: "class".into(),
        }
    }

    fn record(event_id: &str, status: AttendanceStatus, minutes_late: Option<u32>) -> AttendanceRecord {
        AttendanceRecord {
            user_id: "u-1".into(),
            event_id: event_id.into(),
            class_id: "c-1".into(),
            status,
            minutes_late,
        }
    }

    fn sample_rows() -> Vec<HistoryRow> {
        let events = vec![
            event("e-1", "Lecture 1", Some("2026-01-12")),
            event("e-2", "Lecture 2", Some("2026-01-14")),
            event("e-3", "Lecture 3", None),
        ];
        let records = vec![
            record("e-1", AttendanceStatus::Present, None),
            record("e-2", AttendanceStatus::Tardy, Some(7)),
        ];
        build_history(&events, &records)
    }

    #[test]
    fn unrecorded_events_still_get_a_row() {
        let rows = sample_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].status, AttendanceStatus::Unknown);
        assert_eq!(rows[2].minutes_late, None);
    }

    #[test]
    fn date_sort_places_dateless_rows_first_ascending() {
        let mut rows = sample_rows();
        sort_history(&mut rows, SortField::Date, SortDirection::Ascending);
        assert_eq!(rows[0].event_id, "e-3");
        assert_eq!(rows[1].event_id, "e-1");

        sort_history(&mut rows, SortField::Date, SortDirection::Descending);
        assert_eq!(rows[0].event_id, "e-2");
        assert_eq!(rows[2].event_id, "e-3");
    }

    #[test]
    fn session_and_status_sorts() {
        let mut rows = sample_rows();
        sort_history(&mut rows, SortField::Session, SortDirection::Descending);
        assert_eq!(rows[0].session_name, "Lecture 3");

        sort_history(&mut rows, SortField::Status, SortDirection::Ascending);
        let labels: Vec<_> = rows.iter().map(|r| r.status.label()).collect();
        assert_eq!(labels, vec!["Present", "Tardy", "Unknown"]);
    }

    #[test]
    fn direction_toggles() {
        assert_eq!(SortDirection::Ascending.toggle(), SortDirection::Descending);
        assert_eq!(SortDirection::Descending.toggle(), SortDirection::Ascending);
    }

    #[test]
    fn tardy_cell_spells_out_lateness() {
        let rows = sample_rows();
        assert_eq!(status_cell(&rows[1]), "Tardy: 7 mins late");

        let one_min = HistoryRow {
            minutes_late: Some(1),
            ..rows[1].clone()
        };
        assert_eq!(status_cell(&one_min), "Tardy: 1 min late");

        let missing = HistoryRow {
            minutes_late: None,
            ..rows[1].clone()
        };
        assert_eq!(status_cell(&missing), "Tardy: 0 mins late");
    }

    #[test]
    fn csv_export_matches_expected_shape() {
        let rows = sample_rows();
        let csv = export_csv(&rows).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "Date,Session,Status");
        assert_eq!(lines[1], "2026-01-12,Lecture 1,Present");
        assert_eq!(lines[2], "2026-01-14,Lecture 2,Tardy: 7 mins late");
        assert_eq!(lines[3], ",Lecture 3,Unknown");
    }

    #[test]
    fn csv_respects_the_active_sort() {
        let mut rows = sample_rows();
        sort_history(&mut rows, SortField::Session, SortDirection::Descending);
        let csv = export_csv(&rows).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[1], ",Lecture 3,Unknown");
        assert_eq!(lines[3], "2026-01-12,Lecture 1,Present");
    }
}
