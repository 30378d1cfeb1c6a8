use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A class or organization a user can be enrolled in. Owned by the class
/// store; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassRef {
    pub class_id: String,
    pub display_name: String,
    pub schedule_label: String,
    pub location: String,
}

/// One scheduled occurrence of a class. `occurs_at` may be missing upstream
/// and must be tolerated everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionEvent {
    pub event_id: String,
    pub class_id: String,
    pub title: String,
    pub occurs_at: Option<NaiveDate>,
    pub kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Tardy,
    Absent,
    /// Well-shaped record with an unrecognized or missing status. Counts
    /// toward the event total, never toward attendance.
    Unknown,
}

impl AttendanceStatus {
    pub fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Tardy => "Tardy",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Unknown => "Unknown",
        }
    }
}

/// The outcome of one user at one event. At most one record exists per
/// (user, event); a missing record means the event is unrecorded, which is
/// distinct from absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub user_id: String,
    pub event_id: String,
    pub class_id: String,
    pub status: AttendanceStatus,
    /// Only meaningful when `status` is Tardy.
    pub minutes_late: Option<u32>,
}

/// Severity band for an attendance rate. Ordered by goodness: Critical <
/// Warning < Good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Critical,
    Warning,
    Good,
}

impl Band {
    pub fn label(self) -> &'static str {
        match self {
            Band::Good => "good",
            Band::Warning => "warning",
            Band::Critical => "critical",
        }
    }
}

/// Derived per aggregation call; never persisted or cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassAttendanceSummary {
    pub class_id: String,
    pub display_name: String,
    pub present_count: usize,
    pub tardy_count: usize,
    pub absent_count: usize,
    pub unrecorded_count: usize,
    /// present + tardy, independent of the tardy credit weight.
    pub attended_count: usize,
    pub total_events: usize,
    pub rate_percent: u8,
    pub band: Band,
    pub strikes: usize,
}

/// One enrolled class paired with its summary, for the dashboard roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub class: ClassRef,
    pub summary: ClassAttendanceSummary,
}
