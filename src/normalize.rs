use serde_json::Value;
use thiserror::Error;

use crate::models::{AttendanceRecord, AttendanceStatus};

/// Raised only for genuinely malformed input. Unrecognized-but-well-shaped
/// values degrade to `Unknown`/`None` instead of erroring.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("raw attendance record is not a JSON object")]
    NotAnObject,

    #[error("raw attendance record is missing required field `{field}`")]
    MissingField { field: &'static str },
}

/// Converts one raw attendance-log entry, as fetched from the upstream
/// store, into a canonical record. Upstream payloads vary in key casing
/// (`userId` vs `userID`) and carry ids as either strings or numbers; both
/// shapes are accepted. `classId` is denormalized join convenience and
/// defaults to empty when absent.
pub fn normalize(raw: &Value) -> Result<AttendanceRecord, NormalizationError> {
    let obj = raw.as_object().ok_or(NormalizationError::NotAnObject)?;

    let user_id = id_field(obj, &["userId", "userID", "user_id"])
        .ok_or(NormalizationError::MissingField { field: "userId" })?;
    let event_id = id_field(obj, &["eventId", "eventID", "event_id"])
        .ok_or(NormalizationError::MissingField { field: "eventId" })?;
    let class_id = id_field(obj, &["classId", "classID", "class_id"]).unwrap_or_default();

    let status = normalize_status(field(obj, &["status"]).and_then(Value::as_str));
    let minutes_late = normalize_minutes_late(status, field(obj, &["minutesLate", "minutes_late"]));

    Ok(AttendanceRecord {
        user_id,
        event_id,
        class_id,
        status,
        minutes_late,
    })
}

/// Builds a record from already-typed parts, e.g. a SQL row. Applies the
/// same status and minutes-late rules as [`normalize`].
pub fn from_parts(
    user_id: String,
    event_id: String,
    class_id: String,
    status: Option<&str>,
    minutes_late: Option<i64>,
) -> AttendanceRecord {
    let status = normalize_status(status);
    let minutes_late = match status {
        AttendanceStatus::Tardy => minutes_late.and_then(|m| u32::try_from(m).ok()),
        _ => None,
    };
    AttendanceRecord {
        user_id,
        event_id,
        class_id,
        status,
        minutes_late,
    }
}

/// Trims and lower-cases the raw status. Exactly `present`, `tardy`, and
/// `absent` map to their variants; anything else, including a missing
/// status, is `Unknown`. Never fails.
pub fn normalize_status(raw: Option<&str>) -> AttendanceStatus {
    match raw.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("present") => AttendanceStatus::Present,
        Some("tardy") => AttendanceStatus::Tardy,
        Some("absent") => AttendanceStatus::Absent,
        _ => AttendanceStatus::Unknown,
    }
}

/// Minutes late are kept only for tardy records: a non-negative integer
/// from a JSON number or numeric string. Anything else is dropped, never
/// rejected.
fn normalize_minutes_late(status: AttendanceStatus, raw: Option<&Value>) -> Option<u32> {
    if status != AttendanceStatus::Tardy {
        return None;
    }
    match raw? {
        Value::Number(n) => n.as_u64().and_then(|m| u32::try_from(m).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn field<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

fn id_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    match field(obj, keys)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
