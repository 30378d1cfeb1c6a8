use std::collections::HashMap;

use anyhow::Context;
use chrono::NaiveDate;
use futures::future::try_join_all;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::aggregate::aggregate;
use crate::models::{AttendanceRecord, ClassAttendanceSummary, ClassRef, SessionEvent};
use crate::normalize;
use crate::policy::AttendancePolicy;
use crate::prefs::UserPreferences;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let classes = vec![
        ("3162", "CS 3162.002", "MWF 10:00-10:50", "ECSS 2.306"),
        ("4347", "CS 4347.001", "TR 13:00-14:15", "ECSW 1.315"),
        ("acm", "ACM Projects", "Wed 19:00", "ECSS 2.102"),
    ];

    for (class_id, display_name, schedule_label, location) in classes {
        sqlx::query(
            r#"
            INSERT INTO oneface.classes (class_id, display_name, schedule_label, location)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (class_id) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                schedule_label = EXCLUDED.schedule_label,
                location = EXCLUDED.location
            "#,
        )
        .bind(class_id)
        .bind(display_name)
        .bind(schedule_label)
        .bind(location)
        .execute(pool)
        .await?;
    }

    let events = vec![
        ("3162", "ev-101", "Lecture 1", Some("2026-01-12"), "class"),
        ("3162", "ev-102", "Lecture 2", Some("2026-01-14"), "class"),
        ("3162", "ev-103", "Lecture 3", Some("2026-01-16"), "class"),
        ("4347", "ev-201", "DB Lecture 1", Some("2026-01-13"), "class"),
        ("4347", "ev-202", "DB Lecture 2", Some("2026-01-15"), "class"),
        ("acm", "ev-301", "Weekly Meeting", None, "organization"),
    ];

    for (class_id, event_id, title, occurs_at, kind) in events {
        let occurs_at: Option<NaiveDate> = match occurs_at {
            Some(raw) => Some(raw.parse().context("invalid seed date")?),
            None => None,
        };
        sqlx::query(
            r#"
            INSERT INTO oneface.events (class_id, event_id, title, occurs_at, kind)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (class_id, event_id) DO UPDATE
            SET title = EXCLUDED.title, occurs_at = EXCLUDED.occurs_at, kind = EXCLUDED.kind
            "#,
        )
        .bind(class_id)
        .bind(event_id)
        .bind(title)
        .bind(occurs_at)
        .bind(kind)
        .execute(pool)
        .await?;
    }

    for (user_id, class_id) in [("tester", "3162"), ("tester", "4347"), ("tester", "acm")] {
        sqlx::query(
            r#"
            INSERT INTO oneface.class_members (user_id, class_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, class_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(class_id)
        .execute(pool)
        .await?;
    }

    // Mixed-quality log entries on purpose: casing varies upstream, one
    // status is unrecognized, and ev-103/ev-301 stay unrecorded.
    let logs = vec![
        ("tester", "ev-101", "3162", Some("Present"), None),
        ("tester", "ev-102", "3162", Some("tardy"), Some(7)),
        ("tester", "ev-201", "4347", Some("ABSENT"), None),
        ("tester", "ev-202", "4347", Some("excused"), None),
    ];

    for (user_id, event_id, class_id, status, minutes_late) in logs {
        sqlx::query(
            r#"
            INSERT INTO oneface.attendance_log (user_id, event_id, class_id, status, minutes_late)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, event_id) DO UPDATE
            SET status = EXCLUDED.status,
                minutes_late = EXCLUDED.minutes_late,
                class_id = EXCLUDED.class_id
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .bind(class_id)
        .bind(status)
        .bind(minutes_late)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Classes the user is enrolled in, in enrollment order. The order is
/// meaningful to the dashboard and the roster merge preserves it.
pub async fn list_enrolled_classes(pool: &PgPool, user_id: &str) -> anyhow::Result<Vec<ClassRef>> {
    let rows = sqlx::query(
        r#"
        SELECT c.class_id, c.display_name, c.schedule_label, c.location
        FROM oneface.class_members m
        JOIN oneface.classes c ON c.class_id = m.class_id
        WHERE m.user_id = $1
        ORDER BY m.enrolled_seq
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ClassRef {
            class_id: row.get("class_id"),
            display_name: row.get("display_name"),
            schedule_label: row.get("schedule_label"),
            location: row.get("location"),
        })
        .collect())
}

pub async fn get_class(pool: &PgPool, class_id: &str) -> anyhow::Result<Option<ClassRef>> {
    let row = sqlx::query(
        r#"
        SELECT class_id, display_name, schedule_label, location
        FROM oneface.classes
        WHERE class_id = $1
        "#,
    )
    .bind(class_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| ClassRef {
        class_id: row.get("class_id"),
        display_name: row.get("display_name"),
        schedule_label: row.get("schedule_label"),
        location: row.get("location"),
    }))
}

pub async fn list_events(pool: &PgPool, class_id: &str) -> anyhow::Result<Vec<SessionEvent>> {
    let rows = sqlx::query(
        r#"
        SELECT class_id, event_id, title, occurs_at, kind
        FROM oneface.events
        WHERE class_id = $1
        ORDER BY occurs_at NULLS FIRST, event_id
        "#,
    )
    .bind(class_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| SessionEvent {
            event_id: row.get("event_id"),
            class_id: row.get("class_id"),
            title: row.get("title"),
            occurs_at: row.get("occurs_at"),
            kind: row.get("kind"),
        })
        .collect())
}

/// Raw log rows for one user and class, passed through the normalizer so
/// downstream code only ever sees canonical records.
pub async fn list_attendance(
    pool: &PgPool,
    user_id: &str,
    class_id: &str,
) -> anyhow::Result<Vec<AttendanceRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT user_id, event_id, class_id, status, minutes_late
        FROM oneface.attendance_log
        WHERE user_id = $1 AND class_id = $2
        "#,
    )
    .bind(user_id)
    .bind(class_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let status: Option<String> = row.get("status");
            let minutes_late: Option<i32> = row.get("minutes_late");
            normalize::from_parts(
                row.get("user_id"),
                row.get("event_id"),
                row.get("class_id"),
                status.as_deref(),
                minutes_late.map(i64::from),
            )
        })
        .collect())
}

/// Fetches events and records for every class concurrently and aggregates
/// each one. Safe to fan out: each aggregation is stateless, and the roster
/// merge re-imposes enrollment order afterwards.
pub async fn fetch_summaries(
    pool: &PgPool,
    user_id: &str,
    classes: &[ClassRef],
    policy: &AttendancePolicy,
) -> anyhow::Result<HashMap<String, ClassAttendanceSummary>> {
    let pairs = try_join_all(classes.iter().map(|class| async move {
        let events = list_events(pool, &class.class_id).await?;
        let records = list_attendance(pool, user_id, &class.class_id).await?;
        debug!(
            class_id = %class.class_id,
            events = events.len(),
            records = records.len(),
            "aggregating class"
        );
        Ok::<_, anyhow::Error>((
            class.class_id.clone(),
            aggregate(class, &events, &records, policy),
        ))
    }))
    .await?;

    Ok(pairs.into_iter().collect())
}

/// Imports attendance rows from a CSV file. Rows upsert by (user, event),
/// so re-importing a corrected export simply overwrites the old outcome.
pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        user_id: String,
        class_id: String,
        event_id: String,
        status: Option<String>,
        minutes_late: Option<i32>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut imported = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        sqlx::query(
            r#"
            INSERT INTO oneface.attendance_log (user_id, event_id, class_id, status, minutes_late)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, event_id) DO UPDATE
            SET status = EXCLUDED.status,
                minutes_late = EXCLUDED.minutes_late,
                class_id = EXCLUDED.class_id
            "#,
        )
        .bind(&row.user_id)
        .bind(&row.event_id)
        .bind(&row.class_id)
        .bind(&row.status)
        .bind(row.minutes_late)
        .execute(pool)
        .await?;
        imported += 1;
    }

    debug!(imported, "csv import complete");
    Ok(imported)
}

pub async fn fetch_prefs(pool: &PgPool, user_id: &str) -> anyhow::Result<UserPreferences> {
    let row = sqlx::query("SELECT prefs FROM oneface.user_prefs WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let raw: String = row.get("prefs");
            serde_json::from_str(&raw).context("stored preferences are not valid JSON")
        }
        None => Ok(UserPreferences::default()),
    }
}

pub async fn save_prefs(
    pool: &PgPool,
    user_id: &str,
    prefs: &UserPreferences,
) -> anyhow::Result<()> {
    let raw = serde_json::to_string(prefs)?;
    sqlx::query(
        r#"
        INSERT INTO oneface.user_prefs (user_id, prefs)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET prefs = EXCLUDED.prefs
        "#,
    )
    .bind(user_id)
    .bind(raw)
    .execute(pool)
    .await?;
    Ok(())
}
