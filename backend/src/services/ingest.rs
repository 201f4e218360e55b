//! Async roster ingest service.
//!
//! Handles roster upload in the background: parse and expand the JSON
//! payload, run the conflict validator and staffing summary as advisory
//! checks, and store the snapshot, emitting progress logs along the way.

use crate::services::job_tracker::{JobTracker, LogLevel};
use crate::services::store::RosterStore;
use crate::services::{summary, validator};
use crate::models;

/// Ingest a roster asynchronously: parse, validate, summarize, and store.
///
/// Designed to be spawned as a background task. Progress is logged to the
/// job tracker so clients can follow along via SSE. Validation findings are
/// advisory and never block the upload.
pub async fn process_roster_async(
    job_id: String,
    tracker: JobTracker,
    store: RosterStore,
    roster_name: String,
    roster_json: String,
) -> Result<i64, String> {
    tracker.log(&job_id, LogLevel::Info, "Starting roster ingest...");

    tracker.log(&job_id, LogLevel::Info, "Parsing roster JSON...");
    let snapshot = match tokio::task::spawn_blocking({
        let roster_json = roster_json.clone();
        let roster_name = roster_name.clone();
        move || {
            models::parse_roster_json_str(&roster_json).map(|mut s| {
                if s.name.is_empty() {
                    s.name = roster_name;
                }
                s
            })
        }
    })
    .await
    {
        Ok(Ok(snapshot)) => {
            tracker.log_progress(
                &job_id,
                LogLevel::Success,
                format!(
                    "Parsed roster with {} days, {} members, {} stations",
                    snapshot.days.len(),
                    snapshot.memberships.len(),
                    snapshot.required_stations.len()
                ),
                0.4,
            );
            snapshot
        }
        Ok(Err(e)) => {
            let msg = format!("Failed to parse roster: {}", e);
            tracker.fail_job(&job_id, &msg);
            return Err(msg);
        }
        Err(e) => {
            let msg = format!("Parse task panic: {}", e);
            tracker.fail_job(&job_id, &msg);
            return Err(msg);
        }
    };

    let alerts = validator::validate_roster(&snapshot);
    if alerts.is_empty() {
        tracker.log_progress(&job_id, LogLevel::Info, "No assignment conflicts found", 0.6);
    } else {
        tracker.log_progress(
            &job_id,
            LogLevel::Warning,
            format!("{} assignment conflict(s) found", alerts.len()),
            0.6,
        );
    }

    let staffing = summary::summarize_staffing(&snapshot);
    if staffing.is_solvable {
        tracker.log_progress(
            &job_id,
            LogLevel::Info,
            "All stations have qualified personnel",
            0.8,
        );
    } else {
        tracker.log_progress(
            &job_id,
            LogLevel::Warning,
            "Schedule is not solvable as staffed",
            0.8,
        );
    }
    for warning in &staffing.warnings {
        tracker.log(&job_id, LogLevel::Warning, warning.clone());
    }

    let name = snapshot.name.clone();
    let checksum = snapshot.checksum.clone();
    let roster_id = store.insert(snapshot);
    tracker.log_progress(
        &job_id,
        LogLevel::Success,
        format!("Roster ingest complete (ID: {})", roster_id),
        1.0,
    );

    let result = serde_json::json!({
        "roster_id": roster_id,
        "roster_name": name,
        "checksum": checksum,
        "alert_count": alerts.len(),
        "is_solvable": staffing.is_solvable,
    });
    tracker.complete_job(&job_id, Some(result));

    Ok(roster_id)
}
