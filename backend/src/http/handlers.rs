//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for the actual analysis.

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use super::dto::{
    AlertsResponse, AvailabilityGridResponse, AvailabilityQuery, AvailabilityResponse,
    CandidatePreview, CreateRosterRequest, CreateRosterResponse, HealthResponse,
    JobStatusResponse, QuotasResponse, RosterListResponse, SolverCandidate, StaffingSummary,
    WorkloadReport,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{DayId, StationId};
use crate::models::RosterSnapshot;
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn load_roster(state: &AppState, roster_id: i64) -> Result<Arc<RosterSnapshot>, AppError> {
    state
        .rosters
        .get(roster_id)
        .ok_or_else(|| AppError::NotFound(format!("Roster {} not found", roster_id)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        rosters: state.rosters.list().len(),
    }))
}

// =============================================================================
// Roster CRUD
// =============================================================================

/// GET /v1/rosters
pub async fn list_rosters(State(state): State<AppState>) -> HandlerResult<RosterListResponse> {
    let rosters = state.rosters.list();
    let total = rosters.len();
    Ok(Json(RosterListResponse { rosters, total }))
}

/// POST /v1/rosters
///
/// Upload a roster asynchronously. Returns a job ID for tracking progress.
pub async fn create_roster(
    State(state): State<AppState>,
    Json(request): Json<CreateRosterRequest>,
) -> Result<(axum::http::StatusCode, Json<CreateRosterResponse>), AppError> {
    let roster_json_str = serde_json::to_string(&request.roster_json)
        .map_err(|e| AppError::BadRequest(format!("Invalid roster JSON: {}", e)))?;

    let job_id = state.job_tracker.create_job();
    let response_job_id = job_id.clone();

    let tracker = state.job_tracker.clone();
    let store = state.rosters.clone();
    let roster_name = request.name.clone();

    tokio::spawn(async move {
        let _ = services::ingest::process_roster_async(
            job_id,
            tracker,
            store,
            roster_name,
            roster_json_str,
        )
        .await;
    });

    Ok((
        axum::http::StatusCode::ACCEPTED,
        Json(CreateRosterResponse {
            job_id: response_job_id.clone(),
            message: format!(
                "Roster upload started. Track progress at /v1/jobs/{}/logs",
                response_job_id
            ),
        }),
    ))
}

/// GET /v1/rosters/{roster_id}
pub async fn get_roster(
    State(state): State<AppState>,
    Path(roster_id): Path<i64>,
) -> HandlerResult<RosterSnapshot> {
    let snapshot = load_roster(&state, roster_id)?;
    Ok(Json(snapshot.as_ref().clone()))
}

/// DELETE /v1/rosters/{roster_id}
pub async fn delete_roster(
    State(state): State<AppState>,
    Path(roster_id): Path<i64>,
) -> Result<axum::http::StatusCode, AppError> {
    if state.rosters.remove(roster_id) {
        Ok(axum::http::StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Roster {} not found", roster_id)))
    }
}

// =============================================================================
// Analysis Endpoints
// =============================================================================

/// GET /v1/rosters/{roster_id}/availability?day_id=..&station_id=..
pub async fn get_availability(
    State(state): State<AppState>,
    Path(roster_id): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> HandlerResult<AvailabilityResponse> {
    let snapshot = load_roster(&state, roster_id)?;
    let day_id = DayId::new(query.day_id);
    let station_id = StationId::new(query.station_id);

    let day = snapshot
        .day(day_id)
        .ok_or_else(|| AppError::BadRequest(format!("Day {} not in roster", day_id)))?;
    if day.is_lookback {
        return Err(AppError::BadRequest(format!(
            "Day {} is a lookback day; availability is not defined for it",
            day_id
        )));
    }
    if snapshot.required_station(station_id).is_none() {
        return Err(AppError::BadRequest(format!(
            "Station {} not in roster",
            station_id
        )));
    }

    let score = services::estimate_slot_availability(
        station_id,
        day,
        &snapshot.days,
        &snapshot.memberships,
        &snapshot.assignments,
        &snapshot.exclusions,
        &snapshot.required_stations,
    );

    Ok(Json(AvailabilityResponse {
        day_id: query.day_id,
        station_id: query.station_id,
        score,
    }))
}

/// GET /v1/rosters/{roster_id}/availability-grid
pub async fn get_availability_grid(
    State(state): State<AppState>,
    Path(roster_id): Path<i64>,
) -> HandlerResult<AvailabilityGridResponse> {
    let snapshot = load_roster(&state, roster_id)?;
    let cells = tokio::task::spawn_blocking(move || services::availability_grid(&snapshot))
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?;
    Ok(Json(AvailabilityGridResponse { cells }))
}

/// GET /v1/rosters/{roster_id}/quotas
pub async fn get_quotas(
    State(state): State<AppState>,
    Path(roster_id): Path<i64>,
) -> HandlerResult<QuotasResponse> {
    let snapshot = load_roster(&state, roster_id)?;
    let quotas = services::calculate_quotas(
        &snapshot.days,
        &snapshot.memberships,
        &snapshot.required_stations,
    );
    Ok(Json(QuotasResponse { quotas }))
}

/// GET /v1/rosters/{roster_id}/workload
pub async fn get_workload(
    State(state): State<AppState>,
    Path(roster_id): Path<i64>,
) -> HandlerResult<WorkloadReport> {
    let snapshot = load_roster(&state, roster_id)?;
    let report = tokio::task::spawn_blocking(move || {
        let quotas = services::calculate_quotas(
            &snapshot.days,
            &snapshot.memberships,
            &snapshot.required_stations,
        );
        services::aggregate_workload(
            &snapshot.days,
            &snapshot.assignments,
            &snapshot.memberships,
            &snapshot.required_stations,
            &quotas,
        )
    })
    .await
    .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?;
    Ok(Json(report))
}

/// GET /v1/rosters/{roster_id}/alerts
pub async fn get_alerts(
    State(state): State<AppState>,
    Path(roster_id): Path<i64>,
) -> HandlerResult<AlertsResponse> {
    let snapshot = load_roster(&state, roster_id)?;
    let alerts = services::validate_roster(&snapshot);
    let total = alerts.len();
    Ok(Json(AlertsResponse { alerts, total }))
}

/// GET /v1/rosters/{roster_id}/summary
pub async fn get_summary(
    State(state): State<AppState>,
    Path(roster_id): Path<i64>,
) -> HandlerResult<StaffingSummary> {
    let snapshot = load_roster(&state, roster_id)?;
    Ok(Json(services::summarize_staffing(&snapshot)))
}

/// POST /v1/rosters/{roster_id}/candidate-preview
///
/// Reshape a solver candidate against the stored roster.
pub async fn preview_candidate(
    State(state): State<AppState>,
    Path(roster_id): Path<i64>,
    Json(candidate): Json<SolverCandidate>,
) -> HandlerResult<CandidatePreview> {
    let snapshot = load_roster(&state, roster_id)?;
    Ok(Json(services::preview_candidate(&snapshot, &candidate)))
}

// =============================================================================
// Async Job Management
// =============================================================================

/// GET /v1/jobs/{job_id}
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> HandlerResult<JobStatusResponse> {
    let job = state
        .job_tracker
        .get_job(&job_id)
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;

    Ok(Json(JobStatusResponse {
        progress: state.job_tracker.progress(&job_id),
        job_id: job.job_id,
        status: format!("{:?}", job.status).to_lowercase(),
        logs: job.logs,
        result: job.result,
    }))
}

/// GET /v1/jobs/{job_id}/logs
///
/// Stream job logs via Server-Sent Events (SSE).
pub async fn stream_job_logs(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    if state.job_tracker.get_job(&job_id).is_none() {
        return Err(AppError::NotFound(format!("Job {} not found", job_id)));
    }

    let tracker = state.job_tracker.clone();
    let stream = async_stream::stream! {
        let mut last_log_count = 0;
        loop {
            let logs = tracker.get_logs(&job_id);
            for log in logs.iter().skip(last_log_count) {
                match serde_json::to_string(log) {
                    Ok(event_data) => yield Ok(Event::default().data(event_data)),
                    Err(e) => {
                        tracing::warn!(job_id = %job_id, error = %e, "Dropping unserializable log entry from SSE stream");
                    }
                }
            }
            last_log_count = logs.len();

            if let Some(job) = tracker.get_job(&job_id) {
                if job.status != services::job_tracker::JobStatus::Running {
                    // Serde serialization keeps status values lowercase
                    // ("completed", "failed") on the wire.
                    let final_event = serde_json::json!({
                        "status": job.status,
                        "result": job.result,
                    });
                    match serde_json::to_string(&final_event) {
                        Ok(data) => yield Ok(Event::default().event("complete").data(data)),
                        Err(e) => {
                            tracing::warn!(job_id = %job_id, error = %e, "Dropping unserializable completion event from SSE stream");
                        }
                    }
                    break;
                }
            } else {
                break;
            }

            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    };

    Ok(Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(1))
            .text("keep-alive"),
    ))
}
