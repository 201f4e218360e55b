//! Data Transfer Objects for the HTTP API.
//!
//! Request/response shapes owned by the REST layer. Analysis results
//! (availability grids, workload reports, quotas, alerts, summaries) already
//! derive Serialize in the core library and are returned as-is.

use serde::{Deserialize, Serialize};

pub use crate::api::{Alert, SolverCandidate};
pub use crate::services::availability::SlotAvailability;
pub use crate::services::candidate::CandidatePreview;
pub use crate::services::store::RosterMetadata;
pub use crate::services::summary::StaffingSummary;
pub use crate::services::workload::WorkloadReport;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Number of rosters currently held in memory
    pub rosters: usize,
}

/// Request body for uploading a roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRosterRequest {
    /// Display name, used when the payload carries none
    pub name: String,
    /// Roster snapshot JSON
    pub roster_json: serde_json::Value,
}

/// Response for roster upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRosterResponse {
    /// Job ID for tracking the async ingest
    pub job_id: String,
    pub message: String,
}

/// Response listing stored rosters.
#[derive(Debug, Clone, Serialize)]
pub struct RosterListResponse {
    pub rosters: Vec<RosterMetadata>,
    pub total: usize,
}

/// Job status response for async processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: String,
    /// Latest reported completion fraction, if the job has logged one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f32>,
    pub logs: Vec<crate::services::job_tracker::LogEntry>,
    pub result: Option<serde_json::Value>,
}

/// Query parameters for the single-slot availability endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AvailabilityQuery {
    pub day_id: i64,
    pub station_id: i64,
}

/// Response for the single-slot availability endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub day_id: i64,
    pub station_id: i64,
    pub score: f64,
}

/// Response wrapping the full availability grid.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityGridResponse {
    pub cells: Vec<SlotAvailability>,
}

/// Response wrapping conflict alerts.
#[derive(Debug, Clone, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    pub total: usize,
}

/// Quota response: member id (as string key) to fair-share points.
#[derive(Debug, Clone, Serialize)]
pub struct QuotasResponse {
    pub quotas: std::collections::HashMap<crate::api::MembershipId, f64>,
}
