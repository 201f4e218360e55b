//! Solver candidate preview.
//!
//! The external combinatorial solver returns candidate schedules as opaque
//! blobs: a per-member metrics map plus a `"day_station" -> member` slot map.
//! This adapter reshapes one candidate into the same per-member schema the
//! workload aggregator produces, so the comparison UI renders committed and
//! hypothetical schedules through one code path. No scoring happens here;
//! the solver's persisted numbers are surfaced verbatim.

use crate::api::{AssignmentRecord, MembershipId, SolverCandidate};
use crate::models::RosterSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One member's row in a candidate preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateMemberRow {
    pub membership_id: MembershipId,
    pub person_name: String,
    pub assigned: u32,
    pub points: f64,
    pub quota_target: f64,
    pub progress_percent: f64,
    pub goat_points: f64,
    /// Penalty breakdown by reason, as persisted by the solver
    pub breakdown: BTreeMap<String, f64>,
}

/// A reshaped candidate, ready for side-by-side rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatePreview {
    pub candidate_id: Option<i64>,
    pub run_id: String,
    pub score: f64,
    /// Sorted by descending `points`, ties keep roster order.
    pub per_member: Vec<CandidateMemberRow>,
    /// Hypothetical assignments, restricted to active days.
    pub assignments: Vec<AssignmentRecord>,
}

/// Reshape a solver candidate against the current roster.
///
/// Slot keys that fail to parse, or that point at a lookback day, are
/// dropped. Members present in `metrics_data` but no longer on the roster
/// keep their numbers under an `"Unknown"` display name rather than
/// vanishing from the comparison.
pub fn preview_candidate(snapshot: &RosterSnapshot, candidate: &SolverCandidate) -> CandidatePreview {
    let active_day_ids: HashSet<_> = snapshot.active_days().map(|d| d.id).collect();

    let mut assignments: Vec<AssignmentRecord> = candidate
        .assignments_data
        .iter()
        .filter_map(|(key, membership_id)| {
            let (day_id, station_id) = SolverCandidate::parse_slot_key(key)?;
            if !active_day_ids.contains(&day_id) {
                return None;
            }
            Some(AssignmentRecord {
                id: None,
                day_id,
                station_id,
                membership_id: Some(*membership_id),
                is_locked: false,
            })
        })
        .collect();
    assignments.sort_by_key(|a| (a.day_id, a.station_id));

    // Roster members first (in roster order), then metrics-only strays.
    let mut seen: HashSet<MembershipId> = HashSet::new();
    let mut per_member: Vec<CandidateMemberRow> = Vec::new();
    for m in &snapshot.memberships {
        if let Some(metrics) = candidate.metrics_data.get(&m.id) {
            seen.insert(m.id);
            per_member.push(member_row(m.id, m.person_name.clone(), metrics));
        }
    }
    let mut strays: Vec<_> = candidate
        .metrics_data
        .iter()
        .filter(|(id, _)| !seen.contains(id))
        .collect();
    strays.sort_by_key(|(id, _)| **id);
    for (id, metrics) in strays {
        per_member.push(member_row(*id, "Unknown".to_string(), metrics));
    }

    per_member.sort_by(|a, b| {
        b.points
            .partial_cmp(&a.points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    CandidatePreview {
        candidate_id: candidate.id,
        run_id: candidate.run_id.clone(),
        score: candidate.score,
        per_member,
        assignments,
    }
}

fn member_row(
    membership_id: MembershipId,
    person_name: String,
    metrics: &crate::api::CandidateMemberMetrics,
) -> CandidateMemberRow {
    let progress_percent = if metrics.quota_target > 0.0 {
        metrics.points / metrics.quota_target * 100.0
    } else {
        0.0
    };
    CandidateMemberRow {
        membership_id,
        person_name,
        assigned: metrics.assigned,
        points: metrics.points,
        quota_target: metrics.quota_target,
        progress_percent,
        goat_points: metrics.goat_points,
        breakdown: metrics.breakdown.iter().map(|(k, v)| (k.clone(), *v)).collect(),
    }
}
