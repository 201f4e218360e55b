//! Roster domain model and snapshot parsing.
//!
//! A [`RosterSnapshot`] is the immutable, fully materialized view of one
//! schedule at one instant: calendar days, memberships with per-station
//! qualifications, required stations, assignments, exclusions, and leaves.
//! The client rebuilds it after every mutation; the analysis services in
//! [`crate::services`] are recomputed from scratch against the fresh copy.

use crate::api::{AssignmentRecord, DayLeave, ExclusionRecord, LeaveRecord, MembershipId, StationId};
use crate::api::DayId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Errors produced while materializing a snapshot from JSON.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("invalid roster JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("missing required '{0}' field")]
    MissingField(&'static str),
}

fn default_weight() -> f64 {
    1.0
}

fn default_seniority() -> f64 {
    1.0
}

fn default_group_priority() -> i32 {
    10
}

fn default_group_max() -> u32 {
    10
}

/// Seniority tier defaults shared by a group's members.
///
/// `seniority_factor` is consumed only by the external solver; the min/max
/// assignment counts feed the fairness flags in the workload aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_group_priority")]
    pub priority: i32,
    #[serde(default = "default_seniority", alias = "seniorityFactor")]
    pub seniority_factor: f64,
    #[serde(default)]
    pub min_assignments: u32,
    #[serde(default = "default_group_max")]
    pub max_assignments: u32,
}

/// A member's qualification for one station type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Qualification {
    pub station_id: StationId,
    #[serde(default)]
    pub earned_date: Option<NaiveDate>,
    /// Per-station weight override; falls back to the membership default.
    #[serde(default)]
    pub weight: Option<f64>,
}

/// A person's participation in one schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    #[serde(default)]
    pub person_name: String,
    /// Overall default weight, applied to any qualification without its own.
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default, alias = "group")]
    pub group_defaults: Option<Group>,
    #[serde(default, alias = "override_seniorityFactor")]
    pub override_seniority_factor: Option<f64>,
    #[serde(default)]
    pub override_min_assignments: Option<u32>,
    #[serde(default)]
    pub override_max_assignments: Option<u32>,
    #[serde(default)]
    pub qualifications: Vec<Qualification>,
}

impl Membership {
    /// Whether this member holds a qualification for `station_id`.
    pub fn is_qualified_for(&self, station_id: StationId) -> bool {
        self.qualifications.iter().any(|q| q.station_id == station_id)
    }

    /// Effective weight for one station: per-qualification override, else the
    /// membership default, else 1.0. Returns `None` when unqualified.
    pub fn station_weight(&self, station_id: StationId) -> Option<f64> {
        let qual = self
            .qualifications
            .iter()
            .find(|q| q.station_id == station_id)?;
        Some(
            qual.weight
                .or(self.weight)
                .unwrap_or_else(default_weight),
        )
    }

    /// Effective (min, max) assignment bounds: membership override, else
    /// group default, else (0, unbounded).
    pub fn assignment_bounds(&self) -> (u32, Option<u32>) {
        let min = self
            .override_min_assignments
            .or_else(|| self.group_defaults.as_ref().map(|g| g.min_assignments))
            .unwrap_or(0);
        let max = self
            .override_max_assignments
            .or_else(|| self.group_defaults.as_ref().map(|g| g.max_assignments));
        (min, max)
    }

    /// Effective seniority factor: membership override, else group default,
    /// else 1.0.
    pub fn seniority_factor(&self) -> f64 {
        self.override_seniority_factor
            .or_else(|| self.group_defaults.as_ref().map(|g| g.seniority_factor))
            .unwrap_or_else(default_seniority)
    }
}

/// A station type required by the schedule (one slot per active day).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredStation {
    pub station_id: StationId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub abbr: String,
}

/// One calendar date of the schedule.
///
/// `is_lookback` marks historical days before the active scheduling window;
/// they are read-only context and excluded from scoring and fairness sums.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub id: DayId,
    pub date: NaiveDate,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub is_lookback: bool,
    #[serde(default)]
    pub is_holiday: bool,
    #[serde(default)]
    pub label: Option<String>,
    /// Leave markers pre-expanded per day, either by the caller or by
    /// [`RosterSnapshot::expand_leaves`].
    #[serde(default)]
    pub leaves: Vec<DayLeave>,
}

impl ScheduleDay {
    pub fn is_active(&self) -> bool {
        !self.is_lookback
    }

    pub fn member_on_leave(&self, membership_id: MembershipId) -> bool {
        self.leaves.iter().any(|l| l.membership_id == membership_id)
    }
}

/// Immutable, fully materialized view of one schedule at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSnapshot {
    #[serde(default)]
    pub schedule_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    /// SHA256 checksum of the source JSON
    #[serde(default)]
    pub checksum: String,
    pub days: Vec<ScheduleDay>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
    #[serde(default)]
    pub required_stations: Vec<RequiredStation>,
    #[serde(default)]
    pub assignments: Vec<AssignmentRecord>,
    #[serde(default)]
    pub exclusions: Vec<ExclusionRecord>,
    #[serde(default)]
    pub leaves: Vec<LeaveRecord>,
}

impl RosterSnapshot {
    pub fn day(&self, id: DayId) -> Option<&ScheduleDay> {
        self.days.iter().find(|d| d.id == id)
    }

    pub fn membership(&self, id: MembershipId) -> Option<&Membership> {
        self.memberships.iter().find(|m| m.id == id)
    }

    pub fn required_station(&self, id: StationId) -> Option<&RequiredStation> {
        self.required_stations.iter().find(|s| s.station_id == id)
    }

    /// Station abbreviation for display, `"UNK"` when the station is not part
    /// of this schedule.
    pub fn station_abbr(&self, id: StationId) -> &str {
        self.required_station(id)
            .map(|s| s.abbr.as_str())
            .filter(|a| !a.is_empty())
            .unwrap_or("UNK")
    }

    /// Days inside the active scheduling window (lookback excluded).
    pub fn active_days(&self) -> impl Iterator<Item = &ScheduleDay> {
        self.days.iter().filter(|d| d.is_active())
    }

    /// Expand leave intervals onto each day's `leaves` list.
    ///
    /// Callers that already pre-expanded leaves keep their entries; the pass
    /// only fills in markers missing for a covered date.
    pub fn expand_leaves(&mut self) {
        for day in &mut self.days {
            for leave in &self.leaves {
                let covered = leave.start_date <= day.date && day.date <= leave.end_date;
                if covered && !day.leaves.iter().any(|l| l.membership_id == leave.membership_id) {
                    day.leaves.push(DayLeave {
                        membership_id: leave.membership_id,
                    });
                }
            }
        }
    }
}

fn validate_input_roster(roster_json: &str) -> Result<(), RosterError> {
    let value: serde_json::Value = serde_json::from_str(roster_json)?;
    let has_days = value.as_object().and_then(|obj| obj.get("days")).is_some();
    if !has_days {
        return Err(RosterError::MissingField("days"));
    }
    Ok(())
}

/// Parse a roster snapshot from a JSON string.
///
/// Deserializes the payload, expands leave intervals onto the per-day leave
/// lists, and computes the SHA256 checksum when the producer did not supply
/// one. Missing optional sections (memberships, assignments, exclusions,
/// leaves) default to empty rather than failing.
pub fn parse_roster_json_str(roster_json: &str) -> Result<RosterSnapshot, RosterError> {
    validate_input_roster(roster_json)?;

    let mut snapshot: RosterSnapshot = serde_json::from_str(roster_json)?;
    snapshot.expand_leaves();

    if snapshot.checksum.is_empty() {
        snapshot.checksum = compute_roster_checksum(roster_json);
    }

    Ok(snapshot)
}

/// Compute a checksum for the roster JSON
fn compute_roster_checksum(json_str: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(json_str.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}
