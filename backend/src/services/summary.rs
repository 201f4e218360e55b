//! Staffing health summary.
//!
//! Compares total calendar demand against the qualified-member supply of
//! each required station and flags thin coverage before a solver run is
//! attempted: a station with no qualified members is `critical` (and makes
//! the schedule unsolvable), a station whose average load per unit of
//! supply exceeds 10 is `warning`, and members whose qualification weights
//! sum past 1.0 are stretched across too many roles.

use crate::api::StationId;
use crate::models::RosterSnapshot;
use serde::{Deserialize, Serialize};

const LOAD_FACTOR_WARNING: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationStatus {
    Healthy,
    Warning,
    Critical,
}

/// Supply analysis for one required station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationHealth {
    pub station_id: StationId,
    pub abbr: String,
    pub name: String,
    pub assigned_members_count: u32,
    /// Sum of qualification weights across qualified members
    pub supply_weight: f64,
    /// Calendar demand per unit of supply, rounded to two decimals
    pub load_factor: f64,
    pub status: StationStatus,
}

/// Pre-solve staffing summary for one schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffingSummary {
    pub schedule_id: Option<i64>,
    pub schedule_name: String,
    pub total_calendar_load: f64,
    pub station_health: Vec<StationHealth>,
    pub warnings: Vec<String>,
    pub is_solvable: bool,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Summarize staffing supply versus calendar demand.
pub fn summarize_staffing(snapshot: &RosterSnapshot) -> StaffingSummary {
    let total_calendar_load: f64 = snapshot.days.iter().map(|d| d.weight).sum();

    let mut warnings = Vec::new();
    let mut station_health = Vec::new();

    for station in &snapshot.required_stations {
        let mut supply_weight = 0.0;
        let mut member_count = 0u32;
        for m in &snapshot.memberships {
            if let Some(w) = m.station_weight(station.station_id) {
                supply_weight += w;
                member_count += 1;
            }
        }

        let load_factor = if supply_weight > 0.0 {
            round2(total_calendar_load / supply_weight)
        } else {
            0.0
        };

        let status = if member_count == 0 {
            warnings.push(format!(
                "Station {} has no assigned personnel.",
                station.abbr
            ));
            StationStatus::Critical
        } else if load_factor > LOAD_FACTOR_WARNING {
            warnings.push(format!(
                "Station {} load is high (Avg {} units).",
                station.abbr, load_factor
            ));
            StationStatus::Warning
        } else {
            StationStatus::Healthy
        };

        station_health.push(StationHealth {
            station_id: station.station_id,
            abbr: station.abbr.clone(),
            name: station.name.clone(),
            assigned_members_count: member_count,
            supply_weight,
            load_factor,
            status,
        });
    }

    // Multi-role overload: one person spread across too many stations.
    for m in &snapshot.memberships {
        let total_weight: f64 = m
            .qualifications
            .iter()
            .filter_map(|q| m.station_weight(q.station_id))
            .sum();
        if total_weight > 1.0 {
            warnings.push(format!(
                "Member {} is over-assigned (Total Weight: {}).",
                m.person_name, total_weight
            ));
        }
    }

    let is_solvable = !station_health.is_empty()
        && station_health.iter().all(|s| s.assigned_members_count > 0);

    StaffingSummary {
        schedule_id: snapshot.schedule_id,
        schedule_name: snapshot.name.clone(),
        total_calendar_load,
        station_health,
        warnings,
        is_solvable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_roster_json_str;

    fn roster(memberships: &str) -> RosterSnapshot {
        parse_roster_json_str(&format!(
            r#"{{
                "name": "March Watchbill",
                "days": [
                    {{ "id": 1, "date": "2026-03-01" }},
                    {{ "id": 2, "date": "2026-03-02", "weight": 1.5 }}
                ],
                "required_stations": [
                    {{ "station_id": 1, "name": "Staff Duty Officer", "abbr": "SDO" }},
                    {{ "station_id": 2, "name": "Echo Duty Officer", "abbr": "EDO" }}
                ],
                "memberships": {memberships}
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_healthy_schedule() {
        let snapshot = roster(
            r#"[
                { "id": 10, "person_name": "Ramirez",
                  "qualifications": [ { "station_id": 1, "weight": 1.0 } ] },
                { "id": 11, "person_name": "Chen",
                  "qualifications": [ { "station_id": 2, "weight": 1.0 } ] }
            ]"#,
        );
        let summary = summarize_staffing(&snapshot);
        assert_eq!(summary.total_calendar_load, 2.5);
        assert!(summary.is_solvable);
        assert!(summary.warnings.is_empty());

        let sdo = &summary.station_health[0];
        assert_eq!(sdo.assigned_members_count, 1);
        assert_eq!(sdo.supply_weight, 1.0);
        assert_eq!(sdo.load_factor, 2.5);
        assert_eq!(sdo.status, StationStatus::Healthy);
    }

    #[test]
    fn test_unstaffed_station_is_critical() {
        let snapshot = roster(
            r#"[
                { "id": 10, "person_name": "Ramirez",
                  "qualifications": [ { "station_id": 1, "weight": 1.0 } ] }
            ]"#,
        );
        let summary = summarize_staffing(&snapshot);
        assert!(!summary.is_solvable);

        let edo = &summary.station_health[1];
        assert_eq!(edo.status, StationStatus::Critical);
        assert_eq!(edo.load_factor, 0.0);
        assert!(summary
            .warnings
            .iter()
            .any(|w| w == "Station EDO has no assigned personnel."));
    }

    #[test]
    fn test_thin_supply_is_warning() {
        // supply 0.2 against demand 2.5 -> load factor 12.5
        let snapshot = roster(
            r#"[
                { "id": 10, "person_name": "Ramirez",
                  "qualifications": [
                      { "station_id": 1, "weight": 0.2 },
                      { "station_id": 2, "weight": 1.0 }
                  ] }
            ]"#,
        );
        let summary = summarize_staffing(&snapshot);
        let sdo = &summary.station_health[0];
        assert_eq!(sdo.status, StationStatus::Warning);
        assert_eq!(sdo.load_factor, 12.5);
        // still solvable; every station has at least one member
        assert!(summary.is_solvable);
        assert!(summary
            .warnings
            .iter()
            .any(|w| w.contains("Station SDO load is high")));
    }

    #[test]
    fn test_overloaded_member_warning() {
        let snapshot = roster(
            r#"[
                { "id": 10, "person_name": "Ramirez",
                  "qualifications": [
                      { "station_id": 1, "weight": 0.8 },
                      { "station_id": 2, "weight": 0.8 }
                  ] }
            ]"#,
        );
        let summary = summarize_staffing(&snapshot);
        assert!(summary
            .warnings
            .iter()
            .any(|w| w.starts_with("Member Ramirez is over-assigned")));
    }

    #[test]
    fn test_no_stations_is_unsolvable() {
        let snapshot = parse_roster_json_str(
            r#"{ "days": [ { "id": 1, "date": "2026-03-01" } ] }"#,
        )
        .unwrap();
        let summary = summarize_staffing(&snapshot);
        assert!(!summary.is_solvable);
        assert!(summary.station_health.is_empty());
    }
}
