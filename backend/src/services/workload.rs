//! Workload aggregation and fairness flags.
//!
//! Walks the committed assignments against the calendar and produces the
//! three-level progress view the workload tab renders: a global filled /
//! possible summary, per-station actual-vs-target bars, and a per-member
//! list with quota progress, assignment counts, and under/over-assignment
//! flags. Historical (lookback) days are excluded from every sum.

use crate::api::{AssignmentRecord, MembershipId, QuotaMap, StationId};
use crate::models::{Membership, RequiredStation, ScheduleDay};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Display band for a member's workload card.
///
/// Precedence: over-max beats under-min beats quota progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadBand {
    OverMax,
    UnderMin,
    NominalHigh,
    NominalLow,
    Nominal,
}

/// Global filled-vs-possible progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadSummary {
    pub actual: f64,
    pub target: f64,
    pub percent: f64,
}

/// Per-station actual-vs-target progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationWorkload {
    pub station_id: StationId,
    /// Station abbreviation (falls back to name)
    pub name: String,
    pub actual: f64,
    pub target: f64,
    pub percent: f64,
}

/// One member's workload card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberWorkload {
    pub membership_id: MembershipId,
    pub person_name: String,
    pub actual_points: f64,
    pub assignment_count: u32,
    /// Station-abbreviation -> shift count breakdown
    pub station_breakdown: BTreeMap<String, u32>,
    pub quota: f64,
    pub progress_percent: f64,
    pub min_assignments: u32,
    pub max_assignments: Option<u32>,
    pub is_under: bool,
    pub is_over: bool,
    pub band: WorkloadBand,
}

/// Full output of [`aggregate_workload`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadReport {
    pub summary: WorkloadSummary,
    pub per_station: Vec<StationWorkload>,
    /// Sorted by descending `actual_points`, ties keep roster order.
    pub per_member: Vec<MemberWorkload>,
}

fn classify(progress_percent: f64, is_under: bool, is_over: bool) -> WorkloadBand {
    if is_over {
        WorkloadBand::OverMax
    } else if is_under {
        WorkloadBand::UnderMin
    } else if progress_percent >= 100.0 {
        WorkloadBand::NominalHigh
    } else if progress_percent < 80.0 {
        WorkloadBand::NominalLow
    } else {
        WorkloadBand::Nominal
    }
}

/// Aggregate committed assignments into global, per-station, and per-member
/// workload metrics.
///
/// Assignments on lookback days or without a membership are skipped. Members
/// missing from `quotas` default to a quota of 0, which renders as 0%
/// progress rather than a division error.
pub fn aggregate_workload(
    days: &[ScheduleDay],
    assignments: &[AssignmentRecord],
    memberships: &[Membership],
    required_stations: &[RequiredStation],
    quotas: &QuotaMap,
) -> WorkloadReport {
    // A. Analyze days
    struct DayInfo {
        weight: f64,
        is_lookback: bool,
    }
    let mut day_info: HashMap<crate::api::DayId, DayInfo> = HashMap::new();
    let mut total_possible_points = 0.0;
    let mut active_weight_sum = 0.0;
    for d in days {
        day_info.insert(
            d.id,
            DayInfo {
                weight: d.weight,
                is_lookback: d.is_lookback,
            },
        );
        if d.is_active() {
            total_possible_points += d.weight * required_stations.len() as f64;
            active_weight_sum += d.weight;
        }
    }

    // B. Station targets: every required station is live on every active day.
    struct StationStat {
        name: String,
        actual: f64,
    }
    let mut station_stats: HashMap<StationId, StationStat> = HashMap::new();
    for s in required_stations {
        let name = if s.abbr.is_empty() {
            s.name.clone()
        } else {
            s.abbr.clone()
        };
        station_stats.insert(s.station_id, StationStat { name, actual: 0.0 });
    }

    // C. Member accumulators, keyed by roster order for stable ties.
    struct MemberAcc {
        actual_points: f64,
        assignment_count: u32,
        station_breakdown: BTreeMap<String, u32>,
    }
    let mut member_acc: HashMap<MembershipId, MemberAcc> = memberships
        .iter()
        .map(|m| {
            (
                m.id,
                MemberAcc {
                    actual_points: 0.0,
                    assignment_count: 0,
                    station_breakdown: BTreeMap::new(),
                },
            )
        })
        .collect();

    // D. Walk assignments
    let mut total_filled_points = 0.0;
    for a in assignments {
        let Some(info) = day_info.get(&a.day_id) else {
            continue;
        };
        if info.is_lookback {
            continue;
        }
        let Some(membership_id) = a.membership_id else {
            continue;
        };
        let weight = info.weight;

        if let Some(acc) = member_acc.get_mut(&membership_id) {
            let station_name = station_stats
                .get(&a.station_id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "UNK".to_string());
            acc.actual_points += weight;
            acc.assignment_count += 1;
            *acc.station_breakdown.entry(station_name).or_insert(0) += 1;
        }

        total_filled_points += weight;
        if let Some(stat) = station_stats.get_mut(&a.station_id) {
            stat.actual += weight;
        }
    }

    // E. Per-member fairness classification
    let mut per_member: Vec<MemberWorkload> = memberships
        .iter()
        .map(|m| {
            let acc = &member_acc[&m.id];
            let quota = quotas.get(&m.id).copied().unwrap_or(0.0);
            let progress_percent = if quota > 0.0 {
                acc.actual_points / quota * 100.0
            } else {
                0.0
            };
            let (min, max) = m.assignment_bounds();
            let is_under = acc.assignment_count < min;
            let is_over = max.is_some_and(|max| acc.assignment_count > max);
            MemberWorkload {
                membership_id: m.id,
                person_name: m.person_name.clone(),
                actual_points: acc.actual_points,
                assignment_count: acc.assignment_count,
                station_breakdown: acc.station_breakdown.clone(),
                quota,
                progress_percent,
                min_assignments: min,
                max_assignments: max,
                is_under,
                is_over,
                band: classify(progress_percent, is_under, is_over),
            }
        })
        .collect();

    // Stable: equal points keep roster order.
    per_member.sort_by(|a, b| {
        b.actual_points
            .partial_cmp(&a.actual_points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let per_station = required_stations
        .iter()
        .map(|s| {
            let stat = &station_stats[&s.station_id];
            let target = active_weight_sum;
            StationWorkload {
                station_id: s.station_id,
                name: stat.name.clone(),
                actual: stat.actual,
                target,
                percent: if target > 0.0 {
                    stat.actual / target * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();

    WorkloadReport {
        summary: WorkloadSummary {
            actual: total_filled_points,
            target: total_possible_points,
            percent: if total_possible_points > 0.0 {
                total_filled_points / total_possible_points * 100.0
            } else {
                0.0
            },
        },
        per_station,
        per_member,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AssignmentRecord, DayId};
    use crate::models::{Group, Qualification};

    fn day(id: i64, date: &str, weight: f64, is_lookback: bool) -> ScheduleDay {
        ScheduleDay {
            id: DayId(id),
            date: date.parse().unwrap(),
            name: String::new(),
            weight,
            is_lookback,
            is_holiday: false,
            label: None,
            leaves: vec![],
        }
    }

    fn member(id: i64, name: &str) -> Membership {
        Membership {
            id: MembershipId(id),
            person_name: name.to_string(),
            weight: None,
            group_defaults: None,
            override_seniority_factor: None,
            override_min_assignments: None,
            override_max_assignments: None,
            qualifications: vec![Qualification {
                station_id: StationId(1),
                earned_date: None,
                weight: None,
            }],
        }
    }

    fn assignment(day_id: i64, station_id: i64, membership_id: Option<i64>) -> AssignmentRecord {
        AssignmentRecord {
            id: None,
            day_id: DayId(day_id),
            station_id: StationId(station_id),
            membership_id: membership_id.map(MembershipId),
            is_locked: false,
        }
    }

    fn station(id: i64, abbr: &str) -> RequiredStation {
        RequiredStation {
            station_id: StationId(id),
            name: abbr.to_string(),
            abbr: abbr.to_string(),
        }
    }

    #[test]
    fn test_totals_exclude_lookback_days() {
        let days = vec![
            day(1, "2026-02-27", 1.0, true),
            day(2, "2026-03-01", 1.0, false),
            day(3, "2026-03-02", 1.5, false),
        ];
        let stations = vec![station(1, "SDO"), station(2, "EDO")];
        let members = vec![member(10, "Ramirez")];
        let assignments = vec![
            assignment(1, 1, Some(10)), // lookback, ignored everywhere
            assignment(2, 1, Some(10)),
            assignment(3, 2, Some(10)),
        ];

        let report = aggregate_workload(&days, &assignments, &members, &stations, &QuotaMap::new());
        // 2 stations × (1.0 + 1.5) active weight
        assert!((report.summary.target - 5.0).abs() < 1e-9);
        assert!((report.summary.actual - 2.5).abs() < 1e-9);

        let m = &report.per_member[0];
        assert_eq!(m.assignment_count, 2);
        assert!((m.actual_points - 2.5).abs() < 1e-9);
        assert_eq!(m.station_breakdown["SDO"], 1);
        assert_eq!(m.station_breakdown["EDO"], 1);
    }

    #[test]
    fn test_station_targets_share_active_weight() {
        let days = vec![day(1, "2026-03-01", 2.0, false), day(2, "2026-03-02", 1.0, false)];
        let stations = vec![station(1, "SDO"), station(2, "EDO")];
        let report =
            aggregate_workload(&days, &[], &[member(10, "A")], &stations, &QuotaMap::new());

        for s in &report.per_station {
            assert!((s.target - 3.0).abs() < 1e-9);
            assert_eq!(s.percent, 0.0);
        }
    }

    #[test]
    fn test_open_assignments_are_skipped() {
        let days = vec![day(1, "2026-03-01", 1.0, false)];
        let assignments = vec![assignment(1, 1, None)];
        let report = aggregate_workload(
            &days,
            &assignments,
            &[member(10, "A")],
            &[station(1, "SDO")],
            &QuotaMap::new(),
        );
        assert_eq!(report.summary.actual, 0.0);
        assert_eq!(report.per_member[0].assignment_count, 0);
    }

    #[test]
    fn test_zero_quota_never_nan() {
        let days = vec![day(1, "2026-03-01", 1.0, false)];
        let assignments = vec![assignment(1, 1, Some(10))];
        let report = aggregate_workload(
            &days,
            &assignments,
            &[member(10, "A")],
            &[station(1, "SDO")],
            &QuotaMap::new(),
        );
        let m = &report.per_member[0];
        assert_eq!(m.quota, 0.0);
        assert_eq!(m.progress_percent, 0.0);
        assert!(m.progress_percent.is_finite());
    }

    #[test]
    fn test_under_min_flag() {
        // min=4, max=6; 3 active assignments at weight 1.0 => under, not over.
        let days: Vec<ScheduleDay> = (1..=5)
            .map(|i| day(i, &format!("2026-03-0{}", i), 1.0, false))
            .collect();
        let mut m = member(10, "A");
        m.override_min_assignments = Some(4);
        m.override_max_assignments = Some(6);
        let assignments = vec![
            assignment(1, 1, Some(10)),
            assignment(2, 1, Some(10)),
            assignment(3, 1, Some(10)),
        ];

        let report = aggregate_workload(
            &days,
            &assignments,
            &[m],
            &[station(1, "SDO")],
            &QuotaMap::new(),
        );
        let row = &report.per_member[0];
        assert_eq!(row.assignment_count, 3);
        assert!(row.is_under);
        assert!(!row.is_over);
        assert_eq!(row.band, WorkloadBand::UnderMin);
    }

    #[test]
    fn test_over_max_outranks_everything() {
        let days: Vec<ScheduleDay> = (1..=3)
            .map(|i| day(i, &format!("2026-03-0{}", i), 1.0, false))
            .collect();
        let mut m = member(10, "A");
        m.group_defaults = Some(Group {
            id: None,
            name: "Juniors".to_string(),
            priority: 10,
            seniority_factor: 1.0,
            min_assignments: 0,
            max_assignments: 2,
        });
        let assignments = vec![
            assignment(1, 1, Some(10)),
            assignment(2, 1, Some(10)),
            assignment(3, 1, Some(10)),
        ];
        let quotas = QuotaMap::from([(MembershipId(10), 3.0)]);

        let report =
            aggregate_workload(&days, &assignments, &[m], &[station(1, "SDO")], &quotas);
        let row = &report.per_member[0];
        // progress is 100% but the max violation wins the band
        assert!(row.progress_percent >= 100.0);
        assert!(row.is_over);
        assert_eq!(row.band, WorkloadBand::OverMax);
    }

    #[test]
    fn test_progress_bands() {
        assert_eq!(classify(100.0, false, false), WorkloadBand::NominalHigh);
        assert_eq!(classify(85.0, false, false), WorkloadBand::Nominal);
        assert_eq!(classify(79.9, false, false), WorkloadBand::NominalLow);
        assert_eq!(classify(120.0, true, false), WorkloadBand::UnderMin);
        assert_eq!(classify(120.0, true, true), WorkloadBand::OverMax);
    }

    #[test]
    fn test_sorted_by_points_stable_ties() {
        let days: Vec<ScheduleDay> = (1..=3)
            .map(|i| day(i, &format!("2026-03-0{}", i), 1.0, false))
            .collect();
        let members = vec![member(10, "A"), member(11, "B"), member(12, "C")];
        let assignments = vec![
            assignment(1, 1, Some(11)),
            assignment(2, 1, Some(11)),
            assignment(3, 1, Some(12)),
        ];

        let report = aggregate_workload(
            &days,
            &assignments,
            &members,
            &[station(1, "SDO")],
            &QuotaMap::new(),
        );
        let order: Vec<&str> = report
            .per_member
            .iter()
            .map(|m| m.person_name.as_str())
            .collect();
        // B leads with 2 points; A (0) and C (1): C beats A; A keeps its slot
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_tie_preserves_roster_order() {
        let days = vec![day(1, "2026-03-01", 1.0, false)];
        let members = vec![member(10, "A"), member(11, "B"), member(12, "C")];
        let report = aggregate_workload(
            &days,
            &[],
            &members,
            &[station(1, "SDO")],
            &QuotaMap::new(),
        );
        let order: Vec<&str> = report
            .per_member
            .iter()
            .map(|m| m.person_name.as_str())
            .collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_empty_inputs() {
        let report = aggregate_workload(&[], &[], &[], &[], &QuotaMap::new());
        assert_eq!(report.summary.target, 0.0);
        assert_eq!(report.summary.percent, 0.0);
        assert!(report.per_member.is_empty());
        assert!(report.per_station.is_empty());
    }
}
