//! Fair-share quota calculation.
//!
//! Converts the schedule's total demand (in points) into one target per
//! member, proportional to a weight built from leave-adjusted availability
//! and seniority, then caps each target at the member's maximum assignment
//! load via an iterative waterfall: members pushed over their cap are locked
//! at the cap and the excess is redistributed among the rest.

use crate::api::QuotaMap;
use crate::models::{Membership, RequiredStation, ScheduleDay};

const UNCAPPED_SHIFTS: f64 = 999.0;

struct PoolEntry {
    id: crate::api::MembershipId,
    weight: f64,
    max_load: f64,
    assigned_quota: f64,
    is_locked: bool,
}

/// Compute the fair-share quota (in points) for every member.
///
/// Only active (non-lookback) days contribute demand or availability.
/// Returns an empty map when there are no active days or the calendar's
/// total weight is zero. Quotas are rounded to two decimals.
pub fn calculate_quotas(
    days: &[ScheduleDay],
    memberships: &[Membership],
    required_stations: &[RequiredStation],
) -> QuotaMap {
    let active: Vec<&ScheduleDay> = days.iter().filter(|d| d.is_active()).collect();
    if active.is_empty() {
        return QuotaMap::new();
    }

    let max_day_weight = active
        .iter()
        .map(|d| d.weight)
        .fold(f64::MIN, f64::max);
    let total_schedule_points: f64 = active.iter().map(|d| d.weight).sum();
    let total_demand_points = total_schedule_points * required_stations.len() as f64;

    if total_schedule_points == 0.0 {
        return QuotaMap::new();
    }

    let mut pool: Vec<PoolEntry> = memberships
        .iter()
        .map(|m| {
            let points_lost: f64 = active
                .iter()
                .filter(|d| d.member_on_leave(m.id))
                .map(|d| d.weight)
                .sum();
            let available = (total_schedule_points - points_lost).max(0.0);
            let availability_ratio = available / total_schedule_points;

            let (_, max_assignments) = m.assignment_bounds();
            let shift_cap = max_assignments.map(f64::from).unwrap_or(UNCAPPED_SHIFTS);

            PoolEntry {
                id: m.id,
                weight: availability_ratio * m.seniority_factor(),
                max_load: shift_cap * max_day_weight,
                assigned_quota: 0.0,
                is_locked: false,
            }
        })
        .collect();

    let mut remaining_demand = total_demand_points;
    loop {
        let active_weight: f64 = pool
            .iter()
            .filter(|p| !p.is_locked)
            .map(|p| p.weight)
            .sum();
        if active_weight == 0.0 {
            break;
        }

        let any_offender = pool.iter().any(|p| {
            !p.is_locked && (p.weight / active_weight) * remaining_demand > p.max_load
        });

        if !any_offender {
            for p in pool.iter_mut().filter(|p| !p.is_locked) {
                p.assigned_quota = (p.weight / active_weight) * remaining_demand;
            }
            break;
        }

        // Lock every offender at its cap, pull its cap out of the demand,
        // and rerun the split over whoever is left.
        for p in pool.iter_mut() {
            if !p.is_locked && (p.weight / active_weight) * remaining_demand > p.max_load {
                p.assigned_quota = p.max_load;
                p.is_locked = true;
                remaining_demand -= p.max_load;
            }
        }
    }

    pool.into_iter()
        .map(|p| (p.id, (p.assigned_quota * 100.0).round() / 100.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DayId, DayLeave, MembershipId, StationId};
    use crate::models::{Group, Qualification};

    fn day(id: i64, date: &str, weight: f64) -> ScheduleDay {
        ScheduleDay {
            id: DayId(id),
            date: date.parse().unwrap(),
            name: String::new(),
            weight,
            is_lookback: false,
            is_holiday: false,
            label: None,
            leaves: vec![],
        }
    }

    fn member(id: i64) -> Membership {
        Membership {
            id: MembershipId(id),
            person_name: format!("member-{}", id),
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

    fn station(id: i64) -> RequiredStation {
        RequiredStation {
            station_id: StationId(id),
            name: format!("station-{}", id),
            abbr: format!("S{}", id),
        }
    }

    fn week(weight: f64) -> Vec<ScheduleDay> {
        (1..=7)
            .map(|i| day(i, &format!("2026-03-0{}", i), weight))
            .collect()
    }

    #[test]
    fn test_equal_members_split_demand_evenly() {
        // 7 days × 1.0 × 1 station = 7 points over 2 members
        let quotas = calculate_quotas(&week(1.0), &[member(1), member(2)], &[station(1)]);
        assert_eq!(quotas[&MembershipId(1)], 3.5);
        assert_eq!(quotas[&MembershipId(2)], 3.5);
    }

    #[test]
    fn test_quotas_sum_to_demand() {
        let quotas = calculate_quotas(
            &week(1.0),
            &[member(1), member(2), member(3)],
            &[station(1), station(2)],
        );
        let total: f64 = quotas.values().sum();
        // 14 points of demand, modulo 2-decimal rounding per member
        assert!((total - 14.0).abs() < 0.02);
    }

    #[test]
    fn test_leave_reduces_share() {
        let mut days = week(1.0);
        // member 1 on leave for 3 of 7 days
        for d in days.iter_mut().take(3) {
            d.leaves.push(DayLeave {
                membership_id: MembershipId(1),
            });
        }
        let quotas = calculate_quotas(&days, &[member(1), member(2)], &[station(1)]);
        assert!(quotas[&MembershipId(1)] < quotas[&MembershipId(2)]);
        // ratio 4/7 vs 7/7: shares 7×(4/11) and 7×(7/11)
        assert!((quotas[&MembershipId(1)] - 2.55).abs() < 0.01);
        assert!((quotas[&MembershipId(2)] - 4.45).abs() < 0.01);
    }

    #[test]
    fn test_seniority_scales_share() {
        let mut senior = member(1);
        senior.override_seniority_factor = Some(0.5);
        let quotas = calculate_quotas(&week(1.0), &[senior, member(2)], &[station(1)]);
        // weights 0.5 vs 1.0: one third vs two thirds of 7 points
        assert!((quotas[&MembershipId(1)] - 2.33).abs() < 0.01);
        assert!((quotas[&MembershipId(2)] - 4.67).abs() < 0.01);
    }

    #[test]
    fn test_waterfall_locks_capped_member() {
        let mut capped = member(1);
        capped.override_max_assignments = Some(2);
        // 7 points of demand; even split (3.5 each) overruns the 2.0 cap
        let quotas = calculate_quotas(&week(1.0), &[capped, member(2)], &[station(1)]);
        assert_eq!(quotas[&MembershipId(1)], 2.0);
        assert_eq!(quotas[&MembershipId(2)], 5.0);
    }

    #[test]
    fn test_point_cap_uses_max_day_weight() {
        let mut days = week(1.0);
        days[6].weight = 2.0; // max day weight 2.0
        let mut capped = member(1);
        capped.override_max_assignments = Some(2);
        // demand 8 points; even split 4.0 each; cap = 2 × 2.0 = 4.0 holds
        let quotas = calculate_quotas(&days, &[capped, member(2)], &[station(1)]);
        assert_eq!(quotas[&MembershipId(1)], 4.0);
        assert_eq!(quotas[&MembershipId(2)], 4.0);
    }

    #[test]
    fn test_group_cap_applies_without_override() {
        let mut grouped = member(1);
        grouped.group_defaults = Some(Group {
            id: None,
            name: "Juniors".to_string(),
            priority: 10,
            seniority_factor: 1.0,
            min_assignments: 0,
            max_assignments: 1,
        });
        let quotas = calculate_quotas(&week(1.0), &[grouped, member(2)], &[station(1)]);
        assert_eq!(quotas[&MembershipId(1)], 1.0);
        assert_eq!(quotas[&MembershipId(2)], 6.0);
    }

    #[test]
    fn test_lookback_days_excluded() {
        let mut days = week(1.0);
        for d in days.iter_mut().take(3) {
            d.is_lookback = true;
        }
        // only 4 active points remain
        let quotas = calculate_quotas(&days, &[member(1)], &[station(1)]);
        assert_eq!(quotas[&MembershipId(1)], 4.0);
    }

    #[test]
    fn test_no_days_yields_empty_map() {
        assert!(calculate_quotas(&[], &[member(1)], &[station(1)]).is_empty());
    }

    #[test]
    fn test_fully_on_leave_member_gets_zero() {
        let mut days = week(1.0);
        for d in days.iter_mut() {
            d.leaves.push(DayLeave {
                membership_id: MembershipId(1),
            });
        }
        let quotas = calculate_quotas(&days, &[member(1), member(2)], &[station(1)]);
        assert_eq!(quotas[&MembershipId(1)], 0.0);
        assert_eq!(quotas[&MembershipId(2)], 7.0);
    }
}
