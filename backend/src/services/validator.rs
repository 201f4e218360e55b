//! Schedule sanity checks.
//!
//! Scans the committed assignments for four kinds of conflict: double
//! bookings, assignments during leave, assignments on excluded days, and
//! back-to-back duty on consecutive calendar dates. Conflicts confined to
//! lookback days are historical record, not actionable problems, and are
//! suppressed; a back-to-back pair is only suppressed when both halves are
//! lookback, since fatigue from the last historical day carries into the
//! first active one.

use crate::api::{Alert, AlertKind, DayId, MembershipId};
use crate::models::RosterSnapshot;
use chrono::{Duration, NaiveDate};
use std::collections::{HashMap, HashSet};

struct AssignmentEntry {
    id: Option<i64>,
    date: NaiveDate,
    date_str: String,
    day_id: DayId,
    station_name: String,
    member_name: String,
    is_lookback: bool,
}

fn entry_ids(entries: &[&AssignmentEntry]) -> Vec<i64> {
    entries.iter().filter_map(|e| e.id).collect()
}

/// Validate the snapshot's assignments and return all conflict alerts.
pub fn validate_roster(snapshot: &RosterSnapshot) -> Vec<Alert> {
    let mut alerts = Vec::new();
    if snapshot.assignments.is_empty() {
        return alerts;
    }

    let exclusion_set: HashSet<(DayId, MembershipId)> = snapshot
        .exclusions
        .iter()
        .map(|e| (e.day_id, e.membership_id))
        .collect();

    // Grouping maps plus first-seen key orders, so repeated runs over the
    // same snapshot emit alerts in the same sequence.
    let mut member_assignments: HashMap<MembershipId, Vec<AssignmentEntry>> = HashMap::new();
    let mut member_order: Vec<MembershipId> = Vec::new();
    let mut daily_load: HashMap<(DayId, MembershipId), Vec<usize>> = HashMap::new();
    let mut daily_order: Vec<(DayId, MembershipId)> = Vec::new();

    for a in &snapshot.assignments {
        let Some(membership_id) = a.membership_id else {
            continue;
        };
        let Some(day) = snapshot.day(a.day_id) else {
            continue;
        };

        let member_name = snapshot
            .membership(membership_id)
            .map(|m| m.person_name.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let station_name = snapshot.station_abbr(a.station_id).to_string();
        let date_str = day.date.format("%m/%d").to_string();

        let entry = AssignmentEntry {
            id: a.id,
            date: day.date,
            date_str: date_str.clone(),
            day_id: a.day_id,
            station_name: station_name.clone(),
            member_name: member_name.clone(),
            is_lookback: day.is_lookback,
        };

        // Single-day checks only apply inside the active window.
        if !day.is_lookback {
            if day.member_on_leave(membership_id) {
                alerts.push(Alert {
                    kind: AlertKind::LeaveConflict,
                    day_id: a.day_id,
                    date: date_str.clone(),
                    member: member_name.clone(),
                    assignment_ids: a.id.into_iter().collect(),
                    message: format!("Assigned to {} while on leave", station_name),
                });
            }

            if exclusion_set.contains(&(a.day_id, membership_id)) {
                alerts.push(Alert {
                    kind: AlertKind::ExclusionConflict,
                    day_id: a.day_id,
                    date: date_str,
                    member: member_name,
                    assignment_ids: a.id.into_iter().collect(),
                    message: format!("Assigned to {} on an excluded day", station_name),
                });
            }
        }

        let list = match member_assignments.entry(membership_id) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(e) => {
                member_order.push(membership_id);
                e.insert(Vec::new())
            }
        };
        list.push(entry);
        let day_key = (a.day_id, membership_id);
        let day_list = match daily_load.entry(day_key) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(e) => {
                daily_order.push(day_key);
                e.insert(Vec::new())
            }
        };
        day_list.push(list.len() - 1);
    }

    // Double bookings: more than one assignment for one member on one day.
    for (day_id, membership_id) in &daily_order {
        let indices = &daily_load[&(*day_id, *membership_id)];
        if indices.len() < 2 {
            continue;
        }
        let entries: Vec<&AssignmentEntry> = indices
            .iter()
            .map(|&i| &member_assignments[membership_id][i])
            .collect();
        if entries[0].is_lookback {
            continue;
        }
        let stations: Vec<&str> = entries.iter().map(|e| e.station_name.as_str()).collect();
        alerts.push(Alert {
            kind: AlertKind::DoubleBooking,
            day_id: *day_id,
            date: entries[0].date_str.clone(),
            member: entries[0].member_name.clone(),
            assignment_ids: entry_ids(&entries),
            message: format!("Double booked: {}", stations.join(", ")),
        });
    }

    // Back-to-back duty on consecutive calendar dates.
    for membership_id in &member_order {
        let entries = match member_assignments.get_mut(membership_id) {
            Some(entries) => entries,
            None => continue,
        };
        entries.sort_by_key(|e| e.date);
        for pair in entries.windows(2) {
            let (curr, next) = (&pair[0], &pair[1]);
            if next.date - curr.date != Duration::days(1) {
                continue;
            }
            if curr.is_lookback && next.is_lookback {
                continue;
            }
            alerts.push(Alert {
                kind: AlertKind::BackToBack,
                day_id: next.day_id,
                date: next.date_str.clone(),
                member: curr.member_name.clone(),
                assignment_ids: next.id.into_iter().collect(),
                message: format!(
                    "Back-to-back: {} ({}) to {} ({})",
                    curr.station_name, curr.date_str, next.station_name, next.date_str
                ),
            });
        }
    }

    alerts
}
