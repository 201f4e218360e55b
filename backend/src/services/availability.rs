//! Slot availability estimation.
//!
//! For a still-open (day, station) slot, the estimate answers "how much
//! qualified slack remains if this slot is filled": the summed effective
//! weights of members who could stand the watch, minus the phantom load the
//! neighboring days and the same day already place on that pool.
//!
//! The calculation is strictly station-isolated: requirements and filled
//! assignments for *other* station types never contribute to the demand side.
//! (Earlier revisions of this logic summed neighbor load across all stations,
//! which systematically underestimated availability on multi-station
//! schedules; this is the canonical, corrected form.)

use crate::api::{AssignmentRecord, DayId, ExclusionRecord, StationId};
use crate::models::{Membership, RequiredStation, RosterSnapshot, ScheduleDay};
use serde::{Deserialize, Serialize};

/// Availability score for one open slot on the calendar grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub day_id: DayId,
    pub station_id: StationId,
    pub score: f64,
}

/// Estimate the qualified slack remaining for the (`day`, `target_station`)
/// slot.
///
/// Supply is the summed effective per-station weight of every membership
/// qualified for `target_station` that is neither on leave nor excluded on
/// `day`. Demand is the load the array-adjacent neighbor days place on that
/// same pool — `max(required slots, filled assignments) × 1.0` per neighbor,
/// counting the target station only — plus the filled same-day assignments
/// for the target station (a multi-slot station shrinks its own pool as
/// slots fill). The result is clamped at zero; zero means "no qualified
/// slack, do not auto-assign without review".
///
/// Callers must not invoke this for a lookback day (those cells render a
/// fixed placeholder instead). A `day` absent from `all_days` yields 0.
pub fn estimate_slot_availability(
    target_station: StationId,
    day: &ScheduleDay,
    all_days: &[ScheduleDay],
    memberships: &[Membership],
    all_assignments: &[AssignmentRecord],
    all_exclusions: &[ExclusionRecord],
    required_stations: &[RequiredStation],
) -> f64 {
    let Some(day_index) = all_days.iter().position(|d| d.id == day.id) else {
        return 0.0;
    };
    let prev_day = day_index.checked_sub(1).map(|i| &all_days[i]);
    let next_day = all_days.get(day_index + 1);

    // 1. Supply: qualified members free of leave and exclusion on this day.
    let raw_supply: f64 = memberships
        .iter()
        .filter(|m| {
            !day.member_on_leave(m.id)
                && !all_exclusions
                    .iter()
                    .any(|e| e.day_id == day.id && e.membership_id == m.id)
        })
        .filter_map(|m| m.station_weight(target_station))
        .sum();

    // Required slots for this station type are day-independent; the schedule
    // normally lists each station once, but duplicates are counted as-is.
    let required_slots = required_stations
        .iter()
        .filter(|s| s.station_id == target_station)
        .count();

    let filled_on = |day_id: DayId| {
        all_assignments
            .iter()
            .filter(|a| {
                a.day_id == day_id && a.membership_id.is_some() && a.station_id == target_station
            })
            .count()
    };

    // 2. Neighbor demand: adjacent entries by array position, not by date
    // arithmetic; a missing neighbor contributes nothing.
    let neighbor_load = |neighbor: Option<&ScheduleDay>| -> f64 {
        match neighbor {
            Some(d) => required_slots.max(filled_on(d.id)) as f64 * 1.0,
            None => 0.0,
        }
    };
    let prev_load = neighbor_load(prev_day);
    let next_load = neighbor_load(next_day);

    // 3. Same-day competition: slots of this station already filled today.
    let same_day_load = filled_on(day.id) as f64;

    // 4. Result, clamped at zero.
    (raw_supply - prev_load - next_load - same_day_load).max(0.0)
}

/// Compute the availability score for every (active day × required station)
/// cell of the calendar in one pass. Lookback days are skipped — the grid
/// renders them as fixed placeholders.
pub fn availability_grid(snapshot: &RosterSnapshot) -> Vec<SlotAvailability> {
    let mut slots = Vec::new();
    for day in snapshot.active_days() {
        for station in &snapshot.required_stations {
            let score = estimate_slot_availability(
                station.station_id,
                day,
                &snapshot.days,
                &snapshot.memberships,
                &snapshot.assignments,
                &snapshot.exclusions,
                &snapshot.required_stations,
            );
            slots.push(SlotAvailability {
                day_id: day.id,
                station_id: station.station_id,
                score,
            });
        }
    }
    slots
}
