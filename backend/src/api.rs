//! Public API surface for the Rust backend.
//!
//! This file consolidates the externally-owned wire shapes consumed by the
//! analysis core: assignment/exclusion/leave records, solver candidate
//! payloads, conflict alerts, and the id newtypes shared by every module.
//! All types derive Serialize/Deserialize for JSON serialization.
//!
//! ## Id coercion
//!
//! Station, day, and membership ids arrive from several data sources with
//! inconsistent typing (JSON numbers in some payloads, numeric strings in
//! others, string keys in `metrics_data`/`assignments_data` maps). The id
//! newtypes normalize all of these to a canonical `i64` at deserialization
//! time, so every comparison downstream is numeric. This replaces the ad hoc
//! `Number(x) === Number(y)` coercion scattered through the original call
//! sites with a single entry point.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shared visitor that accepts an id as an integer, a float with no
/// fractional part, or a numeric string (including JSON object keys).
struct FlexibleIdVisitor;

impl Visitor<'_> for FlexibleIdVisitor {
    type Value = i64;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("an integer id or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
        Ok(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
        i64::try_from(value).map_err(|_| E::custom(format!("id out of range: {}", value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<i64, E> {
        if value.fract() == 0.0 && value.is_finite() {
            Ok(value as i64)
        } else {
            Err(E::custom(format!("non-integral id: {}", value)))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<i64, E> {
        let trimmed = value.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Ok(n);
        }
        // Tolerate "3.0"-style ids emitted by loosely typed producers.
        match trimmed.parse::<f64>() {
            Ok(f) if f.fract() == 0.0 && f.is_finite() => Ok(f as i64),
            _ => Err(E::custom(format!("unparseable id: {:?}", value))),
        }
    }
}

fn deserialize_flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    deserializer.deserialize_any(FlexibleIdVisitor)
}

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(value: i64) -> Self {
                $name(value)
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserialize_flexible_id(deserializer).map($name)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_newtype! {
    /// Calendar day identifier.
    DayId
}

id_newtype! {
    /// Master station (watch role) identifier.
    StationId
}

id_newtype! {
    /// Schedule membership identifier (a person's seat on one schedule).
    MembershipId
}

/// One (day, station) slot, optionally bound to a membership.
///
/// `membership_id: None` means the slot is open/unfilled. `is_locked` marks
/// human-made assignments the external solver must not overwrite; the core
/// carries the flag but does not enforce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRecord {
    /// Database id (optional on input)
    #[serde(default)]
    pub id: Option<i64>,
    pub day_id: DayId,
    pub station_id: StationId,
    #[serde(default)]
    pub membership_id: Option<MembershipId>,
    #[serde(default)]
    pub is_locked: bool,
}

/// "This person must not be assigned on this day", independent of leave.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionRecord {
    pub day_id: DayId,
    pub membership_id: MembershipId,
    #[serde(default)]
    pub reason: Option<String>,
}

/// A leave interval; any day whose date falls inside it is unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRecord {
    pub membership_id: MembershipId,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Per-day leave marker, pre-expanded onto `ScheduleDay::leaves`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayLeave {
    pub membership_id: MembershipId,
}

/// Conflict alert categories surfaced to the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    DoubleBooking,
    LeaveConflict,
    ExclusionConflict,
    BackToBack,
}

/// Externally-shaped conflict record, rendered as-is by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub day_id: DayId,
    /// Display date, `%m/%d`
    pub date: String,
    /// Member display name
    pub member: String,
    pub assignment_ids: Vec<i64>,
    pub message: String,
}

/// Per-member metrics block inside a solver candidate.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CandidateMemberMetrics {
    /// Shift count the solver assigned this member
    #[serde(default)]
    pub assigned: u32,
    /// Weighted points for those shifts
    #[serde(default)]
    pub points: f64,
    /// Quota target the solver optimized toward
    #[serde(default)]
    pub quota_target: f64,
    /// Accumulated penalty ("goat") points
    #[serde(default)]
    pub goat_points: f64,
    /// Penalty breakdown by reason
    #[serde(default)]
    pub breakdown: HashMap<String, f64>,
}

/// A full candidate schedule returned by the external combinatorial solver.
///
/// `assignments_data` keys encode `"<day_id>_<station_id>"`. The core only
/// consumes this shape; generation and scoring live in the solver service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverCandidate {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub run_id: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub metrics_data: HashMap<MembershipId, CandidateMemberMetrics>,
    #[serde(default)]
    pub assignments_data: HashMap<String, MembershipId>,
}

impl SolverCandidate {
    /// Split an `assignments_data` key into its (day, station) pair.
    ///
    /// Keys are produced by the solver as `"<day_id>_<station_id>"`; anything
    /// that does not parse as two numeric ids is skipped by callers.
    pub fn parse_slot_key(key: &str) -> Option<(DayId, StationId)> {
        let (day, station) = key.split_once('_')?;
        let day: i64 = day.trim().parse().ok()?;
        let station: i64 = station.trim().parse().ok()?;
        Some((DayId(day), StationId(station)))
    }
}

/// Quota map: one target point value per member for the active schedule.
pub type QuotaMap = HashMap<MembershipId, f64>;
