//! Service layer for roster analysis and orchestration.
//!
//! The analysis services are pure functions over a [`crate::models::RosterSnapshot`]:
//! they take the materialized roster and return freshly computed results, so
//! every recompute reflects the latest committed state. Ingest and job
//! tracking orchestrate uploads for the HTTP layer.

pub mod availability;
pub mod candidate;
pub mod quota;
pub mod store;
pub mod summary;
pub mod validator;
pub mod workload;

#[cfg(feature = "http-server")]
pub mod ingest;
#[cfg(feature = "http-server")]
pub mod job_tracker;

pub use availability::{availability_grid, estimate_slot_availability, SlotAvailability};
pub use candidate::{preview_candidate, CandidatePreview};
pub use quota::calculate_quotas;
pub use store::RosterStore;
pub use summary::{summarize_staffing, StaffingSummary};
pub use validator::validate_roster;
pub use workload::{aggregate_workload, WorkloadReport};
