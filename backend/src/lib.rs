//! # Watchbill Rust Backend
//!
//! Roster analysis engine for watch/shift scheduling.
//!
//! This crate provides the computational core behind a watchbill builder:
//! given a fully materialized roster snapshot (days, memberships with
//! per-station qualifications, assignments, exclusions, leaves), it computes
//! slot availability estimates, workload fairness metrics, fair-share quotas,
//! conflict alerts, and staffing health summaries. An optional axum REST API
//! exposes these computations to the React frontend.
//!
//! ## Features
//!
//! - **Data Loading**: Parse roster snapshots from JSON format
//! - **Availability**: Supply/demand slack estimation per open (day, station) slot
//! - **Workload**: Actual-vs-quota progress and under/over-assignment flags
//! - **Quotas**: Fair-share waterfall distribution of schedule demand
//! - **Validation**: Double-booking, leave, exclusion, and back-to-back alerts
//! - **HTTP API**: RESTful endpoints for frontend integration
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Externally-owned wire shapes and id newtypes
//! - [`models`]: Roster domain model and snapshot parsing
//! - [`services`]: Pure analysis services (no I/O, no hidden state)
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Determinism
//!
//! Every analysis function is pure and synchronous: identical inputs yield
//! identical outputs, arguments are never mutated, and recomputation is full
//! rather than incremental. The surrounding application assembles a
//! consistent snapshot before calling in; the core never fetches data.

pub mod api;

pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
