//! Core library for the holdsync ecosystem.
//!
//! holdsync mirrors busy time from source calendars onto target calendars
//! as placeholder "hold" events, without exposing source event details.
//! This crate contains the reconciliation engine and the shared types:
//! - `event` for provider-neutral calendar events
//! - `tag` for the provenance tag embedded in managed holds
//! - `overlap` for time-range normalization and intersection
//! - `planner` for computing the create/update/delete plan
//! - `protocol`, `provider` and `backend` for talking to provider binaries
//!
//! The engine modules (`tag`, `overlap`, `hold`, `planner`, `signature`)
//! are pure and do no I/O; all calendar access goes through `backend`.

pub mod backend;
pub mod error;
pub mod event;
pub mod hold;
pub mod overlap;
pub mod plan;
pub mod planner;
pub mod protocol;
pub mod provider;
pub mod signature;
pub mod tag;

pub use error::{HoldSyncError, HoldSyncResult};
pub use event::*;
