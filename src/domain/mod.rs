//! Shared data model layer (structs/constants only).
//!
//! ## Files
//! - `models.rs` — configuration, motion records, command reports.
//! - `constants.rs` — stable names (config locations, tool defaults, file names).
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem or subprocess side effects.
//!
//! ## Compatibility note
//! Report structs are the `--json` output schema. Keep changes synchronized
//! with `docs/contracts/*`.

pub mod constants;
pub mod models;
