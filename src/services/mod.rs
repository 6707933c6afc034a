//! Service layer containing business logic and side-effect helpers.
//!
//! ## Service map
//! - `tools.rs` — external program calls (FSL builders, runner trait, step sequences).
//! - `workspace.rs` — temp output directories, backup-on-clobber, input checks.
//! - `motion.rs` — channel-to-channel registration and motion tables.
//! - `bvecs.rs` — gradient table conversion.
//! - `doctor.rs` — tool/config availability report.
//! - `storage.rs` — config loading, audit log, digests.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Subprocesses only through `tools::ToolRunner`.
//! - Keep command handlers thin; delegate to services.

pub mod bvecs;
pub mod doctor;
pub mod motion;
pub mod output;
pub mod storage;
pub mod tools;
pub mod workspace;
