//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `convert.rs` — xfm-fsl/xfm-points/xfm-apply/bvecs.
//! - `pipeline.rs` — motion estimation batch run.
//! - `admin.rs` — probe/doctor.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Check inputs before starting any external program.
//! - Delegate business logic to `services/*`.
//! - Keep behavior and output schema stable.

pub mod admin;
pub mod convert;
pub mod pipeline;

pub use admin::handle_admin_commands;
pub use convert::handle_convert_commands;
pub use pipeline::handle_pipeline_commands;
