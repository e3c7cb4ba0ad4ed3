//! Command handlers module.
//!
//! - `pipeline.rs`: `run` and `watch`
//! - `init.rs`: directory layout and example inputs
//! - `export.rs`: snapshot export
//! - `status.rs`: store and state overview

mod export;
mod init;
mod pipeline;
mod status;

pub use export::cmd_export;
pub use init::cmd_init;
pub use pipeline::{cmd_run, cmd_watch};
pub use status::cmd_status;
