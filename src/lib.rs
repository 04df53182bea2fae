//! # shardctl
//!
//! Inspect a MongoDB sharded cluster through the `mongo` shell.
//!
//! The shell's `sh.status()` report is human-oriented text, not JSON, and the
//! server may still be starting when the first command runs. This crate wraps
//! the shell with bounded exponential backoff and turns its output into
//! structured values.
//!
//! ## Modules
//!
//! - `config` - Layered configuration (defaults, files, environment, flags)
//! - `error` - Unified error type with stable error codes
//! - `mongo` - Shell invocation, retry loop and command dispatch
//! - `normalize` - JSON recovery for shell output with constructor calls
//! - `report` - `sh.status()` parser and the per-shard views derived from it
//! - `subprocess` - Process execution seam with a production and a mock runner
pub mod config;
pub mod error;
pub mod mongo;
pub mod normalize;
pub mod report;
pub mod subprocess;

pub use error::{Result, ShardctlError};
