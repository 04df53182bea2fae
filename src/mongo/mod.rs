//! Talking to the cluster through the `mongo` shell.
//!
//! - `shell` - [`CommandRunner`] seam and the [`MongoShell`] client wrapper
//! - `retry` - backoff while the server is still starting
//! - `client` - command dispatch to the report parser or the JSON normalizer

pub mod client;
pub mod retry;
pub mod shell;

pub use client::{ensure_ok, is_status_command, ClusterClient, CommandOutput, STATUS_COMMAND};
pub use retry::{Attempt, RetryState, RetryingInvoker, DEFAULT_INITIAL_WAIT, DEFAULT_MAX_RETRIES};
pub use shell::{is_not_ready, CommandRunner, MongoShell};
