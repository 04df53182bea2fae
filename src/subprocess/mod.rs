//! Running the shell client as a child process.
//!
//! [`ProcessRunner`] is the seam between the cluster client and the
//! operating system; tests swap in the canned runner from `mock`.

pub mod error;
#[cfg(test)]
pub mod mock;
pub mod runner;


pub use error::ProcessError;
#[cfg(test)]
pub use mock::MockProcessRunner;
pub use runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner, TokioProcessRunner};
