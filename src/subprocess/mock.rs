use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::ProcessError;
use super::runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner};

impl ProcessOutput {
    pub fn success(stdout: &str) -> Self {
        Self::exited(0, stdout, "")
    }

    pub fn exited(code: i32, stdout: &str, stderr: &str) -> Self {
        Self {
            status: if code == 0 {
                ExitStatus::Success
            } else {
                ExitStatus::Error(code)
            },
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            duration: Duration::from_millis(10),
        }
    }
}

/// Canned shell client for tests.
///
/// Queued outputs are returned once each, in order; after that the
/// repeating output answers every call. With neither, the program is
/// reported as not installed. Clones share their script and call log.
#[derive(Clone, Default)]
pub struct MockProcessRunner {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    queued: VecDeque<ProcessOutput>,
    repeating: Option<ProcessOutput>,
    calls: Vec<ProcessCommand>,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next unanswered call with `output`
    pub fn push(&self, output: ProcessOutput) -> &Self {
        self.state.lock().unwrap().queued.push_back(output);
        self
    }

    /// Answer every call past the queue with `output`
    pub fn always(&self, output: ProcessOutput) -> &Self {
        self.state.lock().unwrap().repeating = Some(output);
        self
    }

    pub fn calls(&self) -> Vec<ProcessCommand> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        let mut state = self.state.lock().unwrap();
        let program = command.program.clone();
        state.calls.push(command);

        match state.queued.pop_front().or_else(|| state.repeating.clone()) {
            Some(output) => Ok(output),
            None => Err(ProcessError::CommandNotFound(program)),
        }
    }
}
