//! Error types for git-conductor operations
//!
//! Every operation completes with exactly one of these on failure. Compound
//! workflows wrap the error of the step that stopped them in
//! [`GitOpError::ChainedStep`] without altering it.

use std::fmt;
use std::time::Duration;

use crate::git::FailureReason;

/// Result type alias for git-conductor operations
pub type Result<T> = std::result::Result<T, GitOpError>;

/// Intermediate step of a compound workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    /// `git status` probe for unstaged changes
    Status,
    /// `git add --all`
    Add,
    /// `git commit -m ...`
    Commit,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowStep::Status => "status",
            WorkflowStep::Add => "add",
            WorkflowStep::Commit => "commit",
        };
        f.write_str(name)
    }
}

/// Main error type for all git-conductor operations
#[derive(Debug, thiserror::Error)]
pub enum GitOpError {
    /// The address given to clone uses a disallowed scheme
    #[error("invalid repository address '{url}': {reason}")]
    InvalidAddress { url: String, reason: String },

    /// The git process exited with a non-zero status
    #[error("`{command}` failed (exit code {code}): {stderr}")]
    CommandExecution {
        /// Command line with secrets masked
        command: String,
        code: i32,
        stderr: String,
        reason: FailureReason,
    },

    /// A compound workflow stopped at an intermediate step
    #[error("{step} step failed: {source}")]
    ChainedStep {
        step: WorkflowStep,
        #[source]
        source: Box<GitOpError>,
    },

    /// The process could not be started
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process outlived the configured timeout and was killed
    #[error("`{command}` timed out after {}s", .after.as_secs())]
    Timeout { command: String, after: Duration },
}

impl GitOpError {
    /// Stable code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            GitOpError::InvalidAddress { .. } => "INVALID_ADDRESS",
            GitOpError::CommandExecution { .. } => "COMMAND_EXECUTION",
            GitOpError::ChainedStep { .. } => "CHAINED_STEP_FAILURE",
            GitOpError::Spawn { .. } => "SPAWN_ERROR",
            GitOpError::Timeout { .. } => "TIMEOUT",
        }
    }

    /// Wrap this error as the failure of a workflow step
    pub fn at_step(self, step: WorkflowStep) -> Self {
        GitOpError::ChainedStep {
            step,
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through chained steps
    pub fn root_cause(&self) -> &GitOpError {
        match self {
            GitOpError::ChainedStep { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The workflow step that failed, if this came from a compound operation
    pub fn failed_step(&self) -> Option<WorkflowStep> {
        match self {
            GitOpError::ChainedStep { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Classified reason of the underlying command failure
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self.root_cause() {
            GitOpError::CommandExecution { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Captured standard error of the underlying command failure
    pub fn stderr(&self) -> Option<&str> {
        match self.root_cause() {
            GitOpError::CommandExecution { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// Convert an error to a process exit code
pub fn to_exit_code(error: &GitOpError) -> i32 {
    match error.root_cause() {
        GitOpError::CommandExecution { code, .. } if *code > 0 => *code,
        GitOpError::Timeout { .. } => 124,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec_failure(stderr: &str) -> GitOpError {
        GitOpError::CommandExecution {
            command: "git add --all".into(),
            code: 128,
            stderr: stderr.into(),
            reason: FailureReason::Unknown,
        }
    }

    #[test]
    fn test_error_codes() {
        let invalid = GitOpError::InvalidAddress {
            url: "https://x".into(),
            reason: "ssh only".into(),
        };
        assert_eq!(invalid.code(), "INVALID_ADDRESS");
        assert_eq!(exec_failure("boom").code(), "COMMAND_EXECUTION");
        assert_eq!(
            exec_failure("boom").at_step(WorkflowStep::Add).code(),
            "CHAINED_STEP_FAILURE"
        );
    }

    #[test]
    fn test_root_cause_looks_through_chain() {
        let err = exec_failure("fatal: not a git repository").at_step(WorkflowStep::Add);
        assert_eq!(err.failed_step(), Some(WorkflowStep::Add));
        assert_eq!(err.root_cause().code(), "COMMAND_EXECUTION");
        assert_eq!(err.stderr(), Some("fatal: not a git repository"));
        assert_eq!(err.failure_reason(), Some(FailureReason::Unknown));
    }

    #[test]
    fn test_display_names_step() {
        let err = exec_failure("boom").at_step(WorkflowStep::Commit);
        assert_eq!(
            err.to_string(),
            "commit step failed: `git add --all` failed (exit code 128): boom"
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(to_exit_code(&exec_failure("x")), 128);
        let timeout = GitOpError::Timeout {
            command: "git status".into(),
            after: Duration::from_secs(5),
        };
        assert_eq!(to_exit_code(&timeout), 124);
        assert_eq!(timeout.to_string(), "`git status` timed out after 5s");
    }
}
