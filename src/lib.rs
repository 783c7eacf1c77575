//! git-conductor - compound git workflows over the git CLI
//!
//! Each operation shells out to `git` in a working directory and composes
//! the primitive commands into workflows: checkout with branch creation as a
//! fallback, commit after staging everything, and push after committing any
//! pending changes.

pub mod config;
pub mod error;
pub mod executor;
pub mod git;

pub use error::{GitOpError, Result, WorkflowStep};
pub use executor::{CommandLine, CommandOutput, CommandRunner, ShellRunner};
pub use git::{
    CloneOptions, Credentials, FailureReason, OperationResult, OrchestratorSettings, PushOptions,
    StatusResult, WorkflowOrchestrator,
};
