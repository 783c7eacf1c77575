//! Compound git workflows over a single working directory
//!
//! Each operation issues its commands strictly in sequence through the
//! injected [`CommandRunner`] and stops at the first failure.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::command::{self, Credentials};
use super::failure::{self, FailureReason};
use crate::error::{GitOpError, Result, WorkflowStep};
use crate::executor::{CommandLine, CommandRunner};

/// Commit message used by `push` when the caller supplies none
pub const DEFAULT_COMMIT_MESSAGE: &str = "Automated commit";

/// Substring of `git status` output that signals unstaged changes
const UNSTAGED_MARKER: &str = "Changes not staged for commit";

/// Output of a successful operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationResult {
    pub stdout: String,
    pub stderr: String,
}

/// Output of `has_unstaged`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusResult {
    /// Whether the working tree has changes not staged for commit
    pub has_changes: bool,
    /// Raw `git status` output
    pub output: OperationResult,
}

/// Options for `clone`
#[derive(Debug, Clone, Default)]
pub struct CloneOptions {
    /// Extra flags placed before the address, in order
    pub flags: Vec<String>,
}

/// Options for `push`
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    /// Message for the commit of pending changes
    pub message: Option<String>,
}

/// Settings shared by all operations of an orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub default_commit_message: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            default_commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }
}

/// Runs clone, checkout, commit, pull and push workflows through git
///
/// Holds no per-directory state and may be shared between tasks. Operations on
/// the *same* working directory are not serialized: callers issuing them
/// concurrently must serialize them themselves (for example with a
/// `tokio::sync::Mutex` per directory), otherwise only git's own index lock
/// stands between interleaved commands.
pub struct WorkflowOrchestrator {
    runner: Arc<dyn CommandRunner>,
    settings: OrchestratorSettings,
}

impl WorkflowOrchestrator {
    /// Create an orchestrator with default settings
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self::with_settings(runner, OrchestratorSettings::default())
    }

    pub fn with_settings(runner: Arc<dyn CommandRunner>, settings: OrchestratorSettings) -> Self {
        Self { runner, settings }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Run one command; a non-zero exit becomes `CommandExecution`
    async fn execute(&self, command: CommandLine, cwd: Option<&Path>) -> Result<OperationResult> {
        let output = self.runner.run(&command, cwd).await?;

        if !output.succeeded() {
            let stderr = command.redact(output.stderr.trim());
            let reason = failure::classify(&stderr);
            debug!(
                "Command failed with exit code {} ({}): {}",
                output.exit_code, reason, command
            );
            return Err(GitOpError::CommandExecution {
                command: command.redacted(),
                code: output.exit_code,
                stderr,
                reason,
            });
        }

        Ok(OperationResult {
            stdout: command.redact(&output.stdout),
            stderr: command.redact(&output.stderr),
        })
    }

    /// Clone `repo_url` into `clone_path`
    ///
    /// Only SSH-style addresses are accepted: an `https://` address fails with
    /// [`GitOpError::InvalidAddress`] before anything is run.
    #[instrument(skip_all, fields(repo_url = %repo_url))]
    pub async fn clone(
        &self,
        repo_url: &str,
        clone_path: &Path,
        options: &CloneOptions,
    ) -> Result<()> {
        if repo_url.starts_with("https://") {
            warn!("Need to use SSH for cloning repositories, but https link was given");
            return Err(GitOpError::InvalidAddress {
                url: repo_url.to_string(),
                reason: "cloning requires an SSH address".to_string(),
            });
        }

        let line = command::clone(repo_url, clone_path, &options.flags);
        self.execute(line, None).await?;

        info!("Cloned {} into {}", repo_url, clone_path.display());
        Ok(())
    }

    /// Stage every change in the working tree, deletions included
    #[instrument(skip_all, fields(cwd = %cwd.display()))]
    pub async fn add(&self, cwd: &Path) -> Result<OperationResult> {
        self.execute(command::add_all(), Some(cwd)).await
    }

    /// Switch to `branch`; with `force`, create it when it does not exist
    #[instrument(skip_all, fields(cwd = %cwd.display(), branch = %branch, force = force))]
    pub async fn checkout(&self, cwd: &Path, branch: &str, force: bool) -> Result<OperationResult> {
        let err = match self.execute(command::checkout(branch), Some(cwd)).await {
            Ok(output) => return Ok(output),
            Err(err) => err,
        };

        if !force || err.failure_reason() != Some(FailureReason::NotFound) {
            return Err(err);
        }

        info!("Branch '{}' not found, creating it", branch);
        self.execute(command::checkout_new_branch(branch), Some(cwd))
            .await
    }

    /// Stage everything, then commit with `message`
    ///
    /// The message is passed through as given; an empty message is left for
    /// git to reject.
    #[instrument(skip_all, fields(cwd = %cwd.display()))]
    pub async fn commit(&self, cwd: &Path, message: &str) -> Result<OperationResult> {
        self.add(cwd)
            .await
            .map_err(|e| e.at_step(WorkflowStep::Add))?;

        self.execute(command::commit(message), Some(cwd)).await
    }

    /// Check for changes not staged for commit
    #[instrument(skip_all, fields(cwd = %cwd.display()))]
    pub async fn has_unstaged(&self, cwd: &Path) -> Result<StatusResult> {
        let output = self.execute(command::status(), Some(cwd)).await?;
        let has_changes = output.stdout.contains(UNSTAGED_MARKER);

        debug!("Unstaged changes: {}", has_changes);
        Ok(StatusResult {
            has_changes,
            output,
        })
    }

    /// Pull `branch` from `repo_url`
    ///
    /// Merge conflicts are not resolved; they fail like any other error.
    #[instrument(skip_all, fields(cwd = %cwd.display(), branch = %branch))]
    pub async fn pull(&self, cwd: &Path, repo_url: &str, branch: &str) -> Result<OperationResult> {
        self.execute(command::pull(repo_url, branch), Some(cwd))
            .await
    }

    /// Commit pending changes if there are any, then push `branch`
    ///
    /// The credentials are embedded in the push address handed to git. They
    /// never appear in logs or error messages.
    #[instrument(skip_all, fields(cwd = %cwd.display(), branch = %branch))]
    pub async fn push(
        &self,
        cwd: &Path,
        repo_url: &str,
        branch: &str,
        credentials: &Credentials,
        options: &PushOptions,
    ) -> Result<OperationResult> {
        let status = self
            .has_unstaged(cwd)
            .await
            .map_err(|e| e.at_step(WorkflowStep::Status))?;

        if status.has_changes {
            let message = options
                .message
                .as_deref()
                .unwrap_or(&self.settings.default_commit_message);
            info!("Committing pending changes before push");

            self.add(cwd)
                .await
                .map_err(|e| e.at_step(WorkflowStep::Add))?;
            self.execute(command::commit(message), Some(cwd))
                .await
                .map_err(|e| e.at_step(WorkflowStep::Commit))?;
        }

        let output = self
            .execute(command::push(repo_url, branch, credentials), Some(cwd))
            .await?;

        info!("Pushed {} to {}", branch, command::strip_url_prefix(repo_url));
        Ok(output)
    }
}
