//! git-conductor - run compound git workflows from the command line
//!
//! Each subcommand maps onto one orchestrator operation, run against the
//! working directory given with `--path` (or the current directory).

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use git_conductor::config::Config;
use git_conductor::error::to_exit_code;
use git_conductor::{
    CloneOptions, Credentials, GitOpError, OperationResult, PushOptions, ShellRunner,
    WorkflowOrchestrator,
};

/// git-conductor - compound git workflows over the git CLI
#[derive(Parser, Debug)]
#[command(name = "gcon")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Working directory of the repository (defaults to current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Path to the config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Kill git commands running longer than this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone a repository over SSH
    Clone {
        /// SSH address of the repository
        repo_url: String,
        /// Destination directory
        clone_path: PathBuf,
        /// Extra flags for git clone, given after `--`
        #[arg(last = true)]
        flags: Vec<String>,
    },
    /// Switch to a branch
    Checkout {
        branch: String,
        /// Create the branch if it does not exist
        #[arg(short, long)]
        force: bool,
    },
    /// Stage all changes
    Add,
    /// Stage all changes and commit them
    Commit {
        #[arg(short, long)]
        message: String,
    },
    /// Report whether there are changes not staged for commit
    Status,
    /// Pull a branch from a remote address
    Pull { repo_url: String, branch: String },
    /// Commit pending changes, then push over HTTPS with credentials
    Push {
        repo_url: String,
        branch: String,
        #[arg(short, long)]
        user: String,
        #[arg(long, env = "GCON_PASSWORD", hide_env_values = true)]
        password: String,
        /// Commit message for pending changes
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Print the current configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    color_eyre::install()?;

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(args).await {
        Ok(()) => Ok(()),
        Err(report) => match report.downcast_ref::<GitOpError>() {
            Some(err) => {
                eprintln!("Error: {}: {}", report, err);
                std::process::exit(to_exit_code(err));
            }
            None => Err(report),
        },
    }
}

async fn run(args: Args) -> Result<()> {
    let config_path = match args.config.clone() {
        Some(path) => path,
        None => Config::default_path()
            .ok_or_else(|| eyre!("Could not determine the user config directory"))?,
    };
    let config = Config::load(&config_path)?;

    let cwd = match args.path.clone() {
        Some(path) => path,
        None => std::env::current_dir().wrap_err("Failed to get current directory")?,
    };

    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .or_else(|| config.command_timeout());
    let runner = Arc::new(ShellRunner::new().with_timeout(timeout));
    let orchestrator = WorkflowOrchestrator::with_settings(runner, config.orchestrator_settings());

    match args.command {
        Commands::Clone {
            repo_url,
            clone_path,
            flags,
        } => {
            let flags = if flags.is_empty() {
                config.clone_flags.clone()
            } else {
                flags
            };
            let clone_path = resolve(&cwd, &clone_path);
            orchestrator
                .clone(&repo_url, &clone_path, &CloneOptions { flags })
                .await
                .wrap_err("Clone failed")?;
            println!("Cloned into {}", clone_path.display());
        }
        Commands::Checkout { branch, force } => {
            let result = orchestrator
                .checkout(&cwd, &branch, force)
                .await
                .wrap_err_with(|| format!("Checkout of '{}' failed", branch))?;
            print_output(&result);
        }
        Commands::Add => {
            let result = orchestrator.add(&cwd).await.wrap_err("Add failed")?;
            print_output(&result);
        }
        Commands::Commit { message } => {
            let result = orchestrator
                .commit(&cwd, &message)
                .await
                .wrap_err("Commit failed")?;
            print_output(&result);
        }
        Commands::Status => {
            let status = orchestrator
                .has_unstaged(&cwd)
                .await
                .wrap_err("Status failed")?;
            print_output(&status.output);
            println!(
                "Unstaged changes: {}",
                if status.has_changes { "yes" } else { "no" }
            );
        }
        Commands::Pull { repo_url, branch } => {
            let result = orchestrator
                .pull(&cwd, &repo_url, &branch)
                .await
                .wrap_err("Pull failed")?;
            print_output(&result);
        }
        Commands::Push {
            repo_url,
            branch,
            user,
            password,
            message,
        } => {
            let credentials = Credentials::new(user, password);
            let result = orchestrator
                .push(
                    &cwd,
                    &repo_url,
                    &branch,
                    &credentials,
                    &PushOptions { message },
                )
                .await
                .wrap_err("Push failed")?;
            print_output(&result);
        }
        Commands::ShowConfig => show_config(&config, &config_path)?,
    }

    Ok(())
}

/// Resolve a clone destination against the working directory
fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn print_output(result: &OperationResult) {
    let stdout = result.stdout.trim_end();
    let stderr = result.stderr.trim_end();
    if !stdout.is_empty() {
        println!("{}", stdout);
    }
    if !stderr.is_empty() {
        eprintln!("{}", stderr);
    }
}

/// Show the current configuration
fn show_config(config: &Config, config_path: &Path) -> Result<()> {
    println!("git-conductor Configuration");
    println!("===========================");
    println!();
    println!("Config file: {}", config_path.display());
    println!("Default commit message: {}", config.default_commit_message);
    println!(
        "Command timeout: {}",
        config
            .command_timeout()
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!();
    println!("Clone flags ({}):", config.clone_flags.len());
    for flag in &config.clone_flags {
        println!("  {}", flag);
    }

    Ok(())
}
