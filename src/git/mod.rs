//! Git operations module using the git CLI
//!
//! Provides functionality for:
//! - Building the exact command line of each git step
//! - Classifying git failures
//! - Running clone, checkout, commit, pull and push workflows

pub mod command;
mod failure;
mod orchestrator;

pub use command::Credentials;
pub use failure::*;
pub use orchestrator::*;
