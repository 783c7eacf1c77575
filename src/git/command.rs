//! Command lines for each git step
//!
//! The exact strings are a compatibility surface: existing tooling expects
//! them verbatim, so arguments are interpolated as given.

use std::fmt;
use std::path::Path;

use crate::executor::CommandLine;

/// Credentials for an authenticated push
///
/// Never persisted. `Debug` masks the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_name: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_name", &self.user_name)
            .field("password", &"***")
            .finish()
    }
}

/// `git clone <flag>... "<repo_url>" "<clone_path>"`
pub fn clone(repo_url: &str, clone_path: &Path, flags: &[String]) -> CommandLine {
    let mut args: Vec<String> = flags.to_vec();
    args.push(format!("\"{}\"", repo_url));
    args.push(format!("\"{}\"", clone_path.display()));
    CommandLine::new(format!("git clone {}", args.join(" ")))
}

/// `git add --all`
pub fn add_all() -> CommandLine {
    CommandLine::new("git add --all")
}

/// `git checkout <branch>`
pub fn checkout(branch: &str) -> CommandLine {
    CommandLine::new(format!("git checkout {}", branch))
}

/// `git checkout -b <branch>`
pub fn checkout_new_branch(branch: &str) -> CommandLine {
    CommandLine::new(format!("git checkout -b {}", branch))
}

/// `git commit -m "<message>"`
pub fn commit(message: &str) -> CommandLine {
    CommandLine::new(format!("git commit -m \"{}\"", message))
}

/// `git status`
pub fn status() -> CommandLine {
    CommandLine::new("git status")
}

/// `git pull <repo_url> <branch>`
pub fn pull(repo_url: &str, branch: &str) -> CommandLine {
    CommandLine::new(format!("git pull {} {}", repo_url, branch))
}

/// `git push https://<user>:<password>@<stripped_url> <branch>`, password masked in display
pub fn push(repo_url: &str, branch: &str, credentials: &Credentials) -> CommandLine {
    CommandLine::new(format!(
        "git push {} {}",
        authenticated_url(repo_url, credentials),
        branch
    ))
    .with_secret(credentials.password.as_str())
}

/// Remove a leading `https://` or `http://`, then a leading `www.`
pub fn strip_url_prefix(repo_url: &str) -> &str {
    let without_scheme = repo_url
        .strip_prefix("https://")
        .or_else(|| repo_url.strip_prefix("http://"))
        .unwrap_or(repo_url);
    without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme)
}

/// Push address carrying the credentials
pub fn authenticated_url(repo_url: &str, credentials: &Credentials) -> String {
    format!(
        "https://{}:{}@{}",
        credentials.user_name,
        credentials.password,
        strip_url_prefix(repo_url)
    )
}
