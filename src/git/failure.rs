//! Classification of git failure output
//!
//! git reports most failures only as free text on stderr. This module is the
//! one place that text is interpreted; workflow code matches on
//! [`FailureReason`] instead.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Why a git command failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureReason {
    /// The named branch, ref or path does not exist
    NotFound,
    /// Authentication or filesystem permissions rejected the command
    PermissionDenied,
    /// Local changes or a merge conflict block the command
    Conflict,
    #[default]
    Unknown,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureReason::NotFound => "not found",
            FailureReason::PermissionDenied => "permission denied",
            FailureReason::Conflict => "conflict",
            FailureReason::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

// Checked in order; the first match wins.
static PATTERNS: LazyLock<Vec<(Regex, FailureReason)>> = LazyLock::new(|| {
    [
        (r"(?i)did not match|no match|not found", FailureReason::NotFound),
        (
            r"(?i)permission denied|authentication failed|could not read username",
            FailureReason::PermissionDenied,
        ),
        (
            r"(?i)conflict|would be overwritten|not possible because you have unmerged",
            FailureReason::Conflict,
        ),
    ]
    .into_iter()
    .map(|(pattern, reason)| (Regex::new(pattern).expect("failure pattern must compile"), reason))
    .collect()
});

/// Classify the failure text of a git command
///
/// `git checkout <branch>` on a missing branch prints
/// `error: pathspec '<branch>' did not match any file(s) known to git`; the
/// not-found check must keep matching that wording.
pub fn classify(stderr: &str) -> FailureReason {
    PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(stderr))
        .map(|(_, reason)| *reason)
        .unwrap_or_default()
}
