use nix::unistd::{User, getuid};
use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;
use tracing::debug;

/// Prompt shown when the prompt variable is unset or empty.
pub const DEFAULT_PROMPT: &str = "shell>";

/// Snapshot of the process environment used by the shell.
///
/// The environment contains:
/// - `vars`: environment variables captured at startup.
/// - `current_dir`: the working directory, refreshed by `cd`.
/// - `should_exit`: set by `exit`; the read loop stops once it is true.
///
/// Lookups only consult `vars`, so callers (and tests) fully control what the
/// shell sees.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., HOME, MY_PROMPT).
    pub vars: HashMap<String, String>,
    /// The current working directory of the shell process.
    pub current_dir: PathBuf,
    /// When set to true, the interactive loop stops reading lines.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            current_dir,
            should_exit: false,
        }
    }

    /// An environment with no variables, rooted at the current directory.
    pub fn empty() -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            should_exit: false,
        }
    }

    /// Get the value of a variable from the snapshot.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Set or override a variable in the snapshot.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Home directory of the invoking user.
    ///
    /// `HOME` wins when it is set and non-empty; otherwise the account record
    /// of the real user id is consulted.
    pub fn home_dir(&self) -> Option<PathBuf> {
        if let Some(home) = self.get_var("HOME").filter(|h| !h.is_empty()) {
            return Some(PathBuf::from(home));
        }
        match User::from_uid(getuid()) {
            Ok(Some(user)) => Some(user.dir),
            Ok(None) => None,
            Err(e) => {
                debug!(error = %e, "account lookup failed");
                None
            }
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// Prompt text from the variable `var`, or [`DEFAULT_PROMPT`] when it is unset
/// or empty.
pub fn get_prompt(env: &Environment, var: &str) -> String {
    env.get_var(var)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PROMPT.to_string())
}
