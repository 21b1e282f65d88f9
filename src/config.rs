//! Runtime settings read from the environment snapshot at startup.

use crate::env::Environment;
use tracing::warn;

/// Variable holding the prompt text.
pub const PROMPT_VAR: &str = "MY_PROMPT";
/// Variable overriding the argument cap.
pub const MAX_ARGS_VAR: &str = "PGSH_MAX_ARGS";
/// Variable overriding the number of history entries kept in memory.
pub const HISTORY_SIZE_VAR: &str = "PGSH_HISTORY_SIZE";

pub const DEFAULT_MAX_ARGS: usize = 128;
pub const DEFAULT_HISTORY_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name of the variable the prompt is read from.
    pub prompt_var: String,
    /// Maximum number of tokens kept from one input line.
    pub max_args: usize,
    pub history_size: usize,
}

impl Config {
    pub fn from_env(env: &Environment) -> Self {
        Self {
            prompt_var: PROMPT_VAR.to_string(),
            max_args: positive_var(env, MAX_ARGS_VAR).unwrap_or(DEFAULT_MAX_ARGS),
            history_size: positive_var(env, HISTORY_SIZE_VAR).unwrap_or(DEFAULT_HISTORY_SIZE),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt_var: PROMPT_VAR.to_string(),
            max_args: DEFAULT_MAX_ARGS,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

fn positive_var(env: &Environment, key: &str) -> Option<usize> {
    let raw = env.get_var(key)?;
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!(var = key, value = %raw, "ignoring invalid value, expected a positive integer");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let env = Environment::empty();
        assert_eq!(Config::from_env(&env), Config::default());
    }

    #[test]
    fn overrides_from_env() {
        let mut env = Environment::empty();
        env.set_var(MAX_ARGS_VAR, "4");
        env.set_var(HISTORY_SIZE_VAR, " 50 ");
        let config = Config::from_env(&env);
        assert_eq!(config.max_args, 4);
        assert_eq!(config.history_size, 50);
    }

    #[test]
    fn invalid_values_fall_back() {
        let mut env = Environment::empty();
        env.set_var(MAX_ARGS_VAR, "0");
        env.set_var(HISTORY_SIZE_VAR, "lots");
        let config = Config::from_env(&env);
        assert_eq!(config.max_args, DEFAULT_MAX_ARGS);
        assert_eq!(config.history_size, DEFAULT_HISTORY_SIZE);
    }
}
