use crate::env::Environment;
use crate::lexer::ArgumentVector;
use crate::session::ShellSession;
use anyhow::Result;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Object-safe trait for a command executed inside the shell process.
///
/// Builtins get it through a blanket impl.
pub trait ExecutableCommand {
    /// Executes the command against the running session.
    fn execute(
        self: Box<Self>,
        session: &mut ShellSession,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

/// Factory that tries to create a command from an argument vector.
///
/// Returns `None` when the factory doesn't recognize the command name.
pub trait CommandFactory {
    /// Attempt to create a command instance for `args`, `args[0]` being its name.
    fn try_create(&self, args: &ArgumentVector) -> Option<Box<dyn ExecutableCommand>>;
}
