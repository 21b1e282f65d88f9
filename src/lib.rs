//! A small interactive shell with foreground job control.
//!
//! Each input line is trimmed, split on spaces into an [`ArgumentVector`] and
//! either handled by a builtin (`exit`, `cd`, `fg`) or launched as an external
//! program. External programs run in their own process group and own the
//! controlling terminal while they are in the foreground, so keyboard signals
//! reach them instead of the shell.
//!
//! The main entry point is [`Interpreter`], which drives the read loop over a
//! [`ShellSession`]. The public modules expose the pieces the loop is built
//! from: the tokenizer in [`lexer`], the process launcher in [`launcher`], the
//! session state in [`session`] and the environment snapshot in [`env`].

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
mod interpreter;
pub mod launcher;
pub mod lexer;
pub mod logger;
pub mod session;

#[cfg(test)]
mod test_utils;

pub use builtin::{Builtins, change_dir};
pub use config::Config;
pub use env::Environment;
pub use error::ShellError;
/// Just a convenient re-export of the interactive read loop.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::Interpreter;
pub use lexer::ArgumentVector;
pub use session::ShellSession;
