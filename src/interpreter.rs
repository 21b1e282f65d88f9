use crate::builtin::Builtins;
use crate::config::Config;
use crate::env::Environment;
use crate::launcher;
use crate::lexer;
use crate::session::ShellSession;
use rustyline::error::ReadlineError;
use rustyline::history::History;
use rustyline::{DefaultEditor, Result};
use tracing::debug;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate, i.e. builtins.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// The shell's read-eval loop.
///
/// Owns the [`ShellSession`] and the [`Environment`] for the whole run and
/// passes them by reference to the builtins and the launcher. Dropping the
/// interpreter tears the session down.
pub struct Interpreter {
    session: ShellSession,
    env: Environment,
    config: Config,
    builtins: Builtins,
}

impl Interpreter {
    pub fn new(session: ShellSession, env: Environment, config: Config) -> Self {
        Self {
            session,
            env,
            config,
            builtins: Builtins::default(),
        }
    }

    pub fn session(&self) -> &ShellSession {
        &self.session
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// True once `exit` ran; no further lines should be executed.
    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Read and execute lines until `exit` or end of input.
    ///
    /// Ctrl-C while editing discards the line and shows a fresh prompt.
    pub fn repl(&mut self) -> Result<()> {
        let editor_config = rustyline::Config::builder()
            .max_history_size(self.config.history_size)?
            .auto_add_history(false)
            .build();
        let mut rl = DefaultEditor::with_config(editor_config)?;

        while !self.env.should_exit {
            match rl.readline(self.session.prompt()) {
                Ok(line) => {
                    let Some(line) = record_line(rl.history_mut(), &line)? else {
                        continue;
                    };
                    if let Err(e) = self.execute_line(line) {
                        eprintln!("pgsh: {e:#}");
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    debug!("line edit cancelled");
                }
                Err(ReadlineError::Eof) => {
                    debug!("end of input");
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }

    /// Execute one already trimmed line.
    ///
    /// Builtins report their own failures; errors from launching an external
    /// program are returned. The shell stays usable either way.
    pub fn execute_line(&mut self, line: &str) -> anyhow::Result<()> {
        let args = lexer::parse(line, self.config.max_args);
        if args.is_empty() {
            return Ok(());
        }
        if self
            .builtins
            .try_builtin(&mut self.session, &mut self.env, &args)
        {
            return Ok(());
        }
        launcher::launch(&mut self.session, &args)?;
        Ok(())
    }
}

/// Trim `raw` and add it to `history` unless it is blank.
///
/// Returns the trimmed line, or `None` for a blank line.
fn record_line<'a, H: History>(history: &mut H, raw: &'a str) -> Result<Option<&'a str>> {
    let line = lexer::trim_white(raw);
    if line.is_empty() {
        return Ok(None);
    }
    history.add(line)?;
    Ok(Some(line))
}
