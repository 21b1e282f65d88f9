use anyhow::Context;
use argh::{EarlyExit, FromArgs};
use pgsh::{Config, Environment, Interpreter, ShellSession, logger};
use std::process::ExitCode;

#[derive(FromArgs)]
/// A small interactive shell with foreground job control.
struct Args {
    #[argh(switch, short = 'v')]
    /// print the version and exit
    version: bool,
}

/// Parse the command line, exiting on anything but `-v`.
///
/// Usage goes to stderr with a failure status, `--help` included.
fn parse_args() -> Args {
    let argv: Vec<String> = std::env::args().collect();
    let name = argv.first().map(String::as_str).unwrap_or("pgsh");
    let rest: Vec<&str> = argv.iter().skip(1).map(String::as_str).collect();
    match Args::from_args(&[name], &rest) {
        Ok(args) => args,
        Err(EarlyExit { output, .. }) => {
            eprintln!("{output}");
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<()> {
    let env = Environment::new();
    let config = Config::from_env(&env);
    let session =
        ShellSession::init(&env, &config).context("failed to initialize the shell session")?;

    let mut interpreter = Interpreter::new(session, env, config);
    interpreter.repl().context("failed to read input")?;
    Ok(())
}

fn main() -> ExitCode {
    let args = parse_args();
    if args.version {
        println!("pgsh version {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    logger::init_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pgsh: {e:#}");
            ExitCode::FAILURE
        }
    }
}
