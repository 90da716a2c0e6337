//! # verbkit
//!
//! Plugin-based CLI whose command tree is synthesized from a registry.
//!
//! ## Startup sequence
//!
//! 1. Load the built-in plugin namespace into a [`Registry`].
//! 2. Synthesize the clap command tree from the registry.
//! 3. Parse arguments (clap handles `--help` / `--version` early-exit).
//! 4. Initialise the tracing subscriber (logging).
//! 5. Load configuration (defaults + file + env).
//! 6. Install the Ctrl-C and panic hooks.
//! 7. Dispatch to the handler and exit with the code the exit policy picks.
//!
//! Plugins load before logging exists, so load warnings are replayed once
//! the subscriber is up.
//!
//! ## Exit codes
//!
//! | Code | Meaning                                                 |
//! |------|---------------------------------------------------------|
//! |  0   | Success                                                 |
//! |  1   | Input/config failure, or a bad config file              |
//! |  2   | Usage error, or any other declared failure              |
//! |  70  | Unhandled error in a handler, or a broken plugin set    |
//! | 130  | Interrupted                                             |

use std::process::ExitCode;

use tracing::debug;
use verbkit_core::exit::{EXIT_SUCCESS, EXIT_USAGE};
use verbkit_core::{CoreError, Registry, load_plugins};

use crate::{
    cli::{GlobalArgs, build_cli},
    config::AppConfig,
    error::CliError,
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod config;
mod error;
mod invoke;
mod logging;
mod output;

fn main() -> ExitCode {
    // Load .env before anything reads the environment (NO_COLOR, RUST_LOG,
    // VERBKIT_*). Silently ignored if .env doesn't exist.
    let _ = dotenvy::dotenv();

    // ── 1. Load plugins ───────────────────────────────────────────────────
    let mut registry = Registry::new();
    let report = match load_plugins(&mut registry, verbkit_plugins::builtin()) {
        Ok(report) => report,
        Err(e) => return handle_error(CoreError::from(e).into(), false),
    };

    // ── 2. Synthesize the command tree ────────────────────────────────────
    let mut root = match build_cli(&registry) {
        Ok(root) => root,
        Err(e) => return handle_error(e.into(), false),
    };

    // ── 3. Parse arguments ────────────────────────────────────────────────
    let matches = match root.try_get_matches_from_mut(std::env::args_os()) {
        Ok(matches) => matches,
        Err(e) => {
            // Help and version go to stdout with exit 0; real errors to
            // stderr with the same code as every other usage error.
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS });
        }
    };
    let global = GlobalArgs::from_matches(&matches);

    // ── 4. Initialise tracing ─────────────────────────────────────────────
    if let Err(e) = init_logging(&global) {
        return handle_error(e, global.verbose > 0);
    }
    report.log();

    debug!(
        verbose = global.verbose,
        quiet = global.quiet,
        no_color = global.no_color,
        verbs = registry.len(),
        "CLI started"
    );

    // ── 5. Load configuration ─────────────────────────────────────────────
    let config = match AppConfig::load(global.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => return handle_error(e, global.verbose > 0),
    };

    // ── 6. Signals and panics ─────────────────────────────────────────────
    let interrupted = i32::from(config.exit_codes.interrupted);
    if let Err(e) = ctrlc::set_handler(move || std::process::exit(interrupted)) {
        tracing::warn!("Could not install Ctrl-C handler: {e}");
    }
    // Panics inside handlers are caught and reported as events; keep the
    // default hook from also dumping them on stderr.
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));

    // ── 7. Dispatch ───────────────────────────────────────────────────────
    let mut output = OutputManager::new(&global, &config);
    let code = invoke::dispatch(
        &mut root,
        &matches,
        &registry,
        &config.exit_codes,
        &mut output,
    );
    debug!(exit_code = code, "CLI finished");
    ExitCode::from(code)
}

/// Translate a `CliError` into a user message and an appropriate exit code.
///
/// This is the single place where startup failures become human-readable
/// output and OS exit codes.
fn handle_error(err: CliError, verbose: bool) -> ExitCode {
    err.log();

    let msg = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        err.format_colored(verbose)
    } else {
        err.format_plain(verbose)
    };
    eprint!("{msg}");

    ExitCode::from(err.exit_code())
}
