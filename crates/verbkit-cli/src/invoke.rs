//! Invocation wrapper: parsed matches in, exit code out.
//!
//! For the verb the user picked, [`dispatch`]:
//!
//! 1. binds the parsed values into [`Args`], opening file parameters;
//! 2. runs the handler, catching errors and panics;
//! 3. renders the result object (unless quiet);
//! 4. maps the outcome to an exit code through the [`ExitPolicy`].
//!
//! A usage error (a file that will not open, or [`HandlerError::Usage`])
//! is reported the way clap reports parse errors and skips rendering.

use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use clap::ArgMatches;
use clap::error::ErrorKind;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use verbkit_core::exit::{EXIT_SUCCESS, EXIT_USAGE};
use verbkit_core::params::canonical_choice;
use verbkit_core::prelude::*;

use crate::cli::completions;
use crate::output::OutputManager;

/// Failure to turn parsed values into handler arguments.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("invalid value for '{name}': '{}': {source}", path.display())]
    Open {
        name: String,
        path: PathBuf,
        source: io::Error,
    },
}

/// The invocation was malformed.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UsageError(pub String);

impl From<BindError> for UsageError {
    fn from(err: BindError) -> Self {
        Self(err.to_string())
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Run the subcommand selected in `matches` and return the exit code.
///
/// `root` is the synthesized tree the matches came from; it is needed for
/// completions and for formatting usage errors.
pub fn dispatch<W: Write>(
    root: &mut clap::Command,
    matches: &ArgMatches,
    registry: &Registry,
    policy: &ExitPolicy,
    output: &mut OutputManager<W>,
) -> u8 {
    let Some((verb, sub)) = matches.subcommand() else {
        return EXIT_USAGE;
    };

    if verb == completions::NAME {
        completions::execute(root, sub, &mut io::stdout());
        return EXIT_SUCCESS;
    }

    let Some(command) = registry.get(verb) else {
        report_usage(root, verb, &format!("unrecognized subcommand '{verb}'"));
        return EXIT_USAGE;
    };

    let outcome = bind_args(command, sub)
        .map_err(UsageError::from)
        .and_then(|args| invoke(command, args, policy, output));

    match outcome {
        Ok(code) => code,
        Err(UsageError(message)) => {
            report_usage(root, verb, &message);
            EXIT_USAGE
        }
    }
}

fn report_usage(root: &mut clap::Command, verb: &str, message: &str) {
    let err = match root.find_subcommand_mut(verb) {
        Some(sub) => sub.error(ErrorKind::ValueValidation, message),
        None => clap::Error::raw(ErrorKind::ValueValidation, message),
    };
    // Nothing sensible to do if stderr is gone.
    let _ = err.print();
}

// ── Binding ───────────────────────────────────────────────────────────────────

/// Bind the values parsed for `command` into handler arguments.
///
/// Choice values are stored in their canonical spelling; files are opened
/// here, so a handler never sees a path it cannot read.
pub fn bind_args(command: &Command, matches: &ArgMatches) -> Result<Args, BindError> {
    let mut args = Args::new();
    for param in command.params() {
        let name = param.name();
        match param.kind() {
            ParamKind::Bool => args.insert(name, matches.get_flag(name)),
            ParamKind::Int => args.insert(name, scalar(matches.get_one::<i64>(name).copied())),
            ParamKind::Float => args.insert(name, scalar(matches.get_one::<f64>(name).copied())),
            ParamKind::Str => args.insert(name, scalar(matches.get_one::<String>(name).cloned())),
            ParamKind::Choice(values) => {
                let value = matches.get_one::<String>(name).map(|raw| {
                    canonical_choice(values, raw).map_or_else(|| raw.clone(), str::to_owned)
                });
                args.insert(name, scalar(value));
            }
            ParamKind::File => {
                let input = match matches.get_one::<PathBuf>(name) {
                    Some(path) => Some(Input::open(path).map_err(|source| BindError::Open {
                        name: name.to_owned(),
                        path: path.clone(),
                        source,
                    })?),
                    None => None,
                };
                args.insert_input(name, input);
            }
        }
    }
    Ok(args)
}

fn scalar<T: Into<Value>>(value: Option<T>) -> Value {
    value.map_or(Value::Null, Into::into)
}

// ── Invocation ────────────────────────────────────────────────────────────────

/// Call the handler of `command`, render its results and compute the exit
/// code.
pub fn invoke<W: Write>(
    command: &Command,
    mut args: Args,
    policy: &ExitPolicy,
    output: &mut OutputManager<W>,
) -> Result<u8, UsageError> {
    let verb = command.verb();
    let mut results = ResultObject::new();

    debug!(verb, "invoking handler");
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        command.handler().call(&mut results, &mut args)
    }));

    let bug = match outcome {
        Ok(Ok(())) => false,
        Ok(Err(HandlerError::Usage(message))) => return Err(UsageError(message)),
        Ok(Err(HandlerError::Interrupted)) => {
            warn!(verb, "interrupted");
            return Ok(policy.interrupted);
        }
        Ok(Err(HandlerError::Unexpected(err))) => {
            record_bug(&mut results, verb, format!("{err:#}"));
            true
        }
        Err(payload) => {
            let representation = format!("panicked: {}", panic_message(&*payload));
            record_bug(&mut results, verb, representation);
            true
        }
    };

    if let Err(err) = output.render(&results) {
        warn!(verb, "failed to render results: {err}");
    }

    let code = policy.exit_code(&results, bug);
    info!(verb, ok = results.ok(), exit_code = code, "invocation finished");
    Ok(code)
}

fn record_bug(results: &mut ResultObject, verb: &str, representation: String) {
    error!(verb, "unhandled error in handler: {representation}");
    let mut details = Details::new();
    details.insert("exception".into(), representation.into());
    results.fail(
        "Unhandled exception",
        ErrorCode::BugUnhandled,
        Some(details),
    );
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use anyhow::Context as _;
    use serde_json::json;

    use crate::cli::{OutputFormat, build_cli};

    static GUARDED_CALLED: AtomicBool = AtomicBool::new(false);

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Level {
        Low,
        High,
    }

    impl Choice for Level {
        const VARIANTS: &'static [Self] = &[Self::Low, Self::High];

        fn value(&self) -> &'static str {
            match self {
                Self::Low => "low",
                Self::High => "high",
            }
        }
    }

    fn echo(results: &mut ResultObject, args: &mut Args) -> HandlerResult {
        let level: Level = args.choice("level")?;
        let count: Option<i64> = args.get("count")?;
        let loud: bool = args.get("loud")?;
        let mut details = Details::new();
        details.insert("level".into(), json!(level.value()));
        details.insert("count".into(), json!(count));
        details.insert("loud".into(), json!(loud));
        results.add_event("echo", Some("echoed"), Some(ErrorCode::Ok), Some(details));
        Ok(())
    }

    fn refuse(results: &mut ResultObject, args: &mut Args) -> HandlerResult {
        let code: String = args.get("code")?;
        let code: ErrorCode = code.parse().map_err(anyhow::Error::from)?;
        results.fail("refused", code, None);
        Ok(())
    }

    fn boom(_: &mut ResultObject, _: &mut Args) -> HandlerResult {
        Err(anyhow::anyhow!("disk on fire"))
            .context("while frobbing")
            .map_err(HandlerError::from)
    }

    fn explode(results: &mut ResultObject, _: &mut Args) -> HandlerResult {
        results.add_event("start", None, None, None);
        panic!("kaboom");
    }

    fn misuse(_: &mut ResultObject, _: &mut Args) -> HandlerResult {
        Err(HandlerError::Usage("--a and --b are exclusive".into()))
    }

    fn stop(_: &mut ResultObject, _: &mut Args) -> HandlerResult {
        Err(HandlerError::Interrupted)
    }

    fn read(results: &mut ResultObject, args: &mut Args) -> HandlerResult {
        let text = args.take_input("source")?.read_all_to_string()?;
        let mut details = Details::new();
        details.insert("bytes".into(), json!(text.len()));
        results.add_event("read", None, Some(ErrorCode::Ok), Some(details));
        Ok(())
    }

    fn guarded(_: &mut ResultObject, _: &mut Args) -> HandlerResult {
        GUARDED_CALLED.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        let specs = [
            CommandSpec::new("echo", "tests", echo)
                .param(ParamSpec::choice::<Level>("level"))
                .param(ParamSpec::int("count").optional())
                .param(ParamSpec::flag("loud")),
            CommandSpec::new("refuse", "tests", refuse).param(ParamSpec::string("code")),
            CommandSpec::new("boom", "tests", boom),
            CommandSpec::new("explode", "tests", explode),
            CommandSpec::new("misuse", "tests", misuse),
            CommandSpec::new("stop", "tests", stop),
            CommandSpec::new("read", "tests", read).param(ParamSpec::file("source")),
            CommandSpec::new("guarded", "tests", guarded).param(ParamSpec::file("source")),
        ];
        for spec in specs {
            registry.register(spec).unwrap();
        }
        registry
    }

    fn run(argv: &[&str], format: OutputFormat, quiet: bool) -> (u8, String) {
        let registry = registry();
        let mut root = build_cli(&registry).unwrap();
        let mut full = vec!["verbkit"];
        full.extend_from_slice(argv);
        let matches = root.try_get_matches_from_mut(full).unwrap();
        let mut output = OutputManager::with_writer(Vec::new(), format, quiet, true);
        let code = dispatch(
            &mut root,
            &matches,
            &registry,
            &ExitPolicy::default(),
            &mut output,
        );
        (code, String::from_utf8(output.into_inner()).unwrap())
    }

    fn run_json(argv: &[&str]) -> (u8, serde_json::Value) {
        let (code, out) = run(argv, OutputFormat::Json, false);
        (code, serde_json::from_str(&out).unwrap())
    }

    #[test]
    fn success_exits_zero_with_canonical_choice() {
        let (code, doc) = run_json(&["echo", "HIGH", "--count", "3", "--loud"]);
        assert_eq!(code, 0);
        assert_eq!(doc["ok"], true);
        let details = &doc["events"][0]["details"];
        assert_eq!(details["level"], "high");
        assert_eq!(details["count"], 3);
        assert_eq!(details["loud"], true);
    }

    #[test]
    fn absent_optional_binds_null() {
        let (_, doc) = run_json(&["echo", "low"]);
        assert!(doc["events"][0]["details"]["count"].is_null());
        assert_eq!(doc["events"][0]["details"]["loud"], false);
    }

    #[test]
    fn declared_failure_uses_bands() {
        let (code, doc) = run_json(&["refuse", "E_INPUT_NOT_FOUND"]);
        assert_eq!(code, 1);
        assert_eq!(doc["ok"], false);
        assert_eq!(doc["events"][0]["kind"], "error");
        assert_eq!(doc["events"][0]["code_num"], 1001);

        let (code, _) = run_json(&["refuse", "E_DOMAIN_CONSTRAINT"]);
        assert_eq!(code, 2);
    }

    #[test]
    fn handler_error_is_a_bug() {
        let (code, doc) = run_json(&["boom"]);
        assert_eq!(code, 70);
        let event = &doc["events"][0];
        assert_eq!(event["kind"], "error");
        assert_eq!(event["code"], "E_BUG_UNHANDLED");
        assert_eq!(event["message"], "Unhandled exception");
        assert_eq!(
            event["details"]["exception"],
            "while frobbing: disk on fire"
        );
    }

    #[test]
    fn panic_is_a_bug_and_keeps_earlier_events() {
        let (code, doc) = run_json(&["explode"]);
        assert_eq!(code, 70);
        let events = doc["events"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["kind"], "start");
        assert_eq!(events[1]["code"], "E_BUG_UNHANDLED");
        assert_eq!(events[1]["details"]["exception"], "panicked: kaboom");
    }

    #[test]
    fn usage_error_skips_rendering() {
        let (code, out) = run(&["misuse"], OutputFormat::Json, false);
        assert_eq!(code, 2);
        assert!(out.is_empty());
    }

    #[test]
    fn interrupted_exits_130() {
        let (code, out) = run(&["stop"], OutputFormat::Text, false);
        assert_eq!(code, 130);
        assert!(out.is_empty());
    }

    #[test]
    fn quiet_keeps_exit_code() {
        let (code, out) = run(&["boom"], OutputFormat::Json, true);
        assert_eq!(code, 70);
        assert!(out.is_empty());

        let (code, out) = run(&["refuse", "E_CONFIG_INVALID"], OutputFormat::Text, true);
        assert_eq!(code, 1);
        assert!(out.is_empty());
    }

    #[test]
    fn text_mode_lines() {
        let (code, out) = run(&["refuse", "E_ENV_IO"], OutputFormat::Text, false);
        assert_eq!(code, 2);
        assert_eq!(out, "[error] (E_ENV_IO:3002) refused\n");
    }

    #[test]
    fn file_is_opened_before_the_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("five.txt");
        std::fs::write(&path, "12345").unwrap();

        let (code, doc) = run_json(&["read", path.to_str().unwrap()]);
        assert_eq!(code, 0);
        assert_eq!(doc["events"][0]["details"]["bytes"], 5);
    }

    #[test]
    fn unopenable_file_is_a_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let registry = registry();
        let command = registry.get("read").unwrap();
        let matches = build_cli(&registry)
            .unwrap()
            .try_get_matches_from(["verbkit", "read", path.to_str().unwrap()])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();

        let err = bind_args(command, sub).unwrap_err();
        assert!(err.to_string().contains("absent.txt"));
    }

    #[test]
    fn unopenable_file_never_reaches_the_handler() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let (code, out) = run(&["guarded", path.to_str().unwrap()], OutputFormat::Json, false);
        assert_eq!(code, 2);
        assert!(out.is_empty());
        assert!(!GUARDED_CALLED.load(Ordering::SeqCst));
    }

    #[test]
    fn panic_message_handles_payload_types() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "non-string panic payload");
    }
}
