//! Command-line synthesis.
//!
//! The argument tree is not declared anywhere: [`build_cli`] walks the
//! registry and turns each command's parameter list into a clap subcommand.
//! This module is the only place that knows how a [`ParamSpec`] looks on the
//! command line.
//!
//! | Parameter                                | Surfaces as                    |
//! |------------------------------------------|--------------------------------|
//! | bool                                     | `--name` flag (toggles default)|
//! | required, verb in positional mode        | positional `NAME`              |
//! | anything else                            | `--name VALUE` option          |
//! | file                                     | path, opened before the call   |

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command, value_parser};
use verbkit_core::error::CoreResult;
use verbkit_core::params::validate_signature;
use verbkit_core::{ParamKind, ParamSpec, Placement, Registry, Value};

pub mod completions;
pub mod global;

pub use global::{GlobalArgs, OutputFormat};

pub const BIN_NAME: &str = "verbkit";

// ── Root ──────────────────────────────────────────────────────────────────────

fn root_command() -> Command {
    Command::new(BIN_NAME)
        .bin_name(BIN_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Plugin-based CLI with dynamic dispatch")
        .after_help(
            "EXAMPLES:\n\
            \x20 verbkit ingest users data.csv\n\
            \x20 verbkit --output json check --required-key name\n\
            \x20 verbkit completions bash > ~/.local/share/bash-completion/completions/verbkit",
        )
        .args(GlobalArgs::args())
        .subcommand_required(true)
        .arg_required_else_help(true)
}

/// Build the full command tree from `registry`.
///
/// Verbs appear in lexicographic order, followed by the built-in
/// `completions`. Fails on the first command whose signature cannot be
/// expressed on the command line.
pub fn build_cli(registry: &Registry) -> CoreResult<Command> {
    let mut root = root_command();
    for command in registry.iter() {
        validate_signature(command.verb(), command.params())?;
        root = root.subcommand(verb_command(command));
    }
    Ok(root.subcommand(completions::command()))
}

// ── Verbs ─────────────────────────────────────────────────────────────────────

fn verb_command(command: &verbkit_core::Command) -> Command {
    let meta = command.meta();
    let (positionals, options): (Vec<&ParamSpec>, Vec<&ParamSpec>) = command
        .params()
        .iter()
        .partition(|p| p.placement(meta.positional) == Placement::Positional);

    let mut cmd = Command::new(meta.verb.clone()).about(meta.summary.clone());
    for (index, param) in positionals.into_iter().enumerate() {
        cmd = cmd.arg(positional_arg(param, index + 1));
    }
    for param in options {
        cmd = cmd.arg(option_arg(param));
    }
    cmd
}

fn positional_arg(param: &ParamSpec, index: usize) -> Arg {
    typed(base_arg(param), param.kind())
        .index(index)
        .required(true)
        .value_name(param.name().to_uppercase())
}

fn option_arg(param: &ParamSpec) -> Arg {
    let arg = base_arg(param).long(param.long_name());

    if *param.kind() == ParamKind::Bool {
        // Passing the flag flips the declared default.
        let action = match param.default_value() {
            Some(Value::Bool(true)) => ArgAction::SetFalse,
            _ => ArgAction::SetTrue,
        };
        return arg.action(action);
    }

    let mut arg = typed(arg, param.kind()).required(param.is_required());
    if let ParamKind::File = param.kind() {
        arg = arg.value_name("PATH");
    }
    match param.default_value() {
        Some(default) if !default.is_null() => arg.default_value(default.to_string()),
        _ => arg,
    }
}

fn base_arg(param: &ParamSpec) -> Arg {
    let arg = Arg::new(param.name().to_owned());
    match param.help_text() {
        Some(help) => arg.help(help.to_owned()),
        None => arg,
    }
}

fn typed(arg: Arg, kind: &ParamKind) -> Arg {
    match kind {
        ParamKind::Bool => arg.action(ArgAction::SetTrue),
        ParamKind::Int => arg.value_parser(value_parser!(i64)),
        ParamKind::Float => arg.value_parser(value_parser!(f64)),
        ParamKind::Str => arg.value_parser(value_parser!(String)),
        ParamKind::Choice(values) => arg
            .value_parser(PossibleValuesParser::new(values.iter().copied()))
            .ignore_case(true),
        ParamKind::File => arg.value_parser(value_parser!(PathBuf)),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
