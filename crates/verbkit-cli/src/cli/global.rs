//! Global arguments that apply to every invocation.
//!
//! They sit on the root command, before the verb, so plugin parameters can
//! never shadow them.

use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{Arg, ArgAction, ArgMatches, value_parser};
use serde::{Deserialize, Serialize};

pub const OUTPUT: &str = "output";
pub const QUIET: &str = "quiet";
pub const VERBOSE: &str = "verbose";
pub const NO_COLOR: &str = "no_color";
pub const CONFIG: &str = "config";

/// Global arguments, read back from the root matches.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    /// `-v` count: info, debug, trace.
    pub verbose: u8,
    /// Suppress rendered output and non-error logs.
    pub quiet: bool,
    pub no_color: bool,
    pub config: Option<PathBuf>,
    /// `None` defers to the config file.
    pub output: Option<OutputFormat>,
}

impl GlobalArgs {
    /// Argument definitions for the root command.
    pub fn args() -> [Arg; 5] {
        [
            Arg::new(OUTPUT)
                .long("output")
                .value_name("FORMAT")
                .value_parser(value_parser!(OutputFormat))
                .ignore_case(true)
                .help("Output format [default: text]"),
            Arg::new(QUIET)
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .conflicts_with(VERBOSE)
                .help("Suppress rendered output"),
            Arg::new(VERBOSE)
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase verbosity (-v, -vv, -vvv)")
                .long_help(
                    "Increase logging verbosity:
    (none)  - Only warnings and errors
    -v      - Info level
    -vv     - Debug level
    -vvv    - Trace level",
                ),
            // Honours NO_COLOR (https://no-color.org) with any non-empty value.
            Arg::new(NO_COLOR)
                .long("no-color")
                .env("NO_COLOR")
                .action(ArgAction::SetTrue)
                .value_parser(FalseyValueParser::new())
                .help("Disable colored output"),
            Arg::new(CONFIG)
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file path"),
        ]
    }

    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            verbose: matches.get_count(VERBOSE),
            quiet: matches.get_flag(QUIET),
            no_color: matches.get_flag(NO_COLOR),
            config: matches.get_one::<PathBuf>(CONFIG).cloned(),
            output: matches.get_one::<OutputFormat>(OUTPUT).copied(),
        }
    }
}

/// How a finished invocation is rendered on stdout.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per event.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}
