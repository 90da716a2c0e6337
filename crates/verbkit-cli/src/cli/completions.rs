//! Shell completion generation.

use std::io::Write;

use clap::{Arg, ArgMatches, Command, value_parser};
use clap_complete::{Shell, generate};

use super::BIN_NAME;

pub const NAME: &str = "completions";
const SHELL: &str = "shell";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Generate shell completions")
        .after_help(
            "EXAMPLES:\n\
            \x20 verbkit completions bash > ~/.local/share/bash-completion/completions/verbkit\n\
            \x20 verbkit completions zsh  > ~/.zfunc/_verbkit\n\
            \x20 verbkit completions fish > ~/.config/fish/completions/verbkit.fish",
        )
        .arg(
            Arg::new(SHELL)
                .required(true)
                .value_parser(value_parser!(Shell))
                .help("Target shell"),
        )
}

/// Write the completion script for the synthesized tree `root`.
pub fn execute(root: &mut Command, matches: &ArgMatches, out: &mut dyn Write) {
    // `required(true)` makes the shell always present after parsing.
    if let Some(&shell) = matches.get_one::<Shell>(SHELL) {
        generate(shell, root, BIN_NAME, out);
    }
}
