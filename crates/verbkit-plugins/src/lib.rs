//! Built-in plugins for verbkit.
//!
//! Every module here contributes verbs through its `init` function. The
//! entry point loads [`builtin`] at startup; adding a plugin means adding a
//! module and one line to [`BUILTIN`].

pub mod check;
pub mod ingest;

use verbkit_core::plugins::Plugin;

pub const BUILTIN: &[Plugin] = &[
    Plugin::new("check", check::init),
    Plugin::new("ingest", ingest::init),
];

/// The plugin namespace shipped with the binary.
pub fn builtin() -> &'static [Plugin] {
    BUILTIN
}
