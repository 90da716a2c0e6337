//! verbkit core - registry, parameter model and result protocol.
//!
//! This crate holds everything a plugin needs to describe a verb and report
//! what it did, with no knowledge of argument parsing or terminals.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            verbkit-cli (bin)            │
//! │   synthesizes clap, invokes, renders    │
//! └──────────────────┬──────────────────────┘
//!                    │ reads
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │               Registry                  │
//! │   verb -> (CommandMeta, params, handler)│
//! └──────────────────┬──────────────────────┘
//!                    │ populated by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    Plugin namespace (verbkit-plugins)   │
//! │        init(&mut Registry) each         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! A handler receives the invocation's [`ResultObject`] and its bound
//! [`Args`]. It records events and failures on the result object and returns
//! a [`HandlerResult`]; the exit code is derived from the events afterwards
//! by an [`ExitPolicy`].
//!
//! ## Usage
//!
//! ```rust
//! use verbkit_core::prelude::*;
//!
//! fn hello(results: &mut ResultObject, args: &mut Args) -> HandlerResult {
//!     let name: String = args.get("name")?;
//!     results.add_event("hello", Some(&format!("hi {name}")), Some(ErrorCode::Ok), None);
//!     Ok(())
//! }
//!
//! let mut registry = Registry::new();
//! registry
//!     .register(
//!         CommandSpec::new("hello", module_path!(), hello)
//!             .summary("Say hello")
//!             .param(ParamSpec::string("name")),
//!     )
//!     .unwrap();
//! assert_eq!(registry.verbs(), vec!["hello"]);
//! ```

pub mod args;
pub mod codes;
pub mod error;
pub mod exit;
pub mod params;
pub mod plugins;
pub mod registry;
pub mod results;

pub mod prelude {
    pub use crate::args::{ArgError, Args, FromValue, Input};
    pub use crate::codes::{ErrorBand, ErrorCode};
    pub use crate::error::{CoreError, CoreResult, ErrorCategory};
    pub use crate::exit::{ExitBand, ExitPolicy, ExitPolicyError};
    pub use crate::params::{Choice, ParamKind, ParamSpec, Placement, SignatureError, Value};
    pub use crate::plugins::{LoadReport, Plugin, PluginError, load_plugins};
    pub use crate::registry::{
        Command, CommandMeta, CommandSpec, Handler, HandlerError, HandlerResult,
        RegistrationError, Registry,
    };
    pub use crate::results::{Details, Event, ResultObject};
}

pub use prelude::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
