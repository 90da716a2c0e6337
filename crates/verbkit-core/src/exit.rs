//! Mapping a finished invocation to a process exit code.
//!
//! The mapping is data, not code: [`ExitPolicy`] carries the reserved codes
//! and an ordered list of numeric bands, and is deserialized from the
//! `[exit_codes]` table of the application config. The defaults give the
//! classic three-way split:
//!
//! | Outcome                                   | Exit |
//! |-------------------------------------------|------|
//! | success                                   | 0    |
//! | failure with an input/config code (1xxx-2xxx) | 1 |
//! | any other failure                         | 2    |
//! | unhandled internal error                  | 70   |
//! | interrupted                               | 130  |
//!
//! Usage errors always exit with [`EXIT_USAGE`]: most of them are raised by
//! the argument parser before any configuration has been read.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::results::ResultObject;

pub const EXIT_SUCCESS: u8 = 0;
/// `EX_SOFTWARE` from sysexits.h.
pub const EXIT_BUG: u8 = 70;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_INTERRUPTED: u8 = 130;

/// A half-open range `[start, end)` of error-code values and the exit code
/// it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitBand {
    pub start: u16,
    pub end: u16,
    pub exit_code: u8,
}

impl ExitBand {
    pub const fn new(start: u16, end: u16, exit_code: u8) -> Self {
        Self {
            start,
            end,
            exit_code,
        }
    }

    pub const fn contains(&self, code: u16) -> bool {
        self.start <= code && code < self.end
    }
}

/// An [`ExitPolicy`] that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExitPolicyError {
    #[error("exit band [{start}, {end}) is empty")]
    EmptyBand { start: u16, end: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExitPolicy {
    /// Unhandled fault inside a handler.
    pub bug: u8,
    pub interrupted: u8,
    /// Failure whose codes match no band (or that carries no code at all).
    pub unclassified: u8,
    /// Checked in order; the first band containing any error code wins.
    pub bands: Vec<ExitBand>,
}

impl Default for ExitPolicy {
    fn default() -> Self {
        Self {
            bug: EXIT_BUG,
            interrupted: EXIT_INTERRUPTED,
            unclassified: 2,
            bands: vec![ExitBand::new(1000, 3000, 1)],
        }
    }
}

impl ExitPolicy {
    /// Exit code for a finished invocation.
    ///
    /// `bug` is set when the handler faulted rather than reporting a failure.
    pub fn exit_code(&self, results: &ResultObject, bug: bool) -> u8 {
        if bug {
            return self.bug;
        }
        if results.ok() {
            return EXIT_SUCCESS;
        }
        self.classify(&results.error_codes())
    }

    /// Exit code for a failed invocation carrying `codes`.
    pub fn classify(&self, codes: &[u16]) -> u8 {
        self.bands
            .iter()
            .find(|band| codes.iter().any(|&code| band.contains(code)))
            .map_or(self.unclassified, |band| band.exit_code)
    }

    /// Reject bands that can never match.
    pub fn validate(&self) -> Result<(), ExitPolicyError> {
        match self.bands.iter().find(|band| band.start >= band.end) {
            Some(band) => Err(ExitPolicyError::EmptyBand {
                start: band.start,
                end: band.end,
            }),
            None => Ok(()),
        }
    }
}
