//! Stable numeric error catalog.
//!
//! The numeric values are part of the external contract: they appear in JSON
//! output as `code_num` and drive exit-code selection. Never renumber a
//! variant; add new ones inside the right band instead.
//!
//! | Band        | Range |
//! |-------------|-------|
//! | Success     | 0     |
//! | Input       | 1xxx  |
//! | Config      | 2xxx  |
//! | Environment | 3xxx  |
//! | Plugin      | 4xxx  |
//! | Domain      | 5xxx  |
//! | Bug         | 9xxx  |

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

// ── ErrorCode ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum ErrorCode {
    Ok = 0,

    InputNotFound = 1001,
    InputInvalid = 1002,

    ConfigMissing = 2001,
    ConfigInvalid = 2002,

    EnvPermission = 3001,
    EnvIo = 3002,

    PluginImport = 4001,
    PluginConflict = 4002,

    DomainConstraint = 5001,
    DomainNotReady = 5002,

    BugUnhandled = 9001,
    BugAssert = 9002,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 13] = [
        Self::Ok,
        Self::InputNotFound,
        Self::InputInvalid,
        Self::ConfigMissing,
        Self::ConfigInvalid,
        Self::EnvPermission,
        Self::EnvIo,
        Self::PluginImport,
        Self::PluginConflict,
        Self::DomainConstraint,
        Self::DomainNotReady,
        Self::BugUnhandled,
        Self::BugAssert,
    ];

    /// Catalog name as it appears in the `code` field of an event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::InputNotFound => "E_INPUT_NOT_FOUND",
            Self::InputInvalid => "E_INPUT_INVALID",
            Self::ConfigMissing => "E_CONFIG_MISSING",
            Self::ConfigInvalid => "E_CONFIG_INVALID",
            Self::EnvPermission => "E_ENV_PERMISSION",
            Self::EnvIo => "E_ENV_IO",
            Self::PluginImport => "E_PLUGIN_IMPORT",
            Self::PluginConflict => "E_PLUGIN_CONFLICT",
            Self::DomainConstraint => "E_DOMAIN_CONSTRAINT",
            Self::DomainNotReady => "E_DOMAIN_NOT_READY",
            Self::BugUnhandled => "E_BUG_UNHANDLED",
            Self::BugAssert => "E_BUG_ASSERT",
        }
    }

    pub const fn value(&self) -> u16 {
        *self as u16
    }

    pub const fn band(&self) -> ErrorBand {
        ErrorBand::of(self.value())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnknownErrorCode {
    #[error("unknown error code name '{0}'")]
    Name(String),
    #[error("unknown error code value {0}")]
    Value(u16),
}

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.name() == s)
            .ok_or_else(|| UnknownErrorCode::Name(s.to_owned()))
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = UnknownErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|code| code.value() == value)
            .ok_or(UnknownErrorCode::Value(value))
    }
}

// ── ErrorBand ─────────────────────────────────────────────────────────────────

/// The class a numeric code belongs to, by its thousands digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorBand {
    Success,
    Input,
    Config,
    Environment,
    Plugin,
    Domain,
    Bug,
    Unclassified,
}

impl ErrorBand {
    pub const fn of(value: u16) -> Self {
        if value == 0 {
            return Self::Success;
        }
        match value / 1000 {
            1 => Self::Input,
            2 => Self::Config,
            3 => Self::Environment,
            4 => Self::Plugin,
            5 => Self::Domain,
            9 => Self::Bug,
            _ => Self::Unclassified,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Input => "input",
            Self::Config => "config",
            Self::Environment => "environment",
            Self::Plugin => "plugin",
            Self::Domain => "domain",
            Self::Bug => "bug",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for ErrorBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_stable() {
        assert_eq!(ErrorCode::Ok.value(), 0);
        assert_eq!(ErrorCode::InputNotFound.value(), 1001);
        assert_eq!(ErrorCode::ConfigMissing.value(), 2001);
        assert_eq!(ErrorCode::EnvIo.value(), 3002);
        assert_eq!(ErrorCode::PluginConflict.value(), 4002);
        assert_eq!(ErrorCode::DomainNotReady.value(), 5002);
        assert_eq!(ErrorCode::BugUnhandled.value(), 9001);
    }

    #[test]
    fn every_code_sits_in_its_named_band() {
        for code in ErrorCode::ALL {
            let expected = match code.name() {
                "OK" => ErrorBand::Success,
                n if n.starts_with("E_INPUT") => ErrorBand::Input,
                n if n.starts_with("E_CONFIG") => ErrorBand::Config,
                n if n.starts_with("E_ENV") => ErrorBand::Environment,
                n if n.starts_with("E_PLUGIN") => ErrorBand::Plugin,
                n if n.starts_with("E_DOMAIN") => ErrorBand::Domain,
                n if n.starts_with("E_BUG") => ErrorBand::Bug,
                other => panic!("unexpected code name {other}"),
            };
            assert_eq!(code.band(), expected, "{code}");
        }
    }

    #[test]
    fn raw_values_outside_known_bands_are_unclassified() {
        assert_eq!(ErrorBand::of(6001), ErrorBand::Unclassified);
        assert_eq!(ErrorBand::of(42), ErrorBand::Unclassified);
        assert_eq!(ErrorBand::of(10_000), ErrorBand::Unclassified);
    }

    #[test]
    fn parse_by_name_and_value() {
        assert_eq!(
            "E_CONFIG_MISSING".parse::<ErrorCode>().unwrap(),
            ErrorCode::ConfigMissing
        );
        assert_eq!(ErrorCode::try_from(9002).unwrap(), ErrorCode::BugAssert);
        assert!("E_NOPE".parse::<ErrorCode>().is_err());
        assert_eq!(
            ErrorCode::try_from(1234),
            Err(UnknownErrorCode::Value(1234))
        );
    }

    #[test]
    fn serializes_as_name() {
        let json = serde_json::to_string(&ErrorCode::BugUnhandled).unwrap();
        assert_eq!(json, "\"E_BUG_UNHANDLED\"");
    }
}
