//! The per-invocation result object.
//!
//! One [`ResultObject`] is created for each CLI invocation and handed to the
//! handler by mutable reference. Handlers append [`Event`]s to it and call
//! [`ResultObject::fail`] for declared failures. Events are never removed or
//! rewritten, so the rendered output is a faithful log of what happened.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::codes::ErrorCode;

/// Free-form event details, kept in insertion order.
pub type Details = serde_json::Map<String, serde_json::Value>;

/// Kind used for events recorded by [`ResultObject::fail`].
pub const ERROR_KIND: &str = "error";

// ── Event ─────────────────────────────────────────────────────────────────────

/// One structured record appended to a [`ResultObject`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub kind: String,
    pub message: Option<String>,
    pub code: Option<String>,
    pub code_num: Option<u16>,
    #[serde(rename = "ts", serialize_with = "serialize_ts")]
    pub timestamp: DateTime<Utc>,
    pub details: Details,
}

impl Event {
    fn new(
        kind: impl Into<String>,
        message: Option<&str>,
        code: Option<ErrorCode>,
        details: Option<Details>,
    ) -> Self {
        Self {
            kind: kind.into(),
            message: message.map(str::to_owned),
            code: code.map(|c| c.name().to_owned()),
            code_num: code.map(|c| c.value()),
            timestamp: Utc::now(),
            details: details.unwrap_or_default(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == ERROR_KIND
    }

    /// The timestamp as it appears in JSON output.
    pub fn ts(&self) -> String {
        format_ts(&self.timestamp)
    }
}

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn serialize_ts<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_ts(ts))
}

// ── ResultObject ──────────────────────────────────────────────────────────────

/// Success flag plus an append-only event log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultObject {
    ok: bool,
    events: Vec<Event>,
}

impl Default for ResultObject {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultObject {
    pub fn new() -> Self {
        Self {
            ok: true,
            events: Vec::new(),
        }
    }

    /// Append a timestamped event. Does not touch `ok`.
    pub fn add_event(
        &mut self,
        kind: impl Into<String>,
        message: Option<&str>,
        code: Option<ErrorCode>,
        details: Option<Details>,
    ) {
        self.events.push(Event::new(kind, message, code, details));
    }

    /// Mark the invocation failed and record an `"error"` event.
    pub fn fail(&mut self, message: &str, code: ErrorCode, details: Option<Details>) {
        self.ok = false;
        self.add_event(ERROR_KIND, Some(message), Some(code), details);
    }

    pub fn ok(&self) -> bool {
        self.ok
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Numeric codes of every `"error"` event, in order.
    pub fn error_codes(&self) -> Vec<u16> {
        self.events
            .iter()
            .filter(|ev| ev.is_error())
            .filter_map(|ev| ev.code_num)
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
