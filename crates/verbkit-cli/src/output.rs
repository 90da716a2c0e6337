//! Rendering a finished invocation.
//!
//! JSON mode prints exactly one document, `{"ok": .., "events": [..]}`.
//! Text mode prints one line per event:
//!
//! ```text
//! [error] (E_CONFIG_MISSING:2001) Missing required key: version required_key=version
//! ```
//!
//! `--quiet` suppresses both; the exit code is computed regardless.

use std::io::{self, Write};

use console::Term;
use owo_colors::OwoColorize;
use verbkit_core::{Event, ResultObject};

use crate::cli::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

/// Renders result objects to stdout (or any writer, in tests).
pub struct OutputManager<W: Write = Term> {
    format: OutputFormat,
    quiet: bool,
    no_color: bool,
    out: W,
}

impl OutputManager<Term> {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let term = Term::stdout();
        // Piped output never gets ANSI codes.
        let no_color = args.no_color || config.output.no_color || !term.is_term();
        let format = args.output.unwrap_or(config.output.format);
        Self::with_writer(term, format, args.quiet, no_color)
    }
}

impl<W: Write> OutputManager<W> {
    pub fn with_writer(out: W, format: OutputFormat, quiet: bool, no_color: bool) -> Self {
        Self {
            format,
            quiet,
            no_color,
            out,
        }
    }

    pub fn render(&mut self, results: &ResultObject) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        match self.format {
            OutputFormat::Json => {
                let doc = results.to_json().map_err(io::Error::other)?;
                writeln!(self.out, "{doc}")?;
            }
            OutputFormat::Text => {
                for event in results.events() {
                    let line = if self.no_color {
                        format_event(event)
                    } else {
                        format_event_colored(event)
                    };
                    writeln!(self.out, "{line}")?;
                }
            }
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

// ── Text lines ────────────────────────────────────────────────────────────────

/// Plain text line for one event.
pub fn format_event(event: &Event) -> String {
    let mut line = format!("[{}]", event.kind);
    if let Some(code) = code_part(event) {
        line.push(' ');
        line.push_str(&code);
    }
    push_tail(&mut line, event);
    line
}

fn format_event_colored(event: &Event) -> String {
    let kind = format!("[{}]", event.kind);
    let mut line = if event.is_error() {
        kind.red().bold().to_string()
    } else {
        kind.green().bold().to_string()
    };
    if let Some(code) = code_part(event) {
        line.push(' ');
        line.push_str(&code.yellow().to_string());
    }
    push_tail(&mut line, event);
    line
}

fn code_part(event: &Event) -> Option<String> {
    match (&event.code, event.code_num) {
        (Some(code), Some(num)) => Some(format!("({code}:{num})")),
        (Some(code), None) => Some(format!("({code})")),
        (None, Some(num)) => Some(format!("({num})")),
        (None, None) => None,
    }
}

/// Message, then `key=value` details in insertion order.
///
/// Strings print bare; every other value prints in its JSON spelling
/// (`true`, `null`, `[1,2]`), so a text line reads the same as the JSON
/// document it mirrors.
fn push_tail(line: &mut String, event: &Event) {
    if let Some(message) = event.message.as_deref().filter(|m| !m.is_empty()) {
        line.push(' ');
        line.push_str(message);
    }
    for (key, value) in &event.details {
        line.push(' ');
        line.push_str(key);
        line.push('=');
        match value {
            serde_json::Value::String(s) => line.push_str(s),
            other => line.push_str(&other.to_string()),
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use verbkit_core::{Details, ErrorCode};

    fn sample() -> ResultObject {
        let mut results = ResultObject::new();
        let details: Details = json!({"data_type": "users", "bytes": 5})
            .as_object()
            .cloned()
            .unwrap();
        results.add_event("ingest", Some("Ingest completed"), Some(ErrorCode::Ok), Some(details));
        results.add_event("note", None, None, None);
        results
    }

    fn render(results: &ResultObject, format: OutputFormat, quiet: bool) -> String {
        let mut out = OutputManager::with_writer(Vec::new(), format, quiet, true);
        out.render(results).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn text_lines() {
        let text = render(&sample(), OutputFormat::Text, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[ingest] (OK:0) Ingest completed data_type=users bytes=5",
                "[note]",
            ]
        );
    }

    #[test]
    fn failure_line() {
        let mut results = ResultObject::new();
        let details: Details = json!({"required_key": "version"})
            .as_object()
            .cloned()
            .unwrap();
        results.fail(
            "Missing required key: version",
            ErrorCode::ConfigMissing,
            Some(details),
        );
        assert_eq!(
            render(&results, OutputFormat::Text, false).trim_end(),
            "[error] (E_CONFIG_MISSING:2001) Missing required key: version required_key=version"
        );
    }

    #[test]
    fn non_string_details_use_json_spelling() {
        let mut results = ResultObject::new();
        let details: Details = json!({"dry_run": true, "limit": null, "ids": [1, 2]})
            .as_object()
            .cloned()
            .unwrap();
        results.add_event("plan", None, None, Some(details));
        assert_eq!(
            render(&results, OutputFormat::Text, false).trim_end(),
            "[plan] dry_run=true limit=null ids=[1,2]"
        );
    }

    #[test]
    fn json_is_one_document() {
        let text = render(&sample(), OutputFormat::Json, false);
        assert_eq!(text.lines().count(), 1);
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["ok"], true);
        assert_eq!(doc["events"].as_array().unwrap().len(), 2);
        assert_eq!(doc["events"][0]["details"]["bytes"], 5);
        assert!(doc["events"][1]["code"].is_null());
    }

    #[test]
    fn quiet_renders_nothing() {
        assert!(render(&sample(), OutputFormat::Json, true).is_empty());
        assert!(render(&sample(), OutputFormat::Text, true).is_empty());
    }

    #[test]
    fn colored_line_keeps_text() {
        let line = format_event_colored(&sample().events()[0]);
        assert!(line.contains("Ingest completed"));
        assert!(line.contains("bytes=5"));
    }
}
