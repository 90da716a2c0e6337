//! `ingest` - read a data file of a given category.

use serde_json::json;
use verbkit_core::prelude::*;

/// Category of an ingested file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Users,
    Orders,
    Events,
}

impl Choice for DataType {
    const VARIANTS: &'static [Self] = &[Self::Users, Self::Orders, Self::Events];

    fn value(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Orders => "orders",
            Self::Events => "events",
        }
    }
}

pub fn init(registry: &mut Registry) -> Result<(), PluginError> {
    registry.register(
        CommandSpec::new("ingest", module_path!(), ingest)
            .summary("Ingest a data file.")
            .param(ParamSpec::choice::<DataType>("data_type").help("Category of the file"))
            .param(ParamSpec::file("data_file").help("Input file ('-' for stdin)")),
    )?;
    Ok(())
}

fn ingest(results: &mut ResultObject, args: &mut Args) -> HandlerResult {
    let data_type: DataType = args.choice("data_type")?;
    let mut data_file = args.take_input("data_file")?;

    let text = data_file.read_all_to_string()?;
    tracing::debug!(path = %data_file.path().display(), bytes = text.len(), "ingested");

    let mut details = Details::new();
    details.insert("data_type".into(), json!(data_type.value()));
    details.insert("bytes".into(), json!(text.len()));
    results.add_event(
        "ingest",
        Some("Ingest completed"),
        Some(ErrorCode::Ok),
        Some(details),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn args(data_type: &str, text: &'static str) -> Args {
        Args::new().with("data_type", data_type).with_input(
            "data_file",
            Some(Input::from_reader("data.txt", Cursor::new(text.as_bytes()))),
        )
    }

    #[test]
    fn counts_utf8_bytes() {
        let mut results = ResultObject::new();
        ingest(&mut results, &mut args("users", "hello")).unwrap();

        assert!(results.ok());
        let ev = &results.events()[0];
        assert_eq!(ev.kind, "ingest");
        assert_eq!(ev.code.as_deref(), Some("OK"));
        assert_eq!(ev.details["data_type"], "users");
        assert_eq!(ev.details["bytes"], 5);

        let mut results = ResultObject::new();
        ingest(&mut results, &mut args("orders", "é")).unwrap();
        assert_eq!(results.events()[0].details["bytes"], 2);
    }

    #[test]
    fn invalid_utf8_is_unexpected() {
        let mut results = ResultObject::new();
        let mut args = Args::new().with("data_type", "events").with_input(
            "data_file",
            Some(Input::from_reader("bin", Cursor::new(vec![0xff, 0xfe]))),
        );
        let err = ingest(&mut results, &mut args).unwrap_err();
        assert!(matches!(err, HandlerError::Unexpected(_)));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, "id\n1\n").unwrap();

        let mut results = ResultObject::new();
        let mut args = Args::new()
            .with("data_type", "Orders")
            .with_input("data_file", Some(Input::open(&path).unwrap()));
        ingest(&mut results, &mut args).unwrap();
        assert_eq!(results.events()[0].details["data_type"], "orders");
        assert_eq!(results.events()[0].details["bytes"], 5);
    }

    #[test]
    fn both_params_are_positional() {
        let mut registry = Registry::new();
        init(&mut registry).unwrap();
        let command = registry.get("ingest").unwrap();
        let placements: Vec<_> = command
            .params()
            .iter()
            .map(|p| p.placement(command.meta().positional))
            .collect();
        assert_eq!(placements, vec![Placement::Positional, Placement::Positional]);
        assert_eq!(
            command.params()[0].kind(),
            &ParamKind::Choice(vec!["users", "orders", "events"])
        );
    }
}
