//! `check` - a toy configuration check.
//!
//! Shows a domain failure reported through the result object rather than an
//! error return: the handler completes normally, the invocation fails with
//! `E_CONFIG_MISSING`, and the CLI exits 1.

use serde_json::json;
use verbkit_core::prelude::*;

pub const DEFAULT_REQUIRED_KEY: &str = "version";

pub fn init(registry: &mut Registry) -> Result<(), PluginError> {
    registry.register(
        CommandSpec::new("check", module_path!(), check)
            .summary("Perform a simple config check.")
            .param(
                ParamSpec::string("required_key")
                    .default(DEFAULT_REQUIRED_KEY)
                    .help("Key that must be present"),
            ),
    )?;
    Ok(())
}

fn check(results: &mut ResultObject, args: &mut Args) -> HandlerResult {
    let required_key: String = args.get("required_key")?;
    tracing::debug!(%required_key, "checking configuration");

    // Nothing is ever found: the point is the failure path.
    let mut details = Details::new();
    details.insert("required_key".into(), json!(required_key));
    results.fail(
        &format!("Missing required key: {required_key}"),
        ErrorCode::ConfigMissing,
        Some(details),
    );
    Ok(())
}
