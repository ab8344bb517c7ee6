use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::ConfigEntry;
use anyhow::Result;
use formqa_core::config::CliConfigOverrides;
use serde_json::json;
use std::path::Path;

pub fn execute(
    output: &OutputWriter,
    config_path: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<()> {
    let config = load_config_with_overrides(config_path, overrides)?;
    let problem = config.resolve().err().map(|e| e.to_string());

    let entries: Vec<ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigEntry::new(key, value, source))
        .collect();

    if output.is_json() {
        return output.result(json!({
            "entries": entries,
            "valid": problem.is_none(),
            "problem": problem,
        }));
    }

    output.section("Configuration");
    output.table(entries);

    match problem {
        None => output.success(format!(
            "Configuration is complete for the {} backend",
            config.backend.value
        )),
        Some(problem) => output.warning(problem),
    }

    Ok(())
}
