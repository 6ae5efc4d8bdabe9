use clap::Args;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use solar_invest_core::scenarios::evaluate::{evaluate_all, ScenarioKey};
use solar_invest_core::solar::params::{GlobalToggles, ScenarioParameters};

use super::{to_value, ToggleFlags};
use crate::input;

/// Arguments for the A/B/C comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Path to a JSON or YAML batch file:
    /// { "scenarios": { "A": {...}, "B": {...} }, "toggles": {...} }
    #[arg(long)]
    pub input: Option<String>,

    /// Scenario keys to run (default: every key in the file)
    #[arg(long, value_delimiter = ',')]
    pub only: Option<Vec<ScenarioKey>>,

    #[command(flatten)]
    pub toggles: ToggleFlags,
}

/// Batch file layout.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BatchInput {
    scenarios: BTreeMap<ScenarioKey, ScenarioParameters>,
    #[serde(default)]
    toggles: GlobalToggles,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let batch: BatchInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <batch.json|batch.yaml> or stdin required for compare".into());
    };

    let mut scenarios = batch.scenarios;
    if let Some(only) = &args.only {
        scenarios.retain(|key, _| only.contains(key));
    }

    let toggles = args.toggles.apply(batch.toggles);
    to_value(evaluate_all(&scenarios, &toggles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_parses_with_default_toggles() {
        let batch: BatchInput = serde_json::from_str(
            r#"{"scenarios":{"A":{"name":"Base"},"C":{"capex":18000000}}}"#,
        )
        .unwrap();
        assert_eq!(batch.scenarios.len(), 2);
        assert!(batch.scenarios.contains_key(&ScenarioKey::C));
        assert_eq!(batch.toggles, GlobalToggles::default());
    }

    #[test]
    fn test_filtered_out_batch_gives_empty_comparison() {
        let path = std::env::temp_dir().join("solar_invest_compare_only.json");
        std::fs::write(&path, r#"{"scenarios":{"A":{"name":"Base"}}}"#).unwrap();

        let args = CompareArgs {
            input: Some(path.to_string_lossy().into_owned()),
            only: Some(vec![ScenarioKey::C]),
            toggles: ToggleFlags::default(),
        };
        let value = run_compare(args).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(value["result"]["results"], serde_json::json!({}));
        assert_eq!(value["result"]["comparison_series"], serde_json::json!([]));
        assert!(value["result"]["best_by_npv"].is_null());
    }

    #[test]
    fn test_batch_rejects_unknown_scenario_key() {
        let bad = serde_json::from_str::<BatchInput>(r#"{"scenarios":{"D":{}}}"#);
        assert!(bad.is_err());
    }
}
