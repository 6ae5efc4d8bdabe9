use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

use solar_invest_core::scenarios::evaluate::ScenarioKey;
use solar_invest_core::solar::params::{GlobalToggles, ScenarioParameters};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// `{ "scenario": {...}, "toggles": {...} }`; both parts optional.
#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct SingleInput {
    scenario: ScenarioParameters,
    toggles: GlobalToggles,
}

/// `{ "scenarios": { "A": {...}, ... }, "toggles": {...} }`
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BatchInput {
    scenarios: BTreeMap<ScenarioKey, ScenarioParameters>,
    #[serde(default)]
    toggles: GlobalToggles,
}

fn parse_single(input_json: &str) -> NapiResult<SingleInput> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_scenario(input_json: String) -> NapiResult<String> {
    let input = parse_single(&input_json)?;
    let output =
        solar_invest_core::scenarios::evaluate::run_scenario(&input.scenario, &input.toggles);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn evaluate_scenarios(input_json: String) -> NapiResult<String> {
    let input: BatchInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        solar_invest_core::scenarios::evaluate::evaluate_all(&input.scenarios, &input.toggles);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_ledger(input_json: String) -> NapiResult<String> {
    let input = parse_single(&input_json)?;
    let output =
        solar_invest_core::scenarios::evaluate::run_ledger(&input.scenario, &input.toggles);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn project_tariff(input_json: String) -> NapiResult<String> {
    let input = parse_single(&input_json)?;
    let output =
        solar_invest_core::scenarios::evaluate::run_tariff_path(&input.scenario, &input.toggles);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn export_sensitivity(input_json: String) -> NapiResult<String> {
    use solar_invest_core::scenarios::sensitivity;

    let input = parse_single(&input_json)?;
    let delta = sensitivity::export_sensitivity(&input.scenario, &input.toggles);
    let mut value = serde_json::to_value(&delta).map_err(to_napi_error)?;
    if let Some(map) = value.as_object_mut() {
        map.insert(
            "narrative".to_string(),
            serde_json::Value::String(sensitivity::sensitivity_narrative(&delta)),
        );
    }
    serde_json::to_string(&value).map_err(to_napi_error)
}

#[napi]
pub fn toggle_sensitivities(input_json: String) -> NapiResult<String> {
    let input = parse_single(&input_json)?;
    let output =
        solar_invest_core::scenarios::sensitivity::run_sensitivity(&input.scenario, &input.toggles);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

// JS numbers cross as f64; NaN, infinities and out-of-range values print "n/a".

#[napi]
pub fn format_pct(ratio: f64, decimals: u32) -> String {
    match Decimal::from_f64(ratio) {
        Some(r) => solar_invest_core::numeric::format_pct(r, decimals),
        None => "n/a".to_string(),
    }
}

#[napi]
pub fn format_compact(value: f64) -> String {
    match Decimal::from_f64(value) {
        Some(v) => solar_invest_core::numeric::format_compact(v),
        None => "n/a".to_string(),
    }
}
