//! Multi-scenario evaluation, comparison and narrative.

pub mod comparison;
pub mod conclusions;
pub mod evaluate;
pub mod sensitivity;

pub use evaluate::{
    evaluate, evaluate_all, run_ledger, run_scenario, run_tariff_path, ScenarioKey, ScenarioResult,
};
pub use sensitivity::{export_sensitivity, run_sensitivity};
