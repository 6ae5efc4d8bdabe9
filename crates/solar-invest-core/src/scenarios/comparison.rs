use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::evaluate::{ScenarioKey, ScenarioResult};
use crate::types::{Money, Rate};

/// Cumulative cash flow of every scenario in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPoint {
    pub year: u32,
    pub cumulative: BTreeMap<ScenarioKey, Money>,
}

/// Headline metrics for one scenario, in comparison order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub key: ScenarioKey,
    pub name: String,
    pub net_capex: Money,
    pub npv: Money,
    pub irr: Option<Rate>,
    pub payback_year: Option<u32>,
    pub first_year_return: Option<Rate>,
}

/// Per-year cumulative series spanning the longest lifetime present.
///
/// A scenario whose lifetime ends earlier repeats its final cumulative value
/// for the remaining years.
pub fn comparison_series(results: &BTreeMap<ScenarioKey, ScenarioResult>) -> Vec<ComparisonPoint> {
    let rows = results.values().map(|r| r.ledger.len()).max().unwrap_or(0);

    (0..rows)
        .map(|idx| ComparisonPoint {
            year: idx as u32,
            cumulative: results
                .iter()
                .filter_map(|(key, result)| {
                    result
                        .ledger
                        .get(idx)
                        .or_else(|| result.ledger.last())
                        .map(|row| (*key, row.cumulative_cash_flow))
                })
                .collect(),
        })
        .collect()
}

pub fn headline_rows(results: &BTreeMap<ScenarioKey, ScenarioResult>) -> Vec<Headline> {
    results
        .iter()
        .map(|(key, r)| Headline {
            key: *key,
            name: r.name.clone(),
            net_capex: r.net_capex,
            npv: r.npv,
            irr: r.irr,
            payback_year: r.payback_year,
            first_year_return: r.first_year_return,
        })
        .collect()
}

/// Scenario with the highest NPV; ties go to the earlier key.
pub fn best_by_npv(results: &BTreeMap<ScenarioKey, ScenarioResult>) -> Option<ScenarioKey> {
    results
        .iter()
        .fold(None::<(ScenarioKey, Money)>, |best, (key, r)| match best {
            Some((_, npv)) if npv >= r.npv => best,
            _ => Some((*key, r.npv)),
        })
        .map(|(key, _)| key)
}
