use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use super::jitter::JitterSeed;
use crate::numeric::powi;
use crate::types::{Money, Rate};

/// How the unit energy price evolves over the asset's life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TariffMode {
    /// Geometric escalation from the base price
    #[default]
    Escalated,
    /// Explicit price per year, escalating from the last entry afterwards
    Manual,
    /// Escalated trend with a sinusoidal swing
    Cyclical,
}

impl TariffMode {
    pub fn label(self) -> &'static str {
        match self {
            TariffMode::Escalated => "escalated",
            TariffMode::Manual => "manual",
            TariffMode::Cyclical => "cyclical",
        }
    }
}

/// Everything the projector needs to price a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffParams {
    /// Unit price in year 1 (and the year-0 reference)
    pub base: Money,
    /// Annual escalation (decimal)
    pub escalation: Rate,
    pub mode: TariffMode,
    /// Year-1-first price list for `Manual` mode
    pub manual_prices: Vec<Money>,
    /// Swing amplitude for `Cyclical` mode and jitter magnitude
    pub volatility: Rate,
    /// Period of the cyclical swing, in years
    pub cycle_years: u32,
}

fn escalate(base: Money, escalation: Rate, periods: u32) -> Money {
    base * powi(Decimal::ONE + escalation, periods)
}

/// Unit energy price for `year`.
///
/// Year 0 is always the unmodified base. When `jitter` is given, every
/// model-derived price is scaled by the scenario's deterministic jitter
/// factor; verbatim manual entries are left alone. Prices never go below 0.
pub fn tariff_for_year(year: u32, params: &TariffParams, jitter: Option<&JitterSeed>) -> Money {
    if year == 0 {
        return params.base;
    }

    let trend = escalate(params.base, params.escalation, year - 1);

    let (price, model_derived) = match params.mode {
        TariffMode::Escalated => (trend, true),
        TariffMode::Manual => {
            let listed = params.manual_prices.len() as u32;
            match params.manual_prices.get((year - 1) as usize) {
                Some(p) => (*p, false),
                None => match params.manual_prices.last() {
                    Some(last) => (escalate(*last, params.escalation, year - listed), true),
                    None => (trend, true),
                },
            }
        }
        TariffMode::Cyclical => {
            let cycle = params.cycle_years.max(1);
            let phase = Decimal::TWO_PI * Decimal::from((year - 1) % cycle) / Decimal::from(cycle);
            (trend * (Decimal::ONE + params.volatility * phase.sin()), true)
        }
    };

    let price = match jitter {
        Some(seed) if model_derived => price * seed.factor(year, params.volatility),
        _ => price,
    };

    price.max(Decimal::ZERO)
}

/// Prices for years `0..=lifetime`.
pub fn tariff_path(params: &TariffParams, lifetime: u32, jitter: Option<&JitterSeed>) -> Vec<Money> {
    (0..=lifetime)
        .map(|year| tariff_for_year(year, params, jitter))
        .collect()
}
