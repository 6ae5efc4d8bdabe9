pub mod compare;
pub mod evaluate;
pub mod ledger;
pub mod sensitivity;
pub mod tariff;

use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use solar_invest_core::numeric::{coerce_number, coerce_rate};
use solar_invest_core::solar::incentives::IncentiveScheme;
use solar_invest_core::solar::params::{GlobalToggles, ScenarioParameters};
use solar_invest_core::solar::tariff::TariffMode;

use crate::input;

/// Flags that override fields of a single scenario.
#[derive(Args, Debug, Default)]
pub struct ScenarioFlags {
    /// Path to a JSON or YAML scenario file (fields omitted take defaults)
    #[arg(long)]
    pub input: Option<String>,

    /// Display label, also the jitter seed tag
    #[arg(long)]
    pub name: Option<String>,

    /// Rated array power in kW
    #[arg(long)]
    pub power_kw: Option<String>,

    /// Peak sun hours per day
    #[arg(long)]
    pub peak_sun_hours: Option<String>,

    /// Asset lifetime in years
    #[arg(long)]
    pub lifetime: Option<u32>,

    /// Gross capital cost before incentives
    #[arg(long)]
    pub capex: Option<String>,

    /// Year-1 operating cost
    #[arg(long)]
    pub opex: Option<String>,

    /// Discount rate, as a decimal or with a trailing % (e.g. 13%)
    #[arg(long)]
    pub discount_rate: Option<String>,

    /// Base unit energy price
    #[arg(long)]
    pub tariff: Option<String>,

    /// Annual tariff escalation, as a decimal or percentage
    #[arg(long, allow_hyphen_values = true)]
    pub escalation: Option<String>,

    /// Tariff projection mode
    #[arg(long, value_enum)]
    pub tariff_mode: Option<TariffModeArg>,

    /// Manual price list from year 1 (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub manual_prices: Option<Vec<Decimal>>,

    /// Share of generation used on site (0-1 or %)
    #[arg(long)]
    pub self_consumption: Option<String>,

    /// Incentive scheme
    #[arg(long, value_enum)]
    pub scheme: Option<SchemeArg>,
}

/// Switches shared by every scenario in a run.
#[derive(Args, Debug, Default)]
pub struct ToggleFlags {
    /// Leave the income tax deduction out of the cash flows
    #[arg(long)]
    pub no_tax_benefit: bool,

    /// Apply reproducible price jitter
    #[arg(long)]
    pub volatility: bool,

    /// Do not credit exported energy
    #[arg(long)]
    pub no_exports: bool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum TariffModeArg {
    Escalated,
    Manual,
    Cyclical,
}

impl From<TariffModeArg> for TariffMode {
    fn from(m: TariffModeArg) -> Self {
        match m {
            TariffModeArg::Escalated => TariffMode::Escalated,
            TariffModeArg::Manual => TariffMode::Manual,
            TariffModeArg::Cyclical => TariffMode::Cyclical,
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum SchemeArg {
    None,
    VatExclusion,
    DutyExemption,
    IncomeTaxDeduction,
    VatAndDuty,
    VatAndDeduction,
    Full,
}

impl From<SchemeArg> for IncentiveScheme {
    fn from(s: SchemeArg) -> Self {
        match s {
            SchemeArg::None => IncentiveScheme::None,
            SchemeArg::VatExclusion => IncentiveScheme::VatExclusion,
            SchemeArg::DutyExemption => IncentiveScheme::DutyExemption,
            SchemeArg::IncomeTaxDeduction => IncentiveScheme::IncomeTaxDeduction,
            SchemeArg::VatAndDuty => IncentiveScheme::VatAndDuty,
            SchemeArg::VatAndDeduction => IncentiveScheme::VatAndDeduction,
            SchemeArg::Full => IncentiveScheme::Full,
        }
    }
}

impl ScenarioFlags {
    /// Overlay the flags that were given onto `params`.
    ///
    /// Free-text numbers go through the same coercion as form input: bad
    /// text keeps the current value.
    pub fn apply(&self, mut params: ScenarioParameters) -> ScenarioParameters {
        if let Some(name) = &self.name {
            params.name = name.clone();
        }
        if let Some(v) = &self.power_kw {
            params.power_kw = coerce_number(v, params.power_kw);
        }
        if let Some(v) = &self.peak_sun_hours {
            params.peak_sun_hours = coerce_number(v, params.peak_sun_hours);
        }
        if let Some(v) = self.lifetime {
            params.lifetime_years = v;
        }
        if let Some(v) = &self.capex {
            params.capex = coerce_number(v, params.capex);
        }
        if let Some(v) = &self.opex {
            params.opex = coerce_number(v, params.opex);
        }
        if let Some(v) = &self.discount_rate {
            params.discount_rate = coerce_rate(v, params.discount_rate);
        }
        if let Some(v) = &self.tariff {
            params.tariff = coerce_number(v, params.tariff);
        }
        if let Some(v) = &self.escalation {
            params.tariff_escalation = coerce_rate(v, params.tariff_escalation);
        }
        if let Some(m) = self.tariff_mode {
            params.tariff_mode = m.into();
        }
        if let Some(prices) = &self.manual_prices {
            params.manual_prices = prices.clone();
        }
        if let Some(v) = &self.self_consumption {
            params.self_consumption = coerce_rate(v, params.self_consumption);
        }
        if let Some(s) = self.scheme {
            params.incentive_scheme = s.into();
        }
        params
    }

    /// Scenario from `--input`, else piped stdin, else the reference
    /// defaults; flags applied last.
    pub fn load(&self) -> Result<ScenarioParameters, Box<dyn std::error::Error>> {
        let base: ScenarioParameters = if let Some(ref path) = self.input {
            input::file::read_document(path)?
        } else if let Some(data) = input::stdin::read_stdin()? {
            serde_json::from_value(data)?
        } else {
            debug!("no scenario input given; using reference defaults");
            ScenarioParameters::default()
        };
        Ok(self.apply(base))
    }
}

impl ToggleFlags {
    /// Flags only ever move a toggle away from its default.
    pub fn apply(&self, mut toggles: GlobalToggles) -> GlobalToggles {
        if self.no_tax_benefit {
            toggles.include_tax_benefit = false;
        }
        if self.volatility {
            toggles.use_volatility = true;
        }
        if self.no_exports {
            toggles.include_exports = false;
        }
        toggles
    }
}

/// Serialize any command output into the generic value the formatters take.
pub fn to_value<T: serde::Serialize>(output: T) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(output)?)
}
