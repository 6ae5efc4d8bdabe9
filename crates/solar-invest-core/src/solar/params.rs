use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::incentives::{
    IncentiveRates, IncentiveScheme, DEDUCTION_YEARS_MAX, DUTY_RATE_MAX, INCOME_TAX_RATE_MAX,
    VAT_RATE_MAX,
};
use super::tariff::{TariffMode, TariffParams};
use crate::error::SolarInvestError;
use crate::numeric::{clamp, clamp_int};
use crate::types::{Kwh, Money, Rate};
use crate::SolarInvestResult;

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

pub const POWER_KW_MAX: Decimal = dec!(100_000);
pub const PEAK_SUN_HOURS_MAX: Decimal = dec!(8);
pub const DEGRADATION_MAX: Rate = dec!(0.05);
pub const LIFETIME_MIN: u32 = 1;
pub const LIFETIME_MAX: u32 = 30;
pub const DISCOUNT_RATE_MIN: Rate = dec!(0.0001);
pub const DISCOUNT_RATE_MAX: Rate = dec!(0.8);
pub const ESCALATION_MIN: Rate = dec!(-0.2);
pub const ESCALATION_MAX: Rate = dec!(0.8);
pub const VOLATILITY_MAX: Rate = dec!(0.5);
pub const CYCLE_YEARS_MIN: u32 = 2;
pub const CYCLE_YEARS_MAX: u32 = 10;
/// Ceiling for capex, opex and taxable income. Keeps every ledger product
/// inside the decimal range.
pub const MONEY_MAX: Money = dec!(1_000_000_000_000_000);
/// Ceiling for unit prices, including manual ones.
pub const TARIFF_MAX: Money = dec!(1_000_000_000);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Full set of assumptions for one scenario.
///
/// Omitted fields take the reference defaults; unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioParameters {
    /// Display label
    pub name: String,
    /// Rated array power (kW)
    pub power_kw: Decimal,
    /// Peak sun hours per day (0–8)
    pub peak_sun_hours: Decimal,
    /// Performance ratio (0–1)
    pub performance_ratio: Rate,
    /// Annual output degradation (0–0.05)
    pub degradation_rate: Rate,
    /// Asset lifetime in years (1–30)
    pub lifetime_years: u32,
    /// Gross capital cost before incentives
    pub capex: Money,
    /// Year-1 operating and maintenance cost
    pub opex: Money,
    /// Discount rate for NPV, in (0, 0.8]
    pub discount_rate: Rate,
    /// Base unit energy price
    pub tariff: Money,
    /// Annual tariff escalation, [-0.2, 0.8]
    pub tariff_escalation: Rate,
    pub tariff_mode: TariffMode,
    /// Price per year from year 1, used in `manual` mode
    pub manual_prices: Vec<Money>,
    /// Cyclical swing / jitter amplitude (0–0.5)
    pub volatility: Rate,
    /// Cyclical period in years (2–10)
    pub cycle_years: u32,
    /// Share of generation used on site (0–1)
    pub self_consumption: Rate,
    /// Export price as a share of the tariff (0–1)
    pub export_price_factor: Rate,
    pub incentive_scheme: IncentiveScheme,
    pub vat_rate: Rate,
    pub duty_rate: Rate,
    pub income_tax_rate: Rate,
    pub deduction_years: u32,
    /// Taxable income per year; absent means deductions are not income-capped
    pub annual_taxable_income: Option<Money>,
}

impl Default for ScenarioParameters {
    fn default() -> Self {
        Self {
            name: "Scenario".to_string(),
            power_kw: dec!(6),
            peak_sun_hours: dec!(4.2),
            performance_ratio: dec!(0.78),
            degradation_rate: dec!(0.007),
            lifetime_years: 25,
            capex: dec!(22_000_000),
            opex: dec!(420_000),
            discount_rate: dec!(0.13),
            tariff: dec!(850),
            tariff_escalation: dec!(0.03),
            tariff_mode: TariffMode::Escalated,
            manual_prices: Vec::new(),
            volatility: Decimal::ZERO,
            cycle_years: 4,
            self_consumption: Decimal::ONE,
            export_price_factor: dec!(0.5),
            incentive_scheme: IncentiveScheme::None,
            vat_rate: dec!(0.19),
            duty_rate: dec!(0.05),
            income_tax_rate: dec!(0.35),
            deduction_years: 15,
            annual_taxable_income: None,
        }
    }
}

/// Switches applied to every scenario in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalToggles {
    pub include_tax_benefit: bool,
    pub use_volatility: bool,
    pub include_exports: bool,
}

impl Default for GlobalToggles {
    fn default() -> Self {
        Self {
            include_tax_benefit: true,
            use_volatility: false,
            include_exports: true,
        }
    }
}

/// One of the [`GlobalToggles`] switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    IncludeTaxBenefit,
    UseVolatility,
    IncludeExports,
}

impl GlobalToggles {
    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::IncludeTaxBenefit => self.include_tax_benefit,
            Toggle::UseVolatility => self.use_volatility,
            Toggle::IncludeExports => self.include_exports,
        }
    }

    /// Copy with a single switch set.
    pub fn with(mut self, toggle: Toggle, value: bool) -> Self {
        match toggle {
            Toggle::IncludeTaxBenefit => self.include_tax_benefit = value,
            Toggle::UseVolatility => self.use_volatility = value,
            Toggle::IncludeExports => self.include_exports = value,
        }
        self
    }
}

/// A field that had to be replaced or clamped during sanitisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClampAdjustment {
    pub field: String,
    pub original: Decimal,
    pub applied: Decimal,
    pub min: Decimal,
    pub max: Decimal,
}

struct Sanitizer {
    adjustments: Vec<ClampAdjustment>,
}

impl Sanitizer {
    fn real(&mut self, field: &str, value: Decimal, min: Decimal, max: Decimal) -> Decimal {
        let applied = clamp(value, min, max);
        if applied != value {
            self.adjustments.push(ClampAdjustment {
                field: field.to_string(),
                original: value,
                applied,
                min,
                max,
            });
        }
        applied
    }

    fn int(&mut self, field: &str, value: u32, min: u32, max: u32) -> u32 {
        let applied = clamp_int(value, min, max);
        if applied != value {
            self.adjustments.push(ClampAdjustment {
                field: field.to_string(),
                original: Decimal::from(value),
                applied: Decimal::from(applied),
                min: Decimal::from(min),
                max: Decimal::from(max),
            });
        }
        applied
    }
}

impl ScenarioParameters {
    /// Copy with every field forced into its allowed range, plus a record of
    /// what changed.
    pub fn sanitize(&self) -> (ScenarioParameters, Vec<ClampAdjustment>) {
        let zero = Decimal::ZERO;
        let mut s = Sanitizer {
            adjustments: Vec::new(),
        };

        let manual_prices = self
            .manual_prices
            .iter()
            .enumerate()
            .map(|(i, p)| s.real(&format!("manual_prices[{i}]"), *p, zero, TARIFF_MAX))
            .collect();

        let annual_taxable_income = self
            .annual_taxable_income
            .map(|v| s.real("annual_taxable_income", v, zero, MONEY_MAX));

        let out = ScenarioParameters {
            name: self.name.clone(),
            power_kw: s.real("power_kw", self.power_kw, zero, POWER_KW_MAX),
            peak_sun_hours: s.real(
                "peak_sun_hours",
                self.peak_sun_hours,
                zero,
                PEAK_SUN_HOURS_MAX,
            ),
            performance_ratio: s.real(
                "performance_ratio",
                self.performance_ratio,
                zero,
                Decimal::ONE,
            ),
            degradation_rate: s.real(
                "degradation_rate",
                self.degradation_rate,
                zero,
                DEGRADATION_MAX,
            ),
            lifetime_years: s.int("lifetime_years", self.lifetime_years, LIFETIME_MIN, LIFETIME_MAX),
            capex: s.real("capex", self.capex, zero, MONEY_MAX),
            opex: s.real("opex", self.opex, zero, MONEY_MAX),
            discount_rate: s.real(
                "discount_rate",
                self.discount_rate,
                DISCOUNT_RATE_MIN,
                DISCOUNT_RATE_MAX,
            ),
            tariff: s.real("tariff", self.tariff, zero, TARIFF_MAX),
            tariff_escalation: s.real(
                "tariff_escalation",
                self.tariff_escalation,
                ESCALATION_MIN,
                ESCALATION_MAX,
            ),
            tariff_mode: self.tariff_mode,
            manual_prices,
            volatility: s.real("volatility", self.volatility, zero, VOLATILITY_MAX),
            cycle_years: s.int("cycle_years", self.cycle_years, CYCLE_YEARS_MIN, CYCLE_YEARS_MAX),
            self_consumption: s.real(
                "self_consumption",
                self.self_consumption,
                zero,
                Decimal::ONE,
            ),
            export_price_factor: s.real(
                "export_price_factor",
                self.export_price_factor,
                zero,
                Decimal::ONE,
            ),
            incentive_scheme: self.incentive_scheme,
            vat_rate: s.real("vat_rate", self.vat_rate, zero, VAT_RATE_MAX),
            duty_rate: s.real("duty_rate", self.duty_rate, zero, DUTY_RATE_MAX),
            income_tax_rate: s.real(
                "income_tax_rate",
                self.income_tax_rate,
                zero,
                INCOME_TAX_RATE_MAX,
            ),
            deduction_years: s.int(
                "deduction_years",
                self.deduction_years,
                1,
                DEDUCTION_YEARS_MAX,
            ),
            annual_taxable_income,
        };

        if !s.adjustments.is_empty() {
            let fields: Vec<&str> = s.adjustments.iter().map(|a| a.field.as_str()).collect();
            warn!(scenario = %self.name, ?fields, "scenario inputs clamped into range");
        }

        (out, s.adjustments)
    }

    /// Copy with every field forced into its allowed range.
    pub fn sanitized(&self) -> ScenarioParameters {
        self.sanitize().0
    }

    /// Reject, rather than clamp, anything out of range.
    ///
    /// The engine never needs this; it is for callers that want to surface
    /// bad input instead of silently correcting it.
    pub fn validate_strict(&self) -> SolarInvestResult<()> {
        let (_, adjustments) = self.sanitize();
        match adjustments.first() {
            None => Ok(()),
            Some(a) => Err(SolarInvestError::InvalidInput {
                field: a.field.clone(),
                reason: format!("{} is outside [{}, {}]", a.original, a.min, a.max),
            }),
        }
    }

    pub fn tariff_params(&self) -> TariffParams {
        TariffParams {
            base: self.tariff,
            escalation: self.tariff_escalation,
            mode: self.tariff_mode,
            manual_prices: self.manual_prices.clone(),
            volatility: self.volatility,
            cycle_years: self.cycle_years,
        }
    }

    pub fn incentive_rates(&self) -> IncentiveRates {
        IncentiveRates {
            vat_rate: self.vat_rate,
            duty_rate: self.duty_rate,
            income_tax_rate: self.income_tax_rate,
            deduction_years: self.deduction_years,
            annual_taxable_income: self.annual_taxable_income,
            lifetime_years: Some(self.lifetime_years),
        }
    }

    /// Year-1 generation before degradation (kWh).
    pub fn base_annual_energy(&self) -> Kwh {
        self.power_kw * self.peak_sun_hours * dec!(365) * self.performance_ratio
    }
}
