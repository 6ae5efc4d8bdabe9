//! Single-scenario projection: incentives, tariff path and the annual ledger.

pub mod incentives;
pub mod jitter;
pub mod ledger;
pub mod params;
pub mod tariff;

pub use incentives::{resolve_incentives, IncentiveResolution, IncentiveScheme};
pub use ledger::{build_ledger, AnnualLedgerRow};
pub use params::{GlobalToggles, ScenarioParameters, Toggle};
pub use tariff::{tariff_for_year, TariffMode};
