//! Reproducible price jitter.
//!
//! Each (scenario, year) pair maps to a fixed ChaCha8 stream, so the same
//! inputs always produce the same "volatile" tariff path.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tariff::TariffParams;
use crate::numeric::from_f64;
use crate::types::Rate;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a, used only to fold the scenario fingerprint into a seed.
#[derive(Debug, Clone, Copy)]
struct Fnv1a(u64);

impl Fnv1a {
    fn new() -> Self {
        Fnv1a(FNV_OFFSET_BASIS)
    }

    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 ^= u64::from(*b);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }

    /// Equal values hash alike regardless of scale (`1.50` and `1.5`).
    fn write_decimal(&mut self, v: Decimal) {
        self.write(&v.normalize().serialize());
    }

    fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }
}

/// Fingerprint of a scenario's tag and tariff assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JitterSeed(u64);

impl JitterSeed {
    pub fn new(tag: &str, params: &TariffParams) -> Self {
        let mut h = Fnv1a::new();
        h.write(tag.as_bytes());
        h.write(&[params.mode as u8]);
        h.write_decimal(params.base);
        h.write_decimal(params.escalation);
        h.write_decimal(params.volatility);
        h.write_u32(params.cycle_years);
        for p in &params.manual_prices {
            h.write_decimal(*p);
        }
        JitterSeed(h.0)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Uniform draw in `[-1, 1)` for `year`.
    pub fn unit_draw(&self, year: u32) -> f64 {
        let mut h = Fnv1a(self.0);
        h.write_u32(year);
        let mut rng = ChaCha8Rng::seed_from_u64(h.0);
        rng.gen_range(-1.0..1.0)
    }

    /// Multiplicative price factor `1 + volatility × u`.
    pub fn factor(&self, year: u32, volatility: Rate) -> Decimal {
        Decimal::ONE + volatility * from_f64(self.unit_draw(year), Decimal::ZERO)
    }
}
