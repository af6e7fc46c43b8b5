//! Decimal precision context
//!
//! Money is compared for "effectively zero" or "effectively equal" by rounding
//! both sides to a fixed number of fractional digits first. The rounding rule
//! lives in a `DecimalContext` value that is passed explicitly to whatever
//! needs it, so two simulations in one process never share precision state.
//!
//! Arithmetic itself is exact base-10 (`rust_decimal`, 28 significant digits).

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

fn default_scale() -> u32 {
    2
}

/// Rounding rule applied when quantizing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rounding {
    /// Ties round away from zero (0.005 -> 0.01)
    #[default]
    HalfUp,
    /// Ties round to the even neighbour (banker's rounding)
    HalfEven,
    /// Truncate
    TowardZero,
}

impl Rounding {
    fn strategy(self) -> RoundingStrategy {
        match self {
            Rounding::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Rounding::HalfEven => RoundingStrategy::MidpointNearestEven,
            Rounding::TowardZero => RoundingStrategy::ToZero,
        }
    }
}

/// Quantization settings for monetary comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecimalContext {
    /// Number of fractional digits kept when quantizing
    #[serde(default = "default_scale")]
    pub scale: u32,
    #[serde(default)]
    pub rounding: Rounding,
}

impl Default for DecimalContext {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            rounding: Rounding::default(),
        }
    }
}

impl DecimalContext {
    #[must_use]
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn quantize(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.scale, self.rounding.strategy())
    }

    pub fn quantized_eq(&self, a: Decimal, b: Decimal) -> bool {
        self.quantize(a) == self.quantize(b)
    }

    pub fn is_zero(&self, value: Decimal) -> bool {
        self.quantize(value).is_zero()
    }
}
