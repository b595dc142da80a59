//! Closed parameter ranges with uniform sampling

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SfxError, SfxResult};

/// Closed interval `[min, max]` a per-play parameter is drawn from
///
/// A degenerate range (`min == max`) is a fixed value and always samples
/// to exactly that value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    /// Create a range, rejecting non-finite bounds or span and `min > max`
    pub fn new(min: f32, max: f32) -> SfxResult<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Fixed value
    pub const fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Unity range (1.0), the default for volume and pitch
    pub const fn unity() -> Self {
        Self::fixed(1.0)
    }

    pub fn validate(&self) -> SfxResult<()> {
        if !self.min.is_finite()
            || !self.max.is_finite()
            || self.min > self.max
            || !self.span().is_finite()
        {
            return Err(SfxError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    #[inline]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Draw a value uniformly from the closed interval
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        // Unvalidated ranges deserialized from disk fall back to `min`
        if self.is_fixed() || self.validate().is_err() {
            return self.min;
        }
        let (min, max) = (f64::from(self.min), f64::from(self.max));
        let t: f64 = rng.random();
        ((min + t * (max - min)) as f32).clamp(self.min, self.max)
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::unity()
    }
}

impl From<(f32, f32)> for ValueRange {
    fn from((min, max): (f32, f32)) -> Self {
        Self { min, max }
    }
}
