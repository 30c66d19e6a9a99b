//! Reduction factor applied to a container's aggregated contents

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Multiplier applied to the summed weight or volume of a container's children
/// when the container itself is weighed. 1.0 means no reduction.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ReductionFactor(f64);

impl ReductionFactor {
    pub const NONE: Self = Self(1.0);

    /// # Errors
    ///
    /// Returns `DomainError::Validation` for negative or non-finite factors.
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() || value < 0.0 {
            return Err(DomainError::validation(format!(
                "Reduction factor must be a finite non-negative number, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn apply(&self, amount: f64) -> f64 {
        amount * self.0
    }
}

impl Default for ReductionFactor {
    fn default() -> Self {
        Self::NONE
    }
}

impl TryFrom<f64> for ReductionFactor {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReductionFactor> for f64 {
    fn from(factor: ReductionFactor) -> f64 {
        factor.0
    }
}
