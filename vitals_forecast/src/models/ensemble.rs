//! Equal-weight ensemble of forecasting methods

use crate::error::{ForecastError, Result};
use crate::models::ForecastMethod;
use std::collections::BTreeMap;

/// Combines member forecasts by their per-step arithmetic mean.
///
/// Every member carries the same weight; there is no accuracy-based
/// weighting.
#[derive(Debug, Clone, Default)]
pub struct EnsembleCombiner;

impl EnsembleCombiner {
    pub fn new() -> Self {
        Self
    }

    /// Average the available member forecasts step by step.
    ///
    /// Any subset of members may be present. Fails with
    /// [`ForecastError::NoMethodsAvailable`] when there are none.
    pub fn combine(&self, members: &BTreeMap<ForecastMethod, Vec<f64>>) -> Result<Vec<f64>> {
        let mut outputs = members.values();
        let Some(first) = outputs.next() else {
            return Err(ForecastError::NoMethodsAvailable);
        };
        let horizon = first.len();

        if let Some((method, values)) = members.iter().find(|(_, v)| v.len() != horizon) {
            return Err(ForecastError::InvalidParameter(format!(
                "{} forecast has {} values, expected {}",
                method,
                values.len(),
                horizon
            )));
        }

        let count = members.len() as f64;
        Ok((0..horizon)
            .map(|i| members.values().map(|v| v[i]).sum::<f64>() / count)
            .collect())
    }

    /// Average member fitted values over the history tail all members cover
    pub fn combine_fitted(&self, members: &[&[f64]]) -> Vec<f64> {
        let Some(common) = members.iter().map(|m| m.len()).min() else {
            return Vec::new();
        };
        let count = members.len() as f64;
        (0..common)
            .map(|j| {
                members
                    .iter()
                    .map(|m| m[m.len() - common + j])
                    .sum::<f64>()
                    / count
            })
            .collect()
    }
}
