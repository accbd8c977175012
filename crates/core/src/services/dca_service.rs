use chrono::{Datelike, Months, NaiveDate};

use crate::models::projections::DcaMonth;
use crate::models::settings::DcaSettings;
use crate::numeric::{clamp_percent, finite_or};

/// Months covered by one allocation.
const MONTHS: usize = 12;

/// Amplitude of the monthly wave at full volatility weight.
const WAVE_AMPLITUDE: f64 = 0.6;

/// No month gets less than this weight.
const MIN_WEIGHT: f64 = 0.2;

/// Spreads an annual euro budget over the next twelve months with a
/// sinusoidal weighting.
pub struct DcaService;

impl DcaService {
    pub fn new() -> Self {
        Self
    }

    /// Allocate the budget over 12 months starting at the month of `from`.
    ///
    /// weight(i) = max(0.2, 1 + sin(2π·i/12) × 0.6 × strength), where
    /// strength is the volatility weight in [0, 1]. Shares always sum to 1.
    /// A non-finite or negative budget allocates 0.
    pub fn allocate(&self, settings: &DcaSettings, from: NaiveDate) -> Vec<DcaMonth> {
        let budget = finite_or(settings.annual_budget_eur, 0.0).max(0.0);
        let strength = clamp_percent(settings.volatility_weight) / 100.0;

        let weights: Vec<f64> = (0..MONTHS)
            .map(|i| {
                let wave = (i as f64 / MONTHS as f64 * std::f64::consts::TAU).sin();
                (1.0 + wave * WAVE_AMPLITUDE * strength).max(MIN_WEIGHT)
            })
            .collect();
        let total_weight: f64 = weights.iter().sum();

        let first_month = from.with_day(1).unwrap_or(from);
        weights
            .iter()
            .enumerate()
            .map(|(index, weight)| {
                let share = if total_weight > 0.0 {
                    weight / total_weight
                } else {
                    1.0 / MONTHS as f64
                };
                let month = first_month
                    .checked_add_months(Months::new(index as u32))
                    .unwrap_or(first_month);
                DcaMonth {
                    index,
                    month,
                    share,
                    amount_eur: budget * share,
                }
            })
            .collect()
    }
}

impl Default for DcaService {
    fn default() -> Self {
        Self::new()
    }
}
