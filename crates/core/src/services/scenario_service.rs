use crate::models::price::PriceSnapshot;
use crate::models::projections::{FutureProjection, ScenarioProjection};
use crate::models::settings::ScenarioSettings;
use crate::numeric::finite_or;

/// Lowest projected price accepted by the future simulator (USD).
pub const FUTURE_PRICE_MIN_USD: f64 = 50_000.0;

/// Highest projected price accepted by the future simulator (USD).
pub const FUTURE_PRICE_MAX_USD: f64 = 500_000.0;

/// What-if projections of the stack and the goal under a price multiplier
/// or a projected future price.
pub struct ScenarioService;

impl ScenarioService {
    pub fn new() -> Self {
        Self
    }

    /// Project current holdings and the goal at `live price × multiplier`.
    pub fn project(
        &self,
        total_btc: f64,
        live_price_eur: Option<f64>,
        target_btc: f64,
        settings: &ScenarioSettings,
    ) -> ScenarioProjection {
        let price_eur = finite_or(live_price_eur.unwrap_or(0.0), 0.0);
        let multiplier = finite_or(settings.multiplier, 0.0).max(0.0);
        let projected_price_eur = price_eur * multiplier;
        let projected_current_value_eur = finite_or(total_btc, 0.0) * projected_price_eur;
        let projected_target_value_eur = finite_or(target_btc, 0.0) * projected_price_eur;

        ScenarioProjection {
            multiplier,
            projected_price_eur,
            projected_current_value_eur,
            projected_target_value_eur,
            gap_eur: projected_target_value_eur - projected_current_value_eur,
        }
    }

    /// Value of the goal at a projected USD price, next to what the goal
    /// would cost at the live price.
    pub fn future(
        &self,
        projected_price_usd: f64,
        target_btc: f64,
        live: Option<&PriceSnapshot>,
    ) -> FutureProjection {
        let projected_price_usd = finite_or(projected_price_usd, FUTURE_PRICE_MIN_USD)
            .clamp(FUTURE_PRICE_MIN_USD, FUTURE_PRICE_MAX_USD);

        FutureProjection {
            projected_price_usd,
            target_stack_value_usd: target_btc * projected_price_usd,
            live_target_cost_usd: live
                .map(|s| s.price_usd)
                .filter(|p| p.is_finite() && *p > 0.0)
                .map(|p| target_btc * p),
            live_target_cost_eur: live
                .map(|s| s.price_eur)
                .filter(|p| p.is_finite() && *p > 0.0)
                .map(|p| target_btc * p),
        }
    }
}

impl Default for ScenarioService {
    fn default() -> Self {
        Self::new()
    }
}
