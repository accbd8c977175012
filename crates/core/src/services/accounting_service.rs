use chrono::{DateTime, Utc};

use crate::errors::CoreError;
use crate::models::metrics::PortfolioMetrics;
use crate::models::purchase::{Fill, Purchase};
use crate::numeric::safe_div;

/// Derives progress and P&L from the purchase list and applies completion
/// toggles.
///
/// Pure business logic: the live price and the completion timestamp are
/// supplied by the caller on every call.
pub struct AccountingService;

impl AccountingService {
    pub fn new() -> Self {
        Self
    }

    /// Compute the aggregate metrics of a plan.
    ///
    /// `live_price_eur` is `None` while the feed has not resolved; a
    /// non-finite price is treated the same way. Values are then 0.
    pub fn compute_metrics(
        &self,
        purchases: &[Purchase],
        live_price_eur: Option<f64>,
        total_goal_btc: f64,
    ) -> PortfolioMetrics {
        let live = live_price_eur.filter(|p| p.is_finite()).unwrap_or(0.0);

        let mut completed_count = 0;
        let mut total_btc_accumulated = 0.0;
        let mut total_spent_eur = 0.0;
        for p in purchases.iter().filter(|p| p.completed) {
            completed_count += 1;
            total_btc_accumulated += p.btc_amount;
            total_spent_eur += p.cost_basis_eur();
        }

        let current_value_eur = total_btc_accumulated * live;
        let pnl_eur = current_value_eur - total_spent_eur;

        log::debug!(
            "Metrics: {completed_count}/{} completed, {total_btc_accumulated} BTC, P&L {pnl_eur:.2} EUR",
            purchases.len()
        );

        PortfolioMetrics {
            completed_count,
            total_count: purchases.len(),
            total_btc_accumulated,
            total_goal_btc,
            progress_percentage: safe_div(total_btc_accumulated, total_goal_btc) * 100.0,
            total_spent_eur,
            current_value_eur,
            pnl_eur,
            pnl_percent: safe_div(pnl_eur, total_spent_eur) * 100.0,
            average_buy_price_eur: safe_div(total_spent_eur, total_btc_accumulated),
        }
    }

    /// Flip the completion state of purchase `id`.
    ///
    /// - Pending → Completed: records `completed_at` and the fill. Without a
    ///   usable (finite) fill, the target price and estimated cost are
    ///   recorded instead.
    /// - Completed → Pending: clears all three fill fields.
    ///
    /// Returns a new list where only the matching purchase differs; the input
    /// is never modified. An unknown id yields `PurchaseNotFound`.
    pub fn toggle(
        &self,
        purchases: &[Purchase],
        id: u32,
        fill: Option<Fill>,
        at: DateTime<Utc>,
    ) -> Result<Vec<Purchase>, CoreError> {
        let idx = purchases
            .iter()
            .position(|p| p.id == id)
            .ok_or(CoreError::PurchaseNotFound(id))?;

        let mut updated = purchases.to_vec();
        let purchase = &mut updated[idx];
        if purchase.completed {
            purchase.completed = false;
            purchase.completed_at = None;
            purchase.actual_price = None;
            purchase.actual_cost_eur = None;
        } else {
            let fill = fill
                .filter(|f| f.price_usd.is_finite() && f.cost_eur.is_finite())
                .unwrap_or_else(|| Fill::at_target(purchase));
            purchase.completed = true;
            purchase.completed_at = Some(at);
            purchase.actual_price = Some(fill.price_usd);
            purchase.actual_cost_eur = Some(fill.cost_eur);
        }

        Ok(updated)
    }

    /// Completed purchases, in plan order.
    pub fn completed<'a>(&self, purchases: &'a [Purchase]) -> Vec<&'a Purchase> {
        purchases.iter().filter(|p| p.completed).collect()
    }
}

impl Default for AccountingService {
    fn default() -> Self {
        Self::new()
    }
}
