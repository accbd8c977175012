use serde::{Deserialize, Serialize};

/// Aggregate progress and P&L of the plan at one live price.
///
/// All monetary values are raw EUR numbers; formatting belongs to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Number of completed purchases
    pub completed_count: usize,

    /// Number of purchases in the plan
    pub total_count: usize,

    /// Sum of `btc_amount` over completed purchases
    pub total_btc_accumulated: f64,

    /// BTC goal the progress is measured against
    pub total_goal_btc: f64,

    /// total_btc_accumulated / total_goal_btc × 100 (not clamped)
    pub progress_percentage: f64,

    /// Sum of actual (or estimated) cost over completed purchases
    pub total_spent_eur: f64,

    /// total_btc_accumulated × live EUR price (0 without a live price)
    pub current_value_eur: f64,

    /// current_value_eur − total_spent_eur
    pub pnl_eur: f64,

    /// pnl_eur / total_spent_eur × 100 (0 when nothing was spent)
    pub pnl_percent: f64,

    /// total_spent_eur / total_btc_accumulated (0 when nothing was accumulated)
    pub average_buy_price_eur: f64,
}

impl PortfolioMetrics {
    pub fn is_profitable(&self) -> bool {
        self.pnl_eur >= 0.0
    }

    /// BTC still missing to reach the goal (never negative).
    pub fn remaining_btc(&self) -> f64 {
        (self.total_goal_btc - self.total_btc_accumulated).max(0.0)
    }
}
