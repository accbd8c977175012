use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Tax ─────────────────────────────────────────────────────────────

/// Tax and fee breakdown of one completed purchase at the live price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRow {
    pub purchase_id: u32,
    pub completed_at: Option<DateTime<Utc>>,
    pub cost_eur: f64,
    pub current_value_eur: f64,
    pub pnl_eur: f64,
    pub tax_eur: f64,
    pub fee_eur: f64,
    /// pnl − tax − fee
    pub net_eur: f64,
}

/// Column sums of a tax report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxTotals {
    pub cost_eur: f64,
    pub current_value_eur: f64,
    pub pnl_eur: f64,
    pub tax_eur: f64,
    pub fee_eur: f64,
    pub net_eur: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxReport {
    /// Effective tax rate after normalization (%)
    pub tax_rate: f64,
    /// Effective fee rate after normalization (%)
    pub fee_rate: f64,
    pub rows: Vec<TaxRow>,
    pub totals: TaxTotals,
}

// ── DCA ─────────────────────────────────────────────────────────────

/// One month of the flexible DCA allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcaMonth {
    /// 0-based offset from the first month
    pub index: usize,
    /// First day of the month
    pub month: NaiveDate,
    /// Fraction of the annual budget (all shares sum to 1)
    pub share: f64,
    pub amount_eur: f64,
}

// ── Scenario / Future simulator ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub multiplier: f64,
    pub projected_price_eur: f64,
    /// Value of the BTC already accumulated at the projected price
    pub projected_current_value_eur: f64,
    /// Value of the full goal at the projected price
    pub projected_target_value_eur: f64,
    /// projected_target_value_eur − projected_current_value_eur
    pub gap_eur: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureProjection {
    pub projected_price_usd: f64,
    /// Goal value at the projected price (USD)
    pub target_stack_value_usd: f64,
    /// Cost of the goal at the live USD price
    pub live_target_cost_usd: Option<f64>,
    /// Cost of the goal at the live EUR price
    pub live_target_cost_eur: Option<f64>,
}

// ── Alerts ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStatus {
    pub price_triggered: bool,
    pub date_triggered: bool,
}

impl AlertStatus {
    pub fn any(&self) -> bool {
        self.price_triggered || self.date_triggered
    }
}

// ── Monthly activity ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthStatus {
    /// Every purchase in the month is completed
    Completed,
    /// Some purchases in the month are completed
    Partial,
    /// No purchase in the month is completed
    Future,
}

/// Purchases grouped by the calendar month of their estimated date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyActivity {
    /// `YYYY-MM`
    pub key: String,
    pub year: i32,
    pub month: u32,
    pub total_cost_eur: f64,
    pub btc_amount: f64,
    pub count: usize,
    pub completed_count: usize,
    pub status: MonthStatus,
    pub purchase_ids: Vec<u32>,
}

// ── Countdowns ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalvingCountdown {
    pub years: i64,
    pub days: i64,
    pub hours: i64,
}

// ── Market sentiment ────────────────────────────────────────────────

/// Fear & Greed index bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl Sentiment {
    /// Classify a 0–100 index value.
    pub fn from_index(value: u8) -> Self {
        match value {
            75.. => Sentiment::ExtremeGreed,
            55..=74 => Sentiment::Greed,
            45..=54 => Sentiment::Neutral,
            25..=44 => Sentiment::Fear,
            _ => Sentiment::ExtremeFear,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::ExtremeFear => write!(f, "Extreme Fear"),
            Sentiment::Fear => write!(f, "Fear"),
            Sentiment::Neutral => write!(f, "Neutral"),
            Sentiment::Greed => write!(f, "Greed"),
            Sentiment::ExtremeGreed => write!(f, "Extreme Greed"),
        }
    }
}
