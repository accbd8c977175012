use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time live BTC price, as delivered by the external feed.
///
/// The core never fetches this itself; callers pass the latest snapshot
/// (or `None` while the feed has not resolved) into every computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// BTC price in USD
    pub price_usd: f64,

    /// BTC price in EUR
    pub price_eur: f64,

    /// 24h change in percent
    pub change_24h_pct: f64,

    pub high_24h: f64,

    pub low_24h: f64,

    /// When the feed produced this snapshot
    pub timestamp: DateTime<Utc>,
}

impl PriceSnapshot {
    /// Snapshot with only the spot prices known.
    pub fn spot(price_usd: f64, price_eur: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            price_usd,
            price_eur,
            change_24h_pct: 0.0,
            high_24h: price_usd,
            low_24h: price_usd,
            timestamp,
        }
    }

    /// USD per EUR implied by this snapshot, when both prices are usable.
    pub fn usd_per_eur(&self) -> Option<f64> {
        if self.price_eur > 0.0 && self.price_usd.is_finite() && self.price_eur.is_finite() {
            Some(self.price_usd / self.price_eur)
        } else {
            None
        }
    }
}

/// A single close price in the recent price history (for the chart).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: DateTime<Utc>,
    pub price: f64,
}
