use chrono::{DateTime, Utc};

use crate::models::price::PriceSnapshot;

use super::binance::TickerUpdate;

/// EUR per USD assumed when no exchange rate has been seen yet.
pub const FALLBACK_EUR_PER_USD: f64 = 0.92;

/// Holds the most recent live price.
///
/// Updates may arrive out of order; an update older than the held snapshot
/// is dropped, anything at least as new replaces it.
#[derive(Debug, Clone, Default)]
pub struct LivePrice {
    latest: Option<PriceSnapshot>,
}

impl LivePrice {
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest snapshot, `None` until the first update.
    pub fn current(&self) -> Option<&PriceSnapshot> {
        self.latest.as_ref()
    }

    pub fn price_usd(&self) -> Option<f64> {
        self.latest.as_ref().map(|s| s.price_usd)
    }

    pub fn price_eur(&self) -> Option<f64> {
        self.latest.as_ref().map(|s| s.price_eur)
    }

    /// Apply a ticker update. Returns `true` when it became the current price.
    ///
    /// `eur_usd_rate` is USD per EUR (the EURUSDT price). Without it, the EUR
    /// price is derived from the USD/EUR ratio of the held snapshot, or from
    /// a fixed estimate when there is none. The update's own event time is
    /// used for ordering, falling back to `received_at`.
    pub fn apply(
        &mut self,
        update: TickerUpdate,
        eur_usd_rate: Option<f64>,
        received_at: DateTime<Utc>,
    ) -> bool {
        let timestamp = update.timestamp.unwrap_or(received_at);

        if let Some(current) = &self.latest {
            if timestamp < current.timestamp {
                log::warn!(
                    "Ignoring stale price update from {timestamp} (holding {})",
                    current.timestamp
                );
                return false;
            }
        }

        let price_eur = match eur_usd_rate.filter(|r| r.is_finite() && *r > 0.0) {
            Some(rate) => update.price_usd / rate,
            None => match self.latest.as_ref().and_then(PriceSnapshot::usd_per_eur) {
                Some(ratio) => update.price_usd / ratio,
                None => update.price_usd * FALLBACK_EUR_PER_USD,
            },
        };

        self.latest = Some(PriceSnapshot {
            price_usd: update.price_usd,
            price_eur,
            change_24h_pct: update.change_24h_pct,
            high_24h: update.high_24h,
            low_24h: update.low_24h,
            timestamp,
        });
        true
    }

    /// Forget the held price (e.g. the feed reported an error).
    pub fn clear(&mut self) {
        self.latest = None;
    }
}
