use chrono::NaiveDate;

use crate::models::projections::AlertStatus;
use crate::models::settings::AlertSettings;

/// Evaluates the configured price and date alerts.
pub struct AlertService;

impl AlertService {
    pub fn new() -> Self {
        Self
    }

    /// The price alert fires once the live USD price is at or below the
    /// target; the date alert fires once `today` reaches the target date.
    /// Nothing fires while the master switch is off.
    pub fn evaluate(
        &self,
        settings: &AlertSettings,
        live_price_usd: Option<f64>,
        today: NaiveDate,
    ) -> AlertStatus {
        if !settings.enabled {
            return AlertStatus::default();
        }

        let price_triggered = settings.price_enabled
            && settings.target_price_usd.is_finite()
            && live_price_usd
                .filter(|p| p.is_finite())
                .is_some_and(|p| p <= settings.target_price_usd);

        let date_triggered = settings.date_enabled
            && settings.target_date.is_some_and(|d| d <= today);

        if price_triggered || date_triggered {
            log::debug!("Alerts triggered: price={price_triggered}, date={date_triggered}");
        }

        AlertStatus {
            price_triggered,
            date_triggered,
        }
    }
}

impl Default for AlertService {
    fn default() -> Self {
        Self::new()
    }
}
