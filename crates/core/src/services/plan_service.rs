use chrono::{Days, NaiveDate};

use crate::errors::CoreError;
use crate::models::plan::{is_allowed_purchase_count, PlanConfig, PriceRange, RiskProfile};
use crate::models::purchase::Purchase;
use crate::numeric::{round_cents, round_to, BTC_DECIMALS};

/// Number of upcoming target prices reported as buy zones.
const BUY_ZONE_COUNT: usize = 3;

/// Largest schedule the generator will build.
pub const MAX_PURCHASE_COUNT: u32 = 10_000;

/// Generates purchase schedules and answers questions about a schedule.
///
/// Pure business logic: no clock, no I/O. The same arguments always produce
/// the same schedule.
pub struct PlanService;

impl PlanService {
    pub fn new() -> Self {
        Self
    }

    /// Generate the schedule for a plan configuration.
    pub fn generate_from_config(&self, config: &PlanConfig) -> Result<Vec<Purchase>, CoreError> {
        self.generate(
            config.profile.price_range(),
            config.purchase_count,
            config.start_date,
            config.day_spacing,
            config.total_goal_btc,
            config.fx_rate,
        )
    }

    /// Generate an ordered list of `purchase_count` pending purchases.
    ///
    /// Target prices step linearly from `range.start` to `range.end`, dates
    /// step by `day_spacing` days from `start_date`. A count of 1 yields a
    /// single purchase at the start price.
    pub fn generate(
        &self,
        range: PriceRange,
        purchase_count: u32,
        start_date: NaiveDate,
        day_spacing: u32,
        total_goal_btc: f64,
        fx_rate: f64,
    ) -> Result<Vec<Purchase>, CoreError> {
        if purchase_count == 0 {
            return Err(CoreError::ValidationError(
                "Purchase count must be at least 1".into(),
            ));
        }
        if purchase_count > MAX_PURCHASE_COUNT {
            return Err(CoreError::ValidationError(format!(
                "Purchase count must be at most {MAX_PURCHASE_COUNT}, got {purchase_count}"
            )));
        }
        if day_spacing == 0 {
            return Err(CoreError::ValidationError(
                "Day spacing must be at least 1 day".into(),
            ));
        }
        for (label, value) in [
            ("start price", range.start),
            ("end price", range.end),
            ("BTC goal", total_goal_btc),
            ("FX rate", fx_rate),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "{label} must be a positive finite number, got {value}"
                )));
            }
        }

        let last_offset = u64::from(purchase_count - 1) * u64::from(day_spacing);
        if start_date.checked_add_days(Days::new(last_offset)).is_none() {
            return Err(CoreError::ValidationError(format!(
                "Purchase #{purchase_count} falls outside the supported date range"
            )));
        }

        let btc_amount = round_to(total_goal_btc / f64::from(purchase_count), BTC_DECIMALS);
        let price_step = if purchase_count > 1 {
            (range.start - range.end) / f64::from(purchase_count - 1)
        } else {
            0.0
        };

        log::debug!(
            "Generating {purchase_count} purchases from {} to {} USD, {btc_amount} BTC each",
            range.start,
            range.end
        );

        let mut purchases = Vec::with_capacity(purchase_count as usize);
        for i in 0..purchase_count {
            let target_price = (range.start - price_step * f64::from(i)).round();
            let estimated_cost_eur = round_cents(target_price * btc_amount * fx_rate);
            let offset = u64::from(i) * u64::from(day_spacing);
            let estimated_date = start_date
                .checked_add_days(Days::new(offset))
                .ok_or_else(|| {
                    CoreError::ValidationError(format!(
                        "Purchase #{} falls outside the supported date range",
                        i + 1
                    ))
                })?;

            purchases.push(Purchase::scheduled(
                i + 1,
                target_price,
                btc_amount,
                estimated_cost_eur,
                estimated_date,
            ));
        }

        Ok(purchases)
    }

    /// Check a purchase list against the plan invariants.
    ///
    /// Rules:
    /// - Non-empty, ids contiguous from 1 in list order
    /// - Estimated dates strictly increasing
    /// - Prices, amounts and costs finite (amounts and prices positive)
    /// - Every purchase buys the same BTC amount
    /// - Fill fields present if and only if the purchase is completed
    pub fn validate_plan(&self, purchases: &[Purchase]) -> Result<(), CoreError> {
        if purchases.is_empty() {
            return Err(CoreError::ValidationError("Plan has no purchases".into()));
        }

        let btc_amount = purchases[0].btc_amount;
        let mut previous_date: Option<NaiveDate> = None;
        for (idx, p) in purchases.iter().enumerate() {
            let expected_id = idx as u32 + 1;
            if p.id != expected_id {
                return Err(CoreError::ValidationError(format!(
                    "Expected purchase #{expected_id} at position {idx}, found #{}",
                    p.id
                )));
            }
            if !p.target_price.is_finite() || p.target_price <= 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "Purchase #{} has an invalid target price",
                    p.id
                )));
            }
            if !p.btc_amount.is_finite() || p.btc_amount <= 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "Purchase #{} has an invalid BTC amount",
                    p.id
                )));
            }
            if p.btc_amount != btc_amount {
                return Err(CoreError::ValidationError(format!(
                    "Purchase #{} buys {} BTC, expected {btc_amount} like purchase #1",
                    p.id, p.btc_amount
                )));
            }
            if !p.estimated_cost_eur.is_finite() || p.estimated_cost_eur < 0.0 {
                return Err(CoreError::ValidationError(format!(
                    "Purchase #{} has an invalid estimated cost",
                    p.id
                )));
            }
            if let Some(prev) = previous_date {
                if p.estimated_date <= prev {
                    return Err(CoreError::ValidationError(format!(
                        "Purchase #{} is not scheduled after purchase #{}",
                        p.id,
                        p.id - 1
                    )));
                }
            }
            previous_date = Some(p.estimated_date);

            if !p.fill_consistent() {
                return Err(CoreError::ValidationError(format!(
                    "Purchase #{} has fill fields that do not match its completion flag",
                    p.id
                )));
            }
            let fill_finite = p.actual_price.map_or(true, f64::is_finite)
                && p.actual_cost_eur.map_or(true, f64::is_finite);
            if !fill_finite {
                return Err(CoreError::ValidationError(format!(
                    "Purchase #{} has a non-finite fill",
                    p.id
                )));
            }
        }

        Ok(())
    }

    /// The plan configuration a purchase list was generated from.
    ///
    /// The count is the list length and must be an allowed count. The
    /// profile is the one whose price range the first and last targets sit
    /// on. Plan constants are taken from `base`.
    pub fn infer_config(&self, purchases: &[Purchase], base: &PlanConfig) -> Option<PlanConfig> {
        let count = u32::try_from(purchases.len()).ok()?;
        if !is_allowed_purchase_count(count) {
            return None;
        }
        let (first, last) = (purchases.first()?, purchases.last()?);
        let profile = RiskProfile::ALL.into_iter().find(|profile| {
            let range = profile.price_range();
            first.target_price == range.start.round() && last.target_price == range.end.round()
        })?;

        Some(PlanConfig {
            profile,
            purchase_count: count,
            ..base.clone()
        })
    }

    /// The first pending purchase in plan order.
    pub fn next_purchase<'a>(&self, purchases: &'a [Purchase]) -> Option<&'a Purchase> {
        purchases.iter().find(|p| p.is_pending())
    }

    /// Target prices of the next few pending purchases.
    pub fn buy_zones(&self, purchases: &[Purchase]) -> Vec<f64> {
        purchases
            .iter()
            .filter(|p| p.is_pending())
            .take(BUY_ZONE_COUNT)
            .map(|p| p.target_price)
            .collect()
    }

    /// What a purchase would cost in EUR at the live price, rounded to cents.
    pub fn cost_at_live_price(
        &self,
        purchase: &Purchase,
        live_price_eur: Option<f64>,
    ) -> Option<f64> {
        live_price_eur
            .filter(|p| p.is_finite() && *p > 0.0)
            .map(|p| round_cents(p * purchase.btc_amount))
    }

    /// Sum of BTC over the whole plan (equals the goal up to rounding).
    pub fn planned_btc(&self, purchases: &[Purchase]) -> f64 {
        purchases.iter().map(|p| p.btc_amount).sum()
    }

    /// Sum of the estimated EUR cost over the whole plan.
    pub fn planned_cost_eur(&self, purchases: &[Purchase]) -> f64 {
        purchases.iter().map(|p| p.estimated_cost_eur).sum()
    }
}

impl Default for PlanService {
    fn default() -> Self {
        Self::new()
    }
}
