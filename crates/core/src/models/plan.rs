use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Total BTC the plan accumulates.
pub const TOTAL_BTC_GOAL: f64 = 0.1;

/// Approximate EUR per USD used for plan-time cost estimates.
pub const EUR_USD_RATE: f64 = 0.86;

/// Days between two consecutive scheduled purchases.
pub const DAYS_BETWEEN_PURCHASES: u32 = 21;

/// Purchase counts a plan may be generated with.
pub const ALLOWED_PURCHASE_COUNTS: [u32; 4] = [10, 20, 25, 50];

/// Purchase count used when none has been selected.
pub const DEFAULT_PURCHASE_COUNT: u32 = 50;

/// First scheduled purchase date (2026-03-01).
pub fn plan_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap_or_default()
}

/// Start/end target prices (USD) bounding a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub start: f64,
    pub end: f64,
}

impl PriceRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// Named price-range preset for the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    /// Late entry (62k → 42k)
    Conservative,
    /// Baseline plan (70k → 40k)
    #[default]
    Moderate,
    /// Full accumulation (80k → 45k)
    Aggressive,
}

impl RiskProfile {
    pub const ALL: [RiskProfile; 3] = [
        RiskProfile::Conservative,
        RiskProfile::Moderate,
        RiskProfile::Aggressive,
    ];

    pub fn price_range(&self) -> PriceRange {
        match self {
            RiskProfile::Conservative => PriceRange::new(62_000.0, 42_000.0),
            RiskProfile::Moderate => PriceRange::new(70_000.0, 40_000.0),
            RiskProfile::Aggressive => PriceRange::new(80_000.0, 45_000.0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "Conservative",
            RiskProfile::Moderate => "Moderate",
            RiskProfile::Aggressive => "Aggressive",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "Late entry (62k - 42k)",
            RiskProfile::Moderate => "Baseline plan (70k - 40k)",
            RiskProfile::Aggressive => "Full accumulation (80k - 45k)",
        }
    }

    /// Key under which the profile is persisted.
    pub fn key(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Moderate => "moderate",
            RiskProfile::Aggressive => "aggressive",
        }
    }
}

impl std::fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for RiskProfile {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(RiskProfile::Conservative),
            "moderate" => Ok(RiskProfile::Moderate),
            "aggressive" => Ok(RiskProfile::Aggressive),
            _ => Err(CoreError::UnknownRiskProfile(s.to_string())),
        }
    }
}

/// Everything that determines a generated schedule.
///
/// Only `profile` and `purchase_count` are user choices; the rest are
/// plan constants. Two equal configs always generate identical plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub profile: RiskProfile,
    pub purchase_count: u32,
    pub start_date: NaiveDate,
    pub day_spacing: u32,
    pub total_goal_btc: f64,
    pub fx_rate: f64,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            profile: RiskProfile::default(),
            purchase_count: DEFAULT_PURCHASE_COUNT,
            start_date: plan_start_date(),
            day_spacing: DAYS_BETWEEN_PURCHASES,
            total_goal_btc: TOTAL_BTC_GOAL,
            fx_rate: EUR_USD_RATE,
        }
    }
}

impl PlanConfig {
    /// Default constants with the given user choices.
    pub fn new(profile: RiskProfile, purchase_count: u32) -> Result<Self, CoreError> {
        Self::default()
            .with_profile(profile)
            .with_purchase_count(purchase_count)
    }

    pub fn with_profile(mut self, profile: RiskProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Select a purchase count; only the allowed counts are accepted.
    pub fn with_purchase_count(mut self, purchase_count: u32) -> Result<Self, CoreError> {
        if !is_allowed_purchase_count(purchase_count) {
            return Err(CoreError::UnsupportedPurchaseCount(purchase_count));
        }
        self.purchase_count = purchase_count;
        Ok(self)
    }

    /// BTC per purchase before rounding.
    pub fn btc_per_purchase(&self) -> f64 {
        if self.purchase_count == 0 {
            return 0.0;
        }
        self.total_goal_btc / f64::from(self.purchase_count)
    }
}

pub fn is_allowed_purchase_count(count: u32) -> bool {
    ALLOWED_PURCHASE_COUNTS.contains(&count)
}
