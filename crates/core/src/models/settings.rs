use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::serde_helpers::{deserialize_flag, deserialize_number, deserialize_opt_date};

/// Lowest manual scenario multiplier.
pub const SCENARIO_MULTIPLIER_MIN: f64 = 0.4;

/// Highest manual scenario multiplier.
pub const SCENARIO_MULTIPLIER_MAX: f64 = 2.2;

/// User-adjustable rates for the tax panel, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxSettings {
    /// Capital-gains tax rate (%)
    #[serde(deserialize_with = "deserialize_number")]
    pub tax_rate: f64,
    /// Exchange fee rate (%)
    #[serde(deserialize_with = "deserialize_number")]
    pub fee_rate: f64,
}

impl Default for TaxSettings {
    fn default() -> Self {
        Self {
            tax_rate: 19.0,
            fee_rate: 0.2,
        }
    }
}

/// Inputs of the flexible DCA allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DcaSettings {
    /// Budget spread over the next 12 months (EUR)
    #[serde(
        rename = "annualBudget",
        alias = "annualBudgetEur",
        deserialize_with = "deserialize_number"
    )]
    pub annual_budget_eur: f64,
    /// How strongly the monthly wave skews the allocation (0–100)
    #[serde(deserialize_with = "deserialize_number")]
    pub volatility_weight: f64,
}

impl Default for DcaSettings {
    fn default() -> Self {
        Self {
            annual_budget_eur: 2400.0,
            volatility_weight: 40.0,
        }
    }
}

/// Named price multiplier presets for the scenario simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioPreset {
    Bear,
    #[default]
    Base,
    Bull,
}

impl ScenarioPreset {
    pub const ALL: [ScenarioPreset; 3] =
        [ScenarioPreset::Bear, ScenarioPreset::Base, ScenarioPreset::Bull];

    pub fn multiplier(&self) -> f64 {
        match self {
            ScenarioPreset::Bear => 0.6,
            ScenarioPreset::Base => 1.0,
            ScenarioPreset::Bull => 1.6,
        }
    }
}

impl std::fmt::Display for ScenarioPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioPreset::Bear => write!(f, "Bear"),
            ScenarioPreset::Base => write!(f, "Base"),
            ScenarioPreset::Bull => write!(f, "Bull"),
        }
    }
}

/// Selected scenario: a preset, or a manual multiplier (reported as `Base`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioSettings {
    #[serde(rename = "scenarioPreset", alias = "preset")]
    pub preset: ScenarioPreset,
    #[serde(
        rename = "scenarioMultiplier",
        alias = "multiplier",
        deserialize_with = "deserialize_number"
    )]
    pub multiplier: f64,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            preset: ScenarioPreset::Base,
            multiplier: 1.0,
        }
    }
}

impl ScenarioSettings {
    pub fn select_preset(&mut self, preset: ScenarioPreset) {
        self.preset = preset;
        self.multiplier = preset.multiplier();
    }

    /// Set a manual multiplier, clamped to the slider range.
    /// A non-finite value leaves the current multiplier unchanged.
    pub fn set_multiplier(&mut self, multiplier: f64) {
        if !multiplier.is_finite() {
            return;
        }
        self.preset = ScenarioPreset::Base;
        self.multiplier = multiplier.clamp(SCENARIO_MULTIPLIER_MIN, SCENARIO_MULTIPLIER_MAX);
    }
}

/// Price and date alert configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertSettings {
    /// Master switch
    #[serde(
        rename = "alertsEnabled",
        alias = "enabled",
        deserialize_with = "deserialize_flag"
    )]
    pub enabled: bool,
    #[serde(
        rename = "alertPriceEnabled",
        alias = "priceEnabled",
        deserialize_with = "deserialize_flag"
    )]
    pub price_enabled: bool,
    #[serde(
        rename = "alertDateEnabled",
        alias = "dateEnabled",
        deserialize_with = "deserialize_flag"
    )]
    pub date_enabled: bool,
    /// Alert once the live USD price is at or below this
    #[serde(
        rename = "alertTargetPrice",
        alias = "targetPriceUsd",
        deserialize_with = "deserialize_number"
    )]
    pub target_price_usd: f64,
    /// Alert once this date is reached
    #[serde(
        rename = "alertTargetDate",
        alias = "targetDate",
        deserialize_with = "deserialize_opt_date"
    )]
    pub target_date: Option<NaiveDate>,
    /// Notification address; stored only
    #[serde(rename = "alertEmail", alias = "email")]
    pub email: String,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            price_enabled: true,
            date_enabled: false,
            target_price_usd: 60_000.0,
            target_date: None,
            email: String::new(),
        }
    }
}

/// All user-adjustable panel settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub tax: TaxSettings,
    pub dca: DcaSettings,
    pub scenario: ScenarioSettings,
    pub alerts: AlertSettings,
}
