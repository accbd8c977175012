use serde::de::DeserializeOwned;

use crate::errors::CoreError;
use crate::models::purchase::Purchase;
use crate::services::plan_service::PlanService;

/// Purchase list (JSON array of purchases).
pub const PURCHASES_KEY: &str = "btc-accumulation-purchases-v5";

/// Selected risk profile key (plain string).
pub const PLAN_TYPE_KEY: &str = "btc-accumulation-plan-type-v5";

/// Selected purchase count (plain integer).
pub const PURCHASE_COUNT_KEY: &str = "btc-accumulation-purchase-count-v5";

/// Tax panel settings (JSON object).
pub const TAX_KEY: &str = "btc-accumulation-tax-v1";

/// DCA panel settings (JSON object).
pub const DCA_KEY: &str = "btc-accumulation-dca-v1";

/// Scenario panel settings (JSON object).
pub const SCENARIO_KEY: &str = "btc-accumulation-scenario-v1";

/// Alert settings (JSON object).
pub const ALERTS_KEY: &str = "btc-accumulation-alerts-v1";

/// Every key the tracker writes.
pub const ALL_KEYS: [&str; 7] = [
    PURCHASES_KEY,
    PLAN_TYPE_KEY,
    PURCHASE_COUNT_KEY,
    TAX_KEY,
    DCA_KEY,
    SCENARIO_KEY,
    ALERTS_KEY,
];

/// Parse and validate a persisted purchase list.
///
/// The JSON must match the purchase shape and the list must satisfy every
/// plan invariant; a partially valid list is rejected as a whole.
pub fn decode_purchases(raw: &str) -> Result<Vec<Purchase>, CoreError> {
    let purchases: Vec<Purchase> = decode_json(PURCHASES_KEY, raw)?;
    PlanService::new()
        .validate_plan(&purchases)
        .map_err(|e| CoreError::InvalidPersistedData {
            key: PURCHASES_KEY.into(),
            reason: e.to_string(),
        })?;
    Ok(purchases)
}

/// Serialize a purchase list to its persisted JSON form.
pub fn encode_purchases(purchases: &[Purchase]) -> Result<String, CoreError> {
    serde_json::to_string(purchases)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize purchases: {e}")))
}

/// Parse a JSON value stored under `key`.
pub fn decode_json<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, CoreError> {
    serde_json::from_str(raw).map_err(|e| CoreError::InvalidPersistedData {
        key: key.into(),
        reason: e.to_string(),
    })
}
