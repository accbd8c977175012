use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CoreError;
use crate::models::plan::{is_allowed_purchase_count, PlanConfig, RiskProfile};
use crate::models::purchase::Purchase;
use crate::models::settings::Settings;
use crate::models::state::TrackerState;
use crate::services::plan_service::PlanService;

use super::backend::KeyValueStore;
use super::format::{
    self, ALERTS_KEY, DCA_KEY, PLAN_TYPE_KEY, PURCHASES_KEY, PURCHASE_COUNT_KEY, SCENARIO_KEY,
    TAX_KEY,
};

/// What was found in a store.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedState {
    pub config: PlanConfig,
    /// `None` when absent or malformed: the caller generates a fresh plan
    pub purchases: Option<Vec<Purchase>>,
    pub settings: Settings,
}

/// High-level persistence: reads and writes tracker state through a
/// `KeyValueStore`, one key per concern.
///
/// Loading never fails. Anything malformed is treated as absent and logged.
pub struct StorageManager;

impl StorageManager {
    /// Read everything the tracker persists.
    pub fn load(store: &dyn KeyValueStore) -> LoadedState {
        let mut config = Self::load_plan_config(store);
        let purchases = Self::load_purchases(store);

        // The persisted list is authoritative for its own shape.
        if let Some(list) = &purchases {
            let len = list.len() as u32;
            if let Some(inferred) = PlanService::new().infer_config(list, &config) {
                if inferred != config {
                    log::debug!(
                        "Stored plan settings {} x{} disagree with stored plan, using {} x{}",
                        config.profile,
                        config.purchase_count,
                        inferred.profile,
                        inferred.purchase_count
                    );
                    config = inferred;
                }
            } else if len != config.purchase_count && is_allowed_purchase_count(len) {
                log::debug!(
                    "Stored purchase count {} disagrees with stored plan of {len}, using {len}",
                    config.purchase_count
                );
                config.purchase_count = len;
            }
        }

        LoadedState {
            config,
            purchases,
            settings: Self::load_settings(store),
        }
    }

    /// Persist the full tracker state.
    pub fn save(store: &mut dyn KeyValueStore, state: &TrackerState) -> Result<(), CoreError> {
        Self::save_purchases(store, &state.purchases)?;
        Self::save_plan_config(store, &state.config)?;
        Self::save_settings(store, &state.settings)?;
        Ok(())
    }

    /// The stored purchase list, or `None` if it is absent or fails validation.
    pub fn load_purchases(store: &dyn KeyValueStore) -> Option<Vec<Purchase>> {
        let raw = store.get(PURCHASES_KEY)?;
        match format::decode_purchases(&raw) {
            Ok(purchases) => Some(purchases),
            Err(e) => {
                log::warn!("Discarding stored purchase plan: {e}");
                None
            }
        }
    }

    pub fn save_purchases(
        store: &mut dyn KeyValueStore,
        purchases: &[Purchase],
    ) -> Result<(), CoreError> {
        store.set(PURCHASES_KEY, format::encode_purchases(purchases)?)
    }

    /// Stored profile and count over the default constants. Unknown values
    /// fall back to the defaults.
    pub fn load_plan_config(store: &dyn KeyValueStore) -> PlanConfig {
        let mut config = PlanConfig::default();

        if let Some(raw) = store.get(PLAN_TYPE_KEY) {
            match raw.parse::<RiskProfile>() {
                Ok(profile) => config.profile = profile,
                Err(e) => log::warn!("Ignoring stored plan type: {e}"),
            }
        }

        if let Some(raw) = store.get(PURCHASE_COUNT_KEY) {
            match raw.trim().parse::<u32>() {
                Ok(count) if is_allowed_purchase_count(count) => config.purchase_count = count,
                _ => log::warn!("Ignoring stored purchase count '{raw}'"),
            }
        }

        config
    }

    pub fn save_plan_config(
        store: &mut dyn KeyValueStore,
        config: &PlanConfig,
    ) -> Result<(), CoreError> {
        store.set(PLAN_TYPE_KEY, config.profile.key().to_string())?;
        store.set(PURCHASE_COUNT_KEY, config.purchase_count.to_string())
    }

    /// Panel settings; a malformed panel falls back to its own defaults.
    pub fn load_settings(store: &dyn KeyValueStore) -> Settings {
        Settings {
            tax: Self::load_panel(store, TAX_KEY),
            dca: Self::load_panel(store, DCA_KEY),
            scenario: Self::load_panel(store, SCENARIO_KEY),
            alerts: Self::load_panel(store, ALERTS_KEY),
        }
    }

    pub fn save_settings(
        store: &mut dyn KeyValueStore,
        settings: &Settings,
    ) -> Result<(), CoreError> {
        Self::save_panel(store, TAX_KEY, &settings.tax)?;
        Self::save_panel(store, DCA_KEY, &settings.dca)?;
        Self::save_panel(store, SCENARIO_KEY, &settings.scenario)?;
        Self::save_panel(store, ALERTS_KEY, &settings.alerts)
    }

    /// Remove every key the tracker writes.
    pub fn clear(store: &mut dyn KeyValueStore) -> Result<(), CoreError> {
        for key in format::ALL_KEYS {
            store.remove(key)?;
        }
        Ok(())
    }

    fn load_panel<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
        let Some(raw) = store.get(key) else {
            return T::default();
        };
        format::decode_json(key, &raw).unwrap_or_else(|e| {
            log::warn!("Using default settings: {e}");
            T::default()
        })
    }

    fn save_panel<T: Serialize>(
        store: &mut dyn KeyValueStore,
        key: &str,
        value: &T,
    ) -> Result<(), CoreError> {
        let json = serde_json::to_string(value)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize '{key}': {e}")))?;
        store.set(key, json)
    }
}
