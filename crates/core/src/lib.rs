pub mod errors;
pub mod feed;
pub mod models;
pub mod numeric;
pub mod services;
pub mod storage;

use chrono::{DateTime, NaiveDate, Utc};
use models::{
    metrics::PortfolioMetrics,
    plan::{is_allowed_purchase_count, PlanConfig, RiskProfile},
    price::PriceSnapshot,
    projections::{
        AlertStatus, DcaMonth, FutureProjection, HalvingCountdown, MonthlyActivity,
        ScenarioProjection, TaxReport, TimeLeft,
    },
    purchase::{Fill, Purchase},
    settings::{AlertSettings, ScenarioPreset, Settings},
    state::{ReplacedPlan, ResetOutcome, TrackerState},
};
use services::{
    accounting_service::AccountingService, activity_service::ActivityService,
    alert_service::AlertService, converter_service::ConverterService,
    countdown_service::CountdownService, dca_service::DcaService,
    export_service::ExportService, plan_service::PlanService,
    scenario_service::ScenarioService, tax_service::TaxService,
};
use storage::{backend::KeyValueStore, manager::StorageManager};

use errors::CoreError;

/// Main entry point for the BTC accumulation core library.
/// Holds the plan state and all services needed to operate on it.
///
/// The live price is never stored here: every method that needs it takes
/// the caller's latest snapshot, `None` while the feed has not resolved.
#[must_use]
pub struct AccumulationTracker {
    state: TrackerState,
    plan_service: PlanService,
    accounting_service: AccountingService,
    tax_service: TaxService,
    dca_service: DcaService,
    scenario_service: ScenarioService,
    alert_service: AlertService,
    activity_service: ActivityService,
    countdown_service: CountdownService,
    converter_service: ConverterService,
    export_service: ExportService,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for AccumulationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccumulationTracker")
            .field("profile", &self.state.config.profile)
            .field("purchases", &self.state.purchases.len())
            .field(
                "completed",
                &self.state.purchases.iter().filter(|p| p.completed).count(),
            )
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl AccumulationTracker {
    /// Create a brand new plan with the default profile and count.
    pub fn create_new() -> Result<Self, CoreError> {
        Self::create_with(PlanConfig::default())
    }

    /// Create a brand new plan for the given configuration.
    pub fn create_with(config: PlanConfig) -> Result<Self, CoreError> {
        let purchases = PlanService::new().generate_from_config(&config)?;
        let mut tracker = Self::build(TrackerState {
            config,
            purchases,
            settings: Settings::default(),
            previous_plan: None,
        });
        tracker.dirty = true;
        Ok(tracker)
    }

    /// Restore a tracker from an in-memory state, validating the plan.
    pub fn from_state(state: TrackerState) -> Result<Self, CoreError> {
        PlanService::new().validate_plan(&state.purchases)?;
        Ok(Self::build(state))
    }

    /// Load from a persistence provider.
    ///
    /// A missing or malformed plan is replaced by a freshly generated one for
    /// the stored (or default) configuration; the tracker is then marked
    /// unsaved so the caller persists the new plan.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, CoreError> {
        let loaded = StorageManager::load(store);
        let (purchases, regenerated) = match loaded.purchases {
            Some(purchases) => (purchases, false),
            None => {
                log::debug!(
                    "No usable stored plan, generating {} plan with {} purchases",
                    loaded.config.profile,
                    loaded.config.purchase_count
                );
                (PlanService::new().generate_from_config(&loaded.config)?, true)
            }
        };

        let mut tracker = Self::build(TrackerState {
            config: loaded.config,
            purchases,
            settings: loaded.settings,
            previous_plan: None,
        });
        tracker.dirty = regenerated;
        Ok(tracker)
    }

    /// Persist the current state. Clears the unsaved-changes flag on success.
    pub fn save(&mut self, store: &mut dyn KeyValueStore) -> Result<(), CoreError> {
        StorageManager::save(store, &self.state)?;
        self.dirty = false;
        Ok(())
    }

    // ── Plan ────────────────────────────────────────────────────────

    #[must_use]
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &PlanConfig {
        &self.state.config
    }

    #[must_use]
    pub fn profile(&self) -> RiskProfile {
        self.state.config.profile
    }

    #[must_use]
    pub fn purchase_count(&self) -> u32 {
        self.state.config.purchase_count
    }

    /// BTC bought per purchase in the active plan.
    #[must_use]
    pub fn btc_per_purchase(&self) -> f64 {
        self.state
            .purchases
            .first()
            .map_or_else(|| self.state.config.btc_per_purchase(), |p| p.btc_amount)
    }

    /// All purchases in plan order.
    #[must_use]
    pub fn purchases(&self) -> &[Purchase] {
        &self.state.purchases
    }

    #[must_use]
    pub fn get_purchase(&self, id: u32) -> Option<&Purchase> {
        self.state.purchases.iter().find(|p| p.id == id)
    }

    /// The first purchase still pending.
    #[must_use]
    pub fn next_purchase(&self) -> Option<&Purchase> {
        self.plan_service.next_purchase(&self.state.purchases)
    }

    /// Target prices of the next three pending purchases (chart buy zones).
    #[must_use]
    pub fn buy_zones(&self) -> Vec<f64> {
        self.plan_service.buy_zones(&self.state.purchases)
    }

    /// Replace the plan wholesale with a fresh one for `profile` and `count`.
    ///
    /// Completion state does not carry over. The discarded completions are
    /// reported in the outcome and the replaced plan is kept for
    /// `undo_reset`.
    pub fn reset_plan(
        &mut self,
        profile: RiskProfile,
        purchase_count: u32,
    ) -> Result<ResetOutcome, CoreError> {
        let config = self
            .state
            .config
            .clone()
            .with_profile(profile)
            .with_purchase_count(purchase_count)?;
        let purchases = self.plan_service.generate_from_config(&config)?;

        let previous_config = std::mem::replace(&mut self.state.config, config);
        let previous_purchases = std::mem::replace(&mut self.state.purchases, purchases);

        let discarded_completions: Vec<Purchase> = previous_purchases
            .iter()
            .filter(|p| p.completed)
            .cloned()
            .collect();
        if !discarded_completions.is_empty() {
            log::warn!(
                "Plan reset to {profile} ({purchase_count} purchases) discarded {} completed purchases",
                discarded_completions.len()
            );
        }

        self.state.previous_plan = Some(ReplacedPlan {
            config: previous_config.clone(),
            purchases: previous_purchases,
        });
        self.dirty = true;

        Ok(ResetOutcome {
            previous_config,
            discarded_completions,
        })
    }

    /// Restore the plan replaced by the last reset.
    /// Returns `false` if there is nothing to restore.
    pub fn undo_reset(&mut self) -> bool {
        let Some(previous) = self.state.previous_plan.take() else {
            return false;
        };
        self.state.config = previous.config;
        self.state.purchases = previous.purchases;
        self.dirty = true;
        true
    }

    /// Whether a reset can be undone.
    #[must_use]
    pub fn can_undo_reset(&self) -> bool {
        self.state.previous_plan.is_some()
    }

    // ── Completion ──────────────────────────────────────────────────

    /// Toggle purchase `id` now, filling at the live price when one is known.
    pub fn toggle_purchase(
        &mut self,
        id: u32,
        live: Option<&PriceSnapshot>,
    ) -> Result<&Purchase, CoreError> {
        let purchase = self
            .get_purchase(id)
            .ok_or(CoreError::PurchaseNotFound(id))?;
        let fill = live.map(|snapshot| Fill::at_live_price(purchase, snapshot));
        self.toggle_purchase_at(id, fill, Utc::now())
    }

    /// Toggle purchase `id` with an explicit fill and completion time.
    /// An unknown id leaves the plan untouched.
    pub fn toggle_purchase_at(
        &mut self,
        id: u32,
        fill: Option<Fill>,
        at: DateTime<Utc>,
    ) -> Result<&Purchase, CoreError> {
        let updated = self
            .accounting_service
            .toggle(&self.state.purchases, id, fill, at)?;
        self.state.purchases = updated;
        self.dirty = true;
        self.get_purchase(id).ok_or(CoreError::PurchaseNotFound(id))
    }

    // ── Metrics & Projections ───────────────────────────────────────

    /// Progress, amount invested and P&L at the live price.
    #[must_use]
    pub fn metrics(&self, live: Option<&PriceSnapshot>) -> PortfolioMetrics {
        self.accounting_service.compute_metrics(
            &self.state.purchases,
            live.map(|s| s.price_eur),
            self.state.config.total_goal_btc,
        )
    }

    #[must_use]
    pub fn tax_report(&self, live: Option<&PriceSnapshot>) -> TaxReport {
        self.tax_service.report(
            &self.state.purchases,
            live.map(|s| s.price_eur),
            &self.state.settings.tax,
        )
    }

    /// DCA allocation of the annual budget over the 12 months starting at `from`.
    #[must_use]
    pub fn dca_allocation(&self, from: NaiveDate) -> Vec<DcaMonth> {
        self.dca_service.allocate(&self.state.settings.dca, from)
    }

    #[must_use]
    pub fn scenario(&self, live: Option<&PriceSnapshot>) -> ScenarioProjection {
        let metrics = self.metrics(live);
        self.scenario_service.project(
            metrics.total_btc_accumulated,
            live.map(|s| s.price_eur),
            self.state.config.total_goal_btc,
            &self.state.settings.scenario,
        )
    }

    /// Goal value at a projected USD price.
    #[must_use]
    pub fn future_projection(
        &self,
        projected_price_usd: f64,
        live: Option<&PriceSnapshot>,
    ) -> FutureProjection {
        self.scenario_service.future(
            projected_price_usd,
            self.state.config.total_goal_btc,
            live,
        )
    }

    #[must_use]
    pub fn alert_status(&self, live: Option<&PriceSnapshot>, today: NaiveDate) -> AlertStatus {
        self.alert_service
            .evaluate(&self.state.settings.alerts, live.map(|s| s.price_usd), today)
    }

    #[must_use]
    pub fn monthly_activity(&self) -> Vec<MonthlyActivity> {
        self.activity_service.monthly(&self.state.purchases)
    }

    /// Time left until the next pending purchase's estimated date.
    #[must_use]
    pub fn time_to_next_purchase(&self, now: DateTime<Utc>) -> Option<TimeLeft> {
        let next = self.next_purchase()?;
        self.countdown_service.until_date(next.estimated_date, now)
    }

    #[must_use]
    pub fn halving_countdown(&self, now: DateTime<Utc>) -> HalvingCountdown {
        self.countdown_service.halving(now)
    }

    /// Satoshis bought by `amount_eur` at the live EUR price.
    #[must_use]
    pub fn eur_to_sats(&self, amount_eur: f64, live: Option<&PriceSnapshot>) -> Option<u64> {
        self.converter_service
            .fiat_to_sats(amount_eur, live.map(|s| s.price_eur))
    }

    /// Satoshis bought by `amount_usd` at the live USD price.
    #[must_use]
    pub fn usd_to_sats(&self, amount_usd: f64, live: Option<&PriceSnapshot>) -> Option<u64> {
        self.converter_service
            .fiat_to_sats(amount_usd, live.map(|s| s.price_usd))
    }

    /// EUR value of `sats` at the live EUR price.
    #[must_use]
    pub fn sats_to_eur(&self, sats: f64, live: Option<&PriceSnapshot>) -> Option<f64> {
        self.converter_service
            .sats_to_fiat(sats, live.map(|s| s.price_eur))
    }

    /// USD value of `sats` at the live USD price.
    #[must_use]
    pub fn sats_to_usd(&self, sats: f64, live: Option<&PriceSnapshot>) -> Option<f64> {
        self.converter_service
            .sats_to_fiat(sats, live.map(|s| s.price_usd))
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    /// Set tax and fee rates (%). A non-finite value keeps the current rate;
    /// finite values are clamped to [0, 100].
    pub fn set_tax_rates(&mut self, tax_rate: f64, fee_rate: f64) {
        let tax = &mut self.state.settings.tax;
        if tax_rate.is_finite() {
            tax.tax_rate = tax_rate.clamp(0.0, 100.0);
        }
        if fee_rate.is_finite() {
            tax.fee_rate = fee_rate.clamp(0.0, 100.0);
        }
        self.dirty = true;
    }

    /// Set the DCA budget (EUR, not negative) and volatility weight (0–100).
    /// A non-finite value keeps the current one.
    pub fn set_dca(&mut self, annual_budget_eur: f64, volatility_weight: f64) {
        let dca = &mut self.state.settings.dca;
        if annual_budget_eur.is_finite() {
            dca.annual_budget_eur = annual_budget_eur.max(0.0);
        }
        if volatility_weight.is_finite() {
            dca.volatility_weight = volatility_weight.clamp(0.0, 100.0);
        }
        self.dirty = true;
    }

    pub fn select_scenario_preset(&mut self, preset: ScenarioPreset) {
        self.state.settings.scenario.select_preset(preset);
        self.dirty = true;
    }

    pub fn set_scenario_multiplier(&mut self, multiplier: f64) {
        self.state.settings.scenario.set_multiplier(multiplier);
        self.dirty = true;
    }

    pub fn set_alert_settings(&mut self, alerts: AlertSettings) {
        self.state.settings.alerts = alerts;
        self.dirty = true;
    }

    /// Returns `true` if the state has been modified since the last save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Export ──────────────────────────────────────────────────────

    /// Export the plan as CSV, valued at the live EUR price.
    pub fn export_csv(&self, live: Option<&PriceSnapshot>) -> Result<String, CoreError> {
        self.export_service
            .purchases_to_csv(&self.state.purchases, live.map(|s| s.price_eur))
    }

    /// Export the purchase list as JSON (the persisted shape).
    pub fn export_purchases_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.state.purchases)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize purchases: {e}")))
    }

    /// Replace the purchase list with an imported one. The import is
    /// validated as a whole; on error nothing changes.
    ///
    /// The imported list must be a plan of an allowed size on one of the
    /// risk profiles. The plan configuration follows the import, and the
    /// undo slot is cleared since it refers to the replaced plan.
    /// Returns the number of purchases imported.
    pub fn import_purchases_from_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let purchases: Vec<Purchase> = serde_json::from_str(json)?;
        self.plan_service.validate_plan(&purchases)?;

        let count = u32::try_from(purchases.len()).unwrap_or(u32::MAX);
        if !is_allowed_purchase_count(count) {
            return Err(CoreError::UnsupportedPurchaseCount(count));
        }
        let config = self
            .plan_service
            .infer_config(&purchases, &self.state.config)
            .ok_or_else(|| {
                CoreError::ValidationError(
                    "Imported plan does not follow any risk profile's price range".into(),
                )
            })?;

        log::info!(
            "Imported {count} purchases ({} plan), replacing {} plan of {}",
            config.profile,
            self.state.config.profile,
            self.state.purchases.len()
        );
        self.state.config = config;
        self.state.purchases = purchases;
        self.state.previous_plan = None;
        self.dirty = true;
        Ok(count as usize)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(state: TrackerState) -> Self {
        Self {
            state,
            plan_service: PlanService::new(),
            accounting_service: AccountingService::new(),
            tax_service: TaxService::new(),
            dca_service: DcaService::new(),
            scenario_service: ScenarioService::new(),
            alert_service: AlertService::new(),
            activity_service: ActivityService::new(),
            countdown_service: CountdownService::new(),
            converter_service: ConverterService::new(),
            export_service: ExportService::new(),
            dirty: false,
        }
    }
}
