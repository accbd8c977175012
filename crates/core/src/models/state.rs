use serde::{Deserialize, Serialize};

use super::plan::PlanConfig;
use super::purchase::Purchase;
use super::settings::Settings;

/// The main data container owned by the presentation layer.
///
/// Contains: the active plan configuration, its purchases (with completion
/// state), the panel settings, and the plan replaced by the last reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerState {
    pub config: PlanConfig,

    pub purchases: Vec<Purchase>,

    pub settings: Settings,

    /// Plan that was active before the last reset (undo support).
    #[serde(default)]
    pub previous_plan: Option<ReplacedPlan>,
}

/// A plan that was replaced wholesale by a reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacedPlan {
    pub config: PlanConfig,
    pub purchases: Vec<Purchase>,
}

/// Result of replacing the plan with a freshly generated one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetOutcome {
    /// Configuration of the plan that was replaced
    pub previous_config: PlanConfig,
    /// Completed purchases of the replaced plan; their completion state is
    /// not carried over
    pub discarded_completions: Vec<Purchase>,
}

impl ResetOutcome {
    pub fn lost_progress(&self) -> bool {
        !self.discarded_completions.is_empty()
    }
}
