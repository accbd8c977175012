use serde::Deserialize;

use crate::errors::CoreError;
use crate::models::projections::Sentiment;

const SOURCE: &str = "alternative.me";

/// Index value shown while no reading is available.
pub const NEUTRAL_INDEX: u8 = 50;

/// A Fear & Greed index reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FearGreedReading {
    /// 0 (extreme fear) – 100 (extreme greed)
    pub value: u8,
    pub sentiment: Sentiment,
}

impl FearGreedReading {
    pub fn new(value: u8) -> Self {
        let value = value.min(100);
        Self {
            value,
            sentiment: Sentiment::from_index(value),
        }
    }
}

impl Default for FearGreedReading {
    fn default() -> Self {
        Self::new(NEUTRAL_INDEX)
    }
}

#[derive(Deserialize)]
struct FngResponse {
    data: Vec<FngEntry>,
}

#[derive(Deserialize)]
struct FngEntry {
    value: String,
}

/// Decode the `https://api.alternative.me/fng/` response (latest reading first).
pub fn decode_fear_greed(json: &str) -> Result<FearGreedReading, CoreError> {
    let resp: FngResponse = serde_json::from_str(json).map_err(|e| CoreError::Feed {
        source_name: SOURCE.into(),
        message: format!("Failed to parse Fear & Greed response: {e}"),
    })?;

    let entry = resp.data.first().ok_or_else(|| CoreError::Feed {
        source_name: SOURCE.into(),
        message: "Fear & Greed response has no readings".into(),
    })?;

    let value: u8 = entry.value.trim().parse().map_err(|e| CoreError::Feed {
        source_name: SOURCE.into(),
        message: format!("Invalid Fear & Greed value '{}': {e}", entry.value),
    })?;

    Ok(FearGreedReading::new(value))
}
