use thiserror::Error;

/// Unified error type for the entire btc-accumulation-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage / Persistence ───────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid persisted data under '{key}': {reason}")]
    InvalidPersistedData { key: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),

    // ── Price Feed ──────────────────────────────────────────────────
    #[error("Feed error ({source_name}): {message}")]
    Feed {
        source_name: String,
        message: String,
    },

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Plan validation failed: {0}")]
    ValidationError(String),

    #[error("Purchase not found: #{0}")]
    PurchaseNotFound(u32),

    #[error("Unsupported purchase count: {0}")]
    UnsupportedPurchaseCount(u32),

    #[error("Unknown risk profile: {0}")]
    UnknownRiskProfile(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}
