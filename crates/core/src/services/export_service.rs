use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::errors::CoreError;
use crate::models::purchase::Purchase;

/// Column headers of the plan CSV export.
pub const CSV_HEADERS: [&str; 12] = [
    "id",
    "target_price_usd",
    "btc_amount",
    "estimated_cost_eur",
    "estimated_date",
    "completed",
    "completed_at",
    "actual_price_usd",
    "actual_cost_eur",
    "current_price_eur",
    "current_value_eur",
    "pnl_eur",
];

/// Renders the plan as a CSV document.
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Export every purchase, one row each. The header row is bare, every
    /// data field is quoted.
    ///
    /// Current value and P&L use the live EUR price (0 when absent); the
    /// current price column stays empty without a live price.
    pub fn purchases_to_csv(
        &self,
        purchases: &[Purchase],
        live_price_eur: Option<f64>,
    ) -> Result<String, CoreError> {
        let price_eur = live_price_eur.filter(|p| p.is_finite()).unwrap_or(0.0);

        let mut header = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        header.write_record(CSV_HEADERS)?;
        let header = header
            .into_inner()
            .map_err(|e| CoreError::Serialization(format!("Failed to flush CSV header: {e}")))?;

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(header);
        for p in purchases {
            let current_value = p.value_at(price_eur);
            let pnl = current_value - p.cost_basis_eur();
            writer.write_record([
                p.id.to_string(),
                p.target_price.to_string(),
                p.btc_amount.to_string(),
                p.estimated_cost_eur.to_string(),
                p.estimated_date.format("%Y-%m-%d").to_string(),
                p.completed.to_string(),
                p.completed_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                p.actual_price.map(|v| v.to_string()).unwrap_or_default(),
                p.actual_cost_eur.map(|v| v.to_string()).unwrap_or_default(),
                if price_eur != 0.0 {
                    price_eur.to_string()
                } else {
                    String::new()
                },
                current_value.to_string(),
                pnl.to_string(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| CoreError::Serialization(format!("Failed to flush CSV: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| CoreError::Serialization(format!("CSV is not valid UTF-8: {e}")))
    }

    /// Suggested download file name for an export made on `date`.
    pub fn file_name(&self, date: chrono::NaiveDate) -> String {
        format!("btc-plan-{}.csv", date.format("%Y-%m-%d"))
    }
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new()
    }
}
