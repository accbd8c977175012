use crate::models::projections::{TaxReport, TaxRow, TaxTotals};
use crate::models::purchase::Purchase;
use crate::models::settings::TaxSettings;
use crate::numeric::{clamp_percent, finite_or};

/// Estimates capital-gains tax, fees and net P&L for completed purchases.
pub struct TaxService;

impl TaxService {
    pub fn new() -> Self {
        Self
    }

    /// Build the tax report at the live EUR price.
    ///
    /// Per completed purchase: taxable gain = max(0, P&L), tax = taxable ×
    /// tax rate, fee = cost × fee rate, net = P&L − tax − fee. Rates are
    /// normalized to [0, 100]; an absent live price counts as 0.
    pub fn report(
        &self,
        purchases: &[Purchase],
        live_price_eur: Option<f64>,
        settings: &TaxSettings,
    ) -> TaxReport {
        let price_eur = finite_or(live_price_eur.unwrap_or(0.0), 0.0);
        let tax_rate = clamp_percent(settings.tax_rate);
        let fee_rate = clamp_percent(settings.fee_rate);

        let rows: Vec<TaxRow> = purchases
            .iter()
            .filter(|p| p.completed)
            .map(|p| {
                let cost_eur = p.cost_basis_eur();
                let current_value_eur = p.value_at(price_eur);
                let pnl_eur = current_value_eur - cost_eur;
                let tax_eur = pnl_eur.max(0.0) * tax_rate / 100.0;
                let fee_eur = cost_eur * fee_rate / 100.0;
                TaxRow {
                    purchase_id: p.id,
                    completed_at: p.completed_at,
                    cost_eur,
                    current_value_eur,
                    pnl_eur,
                    tax_eur,
                    fee_eur,
                    net_eur: pnl_eur - tax_eur - fee_eur,
                }
            })
            .collect();

        let totals = rows.iter().fold(TaxTotals::default(), |acc, row| TaxTotals {
            cost_eur: acc.cost_eur + row.cost_eur,
            current_value_eur: acc.current_value_eur + row.current_value_eur,
            pnl_eur: acc.pnl_eur + row.pnl_eur,
            tax_eur: acc.tax_eur + row.tax_eur,
            fee_eur: acc.fee_eur + row.fee_eur,
            net_eur: acc.net_eur + row.net_eur,
        });

        TaxReport {
            tax_rate,
            fee_rate,
            rows,
            totals,
        }
    }
}

impl Default for TaxService {
    fn default() -> Self {
        Self::new()
    }
}
