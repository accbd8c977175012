use chrono::Datelike;
use std::collections::BTreeMap;

use crate::models::projections::{MonthStatus, MonthlyActivity};
use crate::models::purchase::Purchase;

/// Groups the schedule by calendar month for the activity timeline.
pub struct ActivityService;

impl ActivityService {
    pub fn new() -> Self {
        Self
    }

    /// One entry per month that has at least one purchase, oldest first.
    ///
    /// Completed purchases contribute their actual cost (falling back to the
    /// estimate), pending ones their estimate.
    pub fn monthly(&self, purchases: &[Purchase]) -> Vec<MonthlyActivity> {
        let mut grouped: BTreeMap<(i32, u32), MonthlyActivity> = BTreeMap::new();

        for p in purchases {
            let (year, month) = (p.estimated_date.year(), p.estimated_date.month());
            let entry = grouped.entry((year, month)).or_insert_with(|| MonthlyActivity {
                key: format!("{year:04}-{month:02}"),
                year,
                month,
                total_cost_eur: 0.0,
                btc_amount: 0.0,
                count: 0,
                completed_count: 0,
                status: MonthStatus::Future,
                purchase_ids: Vec::new(),
            });

            entry.total_cost_eur += if p.completed {
                p.cost_basis_eur()
            } else {
                p.estimated_cost_eur
            };
            entry.btc_amount += p.btc_amount;
            entry.count += 1;
            if p.completed {
                entry.completed_count += 1;
            }
            entry.purchase_ids.push(p.id);
        }

        grouped
            .into_values()
            .map(|mut m| {
                m.status = if m.completed_count == m.count {
                    MonthStatus::Completed
                } else if m.completed_count > 0 {
                    MonthStatus::Partial
                } else {
                    MonthStatus::Future
                };
                m
            })
            .collect()
    }

    /// Highest monthly cost, used to scale the timeline bars.
    pub fn max_monthly_cost(&self, months: &[MonthlyActivity]) -> f64 {
        months.iter().map(|m| m.total_cost_eur).fold(0.0, f64::max)
    }
}

impl Default for ActivityService {
    fn default() -> Self {
        Self::new()
    }
}
