use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::numeric::round_cents;

use super::price::PriceSnapshot;

/// Completion state of a scheduled purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseStatus {
    /// Scheduled, not bought yet
    Pending,
    /// Bought; actual fill fields are set
    Completed,
}

impl std::fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PurchaseStatus::Pending => write!(f, "Pending"),
            PurchaseStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// One scheduled or completed buy in the accumulation plan.
///
/// The serialized shape is the persisted JSON shape (camelCase, optional
/// fill fields omitted while pending).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// Position in the plan, contiguous from 1
    pub id: u32,

    /// USD price at which this purchase is planned to trigger
    pub target_price: f64,

    /// BTC bought by this purchase (identical across one plan)
    pub btc_amount: f64,

    /// Projected EUR cost at plan-generation time, in cents precision
    #[serde(rename = "estimatedCostEUR")]
    pub estimated_cost_eur: f64,

    /// Calendar date assigned by even spacing from the plan start
    pub estimated_date: NaiveDate,

    pub completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// USD price actually paid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_price: Option<f64>,

    /// EUR actually paid
    #[serde(
        rename = "actualCostEUR",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub actual_cost_eur: Option<f64>,
}

impl Purchase {
    /// A fresh pending purchase.
    pub fn scheduled(
        id: u32,
        target_price: f64,
        btc_amount: f64,
        estimated_cost_eur: f64,
        estimated_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            target_price,
            btc_amount,
            estimated_cost_eur,
            estimated_date,
            completed: false,
            completed_at: None,
            actual_price: None,
            actual_cost_eur: None,
        }
    }

    pub fn status(&self) -> PurchaseStatus {
        if self.completed {
            PurchaseStatus::Completed
        } else {
            PurchaseStatus::Pending
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }

    /// What this purchase cost (or is expected to cost) in EUR:
    /// the actual cost when recorded, otherwise the estimate.
    pub fn cost_basis_eur(&self) -> f64 {
        self.actual_cost_eur.unwrap_or(self.estimated_cost_eur)
    }

    /// Value of this purchase's BTC at the given EUR price.
    pub fn value_at(&self, price_eur: f64) -> f64 {
        self.btc_amount * price_eur
    }

    /// True when the live USD price has reached this purchase's target.
    pub fn is_triggered_by(&self, price_usd: f64) -> bool {
        price_usd.is_finite() && price_usd <= self.target_price
    }

    /// True when the fill fields agree with the completion flag.
    pub fn fill_consistent(&self) -> bool {
        let present = [
            self.completed_at.is_some(),
            self.actual_price.is_some(),
            self.actual_cost_eur.is_some(),
        ];
        present.iter().all(|&p| p == self.completed)
    }
}

/// The actual execution values recorded when a purchase is completed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// USD price paid per BTC
    pub price_usd: f64,
    /// Total EUR paid
    pub cost_eur: f64,
}

impl Fill {
    pub fn new(price_usd: f64, cost_eur: f64) -> Self {
        Self { price_usd, cost_eur }
    }

    /// Fill at the current live price: the EUR cost is the live EUR price
    /// times the purchase's BTC amount, rounded to cents.
    pub fn at_live_price(purchase: &Purchase, snapshot: &PriceSnapshot) -> Self {
        Self {
            price_usd: snapshot.price_usd,
            cost_eur: round_cents(snapshot.price_eur * purchase.btc_amount),
        }
    }

    /// Fill at the planned values, used when no live price is known.
    pub fn at_target(purchase: &Purchase) -> Self {
        Self {
            price_usd: purchase.target_price,
            cost_eur: purchase.estimated_cost_eur,
        }
    }
}
