// ═══════════════════════════════════════════════════════════════════
// Accounting Tests: completion toggle, progress and P&L metrics
// ═══════════════════════════════════════════════════════════════════

use btc_accumulation_core::errors::CoreError;
use btc_accumulation_core::models::plan::{PlanConfig, RiskProfile, TOTAL_BTC_GOAL};
use btc_accumulation_core::models::purchase::{Fill, Purchase, PurchaseStatus};
use btc_accumulation_core::services::accounting_service::AccountingService;
use btc_accumulation_core::services::plan_service::PlanService;
use chrono::{DateTime, TimeZone, Utc};

// ── Helpers ─────────────────────────────────────────────────────────

fn plan() -> Vec<Purchase> {
    let config = PlanConfig::new(RiskProfile::Moderate, 50).unwrap();
    PlanService::new().generate_from_config(&config).unwrap()
}

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ── Toggle ──────────────────────────────────────────────────────────

mod toggle {
    use super::*;

    #[test]
    fn pending_to_completed_records_fill() {
        let before = plan();
        let after = AccountingService::new()
            .toggle(&before, 1, Some(Fill::new(60_000.0, 100.0)), at())
            .unwrap();

        let p = &after[0];
        assert!(p.completed);
        assert_eq!(p.status(), PurchaseStatus::Completed);
        assert_eq!(p.completed_at, Some(at()));
        assert_eq!(p.actual_price, Some(60_000.0));
        assert_eq!(p.actual_cost_eur, Some(100.0));
    }

    #[test]
    fn only_matching_purchase_changes() {
        let before = plan();
        let after = AccountingService::new()
            .toggle(&before, 7, Some(Fill::new(60_000.0, 100.0)), at())
            .unwrap();

        assert_eq!(after.len(), before.len());
        for (b, a) in before.iter().zip(&after) {
            if b.id == 7 {
                assert_ne!(a, b);
            } else {
                assert_eq!(a, b);
            }
        }
        // Input untouched
        assert!(!before[6].completed);
    }

    #[test]
    fn toggling_twice_restores_pending() {
        let before = plan();
        let svc = AccountingService::new();
        let once = svc
            .toggle(&before, 3, Some(Fill::new(60_000.0, 100.0)), at())
            .unwrap();
        let twice = svc.toggle(&once, 3, None, at()).unwrap();

        assert_eq!(twice, before);
        let p = &twice[2];
        assert!(!p.completed);
        assert!(p.completed_at.is_none());
        assert!(p.actual_price.is_none());
        assert!(p.actual_cost_eur.is_none());
    }

    #[test]
    fn missing_fill_falls_back_to_target() {
        let before = plan();
        let after = AccountingService::new()
            .toggle(&before, 1, None, at())
            .unwrap();
        assert_eq!(after[0].actual_price, Some(before[0].target_price));
        assert_eq!(after[0].actual_cost_eur, Some(before[0].estimated_cost_eur));
    }

    #[test]
    fn non_finite_fill_falls_back_to_target() {
        let before = plan();
        let after = AccountingService::new()
            .toggle(&before, 1, Some(Fill::new(f64::NAN, 100.0)), at())
            .unwrap();
        assert_eq!(after[0].actual_price, Some(before[0].target_price));
        assert!(after[0].fill_consistent());
    }

    #[test]
    fn unknown_id_is_not_found() {
        let before = plan();
        let err = AccountingService::new()
            .toggle(&before, 999, None, at())
            .unwrap_err();
        assert!(matches!(err, CoreError::PurchaseNotFound(999)));
    }

    #[test]
    fn toggled_plan_stays_valid() {
        let svc = AccountingService::new();
        let mut purchases = plan();
        for id in [1, 2, 5, 2] {
            purchases = svc.toggle(&purchases, id, None, at()).unwrap();
        }
        assert!(PlanService::new().validate_plan(&purchases).is_ok());
        let completed: Vec<u32> = svc.completed(&purchases).iter().map(|p| p.id).collect();
        assert_eq!(completed, vec![1, 5]);
    }
}

// ── Metrics ─────────────────────────────────────────────────────────

mod metrics {
    use super::*;

    #[test]
    fn nothing_completed_is_all_zero() {
        let m = AccountingService::new().compute_metrics(&plan(), Some(60_000.0), TOTAL_BTC_GOAL);
        assert_eq!(m.completed_count, 0);
        assert_eq!(m.total_count, 50);
        assert_eq!(m.total_btc_accumulated, 0.0);
        assert_eq!(m.progress_percentage, 0.0);
        assert_eq!(m.total_spent_eur, 0.0);
        assert_eq!(m.current_value_eur, 0.0);
        assert_eq!(m.pnl_eur, 0.0);
        assert_eq!(m.pnl_percent, 0.0);
        assert_eq!(m.average_buy_price_eur, 0.0);
        assert!(!m.pnl_percent.is_nan());
    }

    #[test]
    fn one_completed_purchase_in_profit() {
        let svc = AccountingService::new();
        let purchases = svc
            .toggle(&plan(), 1, Some(Fill::new(60_000.0, 100.0)), at())
            .unwrap();
        let m = svc.compute_metrics(&purchases, Some(60_500.0), TOTAL_BTC_GOAL);

        assert_eq!(m.completed_count, 1);
        assert!(approx(m.total_btc_accumulated, 0.002));
        assert!(approx(m.progress_percentage, 2.0));
        assert!(approx(m.total_spent_eur, 100.0));
        assert!(approx(m.current_value_eur, 121.0));
        assert!(approx(m.pnl_eur, 21.0));
        assert!(approx(m.pnl_percent, 21.0));
        assert!(approx(m.average_buy_price_eur, 50_000.0));
        assert!(m.is_profitable());
        assert!(approx(m.remaining_btc(), 0.098));
    }

    #[test]
    fn absent_live_price_values_holdings_at_zero() {
        let svc = AccountingService::new();
        let purchases = svc
            .toggle(&plan(), 1, Some(Fill::new(60_000.0, 100.0)), at())
            .unwrap();
        let m = svc.compute_metrics(&purchases, None, TOTAL_BTC_GOAL);
        assert_eq!(m.current_value_eur, 0.0);
        assert!(approx(m.pnl_eur, -100.0));
        assert!(approx(m.pnl_percent, -100.0));
    }

    #[test]
    fn nan_live_price_is_treated_as_absent() {
        let svc = AccountingService::new();
        let purchases = svc.toggle(&plan(), 1, None, at()).unwrap();
        let m = svc.compute_metrics(&purchases, Some(f64::NAN), TOTAL_BTC_GOAL);
        assert_eq!(m.current_value_eur, 0.0);
        assert!(m.pnl_eur.is_finite());
    }

    #[test]
    fn full_plan_reaches_goal() {
        let svc = AccountingService::new();
        let mut purchases = plan();
        for id in 1..=50 {
            purchases = svc.toggle(&purchases, id, None, at()).unwrap();
        }
        let m = svc.compute_metrics(&purchases, Some(60_000.0), TOTAL_BTC_GOAL);
        assert_eq!(m.completed_count, 50);
        assert!((m.progress_percentage - 100.0).abs() < 1e-3);
        assert!(m.remaining_btc().abs() < 1e-6);
    }

    #[test]
    fn zero_goal_does_not_divide_by_zero() {
        let svc = AccountingService::new();
        let purchases = svc.toggle(&plan(), 1, None, at()).unwrap();
        let m = svc.compute_metrics(&purchases, Some(60_000.0), 0.0);
        assert_eq!(m.progress_percentage, 0.0);
    }
}
