// ═══════════════════════════════════════════════════════════════════
// Plan Tests: schedule generation, validation, plan queries
// ═══════════════════════════════════════════════════════════════════

use btc_accumulation_core::errors::CoreError;
use btc_accumulation_core::models::plan::{
    plan_start_date, PlanConfig, PriceRange, RiskProfile, ALLOWED_PURCHASE_COUNTS,
    DAYS_BETWEEN_PURCHASES, DEFAULT_PURCHASE_COUNT, EUR_USD_RATE, TOTAL_BTC_GOAL,
};
use btc_accumulation_core::models::purchase::Purchase;
use btc_accumulation_core::services::plan_service::{PlanService, MAX_PURCHASE_COUNT};
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn generate(start: f64, end: f64, count: u32) -> Result<Vec<Purchase>, CoreError> {
    PlanService::new().generate(
        PriceRange::new(start, end),
        count,
        plan_start_date(),
        DAYS_BETWEEN_PURCHASES,
        TOTAL_BTC_GOAL,
        EUR_USD_RATE,
    )
}

// ── Generation ──────────────────────────────────────────────────────

mod generation {
    use super::*;

    #[test]
    fn fifty_purchases_from_65k_to_40k() {
        let plan = generate(65_000.0, 40_000.0, 50).unwrap();
        assert_eq!(plan.len(), 50);
        assert_eq!(plan[0].target_price, 65_000.0);
        assert_eq!(plan[49].target_price, 40_000.0);
        assert!(plan.iter().all(|p| p.btc_amount == 0.002));
    }

    #[test]
    fn first_purchase_cost_uses_fx_rate() {
        let plan = generate(65_000.0, 40_000.0, 50).unwrap();
        // 65000 × 0.002 × 0.86
        assert!(approx(plan[0].estimated_cost_eur, 111.8));
    }

    #[test]
    fn all_purchases_start_pending() {
        let plan = generate(65_000.0, 40_000.0, 50).unwrap();
        assert!(plan.iter().all(|p| !p.completed
            && p.completed_at.is_none()
            && p.actual_price.is_none()
            && p.actual_cost_eur.is_none()));
    }

    #[test]
    fn ids_are_contiguous_from_one() {
        let plan = generate(70_000.0, 40_000.0, 25).unwrap();
        let ids: Vec<u32> = plan.iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=25).collect::<Vec<u32>>());
    }

    #[test]
    fn dates_are_spaced_three_weeks_apart() {
        let plan = generate(70_000.0, 40_000.0, 10).unwrap();
        assert_eq!(plan[0].estimated_date, date(2026, 3, 1));
        assert_eq!(plan[1].estimated_date, date(2026, 3, 22));
        assert_eq!(plan[2].estimated_date, date(2026, 4, 12));
        assert_eq!(
            plan[9].estimated_date,
            date(2026, 3, 1).checked_add_days(Days::new(9 * 21)).unwrap()
        );
    }

    #[test]
    fn target_prices_step_linearly() {
        let plan = generate(70_000.0, 40_000.0, 10).unwrap();
        let targets: Vec<f64> = plan.iter().map(|p| p.target_price).collect();
        assert_eq!(
            targets,
            vec![
                70_000.0, 66_667.0, 63_333.0, 60_000.0, 56_667.0, 53_333.0, 50_000.0, 46_667.0,
                43_333.0, 40_000.0
            ]
        );
    }

    #[test]
    fn btc_amount_rounded_to_six_decimals() {
        let plan = generate(70_000.0, 40_000.0, 3).unwrap();
        assert!(plan.iter().all(|p| p.btc_amount == 0.033333));
    }

    #[test]
    fn single_purchase_sits_at_start_price() {
        let plan = generate(70_000.0, 40_000.0, 1).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].target_price, 70_000.0);
        assert_eq!(plan[0].btc_amount, 0.1);
        assert_eq!(plan[0].estimated_date, plan_start_date());
    }

    #[test]
    fn zero_purchases_is_rejected() {
        let err = generate(70_000.0, 40_000.0, 0).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn zero_day_spacing_is_rejected() {
        let err = PlanService::new()
            .generate(
                PriceRange::new(70_000.0, 40_000.0),
                10,
                plan_start_date(),
                0,
                TOTAL_BTC_GOAL,
                EUR_USD_RATE,
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn huge_count_is_rejected_before_building() {
        let err = generate(70_000.0, 40_000.0, u32::MAX).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert!(generate(70_000.0, 40_000.0, MAX_PURCHASE_COUNT + 1).is_err());
        assert_eq!(
            generate(70_000.0, 40_000.0, MAX_PURCHASE_COUNT).unwrap().len(),
            MAX_PURCHASE_COUNT as usize
        );
    }

    #[test]
    fn schedule_past_the_calendar_is_rejected() {
        let err = PlanService::new()
            .generate(
                PriceRange::new(70_000.0, 40_000.0),
                100,
                plan_start_date(),
                u32::MAX,
                TOTAL_BTC_GOAL,
                EUR_USD_RATE,
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn non_finite_prices_are_rejected() {
        assert!(generate(f64::NAN, 40_000.0, 10).is_err());
        assert!(generate(70_000.0, f64::INFINITY, 10).is_err());
        assert!(generate(-1.0, 40_000.0, 10).is_err());
    }

    #[test]
    fn rising_range_is_allowed() {
        let plan = generate(40_000.0, 70_000.0, 4).unwrap();
        assert_eq!(plan[0].target_price, 40_000.0);
        assert_eq!(plan[3].target_price, 70_000.0);
    }

    #[test]
    fn same_inputs_same_plan() {
        let a = generate(80_000.0, 45_000.0, 20).unwrap();
        let b = generate(80_000.0, 45_000.0, 20).unwrap();
        assert_eq!(a, b);
    }
}

// ── Plan configuration ──────────────────────────────────────────────

mod config {
    use super::*;

    #[test]
    fn default_config_is_moderate_fifty() {
        let config = PlanConfig::default();
        assert_eq!(config.profile, RiskProfile::Moderate);
        assert_eq!(config.purchase_count, DEFAULT_PURCHASE_COUNT);
        assert_eq!(config.start_date, date(2026, 3, 1));
        assert_eq!(config.day_spacing, 21);
    }

    #[test]
    fn profiles_map_to_price_ranges() {
        assert_eq!(
            RiskProfile::Conservative.price_range(),
            PriceRange::new(62_000.0, 42_000.0)
        );
        assert_eq!(
            RiskProfile::Moderate.price_range(),
            PriceRange::new(70_000.0, 40_000.0)
        );
        assert_eq!(
            RiskProfile::Aggressive.price_range(),
            PriceRange::new(80_000.0, 45_000.0)
        );
    }

    #[test]
    fn generate_from_config_uses_profile_range() {
        let config = PlanConfig::new(RiskProfile::Aggressive, 20).unwrap();
        let plan = PlanService::new().generate_from_config(&config).unwrap();
        assert_eq!(plan.len(), 20);
        assert_eq!(plan[0].target_price, 80_000.0);
        assert_eq!(plan[19].target_price, 45_000.0);
        assert_eq!(plan[0].btc_amount, 0.005);
    }

    #[test]
    fn only_allowed_counts_accepted() {
        for count in ALLOWED_PURCHASE_COUNTS {
            assert!(PlanConfig::new(RiskProfile::Moderate, count).is_ok());
        }
        let err = PlanConfig::new(RiskProfile::Moderate, 30).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedPurchaseCount(30)));
    }

    #[test]
    fn profile_parses_from_key() {
        assert_eq!(
            "conservative".parse::<RiskProfile>().unwrap(),
            RiskProfile::Conservative
        );
        assert_eq!(" Aggressive ".parse::<RiskProfile>().unwrap(), RiskProfile::Aggressive);
        assert!(matches!(
            "yolo".parse::<RiskProfile>(),
            Err(CoreError::UnknownRiskProfile(_))
        ));
    }

    #[test]
    fn profile_display_is_its_key() {
        for profile in RiskProfile::ALL {
            assert_eq!(profile.to_string(), profile.key());
        }
    }
}

// ── Validation ──────────────────────────────────────────────────────

mod validation {
    use super::*;

    fn plan() -> Vec<Purchase> {
        generate(70_000.0, 40_000.0, 10).unwrap()
    }

    #[test]
    fn generated_plan_is_valid() {
        assert!(PlanService::new().validate_plan(&plan()).is_ok());
    }

    #[test]
    fn empty_plan_is_invalid() {
        assert!(PlanService::new().validate_plan(&[]).is_err());
    }

    #[test]
    fn gap_in_ids_is_invalid() {
        let mut p = plan();
        p.remove(3);
        assert!(PlanService::new().validate_plan(&p).is_err());
    }

    #[test]
    fn out_of_order_dates_are_invalid() {
        let mut p = plan();
        p[5].estimated_date = p[4].estimated_date;
        assert!(PlanService::new().validate_plan(&p).is_err());
    }

    #[test]
    fn completed_without_fill_is_invalid() {
        let mut p = plan();
        p[0].completed = true;
        assert!(PlanService::new().validate_plan(&p).is_err());
    }

    #[test]
    fn pending_with_fill_is_invalid() {
        let mut p = plan();
        p[0].actual_price = Some(60_000.0);
        assert!(PlanService::new().validate_plan(&p).is_err());
    }

    #[test]
    fn mixed_btc_amounts_are_invalid() {
        let mut p = plan();
        p[3].btc_amount *= 2.0;
        let err = PlanService::new().validate_plan(&p).unwrap_err();
        assert!(err.to_string().contains("#4"));
    }

    #[test]
    fn nan_target_is_invalid() {
        let mut p = plan();
        p[2].target_price = f64::NAN;
        assert!(PlanService::new().validate_plan(&p).is_err());
    }
}

// ── Plan queries ────────────────────────────────────────────────────

mod queries {
    use super::*;
    use btc_accumulation_core::models::purchase::Fill;
    use btc_accumulation_core::services::accounting_service::AccountingService;
    use chrono::Utc;

    #[test]
    fn next_purchase_is_first_pending() {
        let plan = generate(70_000.0, 40_000.0, 10).unwrap();
        let svc = PlanService::new();
        assert_eq!(svc.next_purchase(&plan).unwrap().id, 1);

        let plan = AccountingService::new()
            .toggle(&plan, 1, Some(Fill::new(69_000.0, 100.0)), Utc::now())
            .unwrap();
        assert_eq!(svc.next_purchase(&plan).unwrap().id, 2);
    }

    #[test]
    fn next_purchase_none_when_all_completed() {
        let mut plan = generate(70_000.0, 40_000.0, 1).unwrap();
        plan = AccountingService::new()
            .toggle(&plan, 1, None, Utc::now())
            .unwrap();
        assert!(PlanService::new().next_purchase(&plan).is_none());
    }

    #[test]
    fn buy_zones_are_next_three_targets() {
        let plan = generate(70_000.0, 40_000.0, 10).unwrap();
        let plan = AccountingService::new()
            .toggle(&plan, 2, None, Utc::now())
            .unwrap();
        assert_eq!(
            PlanService::new().buy_zones(&plan),
            vec![70_000.0, 63_333.0, 60_000.0]
        );
    }

    #[test]
    fn cost_at_live_price() {
        let plan = generate(70_000.0, 40_000.0, 50).unwrap();
        let svc = PlanService::new();
        assert_eq!(svc.cost_at_live_price(&plan[0], Some(60_000.0)), Some(120.0));
        assert_eq!(svc.cost_at_live_price(&plan[0], None), None);
        assert_eq!(svc.cost_at_live_price(&plan[0], Some(f64::NAN)), None);
    }

    #[test]
    fn trigger_when_price_reaches_target() {
        let plan = generate(70_000.0, 40_000.0, 10).unwrap();
        assert!(plan[0].is_triggered_by(69_999.0));
        assert!(plan[0].is_triggered_by(70_000.0));
        assert!(!plan[0].is_triggered_by(70_001.0));
        assert!(!plan[0].is_triggered_by(f64::NAN));
    }

    #[test]
    fn planned_totals() {
        let plan = generate(70_000.0, 40_000.0, 50).unwrap();
        let svc = PlanService::new();
        assert!(approx(svc.planned_btc(&plan), 0.1));
        assert!(svc.planned_cost_eur(&plan) > 0.0);
    }
}

// ── Properties ──────────────────────────────────────────────────────

mod properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn plan_shape_holds(
            count in 1u32..=200,
            end in 1_000.0f64..100_000.0,
            spread in 0.0f64..100_000.0,
        ) {
            let start = end + spread;
            let plan = generate(start, end, count).unwrap();

            prop_assert_eq!(plan.len(), count as usize);
            prop_assert_eq!(plan[0].target_price, start.round());

            for (i, p) in plan.iter().enumerate() {
                prop_assert_eq!(p.id, i as u32 + 1);
                prop_assert!(!p.completed);
            }
            for pair in plan.windows(2) {
                prop_assert!(pair[0].estimated_date < pair[1].estimated_date);
                prop_assert!(pair[0].target_price >= pair[1].target_price);
                prop_assert_eq!(pair[0].btc_amount, pair[1].btc_amount);
            }

            let total: f64 = plan.iter().map(|p| p.btc_amount).sum();
            prop_assert!((total - TOTAL_BTC_GOAL).abs() <= 1e-6 * f64::from(count));
        }

        #[test]
        fn generation_is_deterministic(
            count in 1u32..=60,
            end in 1_000.0f64..100_000.0,
            spread in 0.0f64..100_000.0,
        ) {
            let a = generate(end + spread, end, count).unwrap();
            let b = generate(end + spread, end, count).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
