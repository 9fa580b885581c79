// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Compounding math shared by plan projections and goal contributions.
//!
//! Both directions use the annuity-due form, where each period's contribution
//! earns that period's return:
//!
//! ```text
//! FV = P * ((1 + r)^n - 1) / r * (1 + r)      r > 0
//! FV = P * n                                   r <= 0
//! ```

use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use serde::Serialize;

use crate::buckets::MonthKey;
use crate::error::NestError;
use crate::models::{Compounding, Goal, InvestmentPlan};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Monthly-equivalent rate from an annual percentage.
pub fn monthly_rate(annual_pct: Decimal) -> Decimal {
    annual_pct / Decimal::from(12) / HUNDRED
}

fn compound(rate: Decimal, periods: u32) -> Option<Decimal> {
    (Decimal::ONE + rate).checked_powu(periods as u64)
}

/// Future value of `periods` contributions of `contribution` at `rate` per
/// period. Non-positive rates fall back to plain summation. Never negative.
pub fn future_value(contribution: Decimal, rate: Decimal, periods: u32) -> Decimal {
    if periods == 0 || contribution.is_zero() {
        return Decimal::ZERO;
    }
    let fv = if rate > Decimal::ZERO {
        match compound(rate, periods) {
            Some(g) => {
                let factor = (g - Decimal::ONE) / rate * (Decimal::ONE + rate);
                contribution.saturating_mul(factor)
            }
            None => Decimal::MAX,
        }
    } else {
        contribution.saturating_mul(Decimal::from(periods))
    };
    fv.max(Decimal::ZERO)
}

/// Grows a lump sum for `periods` at `rate`; non-positive rates leave it flat.
fn grow(value: Decimal, rate: Decimal, periods: u32) -> Decimal {
    if value.is_zero() || rate <= Decimal::ZERO || periods == 0 {
        return value;
    }
    match compound(rate, periods) {
        Some(g) => value.saturating_mul(g),
        None => Decimal::MAX,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub min: Decimal,
    pub max: Decimal,
}

impl Range {
    pub const ZERO: Range = Range {
        min: Decimal::ZERO,
        max: Decimal::ZERO,
    };
}

impl std::ops::Add for Range {
    type Output = Range;

    fn add(self, rhs: Range) -> Range {
        Range {
            min: self.min.saturating_add(rhs.min),
            max: self.max.saturating_add(rhs.max),
        }
    }
}

/// Value of `plan` at the given month under one annual return.
fn plan_value(plan: &InvestmentPlan, annual_pct: Decimal, at: MonthKey) -> Decimal {
    let start = MonthKey::of(plan.start_date);
    let elapsed = start.months_until(at);
    let rate = monthly_rate(annual_pct);
    let contributing = match plan.end_date {
        Some(end) => elapsed.min(start.months_until(MonthKey::of(end))),
        None => elapsed,
    };
    let accumulated = future_value(plan.contribution, rate, contributing);
    grow(accumulated, rate, elapsed - contributing)
}

/// Projected value of `plan` at month `at` under its minimum and maximum
/// expected return. Zero for months at or before the plan's start month.
pub fn project_plan(plan: &InvestmentPlan, at: MonthKey) -> Range {
    Range {
        min: plan_value(plan, plan.min_return, at),
        max: plan_value(plan, plan.max_return, at),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipPlan {
    /// Required contribution per period, rounded up to the cent.
    pub contribution: Decimal,
    pub periods: u32,
    /// Monthly-equivalent rate applied at every contribution.
    pub rate: Decimal,
    pub compounding: Compounding,
}

/// Smallest per-period contribution whose future value at the goal date
/// reaches the goal's target amount. The compounding frequency only decides
/// how many contributions fit before the goal date; the rate is always the
/// monthly-equivalent one.
///
/// A target date on or before `today` is a validation error. A horizon too
/// short to hold a single period is `NoValidPlan`; neither maps to zero.
pub fn required_contribution(goal: &Goal, today: NaiveDate) -> Result<SipPlan, NestError> {
    if goal.target_date <= today {
        return Err(NestError::Validation(format!(
            "Goal '{}' target date {} is not after {}",
            goal.name, goal.target_date, today
        )));
    }
    if goal.target_amount <= Decimal::ZERO {
        return Err(NestError::Validation(format!(
            "Goal '{}' target amount must be positive",
            goal.name
        )));
    }
    let months = MonthKey::of(today).months_until(MonthKey::of(goal.target_date));
    let periods = months / goal.compounding.months_per_period();
    if periods == 0 {
        return Err(NestError::NoValidPlan(format!(
            "'{}' is less than one {} period away",
            goal.name, goal.compounding
        )));
    }

    let rate = monthly_rate(goal.annual_return);
    let raw = if rate > Decimal::ZERO {
        let g = compound(rate, periods).ok_or_else(|| {
            NestError::NoValidPlan(format!("growth over {} periods overflows", periods))
        })?;
        goal.target_amount * rate / ((g - Decimal::ONE) * (Decimal::ONE + rate))
    } else {
        goal.target_amount / Decimal::from(periods)
    };

    Ok(SipPlan {
        contribution: raw.round_dp_with_strategy(2, RoundingStrategy::AwayFromZero),
        periods,
        rate: rate.max(Decimal::ZERO),
        compounding: goal.compounding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlanStatus;
    use rust_decimal_macros::dec;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn plan(contribution: Decimal, min: Decimal, max: Decimal, start: &str) -> InvestmentPlan {
        InvestmentPlan {
            id: 1,
            user_id: 1,
            name: "index".into(),
            contribution,
            min_return: min,
            max_return: max,
            compounding: Compounding::Monthly,
            start_date: day(start),
            end_date: None,
            status: PlanStatus::Active,
        }
    }

    fn goal(target: Decimal, date: &str, ret: Decimal, c: Compounding) -> Goal {
        Goal {
            id: 1,
            user_id: 1,
            name: "house".into(),
            target_amount: target,
            target_date: day(date),
            annual_return: ret,
            compounding: c,
        }
    }

    #[test]
    fn twelve_months_at_twelve_percent() {
        let p = plan(dec!(10000), dec!(12), dec!(12), "2024-06-10");
        let v = project_plan(&p, MonthKey::of(day("2025-06-10")));
        assert_eq!(v.min, v.max);
        assert_eq!(v.min.round(), dec!(128093));
    }

    #[test]
    fn zero_rate_is_plain_sum() {
        let p = plan(dec!(250), dec!(0), dec!(0), "2024-01-01");
        for n in 0..30u32 {
            let at = month_after("2024-01", n);
            let v = project_plan(&p, at);
            assert_eq!(v.min, dec!(250) * Decimal::from(n));
            assert_eq!(v.max, v.min);
        }
    }

    fn month_after(start: &str, n: u32) -> MonthKey {
        let mut m: MonthKey = start.parse().unwrap();
        for _ in 0..n {
            m = m.succ();
        }
        m
    }

    #[test]
    fn projection_is_monotone_and_ordered() {
        let p = plan(dec!(500), dec!(-2), dec!(14), "2023-03-15");
        let mut prev = Range::ZERO;
        for n in 0..120u32 {
            let v = project_plan(&p, month_after("2023-03", n));
            assert!(v.min >= prev.min, "min dropped at {}", n);
            assert!(v.max >= prev.max, "max dropped at {}", n);
            assert!(v.min <= v.max);
            prev = v;
        }
    }

    #[test]
    fn months_before_start_contribute_nothing() {
        let p = plan(dec!(100), dec!(5), dec!(8), "2025-05-01");
        assert_eq!(project_plan(&p, "2025-01".parse().unwrap()), Range::ZERO);
        assert_eq!(project_plan(&p, "2025-05".parse().unwrap()), Range::ZERO);
    }

    #[test]
    fn zero_contribution_stays_zero_when_growth_overflows() {
        assert!(compound(dec!(0.9), 400).is_none());
        assert_eq!(future_value(Decimal::ZERO, dec!(0.9), 400), Decimal::ZERO);
        assert_eq!(grow(Decimal::ZERO, dec!(0.9), 400), Decimal::ZERO);

        let p = plan(Decimal::ZERO, dec!(0), dec!(1000), "1990-01-01");
        assert_eq!(project_plan(&p, "2025-01".parse().unwrap()), Range::ZERO);
    }

    #[test]
    fn ended_plan_stops_contributing_but_keeps_growing() {
        let mut p = plan(dec!(100), dec!(0), dec!(12), "2025-01-01");
        p.end_date = Some(day("2025-07-01"));
        let at_end = project_plan(&p, "2025-07".parse().unwrap());
        let later = project_plan(&p, "2026-01".parse().unwrap());
        assert_eq!(at_end.min, dec!(600));
        assert_eq!(later.min, dec!(600));
        assert!(later.max > at_end.max);
        let expected = at_end.max * dec!(1.01).powu(6);
        assert!((later.max - expected).abs() < dec!(0.0001));
    }

    #[test]
    fn sip_for_sixty_month_goal() {
        let g = goal(dec!(1000000), "2030-01-15", dec!(10), Compounding::Monthly);
        let sip = required_contribution(&g, day("2025-01-15")).unwrap();
        assert_eq!(sip.periods, 60);
        assert!(sip.contribution > dec!(12800) && sip.contribution < dec!(12914));
        let fv = future_value(sip.contribution, sip.rate, sip.periods);
        assert!(fv >= dec!(1000000));
    }

    #[test]
    fn sip_round_trip_is_tight() {
        let cases = [
            (dec!(250000), "2028-04-01", dec!(7.5), Compounding::Monthly),
            (dec!(90000), "2031-01-01", dec!(6), Compounding::Quarterly),
            (dec!(400000), "2040-06-30", dec!(9), Compounding::Annually),
        ];
        for (target, date, ret, c) in cases {
            let g = goal(target, date, ret, c);
            let sip = required_contribution(&g, day("2025-01-01")).unwrap();
            let hit = future_value(sip.contribution, sip.rate, sip.periods);
            let short = future_value(sip.contribution - Decimal::ONE, sip.rate, sip.periods);
            assert!(hit >= target, "{} fell short: {}", date, hit);
            assert!(short < target, "{} one unit less still reached", date);
        }
    }

    #[test]
    fn quarterly_goal_uses_monthly_equivalent_rate() {
        let g = goal(dec!(100000), "2030-01-01", dec!(12), Compounding::Quarterly);
        let sip = required_contribution(&g, day("2025-01-01")).unwrap();
        assert_eq!(sip.periods, 20);
        assert_eq!(sip.rate, dec!(0.01));
        let hit = future_value(sip.contribution, sip.rate, sip.periods);
        assert!(hit >= dec!(100000));
        assert!(future_value(sip.contribution - Decimal::ONE, sip.rate, sip.periods) < dec!(100000));
    }

    #[test]
    fn zero_return_goal_divides_evenly() {
        let g = goal(dec!(1200), "2026-01-01", dec!(0), Compounding::Monthly);
        let sip = required_contribution(&g, day("2025-01-01")).unwrap();
        assert_eq!(sip.periods, 12);
        assert_eq!(sip.contribution, dec!(100));
    }

    #[test]
    fn past_target_is_rejected() {
        let g = goal(dec!(1000), "2024-12-31", dec!(5), Compounding::Monthly);
        let err = required_contribution(&g, day("2025-01-01")).unwrap_err();
        assert!(matches!(err, NestError::Validation(_)));
    }

    #[test]
    fn sub_period_horizon_has_no_plan() {
        let g = goal(dec!(1000), "2025-01-28", dec!(5), Compounding::Monthly);
        let err = required_contribution(&g, day("2025-01-01")).unwrap_err();
        assert!(matches!(err, NestError::NoValidPlan(_)));

        let q = goal(dec!(1000), "2025-03-10", dec!(5), Compounding::Quarterly);
        let err = required_contribution(&q, day("2025-01-01")).unwrap_err();
        assert!(matches!(err, NestError::NoValidPlan(_)));
    }
}
