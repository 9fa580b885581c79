// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::buckets::{aggregate_cash, MonthKey};
use crate::growth::{project_plan, Range};
use crate::models::{InvestmentLedgerEntry, InvestmentPlan, LedgerEntry, PlanStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthPoint {
    pub month: MonthKey,
    pub cash: Decimal,
    pub investments_min: Decimal,
    pub investments_max: Decimal,
    pub net_worth_min: Decimal,
    pub net_worth_max: Decimal,
    /// Principal actually contributed so far, from the investment ledger.
    pub invested: Decimal,
}

/// Merges cash buckets with active-plan projections. The cash aggregator
/// decides the months; projections are evaluated for exactly those months.
pub fn build_timeline(
    entries: &[LedgerEntry],
    plans: &[InvestmentPlan],
    contributions: &[InvestmentLedgerEntry],
    today: NaiveDate,
) -> Vec<NetWorthPoint> {
    let cash = aggregate_cash(entries, today);
    let active: Vec<&InvestmentPlan> = plans
        .iter()
        .filter(|p| p.status == PlanStatus::Active)
        .collect();

    let mut realized: BTreeMap<MonthKey, Decimal> =
        cash.iter().map(|b| (b.month, Decimal::ZERO)).collect();
    for c in contributions {
        if let Some(sum) = realized.get_mut(&c.month) {
            *sum += c.amount;
        }
    }

    let mut invested = Decimal::ZERO;
    cash.into_iter()
        .map(|bucket| {
            let projected = active
                .iter()
                .map(|p| project_plan(p, bucket.month))
                .fold(Range::ZERO, |acc, r| acc + r);
            invested += realized.get(&bucket.month).copied().unwrap_or_default();
            NetWorthPoint {
                month: bucket.month,
                cash: bucket.cumulative,
                investments_min: projected.min,
                investments_max: projected.max,
                net_worth_min: bucket.cumulative + projected.min,
                net_worth_max: bucket.cumulative + projected.max,
                invested,
            }
        })
        .collect()
}
