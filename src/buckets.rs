// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::NestError;
use crate::models::LedgerEntry;

/// Calendar month, the unit every series in this crate is keyed by.
/// Field order gives the chronological `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, NestError> {
        if !(1..=12).contains(&month) {
            return Err(NestError::Validation(format!(
                "Invalid month number {}",
                month
            )));
        }
        Ok(MonthKey { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn succ(&self) -> Self {
        if self.month == 12 {
            MonthKey {
                year: self.year + 1,
                month: 1,
            }
        } else {
            MonthKey {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Whole months from `self` to `later` by calendar year/month subtraction,
    /// ignoring the day of month. Zero when `later` is not after `self`.
    pub fn months_until(&self, later: MonthKey) -> u32 {
        let diff = (later.year - self.year) * 12 + later.month as i32 - self.month as i32;
        diff.max(0) as u32
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = NestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let date = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").map_err(|_| {
            NestError::Validation(format!("Invalid month '{}', expected YYYY-MM", s))
        })?;
        Ok(MonthKey::of(date))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = NestError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MonthKey> for String {
    fn from(m: MonthKey) -> String {
        m.to_string()
    }
}

/// Every month from `first` through `last` inclusive, no gaps.
pub fn month_range(first: MonthKey, last: MonthKey) -> Vec<MonthKey> {
    let mut out = Vec::with_capacity(first.months_until(last) as usize + 1);
    let mut cur = first;
    while cur <= last {
        out.push(cur);
        cur = cur.succ();
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashBucket {
    pub month: MonthKey,
    pub delta: Decimal,
    pub cumulative: Decimal,
}

/// Buckets from the month of the earliest entry through the month of `today`,
/// each carrying its net cash delta and the running total.
///
/// With no entries the result is the single bucket for `today`. Entries dated
/// after `today` fall outside the range and are dropped.
pub fn aggregate_cash(entries: &[LedgerEntry], today: NaiveDate) -> Vec<CashBucket> {
    let last = MonthKey::of(today);
    let first = entries
        .iter()
        .map(|e| MonthKey::of(e.date))
        .min()
        .map_or(last, |m| m.min(last));

    let mut deltas: BTreeMap<MonthKey, Decimal> = month_range(first, last)
        .into_iter()
        .map(|m| (m, Decimal::ZERO))
        .collect();

    for e in entries {
        let key = MonthKey::of(e.date);
        match deltas.get_mut(&key) {
            Some(d) => *d += e.amount * e.kind.cash_sign(),
            None => {
                tracing::debug!(entry = e.id, month = %key, "ledger entry outside bucket range")
            }
        }
    }

    let mut running = Decimal::ZERO;
    deltas
        .into_iter()
        .map(|(month, delta)| {
            running += delta;
            CashBucket {
                month,
                delta,
                cumulative: running,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryKind;
    use rust_decimal_macros::dec;

    fn entry(date: &str, kind: EntryKind, amount: Decimal) -> LedgerEntry {
        LedgerEntry {
            id: 0,
            user_id: 1,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            kind,
            amount,
            category: "misc".into(),
            description: None,
            template_id: None,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn months_until_uses_calendar_months() {
        let a = MonthKey::new(2024, 11).unwrap();
        let b = MonthKey::new(2025, 2).unwrap();
        assert_eq!(a.months_until(b), 3);
        assert_eq!(b.months_until(a), 0);
        assert_eq!(a.months_until(a), 0);
    }

    #[test]
    fn month_key_parses_and_displays() {
        let m: MonthKey = " 2025-03 ".parse().unwrap();
        assert_eq!(m.to_string(), "2025-03");
        assert!("2025-13".parse::<MonthKey>().is_err());
        assert!(MonthKey::new(2025, 0).is_err());
    }

    #[test]
    fn empty_ledger_yields_current_month_only() {
        let out = aggregate_cash(&[], day("2025-06-15"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].month.to_string(), "2025-06");
        assert!(out[0].delta.is_zero());
        assert!(out[0].cumulative.is_zero());
    }

    #[test]
    fn buckets_are_contiguous_across_quiet_months() {
        let entries = vec![
            entry("2024-11-20", EntryKind::Income, dec!(100)),
            entry("2025-03-02", EntryKind::Expense, dec!(40)),
        ];
        let out = aggregate_cash(&entries, day("2025-04-01"));
        let months: Vec<String> = out.iter().map(|b| b.month.to_string()).collect();
        assert_eq!(
            months,
            ["2024-11", "2024-12", "2025-01", "2025-02", "2025-03", "2025-04"]
        );
        assert!(out[1].delta.is_zero());
        assert_eq!(out[1].cumulative, dec!(100));
    }

    #[test]
    fn cash_is_conserved_and_transfers_excluded() {
        let entries = vec![
            entry("2025-01-05", EntryKind::Income, dec!(5000)),
            entry("2025-01-06", EntryKind::Expense, dec!(1200.50)),
            entry("2025-02-01", EntryKind::InvestmentOutflow, dec!(1000)),
            entry("2025-02-10", EntryKind::Transfer, dec!(750)),
            entry("2025-03-01", EntryKind::Income, dec!(5000)),
        ];
        let out = aggregate_cash(&entries, day("2025-03-31"));
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].delta, dec!(3799.50));
        assert_eq!(out[1].delta, dec!(-1000));
        assert_eq!(out.last().unwrap().cumulative, dec!(7799.50));
    }

    #[test]
    fn future_dated_entries_are_dropped() {
        let entries = vec![
            entry("2025-01-05", EntryKind::Income, dec!(10)),
            entry("2025-09-05", EntryKind::Income, dec!(99)),
        ];
        let out = aggregate_cash(&entries, day("2025-02-01"));
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].cumulative, dec!(10));
    }
}
