// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::buckets::MonthKey;
use crate::error::NestError;

/// Declares a closed enum that round-trips through its lowercase name,
/// which is also how it is stored in SQLite and accepted on the CLI.
macro_rules! text_enum {
    ($name:ident, $what:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = NestError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(NestError::Validation(format!(
                        "Unknown {} '{}'",
                        $what, other
                    ))),
                }
            }
        }
    };
}

text_enum!(EntryKind, "transaction kind" {
    Income => "income",
    Expense => "expense",
    InvestmentOutflow => "investment_outflow",
    Transfer => "transfer",
});

text_enum!(PlanStatus, "plan status" {
    Active => "active",
    Paused => "paused",
    Archived => "archived",
});

text_enum!(Compounding, "compounding frequency" {
    Monthly => "monthly",
    Quarterly => "quarterly",
    Annually => "annually",
});

text_enum!(Recurrence, "recurrence frequency" {
    Once => "once",
    Daily => "daily",
    Weekly => "weekly",
    Monthly => "monthly",
    Yearly => "yearly",
});

impl EntryKind {
    /// Sign applied to the amount when folding into cash. Transfers move money
    /// between the user's own accounts and never change net cash.
    pub fn cash_sign(&self) -> Decimal {
        match self {
            EntryKind::Income => Decimal::ONE,
            EntryKind::Expense | EntryKind::InvestmentOutflow => Decimal::NEGATIVE_ONE,
            EntryKind::Transfer => Decimal::ZERO,
        }
    }
}

impl Compounding {
    pub fn months_per_period(&self) -> u32 {
        match self {
            Compounding::Monthly => 1,
            Compounding::Quarterly => 3,
            Compounding::Annually => 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
    pub template_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPlan {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub contribution: Decimal,
    pub min_return: Decimal, // annual, percent
    pub max_return: Decimal, // annual, percent
    pub compounding: Compounding,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: PlanStatus,
}

impl InvestmentPlan {
    pub fn validate(&self) -> Result<(), NestError> {
        if self.contribution < Decimal::ZERO {
            return Err(NestError::Validation(format!(
                "Contribution must not be negative, got {}",
                self.contribution
            )));
        }
        if self.min_return > self.max_return {
            return Err(NestError::Validation(format!(
                "Minimum return {}% exceeds maximum return {}%",
                self.min_return, self.max_return
            )));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(NestError::Validation(format!(
                    "End date {} precedes start date {}",
                    end, self.start_date
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentLedgerEntry {
    pub id: i64,
    pub plan_id: i64,
    pub amount: Decimal,
    pub month: MonthKey,
}

/// What a recurring template turns into when it comes due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplatePayload {
    pub amount: Decimal,
    pub category: String,
    pub kind: EntryKind,
    pub description: String,
}

impl TemplatePayload {
    pub fn validate(&self) -> Result<(), NestError> {
        if self.amount <= Decimal::ZERO {
            return Err(NestError::Validation(format!(
                "Amount must be positive, got {}",
                self.amount
            )));
        }
        if self.category.trim().is_empty() {
            return Err(NestError::Validation("Category must not be empty".into()));
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<String, NestError> {
        serde_json::to_string(self).map_err(|e| NestError::Decode(e.to_string()))
    }

    pub fn decode(template_id: i64, raw: &str) -> Result<Self, NestError> {
        let payload: TemplatePayload =
            serde_json::from_str(raw).map_err(|e| NestError::MalformedPayload {
                template_id,
                reason: e.to_string(),
            })?;
        payload
            .validate()
            .map_err(|e| NestError::MalformedPayload {
                template_id,
                reason: e.to_string(),
            })?;
        Ok(payload)
    }
}

/// A stored template. The payload stays raw until processing, since rows may
/// have been written by something other than this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTemplate {
    pub id: i64,
    pub user_id: i64,
    pub payload: String,
    pub frequency: Recurrence,
    pub next_due: NaiveDate,
    pub active: bool,
    pub version: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub target_amount: Decimal,
    pub target_date: NaiveDate,
    pub annual_return: Decimal, // percent
    pub compounding: Compounding,
}
