// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Days, Months, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{LedgerEntry, Recurrence, RecurringTemplate, TemplatePayload};
use crate::store::{self, Advance};

/// The occurrence after `due`, or `None` for one-shot templates.
/// Month and year steps clamp to the last valid day (Jan 31 -> Feb 28).
pub fn next_occurrence(due: NaiveDate, frequency: Recurrence) -> Option<NaiveDate> {
    match frequency {
        Recurrence::Once => None,
        Recurrence::Daily => due.checked_add_days(Days::new(1)),
        Recurrence::Weekly => due.checked_add_days(Days::new(7)),
        Recurrence::Monthly => due.checked_add_months(Months::new(1)),
        Recurrence::Yearly => due.checked_add_months(Months::new(12)),
    }
}

fn advance_for(template: &RecurringTemplate) -> Option<Advance> {
    match template.frequency {
        Recurrence::Once => Some(Advance::Deactivate),
        f => next_occurrence(template.next_due, f).map(Advance::Reschedule),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub created_count: usize,
    pub created: Vec<LedgerEntry>,
}

/// Materializes the current occurrence of every due template of `user_id`.
///
/// Each template is handled on its own: an undecodable row or payload, a lost
/// race or a failed write skips that template and the batch carries on. Only
/// the initial selection query can fail the whole run. One occurrence per
/// template per call; a template several periods behind needs several calls.
pub fn run_due(conn: &mut Connection, user_id: i64, today: NaiveDate) -> Result<RunReport> {
    let due = store::due_templates(conn, user_id, today)?;
    let mut created = Vec::new();

    for row in &due {
        let template = match row {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "skipping undecodable recurring template row");
                continue;
            }
        };
        let payload = match TemplatePayload::decode(template.id, &template.payload) {
            Ok(p) => p,
            Err(e) => {
                warn!(template = template.id, error = %e, "skipping recurring template");
                continue;
            }
        };
        let Some(advance) = advance_for(template) else {
            warn!(template = template.id, due = %template.next_due, "next occurrence out of range");
            continue;
        };
        match store::materialize_template(conn, template, &payload, advance) {
            Ok(Some(entry)) => created.push(entry),
            Ok(None) => {
                warn!(template = template.id, "occurrence already taken by another run")
            }
            Err(e) => {
                warn!(template = template.id, error = %e, "failed to materialize template")
            }
        }
    }

    info!(
        user = user_id,
        due = due.len(),
        created = created.len(),
        "recurring run finished"
    );
    Ok(RunReport {
        created_count: created.len(),
        created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn each_frequency_advances_one_unit() {
        let d = day("2025-03-15");
        assert_eq!(next_occurrence(d, Recurrence::Daily), Some(day("2025-03-16")));
        assert_eq!(next_occurrence(d, Recurrence::Weekly), Some(day("2025-03-22")));
        assert_eq!(next_occurrence(d, Recurrence::Monthly), Some(day("2025-04-15")));
        assert_eq!(next_occurrence(d, Recurrence::Yearly), Some(day("2026-03-15")));
        assert_eq!(next_occurrence(d, Recurrence::Once), None);
    }

    #[test]
    fn month_end_dates_clamp() {
        assert_eq!(
            next_occurrence(day("2025-01-31"), Recurrence::Monthly),
            Some(day("2025-02-28"))
        );
        assert_eq!(
            next_occurrence(day("2024-02-29"), Recurrence::Yearly),
            Some(day("2025-02-28"))
        );
        assert_eq!(
            next_occurrence(day("2024-12-31"), Recurrence::Daily),
            Some(day("2025-01-01"))
        );
    }
}
