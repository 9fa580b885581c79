// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TemplatePayload;
use crate::scheduler::next_occurrence;
use crate::store;
use crate::utils::{current_user, pretty_table, today};
use anyhow::Result;
use rusqlite::Connection;

/// Each finding is `[issue, detail]`.
pub fn findings(conn: &Connection, m: &clap::ArgMatches) -> Result<Vec<Vec<String>>> {
    let user = current_user(conn, m)?;
    let now = today(m)?;
    let mut rows = Vec::new();

    // 1) Templates the scheduler will skip, or that need several runs to catch up
    for t in store::load_templates(conn, user.id)? {
        if let Err(e) = TemplatePayload::decode(t.id, &t.payload) {
            rows.push(vec!["malformed_template".into(), e.to_string()]);
            continue;
        }
        if !t.active {
            continue;
        }
        if let Some(next) = next_occurrence(t.next_due, t.frequency) {
            if next <= now {
                rows.push(vec![
                    "template_behind".into(),
                    format!("#{} due {} ({})", t.id, t.next_due, t.frequency),
                ]);
            }
        }
    }

    // 2) Plans whose bounds are inverted
    for p in store::load_plans(conn, user.id)? {
        if p.min_return > p.max_return {
            rows.push(vec![
                "plan_bounds_inverted".into(),
                format!("#{} {}: {}% > {}%", p.id, p.name, p.min_return, p.max_return),
            ]);
        }
    }

    // 3) Goals that can no longer be planned for
    for g in store::load_goals(conn, user.id)? {
        if g.target_date <= now {
            rows.push(vec![
                "goal_past_due".into(),
                format!("#{} {} was due {}", g.id, g.name, g.target_date),
            ]);
        }
    }
    Ok(rows)
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let rows = findings(conn, m)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
