// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{EntryKind, Recurrence, TemplatePayload};
use crate::scheduler::{self, RunReport};
use crate::store;
use crate::utils::{
    current_user, maybe_print_json, parse_date, parse_decimal, pretty_table, today,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("run", sub)) => {
            let report = run(conn, sub)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
                let noun = if report.created_count == 1 { "entry" } else { "entries" };
                println!("Created {} {}", report.created_count, noun);
                let rows: Vec<Vec<String>> = report
                    .created
                    .iter()
                    .map(|e| {
                        vec![
                            e.date.to_string(),
                            e.kind.to_string(),
                            format!("{:.2}", e.amount),
                            e.category.clone(),
                            e.template_id.map(|t| t.to_string()).unwrap_or_default(),
                        ]
                    })
                    .collect();
                if !rows.is_empty() {
                    println!(
                        "{}",
                        pretty_table(&["Date", "Kind", "Amount", "Category", "Template"], rows)
                    );
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn, sub)?;
    let payload = TemplatePayload {
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        category: sub.get_one::<String>("category").unwrap().trim().to_string(),
        kind: sub.get_one::<String>("kind").unwrap().parse::<EntryKind>()?,
        description: sub
            .get_one::<String>("description")
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    };
    let frequency: Recurrence = sub.get_one::<String>("frequency").unwrap().parse()?;
    let next_due = parse_date(sub.get_one::<String>("next-due").unwrap())?;
    let t = store::insert_template(conn, user.id, &payload, frequency, next_due)?;
    println!(
        "Added {} template #{}: {} {} ({}) next due {}",
        t.frequency, t.id, payload.kind, payload.amount, payload.category, t.next_due
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn, sub)?;
    let templates = store::load_templates(conn, user.id)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &templates)? {
        return Ok(());
    }
    let rows = templates
        .iter()
        .map(|t| {
            let summary = match TemplatePayload::decode(t.id, &t.payload) {
                Ok(p) => format!("{} {:.2} {} {}", p.kind, p.amount, p.category, p.description),
                Err(_) => "(malformed payload)".to_string(),
            };
            vec![
                t.id.to_string(),
                t.frequency.to_string(),
                t.next_due.to_string(),
                if t.active { "yes" } else { "no" }.to_string(),
                summary,
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["ID", "Frequency", "Next due", "Active", "Payload"], rows)
    );
    Ok(())
}

/// Processes every due template of the acting user as of `--today`.
pub fn run(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<RunReport> {
    let user = current_user(conn, sub)?;
    let now = today(sub)?;
    Ok(scheduler::run_due(conn, user.id, now)?)
}
