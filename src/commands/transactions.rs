// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::buckets::MonthKey;
use crate::models::{EntryKind, LedgerEntry, User};
use crate::store;
use crate::utils::{
    current_user, maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn, sub)?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let kind: EntryKind = sub.get_one::<String>("kind").unwrap().parse()?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let entry = store::insert_ledger_entry(
        conn,
        &LedgerEntry {
            id: 0,
            user_id: user.id,
            date,
            kind,
            amount,
            category,
            description,
            template_id: None,
        },
    )?;
    println!(
        "Recorded {} {} on {} ({})",
        entry.kind, entry.amount, entry.date, entry.category
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = current_user(conn, sub)?;
    let data = query_rows(conn, &user, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|e| {
                vec![
                    e.date.to_string(),
                    e.kind.to_string(),
                    format!("{:.2}", e.amount),
                    e.category.clone(),
                    e.description.clone().unwrap_or_default(),
                    e.template_id.map(|t| t.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Kind", "Amount", "Category", "Description", "Template"],
                rows,
            )
        );
    }
    Ok(())
}

/// Newest first, filtered by the optional `--month`, `--kind` and `--limit`.
pub fn query_rows(
    conn: &Connection,
    user: &User,
    sub: &clap::ArgMatches,
) -> Result<Vec<LedgerEntry>> {
    let month = sub
        .get_one::<String>("month")
        .map(|s| parse_month(s))
        .transpose()?;
    let kind = sub
        .get_one::<String>("kind")
        .map(|s| s.parse::<EntryKind>())
        .transpose()?;

    let mut data: Vec<LedgerEntry> = store::load_ledger(conn, user.id)?
        .into_iter()
        .filter(|e| month.is_none_or(|m| MonthKey::of(e.date) == m))
        .filter(|e| kind.is_none_or(|k| e.kind == k))
        .collect();
    data.reverse();
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    Ok(data)
}
