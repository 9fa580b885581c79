// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{current_user, maybe_print_json, parse_decimal, parse_month, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user = current_user(conn, sub)?;
            let raw = sub.get_one::<String>("plan").unwrap();
            let plan_id = raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("Invalid plan id '{}'", raw.trim()))?;
            let month = parse_month(sub.get_one::<String>("month").unwrap())?;
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let e = store::insert_investment_entry(conn, user.id, plan_id, month, amount)?;
            println!("Recorded {} into plan {} for {}", e.amount, e.plan_id, e.month);
        }
        Some(("list", sub)) => {
            let user = current_user(conn, sub)?;
            let data = store::load_investment_ledger(conn, user.id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|e| {
                        vec![
                            e.month.to_string(),
                            e.plan_id.to_string(),
                            format!("{:.2}", e.amount),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Month", "Plan", "Amount"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
