// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::timeline::{build_timeline, NetWorthPoint};
use crate::utils::{current_user, maybe_print_json, pretty_table, today};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let data = compute(conn, m)?;
    if !maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|p| {
                vec![
                    p.month.to_string(),
                    format!("{:.2}", p.cash),
                    format!("{:.2}", p.invested),
                    format!("{:.2} .. {:.2}", p.investments_min, p.investments_max),
                    format!("{:.2} .. {:.2}", p.net_worth_min, p.net_worth_max),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Month", "Cash", "Invested", "Investments (min..max)", "Net worth (min..max)"],
                rows,
            )
        );
    }
    Ok(())
}

/// Authenticates, loads the user's ledger, active plans and realized
/// contributions, and builds the monthly timeline.
pub fn compute(conn: &Connection, m: &clap::ArgMatches) -> Result<Vec<NetWorthPoint>> {
    let user = current_user(conn, m)?;
    let now = today(m)?;
    let entries = store::load_ledger(conn, user.id)?;
    let plans = store::load_active_plans(conn, user.id)?;
    let contributions = store::load_investment_ledger(conn, user.id)?;
    Ok(build_timeline(&entries, &plans, &contributions, now))
}
