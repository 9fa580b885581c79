// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::buckets::MonthKey;
use crate::growth::project_plan;
use crate::models::{Compounding, InvestmentPlan, PlanStatus};
use crate::store;
use crate::utils::{
    current_user, maybe_print_json, parse_date, parse_decimal, pretty_table, today,
};
use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("status", sub)) => status(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn, sub)?;
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let contribution = parse_decimal(sub.get_one::<String>("contribution").unwrap())?;
    let min_return = parse_decimal(sub.get_one::<String>("min-return").unwrap())?;
    let max_return = parse_decimal(sub.get_one::<String>("max-return").unwrap())?;
    let compounding: Compounding = sub.get_one::<String>("compounding").unwrap().parse()?;
    let start_date = parse_date(sub.get_one::<String>("start").unwrap())?;
    let end_date = sub
        .get_one::<String>("end")
        .map(|s| parse_date(s))
        .transpose()?;

    let plan = store::insert_plan(
        conn,
        &InvestmentPlan {
            id: 0,
            user_id: user.id,
            name,
            contribution,
            min_return,
            max_return,
            compounding,
            start_date,
            end_date,
            status: PlanStatus::Active,
        },
    )?;
    println!(
        "Added plan #{} '{}': {} {} at {}%..{}% from {}",
        plan.id,
        plan.name,
        plan.contribution,
        plan.compounding,
        plan.min_return,
        plan.max_return,
        plan.start_date
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = current_user(conn, sub)?;
    let now = MonthKey::of(today(sub)?);
    let plans = store::load_plans(conn, user.id)?;
    if maybe_print_json(json_flag, jsonl_flag, &plans)? {
        return Ok(());
    }
    let rows = plans
        .iter()
        .map(|p| {
            let value = project_plan(p, now);
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.status.to_string(),
                format!("{:.2}", p.contribution),
                format!("{}% .. {}%", p.min_return, p.max_return),
                p.start_date.to_string(),
                p.end_date.map(|d| d.to_string()).unwrap_or_default(),
                format!("{:.2} .. {:.2}", value.min, value.max),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Name", "Status", "Contribution", "Return", "Start", "End", "Value now"],
            rows,
        )
    );
    Ok(())
}

fn status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn, sub)?;
    let raw = sub.get_one::<String>("id").unwrap();
    let id = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid plan id '{}'", raw.trim()))?;
    let status: PlanStatus = sub.get_one::<String>("status").unwrap().parse()?;
    if !store::set_plan_status(conn, user.id, id, status)? {
        return Err(anyhow!("Plan {} not found", id));
    }
    println!("Plan {} is now {}", id, status);
    Ok(())
}
