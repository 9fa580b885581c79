// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::NestError;
use crate::growth::{required_contribution, SipPlan};
use crate::models::{Compounding, Goal};
use crate::store;
use crate::utils::{
    current_user, fmt_money, get_base_currency, maybe_print_json, parse_date, parse_decimal,
    pretty_table, today,
};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("sip", sub)) => sip(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn, sub)?;
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let target_amount = parse_decimal(sub.get_one::<String>("target").unwrap())?;
    let target_date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let annual_return = parse_decimal(sub.get_one::<String>("return").unwrap())?;
    let compounding: Compounding = sub.get_one::<String>("compounding").unwrap().parse()?;
    let now = today(sub)?;
    if target_date <= now {
        return Err(NestError::Validation(format!(
            "Target date {} must be after {}",
            target_date, now
        ))
        .into());
    }
    let goal = store::insert_goal(
        conn,
        &Goal {
            id: 0,
            user_id: user.id,
            name,
            target_amount,
            target_date,
            annual_return,
            compounding,
        },
    )?;
    println!(
        "Added goal #{} '{}': {} by {}",
        goal.id, goal.name, goal.target_amount, goal.target_date
    );
    Ok(())
}

/// Outcome of the contribution calculation for one goal. `sip` is absent when
/// no schedule can reach the goal; that is never reported as zero.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalStatus {
    pub goal: Goal,
    pub sip: Option<SipPlan>,
    pub reason: Option<String>,
}

pub fn goal_status(goal: Goal, now: NaiveDate) -> Result<GoalStatus> {
    match required_contribution(&goal, now) {
        Ok(sip) => Ok(GoalStatus {
            goal,
            sip: Some(sip),
            reason: None,
        }),
        Err(e @ (NestError::Validation(_) | NestError::NoValidPlan(_))) => Ok(GoalStatus {
            goal,
            sip: None,
            reason: Some(e.to_string()),
        }),
        Err(e) => Err(e.into()),
    }
}

fn render(status: &GoalStatus, ccy: &str) -> Vec<String> {
    let (contribution, periods) = match &status.sip {
        Some(s) => (
            format!("{} / {}", fmt_money(&s.contribution, ccy), period_label(s.compounding)),
            s.periods.to_string(),
        ),
        None => (
            "no plan possible".to_string(),
            status.reason.clone().unwrap_or_default(),
        ),
    };
    vec![
        status.goal.id.to_string(),
        status.goal.name.clone(),
        format!("{:.2}", status.goal.target_amount),
        status.goal.target_date.to_string(),
        format!("{}%", status.goal.annual_return),
        contribution,
        periods,
    ]
}

fn period_label(c: Compounding) -> &'static str {
    match c {
        Compounding::Monthly => "month",
        Compounding::Quarterly => "quarter",
        Compounding::Annually => "year",
    }
}

const HEADERS: [&str; 7] = ["ID", "Goal", "Target", "By", "Return", "Required", "Periods"];

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn, sub)?;
    let now = today(sub)?;
    let statuses = store::load_goals(conn, user.id)?
        .into_iter()
        .map(|g| goal_status(g, now))
        .collect::<Result<Vec<_>>>()?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &statuses)? {
        let ccy = get_base_currency(conn)?;
        let rows = statuses.iter().map(|s| render(s, &ccy)).collect();
        println!("{}", pretty_table(&HEADERS, rows));
    }
    Ok(())
}

fn sip(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = current_user(conn, sub)?;
    let raw = sub.get_one::<String>("id").unwrap();
    let id = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid goal id '{}'", raw.trim()))?;
    let goal = store::goal_by_id(conn, user.id, id)?
        .ok_or_else(|| anyhow!("Goal {} not found", id))?;
    let status = goal_status(goal, today(sub)?)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &status)? {
        let ccy = get_base_currency(conn)?;
        println!("{}", pretty_table(&HEADERS, vec![render(&status, &ccy)]));
    }
    Ok(())
}
