// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite access for everything the projection and scheduling code reads or
//! writes. Values are stored as TEXT and decoded here, so callers only see
//! typed models.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::buckets::MonthKey;
use crate::error::{NestError, Result};
use crate::models::{
    Goal, InvestmentLedgerEntry, InvestmentPlan, LedgerEntry, PlanStatus, Recurrence,
    RecurringTemplate, TemplatePayload, User,
};

fn date_of(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| NestError::Decode(format!("invalid stored date '{}'", s)))
}

fn decimal_of(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .map_err(|_| NestError::Decode(format!("invalid stored amount '{}'", s)))
}

// ---- users ----

pub fn add_user(conn: &Connection, name: &str) -> Result<User> {
    let name = name.trim();
    if name.is_empty() {
        return Err(NestError::Validation("User name must not be empty".into()));
    }
    conn.execute("INSERT INTO users(name) VALUES (?1)", params![name])?;
    Ok(User {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

pub fn find_user(conn: &Connection, name: &str) -> Result<Option<User>> {
    let user = conn
        .query_row(
            "SELECT id, name FROM users WHERE name=?1",
            params![name.trim()],
            |r| {
                Ok(User {
                    id: r.get(0)?,
                    name: r.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT id, name FROM users ORDER BY name")?;
    let rows = stmt.query_map([], |r| {
        Ok(User {
            id: r.get(0)?,
            name: r.get(1)?,
        })
    })?;
    let users = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

// ---- ledger ----

type LedgerRow = (i64, i64, String, String, String, String, Option<String>, Option<i64>);

fn ledger_from(row: LedgerRow) -> Result<LedgerEntry> {
    let (id, user_id, date, kind, amount, category, description, template_id) = row;
    Ok(LedgerEntry {
        id,
        user_id,
        date: date_of(&date)?,
        kind: kind.parse()?,
        amount: decimal_of(&amount)?,
        category,
        description,
        template_id,
    })
}

const LEDGER_COLUMNS: &str =
    "id, user_id, date, kind, amount, category, description, template_id";

/// All ledger entries of one user in date order.
pub fn load_ledger(conn: &Connection, user_id: i64) -> Result<Vec<LedgerEntry>> {
    let sql = format!(
        "SELECT {} FROM ledger_entries WHERE user_id=?1 ORDER BY date, id",
        LEDGER_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], |r| {
        let row: LedgerRow = (
            r.get(0)?,
            r.get(1)?,
            r.get(2)?,
            r.get(3)?,
            r.get(4)?,
            r.get(5)?,
            r.get(6)?,
            r.get(7)?,
        );
        Ok(row)
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(ledger_from(row?)?);
    }
    Ok(out)
}

/// Inserts `entry` (its `id` is ignored) and returns it with the new id.
pub fn insert_ledger_entry(conn: &Connection, entry: &LedgerEntry) -> Result<LedgerEntry> {
    if entry.amount <= Decimal::ZERO {
        return Err(NestError::Validation(format!(
            "Amount must be positive, got {}",
            entry.amount
        )));
    }
    conn.execute(
        "INSERT INTO ledger_entries(user_id, date, kind, amount, category, description, template_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.user_id,
            entry.date.to_string(),
            entry.kind.as_str(),
            entry.amount.to_string(),
            entry.category,
            entry.description,
            entry.template_id
        ],
    )?;
    Ok(LedgerEntry {
        id: conn.last_insert_rowid(),
        ..entry.clone()
    })
}

// ---- investment plans ----

type PlanRow = (
    i64,
    i64,
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    String,
);

fn plan_from(row: PlanRow) -> Result<InvestmentPlan> {
    let (id, user_id, name, contribution, min_r, max_r, compounding, start, end, status) = row;
    Ok(InvestmentPlan {
        id,
        user_id,
        name,
        contribution: decimal_of(&contribution)?,
        min_return: decimal_of(&min_r)?,
        max_return: decimal_of(&max_r)?,
        compounding: compounding.parse()?,
        start_date: date_of(&start)?,
        end_date: end.as_deref().map(date_of).transpose()?,
        status: status.parse()?,
    })
}

fn query_plans(conn: &Connection, sql: &str, user_id: i64) -> Result<Vec<InvestmentPlan>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![user_id], |r| {
        let row: PlanRow = (
            r.get(0)?,
            r.get(1)?,
            r.get(2)?,
            r.get(3)?,
            r.get(4)?,
            r.get(5)?,
            r.get(6)?,
            r.get(7)?,
            r.get(8)?,
            r.get(9)?,
        );
        Ok(row)
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(plan_from(row?)?);
    }
    Ok(out)
}

pub fn load_plans(conn: &Connection, user_id: i64) -> Result<Vec<InvestmentPlan>> {
    query_plans(
        conn,
        "SELECT id, user_id, name, contribution, min_return, max_return, compounding, start_date, end_date, status
         FROM investment_plans WHERE user_id=?1 ORDER BY start_date, id",
        user_id,
    )
}

pub fn load_active_plans(conn: &Connection, user_id: i64) -> Result<Vec<InvestmentPlan>> {
    query_plans(
        conn,
        "SELECT id, user_id, name, contribution, min_return, max_return, compounding, start_date, end_date, status
         FROM investment_plans WHERE user_id=?1 AND status='active' ORDER BY start_date, id",
        user_id,
    )
}

pub fn insert_plan(conn: &Connection, plan: &InvestmentPlan) -> Result<InvestmentPlan> {
    plan.validate()?;
    conn.execute(
        "INSERT INTO investment_plans(user_id, name, contribution, min_return, max_return, compounding, start_date, end_date, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            plan.user_id,
            plan.name,
            plan.contribution.to_string(),
            plan.min_return.to_string(),
            plan.max_return.to_string(),
            plan.compounding.as_str(),
            plan.start_date.to_string(),
            plan.end_date.map(|d| d.to_string()),
            plan.status.as_str()
        ],
    )?;
    Ok(InvestmentPlan {
        id: conn.last_insert_rowid(),
        ..plan.clone()
    })
}

/// Returns false when no plan with that id belongs to the user.
pub fn set_plan_status(
    conn: &Connection,
    user_id: i64,
    plan_id: i64,
    status: PlanStatus,
) -> Result<bool> {
    let n = conn.execute(
        "UPDATE investment_plans SET status=?1 WHERE id=?2 AND user_id=?3",
        params![status.as_str(), plan_id, user_id],
    )?;
    Ok(n == 1)
}

// ---- investment ledger ----

pub fn load_investment_ledger(
    conn: &Connection,
    user_id: i64,
) -> Result<Vec<InvestmentLedgerEntry>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.plan_id, l.amount, l.month
         FROM investment_ledger l JOIN investment_plans p ON l.plan_id=p.id
         WHERE p.user_id=?1 ORDER BY l.month, l.id",
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, i64>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, plan_id, amount, month) = row?;
        out.push(InvestmentLedgerEntry {
            id,
            plan_id,
            amount: decimal_of(&amount)?,
            month: month
                .parse::<MonthKey>()
                .map_err(|_| NestError::Decode(format!("invalid stored month '{}'", month)))?,
        });
    }
    Ok(out)
}

pub fn insert_investment_entry(
    conn: &Connection,
    user_id: i64,
    plan_id: i64,
    month: MonthKey,
    amount: Decimal,
) -> Result<InvestmentLedgerEntry> {
    if amount <= Decimal::ZERO {
        return Err(NestError::Validation(format!(
            "Amount must be positive, got {}",
            amount
        )));
    }
    let owned: Option<i64> = conn
        .query_row(
            "SELECT id FROM investment_plans WHERE id=?1 AND user_id=?2",
            params![plan_id, user_id],
            |r| r.get(0),
        )
        .optional()?;
    if owned.is_none() {
        return Err(NestError::Validation(format!("Plan {} not found", plan_id)));
    }
    conn.execute(
        "INSERT INTO investment_ledger(plan_id, month, amount) VALUES (?1, ?2, ?3)",
        params![plan_id, month.to_string(), amount.to_string()],
    )?;
    Ok(InvestmentLedgerEntry {
        id: conn.last_insert_rowid(),
        plan_id,
        amount,
        month,
    })
}

// ---- recurring templates ----

type TemplateRow = (i64, i64, String, String, String, bool, i64);

fn template_from(row: TemplateRow) -> Result<RecurringTemplate> {
    let (id, user_id, payload, frequency, next_due, active, version) = row;
    Ok(RecurringTemplate {
        id,
        user_id,
        payload,
        frequency: frequency.parse()?,
        next_due: date_of(&next_due)?,
        active,
        version,
    })
}

/// Rows decode one by one; a row that fails to decode does not hide the rest.
fn query_templates(
    conn: &Connection,
    sql: &str,
    p: impl rusqlite::Params,
) -> Result<Vec<Result<RecurringTemplate>>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(p, |r| {
        let row: TemplateRow = (
            r.get(0)?,
            r.get(1)?,
            r.get(2)?,
            r.get(3)?,
            r.get(4)?,
            r.get(5)?,
            r.get(6)?,
        );
        Ok(row)
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(template_from(row?));
    }
    Ok(out)
}

pub fn load_templates(conn: &Connection, user_id: i64) -> Result<Vec<RecurringTemplate>> {
    query_templates(
        conn,
        "SELECT id, user_id, payload, frequency, next_due, active, version
         FROM recurring_templates WHERE user_id=?1 ORDER BY next_due, id",
        params![user_id],
    )?
    .into_iter()
    .collect()
}

/// Active templates of the user with `next_due <= today`, oldest first.
/// Each row carries its own decode result.
pub fn due_templates(
    conn: &Connection,
    user_id: i64,
    today: NaiveDate,
) -> Result<Vec<Result<RecurringTemplate>>> {
    query_templates(
        conn,
        "SELECT id, user_id, payload, frequency, next_due, active, version
         FROM recurring_templates
         WHERE user_id=?1 AND active=1 AND next_due<=?2
         ORDER BY next_due, id",
        params![user_id, today.to_string()],
    )
}

pub fn insert_template(
    conn: &Connection,
    user_id: i64,
    payload: &TemplatePayload,
    frequency: Recurrence,
    next_due: NaiveDate,
) -> Result<RecurringTemplate> {
    payload.validate()?;
    let raw = payload.encode()?;
    conn.execute(
        "INSERT INTO recurring_templates(user_id, payload, frequency, next_due, active, version)
         VALUES (?1, ?2, ?3, ?4, 1, 0)",
        params![user_id, raw, frequency.as_str(), next_due.to_string()],
    )?;
    Ok(RecurringTemplate {
        id: conn.last_insert_rowid(),
        user_id,
        payload: raw,
        frequency,
        next_due,
        active: true,
        version: 0,
    })
}

/// What happens to a template once its occurrence is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Reschedule(NaiveDate),
    Deactivate,
}

/// Inserts the ledger entry for the template's current occurrence and moves
/// the template on, atomically.
///
/// The update is conditional on the version and due date read earlier. If a
/// concurrent run got there first nothing is written and `Ok(None)` comes back.
pub fn materialize_template(
    conn: &mut Connection,
    template: &RecurringTemplate,
    payload: &TemplatePayload,
    advance: Advance,
) -> Result<Option<LedgerEntry>> {
    let tx = conn.transaction()?;
    let (next_due, active) = match advance {
        Advance::Reschedule(d) => (d, true),
        Advance::Deactivate => (template.next_due, false),
    };
    let claimed = tx.execute(
        "UPDATE recurring_templates SET next_due=?1, active=?2, version=version+1
         WHERE id=?3 AND version=?4 AND next_due=?5 AND active=1",
        params![
            next_due.to_string(),
            active,
            template.id,
            template.version,
            template.next_due.to_string()
        ],
    )?;
    if claimed == 0 {
        tx.rollback()?;
        return Ok(None);
    }
    let entry = insert_ledger_entry(
        &tx,
        &LedgerEntry {
            id: 0,
            user_id: template.user_id,
            date: template.next_due,
            kind: payload.kind,
            amount: payload.amount,
            category: payload.category.clone(),
            description: Some(payload.description.trim().to_string())
                .filter(|d| !d.is_empty()),
            template_id: Some(template.id),
        },
    )?;
    tx.commit()?;
    Ok(Some(entry))
}

// ---- goals ----

type GoalRow = (i64, i64, String, String, String, String, String);

fn goal_from(row: GoalRow) -> Result<Goal> {
    let (id, user_id, name, target, date, ret, compounding) = row;
    Ok(Goal {
        id,
        user_id,
        name,
        target_amount: decimal_of(&target)?,
        target_date: date_of(&date)?,
        annual_return: decimal_of(&ret)?,
        compounding: compounding.parse()?,
    })
}

fn query_goals(conn: &Connection, sql: &str, p: impl rusqlite::Params) -> Result<Vec<Goal>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(p, |r| {
        let row: GoalRow = (
            r.get(0)?,
            r.get(1)?,
            r.get(2)?,
            r.get(3)?,
            r.get(4)?,
            r.get(5)?,
            r.get(6)?,
        );
        Ok(row)
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(goal_from(row?)?);
    }
    Ok(out)
}

pub fn insert_goal(conn: &Connection, goal: &Goal) -> Result<Goal> {
    if goal.target_amount <= Decimal::ZERO {
        return Err(NestError::Validation(format!(
            "Target amount must be positive, got {}",
            goal.target_amount
        )));
    }
    conn.execute(
        "INSERT INTO goals(user_id, name, target_amount, target_date, annual_return, compounding)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            goal.user_id,
            goal.name,
            goal.target_amount.to_string(),
            goal.target_date.to_string(),
            goal.annual_return.to_string(),
            goal.compounding.as_str()
        ],
    )?;
    Ok(Goal {
        id: conn.last_insert_rowid(),
        ..goal.clone()
    })
}

pub fn load_goals(conn: &Connection, user_id: i64) -> Result<Vec<Goal>> {
    query_goals(
        conn,
        "SELECT id, user_id, name, target_amount, target_date, annual_return, compounding
         FROM goals WHERE user_id=?1 ORDER BY target_date, id",
        params![user_id],
    )
}

pub fn goal_by_id(conn: &Connection, user_id: i64, goal_id: i64) -> Result<Option<Goal>> {
    Ok(query_goals(
        conn,
        "SELECT id, user_id, name, target_amount, target_date, annual_return, compounding
         FROM goals WHERE user_id=?1 AND id=?2",
        params![user_id, goal_id],
    )?
    .into_iter()
    .next())
}
