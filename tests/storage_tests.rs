// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use nestegg::models::{Compounding, InvestmentPlan, PlanStatus};
use nestegg::{cli, commands::doctor, db, store};
use rusqlite::{params, Connection};
use rust_decimal_macros::dec;
use tempfile::tempdir;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn schema_init_is_idempotent_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nestegg.sqlite");
    {
        let conn = Connection::open(&path).unwrap();
        db::init_schema(&conn).unwrap();
        store::add_user(&conn, "alice").unwrap();
    }
    let conn = Connection::open(&path).unwrap();
    db::init_schema(&conn).unwrap();
    assert!(store::find_user(&conn, "alice").unwrap().is_some());
}

#[test]
fn plan_round_trips_and_validates_bounds() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let uid = store::add_user(&conn, "alice").unwrap().id;
    let mut plan = InvestmentPlan {
        id: 0,
        user_id: uid,
        name: "Bonds".into(),
        contribution: dec!(250.50),
        min_return: dec!(3),
        max_return: dec!(5.5),
        compounding: Compounding::Quarterly,
        start_date: day("2024-01-10"),
        end_date: Some(day("2027-01-10")),
        status: PlanStatus::Active,
    };
    let saved = store::insert_plan(&conn, &plan).unwrap();
    let loaded = store::load_active_plans(&conn, uid).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, saved.id);
    assert_eq!(loaded[0].contribution, dec!(250.50));
    assert_eq!(loaded[0].end_date, Some(day("2027-01-10")));

    plan.min_return = dec!(9);
    assert!(store::insert_plan(&conn, &plan).is_err());
    plan.min_return = dec!(1);
    plan.contribution = dec!(-1);
    assert!(store::insert_plan(&conn, &plan).is_err());
}

#[test]
fn investment_entries_belong_to_the_plan_owner() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let alice = store::add_user(&conn, "alice").unwrap().id;
    let bob = store::add_user(&conn, "bob").unwrap().id;
    conn.execute(
        "INSERT INTO investment_plans(user_id, name, contribution, min_return, max_return, compounding, start_date)
         VALUES (?1, 'P', '100', '1', '2', 'monthly', '2025-01-01')",
        params![alice],
    )
    .unwrap();
    let plan_id = conn.last_insert_rowid();

    let month = "2025-02".parse().unwrap();
    assert!(store::insert_investment_entry(&conn, bob, plan_id, month, dec!(10)).is_err());
    store::insert_investment_entry(&conn, alice, plan_id, month, dec!(10)).unwrap();
    assert_eq!(store::load_investment_ledger(&conn, alice).unwrap().len(), 1);
    assert!(store::load_investment_ledger(&conn, bob).unwrap().is_empty());
}

#[test]
fn doctor_flags_bad_templates_and_stale_goals() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let uid = store::add_user(&conn, "alice").unwrap().id;
    conn.execute(
        "INSERT INTO recurring_templates(user_id, payload, frequency, next_due) VALUES (?1, 'not json', 'monthly', '2025-01-01')",
        params![uid],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO recurring_templates(user_id, payload, frequency, next_due) VALUES (?1, '{\"amount\":\"5\",\"category\":\"Gym\",\"kind\":\"expense\",\"description\":\"\"}', 'weekly', '2025-01-01')",
        params![uid],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO goals(user_id, name, target_amount, target_date, annual_return, compounding) VALUES (?1, 'Old', '100', '2024-06-01', '5', 'monthly')",
        params![uid],
    )
    .unwrap();

    let matches = cli::build_cli().get_matches_from([
        "nestegg", "--user", "alice", "--today", "2025-02-01", "doctor",
    ]);
    let Some(("doctor", sub)) = matches.subcommand() else {
        panic!("doctor command not parsed");
    };
    let issues: Vec<String> = doctor::findings(&conn, sub)
        .unwrap()
        .into_iter()
        .map(|r| r[0].clone())
        .collect();
    assert_eq!(issues, ["malformed_template", "template_behind", "goal_past_due"]);
}
