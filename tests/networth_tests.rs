// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use nestegg::error::NestError;
use nestegg::{cli, commands::networth, commands::plans, db, store};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    let uid = store::add_user(&conn, "alice").unwrap().id;
    for (date, kind, amount) in [
        ("2024-10-05", "income", "6000"),
        ("2024-10-07", "expense", "2500.25"),
        ("2024-12-01", "investment_outflow", "10000"),
        ("2025-01-15", "transfer", "400"),
        ("2025-02-01", "income", "6000"),
    ] {
        conn.execute(
            "INSERT INTO ledger_entries(user_id, date, kind, amount, category) VALUES (?1,?2,?3,?4,'misc')",
            params![uid, date, kind, amount],
        )
        .unwrap();
    }
    conn.execute(
        "INSERT INTO investment_plans(user_id, name, contribution, min_return, max_return, compounding, start_date, status)
         VALUES (?1, 'Index SIP', '10000', '12', '12', 'monthly', '2024-03-05', 'active')",
        params![uid],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO investment_plans(user_id, name, contribution, min_return, max_return, compounding, start_date, status)
         VALUES (?1, 'Old', '999', '1', '2', 'monthly', '2020-01-01', 'archived')",
        params![uid],
    )
    .unwrap();
    conn
}

fn compute(conn: &Connection, args: &[&str]) -> anyhow::Result<Vec<nestegg::timeline::NetWorthPoint>> {
    let mut argv = vec!["nestegg"];
    argv.extend_from_slice(args);
    argv.push("networth");
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("networth", sub)) => networth::compute(conn, sub),
        _ => panic!("networth command not parsed"),
    }
}

#[test]
fn timeline_spans_first_entry_to_today() {
    let conn = setup();
    let out = compute(&conn, &["--user", "alice", "--today", "2025-03-05"]).unwrap();
    let months: Vec<String> = out.iter().map(|p| p.month.to_string()).collect();
    assert_eq!(
        months,
        ["2024-10", "2024-11", "2024-12", "2025-01", "2025-02", "2025-03"]
    );
    let last = out.last().unwrap();
    assert_eq!(last.cash, dec!(6000) - dec!(2500.25) - dec!(10000) + dec!(6000));
    // Plan started 2024-03, twelve months before 2025-03
    assert_eq!(last.investments_min.round(), dec!(128093));
    assert_eq!(last.investments_min, last.investments_max);
    assert_eq!(last.net_worth_min, last.cash + last.investments_min);
}

#[test]
fn json_uses_wire_names() {
    let conn = setup();
    let out = compute(&conn, &["--user", "alice", "--today", "2024-11-20"]).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    let first = &json[0];
    assert_eq!(first["month"], "2024-10");
    for key in ["cash", "investmentsMin", "investmentsMax", "netWorthMin", "netWorthMax", "invested"] {
        assert!(first.get(key).is_some(), "missing {}", key);
    }
}

#[test]
fn paused_plan_drops_out_of_projection() {
    let conn = setup();
    let before = compute(&conn, &["--user", "alice", "--today", "2025-03-05"]).unwrap();
    assert!(before.last().unwrap().investments_max > Decimal::ZERO);

    let matches = cli::build_cli().get_matches_from([
        "nestegg", "--user", "alice", "plan", "status", "--id", " 1 ", "--status", "paused",
    ]);
    if let Some(("plan", plan_m)) = matches.subcommand() {
        plans::handle(&conn, plan_m).unwrap();
    } else {
        panic!("plan command not parsed");
    }

    let after = compute(&conn, &["--user", "alice", "--today", "2025-03-05"]).unwrap();
    assert!(after.iter().all(|p| p.investments_max.is_zero()));
    assert!(after.iter().all(|p| p.net_worth_max == p.cash));
}

#[test]
fn unknown_user_is_rejected() {
    let conn = setup();
    let err = compute(&conn, &["--user", "mallory"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<NestError>(),
        Some(NestError::Unauthorized(_))
    ));
}

#[test]
fn default_user_setting_is_used_without_flag() {
    let conn = setup();
    let err = compute(&conn, &["--today", "2025-01-01"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<NestError>(),
        Some(NestError::Unauthorized(_))
    ));

    nestegg::utils::set_setting(&conn, nestegg::utils::DEFAULT_USER_KEY, "alice").unwrap();
    let out = compute(&conn, &["--today", "2025-01-01"]).unwrap();
    assert_eq!(out.len(), 4);
}

#[test]
fn new_user_with_no_data_gets_current_month() {
    let conn = setup();
    store::add_user(&conn, "bob").unwrap();
    let out = compute(&conn, &["--user", "bob", "--today", "2025-07-04"]).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].month.to_string(), "2025-07");
    assert!(out[0].cash.is_zero());
    assert!(out[0].net_worth_max.is_zero());
}
