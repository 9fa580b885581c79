// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{pretty_table, set_setting, BASE_CURRENCY_KEY, DEFAULT_USER_KEY};
use anyhow::{anyhow, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap().trim();
            match key {
                DEFAULT_USER_KEY => {
                    if store::find_user(conn, value)?.is_none() {
                        return Err(anyhow!("User '{}' not found", value));
                    }
                    set_setting(conn, key, value)?;
                }
                BASE_CURRENCY_KEY => set_setting(conn, key, &value.to_uppercase())?,
                other => return Err(anyhow!("Unknown setting '{}'", other)),
            }
            println!("Set {}", key);
        }
        Some(("show", _)) => {
            let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
            let rows =
                stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
            let mut data = Vec::new();
            for row in rows {
                let (k, v) = row?;
                data.push(vec![k, v]);
            }
            println!("{}", pretty_table(&["Key", "Value"], data));
        }
        _ => {}
    }
    Ok(())
}
