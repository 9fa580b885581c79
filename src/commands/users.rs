// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{get_setting, pretty_table, set_setting, DEFAULT_USER_KEY};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let user = store::add_user(conn, name)?;
            // The first user becomes the default so single-user setups need no flags
            if get_setting(conn, DEFAULT_USER_KEY)?.is_none() {
                set_setting(conn, DEFAULT_USER_KEY, &user.name)?;
            }
            println!("Added user '{}'", user.name);
        }
        Some(("list", _)) => {
            let default = get_setting(conn, DEFAULT_USER_KEY)?.unwrap_or_default();
            let data = store::list_users(conn)?
                .into_iter()
                .map(|u| {
                    let mark = if u.name == default { "*" } else { "" };
                    vec![u.id.to_string(), u.name, mark.to_string()]
                })
                .collect();
            println!("{}", pretty_table(&["ID", "Name", "Default"], data));
        }
        _ => {}
    }
    Ok(())
}
