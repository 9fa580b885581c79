// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, Arg, ArgAction, Command};

fn json_flags() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    ]
}

fn required(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

fn optional(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

pub fn build_cli() -> Command {
    Command::new("nestegg")
        .version(crate_version!())
        .about("Net-worth timeline, investment projections, goal SIPs and recurring obligations")
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .env("NESTEGG_USER")
                .help("Acting user (falls back to the default_user setting)"),
        )
        .arg(
            Arg::new("today")
                .long("today")
                .global(true)
                .help("Treat this date (YYYY-MM-DD) as today"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("user")
                .about("Manage users")
                .subcommand(Command::new("add").arg(required("name", "User name")))
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("config")
                .about("Read and write settings")
                .subcommand(
                    Command::new("set")
                        .arg(required("key", "default_user | base_currency"))
                        .arg(required("value", "Setting value")),
                )
                .subcommand(Command::new("show")),
        )
        .subcommand(
            Command::new("tx")
                .about("Ledger entries")
                .subcommand(
                    Command::new("add")
                        .arg(required("date", "YYYY-MM-DD"))
                        .arg(required("kind", "income | expense | investment_outflow | transfer"))
                        .arg(required("amount", "Positive amount"))
                        .arg(required("category", "Category label"))
                        .arg(optional("description", "Free text")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(optional("month", "YYYY-MM"))
                        .arg(optional("kind", "Filter by kind"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(clap::value_parser!(usize)),
                        )
                        .args(json_flags()),
                ),
        )
        .subcommand(
            Command::new("plan")
                .about("Investment plans")
                .subcommand(
                    Command::new("add")
                        .arg(required("name", "Plan name"))
                        .arg(required("contribution", "Periodic contribution"))
                        .arg(required("min-return", "Minimum expected annual return, percent"))
                        .arg(required("max-return", "Maximum expected annual return, percent"))
                        .arg(
                            optional("compounding", "monthly | quarterly | annually")
                                .default_value("monthly"),
                        )
                        .arg(required("start", "Start date YYYY-MM-DD"))
                        .arg(optional("end", "End date YYYY-MM-DD")),
                )
                .subcommand(Command::new("list").args(json_flags()))
                .subcommand(
                    Command::new("status")
                        .arg(required("id", "Plan id"))
                        .arg(required("status", "active | paused | archived")),
                ),
        )
        .subcommand(
            Command::new("invest")
                .about("Realized investment contributions")
                .subcommand(
                    Command::new("add")
                        .arg(required("plan", "Plan id"))
                        .arg(required("month", "YYYY-MM"))
                        .arg(required("amount", "Amount contributed")),
                )
                .subcommand(Command::new("list").args(json_flags())),
        )
        .subcommand(
            Command::new("goal")
                .about("Savings goals")
                .subcommand(
                    Command::new("add")
                        .arg(required("name", "Goal name"))
                        .arg(required("target", "Target amount"))
                        .arg(required("date", "Target date YYYY-MM-DD"))
                        .arg(required("return", "Assumed annual return, percent"))
                        .arg(
                            optional("compounding", "monthly | quarterly | annually")
                                .default_value("monthly"),
                        ),
                )
                .subcommand(Command::new("list").args(json_flags()))
                .subcommand(
                    Command::new("sip")
                        .arg(required("id", "Goal id"))
                        .args(json_flags()),
                ),
        )
        .subcommand(
            Command::new("recurring")
                .about("Recurring obligations")
                .subcommand(
                    Command::new("add")
                        .arg(required("kind", "income | expense | investment_outflow | transfer"))
                        .arg(required("amount", "Positive amount"))
                        .arg(required("category", "Category label"))
                        .arg(optional("description", "Free text").default_value(""))
                        .arg(required("frequency", "once | daily | weekly | monthly | yearly"))
                        .arg(required("next-due", "First due date YYYY-MM-DD")),
                )
                .subcommand(Command::new("list").args(json_flags()))
                .subcommand(Command::new("run").args(json_flags())),
        )
        .subcommand(
            Command::new("networth")
                .about("Monthly net-worth timeline with min/max projections")
                .args(json_flags()),
        )
        .subcommand(Command::new("doctor").about("Check stored data for problems"))
}
