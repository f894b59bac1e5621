// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, ArgGroup, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn week_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("owner").long("owner").required(true).help("Owner name"))
        .arg(
            Arg::new("start")
                .long("start")
                .required(true)
                .help("Period start, YYYY-MM-DD"),
        )
        .arg(
            Arg::new("end")
                .long("end")
                .required(true)
                .help("Period end, YYYY-MM-DD"),
        )
}

pub fn build_cli() -> Command {
    Command::new("ownercalc")
        .about("Fleet owner settlement periods, deductions and calculation records")
        .version(clap::crate_version!())
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .global(true)
                .help("Backend base URL (overrides config and OWNERCALC_API_URL)"),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .global(true)
                .help("Bearer token (overrides config and OWNERCALC_TOKEN)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging on stderr"),
        )
        .subcommand(json_flags(
            Command::new("periods")
                .about("List an owner's settlement periods, newest first")
                .arg(Arg::new("owner").long("owner").required(true))
                .arg(Arg::new("from").long("from").requires("to"))
                .arg(Arg::new("to").long("to").requires("from"))
                .arg(
                    Arg::new("page")
                        .long("page")
                        .value_parser(value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("page-size")
                        .long("page-size")
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(json_flags(week_args(
            Command::new("view")
                .about("Show one period: totals, revenue units and the week's deductions")
                .arg(
                    Arg::new("id")
                        .long("id")
                        .help("Open a single calculation of the period"),
                ),
        )))
        .subcommand(
            Command::new("deductions")
                .about("Deductions matched to a week")
                .subcommand(json_flags(week_args(Command::new("list"))))
                .subcommand(week_args(
                    Command::new("rm")
                        .arg(Arg::new("id").long("id").required(true)),
                ))
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("owner-id")
                                .long("owner-id")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("owner")
                                .long("owner")
                                .help("Owner name; the id is taken from their calculations"),
                        )
                        .group(
                            ArgGroup::new("owner-ref")
                                .args(["owner-id", "owner"])
                                .required(true),
                        )
                        .arg(Arg::new("start").long("start").required(true))
                        .arg(Arg::new("end").long("end").required(true))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .allow_hyphen_values(true),
                        )
                        .arg(
                            Arg::new("escrow")
                                .long("escrow")
                                .allow_hyphen_values(true),
                        )
                        .arg(Arg::new("truck").long("truck"))
                        .arg(Arg::new("note").long("note")),
                ),
        )
        .subcommand(
            Command::new("units")
                .about("Calculation units")
                .subcommand(
                    Command::new("rm").arg(Arg::new("id").long("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("calc")
                .about("Create and edit owner calculations")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("owner").long("owner").required(true))
                        .arg(Arg::new("start").long("start").required(true))
                        .arg(Arg::new("end").long("end").required(true))
                        .arg(
                            Arg::new("unit")
                                .long("unit")
                                .action(ArgAction::Append)
                                .help("Calculation unit id; repeatable"),
                        )
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(Arg::new("owner").long("owner"))
                        .arg(Arg::new("start").long("start"))
                        .arg(Arg::new("end").long("end"))
                        .arg(Arg::new("unit").long("unit").action(ArgAction::Append))
                        .arg(Arg::new("note").long("note")),
                ),
        )
        .subcommand(
            Command::new("trucks")
                .about("Fleet trucks")
                .subcommand(json_flags(Command::new("list"))),
        )
        .subcommand(
            Command::new("export")
                .about("Export a week's deductions")
                .subcommand(week_args(
                    Command::new("deductions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .value_parser(["csv", "json"])
                                .default_value("csv"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                )),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change saved settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("key")
                                .required(true)
                                .value_parser(["api-url", "token", "page-size"]),
                        )
                        .arg(Arg::new("value").required(true)),
                ),
        )
}
