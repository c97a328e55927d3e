// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn with_json(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and browse transactions")
        .subcommand(
            Command::new("add")
                .about("Add a transaction")
                .arg(req("amount", "Non-negative amount"))
                .arg(req("merchant", "Merchant or payer"))
                .arg(req("category", "Category (shopping, groceries, food, income, other, ...)"))
                .arg(opt("type", "income|expense").default_value("expense"))
                .arg(opt("date", "YYYY-MM-DD (default: today)"))
                .arg(opt("status", "pending|confirmed").default_value("confirmed"))
                .arg(opt("source", "whatsapp|manual|import").default_value("manual"))
                .arg(opt("note", "Free-form insight text"))
                .arg(opt("image-url", "Receipt image URL")),
        )
        .subcommand(with_json(
            Command::new("list")
                .about("List transactions, newest first")
                .arg(opt("search", "Match merchant or category, case-insensitive"))
                .arg(opt("type", "income|expense|all").default_value("all"))
                .arg(opt("status", "pending|confirmed|all").default_value("all"))
                .arg(opt("category", "Category or all").default_value("all"))
                .arg(
                    opt("limit", "Show at most N rows")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("grouped")
                        .long("grouped")
                        .action(ArgAction::SetTrue)
                        .help("Group by date"),
                ),
        ))
        .subcommand(with_json(
            Command::new("show")
                .about("Show one transaction")
                .arg(req("id", "Transaction id")),
        ))
        .subcommand(
            Command::new("edit")
                .about("Edit a transaction")
                .arg(req("id", "Transaction id"))
                .arg(opt("amount", "Non-negative amount"))
                .arg(opt("merchant", "Merchant or payer"))
                .arg(opt("category", "Category"))
                .arg(opt("type", "income|expense"))
                .arg(opt("date", "YYYY-MM-DD"))
                .arg(opt("note", "Free-form insight text")),
        )
        .subcommand(
            Command::new("confirm")
                .about("Confirm a pending transaction")
                .arg(req("id", "Transaction id")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a transaction")
                .arg(req("id", "Transaction id")),
        )
        .subcommand(with_json(
            Command::new("categories").about("Categories present in transactions"),
        ))
}

fn account_cmd() -> Command {
    Command::new("account")
        .about("Manage accounts")
        .subcommand(
            Command::new("add")
                .about("Add an account")
                .arg(req("name", "Account name"))
                .arg(opt("type", "checking|savings|credit|investment|cash").default_value("checking"))
                .arg(req("balance", "Balance; negative for liabilities").allow_hyphen_values(true))
                .arg(req("institution", "Bank or broker"))
                .arg(opt("number", "Account number; only the last four digits are kept")),
        )
        .subcommand(
            Command::new("edit")
                .about("Edit an account")
                .arg(req("id", "Account id"))
                .arg(opt("name", "Account name"))
                .arg(opt("type", "checking|savings|credit|investment|cash"))
                .arg(opt("balance", "Balance").allow_hyphen_values(true))
                .arg(opt("institution", "Bank or broker"))
                .arg(opt("number", "Account number")),
        )
        .subcommand(with_json(Command::new("list").about("List accounts with totals")))
        .subcommand(
            Command::new("rm")
                .about("Delete an account")
                .arg(req("id", "Account id")),
        )
}

fn goal_cmd() -> Command {
    Command::new("goal")
        .about("Savings goals")
        .subcommand(
            Command::new("add")
                .about("Add a goal")
                .arg(req("name", "Goal name"))
                .arg(req("target", "Target amount, greater than zero"))
                .arg(opt("current", "Amount saved so far").default_value("0"))
                .arg(req("deadline", "YYYY-MM-DD"))
                .arg(opt("icon", "Icon tag").default_value("target"))
                .arg(opt("color", "Color tag").default_value("emerald")),
        )
        .subcommand(
            Command::new("edit")
                .about("Edit a goal")
                .arg(req("id", "Goal id"))
                .arg(opt("name", "Goal name"))
                .arg(opt("target", "Target amount"))
                .arg(opt("current", "Amount saved"))
                .arg(opt("deadline", "YYYY-MM-DD"))
                .arg(opt("icon", "Icon tag"))
                .arg(opt("color", "Color tag")),
        )
        .subcommand(
            Command::new("fund")
                .about("Add money to a goal, capped at its target")
                .arg(req("id", "Goal id"))
                .arg(req("amount", "Non-negative amount")),
        )
        .subcommand(with_json(Command::new("list").about("List goals with progress")))
        .subcommand(
            Command::new("rm")
                .about("Delete a goal")
                .arg(req("id", "Goal id")),
        )
}

fn trade_side(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(req("holding", "Holding id"))
        .arg(req("quantity", "Quantity, greater than zero"))
        .arg(req("price", "Per-unit price"))
        .arg(opt("date", "YYYY-MM-DD (default: today)"))
}

fn portfolio_cmd() -> Command {
    Command::new("portfolio")
        .about("Holdings, trades, and performance")
        .subcommand(with_json(Command::new("holdings").about("Holdings with gain/loss")))
        .subcommand(
            Command::new("add-holding")
                .about("Add a holding")
                .arg(req("symbol", "Ticker symbol"))
                .arg(req("name", "Display name"))
                .arg(opt("type", "stock|crypto|etf|cash").default_value("stock"))
                .arg(req("quantity", "Quantity"))
                .arg(req("price", "Current price"))
                .arg(req("cost", "Per-unit cost basis"))
                .arg(opt("change", "24h change in percent").default_value("0").allow_hyphen_values(true)),
        )
        .subcommand(
            Command::new("price")
                .about("Update a holding's current price")
                .arg(req("id", "Holding id"))
                .arg(req("price", "New price"))
                .arg(opt("change", "24h change in percent").allow_hyphen_values(true)),
        )
        .subcommand(
            Command::new("rm-holding")
                .about("Delete a holding")
                .arg(req("id", "Holding id")),
        )
        .subcommand(
            Command::new("trade")
                .about("Record a trade")
                .subcommand(trade_side("buy", "Record a purchase"))
                .subcommand(trade_side("sell", "Record a sale")),
        )
        .subcommand(with_json(Command::new("trades").about("Trade history")))
        .subcommand(
            Command::new("rm-trade")
                .about("Delete a trade")
                .arg(req("id", "Trade id")),
        )
        .subcommand(with_json(Command::new("allocation").about("Value by asset type")))
        .subcommand(with_json(
            Command::new("history")
                .about("Portfolio value over time")
                .arg(opt("range", "1W|1M|3M|1Y|ALL").default_value("ALL")),
        ))
        .subcommand(
            Command::new("snapshot")
                .about("Append today's portfolio value to the history")
                .arg(opt("date", "YYYY-MM-DD (default: today)")),
        )
}

pub fn build_cli() -> Command {
    Command::new("tracker")
        .version(crate_version!())
        .about("Personal finance command center: net worth, cash flow, goals, portfolio")
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(Command::new("reset").about("Replace all records with the demo data"))
        .subcommand(with_json(
            Command::new("dashboard")
                .about("Net worth, monthly pulse, and inbox")
                .arg(opt("month", "YYYY-MM (default: configured or current month)")),
        ))
        .subcommand(tx_cmd())
        .subcommand(account_cmd())
        .subcommand(goal_cmd())
        .subcommand(portfolio_cmd())
        .subcommand(
            Command::new("import")
                .about("Import records")
                .subcommand(
                    Command::new("transactions")
                        .about("Import transactions from CSV")
                        .arg(req("path", "CSV file: date,merchant,amount,type,category,status")),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export records")
                .subcommand(
                    Command::new("transactions")
                        .about("Export transactions")
                        .arg(opt("format", "csv|json").default_value("csv"))
                        .arg(req("out", "Output path")),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Display settings")
                .subcommand(Command::new("show").about("Show settings"))
                .subcommand(
                    Command::new("set-currency")
                        .about("Set the display currency")
                        .arg(Arg::new("currency").required(true)),
                )
                .subcommand(
                    Command::new("set-month")
                        .about("Pin the reference month for reports")
                        .arg(Arg::new("month").required(true)),
                )
                .subcommand(Command::new("clear-month").about("Follow the current month again")),
        )
        .subcommand(Command::new("doctor").about("Check stored records for inconsistencies"))
}
