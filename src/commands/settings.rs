// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::db_path;
use crate::utils::{
    clear_month, get_currency, get_pinned_month, pretty_table, report_month, required,
    set_currency, set_month,
};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => show(conn)?,
        Some(("set-currency", sub)) => {
            let ccy = required(sub, "currency")?;
            if !ccy.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(anyhow!("Currency '{}' must be letters only, e.g. USD", ccy));
            }
            set_currency(conn, ccy)?;
            println!("Currency set to {}", get_currency(conn)?);
        }
        Some(("set-month", sub)) => {
            set_month(conn, required(sub, "month")?)?;
            println!("Reports pinned to {}", report_month(conn)?);
        }
        Some(("clear-month", _)) => {
            clear_month(conn)?;
            println!("Reports follow the current month");
        }
        _ => {}
    }
    Ok(())
}

fn show(conn: &Connection) -> Result<()> {
    let month = match get_pinned_month(conn)? {
        Some(m) => format!("{} (pinned)", m),
        None => format!("{} (current)", report_month(conn)?),
    };
    let rows = vec![
        vec!["Currency".to_string(), get_currency(conn)?],
        vec!["Report month".to_string(), month],
        vec!["Database".to_string(), db_path()?.display().to_string()],
    ];
    println!("{}", pretty_table(&["Setting", "Value"], rows));
    Ok(())
}
