// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::open_store;
use crate::metrics::{AccountSummary, account_summary};
use crate::models::{Account, AccountType, mask_account_number};
use crate::utils::{
    fmt_money, get_currency, maybe_print_json, new_id, optional, parse_decimal, pretty_table,
    required, today,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            let mut store = open_store(conn);
            if store.remove_account(id) {
                println!("Removed account '{}'", id);
            } else {
                println!("Account '{}' not found", id);
            }
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?.to_string();
    let typ: AccountType = required(sub, "type")?.parse()?;
    let balance = parse_decimal(required(sub, "balance")?)?;
    let institution = required(sub, "institution")?.to_string();
    let account_number = optional(sub, "number").map(mask_account_number);

    let mut store = open_store(conn);
    let id = new_id("acc", |id| store.account(id).is_some());
    println!("Added account '{}' ({}, {})", name, typ.label(), id);
    store.add_account(Account {
        id,
        name,
        r#type: typ,
        balance,
        institution,
        last_updated: today().to_string(),
        account_number,
    });
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let name = optional(sub, "name").map(str::to_string);
    let typ = optional(sub, "type")
        .map(|s| s.parse::<AccountType>())
        .transpose()?;
    let balance = optional(sub, "balance").map(parse_decimal).transpose()?;
    let institution = optional(sub, "institution").map(str::to_string);
    let number = optional(sub, "number").map(mask_account_number);
    let stamp = today().to_string();

    let mut store = open_store(conn);
    let found = store.update_account(id, |a| {
        if let Some(v) = name {
            a.name = v;
        }
        if let Some(v) = typ {
            a.r#type = v;
        }
        if let Some(v) = balance {
            a.balance = v;
        }
        if let Some(v) = institution {
            a.institution = v;
        }
        if let Some(v) = number {
            a.account_number = Some(v);
        }
        a.last_updated = stamp;
    });
    if found {
        println!("Updated account '{}'", id);
    } else {
        println!("Account '{}' not found", id);
    }
    Ok(())
}

#[derive(Serialize)]
pub struct AccountsReport {
    pub accounts: Vec<Account>,
    pub summary: AccountSummary,
}

pub fn report(conn: &Connection) -> AccountsReport {
    let store = open_store(conn);
    AccountsReport {
        summary: account_summary(store.accounts()),
        accounts: store.accounts().to_vec(),
    }
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let report = report(conn);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let data = report
        .accounts
        .iter()
        .map(|a| {
            vec![
                a.id.clone(),
                a.name.clone(),
                a.r#type.label().to_string(),
                a.institution.clone(),
                a.account_number.clone().unwrap_or_default(),
                fmt_money(&a.balance, &ccy),
                a.last_updated.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Id", "Name", "Type", "Institution", "Number", "Balance", "Updated"],
            data,
        )
    );
    let s = report.summary;
    println!(
        "{}",
        pretty_table(
            &["Assets", "Liabilities", "Net Worth"],
            vec![vec![
                fmt_money(&s.assets, &ccy),
                fmt_money(&s.liabilities, &ccy),
                fmt_money(&s.net_worth, &ccy),
            ]],
        )
    );
    Ok(())
}
