// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::open_store;
use crate::metrics::{group_by_date, total_amount};
use crate::models::{
    Category, Transaction, TransactionSource, TransactionStatus, TransactionType,
};
use crate::query::{TransactionQuery, categories};
use crate::utils::{
    fmt_money, get_currency, maybe_print_json, new_id, optional, parse_amount, parse_date,
    pretty_table, required, today,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("confirm", sub)) => confirm(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("categories", sub)) => list_categories(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Validated transaction from `tx add` arguments. The id is left empty for
/// the caller to assign.
pub fn transaction_from_args(sub: &clap::ArgMatches) -> Result<Transaction> {
    let amount = parse_amount(required(sub, "amount")?)?;
    let merchant = required(sub, "merchant")?.to_string();
    let category: Category = required(sub, "category")?.parse()?;
    let kind: TransactionType = required(sub, "type")?.parse()?;
    let date = match optional(sub, "date") {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    let status: TransactionStatus = required(sub, "status")?.parse()?;
    let source: TransactionSource = required(sub, "source")?.parse()?;
    Ok(Transaction {
        id: String::new(),
        amount,
        merchant,
        category,
        date: date.to_string(),
        status,
        r#type: kind,
        source,
        image_url: optional(sub, "image-url").map(str::to_string),
        ai_insight: optional(sub, "note").map(str::to_string),
    })
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut store = open_store(conn);
    let mut txn = transaction_from_args(sub)?;
    txn.id = new_id("t", |id| store.transaction(id).is_some());
    let ccy = get_currency(conn)?;
    println!(
        "Recorded {} {} at '{}' on {} ({})",
        txn.r#type,
        fmt_money(&txn.amount, &ccy),
        txn.merchant,
        txn.date,
        txn.id
    );
    store.add_transaction(txn);
    Ok(())
}

pub fn build_query(sub: &clap::ArgMatches) -> Result<TransactionQuery> {
    Ok(TransactionQuery {
        search: optional(sub, "search").unwrap_or_default().to_string(),
        kind: required(sub, "type")?.parse()?,
        status: required(sub, "status")?.parse()?,
        category: required(sub, "category")?.parse()?,
    })
}

/// Filtered transactions in store order, truncated to `--limit`.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let store = open_store(conn);
    let query = build_query(sub)?;
    let mut rows = query.apply(store.transactions());
    if let Some(limit) = sub.get_one::<usize>("limit") {
        rows.truncate(*limit);
    }
    Ok(rows)
}

fn row_for(t: &Transaction, ccy: &str) -> Vec<String> {
    let signed = match t.r#type {
        TransactionType::Income => format!("+{}", fmt_money(&t.amount, ccy)),
        TransactionType::Expense => format!("-{}", fmt_money(&t.amount, ccy)),
    };
    vec![
        t.id.clone(),
        t.date.clone(),
        t.merchant.clone(),
        t.category.label().to_string(),
        signed,
        t.status.to_string(),
        t.source.to_string(),
    ]
}

const HEADERS: [&str; 7] = ["Id", "Date", "Merchant", "Category", "Amount", "Status", "Source"];

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let rows = query_rows(conn, sub)?;
    let ccy = get_currency(conn)?;

    if sub.get_flag("grouped") {
        let groups = group_by_date(&rows);
        if !maybe_print_json(json_flag, jsonl_flag, &groups)? {
            for group in groups {
                println!("{} ({})", group.date, group.transactions.len());
                let data = group.transactions.iter().map(|t| row_for(t, &ccy)).collect();
                println!("{}", pretty_table(&HEADERS, data));
            }
        }
        return Ok(());
    }

    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        let data = rows.iter().map(|t| row_for(t, &ccy)).collect();
        println!("{}", pretty_table(&HEADERS, data));
        println!(
            "{} transactions, total {}",
            rows.len(),
            fmt_money(&total_amount(&rows), &ccy)
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = open_store(conn);
    let id = required(sub, "id")?;
    let Some(txn) = store.transaction(id) else {
        println!("Transaction '{}' not found", id);
        return Ok(());
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), txn)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let mut data = vec![
        vec!["Merchant".to_string(), txn.merchant.clone()],
        vec!["Amount".to_string(), fmt_money(&txn.amount, &ccy)],
        vec!["Type".to_string(), txn.r#type.label().to_string()],
        vec!["Category".to_string(), txn.category.label().to_string()],
        vec!["Date".to_string(), txn.date.clone()],
        vec!["Status".to_string(), txn.status.label().to_string()],
        vec!["Source".to_string(), txn.source.label().to_string()],
    ];
    if let Some(url) = &txn.image_url {
        data.push(vec!["Receipt".to_string(), url.clone()]);
    }
    if let Some(insight) = &txn.ai_insight {
        data.push(vec!["Insight".to_string(), insight.clone()]);
    }
    println!("{}", pretty_table(&["Field", "Value"], data));
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut store = open_store(conn);
    let id = required(sub, "id")?;
    let amount = optional(sub, "amount").map(parse_amount).transpose()?;
    let merchant = optional(sub, "merchant").map(str::to_string);
    let category = optional(sub, "category")
        .map(|s| s.parse::<Category>())
        .transpose()?;
    let kind = optional(sub, "type")
        .map(|s| s.parse::<TransactionType>())
        .transpose()?;
    let date = optional(sub, "date").map(parse_date).transpose()?;
    let note = optional(sub, "note").map(str::to_string);

    let found = store.update_transaction(id, |t| {
        if let Some(v) = amount {
            t.amount = v;
        }
        if let Some(v) = merchant {
            t.merchant = v;
        }
        if let Some(v) = category {
            t.category = v;
        }
        if let Some(v) = kind {
            t.r#type = v;
        }
        if let Some(v) = date {
            t.date = v.to_string();
        }
        if let Some(v) = note {
            t.ai_insight = Some(v);
        }
    });
    if found {
        println!("Updated transaction '{}'", id);
    } else {
        println!("Transaction '{}' not found", id);
    }
    Ok(())
}

fn confirm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut store = open_store(conn);
    let id = required(sub, "id")?;
    match store.transaction(id).map(|t| t.status) {
        None => println!("Transaction '{}' not found", id),
        Some(TransactionStatus::Confirmed) => {
            println!("Transaction '{}' is already confirmed", id)
        }
        Some(TransactionStatus::Pending) => {
            store.confirm_transaction(id);
            println!("Confirmed transaction '{}'", id);
        }
    }
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut store = open_store(conn);
    let id = required(sub, "id")?;
    if store.remove_transaction(id) {
        println!("Removed transaction '{}'", id);
    } else {
        println!("Transaction '{}' not found", id);
    }
    Ok(())
}

fn list_categories(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = open_store(conn);
    let cats = categories(store.transactions());
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cats)? {
        let data = cats
            .iter()
            .map(|c| vec![c.as_str().to_string(), c.label().to_string()])
            .collect();
        println!("{}", pretty_table(&["Category", "Label"], data));
    }
    Ok(())
}
