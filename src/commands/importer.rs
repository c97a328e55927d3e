// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::open_store;
use crate::models::{
    Category, Transaction, TransactionSource, TransactionStatus, TransactionType,
};
use crate::utils::{new_id, parse_amount, parse_date, required};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::Connection;
use std::collections::HashSet;
use std::io::Read;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => import_transactions(conn, sub),
        _ => Ok(()),
    }
}

/// Parses `date,merchant,amount,type,category,status` rows. Every row is
/// validated before anything is returned; the first bad row fails the batch.
/// `type` defaults to expense and `status` to confirmed when blank.
pub fn parse_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut out = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let rec = result.with_context(|| format!("Malformed CSV at line {}", line))?;
        let field = |i: usize| rec.get(i).map(str::trim).unwrap_or("");

        let date = parse_date(field(0)).with_context(|| format!("Line {}", line))?;
        let merchant = field(1);
        if merchant.is_empty() {
            anyhow::bail!("Line {}: merchant missing", line);
        }
        let amount = parse_amount(field(2)).with_context(|| format!("Line {}", line))?;
        let kind = match field(3) {
            "" => TransactionType::Expense,
            raw => raw.parse().with_context(|| format!("Line {}", line))?,
        };
        let category: Category = match field(4) {
            "" => Category::Other,
            raw => raw.parse().with_context(|| format!("Line {}", line))?,
        };
        let status = match field(5) {
            "" => TransactionStatus::Confirmed,
            raw => raw.parse().with_context(|| format!("Line {}", line))?,
        };
        out.push(Transaction {
            id: String::new(),
            amount,
            merchant: merchant.to_string(),
            category,
            date: date.to_string(),
            status,
            r#type: kind,
            source: TransactionSource::Import,
            image_url: None,
            ai_insight: None,
        });
    }
    Ok(out)
}

fn import_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = required(sub, "path")?;
    let file = std::fs::File::open(path).with_context(|| format!("Open CSV {}", path))?;
    let rows = parse_transactions(file)?;

    let mut store = open_store(conn);
    let mut assigned: HashSet<String> = HashSet::new();
    let count = rows.len();
    let mut batch = Vec::with_capacity(count);
    for mut txn in rows {
        txn.id = new_id("t", |id| {
            assigned.contains(id) || store.transaction(id).is_some()
        });
        assigned.insert(txn.id.clone());
        batch.push(txn);
    }
    // File order is kept: the first row lands first.
    store.add_transactions(batch);
    tracing::info!(count, path, "imported transactions");
    println!("Imported {} transactions from {}", count, path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_columns_take_defaults() {
        let csv = "date,merchant,amount,type,category,status\n2025-02-03,Shop,5.00,,,\n";
        let rows = parse_transactions(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].r#type, TransactionType::Expense);
        assert_eq!(rows[0].category, Category::Other);
        assert_eq!(rows[0].status, TransactionStatus::Confirmed);
        assert_eq!(rows[0].source, TransactionSource::Import);
    }

    #[test]
    fn bad_row_reports_its_line() {
        let csv = "date,merchant,amount,type,category,status\n\
                   2025-02-03,Shop,5.00,expense,shopping,confirmed\n\
                   2025-02-04,Shop,-1,expense,shopping,confirmed\n";
        let err = parse_transactions(csv.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("Line 3"));
    }
}
