// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::open_store;
use crate::utils::required;
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

/// CSV columns lead with the import layout so an export can be re-imported.
fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;
    let store = open_store(conn);
    let rows = store.transactions();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date", "merchant", "amount", "type", "category", "status", "source", "id",
                "note",
            ])?;
            for t in rows {
                wtr.write_record([
                    t.date.as_str(),
                    t.merchant.as_str(),
                    t.amount.to_string().as_str(),
                    t.r#type.as_str(),
                    t.category.as_str(),
                    t.status.as_str(),
                    t.source.as_str(),
                    t.id.as_str(),
                    t.ai_insight.as_deref().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id, "date": t.date, "merchant": t.merchant, "amount": t.amount,
                        "type": t.r#type, "category": t.category, "status": t.status,
                        "source": t.source, "note": t.ai_insight
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => return Err(anyhow!("Unknown format: {} (use csv|json)", fmt)),
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
