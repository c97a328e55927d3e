// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs the stderr subscriber once. `RUST_LOG` overrides the default.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("tracker=warn"));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let trimmed = s.trim();
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", trimmed))?;
    // Lexical date ordering relies on zero padding.
    if date.format("%Y-%m-%d").to_string() != trimmed {
        return Err(anyhow!(
            "Invalid date '{}', expected zero-padded YYYY-MM-DD",
            trimmed
        ));
    }
    Ok(date)
}

pub fn parse_month(s: &str) -> Result<String> {
    let trimmed = s.trim();
    let valid = trimmed.len() == 7
        && NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d").is_ok();
    if !valid {
        return Err(anyhow!("Invalid month '{}', expected YYYY-MM", trimmed));
    }
    Ok(trimmed.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s.trim()))
}

/// Amounts, prices, and quantities: zero or more.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d.is_sign_negative() && !d.is_zero() {
        return Err(anyhow!("Amount '{}' must not be negative", s.trim()));
    }
    Ok(d)
}

/// Strictly greater than zero.
pub fn parse_positive(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d <= Decimal::ZERO {
        return Err(anyhow!("Value '{}' must be greater than zero", s.trim()));
    }
    Ok(d)
}

/// `quantity * price`, or an error when the product does not fit a `Decimal`.
pub fn checked_value(quantity: Decimal, price: Decimal) -> Result<Decimal> {
    quantity
        .checked_mul(price)
        .ok_or_else(|| anyhow!("Value of {} x {} is too large", quantity, price))
}

/// Trimmed value of a required argument; empty input is rejected.
pub fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    let value = m
        .get_one::<String>(name)
        .map(|s| s.trim())
        .with_context(|| format!("Missing --{}", name))?;
    if value.is_empty() {
        return Err(anyhow!("--{} must not be empty", name));
    }
    Ok(value)
}

pub fn optional<'a>(m: &'a clap::ArgMatches, name: &str) -> Option<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Time-based id such as `t-1738000000000`, bumped until it is unused.
pub fn new_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut stamp = Utc::now().timestamp_millis();
    loop {
        let id = format!("{}-{}", prefix, stamp);
        if !taken(&id) {
            return id;
        }
        stamp += 1;
    }
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn fmt_pct(d: &Decimal) -> String {
    let sign = if d.is_sign_negative() && !d.is_zero() { "" } else { "+" };
    format!("{}{:.1}%", sign, d.round_dp(1))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "currency")?.unwrap_or_else(|| "USD".to_string()))
}

pub fn set_currency(conn: &Connection, ccy: &str) -> Result<()> {
    set_setting(conn, "currency", &ccy.trim().to_uppercase())
}

/// Pinned reference month, if any.
pub fn get_pinned_month(conn: &Connection) -> Result<Option<String>> {
    get_setting(conn, "month")
}

/// The pinned month, or the current calendar month.
pub fn report_month(conn: &Connection) -> Result<String> {
    match get_pinned_month(conn)? {
        Some(m) => Ok(m),
        None => Ok(today().format("%Y-%m").to_string()),
    }
}

pub fn set_month(conn: &Connection, month: &str) -> Result<()> {
    let month = parse_month(month)?;
    set_setting(conn, "month", &month)
}

pub fn clear_month(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key='month'", [])?;
    Ok(())
}
