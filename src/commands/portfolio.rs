// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::open_store;
use crate::metrics::{
    HoldingPerformance, TimeRange, asset_distribution, gain_loss, history_window,
    holding_performance, net_worth, percent_of,
};
use crate::models::{
    AssetType, Holding, PortfolioSnapshot, SPARKLINE_POINTS, Trade, TradeSide,
};
use crate::seed::sparkline;
use crate::utils::{
    checked_value, fmt_money, fmt_pct, get_currency, maybe_print_json, new_id, optional,
    parse_amount, parse_date, parse_decimal, parse_positive, pretty_table, required, today,
};
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("holdings", sub)) => holdings(conn, sub)?,
        Some(("add-holding", sub)) => add_holding(conn, sub)?,
        Some(("price", sub)) => update_price(conn, sub)?,
        Some(("rm-holding", sub)) => {
            let id = required(sub, "id")?;
            let mut store = open_store(conn);
            if store.remove_holding(id) {
                println!("Removed holding '{}'", id);
            } else {
                println!("Holding '{}' not found", id);
            }
        }
        Some(("trade", sub)) => trade(conn, sub)?,
        Some(("trades", sub)) => trades(conn, sub)?,
        Some(("rm-trade", sub)) => {
            let id = required(sub, "id")?;
            let mut store = open_store(conn);
            if store.remove_trade(id) {
                println!("Removed trade '{}'", id);
            } else {
                println!("Trade '{}' not found", id);
            }
        }
        Some(("allocation", sub)) => allocation(conn, sub)?,
        Some(("history", sub)) => history(conn, sub)?,
        Some(("snapshot", sub)) => snapshot(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
pub struct HoldingRow {
    #[serde(flatten)]
    pub holding: Holding,
    pub performance: HoldingPerformance,
}

fn holdings(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = open_store(conn);
    let rows: Vec<HoldingRow> = store
        .holdings()
        .iter()
        .map(|h| HoldingRow {
            holding: h.clone(),
            performance: holding_performance(h),
        })
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let data = rows
        .iter()
        .map(|r| {
            let h = &r.holding;
            let p = &r.performance;
            vec![
                h.id.clone(),
                h.symbol.clone(),
                h.name.clone(),
                h.asset_type.label().to_string(),
                h.quantity.normalize().to_string(),
                fmt_money(&h.current_price, &ccy),
                fmt_money(&p.value, &ccy),
                format!("{} ({})", fmt_money(&p.gain, &ccy), fmt_pct(&p.percentage)),
                fmt_pct(&h.change24h),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Id", "Symbol", "Name", "Type", "Qty", "Price", "Value", "Gain/Loss", "24h"],
            data,
        )
    );
    let gl = gain_loss(store.holdings());
    println!(
        "Total {} | Gain/Loss {} ({})",
        fmt_money(&net_worth(store.holdings()), &ccy),
        fmt_money(&gl.amount, &ccy),
        fmt_pct(&gl.percentage)
    );
    Ok(())
}

fn add_holding(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let symbol = required(sub, "symbol")?.to_uppercase();
    let name = required(sub, "name")?.to_string();
    let asset_type: AssetType = required(sub, "type")?.parse()?;
    let quantity = parse_amount(required(sub, "quantity")?)?;
    let current_price = parse_amount(required(sub, "price")?)?;
    let cost_basis = parse_amount(required(sub, "cost")?)?;
    let change24h = parse_decimal(required(sub, "change")?)?;
    checked_value(quantity, current_price)?;
    checked_value(quantity, cost_basis)?;
    let sparkline_data = match asset_type {
        AssetType::Cash => vec![current_price; SPARKLINE_POINTS],
        _ => sparkline(current_price, 5),
    };

    let mut store = open_store(conn);
    let id = new_id("h", |id| store.holding(id).is_some());
    println!("Added holding {} ({})", symbol, id);
    store.add_holding(Holding {
        id,
        symbol,
        name,
        quantity,
        current_price,
        cost_basis,
        change24h,
        sparkline_data,
        asset_type,
    });
    Ok(())
}

/// Sets the price and rolls it onto the end of the sparkline.
fn update_price(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let price = parse_amount(required(sub, "price")?)?;
    let change = optional(sub, "change").map(parse_decimal).transpose()?;

    let mut store = open_store(conn);
    if let Some(h) = store.holding(id) {
        checked_value(h.quantity, price)?;
    }
    let found = store.update_holding(id, |h| {
        h.current_price = price;
        if let Some(c) = change {
            h.change24h = c;
        }
        h.sparkline_data.push(price);
        let excess = h.sparkline_data.len().saturating_sub(SPARKLINE_POINTS);
        h.sparkline_data.drain(..excess);
    });
    if found {
        println!("Updated price for '{}' to {}", id, price);
    } else {
        println!("Holding '{}' not found", id);
    }
    Ok(())
}

fn trade(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("buy", sub)) => record_trade(conn, sub, TradeSide::Buy),
        Some(("sell", sub)) => record_trade(conn, sub, TradeSide::Sell),
        _ => Ok(()),
    }
}

fn record_trade(conn: &Connection, sub: &clap::ArgMatches, side: TradeSide) -> Result<()> {
    let holding_id = required(sub, "holding")?;
    let quantity = parse_positive(required(sub, "quantity")?)?;
    let price = parse_amount(required(sub, "price")?)?;
    checked_value(quantity, price)?;
    let date = match optional(sub, "date") {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };

    let mut store = open_store(conn);
    let symbol = store
        .holding(holding_id)
        .map(|h| h.symbol.clone())
        .ok_or_else(|| anyhow!("Holding '{}' not found", holding_id))?;
    let id = new_id("tr", |id| store.trades().iter().any(|t| t.id == id));
    let trade = Trade::new(id, holding_id, symbol, side, quantity, price, date.to_string());
    let ccy = get_currency(conn)?;
    println!(
        "Recorded {} {} x {} @ {} = {} ({})",
        side,
        quantity.normalize(),
        trade.symbol,
        fmt_money(&price, &ccy),
        fmt_money(&trade.total, &ccy),
        trade.id
    );
    store.record_trade(trade);
    Ok(())
}

fn trades(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = open_store(conn);
    let mut rows = store.trades().to_vec();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let data = rows
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.date.clone(),
                t.r#type.label().to_string(),
                t.symbol.clone(),
                t.quantity.normalize().to_string(),
                fmt_money(&t.price, &ccy),
                fmt_money(&t.total, &ccy),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Date", "Side", "Symbol", "Qty", "Price", "Total"], data)
    );
    Ok(())
}

fn allocation(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = open_store(conn);
    let slices = asset_distribution(store.holdings());
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &slices)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let data = slices
        .iter()
        .map(|s| {
            vec![
                s.label.to_string(),
                fmt_money(&s.value, &ccy),
                format!("{:.1}%", s.percentage.round_dp(1)),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Asset Type", "Value", "Share"], data));
    Ok(())
}

fn history(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let range: TimeRange = required(sub, "range")?.parse()?;
    let store = open_store(conn);
    let window = history_window(store.portfolio_history(), range);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &window)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let data = window
        .iter()
        .map(|s| vec![s.date.clone(), fmt_money(&s.value, &ccy)])
        .collect();
    println!("{}", pretty_table(&["Date", "Value"], data));
    if let (Some(first), Some(last)) = (window.first(), window.last()) {
        let change = last.value - first.value;
        println!(
            "{}: {} ({})",
            range.as_str(),
            fmt_money(&change, &ccy),
            fmt_pct(&percent_of(change, first.value))
        );
    }
    Ok(())
}

fn snapshot(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = match optional(sub, "date") {
        Some(raw) => parse_date(raw)?,
        None => today(),
    };
    let mut store = open_store(conn);
    let value = net_worth(store.holdings());
    let ccy = get_currency(conn)?;
    println!("Recorded {} on {}", fmt_money(&value, &ccy), date);
    store.append_snapshot(PortfolioSnapshot {
        date: date.to_string(),
        value,
    });
    Ok(())
}
