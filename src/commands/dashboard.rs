// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::open_store;
use crate::metrics::{
    AccountSummary, CashFlow, GainLoss, account_summary, gain_loss, monthly_cash_flow,
    net_worth, pending_count, portfolio_growth,
};
use crate::models::{Transaction, TransactionType};
use crate::query::recent;
use crate::utils::{
    fmt_money, fmt_pct, get_currency, maybe_print_json, optional, parse_month, pretty_table,
    report_month,
};
use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::Connection;
use serde::Serialize;

const INBOX_SIZE: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub month: String,
    pub net_worth: Decimal,
    pub growth: Decimal,
    pub cash_flow: CashFlow,
    pub gain_loss: GainLoss,
    pub accounts: AccountSummary,
    pub pending: usize,
    pub inbox: Vec<Transaction>,
}

pub fn build(conn: &Connection, month: &str) -> Dashboard {
    let store = open_store(conn);
    let worth = net_worth(store.holdings());
    Dashboard {
        month: month.to_string(),
        net_worth: worth,
        growth: portfolio_growth(worth, store.portfolio_history()),
        cash_flow: monthly_cash_flow(store.transactions(), month),
        gain_loss: gain_loss(store.holdings()),
        accounts: account_summary(store.accounts()),
        pending: pending_count(store.transactions()),
        inbox: recent(store.transactions(), INBOX_SIZE),
    }
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = match optional(sub, "month") {
        Some(raw) => parse_month(raw)?,
        None => report_month(conn)?,
    };
    let dash = build(conn, &month);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &dash)? {
        return Ok(());
    }

    let ccy = get_currency(conn)?;
    let summary = vec![
        vec![
            "Net Worth".to_string(),
            format!("{} ({} all time)", fmt_money(&dash.net_worth, &ccy), fmt_pct(&dash.growth)),
        ],
        vec![
            format!("Cash Flow {}", dash.month),
            format!(
                "{} ({} of income kept)",
                fmt_money(&dash.cash_flow.amount, &ccy),
                fmt_pct(&dash.cash_flow.percentage)
            ),
        ],
        vec![
            "Gain/Loss".to_string(),
            format!(
                "{} ({})",
                fmt_money(&dash.gain_loss.amount, &ccy),
                fmt_pct(&dash.gain_loss.percentage)
            ),
        ],
        vec!["Assets".to_string(), fmt_money(&dash.accounts.assets, &ccy)],
        vec![
            "Liabilities".to_string(),
            fmt_money(&dash.accounts.liabilities, &ccy),
        ],
        vec!["Pending".to_string(), dash.pending.to_string()],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], summary));

    if !dash.inbox.is_empty() {
        let inbox = dash
            .inbox
            .iter()
            .map(|t| {
                let sign = match t.r#type {
                    TransactionType::Income => "+",
                    TransactionType::Expense => "-",
                };
                vec![
                    t.date.clone(),
                    t.merchant.clone(),
                    format!("{}{}", sign, fmt_money(&t.amount, &ccy)),
                    t.status.label().to_string(),
                ]
            })
            .collect();
        println!("Inbox");
        println!("{}", pretty_table(&["Date", "Merchant", "Amount", "Status"], inbox));
    }
    Ok(())
}
