// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::open_store;
use crate::models::{
    Account, Goal, Holding, PortfolioSnapshot, SPARKLINE_POINTS, Trade, Transaction,
};
use crate::store::{CollectionKey, KvBackend, Record, RecordStore};
use crate::utils::{parse_date, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use std::collections::HashSet;

/// One finding: issue code plus a human-readable detail.
pub type Finding = (String, String);

fn duplicate_ids<T: Record>(kind: &str, items: &[T], out: &mut Vec<Finding>) {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.id()) {
            out.push(("duplicate_id".into(), format!("{} {}", kind, item.id())));
        }
    }
}

fn bad_date(kind: &str, id: &str, date: &str, out: &mut Vec<Finding>) {
    if parse_date(date).is_err() {
        out.push(("bad_date".into(), format!("{} {} '{}'", kind, id, date)));
    }
}

fn decodes<T: DeserializeOwned>(raw: &str) -> bool {
    serde_json::from_str::<Vec<T>>(raw).is_ok()
}

/// Persisted collections that no longer decode. The store silently falls
/// back to demo data for these, so they are easy to miss.
pub fn check_persisted<B: KvBackend>(backend: &B) -> Vec<Finding> {
    let mut rows = Vec::new();
    for key in CollectionKey::ALL {
        let raw = match backend.get(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(err) => {
                rows.push((
                    "unreadable_collection".into(),
                    format!("{}: {}", key.as_str(), err),
                ));
                continue;
            }
        };
        let ok = match key {
            CollectionKey::Transactions => decodes::<Transaction>(&raw),
            CollectionKey::Accounts => decodes::<Account>(&raw),
            CollectionKey::Goals => decodes::<Goal>(&raw),
            CollectionKey::Holdings => decodes::<Holding>(&raw),
            CollectionKey::Trades => decodes::<Trade>(&raw),
            CollectionKey::PortfolioHistory => decodes::<PortfolioSnapshot>(&raw),
        };
        if !ok {
            rows.push(("malformed_collection".into(), key.as_str().to_string()));
        }
    }
    rows
}

pub fn check<B: KvBackend>(store: &RecordStore<B>) -> Vec<Finding> {
    let mut rows = Vec::new();

    duplicate_ids("transaction", store.transactions(), &mut rows);
    duplicate_ids("account", store.accounts(), &mut rows);
    duplicate_ids("goal", store.goals(), &mut rows);
    duplicate_ids("holding", store.holdings(), &mut rows);
    duplicate_ids("trade", store.trades(), &mut rows);

    for t in store.transactions() {
        bad_date("transaction", &t.id, &t.date, &mut rows);
    }
    for g in store.goals() {
        bad_date("goal", &g.id, &g.deadline, &mut rows);
    }
    for s in store.portfolio_history() {
        bad_date("snapshot", "-", &s.date, &mut rows);
    }

    // Trades whose holding was removed
    let holdings: HashSet<&str> = store.holdings().iter().map(|h| h.id.as_str()).collect();
    for t in store.trades() {
        bad_date("trade", &t.id, &t.date, &mut rows);
        if !holdings.contains(t.holding_id.as_str()) {
            rows.push((
                "orphan_trade".into(),
                format!("{} -> {}", t.id, t.holding_id),
            ));
        }
        if t.total != t.expected_total() {
            rows.push((
                "trade_total_mismatch".into(),
                format!("{} total {} != {}", t.id, t.total, t.expected_total()),
            ));
        }
    }

    for h in store.holdings() {
        if h.sparkline_data.len() != SPARKLINE_POINTS {
            rows.push((
                "sparkline_length".into(),
                format!("{} has {} points", h.id, h.sparkline_data.len()),
            ));
        }
    }
    rows
}

pub fn handle(conn: &Connection) -> Result<()> {
    let store = open_store(conn);
    let rows: Vec<Vec<String>> = check_persisted(conn)
        .into_iter()
        .chain(check(&store))
        .map(|(issue, detail)| vec![issue, detail])
        .collect();
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::models::{Trade, TradeSide};
    use rust_decimal::Decimal;

    #[test]
    fn demo_data_is_clean() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&mut conn).unwrap();
        assert!(check(&open_store(&conn)).is_empty());
    }

    #[test]
    fn flags_orphans_and_bad_totals() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&mut conn).unwrap();
        let mut store = open_store(&conn);
        let mut trade = Trade::new(
            "tr-x",
            "h-gone",
            "GONE",
            TradeSide::Buy,
            Decimal::from(2),
            Decimal::from(10),
            "2025-01-02",
        );
        trade.total = Decimal::from(25);
        store.record_trade(trade);

        let issues: Vec<String> = check(&store).into_iter().map(|(i, _)| i).collect();
        assert!(issues.contains(&"orphan_trade".to_string()));
        assert!(issues.contains(&"trade_total_mismatch".to_string()));
    }

    #[test]
    fn flags_collections_that_fall_back() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&mut conn).unwrap();
        assert!(check_persisted(&conn).is_empty());
        conn.put(CollectionKey::Goals.as_str(), r#"{"not": "a list"}"#)
            .unwrap();
        let found = check_persisted(&conn);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, "tracker-goals");
    }
}
