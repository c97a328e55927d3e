// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use rusqlite::Connection;
use serde_json::json;
use tempfile::tempdir;
use tracker::commands::exporter;
use tracker::models::{
    Category, Transaction, TransactionSource, TransactionStatus, TransactionType,
};
use tracker::store::{CollectionKey, save};
use tracker::{cli, db};

fn base_conn() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    let txn = Transaction {
        id: "t-1".into(),
        amount: Decimal::new(1234, 2),
        merchant: "Corner Shop".into(),
        category: Category::Groceries,
        date: "2025-01-02".into(),
        status: TransactionStatus::Confirmed,
        r#type: TransactionType::Expense,
        source: TransactionSource::Manual,
        image_url: None,
        ai_insight: Some("Weekly run".into()),
    };
    save(&conn, CollectionKey::Transactions.as_str(), &[txn]).unwrap();
    conn
}

fn export(conn: &Connection, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "tracker",
        "export",
        "transactions",
        "--format",
        format,
        "--out",
        out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_transactions_streams_pretty_json() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    export(&conn, "json", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "id": "t-1",
                "date": "2025-01-02",
                "merchant": "Corner Shop",
                "amount": "12.34",
                "type": "expense",
                "category": "groceries",
                "status": "confirmed",
                "source": "manual",
                "note": "Weekly run"
            }
        ])
    );
}

#[test]
fn export_csv_leads_with_import_columns() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    export(&conn, "CSV", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next().unwrap(),
        "date,merchant,amount,type,category,status,source,id,note"
    );
    assert_eq!(
        lines.next().unwrap(),
        "2025-01-02,Corner Shop,12.34,expense,groceries,confirmed,manual,t-1,Weekly run"
    );
    assert!(lines.next().is_none());
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    assert!(export(&conn, "xml", &out_path.to_string_lossy()).is_err());
    assert!(!out_path.exists());
}
