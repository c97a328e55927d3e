// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use std::io::Write;
use tempfile::NamedTempFile;
use tempfile::tempdir;
use tracker::commands::{exporter, importer, open_store};
use tracker::models::{Category, TransactionSource, TransactionStatus, TransactionType};
use tracker::seed::Seed;
use tracker::store::{CollectionKey, save};
use tracker::{cli, db};

fn base_conn() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file.flush().unwrap();
    file
}

fn import(conn: &Connection, path: &str) -> anyhow::Result<()> {
    let matches =
        cli::build_cli().get_matches_from(["tracker", "import", "transactions", "--path", path]);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(conn, import_m)
    } else {
        panic!("no import subcommand");
    }
}

#[test]
fn importer_trims_cli_path_argument() {
    let conn = base_conn();
    let file = csv_file(
        "date,merchant,amount,type,category,status\n2025-02-03,Shop,5.00,expense,shopping,confirmed\n",
    );
    let padded = format!("  {}  ", file.path().to_str().unwrap());
    import(&conn, &padded).unwrap();
    assert_eq!(open_store(&conn).transactions().len(), 9);
}

#[test]
fn imported_rows_are_prepended_with_import_source() {
    let conn = base_conn();
    let file = csv_file(
        "date,merchant,amount,type,category,status\n\
         2025-02-03,Payroll,4000,income,income,confirmed\n\
         2025-02-04,Deli,12.40,expense,food,pending\n",
    );
    import(&conn, file.path().to_str().unwrap()).unwrap();

    let store = open_store(&conn);
    let txns = store.transactions();
    assert_eq!(txns.len(), 10);
    // The batch sits in front of the demo rows in file order.
    assert_eq!(txns[0].merchant, "Payroll");
    assert_eq!(txns[0].r#type, TransactionType::Income);
    assert_eq!(txns[1].merchant, "Deli");
    assert_eq!(txns[1].status, TransactionStatus::Pending);
    assert_eq!(txns[1].category, Category::Food);
    assert_eq!(txns[2].id, "t1");
    assert!(txns[..2].iter().all(|t| t.source == TransactionSource::Import));
    assert_ne!(txns[0].id, txns[1].id);
}

#[test]
fn invalid_row_aborts_the_whole_import() {
    let conn = base_conn();
    let file = csv_file(
        "date,merchant,amount,type,category,status\n\
         2025-02-03,Shop,5.00,expense,shopping,confirmed\n\
         2025-02-04,Shop,5.00,expense,crypto-mining,confirmed\n",
    );
    assert!(import(&conn, file.path().to_str().unwrap()).is_err());
    assert_eq!(open_store(&conn).transactions().len(), 8);
}

#[test]
fn importer_rejects_unpadded_dates() {
    let conn = base_conn();
    let file = csv_file("date,merchant,amount,type,category,status\n2025-2-3,Shop,5,,,\n");
    assert!(import(&conn, file.path().to_str().unwrap()).is_err());
}

#[test]
fn missing_file_is_an_error() {
    let conn = base_conn();
    assert!(import(&conn, "/nonexistent/tracker-import.csv").is_err());
}

#[test]
fn exported_csv_reimports_in_the_same_order() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out = dir.path().join("export.csv");
    let out = out.to_str().unwrap();
    let matches = cli::build_cli().get_matches_from([
        "tracker", "export", "transactions", "--format", "csv", "--out", out,
    ]);
    let Some(("export", export_m)) = matches.subcommand() else {
        panic!("no export subcommand");
    };
    exporter::handle(&conn, export_m).unwrap();

    let empty: [tracker::models::Transaction; 0] = [];
    save(&conn, CollectionKey::Transactions.as_str(), &empty).unwrap();
    import(&conn, out).unwrap();

    let demo = Seed::demo().transactions;
    let store = open_store(&conn);
    let got: Vec<(&str, &str)> = store
        .transactions()
        .iter()
        .map(|t| (t.date.as_str(), t.merchant.as_str()))
        .collect();
    let want: Vec<(&str, &str)> = demo
        .iter()
        .map(|t| (t.date.as_str(), t.merchant.as_str()))
        .collect();
    assert_eq!(got, want);
    assert!(store.transactions().iter().zip(&demo).all(|(a, b)| a.amount == b.amount));
}
