// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use tracker::commands::{open_store, transactions};
use tracker::models::{TransactionStatus, TransactionType};
use tracker::{cli, db};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn list_rows(conn: &Connection, args: &[&str]) -> Vec<tracker::models::Transaction> {
    let mut argv = vec!["tracker", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            transactions::query_rows(conn, list_m).unwrap()
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["tracker", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(conn, tx_m)
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn list_limit_respected() {
    let conn = setup();
    let rows = list_rows(&conn, &["--limit", "2"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "t1");
    assert_eq!(rows[1].id, "t2");
}

#[test]
fn list_filters_by_status_and_type() {
    let conn = setup();
    let pending = list_rows(&conn, &["--status", "pending"]);
    let ids: Vec<&str> = pending.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["t1", "t4"]);

    let income = list_rows(&conn, &["--type", "income"]);
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].merchant, "Salary Deposit");

    assert_eq!(list_rows(&conn, &["--type", "ALL", "--status", "all"]).len(), 8);
}

#[test]
fn search_matches_merchant_and_category() {
    let conn = setup();
    let by_merchant = list_rows(&conn, &["--search", "amazon"]);
    assert_eq!(by_merchant.len(), 1);
    assert_eq!(by_merchant[0].id, "t1");

    let by_category = list_rows(&conn, &["--search", "GROC"]);
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].id, "t2");

    assert!(list_rows(&conn, &["--search", "zzz-no-match"]).is_empty());
}

#[test]
fn added_transaction_is_listed_first() {
    let conn = setup();
    run(
        &conn,
        &[
            "add", "--amount", "12.50", "--merchant", "Corner Cafe", "--category", "food",
            "--date", "2025-02-01",
        ],
    )
    .unwrap();

    let store = open_store(&conn);
    let first = &store.transactions()[0];
    assert_eq!(first.merchant, "Corner Cafe");
    assert_eq!(first.r#type, TransactionType::Expense);
    assert_eq!(first.status, TransactionStatus::Confirmed);
    assert_eq!(store.transactions().len(), 9);
}

#[test]
fn add_rejects_negative_amount_and_bad_date() {
    let conn = setup();
    assert!(
        run(&conn, &["add", "--amount=-5", "--merchant", "X", "--category", "other"]).is_err()
    );
    assert!(
        run(
            &conn,
            &["add", "--amount", "5", "--merchant", "X", "--category", "other", "--date", "2025-2-1"],
        )
        .is_err()
    );
    assert_eq!(open_store(&conn).transactions().len(), 8);
}

#[test]
fn confirm_and_remove_by_id() {
    let conn = setup();
    run(&conn, &["confirm", "--id", "t1"]).unwrap();
    assert_eq!(
        open_store(&conn).transaction("t1").unwrap().status,
        TransactionStatus::Confirmed
    );

    run(&conn, &["rm", "--id", "t1"]).unwrap();
    assert!(open_store(&conn).transaction("t1").is_none());

    // Unknown ids leave the collection untouched.
    run(&conn, &["rm", "--id", "missing"]).unwrap();
    assert_eq!(open_store(&conn).transactions().len(), 7);
}
