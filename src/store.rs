// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Record store: one JSON array per collection in a key/value medium.
//!
//! Reads fail soft to a fallback. Writes replace the whole array. Mutations
//! on [`RecordStore`] land in memory first and are then persisted; a failed
//! write is logged and never rolls the in-memory state back.

use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::models::{
    Account, Goal, Holding, PortfolioSnapshot, Trade, Transaction, TransactionStatus,
};
use crate::seed::Seed;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Durable string-keyed medium the collections are mirrored to.
pub trait KvBackend {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
}

impl KvBackend for Connection {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .query_row("SELECT value FROM kv WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.execute(
            "INSERT INTO kv(key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }
}

impl<B: KvBackend + ?Sized> KvBackend for &B {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        (**self).put(key, value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKey {
    Transactions,
    Accounts,
    Goals,
    Holdings,
    Trades,
    PortfolioHistory,
}

impl CollectionKey {
    pub const ALL: [CollectionKey; 6] = [
        CollectionKey::Transactions,
        CollectionKey::Accounts,
        CollectionKey::Goals,
        CollectionKey::Holdings,
        CollectionKey::Trades,
        CollectionKey::PortfolioHistory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKey::Transactions => "tracker-transactions",
            CollectionKey::Accounts => "tracker-accounts",
            CollectionKey::Goals => "tracker-goals",
            CollectionKey::Holdings => "tracker-holdings",
            CollectionKey::Trades => "tracker-trades",
            CollectionKey::PortfolioHistory => "tracker-portfolio-history",
        }
    }
}

/// Anything addressable by a caller-assigned id.
pub trait Record {
    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($($ty:ty),+) => {
        $(impl Record for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })+
    };
}

impl_record!(Transaction, Account, Goal, Holding, Trade);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Prepend,
    Append,
}

/// Returns the persisted collection under `key`, or `fallback` when the key
/// is missing, unreadable, or does not decode.
pub fn load<T, B>(backend: &B, key: &str, fallback: Vec<T>) -> Vec<T>
where
    T: DeserializeOwned,
    B: KvBackend + ?Sized,
{
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!(key, "no persisted value, using fallback");
            return fallback;
        }
        Err(err) => {
            tracing::warn!(key, error = %err, "read failed, using fallback");
            return fallback;
        }
    };
    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => {
            tracing::debug!(key, count = items.len(), "loaded collection");
            items
        }
        Err(err) => {
            tracing::warn!(key, error = %err, "malformed persisted value, using fallback");
            fallback
        }
    }
}

/// Serializes the full collection and overwrites whatever `key` held.
pub fn save<T, B>(backend: &B, key: &str, items: &[T]) -> Result<()>
where
    T: Serialize,
    B: KvBackend + ?Sized,
{
    let json = serde_json::to_string(items)?;
    backend.put(key, &json)?;
    tracing::debug!(key, count = items.len(), "saved collection");
    Ok(())
}

/// No uniqueness check: ids are trusted to be unique.
pub fn add<T: Clone>(items: &[T], record: T, placement: Placement) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len() + 1);
    match placement {
        Placement::Prepend => {
            out.push(record);
            out.extend_from_slice(items);
        }
        Placement::Append => {
            out.extend_from_slice(items);
            out.push(record);
        }
    }
    out
}

/// Applies `patch` to the entry whose id matches. Unknown ids return an
/// unchanged copy.
pub fn update<T, F>(items: &[T], id: &str, patch: F) -> Vec<T>
where
    T: Record + Clone,
    F: FnOnce(&mut T),
{
    let mut out = items.to_vec();
    if let Some(entry) = out.iter_mut().find(|item| item.id() == id) {
        patch(entry);
    }
    out
}

pub fn remove<T: Record + Clone>(items: &[T], id: &str) -> Vec<T> {
    items.iter().filter(|item| item.id() != id).cloned().collect()
}

fn contains<T: Record>(items: &[T], id: &str) -> bool {
    items.iter().any(|item| item.id() == id)
}

fn persist<T, B>(backend: &B, key: CollectionKey, items: &[T])
where
    T: Serialize,
    B: KvBackend,
{
    if let Err(err) = save(backend, key.as_str(), items) {
        tracing::warn!(key = key.as_str(), error = %err, "persist failed; keeping in-memory state");
    }
}

/// In-memory view of every collection, mirrored to `B` on each mutation.
pub struct RecordStore<B: KvBackend> {
    backend: B,
    seed: Seed,
    transactions: Vec<Transaction>,
    accounts: Vec<Account>,
    goals: Vec<Goal>,
    holdings: Vec<Holding>,
    trades: Vec<Trade>,
    history: Vec<PortfolioSnapshot>,
}

impl<B: KvBackend> RecordStore<B> {
    /// Loads each collection, falling back to the matching part of `seed`.
    pub fn open(backend: B, seed: Seed) -> Self {
        let transactions = load(
            &backend,
            CollectionKey::Transactions.as_str(),
            seed.transactions.clone(),
        );
        let accounts = load(
            &backend,
            CollectionKey::Accounts.as_str(),
            seed.accounts.clone(),
        );
        let goals = load(&backend, CollectionKey::Goals.as_str(), seed.goals.clone());
        let holdings = load(
            &backend,
            CollectionKey::Holdings.as_str(),
            seed.holdings.clone(),
        );
        let trades = load(&backend, CollectionKey::Trades.as_str(), seed.trades.clone());
        let history = load(
            &backend,
            CollectionKey::PortfolioHistory.as_str(),
            seed.portfolio_history.clone(),
        );
        Self {
            backend,
            seed,
            transactions,
            accounts,
            goals,
            holdings,
            trades,
            history,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn portfolio_history(&self) -> &[PortfolioSnapshot] {
        &self.history
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn holding(&self, id: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.id == id)
    }

    /// New transactions go to the front, newest first.
    pub fn add_transaction(&mut self, txn: Transaction) {
        self.transactions = add(&self.transactions, txn, Placement::Prepend);
        persist(&self.backend, CollectionKey::Transactions, &self.transactions);
    }

    /// Puts `batch` in front of the existing transactions, keeping the batch's
    /// own order, and persists once.
    pub fn add_transactions(&mut self, batch: Vec<Transaction>) {
        if batch.is_empty() {
            return;
        }
        let mut out = batch;
        out.extend_from_slice(&self.transactions);
        self.transactions = out;
        persist(&self.backend, CollectionKey::Transactions, &self.transactions);
    }

    /// Returns whether a transaction with `id` existed.
    pub fn update_transaction<F>(&mut self, id: &str, patch: F) -> bool
    where
        F: FnOnce(&mut Transaction),
    {
        if !contains(&self.transactions, id) {
            return false;
        }
        self.transactions = update(&self.transactions, id, patch);
        persist(&self.backend, CollectionKey::Transactions, &self.transactions);
        true
    }

    /// Moves a pending transaction to confirmed. There is no way back.
    pub fn confirm_transaction(&mut self, id: &str) -> bool {
        self.update_transaction(id, |t| t.status = TransactionStatus::Confirmed)
    }

    pub fn remove_transaction(&mut self, id: &str) -> bool {
        if !contains(&self.transactions, id) {
            return false;
        }
        self.transactions = remove(&self.transactions, id);
        persist(&self.backend, CollectionKey::Transactions, &self.transactions);
        true
    }

    pub fn add_account(&mut self, account: Account) {
        self.accounts = add(&self.accounts, account, Placement::Append);
        persist(&self.backend, CollectionKey::Accounts, &self.accounts);
    }

    pub fn update_account<F>(&mut self, id: &str, patch: F) -> bool
    where
        F: FnOnce(&mut Account),
    {
        if !contains(&self.accounts, id) {
            return false;
        }
        self.accounts = update(&self.accounts, id, patch);
        persist(&self.backend, CollectionKey::Accounts, &self.accounts);
        true
    }

    pub fn remove_account(&mut self, id: &str) -> bool {
        if !contains(&self.accounts, id) {
            return false;
        }
        self.accounts = remove(&self.accounts, id);
        persist(&self.backend, CollectionKey::Accounts, &self.accounts);
        true
    }

    pub fn add_goal(&mut self, goal: Goal) {
        self.goals = add(&self.goals, goal, Placement::Append);
        persist(&self.backend, CollectionKey::Goals, &self.goals);
    }

    pub fn update_goal<F>(&mut self, id: &str, patch: F) -> bool
    where
        F: FnOnce(&mut Goal),
    {
        if !contains(&self.goals, id) {
            return false;
        }
        self.goals = update(&self.goals, id, patch);
        persist(&self.backend, CollectionKey::Goals, &self.goals);
        true
    }

    /// Adds `amount` to a goal, clamped at its target. This is not
    /// `min(current + amount, target)`: a goal already above target (set by a
    /// direct edit) keeps its amount, so funding never lowers `current_amount`.
    pub fn contribute_to_goal(&mut self, id: &str, amount: Decimal) -> bool {
        self.update_goal(id, |g| {
            let next = g.current_amount.saturating_add(amount).min(g.target_amount);
            if next > g.current_amount {
                g.current_amount = next;
            }
        })
    }

    pub fn remove_goal(&mut self, id: &str) -> bool {
        if !contains(&self.goals, id) {
            return false;
        }
        self.goals = remove(&self.goals, id);
        persist(&self.backend, CollectionKey::Goals, &self.goals);
        true
    }

    pub fn add_holding(&mut self, holding: Holding) {
        self.holdings = add(&self.holdings, holding, Placement::Append);
        persist(&self.backend, CollectionKey::Holdings, &self.holdings);
    }

    pub fn update_holding<F>(&mut self, id: &str, patch: F) -> bool
    where
        F: FnOnce(&mut Holding),
    {
        if !contains(&self.holdings, id) {
            return false;
        }
        self.holdings = update(&self.holdings, id, patch);
        persist(&self.backend, CollectionKey::Holdings, &self.holdings);
        true
    }

    /// Trades pointing at the holding are left alone.
    pub fn remove_holding(&mut self, id: &str) -> bool {
        if !contains(&self.holdings, id) {
            return false;
        }
        self.holdings = remove(&self.holdings, id);
        persist(&self.backend, CollectionKey::Holdings, &self.holdings);
        true
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.trades = add(&self.trades, trade, Placement::Append);
        persist(&self.backend, CollectionKey::Trades, &self.trades);
    }

    pub fn remove_trade(&mut self, id: &str) -> bool {
        if !contains(&self.trades, id) {
            return false;
        }
        self.trades = remove(&self.trades, id);
        persist(&self.backend, CollectionKey::Trades, &self.trades);
        true
    }

    pub fn append_snapshot(&mut self, snapshot: PortfolioSnapshot) {
        self.history = add(&self.history, snapshot, Placement::Append);
        persist(&self.backend, CollectionKey::PortfolioHistory, &self.history);
    }

    /// Replaces every collection with the seed it was opened with.
    pub fn reset(&mut self) {
        self.transactions = self.seed.transactions.clone();
        self.accounts = self.seed.accounts.clone();
        self.goals = self.seed.goals.clone();
        self.holdings = self.seed.holdings.clone();
        self.trades = self.seed.trades.clone();
        self.history = self.seed.portfolio_history.clone();
        persist(&self.backend, CollectionKey::Transactions, &self.transactions);
        persist(&self.backend, CollectionKey::Accounts, &self.accounts);
        persist(&self.backend, CollectionKey::Goals, &self.goals);
        persist(&self.backend, CollectionKey::Holdings, &self.holdings);
        persist(&self.backend, CollectionKey::Trades, &self.trades);
        persist(&self.backend, CollectionKey::PortfolioHistory, &self.history);
        tracing::info!("collections reset to seed data");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::models::{AccountType, Category, TransactionSource, TransactionType};

    fn conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&mut conn).unwrap();
        conn
    }

    fn txn(id: &str) -> Transaction {
        Transaction {
            id: id.into(),
            amount: Decimal::from(10),
            merchant: "Shop".into(),
            category: Category::Shopping,
            date: "2025-01-10".into(),
            status: TransactionStatus::Pending,
            r#type: TransactionType::Expense,
            source: TransactionSource::Manual,
            image_url: None,
            ai_insight: None,
        }
    }

    fn account(id: &str) -> Account {
        Account {
            id: id.into(),
            name: "Checking".into(),
            r#type: AccountType::Checking,
            balance: Decimal::from(100),
            institution: "Bank".into(),
            last_updated: "2025-01-01".into(),
            account_number: None,
        }
    }

    #[test]
    fn load_missing_key_returns_fallback() {
        let conn = conn();
        let items = load(&conn, "tracker-transactions", vec![txn("seed")]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "seed");
    }

    #[test]
    fn load_malformed_value_returns_fallback() {
        let conn = conn();
        conn.put("tracker-transactions", "{not json").unwrap();
        let items = load(&conn, "tracker-transactions", vec![txn("seed")]);
        assert_eq!(items[0].id, "seed");

        conn.put("tracker-transactions", r#"[{"id":"x"}]"#).unwrap();
        let items: Vec<Transaction> = load(&conn, "tracker-transactions", Vec::new());
        assert!(items.is_empty());
    }

    #[test]
    fn save_then_load_returns_saved_collection() {
        let conn = conn();
        save(&conn, "tracker-transactions", &[txn("a"), txn("b")]).unwrap();
        let items: Vec<Transaction> = load(&conn, "tracker-transactions", Vec::new());
        let ids: Vec<_> = items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn add_respects_placement() {
        let items = vec![txn("a")];
        let front = add(&items, txn("b"), Placement::Prepend);
        let back = add(&items, txn("b"), Placement::Append);
        assert_eq!(front[0].id, "b");
        assert_eq!(back[1].id, "b");
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let items = vec![txn("a"), txn("b")];
        let out = update(&items, "zzz", |t| t.merchant = "changed".into());
        assert_eq!(out, items);
    }

    #[test]
    fn remove_filters_matching_id() {
        let items = vec![txn("a"), txn("b")];
        assert_eq!(remove(&items, "a").len(), 1);
        assert_eq!(remove(&items, "missing"), items);
    }

    #[test]
    fn store_mutations_are_persisted() {
        let conn = conn();
        {
            let mut store = RecordStore::open(&conn, Seed::empty());
            store.add_transaction(txn("a"));
            store.add_transaction(txn("b"));
            store.add_account(account("acc1"));
            assert!(store.confirm_transaction("a"));
        }
        let reopened = RecordStore::open(&conn, Seed::empty());
        let ids: Vec<_> = reopened.transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(
            reopened.transaction("a").unwrap().status,
            TransactionStatus::Confirmed
        );
        assert_eq!(reopened.accounts().len(), 1);
    }

    struct CountingKv {
        conn: Connection,
        puts: std::cell::Cell<usize>,
    }

    impl KvBackend for CountingKv {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.conn.get(key)
        }

        fn put(&self, key: &str, value: &str) -> Result<()> {
            self.puts.set(self.puts.get() + 1);
            self.conn.put(key, value)
        }
    }

    #[test]
    fn batch_is_prepended_in_order_with_one_write() {
        let kv = CountingKv {
            conn: conn(),
            puts: std::cell::Cell::new(0),
        };
        let mut store = RecordStore::open(&kv, Seed::empty());
        store.add_transaction(txn("old"));
        kv.puts.set(0);

        store.add_transactions(vec![txn("a"), txn("b"), txn("c")]);
        assert_eq!(kv.puts.get(), 1);
        store.add_transactions(Vec::new());
        assert_eq!(kv.puts.get(), 1);

        let reopened = RecordStore::open(&kv.conn, Seed::empty());
        let ids: Vec<_> = reopened.transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "old"]);
    }

    #[test]
    fn funding_never_lowers_a_goal_above_target() {
        let conn = conn();
        let mut store = RecordStore::open(&conn, Seed::empty());
        store.add_goal(Goal {
            id: "g".into(),
            name: "Trip".into(),
            target_amount: Decimal::from(100),
            current_amount: Decimal::from(150),
            deadline: "2025-06-01".into(),
            icon: "plane".into(),
            color: "sky".into(),
        });
        assert!(store.contribute_to_goal("g", Decimal::from(10)));
        assert_eq!(store.goal("g").unwrap().current_amount, Decimal::from(150));

        assert!(store.update_goal("g", |g| g.current_amount = Decimal::from(95)));
        assert!(store.contribute_to_goal("g", Decimal::from(10)));
        assert_eq!(store.goal("g").unwrap().current_amount, Decimal::from(100));

        assert!(store.contribute_to_goal("g", Decimal::MAX));
        assert_eq!(store.goal("g").unwrap().current_amount, Decimal::from(100));
    }

    #[test]
    fn unknown_ids_report_not_found() {
        let conn = conn();
        let mut store = RecordStore::open(&conn, Seed::empty());
        assert!(!store.remove_transaction("nope"));
        assert!(!store.update_account("nope", |a| a.balance = Decimal::ZERO));
        assert!(!store.contribute_to_goal("nope", Decimal::ONE));
    }

    #[test]
    fn failed_write_keeps_in_memory_state() {
        let conn = conn();
        let mut store = RecordStore::open(&conn, Seed::empty());
        conn.execute_batch("DROP TABLE kv;").unwrap();
        store.add_transaction(txn("a"));
        assert_eq!(store.transactions().len(), 1);
        assert_eq!(store.transactions()[0].id, "a");
    }

    #[test]
    fn open_without_kv_table_falls_back_to_seed() {
        let conn = Connection::open_in_memory().unwrap();
        let store = RecordStore::open(&conn, Seed::demo());
        assert_eq!(store.transactions().len(), Seed::demo().transactions.len());
    }

    #[test]
    fn reset_restores_seed() {
        let conn = conn();
        let mut store = RecordStore::open(&conn, Seed::demo());
        let first = store.transactions()[0].id.clone();
        store.remove_transaction(&first);
        store.reset();
        assert_eq!(store.transactions()[0].id, first);
    }
}
