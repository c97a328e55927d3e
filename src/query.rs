// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Narrowing filters over the transaction list. Each filter is an
//! independent predicate, so any chaining order yields the same set.

use anyhow::Result;
use std::str::FromStr;

use crate::models::{Category, Transaction, TransactionStatus, TransactionType};

/// `all` or one concrete value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }
}

impl<T> FromStr for Selection<T>
where
    T: FromStr<Err = anyhow::Error>,
{
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Selection::All)
        } else {
            Ok(Selection::Only(s.parse()?))
        }
    }
}

fn matches_search(t: &Transaction, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    t.merchant.to_lowercase().contains(needle)
        || t.category.as_str().contains(needle)
        || t.category.label().to_lowercase().contains(needle)
}

/// Case-insensitive substring match on merchant or category. An empty
/// query keeps everything.
pub fn search(transactions: &[Transaction], query: &str) -> Vec<Transaction> {
    let needle = query.trim().to_lowercase();
    transactions
        .iter()
        .filter(|t| matches_search(t, &needle))
        .cloned()
        .collect()
}

pub fn filter_by_type(
    transactions: &[Transaction],
    kind: Selection<TransactionType>,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| kind.accepts(&t.r#type))
        .cloned()
        .collect()
}

pub fn filter_by_status(
    transactions: &[Transaction],
    status: Selection<TransactionStatus>,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| status.accepts(&t.status))
        .cloned()
        .collect()
}

pub fn filter_by_category(
    transactions: &[Transaction],
    category: Selection<Category>,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| category.accepts(&t.category))
        .cloned()
        .collect()
}

/// Distinct categories in order of first appearance.
pub fn categories(transactions: &[Transaction]) -> Vec<Category> {
    let mut seen = Vec::new();
    for t in transactions {
        if !seen.contains(&t.category) {
            seen.push(t.category);
        }
    }
    seen
}

pub fn recent(transactions: &[Transaction], n: usize) -> Vec<Transaction> {
    transactions.iter().take(n).cloned().collect()
}

/// All transaction filters applied in a single pass.
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    pub search: String,
    pub kind: Selection<TransactionType>,
    pub status: Selection<TransactionStatus>,
    pub category: Selection<Category>,
}

impl TransactionQuery {
    pub fn matches(&self, t: &Transaction) -> bool {
        let needle = self.search.trim().to_lowercase();
        matches_search(t, &needle)
            && self.kind.accepts(&t.r#type)
            && self.status.accepts(&t.status)
            && self.category.accepts(&t.category)
    }

    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::Seed;

    fn ids(txns: &[Transaction]) -> Vec<&str> {
        txns.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn search_is_case_insensitive_on_merchant_and_category() {
        let txns = Seed::demo().transactions;
        assert_eq!(ids(&search(&txns, "AMAZON")), ["t1"]);
        assert_eq!(ids(&search(&txns, "grocer")), ["t2"]);
        assert_eq!(ids(&search(&txns, "dining")), ["t6"]);
        assert_eq!(search(&txns, "").len(), txns.len());
        assert!(search(&txns, "no such merchant").is_empty());
    }

    #[test]
    fn type_and_status_filters() {
        let txns = Seed::demo().transactions;
        assert_eq!(
            ids(&filter_by_type(&txns, Selection::Only(TransactionType::Income))),
            ["t7"]
        );
        assert_eq!(filter_by_type(&txns, Selection::All).len(), txns.len());
        assert_eq!(
            ids(&filter_by_status(
                &txns,
                Selection::Only(TransactionStatus::Pending)
            )),
            ["t1", "t4"]
        );
    }

    #[test]
    fn filters_commute() {
        let txns = Seed::demo().transactions;
        let pending = Selection::Only(TransactionStatus::Pending);
        let expense = Selection::Only(TransactionType::Expense);
        let a = filter_by_status(&filter_by_type(&search(&txns, "s"), expense), pending);
        let b = search(&filter_by_type(&filter_by_status(&txns, pending), expense), "s");
        assert_eq!(a, b);

        let q = TransactionQuery {
            search: "s".into(),
            kind: expense,
            status: pending,
            category: Selection::All,
        };
        assert_eq!(q.apply(&txns), a);
    }

    #[test]
    fn selection_parses_all_and_values() {
        let s: Selection<TransactionType> = "ALL".parse().unwrap();
        assert_eq!(s, Selection::All);
        let s: Selection<Category> = "food".parse().unwrap();
        assert_eq!(s, Selection::Only(Category::Food));
        assert!("bogus".parse::<Selection<TransactionStatus>>().is_err());
    }

    #[test]
    fn categories_are_distinct_in_first_seen_order() {
        let txns = Seed::demo().transactions;
        let cats = categories(&txns);
        assert_eq!(cats[0], Category::Shopping);
        assert_eq!(cats.len(), txns.len());
        assert_eq!(
            ids(&filter_by_category(&txns, Selection::Only(Category::Housing))),
            ["t5"]
        );
        assert_eq!(recent(&txns, 3).len(), 3);
    }
}
