// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Record shapes held by the store. Dates are zero-padded ISO strings
//! (`YYYY-MM-DD`); lexical order on them is chronological order.

use anyhow::{Result, anyhow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SPARKLINE_POINTS: usize = 20;

macro_rules! string_enum {
    ($name:ident, $what:literal, { $($variant:ident => $key:literal, $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self> {
                let key = s.trim().to_lowercase();
                match key.as_str() {
                    $($key => Ok($name::$variant),)+
                    _ => Err(anyhow!(
                        "Unknown {} '{}' (expected one of: {})",
                        $what,
                        s.trim(),
                        [$($key),+].join(", ")
                    )),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Shopping,
    Groceries,
    Subscriptions,
    Transportation,
    Housing,
    Food,
    Entertainment,
    Utilities,
    Health,
    Travel,
    Education,
    Income,
    Other,
}

string_enum!(Category, "category", {
    Shopping => "shopping", "Shopping",
    Groceries => "groceries", "Groceries",
    Subscriptions => "subscriptions", "Subscriptions",
    Transportation => "transportation", "Transportation",
    Housing => "housing", "Housing",
    Food => "food", "Food & Dining",
    Entertainment => "entertainment", "Entertainment",
    Utilities => "utilities", "Utilities",
    Health => "health", "Health",
    Travel => "travel", "Travel",
    Education => "education", "Education",
    Income => "income", "Salary",
    Other => "other", "Other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
}

string_enum!(TransactionStatus, "status", {
    Pending => "pending", "Pending",
    Confirmed => "confirmed", "Confirmed",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

string_enum!(TransactionType, "transaction type", {
    Income => "income", "Income",
    Expense => "expense", "Expense",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    Whatsapp,
    Manual,
    Import,
}

string_enum!(TransactionSource, "source", {
    Whatsapp => "whatsapp", "WhatsApp",
    Manual => "manual", "Manual",
    Import => "import", "Import",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Stock,
    Crypto,
    Etf,
    Cash,
}

string_enum!(AssetType, "asset type", {
    Stock => "stock", "Stocks",
    Crypto => "crypto", "Crypto",
    Etf => "etf", "ETFs",
    Cash => "cash", "Cash",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

string_enum!(TradeSide, "trade side", {
    Buy => "buy", "Buy",
    Sell => "sell", "Sell",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
    Credit,
    Investment,
    Cash,
}

string_enum!(AccountType, "account type", {
    Checking => "checking", "Checking",
    Savings => "savings", "Savings",
    Credit => "credit", "Credit Card",
    Investment => "investment", "Investment",
    Cash => "cash", "Cash",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    pub merchant: String,
    pub category: Category,
    pub date: String,
    pub status: TransactionStatus,
    pub r#type: TransactionType,
    pub source: TransactionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_insight: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub quantity: Decimal,
    pub current_price: Decimal,
    /// Per-unit price paid.
    pub cost_basis: Decimal,
    /// Signed percent.
    pub change24h: Decimal,
    pub sparkline_data: Vec<Decimal>,
    pub asset_type: AssetType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    /// Not checked against the holdings collection; orphans are allowed.
    pub holding_id: String,
    pub symbol: String,
    pub r#type: TradeSide,
    pub quantity: Decimal,
    pub price: Decimal,
    pub date: String,
    pub total: Decimal,
}

impl Trade {
    /// Builds a trade whose total is `quantity * price`. Totals read back from
    /// storage are kept as written.
    pub fn new(
        id: impl Into<String>,
        holding_id: impl Into<String>,
        symbol: impl Into<String>,
        side: TradeSide,
        quantity: Decimal,
        price: Decimal,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            holding_id: holding_id.into(),
            symbol: symbol.into(),
            r#type: side,
            quantity,
            price,
            date: date.into(),
            total: quantity.saturating_mul(price),
        }
    }

    /// `quantity * price`, saturating at `Decimal::MAX`.
    pub fn expected_total(&self) -> Decimal {
        self.quantity.saturating_mul(self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub r#type: AccountType,
    /// Negative balances are liabilities.
    pub balance: Decimal,
    pub institution: String,
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: String,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub date: String,
    pub value: Decimal,
}

/// Masks all but the last four characters, e.g. `****4521`.
pub fn mask_account_number(raw: &str) -> String {
    let trimmed = raw.trim();
    let tail: String = trimmed
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!(" Food ".parse::<Category>().unwrap(), Category::Food);
        assert_eq!("ETF".parse::<AssetType>().unwrap(), AssetType::Etf);
        assert!("groceryz".parse::<Category>().is_err());
    }

    #[test]
    fn trade_total_saturates_on_overflow() {
        let t = Trade::new(
            "tr",
            "h",
            "SYM",
            TradeSide::Buy,
            Decimal::from(100_000),
            Decimal::MAX,
            "2025-01-02",
        );
        assert_eq!(t.total, Decimal::MAX);
        assert_eq!(t.expected_total(), t.total);
    }

    #[test]
    fn transaction_serializes_with_camel_case_keys() {
        let t = Transaction {
            id: "t1".into(),
            amount: Decimal::new(1050, 2),
            merchant: "Cafe".into(),
            category: Category::Food,
            date: "2025-01-02".into(),
            status: TransactionStatus::Pending,
            r#type: TransactionType::Expense,
            source: TransactionSource::Manual,
            image_url: None,
            ai_insight: Some("note".into()),
        };
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["type"], "expense");
        assert_eq!(v["aiInsight"], "note");
        assert!(v.get("imageUrl").is_none());
    }

    #[test]
    fn trade_new_derives_total() {
        let trade = Trade::new(
            "tr1",
            "h1",
            "AAPL",
            TradeSide::Buy,
            Decimal::from(10),
            Decimal::new(14250, 2),
            "2025-01-15",
        );
        assert_eq!(trade.total, Decimal::new(142500, 2));
        assert_eq!(trade.total, trade.expected_total());
    }

    #[test]
    fn account_number_mask_keeps_last_four() {
        assert_eq!(mask_account_number(" 1234567890 "), "****7890");
        assert_eq!(mask_account_number("12"), "****12");
    }
}
