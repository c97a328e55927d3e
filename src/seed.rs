// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Demo fixtures handed to the store on first open.

use rust_decimal::Decimal;

use crate::models::{
    Account, AccountType, AssetType, Category, Goal, Holding, PortfolioSnapshot,
    SPARKLINE_POINTS, Trade, TradeSide, Transaction, TransactionSource, TransactionStatus,
    TransactionType,
};

// Fixed wobble so the generated sparklines are reproducible.
const WOBBLE: [i64; SPARKLINE_POINTS] = [
    -100, -40, 25, -10, 60, 35, -55, 10, 80, 45, -20, 30, 70, -15, 50, 90, 20, 65, 40, 0,
];

#[derive(Debug, Clone, Default)]
pub struct Seed {
    pub transactions: Vec<Transaction>,
    pub accounts: Vec<Account>,
    pub goals: Vec<Goal>,
    pub holdings: Vec<Holding>,
    pub trades: Vec<Trade>,
    pub portfolio_history: Vec<PortfolioSnapshot>,
}

impl Seed {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn demo() -> Self {
        Self {
            transactions: demo_transactions(),
            accounts: demo_accounts(),
            goals: demo_goals(),
            holdings: demo_holdings(),
            trades: demo_trades(),
            portfolio_history: demo_history(),
        }
    }
}

/// Twenty points ending exactly at `base`, never dipping below 80% of it.
/// `volatility_pct` is a whole percent. Points near `Decimal::MAX` saturate.
pub fn sparkline(base: Decimal, volatility_pct: i64) -> Vec<Decimal> {
    let floor = base.saturating_mul(Decimal::new(8, 1));
    let mut points: Vec<Decimal> = WOBBLE
        .iter()
        .map(|w| {
            let swing = base.saturating_mul(Decimal::new(volatility_pct.saturating_mul(*w), 4));
            base.saturating_add(swing).max(floor)
        })
        .collect();
    if let Some(last) = points.last_mut() {
        *last = base;
    }
    points
}

fn flat_sparkline(value: Decimal) -> Vec<Decimal> {
    vec![value; SPARKLINE_POINTS]
}

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[allow(clippy::too_many_arguments)]
fn txn(
    id: &str,
    cents: i64,
    merchant: &str,
    category: Category,
    date: &str,
    status: TransactionStatus,
    source: TransactionSource,
    kind: TransactionType,
    image_url: Option<&str>,
    insight: &str,
) -> Transaction {
    Transaction {
        id: id.into(),
        amount: money(cents),
        merchant: merchant.into(),
        category,
        date: date.into(),
        status,
        r#type: kind,
        source,
        image_url: image_url.map(str::to_string),
        ai_insight: Some(insight.into()),
    }
}

fn demo_transactions() -> Vec<Transaction> {
    use Category::*;
    use TransactionSource::{Manual, Whatsapp};
    use TransactionStatus::{Confirmed, Pending};
    use TransactionType::{Expense, Income};

    vec![
        txn("t1", 15678, "Amazon", Shopping, "2025-01-28", Pending, Whatsapp, Expense,
            Some("https://images.unsplash.com/photo-1556742049-0cfed4f6a45d?w=200&h=200&fit=crop"),
            "This purchase is 23% higher than your average Amazon order. Consider reviewing if all items were necessary."),
        txn("t2", 8950, "Whole Foods", Groceries, "2025-01-27", Confirmed, Whatsapp, Expense,
            Some("https://images.unsplash.com/photo-1604719312566-8912e9227c6a?w=200&h=200&fit=crop"),
            "Your grocery spending is on track this month. You're 12% under your monthly grocery budget."),
        txn("t3", 4500, "Netflix + Spotify", Subscriptions, "2025-01-26", Confirmed, Manual, Expense,
            Some("https://images.unsplash.com/photo-1611162617474-5b21e879e113?w=200&h=200&fit=crop"),
            "You have 3 active streaming subscriptions totaling $45/month. Consider bundling options to save."),
        txn("t4", 23456, "Shell Gas Station", Transportation, "2025-01-25", Pending, Whatsapp, Expense,
            Some("https://images.unsplash.com/photo-1545262810-77515befe149?w=200&h=200&fit=crop"),
            "Fuel costs are up 15% this month. Your driving patterns suggest a potential savings of $40/month with route optimization."),
        txn("t5", 125000, "Rent Payment", Housing, "2025-01-01", Confirmed, Manual, Expense, None,
            "Housing costs represent 28% of your monthly income, which is within the recommended 30% threshold."),
        txn("t6", 6789, "Uber Eats", Food, "2025-01-24", Confirmed, Whatsapp, Expense,
            Some("https://images.unsplash.com/photo-1565299624946-b28f40a0ae38?w=200&h=200&fit=crop"),
            "Food delivery spending has increased 45% this month. Cooking at home could save you approximately $200/month."),
        txn("t7", 350000, "Salary Deposit", Category::Income, "2025-01-15", Confirmed, Manual, Income, None,
            "Your monthly salary has been deposited. You're on track to meet your savings goals."),
        txn("t8", 12000, "Electric Company", Utilities, "2025-01-20", Confirmed, Manual, Expense, None,
            "Your electricity bill is 8% lower than last month. Great job on energy conservation!"),
    ]
}

#[allow(clippy::too_many_arguments)]
fn holding(
    id: &str,
    symbol: &str,
    name: &str,
    quantity: Decimal,
    price: Decimal,
    cost: Decimal,
    change: Decimal,
    asset_type: AssetType,
    sparkline_data: Vec<Decimal>,
) -> Holding {
    Holding {
        id: id.into(),
        symbol: symbol.into(),
        name: name.into(),
        quantity,
        current_price: price,
        cost_basis: cost,
        change24h: change,
        sparkline_data,
        asset_type,
    }
}

fn demo_holdings() -> Vec<Holding> {
    vec![
        holding("h1", "AAPL", "Apple Inc.", Decimal::from(50), money(18592), money(14500),
            money(234), AssetType::Stock, sparkline(money(18592), 5)),
        holding("h2", "MSFT", "Microsoft Corp.", Decimal::from(25), money(37891), money(28000),
            money(-87), AssetType::Stock, sparkline(money(37891), 5)),
        holding("h3", "BTC", "Bitcoin", Decimal::new(5, 1), money(4325000), money(3500000),
            money(345), AssetType::Crypto, sparkline(money(4325000), 8)),
        holding("h4", "ETH", "Ethereum", Decimal::from(5), money(228000), money(180000),
            money(123), AssetType::Crypto, sparkline(money(228000), 7)),
        holding("h5", "VOO", "Vanguard S&P 500", Decimal::from(30), money(43215), money(38000),
            money(45), AssetType::Etf, sparkline(money(43215), 3)),
        holding("h6", "CASH", "Cash Reserve", Decimal::ONE, money(500000), money(500000),
            Decimal::ZERO, AssetType::Cash, flat_sparkline(money(500000))),
    ]
}

fn demo_trades() -> Vec<Trade> {
    vec![
        Trade::new("tr1", "h1", "AAPL", TradeSide::Buy, Decimal::from(10), money(14250), "2025-01-15"),
        Trade::new("tr2", "h3", "BTC", TradeSide::Buy, Decimal::new(1, 1), money(4100000), "2025-01-10"),
        Trade::new("tr3", "h2", "MSFT", TradeSide::Sell, Decimal::from(5), money(37500), "2025-01-08"),
        Trade::new("tr4", "h5", "VOO", TradeSide::Buy, Decimal::from(5), money(42800), "2025-01-05"),
        Trade::new("tr5", "h4", "ETH", TradeSide::Buy, Decimal::from(2), money(215000), "2024-12-28"),
    ]
}

fn demo_history() -> Vec<PortfolioSnapshot> {
    [
        ("2024-07-01", 45000),
        ("2024-08-01", 47500),
        ("2024-09-01", 46200),
        ("2024-10-01", 51800),
        ("2024-11-01", 54300),
        ("2024-12-01", 58900),
        ("2025-01-01", 62450),
        ("2025-01-15", 64200),
        ("2025-01-28", 67842),
    ]
    .into_iter()
    .map(|(date, value)| PortfolioSnapshot {
        date: date.into(),
        value: Decimal::from(value),
    })
    .collect()
}

fn account(
    id: &str,
    name: &str,
    kind: AccountType,
    cents: i64,
    institution: &str,
    last_updated: &str,
    number: &str,
) -> Account {
    Account {
        id: id.into(),
        name: name.into(),
        r#type: kind,
        balance: money(cents),
        institution: institution.into(),
        last_updated: last_updated.into(),
        account_number: Some(number.into()),
    }
}

fn demo_accounts() -> Vec<Account> {
    vec![
        account("acc1", "Main Checking", AccountType::Checking, 425000, "Chase", "2025-01-28", "****4521"),
        account("acc2", "Emergency Fund", AccountType::Savings, 1250000, "Marcus", "2025-01-28", "****8832"),
        account("acc3", "Credit Card", AccountType::Credit, -185000, "Amex", "2025-01-27", "****2234"),
        account("acc4", "Brokerage", AccountType::Investment, 4500000, "Fidelity", "2025-01-28", "****9912"),
    ]
}

fn goal(id: &str, name: &str, target: i64, current: i64, deadline: &str, icon: &str, color: &str) -> Goal {
    Goal {
        id: id.into(),
        name: name.into(),
        target_amount: Decimal::from(target),
        current_amount: Decimal::from(current),
        deadline: deadline.into(),
        icon: icon.into(),
        color: color.into(),
    }
}

fn demo_goals() -> Vec<Goal> {
    vec![
        goal("g1", "Emergency Fund", 15000, 12500, "2025-06-01", "shield", "emerald"),
        goal("g2", "Vacation", 5000, 2100, "2025-08-01", "plane", "blue"),
        goal("g3", "New Car", 25000, 8500, "2026-01-01", "car", "violet"),
        goal("g4", "Home Down Payment", 60000, 18000, "2027-01-01", "home", "amber"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparklines_have_fixed_length_and_end_at_price() {
        for h in Seed::demo().holdings {
            assert_eq!(h.sparkline_data.len(), SPARKLINE_POINTS, "{}", h.symbol);
            assert_eq!(h.sparkline_data.last(), Some(&h.current_price));
        }
    }

    #[test]
    fn sparkline_respects_floor() {
        let base = Decimal::from(100);
        let points = sparkline(base, 50);
        assert!(points.iter().all(|p| *p >= Decimal::from(80)));
    }

    #[test]
    fn sparkline_near_decimal_max_does_not_overflow() {
        let points = sparkline(Decimal::MAX, 5);
        assert_eq!(points.len(), SPARKLINE_POINTS);
        assert_eq!(points.last(), Some(&Decimal::MAX));
        assert!(points.iter().all(|p| *p > Decimal::ZERO));
    }

    #[test]
    fn demo_trade_totals_are_consistent() {
        for t in Seed::demo().trades {
            assert_eq!(t.total, t.expected_total());
        }
    }

    #[test]
    fn demo_ids_are_unique() {
        let seed = Seed::demo();
        let mut ids: Vec<&str> = seed.transactions.iter().map(|t| t.id.as_str()).collect();
        ids.extend(seed.goals.iter().map(|g| g.id.as_str()));
        ids.extend(seed.accounts.iter().map(|a| a.id.as_str()));
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
