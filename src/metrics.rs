// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived figures for the dashboard, portfolio, accounts, and goals views.
//!
//! Every function here is total: empty inputs give zeros or empty vectors,
//! and a percentage whose denominator is zero is defined as zero.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

use anyhow::anyhow;

use crate::models::{
    Account, AssetType, Goal, Holding, PortfolioSnapshot, Transaction, TransactionStatus,
    TransactionType,
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// `part / whole * 100`, or zero when `whole` is zero. A ratio too large
/// for `Decimal` saturates at `MAX`/`MIN`.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    match part.checked_div(whole).and_then(|q| q.checked_mul(HUNDRED)) {
        Some(pct) => pct,
        None if part.is_sign_negative() == whole.is_sign_negative() => Decimal::MAX,
        None => Decimal::MIN,
    }
}

/// Sum that saturates instead of panicking on overflow.
fn total<I: IntoIterator<Item = Decimal>>(values: I) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlow {
    pub amount: Decimal,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GainLoss {
    pub amount: Decimal,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSlice {
    pub asset_type: AssetType,
    pub label: &'static str,
    pub value: Decimal,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub percentage: Decimal,
    pub remaining: Decimal,
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateGroup {
    pub date: String,
    pub transactions: Vec<Transaction>,
}

pub fn market_value(holding: &Holding) -> Decimal {
    holding.quantity.saturating_mul(holding.current_price)
}

pub fn cost_value(holding: &Holding) -> Decimal {
    holding.quantity.saturating_mul(holding.cost_basis)
}

/// Total market value across holdings. Valuations saturate rather than
/// overflow.
pub fn net_worth(holdings: &[Holding]) -> Decimal {
    total(holdings.iter().map(market_value))
}

/// Income minus expenses for transactions whose date starts with `month`
/// (`YYYY-MM`), with the net as a share of that month's income.
pub fn monthly_cash_flow(transactions: &[Transaction], month: &str) -> CashFlow {
    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    for t in transactions.iter().filter(|t| t.date.starts_with(month)) {
        match t.r#type {
            TransactionType::Income => income = income.saturating_add(t.amount),
            TransactionType::Expense => expenses = expenses.saturating_add(t.amount),
        }
    }
    let amount = income.saturating_sub(expenses);
    CashFlow {
        amount,
        percentage: percent_of(amount, income),
    }
}

pub fn gain_loss(holdings: &[Holding]) -> GainLoss {
    let cost = total(holdings.iter().map(cost_value));
    let amount = net_worth(holdings).saturating_sub(cost);
    GainLoss {
        amount,
        percentage: percent_of(amount, cost),
    }
}

/// Market value per asset type, in order of first appearance.
pub fn asset_distribution(holdings: &[Holding]) -> Vec<AllocationSlice> {
    let mut index_by_type: HashMap<AssetType, usize> = HashMap::new();
    let mut slices: Vec<AllocationSlice> = Vec::new();
    for h in holdings {
        let value = market_value(h);
        match index_by_type.get(&h.asset_type) {
            Some(&idx) => slices[idx].value = slices[idx].value.saturating_add(value),
            None => {
                index_by_type.insert(h.asset_type, slices.len());
                slices.push(AllocationSlice {
                    asset_type: h.asset_type,
                    label: h.asset_type.label(),
                    value,
                    percentage: Decimal::ZERO,
                });
            }
        }
    }
    let sum = total(slices.iter().map(|s| s.value));
    for slice in &mut slices {
        slice.percentage = percent_of(slice.value, sum);
    }
    slices
}

/// Progress is not clamped: an over-funded goal reports more than 100%.
pub fn goal_progress(goal: &Goal) -> GoalProgress {
    let percentage = percent_of(goal.current_amount, goal.target_amount);
    GoalProgress {
        percentage,
        remaining: goal
            .target_amount
            .saturating_sub(goal.current_amount)
            .max(Decimal::ZERO),
        is_complete: percentage >= HUNDRED,
    }
}

/// Partitions by exact date, most recent date first. Transactions keep
/// their input order within a group.
pub fn group_by_date(transactions: &[Transaction]) -> Vec<DateGroup> {
    let mut index_by_date: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<DateGroup> = Vec::new();
    for t in transactions {
        match index_by_date.get(t.date.as_str()) {
            Some(&idx) => groups[idx].transactions.push(t.clone()),
            None => {
                index_by_date.insert(t.date.as_str(), groups.len());
                groups.push(DateGroup {
                    date: t.date.clone(),
                    transactions: vec![t.clone()],
                });
            }
        }
    }
    // Zero-padded ISO dates sort lexically in calendar order.
    groups.sort_by(|a, b| b.date.cmp(&a.date));
    groups
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingPerformance {
    pub value: Decimal,
    pub cost: Decimal,
    pub gain: Decimal,
    pub percentage: Decimal,
}

pub fn holding_performance(holding: &Holding) -> HoldingPerformance {
    let value = market_value(holding);
    let cost = cost_value(holding);
    let gain = value.saturating_sub(cost);
    HoldingPerformance {
        value,
        cost,
        gain,
        percentage: percent_of(gain, cost),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub assets: Decimal,
    pub liabilities: Decimal,
    pub net_worth: Decimal,
}

pub fn account_summary(accounts: &[Account]) -> AccountSummary {
    let assets = total(
        accounts
            .iter()
            .map(|a| a.balance)
            .filter(|b| b.is_sign_positive() && !b.is_zero()),
    );
    let liabilities = total(
        accounts
            .iter()
            .map(|a| a.balance)
            .filter(|b| b.is_sign_negative() && !b.is_zero())
            .map(|b| b.abs()),
    );
    AccountSummary {
        assets,
        liabilities,
        net_worth: assets.saturating_sub(liabilities),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalsOverview {
    pub total_target: Decimal,
    pub total_saved: Decimal,
    pub percentage: Decimal,
}

pub fn goals_overview(goals: &[Goal]) -> GoalsOverview {
    let total_target = total(goals.iter().map(|g| g.target_amount));
    let total_saved = total(goals.iter().map(|g| g.current_amount));
    GoalsOverview {
        total_target,
        total_saved,
        percentage: percent_of(total_saved, total_target),
    }
}

/// Whole days from `today` to the goal deadline; negative once it has
/// passed. `None` when the deadline is not a valid ISO date.
pub fn days_left(goal: &Goal, today: NaiveDate) -> Option<i64> {
    let deadline = NaiveDate::parse_from_str(&goal.deadline, "%Y-%m-%d").ok()?;
    Some((deadline - today).num_days())
}

/// Percent change of `current` against the first snapshot.
pub fn portfolio_growth(current: Decimal, history: &[PortfolioSnapshot]) -> Decimal {
    match history.first() {
        Some(first) => percent_of(current.saturating_sub(first.value), first.value),
        None => Decimal::ZERO,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Week,
    Month,
    Quarter,
    Year,
    All,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Week => "1W",
            TimeRange::Month => "1M",
            TimeRange::Quarter => "3M",
            TimeRange::Year => "1Y",
            TimeRange::All => "ALL",
        }
    }

    fn start_from(&self, latest: NaiveDate) -> Option<NaiveDate> {
        match self {
            TimeRange::Week => latest.checked_sub_days(chrono::Days::new(7)),
            TimeRange::Month => latest.checked_sub_months(Months::new(1)),
            TimeRange::Quarter => latest.checked_sub_months(Months::new(3)),
            TimeRange::Year => latest.checked_sub_months(Months::new(12)),
            TimeRange::All => None,
        }
    }
}

impl FromStr for TimeRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "1W" => Ok(TimeRange::Week),
            "1M" => Ok(TimeRange::Month),
            "3M" => Ok(TimeRange::Quarter),
            "1Y" => Ok(TimeRange::Year),
            "ALL" => Ok(TimeRange::All),
            other => Err(anyhow!("Unknown range '{}' (use 1W|1M|3M|1Y|ALL)", other)),
        }
    }
}

/// Snapshots dated within `range` of the latest snapshot, inclusive.
/// Snapshots with unparseable dates only survive `TimeRange::All`.
pub fn history_window(history: &[PortfolioSnapshot], range: TimeRange) -> Vec<PortfolioSnapshot> {
    let parse = |s: &PortfolioSnapshot| NaiveDate::parse_from_str(&s.date, "%Y-%m-%d").ok();
    let Some(latest) = history.iter().filter_map(parse).max() else {
        return history.to_vec();
    };
    let Some(start) = range.start_from(latest) else {
        return history.to_vec();
    };
    history
        .iter()
        .filter(|s| parse(*s).is_some_and(|d| d >= start))
        .cloned()
        .collect()
}

pub fn total_amount(transactions: &[Transaction]) -> Decimal {
    total(transactions.iter().map(|t| t.amount))
}

pub fn pending_count(transactions: &[Transaction]) -> usize {
    transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Pending)
        .count()
}
