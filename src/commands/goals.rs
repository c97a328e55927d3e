// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::open_store;
use crate::metrics::{GoalProgress, GoalsOverview, days_left, goal_progress, goals_overview};
use crate::models::Goal;
use crate::utils::{
    fmt_money, fmt_pct, get_currency, maybe_print_json, new_id, optional, parse_amount,
    parse_date, parse_positive, pretty_table, required, today,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("fund", sub)) => fund(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            let mut store = open_store(conn);
            if store.remove_goal(id) {
                println!("Removed goal '{}'", id);
            } else {
                println!("Goal '{}' not found", id);
            }
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = required(sub, "name")?.to_string();
    let target_amount = parse_positive(required(sub, "target")?)?;
    let current_amount = parse_amount(required(sub, "current")?)?;
    let deadline = parse_date(required(sub, "deadline")?)?;
    let icon = required(sub, "icon")?.to_string();
    let color = required(sub, "color")?.to_string();

    let mut store = open_store(conn);
    let id = new_id("g", |id| store.goal(id).is_some());
    println!("Added goal '{}' ({})", name, id);
    store.add_goal(Goal {
        id,
        name,
        target_amount,
        current_amount,
        deadline: deadline.to_string(),
        icon,
        color,
    });
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let name = optional(sub, "name").map(str::to_string);
    let target = optional(sub, "target").map(parse_positive).transpose()?;
    let current = optional(sub, "current").map(parse_amount).transpose()?;
    let deadline = optional(sub, "deadline").map(parse_date).transpose()?;
    let icon = optional(sub, "icon").map(str::to_string);
    let color = optional(sub, "color").map(str::to_string);

    let mut store = open_store(conn);
    let found = store.update_goal(id, |g| {
        if let Some(v) = name {
            g.name = v;
        }
        if let Some(v) = target {
            g.target_amount = v;
        }
        if let Some(v) = current {
            g.current_amount = v;
        }
        if let Some(v) = deadline {
            g.deadline = v.to_string();
        }
        if let Some(v) = icon {
            g.icon = v;
        }
        if let Some(v) = color {
            g.color = v;
        }
    });
    if found {
        println!("Updated goal '{}'", id);
    } else {
        println!("Goal '{}' not found", id);
    }
    Ok(())
}

fn fund(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let amount = parse_amount(required(sub, "amount")?)?;
    let mut store = open_store(conn);
    if !store.contribute_to_goal(id, amount) {
        println!("Goal '{}' not found", id);
        return Ok(());
    }
    if let Some(goal) = store.goal(id) {
        let ccy = get_currency(conn)?;
        let progress = goal_progress(goal);
        println!(
            "{}: {} of {} ({})",
            goal.name,
            fmt_money(&goal.current_amount, &ccy),
            fmt_money(&goal.target_amount, &ccy),
            fmt_pct(&progress.percentage)
        );
        if progress.is_complete {
            println!("Goal reached");
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRow {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress: GoalProgress,
    pub days_left: Option<i64>,
}

#[derive(Serialize)]
pub struct GoalsReport {
    pub goals: Vec<GoalRow>,
    pub overview: GoalsOverview,
}

pub fn report(conn: &Connection) -> GoalsReport {
    let store = open_store(conn);
    let now = today();
    GoalsReport {
        goals: store
            .goals()
            .iter()
            .map(|g| GoalRow {
                goal: g.clone(),
                progress: goal_progress(g),
                days_left: days_left(g, now),
            })
            .collect(),
        overview: goals_overview(store.goals()),
    }
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let report = report(conn);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report.goals)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let data = report
        .goals
        .iter()
        .map(|row| {
            let g = &row.goal;
            let days = match row.days_left {
                Some(d) if d < 0 => format!("{} overdue", -d),
                Some(d) => d.to_string(),
                None => "-".to_string(),
            };
            vec![
                g.id.clone(),
                g.name.clone(),
                fmt_money(&g.current_amount, &ccy),
                fmt_money(&g.target_amount, &ccy),
                format!("{:.1}%", row.progress.percentage.round_dp(1)),
                fmt_money(&row.progress.remaining, &ccy),
                g.deadline.clone(),
                days,
                (if row.progress.is_complete { "yes" } else { "" }).to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "Id", "Goal", "Saved", "Target", "Progress", "Remaining", "Deadline", "Days Left",
                "Done",
            ],
            data,
        )
    );
    let o = report.overview;
    println!(
        "Saved {} of {} ({:.1}%)",
        fmt_money(&o.total_saved, &ccy),
        fmt_money(&o.total_target, &ccy),
        o.percentage.round_dp(1)
    );
    Ok(())
}
