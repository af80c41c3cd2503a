//! Plain-text table rendering for account rows.
//!
//! Columns are data: a key, a header label and a cell function. The first
//! column is indented by depth and carries the expand affordance.

use crate::api::accounts::RootQuery;
use crate::types::Account;

use super::expansion::NodeState;
use super::view::Row;

pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
    pub render: fn(&Account) -> String,
}

pub fn account_columns() -> Vec<Column> {
    vec![
        Column {
            key: "code",
            label: "Code",
            render: |a| a.code.clone(),
        },
        Column {
            key: "name",
            label: "Name",
            render: |a| a.name.clone(),
        },
        Column {
            key: "type",
            label: "Type",
            render: |a| a.type_name().to_string(),
        },
        Column {
            key: "balance",
            label: "Balance",
            render: |a| format_amount(a.balance.unwrap_or(0.0)),
        },
    ]
}

/// Keep the columns named in `keys`, in that order. Unknown keys are skipped;
/// no keys means every column.
pub fn select_columns(columns: Vec<Column>, keys: &[String]) -> Vec<Column> {
    if keys.is_empty() {
        return columns;
    }
    let mut pool: Vec<Option<Column>> = columns.into_iter().map(Some).collect();
    let mut picked = Vec::new();
    for key in keys {
        let key = key.trim();
        match pool
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|c| c.key == key))
            .and_then(Option::take)
        {
            Some(column) => picked.push(column),
            None => log::warn!("render: unknown or repeated column '{}'", key),
        }
    }
    picked
}

fn affordance(row: &Row) -> char {
    match row.state {
        NodeState::Loading => '…',
        NodeState::Expanded if row.expandable => '▾',
        _ if row.expandable => '▸',
        _ => ' ',
    }
}

pub fn render_table(rows: &[Row], columns: &[Column]) -> String {
    let header: Vec<String> = std::iter::once(String::new())
        .chain(columns.iter().map(|c| c.label.to_string()))
        .collect();

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mark = if row.selected { "[x]" } else { "[ ]" };
            let cells = columns.iter().enumerate().map(|(i, column)| {
                let value = (column.render)(&row.account);
                if i == 0 {
                    format!("{}{} {}", "  ".repeat(row.depth), affordance(row), value)
                } else {
                    value
                }
            });
            std::iter::once(mark.to_string()).chain(cells).collect()
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            body.iter()
                .map(|cells| cells[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for cells in &body {
        push_line(&mut out, cells, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// `11-20 of 41 items`
pub fn pagination_summary(query: &RootQuery, shown: usize, total: u64) -> String {
    if shown == 0 {
        return format!("0-0 of {} items", total);
    }
    let first = query.start() + 1;
    let last = query.start() + shown as u64;
    format!("{}-{} of {} items", first, last, total)
}

/// Indonesian-style grouping: `1.500.000`, `-25.000,50`.
pub fn format_amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    if frac == 0 {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{},{:02}", sign, grouped, frac)
    }
}
