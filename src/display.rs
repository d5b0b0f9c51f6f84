use serde::Serialize;
use std::collections::HashMap;

use crate::availability::{AvailabilityGrid, ExtractionResult, HeadcountRow};
use crate::parser::{META_COMMENT, META_LAST_UPDATE};

/// Plain tabular structure handed to the presentation layer: ordered column
/// names plus ordered rows, no markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Renders the table as aligned text for the CLI mode.
    pub fn to_text(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let format_line = |cells: &[String]| -> String {
            cells
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let width = widths.get(i).copied().unwrap_or(0);
                    let pad = width.saturating_sub(cell.chars().count());
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect::<Vec<String>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(format_line(&self.columns));
        for row in &self.rows {
            lines.push(format_line(row));
        }
        lines.join("\n")
    }

    /// Renders the table as an HTML `<table class="data">` for the page.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table class=\"data\">\n<thead><tr>");
        for column in &self.columns {
            html.push_str(&format!("<th>{}</th>", escape_html(column)));
        }
        html.push_str("</tr></thead>\n<tbody>\n");
        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{}</td>", escape_html(cell)));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>");
        html
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// The full wide grid: date column plus one column per member.
pub fn grid_table(grid: &AvailabilityGrid) -> Table {
    let mut columns = vec!["日付".to_string()];
    columns.extend(grid.members().iter().cloned());
    let rows = grid
        .rows()
        .iter()
        .map(|row| {
            let mut cells = vec![row.date.clone()];
            cells.extend(row.cells.iter().map(|s| s.as_str().to_string()));
            cells
        })
        .collect();
    Table { columns, rows }
}

/// The per-date headcount summary table.
pub fn headcount_table(rows: &[HeadcountRow]) -> Table {
    Table {
        columns: ["日付", "終日", "夜", "昼", "夜のみ", "昼のみ"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rows: rows
            .iter()
            .map(|row| {
                vec![
                    row.date.clone(),
                    row.full_day.to_string(),
                    row.evening_or_undecided.to_string(),
                    row.day_or_undecided.to_string(),
                    row.evening_only.to_string(),
                    row.day_only.to_string(),
                ]
            })
            .collect(),
    }
}

/// The extraction result restricted to the selected members.
pub fn extraction_table(result: &ExtractionResult) -> Table {
    let mut columns = vec!["日付".to_string()];
    columns.extend(result.members.iter().cloned());
    let rows = result
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.date.clone()];
            cells.extend(row.cells.iter().map(|s| s.as_str().to_string()));
            cells
        })
        .collect();
    Table { columns, rows }
}

/// Per-member metadata (last update time and comment) in display order.
pub fn metadata_table(
    members: &[String],
    metadata: &HashMap<String, HashMap<String, String>>,
) -> Table {
    let value_of = |member: &str, key: &str| -> String {
        metadata
            .get(member)
            .and_then(|entries| entries.get(key))
            .cloned()
            .unwrap_or_default()
    };
    Table {
        columns: ["メンバー", "最終更新", "コメント"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rows: members
            .iter()
            .map(|member| {
                vec![
                    member.clone(),
                    value_of(member, META_LAST_UPDATE),
                    value_of(member, META_COMMENT),
                ]
            })
            .collect(),
    }
}
