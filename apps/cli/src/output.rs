//! Plain-text tables and JSON printing.

use chrono::NaiveDateTime;
use farsh_core::format_jalali;
use serde::Serialize;

use crate::error::CliResult;

/// Pretty-prints `value` as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Jalali date of a backend timestamp.
pub fn jalali(at: &NaiveDateTime) -> String {
    format_jalali(at.date())
}

/// Left-aligned columns sized to their widest cell.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.rows.push(cells.into_iter().map(|c| c.to_string()).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }

        let line = |cells: &[String]| {
            cells
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let pad = widths[i].saturating_sub(cell.chars().count());
                    format!("{}{}", cell, " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = line(&self.headers);
        out.push('\n');
        out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
        for row in &self.rows {
            out.push('\n');
            out.push_str(&line(row));
        }
        out
    }

    pub fn print(&self) {
        if self.is_empty() {
            println!("(none)");
        } else {
            println!("{}", self.render());
        }
    }
}

/// Two-column `label: value` listing.
pub fn print_fields(fields: &[(&str, String)]) {
    let width = fields.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (label, value) in fields {
        let pad = width - label.chars().count();
        println!("{}:{} {}", label, " ".repeat(pad), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_aligns_columns() {
        let mut table = Table::new(["ID", "Customer"]);
        table.row(["1", "Sara"]);
        table.row(["120", "Ali"]);

        let text = table.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID   Customer");
        assert_eq!(lines[1], "-------------");
        assert_eq!(lines[2], "1    Sara");
        assert_eq!(lines[3], "120  Ali");
    }

    #[test]
    fn test_widths_count_characters() {
        let mut table = Table::new(["Size"]);
        table.row(["شش متری"]);
        assert_eq!(table.render().lines().nth(1), Some("-------"));
    }
}
