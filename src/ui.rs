//! Terminal output: a box-drawn table and the module summary built on it.

use crate::cmake::module_filter;
use crate::graph::ModuleGraph;
use colored::*;
use console::{measure_text_width, truncate_str};

/// Columns never shrink below this when fitting the terminal.
const MIN_COLUMN: usize = 8;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are ignored.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn print(&self) {
        let (_, width) = console::Term::stdout().size();
        print!("{}", self.render(width as usize));
    }

    /// Lays the table out to fit `max_width` columns.
    pub fn render(&self, max_width: usize) -> String {
        if self.headers.is_empty() {
            return String::new();
        }

        let widths = self.fit_widths(max_width);
        let border = |left: &str, mid: &str, right: &str| {
            let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}\n", left, cells.join(mid), right)
        };

        let mut out = border("┌", "┬", "┐");
        out.push_str(&render_row(&self.headers, &widths, true));
        out.push_str(&border("├", "┼", "┤"));
        for row in &self.rows {
            out.push_str(&render_row(row, &widths, false));
        }
        out.push_str(&border("└", "┴", "┘"));
        out
    }

    fn fit_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| measure_text_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(measure_text_width(&flatten(cell)));
            }
        }

        let overhead = 3 + 3 * widths.len();
        let available = max_width.saturating_sub(overhead);
        while widths.iter().sum::<usize>() > available {
            let Some((widest, width)) = widths
                .iter()
                .copied()
                .enumerate()
                .max_by_key(|(_, w)| *w)
            else {
                break;
            };
            if width <= MIN_COLUMN {
                break;
            }
            widths[widest] -= 1;
        }
        widths
    }
}

fn render_row(cells: &[String], widths: &[usize], header: bool) -> String {
    let mut line = String::from("  │");
    for (cell, width) in cells.iter().zip(widths) {
        let text = truncate_str(&flatten(cell), *width, "...").to_string();
        let padding = width.saturating_sub(measure_text_width(&text));
        let text = if header { text.bold().to_string() } else { text };
        line.push_str(&format!(" {}{} │", text, " ".repeat(padding)));
    }
    line.push('\n');
    line
}

fn flatten(cell: &str) -> String {
    cell.replace(['\n', '\r', '\t'], " ")
}

/// One row per loaded module: target, kind, IDE folder and source count.
/// Excluded modules are listed but marked.
pub fn module_summary(graph: &ModuleGraph, root: &str) -> Table {
    let mut table = Table::new(&["Target", "Kind", "Folder", "Sources"]);
    for (_, module) in graph.all_modules() {
        let kind = if module.is_excluded() {
            format!("{} (excluded)", module.kind)
        } else if module.is_toolchain() {
            "toolchain".to_string()
        } else {
            module.kind.to_string()
        };
        table.add_row(vec![
            module.target_name(),
            kind,
            module_filter(module, root).unwrap_or_else(|| "-".to_string()),
            module.sources.len().to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_rows_with_wrong_arity_are_dropped() {
        let mut table = Table::new(&["Target", "Kind"]);
        table.add_row(vec!["Core".into()]);
        table.add_row(vec!["Core".into(), "static".into()]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_render_layout() {
        plain();
        let mut table = Table::new(&["Target", "Kind"]);
        table.add_row(vec!["Kepler.Core".into(), "static".into()]);
        assert_eq!(
            table.render(120),
            "  ┌─────────────┬────────┐\n  \
             │ Target      │ Kind   │\n  \
             ├─────────────┼────────┤\n  \
             │ Kepler.Core │ static │\n  \
             └─────────────┴────────┘\n"
        );
    }

    #[test]
    fn test_narrow_terminal_truncates_widest_column() {
        plain();
        let mut table = Table::new(&["Target", "Folder"]);
        table.add_row(vec![
            "Kepler.Core".into(),
            "Engine/Runtime/Very/Deep/Folder".into(),
        ]);
        let out = table.render(40);
        assert!(out.lines().all(|l| measure_text_width(l) <= 40));
        assert!(out.contains("..."));
        assert!(out.contains("Kepler.Core"));
    }
}
