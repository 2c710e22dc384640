//! Plain-text rendering of ledger rows with a totals footer.

use stockbook_core::LedgerEngine;
use stockbook_domain::{Field, LedgerKind, LineItem};

const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct TableColumn {
    pub header: String,
    pub alignment: Alignment,
}

impl TableColumn {
    pub fn new(header: impl Into<String>, alignment: Alignment) -> Self {
        Self {
            header: header.into(),
            alignment,
        }
    }
}

/// Columns, body rows, and an optional footer row set off by a rule.
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
    pub footer: Option<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<TableColumn>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            footer: None,
        }
    }

    pub fn add_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                self.rows
                    .iter()
                    .chain(self.footer.iter())
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .fold(column.header.chars().count(), usize::max)
            })
            .collect()
    }

    fn render_line(&self, cells: &[String], widths: &[usize]) -> String {
        let line = self
            .columns
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(idx, (column, width))| {
                let cell = cells.get(idx).map(String::as_str).unwrap_or("");
                match column.alignment {
                    Alignment::Left => format!("{:<width$}", cell, width = *width),
                    Alignment::Right => format!("{:>width$}", cell, width = *width),
                }
            })
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);
        line.trim_end().to_string()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let total = widths.iter().sum::<usize>() + COLUMN_GAP.len() * widths.len().saturating_sub(1);
        let rule = "-".repeat(total);
        let headers: Vec<String> = self.columns.iter().map(|col| col.header.clone()).collect();

        let mut lines = vec![self.render_line(&headers, &widths), rule.clone()];
        lines.extend(self.rows.iter().map(|row| self.render_line(row, &widths)));
        if let Some(footer) = &self.footer {
            lines.push(rule);
            lines.push(self.render_line(footer, &widths));
        }
        lines.join("\n")
    }
}

fn column_header(field: Field) -> &'static str {
    match field {
        Field::Beginning => "BEG",
        Field::Production => "PROD",
        Field::Delivery => "DELIV",
        Field::Returned => "RET",
        Field::Over => "OVER",
        Field::Used => "USED",
        Field::CashierOut => "CASH",
        Field::BarOut => "BAR",
        Field::KitchenOut => "KITCH",
        Field::OneBranchOut => "1BR",
        Field::Foodtrays => "TRAYS",
        Field::Event => "EVENT",
        Field::Spoilage => "SPOIL",
        Field::Short => "SHORT",
        Field::Sold => "SOLD",
    }
}

/// Whole numbers print without decimals; fractions keep up to two places.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// One sub-ledger as a table; endings and the footer come from the formula, never stored values.
pub fn ledger_table(items: &[LineItem], kind: LedgerKind) -> Table {
    let formula = kind.formula();
    let mut columns = vec![
        TableColumn::new("ID", Alignment::Right),
        TableColumn::new("ITEM", Alignment::Left),
    ];
    columns.extend(
        Field::ALL
            .iter()
            .map(|field| TableColumn::new(column_header(*field), Alignment::Right)),
    );
    columns.push(TableColumn::new("END", Alignment::Right));

    let mut table = Table::new(columns);
    for item in items {
        let mut cells = vec![item.id.to_string(), item.name.clone()];
        cells.extend(Field::ALL.iter().map(|field| format_quantity(item.get(*field))));
        cells.push(format_quantity(LedgerEngine::recompute_ending(item, formula)));
        table.add_row(cells);
    }

    let totals = LedgerEngine::aggregate_totals(items, formula);
    let mut footer = vec![String::new(), format!("TOTAL ({})", totals.item_count)];
    footer.extend(Field::ALL.iter().map(|field| format_quantity(totals.get(*field))));
    footer.push(format_quantity(totals.ending));
    table.footer = Some(footer);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_drop_needless_decimals() {
        assert_eq!(format_quantity(12.0), "12");
        assert_eq!(format_quantity(-5.0), "-5");
        assert_eq!(format_quantity(2.5), "2.5");
        assert_eq!(format_quantity(0.126), "0.13");
        assert_eq!(format_quantity(-0.0), "0");
    }

    #[test]
    fn empty_ledger_renders_zero_footer() {
        let rendered = ledger_table(&[], LedgerKind::Main).render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[3].trim_start().starts_with("TOTAL (0)"));
        assert!(lines[3].ends_with(" 0"));
    }
}
