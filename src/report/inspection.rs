//! Console rendering of inspection reports

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::InspectionReport;

/// Print an inspection report as an indented table
pub fn render_inspection(report: &InspectionReport) {
    let title = match report {
        InspectionReport::DataTypes { .. } => "DATA TYPES",
        InspectionReport::Summary { .. } => "SUMMARY STATISTICS",
        InspectionReport::Missing { .. } => "MISSING VALUES",
    };

    println!();
    println!("    {} {}", style("🔍").cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());

    for table in inspection_tables(report) {
        println!();
        for line in table.to_string().lines() {
            println!("    {}", line);
        }
    }

    if let InspectionReport::Missing { columns, .. } = report {
        if columns.is_empty() {
            println!();
            println!("      {}", style("No missing values").green());
        }
    }
}

/// Build the tables for a report; a summary yields one table per column kind
pub fn inspection_tables(report: &InspectionReport) -> Vec<Table> {
    match report {
        InspectionReport::DataTypes { columns } => {
            let mut table = new_table(&["Column", "Type", "Non-Null", "Null"]);
            for c in columns {
                table.add_row(vec![
                    Cell::new(&c.name),
                    Cell::new(&c.dtype).fg(Color::Cyan),
                    right(c.non_null),
                    right(c.nulls).fg(if c.nulls > 0 { Color::Yellow } else { Color::White }),
                ]);
            }
            vec![table]
        }
        InspectionReport::Summary {
            numeric,
            categorical,
        } => {
            let mut tables = Vec::new();
            if !numeric.is_empty() {
                let mut table = new_table(&[
                    "Column", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max",
                ]);
                for s in numeric {
                    table.add_row(vec![
                        Cell::new(&s.name),
                        right(s.count),
                        right(fmt_stat(s.mean)),
                        right(fmt_stat(s.std)),
                        right(fmt_stat(s.min)),
                        right(fmt_stat(s.q25)),
                        right(fmt_stat(s.median)),
                        right(fmt_stat(s.q75)),
                        right(fmt_stat(s.max)),
                    ]);
                }
                tables.push(table);
            }
            if !categorical.is_empty() {
                let mut table = new_table(&["Column", "Count", "Unique", "Top", "Freq"]);
                for s in categorical {
                    table.add_row(vec![
                        Cell::new(&s.name),
                        right(s.count),
                        right(s.unique),
                        Cell::new(s.top.as_deref().unwrap_or("-")),
                        right(s.freq),
                    ]);
                }
                tables.push(table);
            }
            tables
        }
        InspectionReport::Missing { columns, .. } => {
            if columns.is_empty() {
                return Vec::new();
            }
            let mut table = new_table(&["Column", "Missing", "Ratio"]);
            for m in columns {
                table.add_row(vec![
                    Cell::new(&m.name),
                    right(m.missing).fg(Color::Yellow),
                    right(format!("{:.1}%", m.ratio * 100.0)),
                ]);
            }
            vec![table]
        }
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn right<T: ToString>(value: T) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

fn fmt_stat(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string())
}
