//! Run summary table printed at the end of a preparation run

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::PipelineOutput;

/// Headline numbers of a preparation run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PipelineSummary {
    pub loaded_rows: usize,
    pub loaded_columns: usize,
    pub cleaned_rows: usize,
    pub cleaned_columns: usize,
    pub missing_before: usize,
    pub missing_after: usize,
    pub train_rows: usize,
    pub test_rows: usize,
}

impl PipelineSummary {
    pub fn from_output(output: &PipelineOutput) -> Self {
        let (loaded_rows, loaded_columns) = output.loaded_shape;
        let (cleaned_rows, cleaned_columns) = output.cleaned_shape;
        Self {
            loaded_rows,
            loaded_columns,
            cleaned_rows,
            cleaned_columns,
            missing_before: output.missing_before,
            missing_after: output.missing_after,
            train_rows: output.split.x_train.height(),
            test_rows: output.split.x_test.height(),
        }
    }

    pub fn dropped_rows(&self) -> usize {
        self.loaded_rows.saturating_sub(self.cleaned_rows)
    }

    pub fn dropped_columns(&self) -> usize {
        self.loaded_columns.saturating_sub(self.cleaned_columns)
    }

    /// Share of cleaned rows that went to the test set, in percent
    pub fn test_share(&self) -> f64 {
        let total = self.train_rows + self.test_rows;
        if total == 0 {
            0.0
        } else {
            self.test_rows as f64 / total as f64 * 100.0
        }
    }

    fn build_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Loaded"),
            Cell::new(format!("{} rows × {} cols", self.loaded_rows, self.loaded_columns)),
        ]);

        table.add_row(vec![
            Cell::new("🕳️  Missing Cells"),
            Cell::new(format!("{} → {}", self.missing_before, self.missing_after)).fg(
                if self.missing_after == 0 {
                    Color::Green
                } else {
                    Color::Yellow
                },
            ),
        ]);

        table.add_row(vec![
            Cell::new("🗑️  Dropped Rows"),
            Cell::new(self.dropped_rows()).fg(if self.dropped_rows() == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);

        table.add_row(vec![
            Cell::new("🗑️  Dropped Columns"),
            Cell::new(self.dropped_columns()).fg(if self.dropped_columns() == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);

        table.add_row(vec![
            Cell::new("🏋️  Train Rows"),
            Cell::new(self.train_rows)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("🧪 Test Rows"),
            Cell::new(format!("{} ({:.1}%)", self.test_rows, self.test_share()))
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
        ]);

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("RUN SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        // Indent the table
        for line in self.build_table().to_string().lines() {
            println!("    {}", line);
        }
    }
}
