//! Terminal styling utilities for the pipeline's console output

use console::{style, Emoji};

use crate::pipeline::PipelineConfig;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static BROOM: Emoji<'_, '_> = Emoji("🧹 ", "");
pub static SCISSORS: Emoji<'_, '_> = Emoji("✂️  ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("pricewise").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    println!(
        "    {}",
        style("Load, clean and split house-price datasets").dim()
    );
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(config: &PipelineConfig) {
    let box_width = 60;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!("    │ {:<w$}│", style("⚙️  Configuration").cyan().bold(), w = box_width - 3);
    println!("    ├{}┤", line);
    print_config_row(PACKAGE, "Archive", &config.archive.display().to_string(), box_width);
    print_config_row(FOLDER, "Extract", &config.extract_dir.display().to_string(), box_width);
    print_config_row(TARGET, "Target", &config.target_column, box_width);
    println!("    ├{}┤", line);
    print_config_row(BROOM, "Missing", &config.missing.to_string(), box_width);
    print_config_row(SCISSORS, "Split", &config.split.to_string(), box_width);
    println!("    └{}┘", line);
    println!();
}

fn print_config_row(icon: Emoji<'_, '_>, label: &str, value: &str, box_width: usize) {
    let value_width = box_width - 17;
    println!(
        "    │  {}{:<8} {:<w$}│",
        icon,
        format!("{}:", label),
        truncate_string(value, value_width),
        w = value_width
    );
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Dataset ready for modelling!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    match detail {
        Some(info) => println!(
            "      {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        ),
        None => println!("      {} {}", style(count).yellow().bold(), description),
    }
}

/// Shorten long values from the left, keeping the informative tail
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(char_count - (max_len - 3)).collect();
        format!("...{}", tail)
    }
}
