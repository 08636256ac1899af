//! Pricewise: dataset preparation CLI
//!
//! Extracts a zip archive holding one tabular file, handles its missing
//! values and splits it into train and test sets.

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::ProgressBar;
use polars::prelude::*;
use tracing::error;

use pricewise::cli::{inspection_strategies, Cli, CliInspectKind, Commands};
use pricewise::error::PrepError;
use pricewise::pipeline::{
    clean_with_config, load_dataset, load_with_config, split_with_config, DataInspector,
    InspectionReport, InspectionStrategy, PipelineOutput, SplitResult, StageTimings,
};
use pricewise::report::{export_run_report, render_inspection, PipelineSummary, RunReport};
use pricewise::utils::{
    create_spinner, finish_with_error, finish_with_success, init_logging, print_banner,
    print_completion, print_config, print_count, print_info, print_step_header, print_success,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.quiet);

    if let Some(command) = &cli.command {
        return match command {
            Commands::Inspect {
                archive,
                kind,
                extract_dir,
            } => run_inspect(archive, kind, extract_dir),
        };
    }

    let config = cli.pipeline_config()?;

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&config);

    let mut timings = StageTimings::default();
    let mut step = 1;

    // Step 1: Load dataset
    print_step_header(step, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Extracting archive...");
    let df = load_with_config(&config).map_err(|e| {
        stage_failed(
            &spinner,
            &format!("Failed to load {}", config.archive.display()),
            e,
        )
    })?;
    finish_with_success(&spinner, "Dataset loaded");
    timings.load = step_start.elapsed();

    let (rows, cols) = df.shape();
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);

    // Step 2 (optional): Inspect
    let mut inspections = Vec::new();
    let strategies = inspection_strategies(&cli.inspect);
    if !strategies.is_empty() {
        step += 1;
        print_step_header(step, "Inspect Dataset");
        inspections = inspect_all(&df, &strategies)?;
        for report in &inspections {
            render_inspection(report);
        }
    }

    // Handle missing values
    step += 1;
    print_step_header(step, "Missing Values");
    let step_start = Instant::now();
    let spinner = create_spinner("Handling missing values...");
    let cleaned = clean_with_config(&config, &df)
        .map_err(|e| stage_failed(&spinner, "Failed to handle missing values", e))?;
    finish_with_success(&spinner, &format!("Applied {}", config.missing));
    if cleaned.missing_before == 0 {
        print_info("No missing values found");
    } else {
        print_count(
            "missing cell(s) handled",
            cleaned.missing_before - cleaned.missing_after,
            Some(&format!("({} remaining)", cleaned.missing_after)),
        );
    }
    timings.missing = step_start.elapsed();

    // Split
    step += 1;
    print_step_header(step, "Train/Test Split");
    let step_start = Instant::now();
    let spinner = create_spinner("Splitting dataset...");
    let split = split_with_config(&config, &cleaned.frame)
        .map_err(|e| stage_failed(&spinner, "Failed to split dataset", e))?;
    finish_with_success(&spinner, "Dataset split");
    timings.split = step_start.elapsed();

    let output = PipelineOutput::new(df.shape(), &cleaned, split, timings);

    // Persist outputs
    if cli.output_dir.is_some() || cli.report.is_some() {
        step += 1;
        print_step_header(step, "Save Results");
    }

    if let Some(dir) = &cli.output_dir {
        let spinner = create_spinner("Writing train and test sets...");
        save_split(&output.split, dir)?;
        finish_with_success(
            &spinner,
            &format!("Saved train.csv and test.csv to {}", dir.display()),
        );
    }

    if let Some(path) = &cli.report {
        let report = RunReport::new(&config, &output).with_inspections(inspections);
        export_run_report(&report, path)?;
        print_success(&format!("Run report written to {}", path.display()));
    }

    PipelineSummary::from_output(&output).display();
    print_completion();

    Ok(())
}

/// The `inspect` subcommand: load and print reports, nothing else
fn run_inspect(archive: &Path, kinds: &[CliInspectKind], extract_dir: &Path) -> Result<()> {
    let df = load_dataset(archive, extract_dir)
        .with_context(|| format!("Failed to load {}", archive.display()))?;

    let strategies = if kinds.is_empty() {
        InspectionStrategy::ALL.to_vec()
    } else {
        inspection_strategies(kinds)
    };

    let (rows, cols) = df.shape();
    print_info(&format!("{}: {} rows × {} columns", archive.display(), rows, cols));

    for report in inspect_all(&df, &strategies)? {
        render_inspection(&report);
    }
    println!();

    Ok(())
}

fn inspect_all(
    df: &DataFrame,
    strategies: &[InspectionStrategy],
) -> Result<Vec<InspectionReport>> {
    let Some((first, rest)) = strategies.split_first() else {
        return Ok(Vec::new());
    };

    let mut inspector = DataInspector::new(*first);
    let mut reports = vec![inspector.execute_inspection(df)?];
    for strategy in rest {
        inspector.set_strategy(*strategy);
        reports.push(inspector.execute_inspection(df)?);
    }
    Ok(reports)
}

/// Close a stage's spinner as failed and log the error code
fn stage_failed(spinner: &ProgressBar, message: &str, err: PrepError) -> anyhow::Error {
    finish_with_error(spinner, message);
    error!(code = err.error_code(), "{}: {}", message, err);
    anyhow::Error::new(err).context(message.to_string())
}

/// Write train.csv and test.csv, each with the label as the last column
fn save_split(split: &SplitResult, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut train = split.x_train.clone();
    train.with_column(split.y_train.clone())?;
    write_csv(&mut train, &dir.join("train.csv"))?;

    let mut test = split.x_test.clone();
    test.with_column(split.y_test.clone())?;
    write_csv(&mut test, &dir.join("test.csv"))?;

    Ok(())
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    CsvWriter::new(&mut file)
        .finish(df)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    Ok(())
}
