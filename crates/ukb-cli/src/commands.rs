use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span};

use ukb_cli::config::load_options;
use ukb_cli::output::{write_mapping, write_merged, write_report, write_unmatched};
use ukb_cli::pipeline::{extract_tables, plan};
use ukb_cli::report::RunReport;
use ukb_ingest::load_dictionary;
use ukb_map::parse_input_string;
use ukb_model::ExtractOptions;

use crate::cli::Cli;
use crate::types::RunSummary;

/// Request tokens from `--input` or `--file`.
fn read_tokens(cli: &Cli) -> Result<Vec<String>> {
    if let Some(input) = &cli.input {
        return Ok(parse_input_string(input));
    }
    let Some(path) = &cli.file else {
        return Ok(Vec::new());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read request file {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn options_from_cli(cli: &Cli) -> Result<ExtractOptions> {
    let mut options = load_options(cli.config.as_deref())?;
    if let Some(root) = &cli.data_root {
        options = options.with_data_root(root);
    }
    if let Some(dictionary) = &cli.dictionary {
        options = options.with_dictionary_file(dictionary);
    }
    options.validate().context("invalid extraction options")?;
    Ok(options)
}

fn progress_bar(cli: &Cli, tables: usize) -> ProgressBar {
    if cli.no_progress || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(tables as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{pos}/{len}] {bar:30} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

pub fn run_extract(cli: &Cli) -> Result<RunSummary> {
    let run_span = info_span!("extract");
    let _run_guard = run_span.enter();
    let start = Instant::now();

    let options = options_from_cli(cli)?;
    let tokens = read_tokens(cli)?;

    // =========================================================================
    // Stage 1: Dictionary and planning
    // =========================================================================
    let dictionary_path = options.dictionary_path();
    let index = load_dictionary(&dictionary_path)
        .with_context(|| format!("load dictionary {}", dictionary_path.display()))?;
    let planned = plan(&index, &options, &tokens)?;

    let output_dir = cli.output_dir.clone();
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("create output directory {}", output_dir.display()))?;
    let mapping_path = output_dir.join(&cli.mapping_file);
    let mapping_file = write_mapping(&mapping_path, &planned.mapping)?.then_some(mapping_path);

    if cli.plan_only {
        info!(tables = planned.plan.len(), "plan-only run, skipping extraction");
        return Ok(RunSummary {
            output_dir,
            mapping_file,
            merged_file: None,
            unmatched_file: None,
            report_file: None,
            mapping_records: planned.mapping.len(),
            plan_only: true,
            report: RunReport {
                plan: planned.plan,
                ..RunReport::default()
            },
        });
    }

    // =========================================================================
    // Stage 2: Extraction and merge
    // =========================================================================
    let progress = progress_bar(cli, planned.plan.len());
    let run = extract_tables(&planned.plan, &index, &options, &progress)?;

    // =========================================================================
    // Stage 3: Output
    // =========================================================================
    let merged_file = match run.merged {
        Some(mut frame) => {
            let path = output_dir.join(&cli.output_file);
            write_merged(&path, &mut frame)?;
            Some(path)
        }
        None => None,
    };
    let unmatched_path = output_dir.join(&cli.unmatched_file);
    let unmatched_file =
        write_unmatched(&unmatched_path, &run.report.unmatched)?.then_some(unmatched_path);
    let report_path: PathBuf = output_dir.join(&cli.report_file);
    write_report(&report_path, &run.report)?;

    info!(
        tables = run.report.outcomes.len(),
        merged = run.report.merged_tables(),
        duration_ms = start.elapsed().as_millis(),
        "extraction complete"
    );
    Ok(RunSummary {
        output_dir,
        mapping_file,
        merged_file,
        unmatched_file,
        report_file: Some(report_path),
        mapping_records: planned.mapping.len(),
        plan_only: false,
        report: run.report,
    })
}
