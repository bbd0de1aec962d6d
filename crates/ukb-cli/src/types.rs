use std::path::PathBuf;

use ukb_cli::report::RunReport;

/// Files written by a run and what the run did.
#[derive(Debug)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub mapping_file: Option<PathBuf>,
    pub merged_file: Option<PathBuf>,
    pub unmatched_file: Option<PathBuf>,
    pub report_file: Option<PathBuf>,
    pub mapping_records: usize,
    pub plan_only: bool,
    pub report: RunReport,
}
