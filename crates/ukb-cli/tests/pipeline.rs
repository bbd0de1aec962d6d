//! End-to-end tests for planning, extraction and output writing.

use std::fs;
use std::path::Path;

use indicatif::ProgressBar;
use polars::prelude::DataFrame;
use tempfile::TempDir;

use ukb_cli::output::{write_mapping, write_merged, write_unmatched};
use ukb_cli::pipeline::{extract_tables, plan};
use ukb_cli::report::Stage;
use ukb_ingest::load_dictionary;
use ukb_map::parse_input_string;
use ukb_model::ExtractOptions;

const DICTIONARY: &str = "\
Path,Category,FieldID,Field
Physical > BodySize,100,21,Height
Physical > BodySize,100,50,Weight
Population > Baseline,1,31,Sex
Assess > Cognitive,2,20016,Fluid intelligence score
Missing > Table,3,77,Ghost
Physical > Repeat,100,21,Height
";

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn data_root() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "Data_Dictionary_Showcase.csv", DICTIONARY);
    write(
        root,
        "Physical/BodySize.csv",
        "participant.eid,participant.p21_i1,participant.p21_i0,participant.p50_i0\n\
         1,171,170,70\n\
         2,,160,60\n\
         3,151,150,50\n",
    );
    write(
        root,
        "Population/Baseline.csv",
        "eid\tSex | Instance 0\n2\tF\n3\tM\n4\tF\n",
    );
    write(
        root,
        "Assess/Cognitive.csv",
        "participant.p20016_i0,participant.p20016_i1\n5,6\n7,8\n",
    );
    write(root, "Assess/Cognitive/ids.csv", "eid,visit\n1,a\n4,b\n");
    write(
        root,
        "Physical/Repeat.csv",
        "participant.eid,participant.p21_i0\n1,999\n5,180\n",
    );
    dir
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|n| n.to_string()).collect()
}

fn values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

fn some(values: &[&str]) -> Vec<Option<String>> {
    values
        .iter()
        .map(|v| (!v.is_empty()).then(|| (*v).to_string()))
        .collect()
}

#[test]
fn extracts_and_merges_across_tables() {
    let dir = data_root();
    let options = ExtractOptions::default().with_data_root(dir.path());
    let index = load_dictionary(&options.dictionary_path()).unwrap();
    let tokens = parse_input_string("21，Sex, 20016 ,77,Weight");

    let planned = plan(&index, &options, &tokens).unwrap();
    let tables: Vec<&str> = planned
        .plan
        .tables()
        .iter()
        .map(|t| t.table_path.as_str())
        .collect();
    assert_eq!(
        tables,
        vec![
            "Physical/BodySize.csv",
            "Population/Baseline.csv",
            "Assess/Cognitive.csv",
            "Missing/Table.csv",
            "Physical/Repeat.csv",
        ]
    );

    let run = extract_tables(&planned.plan, &index, &options, &ProgressBar::hidden()).unwrap();
    let df = run.merged.expect("merged table");

    assert_eq!(
        column_names(&df),
        vec![
            "participant.eid",
            "Height_i0",
            "Height_i1",
            "Weight_i0",
            "Sex_i0",
            "Fluid intelligence score_i0",
            "Fluid intelligence score_i1",
            "Height_i0_A",
        ]
    );
    assert_eq!(values(&df, "participant.eid"), some(&["1", "2", "3", "4", "5"]));
    assert_eq!(values(&df, "Height_i0"), some(&["170", "160", "150", "", ""]));
    assert_eq!(values(&df, "Height_i1"), some(&["171", "", "151", "", ""]));
    assert_eq!(values(&df, "Sex_i0"), some(&["", "F", "M", "F", ""]));
    assert_eq!(
        values(&df, "Fluid intelligence score_i0"),
        some(&["5", "", "", "7", ""])
    );
    assert_eq!(values(&df, "Height_i0_A"), some(&["999", "", "", "", "180"]));

    let report = &run.report;
    assert_eq!(report.merged_tables(), 4);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].table, "Missing/Table.csv");
    assert_eq!(failures[0].stage, Stage::Resolving);

    let unmatched: Vec<&str> = report
        .unmatched
        .iter()
        .map(|f| f.identifier.as_str())
        .collect();
    assert_eq!(unmatched, vec!["77"]);
    assert_eq!(report.merged_rows, 5);
    assert_eq!(report.merged_columns, 8);
}

#[test]
fn table_without_matching_columns_is_skipped() {
    let dir = data_root();
    write(
        dir.path(),
        "Physical/BodySize.csv",
        "participant.eid,unrelated\n1,x\n",
    );
    let options = ExtractOptions::default().with_data_root(dir.path());
    let index = load_dictionary(&options.dictionary_path()).unwrap();

    let planned = plan(&index, &options, &["50".to_string()]).unwrap();
    let run = extract_tables(&planned.plan, &index, &options, &ProgressBar::hidden()).unwrap();

    assert!(run.merged.is_none());
    assert_eq!(run.report.outcomes.len(), 1);
    assert_eq!(run.report.outcomes[0].unresolved, vec!["50"]);
    assert!(run.report.has_failures());
    assert_eq!(run.report.unmatched.len(), 1);
}

#[test]
fn table_without_identifier_or_companion_is_skipped() {
    let dir = data_root();
    fs::remove_dir_all(dir.path().join("Assess/Cognitive")).unwrap();
    let options = ExtractOptions::default().with_data_root(dir.path());
    let index = load_dictionary(&options.dictionary_path()).unwrap();

    let planned = plan(&index, &options, &["20016".to_string()]).unwrap();
    let run = extract_tables(&planned.plan, &index, &options, &ProgressBar::hidden()).unwrap();

    assert!(run.merged.is_none());
    let failure = run.report.outcomes[0].failure().unwrap();
    assert_eq!(failure.stage, Stage::Resolving);
    assert_eq!(run.report.outcomes[0].resolved, vec!["20016"]);
}

#[test]
fn unknown_identifier_is_not_reported_as_unmatched() {
    let dir = data_root();
    let options = ExtractOptions::default().with_data_root(dir.path());
    let index = load_dictionary(&options.dictionary_path()).unwrap();

    let planned = plan(&index, &options, &["50".to_string(), "424242".to_string()]).unwrap();
    let run = extract_tables(&planned.plan, &index, &options, &ProgressBar::hidden()).unwrap();

    assert!(run.report.unmatched.is_empty());
    assert!(!run.report.has_failures());
}

#[test]
fn writes_output_files() {
    let dir = data_root();
    let out = TempDir::new().unwrap();
    let options = ExtractOptions::default().with_data_root(dir.path());
    let index = load_dictionary(&options.dictionary_path()).unwrap();

    let planned = plan(&index, &options, &["21".to_string(), "77".to_string()]).unwrap();
    let mapping_path = out.path().join("ukb_field_mapping.csv");
    assert!(write_mapping(&mapping_path, &planned.mapping).unwrap());
    insta::assert_snapshot!(fs::read_to_string(&mapping_path).unwrap(), @r"
    path,file_path,fieldid,field
    Physical > BodySize,Physical/BodySize.csv,21,Height
    Missing > Table,Missing/Table.csv,77,Ghost
    Physical > Repeat,Physical/Repeat.csv,21,Height
    ");

    let run = extract_tables(&planned.plan, &index, &options, &ProgressBar::hidden()).unwrap();
    let merged_path = out.path().join("ukb_extracted_data.csv");
    let mut frame = run.merged.unwrap();
    write_merged(&merged_path, &mut frame).unwrap();
    insta::assert_snapshot!(fs::read_to_string(&merged_path).unwrap(), @r"
    participant.eid,Height_i0,Height_i1,Height_i0_A
    1,170,171,999
    2,160,,
    3,150,151,
    5,,,180
    ");

    let unmatched_path = out.path().join("ukb_unmatched_fields.csv");
    assert!(write_unmatched(&unmatched_path, &run.report.unmatched).unwrap());
    insta::assert_snapshot!(fs::read_to_string(&unmatched_path).unwrap(), @r"
    fieldid,field
    77,Ghost
    ");
}

#[test]
fn shared_column_counts_for_every_identifier() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "Data_Dictionary_Showcase.csv",
        "Path,Category,FieldID,Field\nA > T,1,1,Score\nA > T,1,2,Score total\n",
    );
    write(dir.path(), "A/T.csv", "eid,Score total\n1,10\n2,20\n");
    let options = ExtractOptions::default().with_data_root(dir.path());
    let index = load_dictionary(&options.dictionary_path()).unwrap();

    let planned = plan(&index, &options, &["1".to_string(), "2".to_string()]).unwrap();
    let run = extract_tables(&planned.plan, &index, &options, &ProgressBar::hidden()).unwrap();

    let df = run.merged.expect("merged table");
    assert_eq!(column_names(&df), vec!["participant.eid", "Score total"]);
    assert_eq!(run.report.outcomes[0].resolved, vec!["1", "2"]);
    assert!(run.report.unmatched.is_empty());
}
