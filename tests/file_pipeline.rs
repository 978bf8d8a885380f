use sortpool::loader::load_records;
use sortpool::report::{render_report, write_report};
use sortpool::{run_batch, Config};
use std::fs;

#[test]
fn file_to_report_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("batch_1.json");
    fs::write(
        &input,
        r#"[
            {"name": "Zed", "age": 44, "salary": 3100.5},
            {"name": "Amy", "age": 17, "salary": 900.0},
            {"name": "Kim", "age": 18, "salary": 1500.25}
        ]"#,
    )
    .unwrap();

    let records = load_records(&input).unwrap();
    let config = Config::default().with_workers(2).with_queue_capacity(1).with_rounds(10);
    let outcome = run_batch(&records, &config).unwrap();

    let report_path = dir.path().join("batch_1_results.txt");
    write_report(&report_path, &records, &outcome.results).unwrap();
    let report = fs::read_to_string(&report_path).unwrap();
    assert_eq!(report, render_report(&records, &outcome.results));

    let results_section = report.split("Results:").nth(1).unwrap();
    let kim = results_section.find("Kim").unwrap();
    let zed = results_section.find("Zed").unwrap();
    assert!(kim < zed);
    assert!(!results_section.contains("Amy"));
}
