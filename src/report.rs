//! Plain-text report of a batch: the input table followed by the results table.

use crate::error::{Error, Result};
use crate::record::Record;
use std::path::Path;

const INPUT_RULE: &str = "------------------------------+-----+----------";
const HASH_RULE_WIDTH: usize = 90;

/// Render the report for one batch.
pub fn render_report(input: &[Record], results: &[Record]) -> String {
    let mut lines = vec![
        "Initial data:".to_string(),
        format!("{:<30}|{:>4} | {:<9}", "Name", "Age", "Salary"),
        INPUT_RULE.to_string(),
    ];
    if input.is_empty() {
        lines.push(format!("{:<30}|{:>4} |{:>9}", "-", "-", "--.--"));
    }
    lines.extend(
        input
            .iter()
            .map(|r| format!("{:<30}|{:>4} |{:>9.2}", r.name, r.age, r.salary)),
    );

    lines.push(String::new());
    lines.push("Results:".to_string());
    lines.push(format!("{:<30}|{:>4} | {:<9}| Hash", "Name", "Age", "Salary"));
    lines.push(format!("{INPUT_RULE}+{}", "-".repeat(HASH_RULE_WIDTH)));
    if results.is_empty() {
        lines.push(format!("{:<30}|{:>4} |{:>9} | -", "-", "-", "--.--"));
    }
    lines.extend(results.iter().map(|r| {
        let computed = r.computed.as_deref().unwrap_or("-");
        format!("{:<30}|{:>4} |{:>9.2} | {}", r.name, r.age, r.salary, computed)
    }));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Render and write the report to `path`.
pub fn write_report(path: impl AsRef<Path>, input: &[Record], results: &[Record]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, render_report(input, results)).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_input_and_results() {
        let input = vec![Record::new("Bob", 30, 1000.0), Record::new("Amy", 17, 900.5)];
        let mut bob = input[0].clone();
        bob.computed = Some("abc=".into());

        let report = render_report(&input, &[bob]);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Initial data:");
        assert_eq!(lines[1], format!("{:<30}| Age | Salary   ", "Name"));
        assert_eq!(lines[3], format!("{:<30}|  30 |  1000.00", "Bob"));
        assert_eq!(lines[4], format!("{:<30}|  17 |   900.50", "Amy"));
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Results:");
        assert_eq!(lines[9], format!("{:<30}|  30 |  1000.00 | abc=", "Bob"));
        assert_eq!(lines.len(), 10);
        assert!(report.ends_with(" | abc=\n"));
    }

    #[test]
    fn report_placeholders_when_empty() {
        let report = render_report(&[], &[]);
        assert!(report.contains(&format!("{:<30}|   - |    --.--\n", "-")));
        assert!(report.contains(&format!("{:<30}|   - |    --.-- | -\n", "-")));
    }

    #[test]
    fn write_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch_results.txt");
        write_report(&path, &[Record::new("Cid", 40, 2000.0)], &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, render_report(&[Record::new("Cid", 40, 2000.0)], &[]));
    }
}
