//! JSON reporter for test results

use crate::results::TestResults;
use anyhow::Result;

/// JSON format reporter
pub struct JsonReporter;

impl JsonReporter {
    /// Format results as a JSON array
    ///
    /// Statistics that are undefined for a sample (variance of a single run,
    /// the confidence interval of a degenerate sample) are written as `null`.
    pub fn format(results: &[TestResults], pretty: bool) -> Result<String> {
        let output = if pretty {
            serde_json::to_string_pretty(results)?
        } else {
            serde_json::to_string(results)?
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn create_test_results() -> Vec<TestResults> {
        vec![
            TestResults::new(vec![5.8, 6.3, 6.2, 5.2, 4.3, 6.1, 4.2, 5.5], "list1").unwrap(),
            TestResults::new(vec![0.25], "single").unwrap(),
        ]
    }

    #[test]
    fn test_json_format_compact() {
        let output = JsonReporter::format(&create_test_results(), false).unwrap();

        // Compact JSON should not have newlines
        assert!(!output.contains('\n'));
        assert!(output.contains("\"name\":\"list1\""));
    }

    #[test]
    fn test_json_format_pretty() {
        let output = JsonReporter::format(&create_test_results(), true).unwrap();

        // Pretty JSON should have indentation
        assert!(output.contains('\n'));
        assert!(output.contains("  "));
    }

    #[test]
    fn test_json_fields() {
        let json = JsonReporter::format(&create_test_results(), false).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        let entries = parsed.as_array().unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["n"], 8);
        assert_eq!(entries[0]["samples"].as_array().unwrap().len(), 8);
        let ci = &entries[0]["confidence_interval_95"];
        assert!((ci["lower"].as_f64().unwrap() - 4.759152684730618).abs() < 1e-5);

        assert!(entries[1]["stdev"].is_null());
        assert!(entries[1]["confidence_interval_95"].is_null());
    }

    #[test]
    fn test_empty_slice() {
        assert_eq!(JsonReporter::format(&[], false).unwrap(), "[]");
    }
}
