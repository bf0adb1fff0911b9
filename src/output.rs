//! Console reporting for the end-of-run summary.
//!
//! Presentation only. The pipeline reports progress through tracing events
//! (color comes from the subscriber's fmt layer); the final summary block
//! goes to stdout here, and nothing in the core modules prints.

use indicatif::{HumanBytes, HumanDuration};

use crate::export::RunSummary;

/// Returns the summary block, one line per entry.
#[must_use]
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    vec![
        "Finished downloading images.".to_string(),
        format!("Total time taken: {}", HumanDuration(summary.total_time)),
        format!("Total file size: {}", HumanBytes(summary.total_bytes)),
        format!("Number of all files: {}", summary.total),
        format!("Number of images downloaded: {}", summary.successful),
        format!(
            "Image links exported to TXT: {}",
            summary.txt_path.display()
        ),
        format!(
            "Image links exported to JSON: {}",
            summary.json_path.display()
        ),
    ]
}

/// Prints the end-of-run summary block to stdout.
pub fn print_summary(summary: &RunSummary) {
    for line in summary_lines(summary) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_summary_lines_cover_every_field() {
        let summary = RunSummary {
            total_bytes: 2048,
            total_time: Duration::from_secs(3),
            successful: 4,
            total: 5,
            txt_path: PathBuf::from("out/T_images.txt"),
            json_path: PathBuf::from("out/T_images.json"),
        };

        let lines = summary_lines(&summary);
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "Finished downloading images.");
        assert!(lines.iter().any(|l| l.contains("KiB") || l.contains("2048")));
        assert!(lines.iter().any(|l| l.ends_with(": 5")));
        assert!(lines.iter().any(|l| l.ends_with(": 4")));
        assert!(lines.iter().any(|l| l.contains("T_images.txt")));
        assert!(lines.iter().any(|l| l.contains("T_images.json")));
    }
}
