use anyhow::Result;
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Upper bound for event detail strings.
pub const MAX_DETAIL_LEN: usize = 200;

/// Write data to file
pub fn write_to_file<P: AsRef<Path>>(path: P, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    Ok(())
}

/// Append a single line to a file, creating it if missing
pub fn append_line<P: AsRef<Path>>(path: P, line: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

/// Format timestamp to readable string
pub fn format_timestamp(timestamp: DateTime<Local>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Bound a detail string, marking the cut with an ellipsis
pub fn truncate_detail(detail: &str) -> String {
    if detail.chars().count() <= MAX_DETAIL_LEN {
        detail.to_string()
    } else {
        let truncated: String = detail.chars().take(MAX_DETAIL_LEN).collect();
        format!("{}…", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_details_pass_through() {
        assert_eq!(truncate_detail("no change"), "no change");
    }

    #[test]
    fn long_details_are_cut_at_the_bound() {
        let long = "a".repeat(MAX_DETAIL_LEN + 50);
        let truncated = truncate_detail(&long);
        assert_eq!(truncated.chars().count(), MAX_DETAIL_LEN + 1);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let long = "é".repeat(MAX_DETAIL_LEN + 10);
        let truncated = truncate_detail(&long);
        assert!(truncated.starts_with('é'));
        assert!(truncated.ends_with('…'));
    }
}
