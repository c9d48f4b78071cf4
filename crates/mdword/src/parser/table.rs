//! Pipe-delimited tables.

use ecow::EcoString;

/// The fewest lines that form a table: header, separator and one data row.
pub const MIN_TABLE_LINES: usize = 3;

/// Whether a line is a pipe-delimited table row.
pub fn is_table_line(line: &str) -> bool {
    let line = line.trim();
    line.starts_with('|') && line.ends_with('|')
}

/// Splits a table row into trimmed cell texts, dropping the empty fields
/// produced by the enclosing pipes.
pub fn split_row(line: &str) -> Vec<EcoString> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|cell| cell.trim().into())
        .collect()
}

/// Builds the rows of a table from a run of table lines, discarding the
/// separator line. Returns `None` if the run is too short to be a table.
pub fn table_rows(lines: &[&str]) -> Option<Vec<Vec<EcoString>>> {
    if lines.len() < MIN_TABLE_LINES {
        return None;
    }

    let header = std::iter::once(lines[0]);
    Some(header.chain(lines[2..].iter().copied()).map(split_row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_rows() {
        assert!(is_table_line("|A|B|"));
        assert!(is_table_line("  | a | b |  "));
        assert!(is_table_line("|"));
        assert!(!is_table_line("| open"));
        assert!(!is_table_line("a | b"));
    }

    fn cells(line: &str) -> Vec<String> {
        split_row(line).iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn splits_cells() {
        assert_eq!(cells("| a | b |"), ["a", "b"]);
        assert_eq!(cells("  |x||z|"), ["x", "", "z"]);
        assert_eq!(cells("|only|"), ["only"]);
    }

    #[test]
    fn requires_three_lines() {
        assert_eq!(table_rows(&["|A|B|", "|---|---|"]), None);
        assert_eq!(
            table_rows(&["|A|B|", "|---|---|", "|1|2|"]),
            Some(vec![vec!["A".into(), "B".into()], vec!["1".into(), "2".into()]])
        );
    }
}
