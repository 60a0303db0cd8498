//! NDJSON reading and chunking

use std::path::Path;

use mktosync_domain::Record;
use tracing::debug;

use super::errors::LoaderError;

/// Read an NDJSON file into records, in file order.
///
/// # Errors
/// Returns `LoaderError::Io` if the file cannot be read and
/// `LoaderError::Parse` for the first malformed line.
pub fn read_records(path: &Path) -> Result<Vec<Record>, LoaderError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|source| LoaderError::Io { path: path.to_path_buf(), source })?;
    let records = parse_records(&contents)?;
    debug!(path = %path.display(), count = records.len(), "Read input records");
    Ok(records)
}

/// Parse newline-delimited JSON. Blank lines are skipped; any other line
/// must be a complete JSON value.
///
/// # Errors
/// Returns `LoaderError::Parse` with the 1-based line number of the first
/// line that fails to parse.
pub fn parse_records(contents: &str) -> Result<Vec<Record>, LoaderError> {
    contents
        .split('\n')
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line.trim())
                .map_err(|source| LoaderError::Parse { line: idx + 1, source })
        })
        .collect()
}

/// Split records into contiguous chunks of at most `size`, preserving order.
/// A `size` of zero is treated as one.
pub fn chunk_records(records: Vec<Record>, size: usize) -> Vec<Vec<Record>> {
    let size = size.max(1);
    let mut chunks = Vec::with_capacity(records.len().div_ceil(size));
    let mut iter = records.into_iter().peekable();
    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(size).collect());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;

    fn numbered(n: usize) -> Vec<Record> {
        (0..n).map(|i| json!({ "id": i })).collect()
    }

    #[test]
    fn parses_lines_in_order_and_skips_blank_ones() {
        let records = parse_records("{\"id\":1}\n\n  \r\n{\"id\":2}\r\n{\"id\":3}\n").unwrap();
        assert_eq!(records, vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);
    }

    #[test]
    fn empty_input_has_no_records() {
        assert!(parse_records("").unwrap().is_empty());
        assert!(parse_records("\n\n").unwrap().is_empty());
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let err = parse_records("{\"id\":1}\n{\"id\":2}\nnot-json\n{\"id\":4}").unwrap_err();
        assert!(matches!(err, LoaderError::Parse { line: 3, .. }));
    }

    #[test]
    fn chunk_count_is_ceiling_of_length_over_size() {
        for (n, expected) in [(0, 0), (1, 1), (299, 1), (300, 1), (301, 2), (600, 2), (650, 3)] {
            assert_eq!(chunk_records(numbered(n), 300).len(), expected, "n = {n}");
        }
    }

    #[test]
    fn chunks_cover_input_once_in_order() {
        let chunks = chunk_records(numbered(650), 300);
        let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![300, 300, 50]);

        let flattened: Vec<Record> = chunks.into_iter().flatten().collect();
        assert_eq!(flattened, numbered(650));
    }

    #[test]
    fn zero_chunk_size_is_treated_as_one() {
        assert_eq!(chunk_records(numbered(3), 0).len(), 3);
    }

    #[test]
    fn reads_file_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{\"leadId\":1}}").unwrap();
        writeln!(file, "{{\"leadId\":2}}").unwrap();

        let records = read_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_records(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }
}
