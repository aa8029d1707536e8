//! Mapping files.
//!
//! A mapping file lists one rename per line:
//!
//! ```text
//! # Analog Devices
//! ADXL362 -> ADI_ADXL362
//! BME280 -> BOSCH_BME280
//! ```
//!
//! Blank lines and `#` comments are ignored. Malformed lines are reported
//! as [`MappingIssue`]s and skipped; they never invalidate the whole file.

use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::symbol::Symbol;

/// Separator between the old and new symbol.
pub const SEPARATOR: &str = " -> ";

/// One valid `OLD -> NEW` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingEntry {
    /// 1-based line number in the mapping file.
    pub line: usize,
    /// Symbol to rename.
    pub old: Symbol,
    /// Replacement symbol.
    pub new: Symbol,
}

/// A line that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingIssue {
    /// 1-based line number in the mapping file.
    pub line: usize,
    /// The offending line, trimmed.
    pub text: String,
    /// Why it was skipped.
    pub reason: String,
}

/// A parsed mapping file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingFile {
    /// Valid entries, in file order.
    pub entries: Vec<MappingEntry>,
    /// Skipped lines.
    pub issues: Vec<MappingIssue>,
}

impl MappingFile {
    /// Read and parse a mapping file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MappingFileRead`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::MappingFileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Parse mapping file contents.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut file = Self::default();

        for (idx, raw) in text.lines().enumerate() {
            let line_num = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_line(line) {
                Ok((old, new)) => file.entries.push(MappingEntry {
                    line: line_num,
                    old,
                    new,
                }),
                Err(reason) => {
                    warn!(line = line_num, text = %line, %reason, "Skipping mapping line");
                    file.issues.push(MappingIssue {
                        line: line_num,
                        text: line.to_string(),
                        reason,
                    });
                }
            }
        }

        file
    }
}

fn parse_line(line: &str) -> std::result::Result<(Symbol, Symbol), String> {
    let Some((old, new)) = line.split_once(SEPARATOR) else {
        return Err(format!("expected 'OLD{SEPARATOR}NEW'"));
    };
    let old = Symbol::parse(old).map_err(|e| e.to_string())?;
    let new = Symbol::parse(new).map_err(|e| e.to_string())?;
    Ok((old, new))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries_in_order() {
        let file = MappingFile::parse("ADXL362 -> ADI_ADXL362\nBME280 -> BOSCH_BME280\n");
        assert!(file.issues.is_empty());
        assert_eq!(file.entries.len(), 2);
        assert_eq!(file.entries[0].old.as_str(), "ADXL362");
        assert_eq!(file.entries[0].new.as_str(), "ADI_ADXL362");
        assert_eq!(file.entries[1].line, 2);
        assert_eq!(file.entries[1].new.as_str(), "BOSCH_BME280");
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = "# vendor prefixes\n\n   \nADXL362 -> ADI_ADXL362\n  # trailing\n";
        let file = MappingFile::parse(text);
        assert_eq!(file.entries.len(), 1);
        assert_eq!(file.entries[0].line, 4);
        assert!(file.issues.is_empty());
    }

    #[test]
    fn test_parse_trims_sides() {
        let file = MappingFile::parse("  ADXL362   ->   ADI_ADXL362  ");
        assert_eq!(file.entries[0].old.as_str(), "ADXL362");
        assert_eq!(file.entries[0].new.as_str(), "ADI_ADXL362");
    }

    #[test]
    fn test_parse_missing_separator() {
        let file = MappingFile::parse("ADXL362 ADI_ADXL362\nADXL362->ADI_ADXL362\n");
        assert!(file.entries.is_empty());
        assert_eq!(file.issues.len(), 2);
        assert_eq!(file.issues[0].line, 1);
        assert!(file.issues[1].reason.contains("OLD -> NEW"));
    }

    #[test]
    fn test_parse_dangling_arrow() {
        // trimming leaves "ADXL362 ->", which no longer contains the separator
        let file = MappingFile::parse("ADXL362 -> \n");
        assert!(file.entries.is_empty());
        assert_eq!(file.issues.len(), 1);
        assert_eq!(file.issues[0].text, "ADXL362 ->");
    }

    #[test]
    fn test_parse_invalid_symbol_is_issue() {
        let file = MappingFile::parse("ADXL362 -> ADI-ADXL362\nBME280 -> BOSCH_BME280");
        assert_eq!(file.entries.len(), 1);
        assert_eq!(file.issues.len(), 1);
        assert!(file.issues[0].reason.contains("ADI-ADXL362"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = MappingFile::load(Path::new("/nonexistent/mappings.txt")).unwrap_err();
        assert!(matches!(err, Error::MappingFileRead { .. }));
    }
}
