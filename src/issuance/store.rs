//! Previously issued codes and the newline-delimited file that holds them

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{CouponForgeError, Result};

/// Codes that must never be issued again
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuedCodeSet {
    codes: HashSet<String>,
}

impl IssuedCodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse newline-delimited codes; surrounding whitespace and blank lines are ignored
    pub fn from_lines(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Returns false if the code was already present
    pub fn insert(&mut self, code: impl Into<String>) -> bool {
        self.codes.insert(code.into())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.codes.iter()
    }

    /// Number of codes with exactly `len` characters
    pub fn count_with_len(&self, len: usize) -> usize {
        self.codes
            .iter()
            .filter(|code| code.chars().count() == len)
            .count()
    }
}

impl FromIterator<String> for IssuedCodeSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().collect(),
        }
    }
}

impl Extend<String> for IssuedCodeSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.codes.extend(iter);
    }
}

/// Storage for the issued code set
pub trait IssuanceStore {
    /// Load every code issued so far
    fn load(&self) -> Result<IssuedCodeSet>;

    /// Record newly issued codes
    fn append(&mut self, codes: &[String]) -> Result<()>;
}

/// Issued codes kept one per line in a text file
#[derive(Debug, Clone)]
pub struct FileIssuanceStore {
    path: PathBuf,
    require_existing: bool,
}

impl FileIssuanceStore {
    /// A missing file loads as an empty set
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            require_existing: false,
        }
    }

    /// Treat a missing file as an error instead of an empty set
    pub fn require_existing(mut self, required: bool) -> Self {
        self.require_existing = required;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_string(&self) -> Option<String> {
        Some(self.path.to_string_lossy().to_string())
    }
}

impl IssuanceStore for FileIssuanceStore {
    fn load(&self) -> Result<IssuedCodeSet> {
        if !self.path.exists() {
            if self.require_existing {
                return Err(CouponForgeError::io(
                    "issued code file does not exist",
                    self.path_string(),
                ));
            }
            tracing::debug!(path = %self.path.display(), "No issued code file, starting empty");
            return Ok(IssuedCodeSet::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| CouponForgeError::io(e.to_string(), self.path_string()))?;
        let issued = IssuedCodeSet::from_lines(&content);

        tracing::info!(path = %self.path.display(), count = issued.len(), "Loaded issued codes");
        Ok(issued)
    }

    fn append(&mut self, codes: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                CouponForgeError::io(e.to_string(), Some(parent.to_string_lossy().to_string()))
            })?;
        }

        let needs_newline = match std::fs::read(&self.path) {
            Ok(bytes) => bytes.last().is_some_and(|&b| b != b'\n'),
            Err(_) => false,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| CouponForgeError::io(e.to_string(), self.path_string()))?;
        let mut writer = BufWriter::new(file);

        let write_all = |writer: &mut BufWriter<std::fs::File>| -> std::io::Result<()> {
            if needs_newline {
                writeln!(writer)?;
            }
            for code in codes {
                writeln!(writer, "{}", code)?;
            }
            writer.flush()
        };
        write_all(&mut writer).map_err(|e| CouponForgeError::io(e.to_string(), self.path_string()))?;

        tracing::info!(path = %self.path.display(), count = codes.len(), "Recorded issued codes");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lines_skips_blanks() {
        let issued = IssuedCodeSet::from_lines("ABC\n\n  DEF  \r\nABC\n");
        assert_eq!(issued.len(), 2);
        assert!(issued.contains("ABC"));
        assert!(issued.contains("DEF"));
        assert!(!issued.contains(""));
    }

    #[test]
    fn test_count_with_len() {
        let issued: IssuedCodeSet = ["AB", "ABC", "XYZ", "A-B-C"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(issued.count_with_len(3), 2);
        assert_eq!(issued.count_with_len(5), 1);
    }

    #[test]
    fn test_insert_and_extend() {
        let mut issued = IssuedCodeSet::new();
        assert!(issued.insert("ABC"));
        assert!(!issued.insert("ABC"));
        issued.extend(vec!["DEF".to_string(), "ABC".to_string()]);
        assert_eq!(issued.len(), 2);
    }
}
