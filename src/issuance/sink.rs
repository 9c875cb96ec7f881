//! Destinations for accepted codes

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{CouponForgeError, Result};
use crate::types::{CouponCode, DEFAULT_DISCOUNT_TARGET};

/// Receives the final, shuffled code list of a successful run
pub trait CodeSink {
    fn accept(&mut self, codes: &[String]) -> Result<()>;
}

impl<S: CodeSink + ?Sized> CodeSink for Box<S> {
    fn accept(&mut self, codes: &[String]) -> Result<()> {
        (**self).accept(codes)
    }
}

/// Keeps accepted codes in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub codes: Vec<String>,
    /// Number of `accept` calls received
    pub batches: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CodeSink for MemorySink {
    fn accept(&mut self, codes: &[String]) -> Result<()> {
        self.codes.extend_from_slice(codes);
        self.batches += 1;
        Ok(())
    }
}

/// Writes one code per line, replacing the file
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CodeSink for FileSink {
    fn accept(&mut self, codes: &[String]) -> Result<()> {
        write_lines(&self.path, codes.iter().map(|c| Ok(c.clone())))?;
        tracing::info!(path = %self.path.display(), count = codes.len(), "Wrote codes");
        Ok(())
    }
}

/// Writes one JSON coupon record per line
#[derive(Debug, Clone)]
pub struct CouponRecordSink {
    path: PathBuf,
    discount: f64,
    target: String,
}

impl CouponRecordSink {
    pub fn new(path: impl Into<PathBuf>, discount: f64) -> Self {
        Self {
            path: path.into(),
            discount,
            target: DEFAULT_DISCOUNT_TARGET.to_string(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CodeSink for CouponRecordSink {
    fn accept(&mut self, codes: &[String]) -> Result<()> {
        let records = codes.iter().map(|code| {
            let record = CouponCode::new(code.as_str(), self.discount).with_target(&self.target);
            serde_json::to_string(&record).map_err(CouponForgeError::from)
        });
        write_lines(&self.path, records)?;
        tracing::info!(
            path = %self.path.display(),
            count = codes.len(),
            discount = self.discount,
            "Wrote coupon records"
        );
        Ok(())
    }
}

fn write_lines(path: &Path, lines: impl Iterator<Item = Result<String>>) -> Result<()> {
    let path_string = || Some(path.to_string_lossy().to_string());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            CouponForgeError::io(e.to_string(), Some(parent.to_string_lossy().to_string()))
        })?;
    }

    let file = File::create(path).map_err(|e| CouponForgeError::io(e.to_string(), path_string()))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line?).map_err(|e| CouponForgeError::io(e.to_string(), path_string()))?;
    }
    writer
        .flush()
        .map_err(|e| CouponForgeError::io(e.to_string(), path_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects() {
        let mut sink = MemorySink::new();
        sink.accept(&["A".to_string(), "B".to_string()]).unwrap();
        assert_eq!(sink.codes, vec!["A", "B"]);
        assert_eq!(sink.batches, 1);
    }

    #[test]
    fn test_boxed_sink_forwards() {
        let mut sink: Box<dyn CodeSink> = Box::new(MemorySink::new());
        assert!(sink.accept(&["A".to_string()]).is_ok());
    }
}
