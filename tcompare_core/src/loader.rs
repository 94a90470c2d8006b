use std::fs::File;
use std::io::Read;
use std::path::Path;
use tcompare_common::{TCompareError, DEFAULT_MAX_FILE_SIZE};
use tracing::{debug, warn};

const UTF8_BOM: char = '\u{feff}';

/// Reads comparison inputs from files or streams, enforcing a size limit and
/// UTF-8 decoding before anything reaches the comparator.
#[derive(Debug, Clone)]
pub struct TextLoader {
    max_size: u64,
}

impl TextLoader {
    pub fn new() -> Self {
        Self {
            max_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_max_size(max_size: u64) -> Self {
        Self { max_size }
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Load a text file. Files whose metadata already exceeds the limit are
    /// rejected before any content is read; the read itself is bounded too, so
    /// a file that grows after the check is still caught.
    pub fn load_file(&self, path: &Path) -> Result<String, TCompareError> {
        let file = File::open(path)?;
        self.check_size(file.metadata()?.len(), path.display())?;

        let bytes = self.read_bounded(file, path.display())?;
        debug!("Loaded {} bytes from {}", bytes.len(), path.display());
        decode(bytes)
    }

    /// Load text from any reader (e.g. stdin).
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<String, TCompareError> {
        let bytes = self.read_bounded(reader, "stream")?;
        decode(bytes)
    }

    /// Read at most one byte past the limit to detect oversize input.
    fn read_bounded<R: Read>(
        &self,
        reader: R,
        source: impl std::fmt::Display,
    ) -> Result<Vec<u8>, TCompareError> {
        let mut bytes = Vec::new();
        reader
            .take(self.max_size.saturating_add(1))
            .read_to_end(&mut bytes)?;
        self.check_size(bytes.len() as u64, source)?;
        Ok(bytes)
    }

    fn check_size(&self, size: u64, source: impl std::fmt::Display) -> Result<(), TCompareError> {
        if size > self.max_size {
            warn!(
                "Rejecting {}: {} bytes exceeds limit of {} bytes",
                source, size, self.max_size
            );
            return Err(TCompareError::FileTooLarge {
                size,
                limit: self.max_size,
            });
        }
        Ok(())
    }
}

impl Default for TextLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(bytes: Vec<u8>) -> Result<String, TCompareError> {
    let text = String::from_utf8(bytes).map_err(|e| {
        TCompareError::Decode(format!(
            "invalid UTF-8 at byte {}",
            e.utf8_error().valid_up_to()
        ))
    })?;

    match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => Ok(stripped.to_string()),
        None => Ok(text),
    }
}
