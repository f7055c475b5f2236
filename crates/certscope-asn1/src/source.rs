//! Byte sources injected by the host.

use certscope_core::{CertscopeError, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// File extensions a host offers in its file picker.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pem", "der", "cer", "crt", "p7m", "p7s", "b64"];

/// Returns true when `path` has one of [`ACCEPTED_EXTENSIONS`] (case-insensitive).
pub fn is_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(ext))
        })
}

/// Something that yields the bytes to decode.
pub trait ByteSource {
    /// Human-readable origin, used in logs and error messages
    fn describe(&self) -> String;

    fn read_bytes(&self) -> Result<Vec<u8>>;
}

/// Reads a file from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        let bytes = std::fs::read(&self.path)?;
        debug!("Read {} byte(s) from {}", bytes.len(), self.path.display());
        Ok(bytes)
    }
}

/// Drains a reader such as stdin. The reader is consumed on first use.
#[derive(Debug)]
pub struct ReaderSource<R> {
    name: String,
    reader: Mutex<Option<R>>,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader: Mutex::new(Some(reader)),
        }
    }
}

impl ReaderSource<std::io::Stdin> {
    pub fn stdin() -> Self {
        Self::new("<stdin>", std::io::stdin())
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        let mut guard = self
            .reader
            .lock()
            .map_err(|_| CertscopeError::Internal(format!("{} reader lock poisoned", self.name)))?;
        let mut bytes = Vec::new();
        if let Some(mut reader) = guard.take() {
            reader.read_to_end(&mut bytes)?;
        }
        debug!("Read {} byte(s) from {}", bytes.len(), self.name);
        Ok(bytes)
    }
}

/// In-memory bytes, for tests and embedding hosts.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    bytes: Vec<u8>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl ByteSource for MemorySource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}
