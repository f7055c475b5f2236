//! Input normalization.
//!
//! Text submitted by a user may be PEM armored, a hex dump, bare Base64, or
//! anything else. Detection runs in that order and always ends in a byte
//! sequence; the raw fallback maps each character to its low byte and is
//! flagged as low confidence.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use certscope_core::DecodeError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// How the normalized bytes were recovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceEncoding {
    /// PEM armor with its label, e.g. "CERTIFICATE"
    Pem { label: String },
    Hex,
    Base64,
    /// Character codes taken as bytes
    Raw,
    /// Binary file contents used as-is
    Binary,
}

impl fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceEncoding::Pem { label } => write!(f, "PEM ({})", label),
            SourceEncoding::Hex => f.write_str("hex"),
            SourceEncoding::Base64 => f.write_str("Base64"),
            SourceEncoding::Raw => f.write_str("raw (low confidence)"),
            SourceEncoding::Binary => f.write_str("binary DER"),
        }
    }
}

/// Normalized bytes plus the encoding they were detected in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInput {
    pub bytes: Vec<u8>,
    pub encoding: SourceEncoding,
}

impl EncodedInput {
    /// Wraps file contents. UTF-8 text goes through [`normalize_input`];
    /// anything else is taken as DER.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, DecodeError> {
        match String::from_utf8(bytes) {
            Ok(text) => normalize_input(&text),
            Err(err) => {
                let bytes = err.into_bytes();
                debug!("Input is not UTF-8 text, using {} byte(s) as DER", bytes.len());
                Ok(Self {
                    bytes,
                    encoding: SourceEncoding::Binary,
                })
            }
        }
    }

    /// True when no recognised encoding matched.
    pub fn is_low_confidence(&self) -> bool {
        self.encoding == SourceEncoding::Raw
    }

    /// Standard Base64 of the normalized bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// PEM label, if the input was armored.
    pub fn pem_label(&self) -> Option<&str> {
        match &self.encoding {
            SourceEncoding::Pem { label } => Some(label),
            _ => None,
        }
    }
}

fn hex_regex() -> &'static Regex {
    static HEX: OnceLock<Regex> = OnceLock::new();
    HEX.get_or_init(|| Regex::new(r"^[0-9A-Fa-f\s]+$").expect("hex pattern is valid"))
}

/// Normalizes user text to bytes.
///
/// Fails with `InvalidEncoding` only for empty or whitespace-only text.
pub fn normalize_input(text: &str) -> Result<EncodedInput, DecodeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DecodeError::invalid_encoding("input is empty"));
    }

    if let Some(input) = decode_pem(trimmed) {
        return Ok(input);
    }

    if hex_regex().is_match(trimmed) {
        let digits: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.len() % 2 == 0 {
            if let Ok(bytes) = hex::decode(&digits) {
                debug!("Input detected as hex ({} bytes)", bytes.len());
                return Ok(EncodedInput {
                    bytes,
                    encoding: SourceEncoding::Hex,
                });
            }
        }
    }

    if let Some(bytes) = decode_base64(trimmed) {
        debug!("Input detected as Base64 ({} bytes)", bytes.len());
        return Ok(EncodedInput {
            bytes,
            encoding: SourceEncoding::Base64,
        });
    }

    warn!("Input matched no known encoding, using character codes as bytes");
    Ok(EncodedInput {
        bytes: trimmed.chars().map(|c| c as u32 as u8).collect(),
        encoding: SourceEncoding::Raw,
    })
}

/// Label of a `-----BEGIN <label>-----` or `-----END <label>-----` line.
fn armor_label<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    line.trim()
        .strip_prefix("-----")?
        .strip_prefix(marker)?
        .strip_prefix(' ')?
        .strip_suffix("-----")
        .map(str::trim)
}

/// Decodes the first PEM block.
///
/// The body runs from the first BEGIN line to the next END line, or to the
/// end of the text when the END line is missing. Armor headers (`Key: value`
/// lines) and stray armor lines are skipped.
fn decode_pem(text: &str) -> Option<EncodedInput> {
    let mut lines = text.lines();
    let label = lines
        .by_ref()
        .find_map(|line| armor_label(line, "BEGIN"))?
        .to_string();

    let mut body = String::new();
    let mut closed = false;
    for line in lines {
        if let Some(end_label) = armor_label(line, "END") {
            if end_label != label {
                warn!("PEM armor mismatch: BEGIN {} / END {}", label, end_label);
            }
            closed = true;
            break;
        }
        let line = line.trim();
        if line.starts_with("-----") || line.contains(':') {
            continue;
        }
        body.push_str(line);
    }
    if !closed {
        warn!("PEM block '{}' has no END line", label);
    }

    match decode_base64(&body) {
        Some(bytes) => {
            debug!("Input detected as PEM '{}' ({} bytes)", label, bytes.len());
            Some(EncodedInput {
                bytes,
                encoding: SourceEncoding::Pem { label },
            })
        }
        None => {
            warn!("PEM block '{}' has an invalid Base64 body", label);
            None
        }
    }
}

fn decode_base64(text: &str) -> Option<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    STANDARD
        .decode(&compact)
        .or_else(|_| STANDARD_NO_PAD.decode(&compact))
        .ok()
        .filter(|bytes| !bytes.is_empty())
}
