//! One-call decode pipeline used by hosts.

use crate::decoder::TlvDecoder;
use crate::guess::{guess_with, ContentGuess, ContentTypeScorer, KeywordScorer};
use crate::hexdump::HexDump;
use crate::input::{normalize_input, EncodedInput, SourceEncoding};
use crate::node::TlvNode;
use crate::source::ByteSource;
use certscope_core::config::HexDumpConfig;
use certscope_core::{AppConfig, DecodeError};
use serde::Serialize;
use tracing::{info, warn};

/// Everything a view needs after one decode.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeOutcome {
    pub encoding: SourceEncoding,
    pub root: TlvNode,
    /// Bytes after the root element, not covered by the tree
    pub trailing_bytes: usize,
    /// Normalized input bytes
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub hex_dump: HexDump,
    /// Standard Base64 of the normalized bytes
    pub base64: String,
    pub guesses: Vec<ContentGuess>,
}

impl DecodeOutcome {
    /// Whether the input matched no known encoding.
    pub fn is_low_confidence(&self) -> bool {
        self.encoding == SourceEncoding::Raw
    }
}

/// Normalizes, decodes, dumps, and guesses in one pass.
pub struct Inspector {
    decoder: TlvDecoder,
    hex_dump: HexDumpConfig,
    scorer: Box<dyn ContentTypeScorer>,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl Inspector {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            decoder: TlvDecoder::new(&config.decoder),
            hex_dump: config.hex_dump.clone(),
            scorer: Box::new(KeywordScorer::default()),
        }
    }

    /// Replaces the content-type scorer.
    pub fn with_scorer(mut self, scorer: Box<dyn ContentTypeScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Decodes user-submitted text.
    pub fn inspect_text(&self, text: &str) -> Result<DecodeOutcome, DecodeError> {
        let input = normalize_input(text)?;
        let guesses = guess_with(self.scorer.as_ref(), text);
        self.finish(input, guesses)
    }

    /// Decodes file contents; binary data is taken as DER.
    pub fn inspect_bytes(&self, bytes: Vec<u8>) -> Result<DecodeOutcome, DecodeError> {
        let guesses = match std::str::from_utf8(&bytes) {
            Ok(text) => guess_with(self.scorer.as_ref(), text),
            Err(_) => guess_with(self.scorer.as_ref(), ""),
        };
        let input = EncodedInput::from_bytes(bytes)?;
        self.finish(input, guesses)
    }

    /// Reads `source` and decodes its contents.
    pub fn inspect_source(&self, source: &dyn ByteSource) -> certscope_core::Result<DecodeOutcome> {
        let bytes = source.read_bytes()?;
        info!("Inspecting {} ({} bytes)", source.describe(), bytes.len());
        Ok(self.inspect_bytes(bytes)?)
    }

    fn finish(
        &self,
        input: EncodedInput,
        guesses: Vec<ContentGuess>,
    ) -> Result<DecodeOutcome, DecodeError> {
        if input.is_low_confidence() {
            warn!("Decoding low-confidence raw input; results may be meaningless");
        }

        let document = self.decoder.decode_document(&input.bytes)?;
        let hex_dump = HexDump::new(&input.bytes, &self.hex_dump);
        let base64 = input.to_base64();
        info!(
            "Decoded {} input: {} node(s), top guess {}",
            input.encoding,
            document.root.walk().len(),
            guesses.first().map(|g| g.label.as_str()).unwrap_or("none")
        );

        Ok(DecodeOutcome {
            encoding: input.encoding,
            root: document.root,
            trailing_bytes: document.trailing_bytes,
            bytes: input.bytes,
            hex_dump,
            base64,
            guesses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guess::GENERIC_LABEL;
    use crate::source::MemorySource;
    use certscope_core::{CertscopeError, DecodeErrorKind};

    #[test]
    fn test_inspect_hex_text() {
        let outcome = Inspector::default().inspect_text("30 03 02 01 05").unwrap();
        assert_eq!(outcome.encoding, SourceEncoding::Hex);
        assert_eq!(outcome.root.children.len(), 1);
        assert_eq!(outcome.trailing_bytes, 0);
        assert_eq!(outcome.base64, "MAMCAQU=");
        assert_eq!(outcome.hex_dump.len(), 5);
        assert_eq!(outcome.guesses[0].label, GENERIC_LABEL);
    }

    #[test]
    fn test_inspect_reports_decode_error() {
        let err = Inspector::default().inspect_text("30 05 02 01 05").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::TruncatedInput);
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn test_inspect_binary_source() {
        let source = MemorySource::new("blob", vec![0x30, 0x00, 0xFF, 0xFE]);
        let outcome = Inspector::default().inspect_source(&source).unwrap();
        assert_eq!(outcome.encoding, SourceEncoding::Binary);
        assert_eq!(outcome.trailing_bytes, 2);
    }

    #[test]
    fn test_inspect_source_wraps_decode_error() {
        let source = MemorySource::new("blob", b"   ".to_vec());
        let err = Inspector::default().inspect_source(&source).unwrap_err();
        assert!(matches!(
            err,
            CertscopeError::Decode(ref e) if e.kind == DecodeErrorKind::InvalidEncoding
        ));
    }

    #[test]
    fn test_row_width_from_config() {
        let mut config = AppConfig::default();
        config.hex_dump.row_width = 2;
        let outcome = Inspector::new(&config).inspect_text("30 03 02 01 05").unwrap();
        assert_eq!(outcome.hex_dump.rows().len(), 3);
    }

    #[test]
    fn test_outcome_serializes_tree() {
        let outcome = Inspector::default().inspect_text("MAMCAQU=").unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["encoding"]["type"], "base64");
        assert_eq!(json["root"]["type_name"], "SEQUENCE");
        assert_eq!(json["root"]["byte_range"]["end"], 5);
        assert_eq!(json["root"]["children"][0]["raw_content"]["value"], 5);
        assert!(json.get("bytes").is_none());
        assert_eq!(json["hex_dump"]["rows"][0]["tokens"][4]["text"], "05");
        assert_eq!(json["hex_dump"]["rows"][0]["ascii"], "0....");
    }

    #[test]
    fn test_inspect_pem_without_end_line() {
        let outcome = Inspector::default()
            .inspect_text("-----BEGIN CERTIFICATE-----\nMAMCAQU=\n")
            .unwrap();
        assert_eq!(
            outcome.encoding,
            SourceEncoding::Pem {
                label: "CERTIFICATE".to_string()
            }
        );
        assert_eq!(outcome.root.type_name, "SEQUENCE");
        assert_eq!(outcome.root.children[0].type_name, "INTEGER");
    }
}
