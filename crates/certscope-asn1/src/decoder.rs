//! Recursive TLV decoder.
//!
//! The decoder builds the [`TlvNode`] tree in a single pass over an immutable
//! buffer. Every node records its absolute byte range so views can correlate
//! tree and hex dump. Any failure aborts the whole decode; no partial tree is
//! returned.

use crate::node::{ByteRange, TlvNode};
use crate::tag::Tag;
use crate::value::{decode_primitive, RawContent};
use certscope_core::config::DecoderConfig;
use certscope_core::DecodeError;
use tracing::{debug, trace, warn};

/// Result of decoding a whole buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDocument {
    pub root: TlvNode,
    /// Bytes left over after the root element
    pub trailing_bytes: usize,
}

/// TLV decoder with configured limits.
#[derive(Debug, Clone)]
pub struct TlvDecoder {
    max_nesting_depth: usize,
    max_content_length: u64,
}

impl Default for TlvDecoder {
    fn default() -> Self {
        Self::new(&DecoderConfig::default())
    }
}

impl TlvDecoder {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            max_nesting_depth: config.max_nesting_depth,
            max_content_length: config.max_content_length,
        }
    }

    /// Decodes the element starting at `offset`.
    pub fn decode_tlv(&self, bytes: &[u8], offset: usize) -> Result<TlvNode, DecodeError> {
        self.decode_node(bytes, offset, bytes.len(), 0)
    }

    /// Decodes the root element at offset 0 and counts what follows it.
    pub fn decode_document(&self, bytes: &[u8]) -> Result<DecodedDocument, DecodeError> {
        let root = self.decode_tlv(bytes, 0)?;
        let trailing_bytes = bytes.len() - root.byte_range.end;
        debug!(
            "Decoded {} byte(s): root {} spans {}..{}, {} trailing",
            bytes.len(),
            root.type_name,
            root.byte_range.start,
            root.byte_range.end,
            trailing_bytes
        );
        if trailing_bytes > 0 {
            warn!(
                "{} byte(s) follow the root element at offset {}",
                trailing_bytes, root.byte_range.end
            );
        }
        Ok(DecodedDocument {
            root,
            trailing_bytes,
        })
    }

    /// Decodes one node whose encoding must end at or before `limit`.
    fn decode_node(
        &self,
        bytes: &[u8],
        offset: usize,
        limit: usize,
        depth: usize,
    ) -> Result<TlvNode, DecodeError> {
        let window = &bytes[..limit];
        let (tag, tag_len) = Tag::parse(window, offset)?;
        let type_name = tag.type_name();

        let (length, length_len) = self
            .read_length(window, offset + tag_len)
            .map_err(|e| e.with_tag(type_name.as_str()))?;

        let content_start = offset + tag_len + length_len;
        let available = limit - content_start;
        if length > available {
            return Err(
                DecodeError::truncated(content_start, length, available).with_tag(type_name),
            );
        }
        let end = content_start + length;

        trace!(
            "{} at {} (depth {}): header {} byte(s), content {}",
            type_name,
            offset,
            depth,
            tag_len + length_len,
            length
        );

        let (children, raw_content) = if tag.constructed {
            if depth >= self.max_nesting_depth {
                return Err(DecodeError::new(
                    certscope_core::DecodeErrorKind::NestingTooDeep,
                    offset,
                    format!("nesting exceeds {} levels", self.max_nesting_depth),
                )
                .with_tag(type_name));
            }

            let mut children = Vec::new();
            let mut pos = content_start;
            while pos < end {
                let child = self
                    .decode_node(bytes, pos, end, depth + 1)
                    .map_err(|e| e.with_tag(type_name.as_str()))?;
                pos = child.byte_range.end;
                children.push(child);
            }
            (children, RawContent::Constructed)
        } else {
            let raw = decode_primitive(&tag, &bytes[content_start..end], content_start)
                .map_err(|e| e.with_tag(type_name.as_str()))?;
            (Vec::new(), raw)
        };

        Ok(TlvNode {
            tag_class: tag.class,
            constructed: tag.constructed,
            tag_number: tag.number,
            type_name,
            byte_range: ByteRange::new(offset, end),
            header_len: tag_len + length_len,
            children,
            raw_content,
        })
    }

    /// Reads a definite length at `pos`.
    /// Returns the length and the number of bytes it occupied.
    fn read_length(&self, bytes: &[u8], pos: usize) -> Result<(usize, usize), DecodeError> {
        let first = *bytes
            .get(pos)
            .ok_or_else(|| DecodeError::truncated(pos, 1, 0))?;

        if first < 0x80 {
            return Ok((usize::from(first), 1));
        }

        let num_bytes = usize::from(first & 0x7F);
        if num_bytes == 0 {
            return Err(DecodeError::malformed_length(
                pos,
                "length-of-length is 0 (indefinite form is not DER)",
            ));
        }
        if num_bytes > 4 {
            return Err(DecodeError::malformed_length(
                pos,
                format!("length-of-length {} exceeds 4", num_bytes),
            ));
        }

        let available = bytes.len().saturating_sub(pos + 1);
        if num_bytes > available {
            return Err(DecodeError::truncated(pos + 1, num_bytes, available));
        }

        let length = bytes[pos + 1..pos + 1 + num_bytes]
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        if length > self.max_content_length {
            return Err(DecodeError::malformed_length(
                pos,
                format!(
                    "length {} exceeds the supported maximum of {}",
                    length, self.max_content_length
                ),
            ));
        }

        let length = usize::try_from(length).map_err(|_| {
            DecodeError::malformed_length(pos, format!("length {} does not fit in memory", length))
        })?;
        Ok((length, 1 + num_bytes))
    }
}

/// Decodes the element at `offset` with default limits.
pub fn decode_tlv(bytes: &[u8], offset: usize) -> Result<TlvNode, DecodeError> {
    TlvDecoder::default().decode_tlv(bytes, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagClass;
    use certscope_core::DecodeErrorKind;

    #[test]
    fn test_sequence_with_integer() {
        let node = decode_tlv(&[0x30, 0x03, 0x02, 0x01, 0x05], 0).unwrap();
        assert_eq!(node.type_name, "SEQUENCE");
        assert_eq!(node.byte_range, ByteRange::new(0, 5));
        assert_eq!(node.children.len(), 1);

        let int = &node.children[0];
        assert_eq!(int.type_name, "INTEGER");
        assert_eq!(int.raw_content, RawContent::Integer(5));
        assert_eq!(int.byte_range, ByteRange::new(2, 5));
    }

    #[test]
    fn test_overrun_reports_content_offset() {
        let err = decode_tlv(&[0x30, 0x05, 0x02, 0x01, 0x05], 0).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::TruncatedInput);
        assert_eq!(err.offset, 2);
        assert_eq!(err.tag.as_deref(), Some("SEQUENCE"));
    }

    #[test]
    fn test_child_overrunning_parent() {
        // SEQUENCE declares 3 content bytes but its INTEGER claims 2
        let err = decode_tlv(&[0x30, 0x03, 0x02, 0x02, 0x05, 0x06], 0).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::TruncatedInput);
        assert_eq!(err.offset, 4);
        assert_eq!(err.tag.as_deref(), Some("INTEGER"));
    }

    #[test]
    fn test_long_form_length() {
        let mut bytes = vec![0x04, 0x81, 0x80];
        bytes.extend(std::iter::repeat(0xAB).take(0x80));
        let node = decode_tlv(&bytes, 0).unwrap();
        assert_eq!(node.header_len, 3);
        assert_eq!(node.byte_range.end, 3 + 0x80);
    }

    #[test]
    fn test_indefinite_length_rejected() {
        let err = decode_tlv(&[0x30, 0x80, 0x00, 0x00], 0).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::MalformedLength);
        assert_eq!(err.offset, 1);
    }

    #[test]
    fn test_oversized_length_of_length() {
        let err = decode_tlv(&[0x04, 0x85, 0, 0, 0, 0, 1], 0).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::MalformedLength);
    }

    #[test]
    fn test_length_above_limit() {
        let decoder = TlvDecoder::new(&DecoderConfig {
            max_content_length: 16,
            ..Default::default()
        });
        let err = decoder.decode_tlv(&[0x04, 0x81, 0x20], 0).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::MalformedLength);

        let err = decode_tlv(&[0x04, 0x84, 0xFF, 0xFF, 0xFF, 0xFF], 0).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::MalformedLength);
    }

    #[test]
    fn test_truncated_length_bytes() {
        let err = decode_tlv(&[0x04, 0x82, 0x01], 0).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::TruncatedInput);
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn test_nesting_limit() {
        let decoder = TlvDecoder::new(&DecoderConfig {
            max_nesting_depth: 2,
            ..Default::default()
        });
        let nested = [0x30, 0x06, 0x30, 0x04, 0x30, 0x02, 0x05, 0x00];
        let err = decoder.decode_tlv(&nested, 0).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::NestingTooDeep);
        assert_eq!(err.offset, 4);

        assert!(decode_tlv(&nested, 0).is_ok());
    }

    #[test]
    fn test_invalid_null_aborts_decode() {
        let err = decode_tlv(&[0x30, 0x03, 0x05, 0x01, 0x00], 0).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidNull);
        assert_eq!(err.offset, 4);
        assert_eq!(err.tag.as_deref(), Some("NULL"));
    }

    #[test]
    fn test_context_specific_children() {
        // [0] { INTEGER 2 }
        let node = decode_tlv(&[0xA0, 0x03, 0x02, 0x01, 0x02], 0).unwrap();
        assert_eq!(node.tag_class, TagClass::ContextSpecific);
        assert_eq!(node.type_name, "[0]");
        assert_eq!(node.children[0].raw_content, RawContent::Integer(2));
    }

    #[test]
    fn test_decode_at_offset() {
        let bytes = [0xFF, 0xFF, 0x02, 0x01, 0x07];
        let node = decode_tlv(&bytes, 2).unwrap();
        assert_eq!(node.byte_range, ByteRange::new(2, 5));
    }

    #[test]
    fn test_document_trailing_bytes() {
        let doc = TlvDecoder::default()
            .decode_document(&[0x05, 0x00, 0xDE, 0xAD])
            .unwrap();
        assert_eq!(doc.root.raw_content, RawContent::Null);
        assert_eq!(doc.trailing_bytes, 2);
    }

    #[test]
    fn test_empty_input() {
        let err = decode_tlv(&[], 0).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::TruncatedInput);
        assert_eq!(err.offset, 0);
    }
}
