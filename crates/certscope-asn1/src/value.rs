//! Leaf value decoding for primitive nodes.

use crate::oid::{decode_oid, oid_name};
use crate::tag::{universal, Tag, TagClass};
use crate::time::{generalized_time_to_iso, utc_time_to_iso};
use certscope_core::DecodeError;
use serde::Serialize;
use std::fmt;

/// Decoded content of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RawContent {
    /// Constructed node; the value lives in its children
    Constructed,
    Null,
    Boolean(bool),
    /// INTEGER or ENUMERATED that fits in an i64
    Integer(i64),
    /// INTEGER or ENUMERATED too wide for i64, as big-endian hex
    BigInteger(String),
    Oid {
        dotted: String,
        name: Option<&'static str>,
    },
    BitString {
        unused_bits: u8,
        hex: String,
    },
    OctetString(String),
    Text(String),
    /// ISO-8601 rendering of UTCTime or GeneralizedTime
    Time(String),
    /// Any other primitive, as hex
    Hex(String),
}

impl RawContent {
    /// Hex payload for the byte-oriented variants.
    pub fn hex(&self) -> Option<&str> {
        match self {
            RawContent::BigInteger(hex)
            | RawContent::BitString { hex, .. }
            | RawContent::OctetString(hex)
            | RawContent::Hex(hex) => Some(hex),
            _ => None,
        }
    }
}

impl fmt::Display for RawContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawContent::Constructed | RawContent::Null => Ok(()),
            RawContent::Boolean(true) => f.write_str("TRUE"),
            RawContent::Boolean(false) => f.write_str("FALSE"),
            RawContent::Integer(value) => write!(f, "{}", value),
            RawContent::BigInteger(hex) => write!(f, "0x{}", hex),
            RawContent::Oid { dotted, name } => match name {
                Some(name) => write!(f, "{} ({})", dotted, name),
                None => f.write_str(dotted),
            },
            RawContent::BitString { unused_bits, hex } => {
                write!(f, "({} unused bits) {}", unused_bits, hex)
            }
            RawContent::OctetString(hex) | RawContent::Hex(hex) => f.write_str(hex),
            RawContent::Text(text) => write!(f, "{:?}", text),
            RawContent::Time(iso) => f.write_str(iso),
        }
    }
}

/// Decodes the content octets of a primitive node.
///
/// `offset` is the absolute position of `content[0]` and is used for errors.
/// Non-universal tags carry no type information and decode as hex.
pub fn decode_primitive(
    tag: &Tag,
    content: &[u8],
    offset: usize,
) -> Result<RawContent, DecodeError> {
    if tag.class != TagClass::Universal {
        return Ok(RawContent::Hex(hex::encode(content)));
    }

    use universal::*;
    let value = match tag.number {
        NULL => {
            if !content.is_empty() {
                return Err(DecodeError::invalid_null(offset, content.len()));
            }
            RawContent::Null
        }
        BOOLEAN => match content.first() {
            Some(&byte) => RawContent::Boolean(byte != 0),
            None => return Err(DecodeError::invalid_content(offset, "BOOLEAN has no content")),
        },
        INTEGER | ENUMERATED => decode_integer(content, offset)?,
        OBJECT_IDENTIFIER => {
            let dotted = decode_oid(content, offset)?;
            let name = oid_name(&dotted);
            RawContent::Oid { dotted, name }
        }
        BIT_STRING => {
            let (&unused_bits, rest) = content.split_first().ok_or_else(|| {
                DecodeError::invalid_content(offset, "BIT STRING has no unused-bits byte")
            })?;
            if unused_bits > 7 || (rest.is_empty() && unused_bits != 0) {
                return Err(DecodeError::invalid_content(
                    offset,
                    format!("invalid unused-bits count {}", unused_bits),
                ));
            }
            RawContent::BitString {
                unused_bits,
                hex: hex::encode(rest),
            }
        }
        OCTET_STRING => RawContent::OctetString(hex::encode(content)),
        UTC_TIME => RawContent::Time(decode_time(content, offset, utc_time_to_iso, "UTCTime")?),
        GENERALIZED_TIME => RawContent::Time(decode_time(
            content,
            offset,
            generalized_time_to_iso,
            "GeneralizedTime",
        )?),
        UTF8_STRING => RawContent::Text(String::from_utf8_lossy(content).into_owned()),
        NUMERIC_STRING | PRINTABLE_STRING | TELETEX_STRING | VIDEOTEX_STRING | IA5_STRING
        | GRAPHIC_STRING | VISIBLE_STRING | GENERAL_STRING | OBJECT_DESCRIPTOR => {
            RawContent::Text(content.iter().map(|&b| char::from(b)).collect())
        }
        BMP_STRING => {
            if content.len() % 2 != 0 {
                return Err(DecodeError::invalid_content(
                    offset,
                    "BMPString length is not a multiple of 2",
                ));
            }
            let units: Vec<u16> = content
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            RawContent::Text(String::from_utf16_lossy(&units))
        }
        UNIVERSAL_STRING => {
            if content.len() % 4 != 0 {
                return Err(DecodeError::invalid_content(
                    offset,
                    "UniversalString length is not a multiple of 4",
                ));
            }
            RawContent::Text(
                content
                    .chunks_exact(4)
                    .map(|c| {
                        char::from_u32(u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                            .unwrap_or(char::REPLACEMENT_CHARACTER)
                    })
                    .collect(),
            )
        }
        _ => RawContent::Hex(hex::encode(content)),
    };
    Ok(value)
}

fn decode_integer(content: &[u8], offset: usize) -> Result<RawContent, DecodeError> {
    if content.is_empty() {
        return Err(DecodeError::invalid_content(offset, "INTEGER has no content"));
    }
    if content.len() > 8 {
        return Ok(RawContent::BigInteger(hex::encode(content)));
    }

    // Sign-extend from the first byte, then shift in the rest.
    let mut value: i64 = if content[0] & 0x80 != 0 { -1 } else { 0 };
    for &byte in content {
        value = (value << 8) | i64::from(byte);
    }
    Ok(RawContent::Integer(value))
}

fn decode_time(
    content: &[u8],
    offset: usize,
    convert: fn(&str) -> Option<String>,
    type_name: &str,
) -> Result<String, DecodeError> {
    std::str::from_utf8(content)
        .ok()
        .and_then(convert)
        .ok_or_else(|| {
            DecodeError::invalid_content(
                offset,
                format!(
                    "'{}' is not a valid {}",
                    String::from_utf8_lossy(content),
                    type_name
                ),
            )
        })
}
