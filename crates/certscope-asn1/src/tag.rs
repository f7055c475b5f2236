//! ASN.1 identifier octets.

use certscope_core::DecodeError;
use serde::Serialize;
use std::fmt;

/// Universal tag numbers the decoder knows by name.
pub mod universal {
    pub const END_OF_CONTENT: u32 = 0x00;
    pub const BOOLEAN: u32 = 0x01;
    pub const INTEGER: u32 = 0x02;
    pub const BIT_STRING: u32 = 0x03;
    pub const OCTET_STRING: u32 = 0x04;
    pub const NULL: u32 = 0x05;
    pub const OBJECT_IDENTIFIER: u32 = 0x06;
    pub const OBJECT_DESCRIPTOR: u32 = 0x07;
    pub const EXTERNAL: u32 = 0x08;
    pub const REAL: u32 = 0x09;
    pub const ENUMERATED: u32 = 0x0A;
    pub const EMBEDDED_PDV: u32 = 0x0B;
    pub const UTF8_STRING: u32 = 0x0C;
    pub const RELATIVE_OID: u32 = 0x0D;
    pub const SEQUENCE: u32 = 0x10;
    pub const SET: u32 = 0x11;
    pub const NUMERIC_STRING: u32 = 0x12;
    pub const PRINTABLE_STRING: u32 = 0x13;
    pub const TELETEX_STRING: u32 = 0x14;
    pub const VIDEOTEX_STRING: u32 = 0x15;
    pub const IA5_STRING: u32 = 0x16;
    pub const UTC_TIME: u32 = 0x17;
    pub const GENERALIZED_TIME: u32 = 0x18;
    pub const GRAPHIC_STRING: u32 = 0x19;
    pub const VISIBLE_STRING: u32 = 0x1A;
    pub const GENERAL_STRING: u32 = 0x1B;
    pub const UNIVERSAL_STRING: u32 = 0x1C;
    pub const BMP_STRING: u32 = 0x1E;
}

/// ASN.1 tag class, bits 7-6 of the first identifier octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl TagClass {
    fn from_bits(first: u8) -> Self {
        match first >> 6 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }

    fn bits(&self) -> u8 {
        match self {
            TagClass::Universal => 0x00,
            TagClass::Application => 0x40,
            TagClass::ContextSpecific => 0x80,
            TagClass::Private => 0xC0,
        }
    }
}

/// A parsed identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Tag {
    pub class: TagClass,
    pub constructed: bool,
    pub number: u32,
}

impl Tag {
    pub fn new(class: TagClass, constructed: bool, number: u32) -> Self {
        Self {
            class,
            constructed,
            number,
        }
    }

    /// Parses the identifier starting at `offset`.
    /// Returns the tag and number of bytes consumed.
    pub fn parse(bytes: &[u8], offset: usize) -> Result<(Self, usize), DecodeError> {
        let first = *bytes
            .get(offset)
            .ok_or_else(|| DecodeError::truncated(offset, 1, 0))?;

        let class = TagClass::from_bits(first);
        let constructed = (first & 0x20) != 0;

        let low_bits = first & 0x1F;
        if low_bits < 0x1F {
            return Ok((Tag::new(class, constructed, u32::from(low_bits)), 1));
        }

        // High-tag-number form: base-128 continuation bytes.
        let mut number: u32 = 0;
        let mut pos = offset + 1;
        loop {
            let byte = *bytes.get(pos).ok_or_else(|| {
                DecodeError::malformed_tag(pos, "high-tag-number form ends before its last byte")
            })?;
            if number > (u32::MAX >> 7) {
                return Err(DecodeError::malformed_tag(
                    pos,
                    "tag number does not fit in 32 bits",
                ));
            }
            number = (number << 7) | u32::from(byte & 0x7F);
            pos += 1;
            if (byte & 0x80) == 0 {
                break;
            }
        }

        Ok((Tag::new(class, constructed, number), pos - offset))
    }

    /// Encodes this tag to identifier octets.
    pub fn to_bytes(&self) -> Vec<u8> {
        let lead = self.class.bits() | if self.constructed { 0x20 } else { 0x00 };

        if self.number < 0x1F {
            return vec![lead | self.number as u8];
        }

        let mut groups = Vec::new();
        let mut num = self.number;
        while num > 0 {
            groups.push((num & 0x7F) as u8);
            num >>= 7;
        }
        groups.reverse();

        let mut result = Vec::with_capacity(groups.len() + 1);
        result.push(lead | 0x1F);
        let last = groups.len() - 1;
        for (i, group) in groups.into_iter().enumerate() {
            result.push(if i < last { group | 0x80 } else { group });
        }
        result
    }

    /// Human-readable type label.
    pub fn type_name(&self) -> String {
        match self.class {
            TagClass::Universal => match universal_name(self.number) {
                Some(name) => name.to_string(),
                None => format!("[UNIVERSAL {}]", self.number),
            },
            TagClass::ContextSpecific => format!("[{}]", self.number),
            TagClass::Application => format!("[APPLICATION {}]", self.number),
            TagClass::Private => format!("[PRIVATE {}]", self.number),
        }
    }

    /// True for the universal tag with the given number.
    pub fn is_universal(&self, number: u32) -> bool {
        self.class == TagClass::Universal && self.number == number
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

fn universal_name(number: u32) -> Option<&'static str> {
    use universal::*;

    let name = match number {
        END_OF_CONTENT => "EOC",
        BOOLEAN => "BOOLEAN",
        INTEGER => "INTEGER",
        BIT_STRING => "BIT STRING",
        OCTET_STRING => "OCTET STRING",
        NULL => "NULL",
        OBJECT_IDENTIFIER => "OBJECT IDENTIFIER",
        OBJECT_DESCRIPTOR => "ObjectDescriptor",
        EXTERNAL => "EXTERNAL",
        REAL => "REAL",
        ENUMERATED => "ENUMERATED",
        EMBEDDED_PDV => "EMBEDDED PDV",
        UTF8_STRING => "UTF8String",
        RELATIVE_OID => "RELATIVE-OID",
        SEQUENCE => "SEQUENCE",
        SET => "SET",
        NUMERIC_STRING => "NumericString",
        PRINTABLE_STRING => "PrintableString",
        TELETEX_STRING => "TeletexString",
        VIDEOTEX_STRING => "VideotexString",
        IA5_STRING => "IA5String",
        UTC_TIME => "UTCTime",
        GENERALIZED_TIME => "GeneralizedTime",
        GRAPHIC_STRING => "GraphicString",
        VISIBLE_STRING => "VisibleString",
        GENERAL_STRING => "GeneralString",
        UNIVERSAL_STRING => "UniversalString",
        BMP_STRING => "BMPString",
        _ => return None,
    };
    Some(name)
}
