//! Structural re-encoding of decoded trees.
//!
//! Headers are rebuilt from the node fields in DER minimal form; primitive
//! content is copied from the source buffer and constructed content is the
//! concatenation of the re-encoded children. For DER input the result equals
//! the bytes the node was decoded from.

use crate::node::TlvNode;

/// Encodes a definite length in DER minimal form.
pub fn encode_length(len: usize) -> Vec<u8> {
    if len < 0x80 {
        return vec![len as u8];
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let significant = &bytes[skip..];
    let mut out = Vec::with_capacity(1 + significant.len());
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
    out
}

/// Re-encodes `node` against the buffer it was decoded from.
pub fn encode_node(node: &TlvNode, source: &[u8]) -> Vec<u8> {
    let content = if node.constructed {
        let mut content = Vec::with_capacity(node.content_len());
        for child in &node.children {
            content.extend(encode_node(child, source));
        }
        content
    } else {
        let range = node.content_range();
        source
            .get(range.start..range.end)
            .map(<[u8]>::to_vec)
            .unwrap_or_default()
    };

    let mut out = node.tag().to_bytes();
    out.extend(encode_length(content.len()));
    out.extend(content);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode_tlv;

    #[test]
    fn test_encode_length_forms() {
        assert_eq!(encode_length(0), vec![0x00]);
        assert_eq!(encode_length(127), vec![0x7F]);
        assert_eq!(encode_length(128), vec![0x81, 0x80]);
        assert_eq!(encode_length(256), vec![0x82, 0x01, 0x00]);
        assert_eq!(encode_length(0x0100_0000), vec![0x84, 0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_reencode_nested() {
        // SEQUENCE { INTEGER 5, [0] { NULL }, OID 2.5.4.3 }
        let der = [
            0x30, 0x0C, 0x02, 0x01, 0x05, 0xA0, 0x02, 0x05, 0x00, 0x06, 0x03, 0x55, 0x04, 0x03,
        ];
        let node = decode_tlv(&der, 0).unwrap();
        assert_eq!(encode_node(&node, &der), der.to_vec());
        assert_eq!(encode_node(&node.children[1], &der), vec![0xA0, 0x02, 0x05, 0x00]);
    }

    #[test]
    fn test_reencode_long_form() {
        let mut der = vec![0x04, 0x82, 0x01, 0x00];
        der.extend(std::iter::repeat(0x11).take(256));
        let node = decode_tlv(&der, 0).unwrap();
        assert_eq!(encode_node(&node, &der), der);
    }
}
