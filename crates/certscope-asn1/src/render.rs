//! Text views of a decoded tree.
//!
//! Both views are produced from the node tree alone; nothing re-reads the
//! source bytes.

use crate::node::TlvNode;
use crate::value::RawContent;
use certscope_core::config::RenderConfig;
use std::fmt::Write;

/// Shared renderer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Shorten hex values longer than `trim_threshold` characters
    pub trim_large: bool,
    pub trim_threshold: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(&RenderConfig::default(), false)
    }
}

impl RenderOptions {
    pub fn new(config: &RenderConfig, trim_large: bool) -> Self {
        Self {
            trim_large,
            trim_threshold: config.trim_threshold,
        }
    }

    fn value_text(&self, value: &RawContent) -> String {
        let text = value.to_string();
        match value.hex() {
            Some(hex) if self.trim_large && hex.len() > self.trim_threshold => {
                let shown = &hex[..self.trim_threshold];
                let rendered = text.replacen(hex, shown, 1);
                format!("{}... ({} bytes)", rendered, hex.len() / 2)
            }
            _ => text,
        }
    }
}

/// asn1parse-style listing, one line per node:
///
/// ```text
///     0:d=0  hl=2 l=   3 cons: SEQUENCE
///     2:d=1  hl=2 l=   1 prim: INTEGER           :5
/// ```
pub fn render_pretty(root: &TlvNode, options: &RenderOptions) -> String {
    let mut out = String::new();
    for (depth, node) in root.walk() {
        let _ = write!(
            out,
            "{:>5}:d={:<2} hl={} l={:>4} {}: ",
            node.byte_range.start,
            depth,
            node.header_len,
            node.content_len(),
            if node.constructed { "cons" } else { "prim" },
        );
        let value = options.value_text(&node.raw_content);
        if value.is_empty() {
            out.push_str(&node.type_name);
        } else {
            let _ = write!(out, "{:<18}:{}", node.type_name, value);
        }
        out.push('\n');
    }
    out
}

/// Brace notation in the style of DER debuggers:
///
/// ```text
/// SEQUENCE {
///   INTEGER 5
/// }
/// ```
pub fn render_der_debug(root: &TlvNode, options: &RenderOptions) -> String {
    let mut out = String::new();
    write_der_debug(&mut out, root, 0, options);
    out
}

fn write_der_debug(out: &mut String, node: &TlvNode, depth: usize, options: &RenderOptions) {
    let indent = "  ".repeat(depth);
    if node.constructed {
        if node.children.is_empty() {
            let _ = writeln!(out, "{}{} {{}}", indent, node.type_name);
            return;
        }
        let _ = writeln!(out, "{}{} {{", indent, node.type_name);
        for child in &node.children {
            write_der_debug(out, child, depth + 1, options);
        }
        let _ = writeln!(out, "{}}}", indent);
    } else {
        let value = options.value_text(&node.raw_content);
        if value.is_empty() {
            let _ = writeln!(out, "{}{}", indent, node.type_name);
        } else {
            let _ = writeln!(out, "{}{} {}", indent, node.type_name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode_tlv;

    // SEQUENCE { INTEGER 5, [0] { NULL }, SEQUENCE {}, BOOLEAN TRUE }
    const SAMPLE: &[u8] = &[
        0x30, 0x0C, 0x02, 0x01, 0x05, 0xA0, 0x02, 0x05, 0x00, 0x30, 0x00, 0x01, 0x01, 0xFF,
    ];

    fn sample() -> TlvNode {
        decode_tlv(SAMPLE, 0).unwrap()
    }

    #[test]
    fn test_render_pretty() {
        let text = render_pretty(&sample(), &RenderOptions::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "    0:d=0  hl=2 l=  12 cons: SEQUENCE");
        assert_eq!(lines[1], "    2:d=1  hl=2 l=   1 prim: INTEGER           :5");
        assert_eq!(lines[2], "    5:d=1  hl=2 l=   2 cons: [0]");
        assert_eq!(lines[3], "    7:d=2  hl=2 l=   0 prim: NULL");
        assert_eq!(lines[4], "    9:d=1  hl=2 l=   0 cons: SEQUENCE");
        assert_eq!(lines[5], "   11:d=1  hl=2 l=   1 prim: BOOLEAN           :TRUE");
    }

    #[test]
    fn test_render_der_debug() {
        let text = render_der_debug(&sample(), &RenderOptions::default());
        assert_eq!(
            text,
            "SEQUENCE {\n  INTEGER 5\n  [0] {\n    NULL\n  }\n  SEQUENCE {}\n  BOOLEAN TRUE\n}\n"
        );
    }

    #[test]
    fn test_trim_large_values() {
        let mut der = vec![0x04, 0x28];
        der.extend(std::iter::repeat(0xAB).take(40));
        let node = decode_tlv(&der, 0).unwrap();

        let options = RenderOptions {
            trim_large: true,
            trim_threshold: 8,
        };
        let text = render_der_debug(&node, &options);
        assert_eq!(text, "OCTET STRING abababab... (40 bytes)\n");

        let full = render_der_debug(&node, &RenderOptions::default());
        assert_eq!(full.trim_end().len(), "OCTET STRING ".len() + 80);
    }
}
