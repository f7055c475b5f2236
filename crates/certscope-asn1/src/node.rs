//! The decoded element tree.

use crate::tag::{Tag, TagClass};
use crate::value::RawContent;
use serde::Serialize;

/// Half-open byte interval `[start, end)` into the decoded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }
}

/// One ASN.1 element with its absolute position in the source buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlvNode {
    pub tag_class: TagClass,
    pub constructed: bool,
    pub tag_number: u32,
    pub type_name: String,
    /// Covers tag, length, and content
    pub byte_range: ByteRange,
    /// Bytes of tag plus length
    pub header_len: usize,
    pub children: Vec<TlvNode>,
    pub raw_content: RawContent,
}

impl TlvNode {
    pub fn tag(&self) -> Tag {
        Tag::new(self.tag_class, self.constructed, self.tag_number)
    }

    /// Range of the content octets alone.
    pub fn content_range(&self) -> ByteRange {
        ByteRange::new(self.byte_range.start + self.header_len, self.byte_range.end)
    }

    pub fn content_len(&self) -> usize {
        self.content_range().len()
    }

    /// Pre-order traversal with each node's depth (root is 0).
    pub fn walk(&self) -> Vec<(usize, &TlvNode)> {
        let mut out = Vec::new();
        let mut stack = vec![(0usize, self)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            for child in node.children.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }

    /// Nodes from this one down to the innermost node covering `index`.
    /// Empty when `index` lies outside this node.
    pub fn path_at(&self, index: usize) -> Vec<&TlvNode> {
        let mut path = Vec::new();
        let mut current = self;
        if !current.byte_range.contains(index) {
            return path;
        }
        loop {
            path.push(current);
            match current
                .children
                .iter()
                .find(|child| child.byte_range.contains(index))
            {
                Some(child) => current = child,
                None => return path,
            }
        }
    }

    /// Innermost node covering `index`.
    pub fn node_at(&self, index: usize) -> Option<&TlvNode> {
        self.path_at(index).pop()
    }
}
