//! Byte-range highlight correlation between the tree and the hex dump.

use crate::hexdump::HexDump;
use crate::node::{ByteRange, TlvNode};
use serde::Serialize;
use tracing::trace;

/// Screen position of a highlighted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenPosition {
    pub row: usize,
    pub column: usize,
    /// Absolute byte index
    pub index: usize,
}

/// Maps byte ranges onto the token grid of a [`HexDump`].
#[derive(Debug, Clone, Copy)]
pub struct HighlightCorrelator<'a> {
    dump: &'a HexDump,
}

impl<'a> HighlightCorrelator<'a> {
    pub fn new(dump: &'a HexDump) -> Self {
        Self { dump }
    }

    /// Token positions inside `[start, end)`.
    ///
    /// Only rows overlapping the range are visited, so the cost is bounded by
    /// the range length plus one row width.
    pub fn tokens_in(&self, range: ByteRange) -> Vec<TokenPosition> {
        let end = range.end.min(self.dump.len());
        if range.start >= end {
            return Vec::new();
        }

        let width = self.dump.row_width();
        let first_row = range.start / width;
        let last_row = (end - 1) / width;
        trace!("Highlight {}..{} covers rows {}..={}", range.start, end, first_row, last_row);

        let mut positions = Vec::with_capacity(end - range.start);
        for (row_index, row) in self
            .dump
            .rows()
            .iter()
            .enumerate()
            .take(last_row + 1)
            .skip(first_row)
        {
            for (column, token) in row.tokens.iter().enumerate() {
                if token.index >= range.start && token.index < end {
                    positions.push(TokenPosition {
                        row: row_index,
                        column,
                        index: token.index,
                    });
                }
            }
        }
        positions
    }
}

/// The single active highlight of a view. Holding a range never touches the
/// decoded data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightState {
    active: Option<ByteRange>,
}

impl HighlightState {
    /// Replaces any current highlight with `range`.
    pub fn highlight(&mut self, range: ByteRange) {
        self.active = Some(range);
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<ByteRange> {
        self.active
    }

    pub fn is_highlighted(&self, index: usize) -> bool {
        self.active.is_some_and(|range| range.contains(index))
    }
}

/// Nodes from `root` down to the innermost node covering `index`.
pub fn node_path_at(root: &TlvNode, index: usize) -> Vec<&TlvNode> {
    root.path_at(index)
}
