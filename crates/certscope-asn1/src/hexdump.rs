//! Hex dump view.
//!
//! The dump is tokenized once: every byte becomes a [`HexToken`] that keeps
//! its absolute index, so highlighting can map byte ranges to screen
//! positions without re-scanning.

use crate::highlight::{HighlightCorrelator, HighlightState};
use certscope_core::config::HexDumpConfig;
use serde::Serialize;

/// One byte of the dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HexToken {
    /// Absolute byte index in the decoded buffer
    pub index: usize,
    /// Two lowercase hex digits
    pub text: String,
}

/// One row of the dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HexRow {
    pub offset: usize,
    pub tokens: Vec<HexToken>,
    /// Printable ASCII rendering, `.` for everything else
    pub ascii: String,
}

/// Tokenized hex dump of a byte buffer.
#[derive(Debug, Clone, Serialize)]
pub struct HexDump {
    row_width: usize,
    ascii: bool,
    len: usize,
    rows: Vec<HexRow>,
}

impl HexDump {
    pub fn new(bytes: &[u8], config: &HexDumpConfig) -> Self {
        let row_width = config.row_width.max(1);
        let rows = bytes
            .chunks(row_width)
            .enumerate()
            .map(|(row, chunk)| {
                let offset = row * row_width;
                HexRow {
                    offset,
                    tokens: chunk
                        .iter()
                        .enumerate()
                        .map(|(i, byte)| HexToken {
                            index: offset + i,
                            text: format!("{:02x}", byte),
                        })
                        .collect(),
                    ascii: chunk
                        .iter()
                        .map(|&b| {
                            if b.is_ascii_graphic() || b == b' ' {
                                char::from(b)
                            } else {
                                '.'
                            }
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            row_width,
            ascii: config.ascii,
            len: bytes.len(),
            rows,
        }
    }

    pub fn rows(&self) -> &[HexRow] {
        &self.rows
    }

    pub fn row_width(&self) -> usize {
        self.row_width
    }

    /// Number of bytes in the dump.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Renders every row as `OFFSET  HEX...  |ASCII|`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            out.push_str(&self.render_row(row));
            out.push('\n');
        }
        out
    }

    /// Renders the dump with a caret line under each row that holds
    /// highlighted bytes.
    pub fn render_highlighted(&self, state: &HighlightState) -> String {
        let Some(range) = state.active() else {
            return self.render();
        };

        let positions = HighlightCorrelator::new(self).tokens_in(range);
        let mut out = String::new();
        let mut pending = positions.iter().peekable();
        for (row_index, row) in self.rows.iter().enumerate() {
            out.push_str(&self.render_row(row));
            out.push('\n');

            let mut marks = vec![b' '; self.hex_width()];
            let mut marked = false;
            while let Some(pos) = pending.next_if(|pos| pos.row == row_index) {
                let col = pos.column * 3;
                marks[col] = b'^';
                marks[col + 1] = b'^';
                marked = true;
            }
            if marked {
                let carets = String::from_utf8_lossy(&marks);
                out.push_str(&format!("{:10}{}\n", "", carets.trim_end()));
            }
        }
        out
    }

    fn hex_width(&self) -> usize {
        self.row_width * 3 - 1
    }

    fn render_row(&self, row: &HexRow) -> String {
        let hex = row
            .tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        if self.ascii {
            format!(
                "{:08x}  {:<width$}  |{}|",
                row.offset,
                hex,
                row.ascii,
                width = self.hex_width()
            )
        } else {
            format!("{:08x}  {}", row.offset, hex)
        }
    }
}

/// Renders `bytes` with the default layout (16 bytes per row, ASCII gutter).
pub fn render_hex_dump(bytes: &[u8]) -> String {
    HexDump::new(bytes, &HexDumpConfig::default()).render()
}
