//! ASN.1/DER structural decoder for certscope.
//!
//! This crate turns PEM, hex, Base64, or raw text into a tree of typed
//! [`TlvNode`]s. Every node records the absolute byte range it was decoded
//! from, which lets the tree view, the hex dump, and the highlight correlator
//! agree on positions.
//!
//! # Example
//!
//! ```
//! use certscope_asn1::{decode_tlv, normalize_input, RawContent};
//!
//! let input = normalize_input("30 03 02 01 05").unwrap();
//! let root = decode_tlv(&input.bytes, 0).unwrap();
//!
//! assert_eq!(root.type_name, "SEQUENCE");
//! assert_eq!(root.children[0].raw_content, RawContent::Integer(5));
//! ```

pub mod decoder;
pub mod encoder;
pub mod guess;
pub mod hexdump;
pub mod highlight;
pub mod input;
pub mod inspect;
pub mod node;
pub mod oid;
pub mod render;
pub mod source;
pub mod tag;
pub mod time;
pub mod value;

pub use decoder::{decode_tlv, DecodedDocument, TlvDecoder};
pub use encoder::{encode_length, encode_node};
pub use guess::{guess_content_type, ContentGuess, ContentTypeScorer, KeywordScorer};
pub use hexdump::{render_hex_dump, HexDump, HexRow, HexToken};
pub use highlight::{node_path_at, HighlightCorrelator, HighlightState, TokenPosition};
pub use input::{normalize_input, EncodedInput, SourceEncoding};
pub use inspect::{DecodeOutcome, Inspector};
pub use node::{ByteRange, TlvNode};
pub use oid::{decode_oid, encode_oid, oid_name};
pub use render::{render_der_debug, render_pretty, RenderOptions};
pub use source::{is_accepted_extension, ByteSource, FileSource, MemorySource, ReaderSource};
pub use tag::{Tag, TagClass};
pub use value::RawContent;
