//! Issuer-chain resolution for certscope.
//!
//! Given a leaf certificate and the list of known CAs, [`ChainResolver`]
//! walks issuer references upward and returns the ancestors root first.
//!
//! # Example
//!
//! ```
//! use certscope_chain::{build_chain, CaRecord, ChainTermination};
//!
//! let cas = vec![
//!     CaRecord::new("root", "CN=Root", "").with_issuer("root"),
//!     CaRecord::new("issuing", "CN=Issuing", "").with_issuer("root"),
//! ];
//! let leaf = CaRecord::new("leaf", "CN=Leaf", "").with_issuer("issuing");
//!
//! let chain = build_chain(&leaf, &cas);
//! assert_eq!(chain.ids(), vec!["root", "issuing"]);
//! assert_eq!(chain.termination, ChainTermination::SelfSigned);
//! ```

pub mod certificate;
pub mod record;
pub mod resolver;

pub use certificate::{
    encode_pem, load_ca_records, parse_pem_bundle, summarize_der, summarize_pem,
    CertificateSummary,
};
pub use record::{CaRecord, CaStatus, CertificateRecord, Issued, SELF_SIGNED_MARKER};
pub use resolver::{build_chain, build_chain_pem, CertificateChain, ChainResolver, ChainTermination};
