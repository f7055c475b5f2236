//! Issuer-chain walking.
//!
//! The walk follows issuer ids from a leaf up through the known CAs. It never
//! fails: an unknown issuer, a self-signed CA, or the depth bound each end the
//! walk with a [`ChainTermination`] describing why.

use crate::record::{CaRecord, Issued};
use certscope_core::config::ChainConfig;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Why a walk stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ChainTermination {
    /// Reached a self-signed CA
    SelfSigned,
    /// The referenced issuer is not in the CA list
    UnresolvedIssuer { issuer_id: String },
    /// Hit the depth bound without reaching a root
    DepthExceeded,
}

/// Ordered ancestors of a leaf, root first, ending with its direct issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateChain<'a> {
    pub links: Vec<&'a CaRecord>,
    pub termination: ChainTermination,
}

impl<'a> CertificateChain<'a> {
    /// True only when the walk ended at a self-signed root.
    pub fn is_complete(&self) -> bool {
        self.termination == ChainTermination::SelfSigned
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn ids(&self) -> Vec<&'a str> {
        self.links.iter().map(|ca| ca.id.as_str()).collect()
    }

    /// Topmost CA found.
    pub fn root(&self) -> Option<&'a CaRecord> {
        self.links.first().copied()
    }
}

/// Walks issuer references with a bounded number of hops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainResolver {
    max_depth: usize,
}

impl Default for ChainResolver {
    fn default() -> Self {
        Self::from_config(&ChainConfig::default())
    }
}

impl ChainResolver {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn from_config(config: &ChainConfig) -> Self {
        Self::new(config.max_depth)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Builds the chain of CAs above `leaf`.
    ///
    /// A self-signed leaf has an empty chain. Duplicate ids in `all_cas`
    /// resolve to the first occurrence.
    pub fn build_chain<'a, L>(&self, leaf: &L, all_cas: &'a [CaRecord]) -> CertificateChain<'a>
    where
        L: Issued + ?Sized,
    {
        if leaf.is_self_signed() {
            debug!("{} is self-signed, chain is empty", leaf.id());
            return CertificateChain {
                links: Vec::new(),
                termination: ChainTermination::SelfSigned,
            };
        }

        let mut by_id: HashMap<&str, &'a CaRecord> = HashMap::with_capacity(all_cas.len());
        for ca in all_cas {
            by_id.entry(ca.id.as_str()).or_insert(ca);
        }

        let mut links: Vec<&'a CaRecord> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut repeated = false;
        let mut next = leaf.issuer_id().map(|id| id.trim().to_string());
        let mut termination = ChainTermination::DepthExceeded;

        for hop in 0..self.max_depth {
            let Some(issuer_id) = next.take() else {
                termination = ChainTermination::SelfSigned;
                break;
            };
            let Some(&ca) = by_id.get(issuer_id.as_str()) else {
                debug!("Issuer {} of hop {} is not a known CA", issuer_id, hop);
                termination = ChainTermination::UnresolvedIssuer { issuer_id };
                break;
            };

            debug!("Hop {}: {} ({})", hop, ca.id, ca.subject);
            if !seen.insert(ca.id.as_str()) {
                repeated = true;
            }
            links.push(ca);

            if ca.is_self_signed() {
                termination = ChainTermination::SelfSigned;
                break;
            }
            next = ca.issuer_id.as_deref().map(|id| id.trim().to_string());
        }

        match &termination {
            ChainTermination::DepthExceeded if repeated => warn!(
                "Chain for {} stopped after {} hops; probable issuer cycle",
                leaf.id(),
                self.max_depth
            ),
            ChainTermination::DepthExceeded => warn!(
                "Chain for {} exceeds the maximum depth of {}",
                leaf.id(),
                self.max_depth
            ),
            ChainTermination::UnresolvedIssuer { issuer_id } => warn!(
                "Chain for {} is truncated: issuer {} not found",
                leaf.id(),
                issuer_id
            ),
            ChainTermination::SelfSigned => {}
        }

        links.reverse();
        CertificateChain { links, termination }
    }

    /// PEM bundle of `leaf` followed by its issuers, direct issuer first and
    /// root last, one blank line between blocks.
    pub fn build_chain_pem<L>(&self, leaf: &L, all_cas: &[CaRecord]) -> String
    where
        L: Issued + ?Sized,
    {
        let chain = self.build_chain(leaf, all_cas);
        let mut blocks = vec![leaf.pem().trim()];
        blocks.extend(chain.links.iter().rev().map(|ca| ca.pem.trim()));

        let mut bundle = blocks.join("\n\n");
        bundle.push('\n');
        bundle
    }
}

/// Builds a chain with the default depth bound.
pub fn build_chain<'a, L>(leaf: &L, all_cas: &'a [CaRecord]) -> CertificateChain<'a>
where
    L: Issued + ?Sized,
{
    ChainResolver::default().build_chain(leaf, all_cas)
}

/// Builds a PEM bundle with the default depth bound.
pub fn build_chain_pem<L>(leaf: &L, all_cas: &[CaRecord]) -> String
where
    L: Issued + ?Sized,
{
    ChainResolver::default().build_chain_pem(leaf, all_cas)
}
