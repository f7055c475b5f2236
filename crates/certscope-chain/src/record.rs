//! CA and certificate records consumed by the chain resolver.

use serde::{Deserialize, Serialize};

/// Issuer value that marks a record as its own issuer.
pub const SELF_SIGNED_MARKER: &str = "self-signed";

/// Lifecycle status of a CA as reported by the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaStatus {
    #[default]
    #[serde(alias = "ACTIVE", alias = "Active")]
    Active,
    #[serde(alias = "EXPIRED", alias = "Expired")]
    Expired,
    #[serde(alias = "REVOKED", alias = "Revoked")]
    Revoked,
}

/// A certificate authority known to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaRecord {
    pub id: String,
    pub subject: String,
    /// Id of the issuing CA; absent for roots
    #[serde(default, alias = "issuerId")]
    pub issuer_id: Option<String>,
    pub pem: String,
    #[serde(default)]
    pub status: CaStatus,
    /// Reference to the crypto engine holding the CA key
    #[serde(default, alias = "cryptoEngine")]
    pub crypto_engine: Option<String>,
}

impl CaRecord {
    pub fn new(id: impl Into<String>, subject: impl Into<String>, pem: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            issuer_id: None,
            pem: pem.into(),
            status: CaStatus::Active,
            crypto_engine: None,
        }
    }

    pub fn with_issuer(mut self, issuer_id: impl Into<String>) -> Self {
        self.issuer_id = Some(issuer_id.into());
        self
    }

    pub fn with_status(mut self, status: CaStatus) -> Self {
        self.status = status;
        self
    }
}

/// An end-entity certificate issued by one of the CAs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub id: String,
    pub subject: String,
    #[serde(default, alias = "issuerId")]
    pub issuer_id: Option<String>,
    pub pem: String,
}

/// Anything with an issuer reference that a chain can be built from.
pub trait Issued {
    fn id(&self) -> &str;

    fn issuer_id(&self) -> Option<&str>;

    fn pem(&self) -> &str;

    /// True when the issuer is missing, empty, the record itself, or the
    /// self-signed marker.
    fn is_self_signed(&self) -> bool {
        match self.issuer_id().map(str::trim) {
            None => true,
            Some(issuer) => {
                issuer.is_empty()
                    || issuer == self.id()
                    || issuer.eq_ignore_ascii_case(SELF_SIGNED_MARKER)
            }
        }
    }
}

impl Issued for CaRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn issuer_id(&self) -> Option<&str> {
        self.issuer_id.as_deref()
    }

    fn pem(&self) -> &str {
        &self.pem
    }
}

impl Issued for CertificateRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn issuer_id(&self) -> Option<&str> {
        self.issuer_id.as_deref()
    }

    fn pem(&self) -> &str {
        &self.pem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_signed_detection() {
        let root = CaRecord::new("root", "CN=Root", "");
        assert!(root.is_self_signed());

        assert!(CaRecord::new("a", "CN=A", "").with_issuer("a").is_self_signed());
        assert!(CaRecord::new("a", "CN=A", "").with_issuer("  ").is_self_signed());
        assert!(CaRecord::new("a", "CN=A", "")
            .with_issuer("Self-Signed")
            .is_self_signed());
        assert!(!CaRecord::new("a", "CN=A", "").with_issuer("root").is_self_signed());
    }

    #[test]
    fn test_deserialize_dashboard_export() {
        let json = r#"{
            "id": "int-1",
            "subject": "CN=Intermediate",
            "issuerId": "root-1",
            "pem": "-----BEGIN CERTIFICATE-----",
            "status": "REVOKED",
            "cryptoEngine": "hsm-01"
        }"#;
        let record: CaRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.issuer_id.as_deref(), Some("root-1"));
        assert_eq!(record.status, CaStatus::Revoked);
        assert_eq!(record.crypto_engine.as_deref(), Some("hsm-01"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let json = r#"{"id": "root", "subject": "CN=Root", "pem": ""}"#;
        let record: CaRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, CaStatus::Active);
        assert!(record.issuer_id.is_none());
        assert!(record.is_self_signed());
    }

    #[test]
    fn test_certificate_record_is_issued() {
        let leaf = CertificateRecord {
            id: "leaf".to_string(),
            subject: "CN=leaf".to_string(),
            issuer_id: Some("int".to_string()),
            pem: "PEM".to_string(),
        };
        assert!(!leaf.is_self_signed());
        assert_eq!(Issued::pem(&leaf), "PEM");
    }
}
