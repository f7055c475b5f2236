//! Loading CA records from certificates and CA list exports.
//!
//! Supports PEM certificates, PEM bundles, and JSON CA lists exported by the
//! dashboard.

use crate::record::{CaRecord, CaStatus, CertificateRecord};
use base64::prelude::*;
use certscope_core::error::CertificateError;
use certscope_core::Result;
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, info, warn};
use x509_parser::pem::Pem;
use x509_parser::prelude::*;

/// Fields of an X.509 certificate relevant to chain building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSummary {
    /// Subject distinguished name, e.g. `CN=Example Root`
    pub subject: String,
    /// Issuer distinguished name
    pub issuer: String,
    pub serial: String,
    pub not_before: Option<DateTime<Utc>>,
    pub not_after: Option<DateTime<Utc>>,
    pub is_ca: bool,
    /// Whether the validity window covers the current time
    pub currently_valid: bool,
}

/// Parses DER bytes of one certificate.
pub fn summarize_der(der: &[u8]) -> Result<CertificateSummary> {
    let (_, cert) = X509Certificate::from_der(der)
        .map_err(|e| CertificateError::parse_failed(e.to_string()))?;

    let validity = cert.validity();
    Ok(CertificateSummary {
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        serial: cert.raw_serial_as_string(),
        not_before: DateTime::from_timestamp(validity.not_before.timestamp(), 0),
        not_after: DateTime::from_timestamp(validity.not_after.timestamp(), 0),
        is_ca: cert.is_ca(),
        currently_valid: validity.is_valid(),
    })
}

/// Parses the first certificate in PEM text.
pub fn summarize_pem(pem: &str) -> Result<CertificateSummary> {
    let (_, block) = x509_parser::pem::parse_x509_pem(pem.as_bytes())
        .map_err(|e| CertificateError::invalid_pem(e.to_string()))?;
    if block.label != "CERTIFICATE" && block.label != "TRUSTED CERTIFICATE" {
        return Err(CertificateError::invalid_pem(format!(
            "expected a CERTIFICATE block, found {}",
            block.label
        ))
        .into());
    }
    summarize_der(&block.contents)
}

impl CaRecord {
    /// Builds a CA record from a PEM certificate.
    ///
    /// The subject DN becomes the id and the issuer DN the issuer id, so a
    /// self-signed certificate is its own issuer. Status is `Expired` outside
    /// the validity window.
    pub fn from_certificate_pem(pem: &str) -> Result<Self> {
        let summary = summarize_pem(pem)?;
        let status = if summary.currently_valid {
            CaStatus::Active
        } else {
            CaStatus::Expired
        };
        if !summary.is_ca {
            debug!("{} is not marked as a CA", summary.subject);
        }

        Ok(Self {
            id: summary.subject.clone(),
            subject: summary.subject,
            issuer_id: Some(summary.issuer),
            pem: pem.trim().to_string(),
            status,
            crypto_engine: None,
        })
    }
}

impl CertificateRecord {
    /// Builds a leaf record from a PEM certificate, keyed by subject DN.
    pub fn from_certificate_pem(pem: &str) -> Result<Self> {
        let summary = summarize_pem(pem)?;
        Ok(Self {
            id: summary.subject.clone(),
            subject: summary.subject,
            issuer_id: Some(summary.issuer),
            pem: pem.trim().to_string(),
        })
    }
}

/// Encodes DER as a PEM block with 64-column lines.
pub fn encode_pem(label: &str, der: &[u8]) -> String {
    let body = BASE64_STANDARD.encode(der);
    let mut out = format!("-----BEGIN {}-----\n", label);
    for line in body.as_bytes().chunks(64) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str(&format!("-----END {}-----\n", label));
    out
}

/// Parses every certificate in a PEM bundle into CA records.
pub fn parse_pem_bundle(text: &str, source_name: &str) -> Result<Vec<CaRecord>> {
    let mut records = Vec::new();
    for block in Pem::iter_from_buffer(text.as_bytes()) {
        let block = match block {
            Ok(block) => block,
            Err(e) if !records.is_empty() => {
                warn!("Ignoring trailing data in {}: {}", source_name, e);
                break;
            }
            Err(e) => return Err(CertificateError::invalid_pem(e.to_string()).into()),
        };
        if block.label != "CERTIFICATE" && block.label != "TRUSTED CERTIFICATE" {
            debug!("Skipping {} block in {}", block.label, source_name);
            continue;
        }
        records.push(CaRecord::from_certificate_pem(&encode_pem(
            "CERTIFICATE",
            &block.contents,
        ))?);
    }

    if records.is_empty() {
        return Err(CertificateError::NoCertificates {
            source_name: source_name.to_string(),
        }
        .into());
    }
    Ok(records)
}

/// Loads CA records from a JSON CA list or a PEM bundle.
pub fn load_ca_records<P: AsRef<Path>>(path: P) -> Result<Vec<CaRecord>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let name = path.display().to_string();

    let records = if text.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<CaRecord>>(&text).map_err(|e| {
            CertificateError::InvalidRecordList {
                path: name.clone(),
                reason: e.to_string(),
            }
        })?
    } else {
        parse_pem_bundle(&text, &name)?
    };

    info!("Loaded {} CA record(s) from {}", records.len(), name);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pem_wraps_lines() {
        let pem = encode_pem("CERTIFICATE", &[0u8; 60]);
        let lines: Vec<&str> = pem.lines().collect();
        assert_eq!(lines[0], "-----BEGIN CERTIFICATE-----");
        assert_eq!(lines[1].len(), 64);
        assert_eq!(lines[2].len(), 16);
        assert_eq!(lines[3], "-----END CERTIFICATE-----");
    }

    #[test]
    fn test_invalid_pem() {
        assert!(CaRecord::from_certificate_pem("not a certificate").is_err());
    }

    #[test]
    fn test_wrong_block_label() {
        let pem = encode_pem("PUBLIC KEY", &[0x30, 0x00]);
        assert!(summarize_pem(&pem).is_err());
    }

    #[test]
    fn test_garbage_der() {
        let pem = encode_pem("CERTIFICATE", &[0x30, 0x03, 0x02, 0x01, 0x05]);
        assert!(CaRecord::from_certificate_pem(&pem).is_err());
    }

    #[test]
    fn test_bundle_without_certificates() {
        let err = parse_pem_bundle(&encode_pem("PUBLIC KEY", &[0x30, 0x00]), "keys.pem")
            .unwrap_err();
        assert!(err.to_string().contains("No certificates found in keys.pem"));
    }

    #[test]
    fn test_invalid_json_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cas.json");
        std::fs::write(&path, "[{\"id\": 1}]").unwrap();
        let err = load_ca_records(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid CA record list"));
    }
}
