//! OBJECT IDENTIFIER content decoding and encoding.

use certscope_core::DecodeError;

/// Decodes OID content octets to dotted-decimal form.
///
/// `offset` is the absolute position of the first content byte and is only
/// used for error reporting.
pub fn decode_oid(content: &[u8], offset: usize) -> Result<String, DecodeError> {
    if content.is_empty() {
        return Err(DecodeError::invalid_content(
            offset,
            "OBJECT IDENTIFIER has no content",
        ));
    }

    let mut subids: Vec<u128> = Vec::new();
    let mut value: u128 = 0;
    let mut pending = false;
    for (i, &byte) in content.iter().enumerate() {
        if value > (u128::MAX >> 7) {
            return Err(DecodeError::invalid_content(
                offset + i,
                "OID arc does not fit in 128 bits",
            ));
        }
        value = (value << 7) | u128::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            subids.push(value);
            value = 0;
            pending = false;
        } else {
            pending = true;
        }
    }
    if pending {
        return Err(DecodeError::invalid_content(
            offset + content.len() - 1,
            "OID ends inside a continued arc",
        ));
    }

    let first = subids[0];
    let (arc1, arc2) = match first {
        0..=39 => (0, first),
        40..=79 => (1, first - 40),
        _ => (2, first - 80),
    };

    let mut dotted = format!("{}.{}", arc1, arc2);
    for arc in &subids[1..] {
        dotted.push('.');
        dotted.push_str(&arc.to_string());
    }
    Ok(dotted)
}

/// Encodes a dotted-decimal OID to content octets.
///
/// Returns `None` for strings that are not a valid OID: fewer than two arcs,
/// a first arc above 2, or a second arc of 40 or more under arcs 0 and 1.
pub fn encode_oid(dotted: &str) -> Option<Vec<u8>> {
    let arcs: Vec<u128> = dotted
        .split('.')
        .map(|part| part.parse::<u128>().ok())
        .collect::<Option<_>>()?;

    if arcs.len() < 2 || arcs[0] > 2 || (arcs[0] < 2 && arcs[1] >= 40) {
        return None;
    }

    let first = arcs[0].checked_mul(40)?.checked_add(arcs[1])?;
    let mut out = Vec::new();
    push_base128(&mut out, first);
    for &arc in &arcs[2..] {
        push_base128(&mut out, arc);
    }
    Some(out)
}

fn push_base128(out: &mut Vec<u8>, mut value: u128) {
    let mut groups = vec![(value & 0x7F) as u8];
    value >>= 7;
    while value > 0 {
        groups.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
    groups.reverse();
    out.extend_from_slice(&groups);
}

/// Well-known names, shown next to the dotted form in rendered views.
const KNOWN_OIDS: &[(&str, &str)] = &[
    // Algorithms
    ("1.2.840.113549.1.1.1", "rsaEncryption"),
    ("1.2.840.113549.1.1.5", "sha1WithRSAEncryption"),
    ("1.2.840.113549.1.1.10", "rsassa-pss"),
    ("1.2.840.113549.1.1.11", "sha256WithRSAEncryption"),
    ("1.2.840.113549.1.1.12", "sha384WithRSAEncryption"),
    ("1.2.840.113549.1.1.13", "sha512WithRSAEncryption"),
    ("1.2.840.10045.2.1", "ecPublicKey"),
    ("1.2.840.10045.3.1.7", "prime256v1"),
    ("1.3.132.0.34", "secp384r1"),
    ("1.3.132.0.35", "secp521r1"),
    ("1.2.840.10045.4.3.2", "ecdsa-with-SHA256"),
    ("1.2.840.10045.4.3.3", "ecdsa-with-SHA384"),
    ("1.2.840.10045.4.3.4", "ecdsa-with-SHA512"),
    ("1.3.101.112", "Ed25519"),
    ("1.3.101.113", "Ed448"),
    ("2.16.840.1.101.3.4.2.1", "sha256"),
    ("2.16.840.1.101.3.4.2.2", "sha384"),
    ("2.16.840.1.101.3.4.2.3", "sha512"),
    // Attribute types
    ("2.5.4.3", "commonName"),
    ("2.5.4.5", "serialNumber"),
    ("2.5.4.6", "countryName"),
    ("2.5.4.7", "localityName"),
    ("2.5.4.8", "stateOrProvinceName"),
    ("2.5.4.10", "organizationName"),
    ("2.5.4.11", "organizationalUnitName"),
    ("1.2.840.113549.1.9.1", "emailAddress"),
    // Extensions
    ("2.5.29.14", "subjectKeyIdentifier"),
    ("2.5.29.15", "keyUsage"),
    ("2.5.29.17", "subjectAltName"),
    ("2.5.29.19", "basicConstraints"),
    ("2.5.29.31", "cRLDistributionPoints"),
    ("2.5.29.32", "certificatePolicies"),
    ("2.5.29.35", "authorityKeyIdentifier"),
    ("2.5.29.37", "extKeyUsage"),
    ("1.3.6.1.5.5.7.1.1", "authorityInfoAccess"),
    ("1.3.6.1.5.5.7.3.1", "serverAuth"),
    ("1.3.6.1.5.5.7.3.2", "clientAuth"),
    ("1.3.6.1.5.5.7.48.1", "ocsp"),
    ("1.3.6.1.5.5.7.48.2", "caIssuers"),
    // PKCS#7 / PKCS#9
    ("1.2.840.113549.1.7.1", "data"),
    ("1.2.840.113549.1.7.2", "signedData"),
    ("1.2.840.113549.1.9.3", "contentType"),
    ("1.2.840.113549.1.9.4", "messageDigest"),
    ("1.2.840.113549.1.9.5", "signingTime"),
    ("1.2.840.113549.1.9.14", "extensionRequest"),
];

/// Looks up the registered name of a dotted OID.
pub fn oid_name(dotted: &str) -> Option<&'static str> {
    KNOWN_OIDS
        .iter()
        .find(|(oid, _)| *oid == dotted)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use certscope_core::DecodeErrorKind;

    const SHA256_RSA: &[u8] = &[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B];

    #[test]
    fn test_decode_sha256_with_rsa() {
        let dotted = decode_oid(SHA256_RSA, 0).unwrap();
        assert_eq!(dotted, "1.2.840.113549.1.1.11");
        assert_eq!(oid_name(&dotted), Some("sha256WithRSAEncryption"));
    }

    #[test]
    fn test_first_arc_split() {
        assert_eq!(decode_oid(&[0x06], 0).unwrap(), "0.6");
        assert_eq!(decode_oid(&[0x55, 0x04, 0x03], 0).unwrap(), "2.5.4.3");
        // 2.999 encodes its first subidentifier across two bytes
        assert_eq!(decode_oid(&[0x88, 0x37], 0).unwrap(), "2.999");
    }

    #[test]
    fn test_encode_matches_decode() {
        for bytes in [SHA256_RSA, &[0x55, 0x1D, 0x13][..], &[0x88, 0x37, 0x03][..]] {
            let dotted = decode_oid(bytes, 0).unwrap();
            assert_eq!(encode_oid(&dotted).as_deref(), Some(bytes));
        }
    }

    #[test]
    fn test_encode_rejects_invalid() {
        assert!(encode_oid("1").is_none());
        assert!(encode_oid("3.1").is_none());
        assert!(encode_oid("1.40").is_none());
        assert!(encode_oid("1.2.x").is_none());
        assert!(encode_oid("").is_none());
    }

    #[test]
    fn test_truncated_arc() {
        let err = decode_oid(&[0x2A, 0x86], 10).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidContent);
        assert_eq!(err.offset, 11);
    }

    #[test]
    fn test_empty_oid() {
        let err = decode_oid(&[], 4).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidContent);
        assert_eq!(err.offset, 4);
    }
}
