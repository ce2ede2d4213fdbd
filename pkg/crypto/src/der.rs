//! Reading the TBSCertificate fields certwatch needs
//!
//! Walks Certificate → TBSCertificate → Validity, Subject with asn1-rs so
//! that the validity times reach [`Asn1Time`] as raw text and are never
//! decoded by anything else first.

use crate::asn1_time::Asn1Time;
use crate::LoadError;
use x509_parser::der_parser::asn1_rs::{Any, Class, FromDer, Tag};
use x509_parser::x509::X509Name;

/// Raw validity times and the parsed subject of a certificate.
#[derive(Debug)]
pub struct TbsFields<'a> {
    /// Start of the validity window, undecoded.
    pub not_before: Asn1Time<'a>,
    /// End of the validity window, undecoded.
    pub not_after: Asn1Time<'a>,
    /// Subject distinguished name.
    pub subject: X509Name<'a>,
}

fn next_element<'a>(input: &'a [u8], what: &str) -> Result<(&'a [u8], Any<'a>), LoadError> {
    Any::from_der(input).map_err(|e| LoadError::Parse(format!("{}: {}", what, e)))
}

fn expect<'a>(input: &'a [u8], tag: Tag, what: &str) -> Result<(&'a [u8], Any<'a>), LoadError> {
    let (rest, element) = next_element(input, what)?;
    if element.header.class() != Class::Universal || element.header.tag() != tag {
        return Err(LoadError::Parse(format!("expected {}", what)));
    }
    Ok((rest, element))
}

/// Locate `notBefore`, `notAfter` and the subject inside a DER certificate.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] when the structure is not a certificate,
/// and [`LoadError::MissingField`] when the validity sequence or one of its
/// times is absent.
pub fn read_tbs(cert_der: &[u8]) -> Result<TbsFields<'_>, LoadError> {
    let (_, certificate) = expect(cert_der, Tag::Sequence, "certificate sequence")?;
    let (_, tbs) = expect(certificate.data, Tag::Sequence, "tbsCertificate")?;

    let mut fields = tbs.data;
    let (rest, first) = next_element(fields, "tbsCertificate")?;
    // [0] EXPLICIT version
    if first.header.class() == Class::ContextSpecific && first.header.tag() == Tag(0) {
        fields = rest;
    }
    let (fields, _) = expect(fields, Tag::Integer, "serial number")?;
    let (fields, _) = expect(fields, Tag::Sequence, "signature algorithm")?;
    let (fields, _) = expect(fields, Tag::Sequence, "issuer")?;

    let (fields, validity) = match Any::from_der(fields) {
        Ok((rest, element)) if element.header.tag() == Tag::Sequence => (rest, element),
        _ => return Err(LoadError::MissingField("validity")),
    };

    let (rest, not_before) = read_time(validity.data, "notBefore")?;
    let (_, not_after) = read_time(rest, "notAfter")?;

    let (_, subject) = X509Name::from_der(fields)
        .map_err(|e| LoadError::Parse(format!("subject: {}", e)))?;

    Ok(TbsFields {
        not_before,
        not_after,
        subject,
    })
}

fn read_time<'a>(
    input: &'a [u8],
    field: &'static str,
) -> Result<(&'a [u8], Asn1Time<'a>), LoadError> {
    let (rest, element) = Any::from_der(input).map_err(|_| LoadError::MissingField(field))?;
    if element.header.class() != Class::Universal {
        return Err(LoadError::MissingField(field));
    }
    let time = Asn1Time::from_tagged(element.header.tag(), element.data)
        .ok_or(LoadError::MissingField(field))?;
    Ok((rest, time))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tlv(tag: u8, body: &[u8]) -> Vec<u8> {
        let mut out = vec![tag];
        if body.len() < 0x80 {
            out.push(body.len() as u8);
        } else {
            out.push(0x82);
            out.extend_from_slice(&(body.len() as u16).to_be_bytes());
        }
        out.extend_from_slice(body);
        out
    }

    fn subject(cn: &str) -> Vec<u8> {
        let mut attribute = vec![0x06, 0x03, 0x55, 0x04, 0x03];
        attribute.extend(tlv(0x0c, cn.as_bytes()));
        tlv(0x30, &tlv(0x31, &tlv(0x30, &attribute)))
    }

    fn certificate(validity: &[u8], padding: usize) -> Vec<u8> {
        let mut tbs = tlv(0xa0, &tlv(0x02, &[2]));
        tbs.extend(tlv(0x02, &[1]));
        tbs.extend(tlv(0x30, &[]));
        tbs.extend(tlv(0x30, &[]));
        tbs.extend_from_slice(validity);
        tbs.extend(subject("www.example.com"));
        tbs.extend(tlv(0x30, &vec![0u8; padding]));
        tlv(0x30, &tlv(0x30, &tbs))
    }

    #[test]
    fn test_read_tbs() {
        let mut times = tlv(0x17, b"230101000000Z");
        times.extend(tlv(0x18, b"20550101000000Z"));
        let der = certificate(&tlv(0x30, &times), 0);

        let tbs = read_tbs(&der).unwrap();
        assert_eq!(tbs.not_before, Asn1Time::Utc(b"230101000000Z"));
        assert_eq!(tbs.not_after, Asn1Time::Generalized(b"20550101000000Z"));
        let cn = tbs.subject.iter_common_name().next().unwrap();
        assert_eq!(cn.as_str().unwrap(), "www.example.com");
    }

    #[test]
    fn test_times_are_not_validated_here() {
        let mut times = tlv(0x17, b"300101000000");
        times.extend(tlv(0x17, b"31010100 0000Z"));
        let der = certificate(&tlv(0x30, &times), 200);

        assert!(der.len() > 0x80);
        let tbs = read_tbs(&der).unwrap();
        assert_eq!(tbs.not_before, Asn1Time::Utc(b"300101000000"));
        assert_eq!(tbs.not_after, Asn1Time::Utc(b"31010100 0000Z"));
    }

    #[test]
    fn test_missing_not_after() {
        let der = certificate(&tlv(0x30, &tlv(0x17, b"230101000000Z")), 0);
        assert!(matches!(
            read_tbs(&der),
            Err(LoadError::MissingField("notAfter"))
        ));
    }

    #[test]
    fn test_non_time_element() {
        let mut times = tlv(0x04, b"230101000000Z");
        times.extend(tlv(0x17, b"330101000000Z"));
        let der = certificate(&tlv(0x30, &times), 0);
        assert!(matches!(
            read_tbs(&der),
            Err(LoadError::MissingField("notBefore"))
        ));
    }

    #[test]
    fn test_truncated_input() {
        assert!(matches!(
            read_tbs(&[0x30, 0x10, 0x30]),
            Err(LoadError::Parse(_))
        ));
        assert!(matches!(read_tbs(b"hello"), Err(LoadError::Parse(_))));
    }
}
