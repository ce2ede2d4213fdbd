//! Mail-formatted warning notice
//!
//! The output is a complete message (headers, blank line, body) suitable for
//! piping into a mail transport.

use crate::cert_expiry::WarningKind;
use crate::CertificateValidity;
use chrono::Local;
use std::path::Path;

const BANNER: &str = " ################# SSL/TLS Certificate Warning ################\n\n";
const FOOTER: &str = "\n ##############################################################\n                                      Generated by certwatch(1)\n\n";

/// Render the notice for `kind`, or `None` when there is nothing to warn about.
pub fn render(
    kind: WarningKind,
    validity: &CertificateValidity,
    path: &Path,
    address: &str,
) -> Option<String> {
    let condition = kind.condition()?;
    let hostname = validity.subject_common_name.as_str();

    let mut out = format!(
        "To: {}\nSubject: The certificate for {} {}\n\n",
        address, hostname, condition
    );
    out.push_str(BANNER);
    out.push_str(&format!(
        "  Certificate for hostname '{}', in file:\n\n     {}\n\n",
        hostname,
        path.display()
    ));

    if kind == WarningKind::NotYetValid {
        let until = validity
            .not_before
            .with_timezone(&Local)
            .format("%a %b %e %H:%M:%S %Y");
        out.push_str(&format!(
            "  The certificate is not valid until {}.\n\n  \
             Web browsers and other clients will not be able to correctly\n  \
             connect to this web site using SSL/TLS until the certificate\n  \
             becomes valid.\n",
            until
        ));
    } else {
        out.push_str(
            "  The certificate needs to be renewed.  Web browsers and \n  \
             other clients will not be able to correctly connect to this\n  \
             web site using SSL/TLS until the certificate is renewed.\n",
        );
    }

    out.push_str(FOOTER);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommonName;
    use chrono::{TimeZone, Utc};

    fn validity() -> CertificateValidity {
        CertificateValidity {
            not_before: Utc.with_ymd_and_hms(2031, 7, 4, 12, 0, 0).unwrap(),
            not_after: Utc.with_ymd_and_hms(2032, 7, 4, 12, 0, 0).unwrap(),
            subject_common_name: CommonName::new("mail.example.org").unwrap(),
        }
    }

    #[test]
    fn test_expiring_notice() {
        let text = render(
            WarningKind::ExpiresSoon(5),
            &validity(),
            Path::new("/etc/pki/tls/certs/mail.crt"),
            "hostmaster",
        )
        .unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("To: hostmaster"));
        assert_eq!(
            lines.next(),
            Some("Subject: The certificate for mail.example.org will expire in 5 days")
        );
        assert_eq!(lines.next(), Some(""));
        assert!(text.contains("Certificate for hostname 'mail.example.org', in file:"));
        assert!(text.contains("     /etc/pki/tls/certs/mail.crt\n"));
        assert!(text.contains("needs to be renewed"));
        assert!(text.contains("Generated by certwatch(1)"));
    }

    #[test]
    fn test_expiring_notice_full_text() {
        let text = render(
            WarningKind::Expired,
            &validity(),
            Path::new("mail.crt"),
            "root",
        )
        .unwrap();

        let expected = [
            "To: root\n",
            "Subject: The certificate for mail.example.org has expired\n",
            "\n",
            BANNER,
            "  Certificate for hostname 'mail.example.org', in file:\n\n",
            "     mail.crt\n\n",
            "  The certificate needs to be renewed.  Web browsers and \n",
            "  other clients will not be able to correctly connect to this\n",
            "  web site using SSL/TLS until the certificate is renewed.\n",
            FOOTER,
        ]
        .concat();
        assert_eq!(text, expected);
    }

    #[test]
    fn test_not_yet_valid_notice_names_start_date() {
        let text = render(
            WarningKind::NotYetValid,
            &validity(),
            Path::new("server.crt"),
            "root",
        )
        .unwrap();

        assert!(text.contains("Subject: The certificate for mail.example.org is not yet valid"));
        assert!(text.contains("The certificate is not valid until "));
        // local zone shifts the hour but not this far
        assert!(text.contains("2031"));
        assert!(!text.contains("needs to be renewed"));
    }

    #[test]
    fn test_no_notice_without_warning() {
        assert!(render(WarningKind::NoWarning, &validity(), Path::new("x.crt"), "root").is_none());
    }
}
