//! Certificate loading and expiry checks for certwatch
//!
//! [`load`] extracts the validity window and subject common name from a PEM
//! certificate, [`cert_expiry::evaluate`] classifies it, and
//! [`check_certificate`] runs the whole check for a single file.

#![warn(missing_docs)]

use certwatch_config::WatchConfig;
use chrono::{DateTime, Utc};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub mod asn1_time;
pub mod cert_expiry;
pub mod der;
pub mod notice;

pub use asn1_time::{Asn1Time, TimeDecodeError};
pub use cert_expiry::{evaluate, WarningDecision, WarningKind};

/// Longest accepted subject common name, in bytes.
pub const MAX_COMMON_NAME_LEN: usize = 127;

/// Subjects of the self-signed certificates installed by default.
const UNEVALUABLE_SUBJECTS: [&str; 2] = ["localhost", "localhost.localdomain"];

/// Why a certificate could not be checked.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file does not exist.
    #[error("certificate file not found")]
    NotFound,
    /// The file exists but could not be read.
    #[error("IO error: {0}")]
    Io(#[source] io::Error),
    /// Not a PEM encoded X.509 certificate.
    #[error("failed to parse certificate: {0}")]
    Parse(String),
    /// A validity time or the subject common name is absent.
    #[error("certificate has no {0}")]
    MissingField(&'static str),
    /// A validity time failed strict decoding.
    #[error("malformed validity time: {0}")]
    MalformedTime(#[from] TimeDecodeError),
    /// The common name is longer than [`MAX_COMMON_NAME_LEN`].
    #[error("common name is {0} bytes, limit is {max}", max = MAX_COMMON_NAME_LEN)]
    NameTooLong(usize),
    /// A default self-signed certificate that is never warned about.
    #[error("certificate for '{0}' is not checked")]
    UnevaluableSubject(String),
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound,
            _ => LoadError::Io(e),
        }
    }
}

/// A subject common name of bounded length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonName(String);

impl CommonName {
    /// # Errors
    ///
    /// Rejects empty names and names over [`MAX_COMMON_NAME_LEN`] bytes.
    pub fn new(name: impl Into<String>) -> Result<Self, LoadError> {
        let name = name.into();
        if name.is_empty() {
            return Err(LoadError::MissingField("commonName"));
        }
        if name.len() > MAX_COMMON_NAME_LEN {
            return Err(LoadError::NameTooLong(name.len()));
        }
        Ok(Self(name))
    }

    /// The name as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a check needs to know about a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateValidity {
    /// Start of the validity window.
    pub not_before: DateTime<Utc>,
    /// End of the validity window.
    pub not_after: DateTime<Utc>,
    /// First common name of the subject.
    pub subject_common_name: CommonName,
}

impl CertificateValidity {
    /// Refuse the auto-generated localhost certificates.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnevaluableSubject`] for those subjects.
    pub fn ensure_evaluable(&self) -> Result<(), LoadError> {
        let name = self.subject_common_name.as_str();
        if UNEVALUABLE_SUBJECTS.contains(&name) {
            return Err(LoadError::UnevaluableSubject(name.to_string()));
        }
        Ok(())
    }
}

/// Load the first certificate from a PEM file.
///
/// # Errors
///
/// Any failure to read, parse or extract the validity window and common
/// name is reported as a distinct [`LoadError`].
pub fn load(path: impl AsRef<Path>) -> Result<CertificateValidity, LoadError> {
    let data = fs::read(path)?;
    let der = rustls_pemfile::certs(&mut data.as_slice())
        .next()
        .ok_or_else(|| LoadError::Parse("no PEM certificate found".into()))?
        .map_err(|e| LoadError::Parse(format!("invalid PEM: {}", e)))?;

    from_der(der.as_ref())
}

/// Extract the validity window and common name from a DER certificate.
///
/// Only the fields up to the subject are read. The validity times are
/// decoded by [`Asn1Time::decode`] alone, so every form it accepts loads.
///
/// # Errors
///
/// See [`load`].
pub fn from_der(cert_der: &[u8]) -> Result<CertificateValidity, LoadError> {
    let tbs = der::read_tbs(cert_der)?;
    let not_before = tbs.not_before.decode()?;
    let not_after = tbs.not_after.decode()?;

    let common_name = tbs
        .subject
        .iter_common_name()
        .next()
        .ok_or(LoadError::MissingField("commonName"))?
        .as_str()
        .map_err(|e| LoadError::Parse(format!("unreadable common name: {}", e)))?;

    Ok(CertificateValidity {
        not_before,
        not_after,
        subject_common_name: CommonName::new(common_name)?,
    })
}

/// Run one complete check: load, filter, classify and (unless quiet)
/// render the notice.
///
/// # Errors
///
/// Every [`LoadError`], including an unevaluable subject. Callers treat all
/// of them the same way: no output, failure status.
pub fn check_certificate(
    path: impl AsRef<Path>,
    config: &WatchConfig,
    now: DateTime<Utc>,
) -> Result<WarningDecision, LoadError> {
    let path = path.as_ref();
    let validity = load(path).and_then(|validity| {
        validity.ensure_evaluable()?;
        Ok(validity)
    });
    let validity = match validity {
        Ok(validity) => validity,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Skipping certificate");
            return Err(e);
        }
    };

    let mut decision = evaluate(&validity, now, config.warn_period_days);
    debug!(
        path = %path.display(),
        subject = %validity.subject_common_name,
        not_after = %validity.not_after,
        decision = %decision.kind,
        "Certificate evaluated"
    );

    if !config.quiet {
        decision.message = notice::render(decision.kind, &validity, path, &config.address);
    }
    Ok(decision)
}
