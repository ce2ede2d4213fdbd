//! Strict decoding of ASN.1 `UTCTime` and `GeneralizedTime` values
//!
//! Certificate validity times are fixed-width digit strings. Both encodings
//! are read as UTC; no local offset is ever applied.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use thiserror::Error;
use x509_parser::der_parser::asn1_rs::Tag;

/// Why a time value was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeDecodeError {
    /// Not one of the accepted fixed widths.
    #[error("unexpected time length {0}")]
    Length(usize),
    /// A digit was required at `position`.
    #[error("non-digit character at position {position}")]
    NonDigit {
        /// Byte offset into the time text.
        position: usize,
    },
    /// The digits name a date or time that does not exist.
    #[error("calendar field out of range")]
    OutOfRange,
}

/// A raw time value as found in a certificate's validity sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asn1Time<'a> {
    /// Two-digit year form.
    Utc(&'a [u8]),
    /// Four-digit year form.
    Generalized(&'a [u8]),
}

impl<'a> Asn1Time<'a> {
    /// Wrap the body of a DER element, if its tag is a time type.
    pub fn from_tagged(tag: Tag, body: &'a [u8]) -> Option<Self> {
        if tag == Tag::UtcTime {
            Some(Asn1Time::Utc(body))
        } else if tag == Tag::GeneralizedTime {
            Some(Asn1Time::Generalized(body))
        } else {
            None
        }
    }

    /// Decode into an absolute UTC timestamp.
    ///
    /// # Errors
    ///
    /// Fails if the text is not exactly one of the accepted fixed-width
    /// forms or names a date that does not exist.
    pub fn decode(&self) -> Result<DateTime<Utc>, TimeDecodeError> {
        match self {
            Asn1Time::Utc(text) => decode_utc_time(text),
            Asn1Time::Generalized(text) => decode_generalized_time(text),
        }
    }
}

/// Decode `YYMMDDHHMM[SS][Z]`. Years below 70 belong to the 2000s.
///
/// # Errors
///
/// See [`Asn1Time::decode`].
pub fn decode_utc_time(text: &[u8]) -> Result<DateTime<Utc>, TimeDecodeError> {
    let digits = strip_zulu(text);
    if digits.len() != 10 && digits.len() != 12 {
        return Err(TimeDecodeError::Length(text.len()));
    }
    check_digits(digits)?;

    let yy = two_digits(digits, 0);
    let year = if yy < 70 { 2000 + yy } else { 1900 + yy };
    calendar(year, &digits[2..])
}

/// Decode `YYYYMMDDHHMM[SS][Z]`.
///
/// # Errors
///
/// See [`Asn1Time::decode`].
pub fn decode_generalized_time(text: &[u8]) -> Result<DateTime<Utc>, TimeDecodeError> {
    let digits = strip_zulu(text);
    if digits.len() != 12 && digits.len() != 14 {
        return Err(TimeDecodeError::Length(text.len()));
    }
    check_digits(digits)?;

    let year = two_digits(digits, 0) * 100 + two_digits(digits, 2);
    calendar(year, &digits[4..])
}

fn strip_zulu(text: &[u8]) -> &[u8] {
    match text.split_last() {
        Some((b'Z', head)) => head,
        _ => text,
    }
}

fn check_digits(digits: &[u8]) -> Result<(), TimeDecodeError> {
    match digits.iter().position(|b| !b.is_ascii_digit()) {
        Some(position) => Err(TimeDecodeError::NonDigit { position }),
        None => Ok(()),
    }
}

fn two_digits(digits: &[u8], at: usize) -> u32 {
    u32::from(digits[at] - b'0') * 10 + u32::from(digits[at + 1] - b'0')
}

// `rest` is MMDDHHMM with optional SS, already checked to be digits.
fn calendar(year: u32, rest: &[u8]) -> Result<DateTime<Utc>, TimeDecodeError> {
    let month = two_digits(rest, 0);
    let day = two_digits(rest, 2);
    let hour = two_digits(rest, 4);
    let minute = two_digits(rest, 6);
    let second = if rest.len() == 10 { two_digits(rest, 8) } else { 0 };

    let year = i32::try_from(year).map_err(|_| TimeDecodeError::OutOfRange)?;
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or(TimeDecodeError::OutOfRange)?;

    Ok(Utc.from_utc_datetime(&naive))
}
