//! Core shared types and identifiers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{SharedError, SharedResult};

/// Reserved delimiter joining the four composite key fields
pub const COMPOSITE_DELIMITER: char = '|';

/// Date format used by every signature date field (UTC calendar date)
pub const SIGNATURE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Number of hex characters in a flight identifier (8 digest bytes)
pub const FLIGHT_IDENTIFIER_LEN: usize = 16;

/// Parse a `DD/MM/YYYY` signature date
pub fn parse_signature_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), SIGNATURE_DATE_FORMAT).ok()
}

/// Raw flight occurrence as seen by one of the cooperating processes
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightSignature {
    pub date: String,
    pub flight_number: String,
    pub from: String,
    pub to: String,
}

impl FlightSignature {
    pub fn new(
        date: impl Into<String>,
        flight_number: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            flight_number: flight_number.into(),
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Signature after flight number and airport canonicalization
///
/// None of the fields contain [`COMPOSITE_DELIMITER`]; the normalizer
/// guarantees it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedSignature {
    pub date: String,
    pub flight_number: String,
    pub from: String,
    pub to: String,
}

impl NormalizedSignature {
    /// Join the four fields into the composite lookup key
    pub fn composite_key(&self) -> String {
        [
            self.date.as_str(),
            self.flight_number.as_str(),
            self.from.as_str(),
            self.to.as_str(),
        ]
        .join(&COMPOSITE_DELIMITER.to_string())
    }

    /// Split a stored composite key back into its fields
    ///
    /// Returns `None` unless there are exactly four fields.
    pub fn from_composite(composite: &str) -> Option<Self> {
        let mut parts = composite.split(COMPOSITE_DELIMITER);
        let date = parts.next()?;
        let flight_number = parts.next()?;
        let from = parts.next()?;
        let to = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            date: date.to_string(),
            flight_number: flight_number.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_signature_date(&self.date)
    }
}

/// Truncated SHA-256 identifier naming one flight occurrence
///
/// Deserialization goes through [`FlightIdentifier::parse`], so payloads read
/// back from storage hold 16 lowercase hex characters or fail to load.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FlightIdentifier(String);

impl FlightIdentifier {
    /// Encode truncated digest bytes as lowercase hex
    pub fn from_bytes(bytes: [u8; FLIGHT_IDENTIFIER_LEN / 2]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Validate a 16 character lowercase hex string
    pub fn parse(input: &str) -> SharedResult<Self> {
        let valid = input.len() == FLIGHT_IDENTIFIER_LEN
            && input
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        if !valid {
            return Err(SharedError::InvalidIdentifier {
                input: input.to_string(),
            });
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FlightIdentifier {
    type Error = SharedError;

    fn try_from(value: String) -> SharedResult<Self> {
        Self::parse(&value)
    }
}

impl From<FlightIdentifier> for String {
    fn from(id: FlightIdentifier) -> Self {
        id.0
    }
}

impl fmt::Display for FlightIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier handed out by the roster system
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalUid(String);

impl ExternalUid {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two cooperating processes sharing one reconciliation table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessRole {
    Roster,
    Logbook,
}

impl ProcessRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "roster" => Some(ProcessRole::Roster),
            "logbook" => Some(ProcessRole::Logbook),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessRole::Roster => "roster",
            ProcessRole::Logbook => "logbook",
        }
    }
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
