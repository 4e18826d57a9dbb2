//! Deterministic flight key derivation
//!
//! Normalizes raw flight numbers, airport codes and dates into canonical form,
//! joins them into a composite key and hashes it into a short identifier. All
//! operations are total: malformed input degrades to the airline prefix rather
//! than erroring.

use sha2::{Digest, Sha256};
use shared::{
    FlightIdentifier, FlightSignature, NormalizedSignature, COMPOSITE_DELIMITER,
    FLIGHT_IDENTIFIER_LEN,
};

use crate::traits::AirportResolver;

/// Hash a composite key into a flight identifier (first 8 bytes of SHA-256)
pub fn derive_identifier(composite: &str) -> FlightIdentifier {
    let digest = Sha256::digest(composite.as_bytes());
    let mut truncated = [0u8; FLIGHT_IDENTIFIER_LEN / 2];
    truncated.copy_from_slice(&digest[..FLIGHT_IDENTIFIER_LEN / 2]);
    FlightIdentifier::from_bytes(truncated)
}

fn clean_alphanumeric(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase()
}

fn strip_delimiter(field: &str) -> String {
    field.chars().filter(|&c| c != COMPOSITE_DELIMITER).collect()
}

/// Builds composite keys and flight identifiers from raw signatures
pub struct KeyFactory<R: AirportResolver> {
    resolver: R,
}

impl<R: AirportResolver> KeyFactory<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Canonicalize a flight number to uppercase alphanumerics carrying `airline_prefix`
    ///
    /// - already prefixed: returned as-is
    /// - otherwise everything from the first digit onwards gets the prefix
    ///   (`"ka123"` becomes `"CX123"` for prefix `CX`)
    /// - no digit at all: the whole cleaned string gets the prefix
    /// - empty: the prefix alone
    pub fn normalize_flight_number(raw: &str, airline_prefix: &str) -> String {
        let prefix = clean_alphanumeric(airline_prefix);
        let cleaned = clean_alphanumeric(raw);

        if cleaned.is_empty() {
            return prefix;
        }
        if cleaned.starts_with(&prefix) {
            return cleaned;
        }

        match cleaned.find(|c: char| c.is_ascii_digit()) {
            Some(index) => format!("{}{}", prefix, &cleaned[index..]),
            None => format!("{prefix}{cleaned}"),
        }
    }

    /// Canonicalize an airport code through the injected resolver
    pub fn normalize_airport_code(&self, code: &str) -> String {
        strip_delimiter(&self.resolver.normalize(code))
    }

    /// Dates are kept as given apart from surrounding whitespace and the delimiter
    pub fn normalize_date(date: &str) -> String {
        strip_delimiter(date.trim())
    }

    pub fn normalize(
        &self,
        signature: &FlightSignature,
        airline_prefix: &str,
    ) -> NormalizedSignature {
        NormalizedSignature {
            date: Self::normalize_date(&signature.date),
            flight_number: Self::normalize_flight_number(
                &signature.flight_number,
                airline_prefix,
            ),
            from: self.normalize_airport_code(&signature.from),
            to: self.normalize_airport_code(&signature.to),
        }
    }

    /// Composite key of a raw signature after normalization
    pub fn composite_key(&self, signature: &FlightSignature, airline_prefix: &str) -> String {
        self.normalize(signature, airline_prefix).composite_key()
    }

    pub fn flight_key(
        &self,
        signature: &FlightSignature,
        airline_prefix: &str,
    ) -> FlightIdentifier {
        derive_identifier(&self.composite_key(signature, airline_prefix))
    }
}
