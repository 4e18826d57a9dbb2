//! Test fixtures for reconciler tests
//!
//! Consistent signatures, airports and identifiers used across all test suites.

use reconciler::{AirportDirectory, AirportEntry};
use shared::{ExternalUid, FlightSignature};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const AIRLINE_PREFIX: &'static str = "CX";
    pub const NAMESPACE: &'static str = "flightkey-test";

    pub const DATE: &'static str = "01/03/2024";
    pub const DAY_BEFORE: &'static str = "29/02/2024";
    pub const DAY_AFTER: &'static str = "02/03/2024";
    pub const TWO_DAYS_AFTER: &'static str = "03/03/2024";

    pub const ROSTER_UID: &'static str = "roster-event-0001";

    /// Small airport dataset with ICAO aliases
    pub fn airports() -> AirportDirectory {
        AirportDirectory::new([
            AirportEntry::new("HKG")
                .with_aliases(["VHHH"])
                .with_time_zone("Asia/Hong_Kong"),
            AirportEntry::new("LHR")
                .with_aliases(["EGLL"])
                .with_time_zone("Europe/London"),
            AirportEntry::new("TPE")
                .with_aliases(["RCTP"])
                .with_time_zone("Asia/Taipei"),
        ])
    }

    /// Hong Kong to London as the roster system reports it
    pub fn roster_signature() -> FlightSignature {
        FlightSignature::new(Self::DATE, "CX 251", "HKG", "LHR")
    }

    /// The same flight as a logbook entry with ICAO codes and a bare number
    pub fn logbook_signature() -> FlightSignature {
        FlightSignature::new(Self::DATE, "251", "VHHH", "EGLL")
    }

    /// The same flight with the route misremembered
    pub fn wrong_route_signature(date: &str) -> FlightSignature {
        FlightSignature::new(date, "cx251", "TPE", "LHR")
    }

    /// A different flight on the same day
    pub fn other_flight() -> FlightSignature {
        FlightSignature::new(Self::DATE, "CX 400", "HKG", "TPE")
    }

    pub fn roster_uid() -> ExternalUid {
        ExternalUid::new(Self::ROSTER_UID)
    }
}
