//! Approximate matching over the composite table
//!
//! Finds a previously recorded identifier for a signature that only agrees on
//! the flight number, tolerating a wrong route and up to one day of date
//! skew. Entries this process created itself are deprioritized so both
//! processes converge on the record the other side wrote first.
//!
//! Entries are scanned in composite-key order, so every tie resolves to the
//! lexicographically smallest composite key.

use std::collections::{BTreeMap, BTreeSet};

use shared::{parse_signature_date, FlightIdentifier, NormalizedSignature};

/// Largest date skew, in days, still considered the same flight
pub const MAX_PROXIMITY_DAYS: i64 = 1;

/// Which rule produced an approximate match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Same date, written by the other process
    ExactDate,
    /// Within the proximity window
    Proximity { days: i64 },
    /// Same date, but created by this process
    SelfCreated,
}

/// A stored record recovered for an inexact signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingMapping {
    pub flight_key: FlightIdentifier,
    pub date: String,
    pub from: String,
    pub to: String,
    pub kind: MatchKind,
}

impl ExistingMapping {
    fn new(flight_key: &FlightIdentifier, stored: NormalizedSignature, kind: MatchKind) -> Self {
        Self {
            flight_key: flight_key.clone(),
            date: stored.date,
            from: stored.from,
            to: stored.to,
            kind,
        }
    }
}

/// Scan the composite table for the best match of `flight_number` around `date`
///
/// Both arguments must already be normalized. Precedence:
/// 1. first same-date entry not in `created` (returned immediately)
/// 2. closest proximity entry not in `created`
/// 3. first proximity entry in `created`
/// 4. first same-date entry in `created`
pub fn find_existing_mapping(
    entries: &BTreeMap<String, FlightIdentifier>,
    created: &BTreeSet<FlightIdentifier>,
    date: &str,
    flight_number: &str,
) -> Option<ExistingMapping> {
    let target_date = parse_signature_date(date);

    let mut exact_but_created: Option<ExistingMapping> = None;
    let mut best_proximity: Option<(i64, ExistingMapping)> = None;
    let mut created_proximity: Option<ExistingMapping> = None;

    for (composite, flight_key) in entries {
        let Some(stored) = NormalizedSignature::from_composite(composite) else {
            continue;
        };
        if stored.flight_number != flight_number {
            continue;
        }

        let is_created = created.contains(flight_key);

        if stored.date == date {
            if !is_created {
                return Some(ExistingMapping::new(flight_key, stored, MatchKind::ExactDate));
            }
            if exact_but_created.is_none() {
                exact_but_created = Some(ExistingMapping::new(
                    flight_key,
                    stored.clone(),
                    MatchKind::SelfCreated,
                ));
            }
        }

        let delta = match (stored.parsed_date(), target_date) {
            (Some(stored_date), Some(target)) => (stored_date - target).num_days().abs(),
            _ => continue,
        };
        if delta > MAX_PROXIMITY_DAYS {
            continue;
        }

        let kind = MatchKind::Proximity { days: delta };
        if !is_created {
            let closer = best_proximity
                .as_ref()
                .map_or(true, |(best_delta, _)| delta < *best_delta);
            if closer {
                best_proximity = Some((delta, ExistingMapping::new(flight_key, stored, kind)));
            }
        } else if created_proximity.is_none() {
            // First in key order, not closest
            created_proximity = Some(ExistingMapping::new(flight_key, stored, kind));
        }
    }

    best_proximity
        .map(|(_, mapping)| mapping)
        .or(created_proximity)
        .or(exact_but_created)
}
