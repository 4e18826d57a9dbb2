//! Trait definitions with mockall annotations for testing
//!
//! The reconciler only talks to its collaborators through these seams: airport
//! code canonicalization, timezone lookup, and the persistent table both
//! processes read and write. Real implementations live in `services`.

use shared::ProcessRole;

use crate::error::ReconcilerResult;

/// Maps IATA codes and aliases to canonical airport codes
///
/// Unknown codes pass through cleaned rather than failing.
#[mockall::automock]
pub trait AirportResolver: Send + Sync {
    fn normalize(&self, code: &str) -> String;
}

/// Resolves an airport code to its IANA timezone name
#[mockall::automock]
pub trait TimeZoneResolver: Send + Sync {
    fn time_zone(&self, code: &str) -> Option<String>;
}

/// Reserved logical keys in the shared table
///
/// The created set is owned by one process, so each role gets its own slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKey {
    /// composite key -> flight identifier
    CompositeMap,
    /// external uid -> flight identifier
    RosterMap,
    /// identifiers created by the given process
    CreatedSet(ProcessRole),
}

impl TableKey {
    pub const ALL: [TableKey; 4] = [
        TableKey::CompositeMap,
        TableKey::RosterMap,
        TableKey::CreatedSet(ProcessRole::Roster),
        TableKey::CreatedSet(ProcessRole::Logbook),
    ];

    /// Stable name used by persistent backends
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKey::CompositeMap => "composite_map",
            TableKey::RosterMap => "roster_map",
            TableKey::CreatedSet(ProcessRole::Roster) => "created_keys.roster",
            TableKey::CreatedSet(ProcessRole::Logbook) => "created_keys.logbook",
        }
    }
}

impl std::fmt::Display for TableKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Namespaced key-value table holding the three logical maps
///
/// Each `put` must be observed wholly or not at all by other readers.
/// There is no ordering or mutual exclusion across processes.
#[mockall::automock]
pub trait KeyValueTable: Send + Sync {
    /// Read the raw payload for a logical key, `None` if never written
    fn get(&self, key: TableKey) -> ReconcilerResult<Option<Vec<u8>>>;

    /// Replace the payload for a logical key
    fn put(&self, key: TableKey, value: &[u8]) -> ReconcilerResult<()>;

    /// Delete a logical key; deleting a missing key is not an error
    fn remove(&self, key: TableKey) -> ReconcilerResult<()>;

    /// Whether writes are visible to the other cooperating process
    fn is_shared(&self) -> bool;
}

impl<T: KeyValueTable + ?Sized> KeyValueTable for Box<T> {
    fn get(&self, key: TableKey) -> ReconcilerResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: TableKey, value: &[u8]) -> ReconcilerResult<()> {
        (**self).put(key, value)
    }

    fn remove(&self, key: TableKey) -> ReconcilerResult<()> {
        (**self).remove(key)
    }

    fn is_shared(&self) -> bool {
        (**self).is_shared()
    }
}
