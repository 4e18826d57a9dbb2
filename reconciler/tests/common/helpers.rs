//! Test helpers and builder patterns for reconciler tests
//!
//! Convenient constructors that reduce test boilerplate.

use reconciler::{AirportDirectory, KeyFactory, MemoryTable, ReconciliationStore};
use shared::{FlightIdentifier, FlightSignature, ProcessRole, StoreConfig};
use tempfile::TempDir;

use super::fixtures::TestFixtures;

pub type MemoryStore = ReconciliationStore<MemoryTable, AirportDirectory>;
pub type OpenedStore = ReconciliationStore<Box<dyn reconciler::KeyValueTable>, AirportDirectory>;

/// Builder for stores over a shared temporary directory
pub struct StoreBuilder {
    role: ProcessRole,
    namespace: String,
    airline_prefix: String,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            role: ProcessRole::Roster,
            namespace: TestFixtures::NAMESPACE.to_string(),
            airline_prefix: TestFixtures::AIRLINE_PREFIX.to_string(),
        }
    }

    pub fn with_role(mut self, role: ProcessRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    pub fn config(&self, dir: &TempDir) -> StoreConfig {
        StoreConfig::default()
            .with_shared_dir(dir.path())
            .with_namespace(self.namespace.clone())
            .with_airline_prefix(&self.airline_prefix)
            .with_role(self.role)
    }

    /// Open a store over `dir` the way a real process would
    pub fn open(self, dir: &TempDir) -> OpenedStore {
        ReconciliationStore::open(&self.config(dir), TestFixtures::airports())
    }

    /// Process-local store with the fixture airports
    pub fn in_memory(self) -> MemoryStore {
        ReconciliationStore::new(MemoryTable::new(), KeyFactory::new(TestFixtures::airports()), self.role)
            .with_airline_prefix(&self.airline_prefix)
    }
}

/// Common helper functions for tests
pub struct TestHelpers;

impl TestHelpers {
    /// Roster and logbook stores sharing one directory
    pub fn process_pair(dir: &TempDir) -> (OpenedStore, OpenedStore) {
        let roster = StoreBuilder::new().with_role(ProcessRole::Roster).open(dir);
        let logbook = StoreBuilder::new().with_role(ProcessRole::Logbook).open(dir);
        (roster, logbook)
    }

    /// Derive, save and mark a flight the way a producer records it
    pub fn produce<T, R>(store: &ReconciliationStore<T, R>, signature: &FlightSignature) -> FlightIdentifier
    where
        T: reconciler::KeyValueTable,
        R: reconciler::AirportResolver,
    {
        let prefix = TestFixtures::AIRLINE_PREFIX;
        let key = store.factory().flight_key(signature, prefix);
        store.save_mapping(&key, signature, None, prefix).unwrap();
        store.mark_created(&key).unwrap();
        key
    }
}
