//! Reconciliation store shared by the two cooperating processes
//!
//! Holds three logical tables on top of a [`KeyValueTable`]:
//! - composite key -> flight identifier
//! - external uid -> flight identifier
//! - the identifiers this process created itself
//!
//! ## Consistency model
//! Within one store instance every operation runs inside a single critical
//! section, so reads observe earlier writes and multi-table upserts never
//! interleave. Across processes there is no lock: each table write is atomic,
//! but two processes that both write before either reads the other's entry
//! can still mint two identifiers for one real flight. The created-set bias in
//! [`ReconciliationStore::existing_mapping`] narrows that window; it does not
//! close it.
//!
//! Every mutation rewrites a whole table after reading it. When both processes
//! read the same table and then write it back, the later write drops the
//! earlier one's entry: roster reads `{}`, logbook reads `{}` and writes
//! `{B}`, roster writes `{A}`, and `B` is gone. The lost mapping is recovered
//! the next time its owner reconciles that flight.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::config::DEFAULT_AIRLINE_PREFIX;
use shared::{
    logging, process_debug, process_error, process_info, process_warn, ExternalUid,
    FlightIdentifier, FlightSignature, ProcessRole, StoreConfig,
};

use crate::core::{
    derive_identifier, find_existing_mapping, ExistingMapping, KeyFactory, MatchKind,
};
use crate::error::ReconcilerResult;
use crate::services::{MemoryTable, SharedFileTable};
use crate::traits::{AirportResolver, KeyValueTable, TableKey};

type CompositeMap = BTreeMap<String, FlightIdentifier>;
type RosterMap = BTreeMap<ExternalUid, FlightIdentifier>;
type CreatedSet = BTreeSet<FlightIdentifier>;

/// How [`ReconciliationStore::reconcile`] arrived at its identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Found through the external uid table
    Roster,
    /// Found through the exact composite key
    Exact,
    /// Recovered by approximate matching
    Approximate(MatchKind),
    /// Derived and recorded as a new identifier
    Created,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub flight_key: FlightIdentifier,
    pub outcome: Outcome,
}

pub struct ReconciliationStore<T: KeyValueTable, R: AirportResolver> {
    table: T,
    factory: KeyFactory<R>,
    role: ProcessRole,
    airline_prefix: String,
    lock: Mutex<()>,
}

impl<R: AirportResolver> ReconciliationStore<Box<dyn KeyValueTable>, R> {
    /// Open a store from configuration
    ///
    /// Falls back to a process-local table when no shared directory is
    /// configured or it cannot be opened. The fallback is logged, never
    /// returned as an error.
    pub fn open(config: &StoreConfig, resolver: R) -> Self {
        let role = config.role;
        let table: Box<dyn KeyValueTable> = match &config.shared_dir {
            Some(dir) => match SharedFileTable::open(dir, &config.namespace) {
                Ok(table) => {
                    logging::log_startup(&role, &format!("shared table at {}", dir.display()));
                    Box::new(table)
                }
                Err(e) => {
                    process_warn!(
                        role,
                        error = %e,
                        "⚠️ Shared storage unavailable, using process-local table; \
                         cross-process convergence lost"
                    );
                    Box::new(MemoryTable::new())
                }
            },
            None => {
                process_warn!(
                    role,
                    "⚠️ No shared directory configured, using process-local table; \
                     cross-process convergence lost"
                );
                Box::new(MemoryTable::new())
            }
        };

        Self::new(table, KeyFactory::new(resolver), role)
            .with_airline_prefix(&config.airline_prefix)
    }
}

impl<T: KeyValueTable, R: AirportResolver> ReconciliationStore<T, R> {
    pub fn new(table: T, factory: KeyFactory<R>, role: ProcessRole) -> Self {
        Self {
            table,
            factory,
            role,
            airline_prefix: DEFAULT_AIRLINE_PREFIX.to_string(),
            lock: Mutex::new(()),
        }
    }

    /// Default airline prefix for callers that do not carry their own
    pub fn with_airline_prefix(mut self, prefix: &str) -> Self {
        self.airline_prefix = prefix.trim().to_uppercase();
        self
    }

    pub fn airline_prefix(&self) -> &str {
        &self.airline_prefix
    }

    pub fn role(&self) -> ProcessRole {
        self.role
    }

    pub fn factory(&self) -> &KeyFactory<R> {
        &self.factory
    }

    /// Whether the other process can see this store's writes
    pub fn is_shared(&self) -> bool {
        self.table.is_shared()
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guarded state lives in the table, so a poisoned lock is still usable
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn created_key(&self) -> TableKey {
        TableKey::CreatedSet(self.role)
    }

    fn load<V: DeserializeOwned + Default>(&self, key: TableKey) -> ReconcilerResult<V> {
        match self.table.get(key)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(V::default()),
        }
    }

    /// Read for lookups: failures are logged and read as empty
    fn load_or_empty<V: DeserializeOwned + Default>(&self, key: TableKey) -> V {
        self.load(key).unwrap_or_else(|e| {
            process_warn!(
                self.role,
                key = %key,
                error = %e,
                "⚠️ Table read failed, treating as empty"
            );
            V::default()
        })
    }

    fn save<V: Serialize>(&self, key: TableKey, value: &V) -> ReconcilerResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.table.put(key, &bytes)
    }

    fn logged<V>(&self, operation: &str, result: ReconcilerResult<V>) -> ReconcilerResult<V> {
        if let Err(e) = &result {
            logging::log_error(&self.role, operation, e);
        }
        result
    }

    fn save_mapping_locked(
        &self,
        flight_key: &FlightIdentifier,
        signature: &FlightSignature,
        external_uid: Option<&ExternalUid>,
        airline_prefix: &str,
    ) -> ReconcilerResult<()> {
        let composite = self.factory.composite_key(signature, airline_prefix);

        // Roster map first, so a retry after a failed composite write still
        // resolves through the uid
        if let Some(uid) = external_uid {
            let mut roster: RosterMap = self.load(TableKey::RosterMap)?;
            roster.insert(uid.clone(), flight_key.clone());
            self.save(TableKey::RosterMap, &roster)?;
        }

        let mut composites: CompositeMap = self.load(TableKey::CompositeMap)?;
        composites.insert(composite.clone(), flight_key.clone());
        self.save(TableKey::CompositeMap, &composites)?;

        process_debug!(
            self.role,
            flight_key = %flight_key,
            composite = %composite,
            "💾 Saved mapping"
        );
        Ok(())
    }

    fn remove_roster_mapping_locked(&self, external_uid: &ExternalUid) -> ReconcilerResult<()> {
        let mut roster: RosterMap = self.load(TableKey::RosterMap)?;
        if roster.remove(external_uid).is_some() {
            self.save(TableKey::RosterMap, &roster)?;
        }
        Ok(())
    }

    fn mark_created_locked(&self, flight_key: &FlightIdentifier) -> ReconcilerResult<()> {
        let mut created: CreatedSet = self.load(self.created_key())?;
        if created.insert(flight_key.clone()) {
            self.save(self.created_key(), &created)?;
        }
        Ok(())
    }

    fn flight_key_locked(
        &self,
        signature: &FlightSignature,
        airline_prefix: &str,
    ) -> Option<FlightIdentifier> {
        let composite = self.factory.composite_key(signature, airline_prefix);
        let composites: CompositeMap = self.load_or_empty(TableKey::CompositeMap);
        composites.get(&composite).cloned()
    }

    fn flight_key_for_uid_locked(&self, external_uid: &ExternalUid) -> Option<FlightIdentifier> {
        let roster: RosterMap = self.load_or_empty(TableKey::RosterMap);
        roster.get(external_uid).cloned()
    }

    fn existing_mapping_locked(
        &self,
        date: &str,
        flight_number: &str,
        airline_prefix: &str,
    ) -> Option<ExistingMapping> {
        let target_date = KeyFactory::<R>::normalize_date(date);
        let target_number = KeyFactory::<R>::normalize_flight_number(flight_number, airline_prefix);

        let composites: CompositeMap = self.load_or_empty(TableKey::CompositeMap);
        let created: CreatedSet = self.load_or_empty(self.created_key());

        find_existing_mapping(&composites, &created, &target_date, &target_number)
    }

    /// Record `flight_key` for a signature, and for an external uid if given
    ///
    /// Last write wins on the same composite key. The two tables are written
    /// separately, roster map first; if the composite write then fails, the
    /// uid entry stays committed and the error is returned.
    pub fn save_mapping(
        &self,
        flight_key: &FlightIdentifier,
        signature: &FlightSignature,
        external_uid: Option<&ExternalUid>,
        airline_prefix: &str,
    ) -> ReconcilerResult<()> {
        let _guard = self.guard();
        self.logged(
            "save mapping",
            self.save_mapping_locked(flight_key, signature, external_uid, airline_prefix),
        )
    }

    /// Exact lookup by the signature's composite key
    pub fn flight_key(
        &self,
        signature: &FlightSignature,
        airline_prefix: &str,
    ) -> Option<FlightIdentifier> {
        let _guard = self.guard();
        self.flight_key_locked(signature, airline_prefix)
    }

    /// Exact lookup by external uid
    pub fn flight_key_for_uid(&self, external_uid: &ExternalUid) -> Option<FlightIdentifier> {
        let _guard = self.guard();
        self.flight_key_for_uid_locked(external_uid)
    }

    /// Drop the external uid association; the composite mapping stays
    pub fn remove_roster_mapping(&self, external_uid: &ExternalUid) -> ReconcilerResult<()> {
        let _guard = self.guard();
        self.logged(
            "remove roster mapping",
            self.remove_roster_mapping_locked(external_uid),
        )
    }

    pub fn mark_created(&self, flight_key: &FlightIdentifier) -> ReconcilerResult<()> {
        let _guard = self.guard();
        self.logged("mark created", self.mark_created_locked(flight_key))
    }

    pub fn is_created(&self, flight_key: &FlightIdentifier) -> bool {
        let _guard = self.guard();
        let created: CreatedSet = self.load_or_empty(self.created_key());
        created.contains(flight_key)
    }

    pub fn created_keys(&self) -> BTreeSet<FlightIdentifier> {
        let _guard = self.guard();
        self.load_or_empty(self.created_key())
    }

    /// Forget which identifiers this process created
    pub fn reset_created(&self) -> ReconcilerResult<()> {
        let _guard = self.guard();
        self.logged("reset created", self.table.remove(self.created_key()))
    }

    /// Clear every table, including the other process's created set
    pub fn reset(&self) -> ReconcilerResult<()> {
        let _guard = self.guard();
        let result = TableKey::ALL.iter().try_for_each(|key| self.table.remove(*key));
        if result.is_ok() {
            process_info!(self.role, "🧹 Cleared all reconciliation tables");
        }
        self.logged("reset", result)
    }

    /// Approximate match by flight number around `date`
    ///
    /// Route fields are ignored; see [`find_existing_mapping`] for precedence.
    pub fn existing_mapping(
        &self,
        date: &str,
        flight_number: &str,
        airline_prefix: &str,
    ) -> Option<ExistingMapping> {
        let _guard = self.guard();
        self.existing_mapping_locked(date, flight_number, airline_prefix)
    }

    /// Find or create the identifier for a signature
    ///
    /// Tries the external uid, the exact composite key, then approximate
    /// matching. A recovered identifier is saved under this signature too. If
    /// nothing matches, a new identifier is derived, saved and marked created.
    pub fn reconcile(
        &self,
        signature: &FlightSignature,
        airline_prefix: &str,
        external_uid: Option<&ExternalUid>,
    ) -> ReconcilerResult<Reconciled> {
        let _guard = self.guard();

        if let Some(flight_key) = external_uid.and_then(|uid| self.flight_key_for_uid_locked(uid)) {
            return Ok(Reconciled { flight_key, outcome: Outcome::Roster });
        }

        if let Some(flight_key) = self.flight_key_locked(signature, airline_prefix) {
            if external_uid.is_some() {
                self.logged(
                    "save mapping",
                    self.save_mapping_locked(&flight_key, signature, external_uid, airline_prefix),
                )?;
            }
            return Ok(Reconciled { flight_key, outcome: Outcome::Exact });
        }

        let existing =
            self.existing_mapping_locked(&signature.date, &signature.flight_number, airline_prefix);
        if let Some(existing) = existing {
            self.logged(
                "save mapping",
                self.save_mapping_locked(
                    &existing.flight_key,
                    signature,
                    external_uid,
                    airline_prefix,
                ),
            )?;
            process_debug!(
                self.role,
                flight_key = %existing.flight_key,
                kind = ?existing.kind,
                "🔗 Reconciled onto existing mapping"
            );
            return Ok(Reconciled {
                flight_key: existing.flight_key,
                outcome: Outcome::Approximate(existing.kind),
            });
        }

        let composite = self.factory.composite_key(signature, airline_prefix);
        let flight_key = derive_identifier(&composite);
        let result = self
            .save_mapping_locked(&flight_key, signature, external_uid, airline_prefix)
            .and_then(|_| self.mark_created_locked(&flight_key));
        if let Err(e) = &result {
            process_error!(
                self.role,
                flight_key = %flight_key,
                error = %e,
                "❌ Failed to record new flight key"
            );
        }
        result?;

        Ok(Reconciled { flight_key, outcome: Outcome::Created })
    }
}
