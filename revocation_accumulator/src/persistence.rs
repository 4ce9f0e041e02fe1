//! Interfaces for storage of registry state, and the contract for the external ledger that
//! mirrors it.

use ark_std::{collections::BTreeMap, vec::Vec};

use crate::{
    accumulator::Accumulator,
    curve::Fq,
    error::RevocationError,
    registry::{DeviceRecord, RevocationRecord},
    witness::MembershipWitness,
};

/// Store of per-device records, updated in lockstep with the accumulator. A production
/// implementation could be a persistent key-value store like LevelDb or Rocksdb; the registry
/// core is in-memory and ships [`InMemoryRegistry`].
pub trait RegistryState {
    /// Insert a record for a newly registered device
    fn add(&mut self, record: DeviceRecord);

    fn get(&self, element: &Fq) -> Option<&DeviceRecord>;

    fn get_mut(&mut self, element: &Fq) -> Option<&mut DeviceRecord>;

    /// Check if a device is registered (revoked or not)
    fn has(&self, element: &Fq) -> bool;

    /// Number of registered devices
    fn size(&self) -> u64;

    /// Elements of all currently revoked devices. Every revocation updates every one of these
    /// witnesses, so the fan-out over this list is O(R) by construction.
    fn revoked_elements(&self) -> Vec<Fq>;
}

/// In-memory device store
#[derive(Clone, Debug, Default)]
pub struct InMemoryRegistry {
    pub db: BTreeMap<Fq, DeviceRecord>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegistryState for InMemoryRegistry {
    fn add(&mut self, record: DeviceRecord) {
        self.db.insert(record.element, record);
    }

    fn get(&self, element: &Fq) -> Option<&DeviceRecord> {
        self.db.get(element)
    }

    fn get_mut(&mut self, element: &Fq) -> Option<&mut DeviceRecord> {
        self.db.get_mut(element)
    }

    fn has(&self, element: &Fq) -> bool {
        self.db.contains_key(element)
    }

    fn size(&self) -> u64 {
        self.db.len() as u64
    }

    fn revoked_elements(&self) -> Vec<Fq> {
        self.db
            .values()
            .filter(|record| record.revoked)
            .map(|record| record.element)
            .collect()
    }
}

/// Contract for the persistent (e.g. on-chain) registry mirror: an append-only event log keyed
/// by device identifier that tracks the accumulator value and registration/revocation flags.
/// Invoked after a revocation has committed, with an already-consistent snapshot.
pub trait Ledger {
    fn record_registration(&mut self, element: &Fq, event_index: u64)
        -> Result<(), RevocationError>;

    fn record_revocation(&mut self, record: &RevocationRecord) -> Result<(), RevocationError>;

    /// The last accumulator value the ledger has seen
    fn accumulator(&self) -> Result<Accumulator, RevocationError>;

    /// Witness-equation check against the ledger's accumulator, for trustless external
    /// verification. Same predicate as the proof-request pre-check.
    fn verify_witness(
        &self,
        element: &Fq,
        witness: &MembershipWitness,
    ) -> Result<bool, RevocationError> {
        witness.verify_membership(element, &self.accumulator()?)
    }
}
