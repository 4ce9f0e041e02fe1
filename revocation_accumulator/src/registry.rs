//! The revocation registry: the state machine that owns the accumulator and the device store
//! and mutates them in lockstep.
//!
//! Device lifecycle is `Unregistered -> Registered(Active) -> Revoked`, and revocation is
//! terminal. Revoking element `e` with `P_e = e * G`:
//!
//! 1. every already-revoked witness becomes `witness + P_e`, computed from its value before
//!    this event;
//! 2. the new member's witness is the accumulator value before this event;
//! 3. the accumulator becomes `accumulator + P_e`.
//!
//! The ordering is load-bearing: steps 1 and 2 read state that step 3 destroys. A batch runs
//! the same three steps per element against one shared, growing accumulator, so its end state
//! equals replaying the batch as sequential single revocations; only the externally observable
//! accumulator transition is grouped into one event.
//!
//! All updates for an event are staged before the store or the accumulator is touched, so an
//! event commits atomically and readers never observe a partially updated witness set. The
//! registry mutates only through `&mut self`; callers that share it across threads serialize
//! writers (mutex, single-threaded actor, or equivalent).

use ark_ff::Zero;
use ark_std::{cfg_into_iter, collections::BTreeMap, vec::Vec};
use dock_crypto_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    accumulator::Accumulator,
    curve::{CurvePoint, Fq},
    error::RevocationError,
    persistence::{InMemoryRegistry, RegistryState},
    witness::MembershipWitness,
};

/// Per-device registry entry
#[serde_as]
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde_as(as = "ArkObjectBytes")]
    pub element: Fq,
    /// Logical event index at registration. The registry never reads a clock; mapping event
    /// indices to wall-clock time is a ledger concern.
    pub registered_at: u64,
    /// Until revocation this holds the accumulator at registration, a placeholder with no
    /// meaning for proofs. It becomes a real membership witness at revocation and is updated
    /// on every later revocation.
    pub witness: MembershipWitness,
    pub revoked: bool,
}

/// Append-only history entry, one per revoked device
#[serde_as]
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct RevocationRecord {
    #[serde_as(as = "ArkObjectBytes")]
    pub element: Fq,
    pub witness_at_revocation: MembershipWitness,
    #[serde_as(as = "ArkObjectBytes")]
    pub accumulator_before: CurvePoint,
    #[serde_as(as = "ArkObjectBytes")]
    pub accumulator_after: CurvePoint,
    pub event_index: u64,
}

/// Answer to a status query. `NotRevoked` covers unregistered, unknown and active devices
/// alike, so the reply discloses nothing about the revoked set's contents.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum RevocationStatus {
    /// The device is revoked; the witness and accumulator are the inputs for a membership
    /// proof against the current accumulator.
    Revoked {
        witness: MembershipWitness,
        accumulator: Accumulator,
    },
    NotRevoked,
}

impl RevocationStatus {
    pub fn is_revoked(&self) -> bool {
        matches!(self, Self::Revoked { .. })
    }
}

/// The registry aggregate: accumulator, device store, revocation log and event counter,
/// always mutated together.
#[derive(Clone, Debug)]
pub struct RevocationRegistry<S: RegistryState = InMemoryRegistry> {
    accumulator: Accumulator,
    state: S,
    log: Vec<RevocationRecord>,
    next_event: u64,
}

impl RevocationRegistry<InMemoryRegistry> {
    pub fn new() -> Self {
        Self::with_state(InMemoryRegistry::new())
    }
}

impl Default for RevocationRegistry<InMemoryRegistry> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RegistryState> RevocationRegistry<S> {
    /// Create a registry over an existing device store, starting from the empty accumulator
    pub fn with_state(state: S) -> Self {
        Self {
            accumulator: Accumulator::initialize(),
            state,
            log: Vec::new(),
            next_event: 0,
        }
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    /// Append-only revocation history, in event order
    pub fn records(&self) -> &[RevocationRecord] {
        &self.log
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Register a device. Fails on the zero element or a duplicate registration, without
    /// mutating anything.
    pub fn register(&mut self, element: Fq) -> Result<(), RevocationError> {
        if element.is_zero() {
            return Err(RevocationError::InvalidInput);
        }
        if self.state.has(&element) {
            return Err(RevocationError::AlreadyRegistered);
        }
        self.state.add(DeviceRecord {
            element,
            registered_at: self.next_event,
            witness: MembershipWitness(*self.accumulator.value()),
            revoked: false,
        });
        self.next_event += 1;
        Ok(())
    }

    /// Revoke a registered, active device. The accumulator update and the witness fan-out
    /// commit as one unit; on any failure nothing has changed.
    pub fn revoke(&mut self, element: &Fq) -> Result<RevocationRecord, RevocationError> {
        match self.state.get(element) {
            None => return Err(RevocationError::DeviceNotFound),
            Some(device) if device.revoked => return Err(RevocationError::AlreadyRevoked),
            Some(_) => (),
        }
        let mut records = self.apply_revocations(&[*element])?;
        // A precondition-checked element stages exactly one record
        records.pop().ok_or(RevocationError::DeviceNotFound)
    }

    /// Revoke every element of the batch that is currently registered and active. Elements
    /// that are unregistered, already revoked, or repeated within the batch are skipped, not
    /// errors: the batch is best-effort, never all-or-nothing. The whole batch commits as one
    /// event; the end state equals revoking the surviving elements sequentially in batch
    /// order. Returns the records for the elements actually revoked.
    pub fn batch_revoke(
        &mut self,
        elements: &[Fq],
    ) -> Result<Vec<RevocationRecord>, RevocationError> {
        self.apply_revocations(elements)
    }

    /// Status of a device. Revoked devices get their proof inputs; everything else is just
    /// "not revoked".
    pub fn check_status(&self, element: &Fq) -> RevocationStatus {
        match self.state.get(element) {
            Some(device) if device.revoked => RevocationStatus::Revoked {
                witness: device.witness.clone(),
                accumulator: self.accumulator.clone(),
            },
            _ => RevocationStatus::NotRevoked,
        }
    }

    /// Sweep the witness equation over every revoked device. Holds after every event; a
    /// `false` means the registry state was corrupted from outside.
    pub fn verify_all_witnesses(&self) -> Result<bool, RevocationError> {
        for element in self.state.revoked_elements() {
            let device = self
                .state
                .get(&element)
                .ok_or(RevocationError::DeviceNotFound)?;
            if !device.witness.verify_membership(&element, &self.accumulator)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Stage and commit the revocation of the eligible elements, in order, as one event.
    fn apply_revocations(
        &mut self,
        elements: &[Fq],
    ) -> Result<Vec<RevocationRecord>, RevocationError> {
        let mut accumulated = *self.accumulator.value();
        let mut revoked = self.state.revoked_elements();
        // Witness values to write at commit, superseding the store
        let mut pending: BTreeMap<Fq, CurvePoint> = BTreeMap::new();
        let mut records: Vec<RevocationRecord> = Vec::new();
        let mut event_index = self.next_event;

        for element in elements {
            let active = matches!(self.state.get(element), Some(device) if !device.revoked);
            let staged = records.iter().any(|record| record.element == *element);
            if !active || staged {
                continue;
            }
            let addition_point = CurvePoint::generator().mul_scalar(element)?;

            // Every outstanding witness absorbs the new member's point, each computed from
            // its value before this addition
            let outstanding = revoked
                .iter()
                .map(|other| {
                    let witness = match pending.get(other) {
                        Some(witness) => *witness,
                        None => {
                            self.state
                                .get(other)
                                .ok_or(RevocationError::DeviceNotFound)?
                                .witness
                                .0
                        }
                    };
                    Ok((*other, witness))
                })
                .collect::<Result<Vec<_>, RevocationError>>()?;
            let updated = cfg_into_iter!(outstanding)
                .map(|(other, witness)| {
                    MembershipWitness::compute_update_after_addition(&addition_point, &witness)
                        .map(|updated| (other, updated))
                })
                .collect::<Result<Vec<_>, RevocationError>>()?;
            pending.extend(updated);

            // The new member's witness is the accumulator before its own addition
            pending.insert(*element, accumulated);

            // Only now does the accumulator move
            let next = accumulated.add(&addition_point)?;
            records.push(RevocationRecord {
                element: *element,
                witness_at_revocation: MembershipWitness(accumulated),
                accumulator_before: accumulated,
                accumulator_after: next,
                event_index,
            });
            event_index += 1;
            revoked.push(*element);
            accumulated = next;
        }

        if records.is_empty() {
            return Ok(records);
        }

        // Commit. Nothing above has touched the store or the accumulator.
        for (element, witness) in pending {
            let device = self
                .state
                .get_mut(&element)
                .ok_or(RevocationError::DeviceNotFound)?;
            device.witness = MembershipWitness(witness);
        }
        for record in &records {
            let device = self
                .state
                .get_mut(&record.element)
                .ok_or(RevocationError::DeviceNotFound)?;
            device.revoked = true;
        }
        self.accumulator = Accumulator::from_value(accumulated);
        self.next_event = event_index;
        self.log.extend(records.iter().cloned());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_std::{
        rand::{rngs::StdRng, SeedableRng},
        vec,
        UniformRand,
    };

    fn registry_with(elements: &[Fq]) -> RevocationRegistry {
        let mut registry = RevocationRegistry::new();
        for element in elements {
            registry.register(*element).unwrap();
        }
        registry
    }

    #[test]
    fn register_preconditions() {
        let mut registry = RevocationRegistry::new();
        assert!(matches!(
            registry.register(Fq::zero()),
            Err(RevocationError::InvalidInput)
        ));

        let element = Fq::from(5u64);
        registry.register(element).unwrap();
        assert!(matches!(
            registry.register(element),
            Err(RevocationError::AlreadyRegistered)
        ));
        assert_eq!(registry.state().size(), 1);
    }

    #[test]
    fn revoke_preconditions_leave_state_unchanged() {
        let element = Fq::from(5u64);
        let mut registry = registry_with(&[element]);

        assert!(matches!(
            registry.revoke(&Fq::from(6u64)),
            Err(RevocationError::DeviceNotFound)
        ));

        registry.revoke(&element).unwrap();
        let accumulator = registry.accumulator().clone();
        let witness = match registry.check_status(&element) {
            RevocationStatus::Revoked { witness, .. } => witness,
            RevocationStatus::NotRevoked => panic!("just revoked"),
        };

        assert!(matches!(
            registry.revoke(&element),
            Err(RevocationError::AlreadyRevoked)
        ));
        assert_eq!(*registry.accumulator(), accumulator);
        assert_eq!(registry.records().len(), 1);
        match registry.check_status(&element) {
            RevocationStatus::Revoked { witness: after, .. } => assert_eq!(after, witness),
            RevocationStatus::NotRevoked => panic!("still revoked"),
        }
    }

    #[test]
    fn first_revocation() {
        let element = Fq::from(12345u64);
        let mut registry = registry_with(&[element]);
        let record = registry.revoke(&element).unwrap();

        // Witness of the first revoked device is the empty accumulator, the identity
        assert_eq!(record.witness_at_revocation.0, CurvePoint::identity());
        assert_eq!(
            *registry.accumulator().value(),
            CurvePoint::generator().mul_scalar(&element).unwrap()
        );
        assert_eq!(record.accumulator_after, *registry.accumulator().value());
        assert!(registry.verify_all_witnesses().unwrap());
    }

    #[test]
    fn second_revocation_updates_the_first_witness() {
        let first = Fq::from(12345u64);
        let second = Fq::from(67890u64);
        let mut registry = registry_with(&[first, second]);
        registry.revoke(&first).unwrap();
        registry.revoke(&second).unwrap();

        let p1 = CurvePoint::generator().mul_scalar(&first).unwrap();
        let p2 = CurvePoint::generator().mul_scalar(&second).unwrap();

        match registry.check_status(&first) {
            RevocationStatus::Revoked { witness, .. } => {
                assert_eq!(witness.0, CurvePoint::identity().add(&p2).unwrap());
            }
            RevocationStatus::NotRevoked => panic!("revoked"),
        }
        match registry.check_status(&second) {
            RevocationStatus::Revoked { witness, .. } => assert_eq!(witness.0, p1),
            RevocationStatus::NotRevoked => panic!("revoked"),
        }
        assert_eq!(*registry.accumulator().value(), p1.add(&p2).unwrap());
        assert!(registry.verify_all_witnesses().unwrap());
    }

    #[test]
    fn invariant_holds_through_random_history() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let elements: Vec<Fq> = (0..20).map(|_| Fq::rand(&mut rng)).collect();
        let mut registry = registry_with(&elements);

        for (i, element) in elements.iter().enumerate() {
            if i % 3 == 0 {
                continue;
            }
            registry.revoke(element).unwrap();
            assert!(registry.verify_all_witnesses().unwrap());
        }
        assert_eq!(
            registry.records().len() as u64,
            registry.state().revoked_elements().len() as u64
        );
    }

    #[test]
    fn batch_equals_sequential_replay() {
        let elements: Vec<Fq> = vec![3u64, 5, 7].into_iter().map(Fq::from).collect();

        let mut batched = registry_with(&elements);
        batched.batch_revoke(&elements).unwrap();

        let mut sequential = registry_with(&elements);
        for element in &elements {
            sequential.revoke(element).unwrap();
        }

        assert_eq!(batched.accumulator(), sequential.accumulator());
        for element in &elements {
            assert_eq!(
                batched.check_status(element),
                sequential.check_status(element)
            );
        }
        // Batching groups the accumulator transition, but the history is per device
        assert_eq!(batched.records().len(), 3);
    }

    #[test]
    fn batch_order_does_not_change_the_final_accumulator() {
        let a = Fq::from(11u64);
        let b = Fq::from(13u64);

        let mut forward = registry_with(&[a, b]);
        forward.batch_revoke(&[a, b]).unwrap();
        let mut backward = registry_with(&[a, b]);
        backward.batch_revoke(&[b, a]).unwrap();

        assert_eq!(forward.accumulator(), backward.accumulator());
    }

    #[test]
    fn batch_skips_ineligible_elements() {
        let registered = Fq::from(21u64);
        let revoked = Fq::from(22u64);
        let unknown = Fq::from(23u64);
        let mut registry = registry_with(&[registered, revoked]);
        registry.revoke(&revoked).unwrap();

        // Unregistered, already-revoked and duplicate entries are skipped
        let records = registry
            .batch_revoke(&[unknown, revoked, registered, registered])
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].element, registered);
        assert!(registry.check_status(&registered).is_revoked());
        assert!(!registry.check_status(&unknown).is_revoked());
        assert!(registry.verify_all_witnesses().unwrap());
    }

    #[test]
    fn empty_batch_is_not_an_event() {
        let element = Fq::from(31u64);
        let mut registry = registry_with(&[element]);
        let accumulator = registry.accumulator().clone();

        let records = registry.batch_revoke(&[Fq::from(99u64)]).unwrap();
        assert!(records.is_empty());
        assert_eq!(*registry.accumulator(), accumulator);
        assert!(registry.records().is_empty());
    }

    #[test]
    fn status_discloses_nothing_for_non_members() {
        let member = Fq::from(41u64);
        let active = Fq::from(42u64);
        let mut registry = registry_with(&[member, active]);
        registry.revoke(&member).unwrap();

        // Never-registered and registered-but-active devices get the same answer
        assert_eq!(
            registry.check_status(&Fq::from(43u64)),
            RevocationStatus::NotRevoked
        );
        assert_eq!(registry.check_status(&active), RevocationStatus::NotRevoked);
    }

    #[test]
    fn event_indices_are_monotonic() {
        let elements: Vec<Fq> = vec![51u64, 52, 53].into_iter().map(Fq::from).collect();
        let mut registry = registry_with(&elements);
        registry.batch_revoke(&elements[..2]).unwrap();
        registry.revoke(&elements[2]).unwrap();

        let indices: Vec<u64> = registry.records().iter().map(|r| r.event_index).collect();
        assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
