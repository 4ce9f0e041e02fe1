#![cfg_attr(not(feature = "std"), no_std)]

//! Additive elliptic-curve accumulator for credential revocation. An unbounded set of revoked
//! device identifiers is compressed into one curve point on Baby Jubjub; each revoked device
//! holds a [`MembershipWitness`] with which it (or a verifier acting for it) can prove
//! membership in the revoked set without disclosing any other revoked identifier and without
//! the verifier needing the full revocation list.
//!
//! Provides
//! - explicit twisted-Edwards point arithmetic on the fixed curve, in [`curve`].
//! - the monotonic [`Accumulator`] and the witness-maintenance protocol that keeps every
//!   outstanding witness consistent across single and batched revocations, in [`registry`].
//! - a local pre-check that validates a witness before it reaches a proof system, in
//!   [`proofs`], along with the [`Prover`]/[`Verifier`]/[`Ledger`] collaborator contracts.
//!
//! Registering, revoking and preparing a membership proof:
//!
//! ```
//! use revocation_accumulator::prelude::*;
//!
//! let mut registry = RevocationRegistry::new();
//! registry.register(device_id)?;
//!
//! // Revocation updates the accumulator and every outstanding witness as one atomic event
//! registry.revoke(&device_id)?;
//!
//! // Revoked devices get their proof inputs from a status query
//! if let RevocationStatus::Revoked { witness, accumulator } = registry.check_status(&device_id) {
//!     let request = ProofRequestBuilder::build(&device_id, &witness, &accumulator)?;
//!     // hand `request` to the external SNARK prover
//! }
//! ```
//!
//! The registry is fully synchronous, deterministic and in-memory; writers must be serialized
//! by the caller. Proof generation and ledger persistence are external collaborators invoked
//! afterwards with an already-consistent snapshot.
//!
//! [`Accumulator`]: crate::accumulator::Accumulator
//! [`MembershipWitness`]: crate::witness::MembershipWitness
//! [`Prover`]: crate::proofs::Prover
//! [`Verifier`]: crate::proofs::Verifier
//! [`Ledger`]: crate::persistence::Ledger

pub mod accumulator;
pub mod curve;
pub mod error;
pub mod persistence;
pub mod proofs;
pub mod registry;
pub mod witness;

pub mod prelude {
    pub use crate::{
        accumulator::Accumulator,
        curve::{CurvePoint, Fq},
        error::RevocationError,
        persistence::{InMemoryRegistry, Ledger, RegistryState},
        proofs::{
            PrivateInputs, ProofRequest, ProofRequestBuilder, Prover, PublicInputs, Verifier,
        },
        registry::{
            DeviceRecord, RevocationRecord, RevocationRegistry, RevocationStatus,
        },
        witness::MembershipWitness,
    };
}
