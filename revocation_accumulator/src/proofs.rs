//! Packaging of accumulator membership statements for an external zero-knowledge prover, and
//! the contracts of the prover/verifier collaborators.
//!
//! The builder only validates and packages; invoking the prover is the caller's job. The
//! pre-check evaluates the same witness equation the proof circuit enforces, so a request that
//! fails here could never have produced a valid proof.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use dock_crypto_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    accumulator::Accumulator,
    curve::{CurvePoint, Fq},
    error::RevocationError,
    witness::MembershipWitness,
};

/// Public half of a proof request: the accumulator the membership is claimed against
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct PublicInputs {
    #[serde_as(as = "ArkObjectBytes")]
    pub accumulator: CurvePoint,
}

impl PublicInputs {
    /// Public signal layout expected by the verifier: `[accumulator.x, accumulator.y]`
    pub fn signals(&self) -> [Fq; 2] {
        [self.accumulator.x, self.accumulator.y]
    }
}

/// Private half of a proof request. Zeroized on drop; the element and witness stay with the
/// holder and never appear in public signals.
#[serde_as]
#[derive(
    Clone,
    PartialEq,
    Eq,
    Debug,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
    Zeroize,
    ZeroizeOnDrop,
)]
pub struct PrivateInputs {
    #[serde_as(as = "ArkObjectBytes")]
    pub element: Fq,
    pub witness: MembershipWitness,
}

/// A validated, structured input set for the external prover
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct ProofRequest {
    pub public: PublicInputs,
    pub private: PrivateInputs,
}

/// Builds proof requests after checking the witness equation locally
pub struct ProofRequestBuilder;

impl ProofRequestBuilder {
    /// Check `accumulator == witness + element * G` and package the request. A mismatch is
    /// [`RevocationError::WitnessInconsistent`] and the request is refused rather than
    /// forwarded; an inconsistent witness means a bug elsewhere in the system, not a
    /// recoverable condition.
    pub fn build(
        element: &Fq,
        witness: &MembershipWitness,
        accumulator: &Accumulator,
    ) -> Result<ProofRequest, RevocationError> {
        if !witness.verify_membership(element, accumulator)? {
            return Err(RevocationError::WitnessInconsistent);
        }
        Ok(ProofRequest {
            public: PublicInputs {
                accumulator: *accumulator.value(),
            },
            private: PrivateInputs {
                element: *element,
                witness: witness.clone(),
            },
        })
    }
}

/// External SNARK prover contract. Takes a validated request, returns an opaque proof.
pub trait Prover {
    type Proof;

    fn prove(&self, request: &ProofRequest) -> Result<Self::Proof, RevocationError>;
}

/// External proof verifier contract. Checks a proof against the public signals of
/// [`PublicInputs::signals`].
pub trait Verifier {
    type Proof;

    fn verify(&self, proof: &Self::Proof, public: &PublicInputs)
        -> Result<bool, RevocationError>;
}
