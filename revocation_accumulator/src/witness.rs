//! Membership witnesses and the protocol for keeping them current. A revoked device's witness
//! is the accumulation of every *other* revoked element: the witness equation
//! `accumulator == witness + element * G` then proves membership without revealing the rest of
//! the revoked set.
//!
//! Every new revocation perturbs every outstanding witness, so witnesses must be updated in
//! lockstep with the accumulator. The registry does this for all stored witnesses; a holder
//! that only follows the public event log can catch up on its own with
//! [`MembershipWitness::update_after_additions`].

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use dock_crypto_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    accumulator::Accumulator,
    curve::{CurvePoint, Fq},
    error::RevocationError,
};

/// Witness to check membership of one element in the accumulator. Held by (or on behalf of)
/// the revoked device and kept out of public state.
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
pub struct MembershipWitness(#[serde_as(as = "ArkObjectBytes")] pub CurvePoint);

impl AsRef<CurvePoint> for MembershipWitness {
    fn as_ref(&self) -> &CurvePoint {
        &self.0
    }
}

impl From<CurvePoint> for MembershipWitness {
    fn from(value: CurvePoint) -> Self {
        Self(value)
    }
}

impl MembershipWitness {
    /// Update to a witness after another element is added to the accumulator, given that
    /// element's curve point. The old witness value must be the one from before the addition.
    pub fn compute_update_after_addition(
        addition_point: &CurvePoint,
        old_witness: &CurvePoint,
    ) -> Result<CurvePoint, RevocationError> {
        // C + addition * G
        old_witness.add(addition_point)
    }

    /// Update this witness after the element `addition` was added to the accumulator
    pub fn update_after_addition(&self, addition: &Fq) -> Result<Self, RevocationError> {
        let addition_point = CurvePoint::generator().mul_scalar(addition)?;
        Ok(Self(Self::compute_update_after_addition(
            &addition_point,
            &self.0,
        )?))
    }

    /// Catch a witness up across several additions the holder missed, in the order they were
    /// applied to the accumulator. The additions must not include the witness's own element;
    /// the registry's event log provides them in order.
    pub fn update_after_additions(&self, additions: &[Fq]) -> Result<Self, RevocationError> {
        let mut witness = self.0;
        for addition in additions {
            let addition_point = CurvePoint::generator().mul_scalar(addition)?;
            witness = witness.add(&addition_point)?;
        }
        Ok(Self(witness))
    }

    /// The witness equation: `accumulator == witness + element * G`. This is the one predicate
    /// shared by the registry's invariant sweep, the proof-request pre-check and ledger-side
    /// verification; the zero-knowledge circuit re-expresses the same equation.
    pub fn verify_membership(
        &self,
        element: &Fq,
        accumulator: &Accumulator,
    ) -> Result<bool, RevocationError> {
        let shifted = self
            .0
            .add(&CurvePoint::generator().mul_scalar(element)?)?;
        Ok(shifted == *accumulator.value())
    }
}
