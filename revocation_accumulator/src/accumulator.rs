//! The accumulator is a single curve point summarizing the entire revoked-device set. It starts
//! at the identity (0, 1) and each revocation folds the revoked element into it:
//! `V' = V + element * G`. The accumulator is monotonic; nothing is ever removed from it in
//! this construction.
//!
//! Updates here are pure: methods compute new values and never touch device witnesses or any
//! store. Keeping every outstanding witness consistent with an update is the job of the
//! registry, which applies both in lockstep.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use dock_crypto_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::{
    curve::{CurvePoint, Fq},
    error::RevocationError,
};

/// The accumulated value of all revoked members. A digest of the state of the revoked set.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct Accumulator(#[serde_as(as = "ArkObjectBytes")] pub CurvePoint);

impl Accumulator {
    /// Create an empty accumulator at the curve identity
    pub fn initialize() -> Self {
        Self(CurvePoint::identity())
    }

    /// Resume from a previously persisted accumulated value
    pub fn from_value(value: CurvePoint) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &CurvePoint {
        &self.0
    }

    /// Compute the accumulated value after adding `element`, without changing `self`.
    /// Deterministic given the current value and the element.
    pub fn compute_new_post_add(&self, element: &Fq) -> Result<CurvePoint, RevocationError> {
        // V + element * G
        self.0.add(&CurvePoint::generator().mul_scalar(element)?)
    }

    /// The accumulator with `element` folded in
    pub fn add(&self, element: &Fq) -> Result<Self, RevocationError> {
        Ok(Self(self.compute_new_post_add(element)?))
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::initialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_serialization;
    use ark_std::{
        rand::{rngs::StdRng, SeedableRng},
        UniformRand,
    };

    #[test]
    fn starts_at_identity() {
        let accumulator = Accumulator::initialize();
        assert!(accumulator.value().is_identity());
    }

    #[test]
    fn add_matches_direct_computation() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let mut accumulator = Accumulator::initialize();
        let mut expected = CurvePoint::identity();
        for _ in 0..10 {
            let element = Fq::rand(&mut rng);
            let computed = accumulator.compute_new_post_add(&element).unwrap();
            accumulator = accumulator.add(&element).unwrap();
            expected = expected
                .add(&CurvePoint::generator().mul_scalar(&element).unwrap())
                .unwrap();
            assert_eq!(computed, *accumulator.value());
            assert_eq!(expected, *accumulator.value());
        }
    }

    #[test]
    fn resumes_from_value() {
        let accumulator = Accumulator::initialize().add(&Fq::from(42u64)).unwrap();
        let resumed = Accumulator::from_value(*accumulator.value());
        assert_eq!(accumulator, resumed);
    }

    #[test]
    fn serialization() {
        let accumulator = Accumulator::initialize().add(&Fq::from(7u64)).unwrap();
        test_serialization!(Accumulator, accumulator);
    }
}
