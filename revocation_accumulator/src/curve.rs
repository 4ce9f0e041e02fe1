//! Arithmetic on the fixed twisted Edwards curve `a*x^2 + y^2 = 1 + d*x^2*y^2` over the BN254
//! scalar field (Baby Jubjub). The curve is chosen for its complete addition law, which suits
//! later circuit-based proof construction: the same formulas evaluate for every pair of valid
//! points, including doubling and the identity.
//!
//! Curve constants are fixed, process-wide and never mutated. All operations return new points.

use ark_ff::{BigInteger, Field, MontFp, One, PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use dock_crypto_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::Zeroize;

use crate::error::RevocationError;

/// Coordinate and scalar field. The modulus is
/// 21888242871839275222246405745257275088548364400416034343698204186575808495617.
pub type Fq = ark_bn254::Fr;

/// Curve coefficient `a`
pub const COEFF_A: Fq = MontFp!("168700");

/// Curve coefficient `d`
pub const COEFF_D: Fq = MontFp!("168696");

const GENERATOR_X: Fq =
    MontFp!("5299619240641551281634865583518297030282874472190772894086521144482721001553");
const GENERATOR_Y: Fq =
    MontFp!("16950150798460657717958625567821834550301663161624707787222815936182638968203");

/// A validated point on the curve. Construction through [`CurvePoint::new`] checks the curve
/// equation, so arithmetic can assume both operands are valid.
#[serde_as]
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
    Zeroize,
)]
pub struct CurvePoint {
    #[serde_as(as = "ArkObjectBytes")]
    pub x: Fq,
    #[serde_as(as = "ArkObjectBytes")]
    pub y: Fq,
}

impl CurvePoint {
    /// Create a point after checking it lies on the curve
    pub fn new(x: Fq, y: Fq) -> Result<Self, RevocationError> {
        if !Self::is_on_curve(&x, &y) {
            return Err(RevocationError::InvalidInput);
        }
        Ok(Self { x, y })
    }

    /// The identity element (0, 1)
    pub fn identity() -> Self {
        Self {
            x: MontFp!("0"),
            y: MontFp!("1"),
        }
    }

    /// The fixed generator G
    pub fn generator() -> Self {
        Self {
            x: GENERATOR_X,
            y: GENERATOR_Y,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.x.is_zero() && self.y.is_one()
    }

    /// Check `a*x^2 + y^2 == 1 + d*x^2*y^2`
    pub fn is_on_curve(x: &Fq, y: &Fq) -> bool {
        let x2 = x.square();
        let y2 = y.square();
        COEFF_A * x2 + y2 == Fq::one() + COEFF_D * x2 * y2
    }

    /// Unified twisted-Edwards addition:
    /// `x3 = (x1*y2 + y1*x2) / (1 + d*x1*x2*y1*y2)`,
    /// `y3 = (y1*y2 - a*x1*x2) / (1 - d*x1*x2*y1*y2)`.
    ///
    /// The denominators are non-zero for every pair of points on the curve; a zero denominator
    /// is reported as [`RevocationError::ArithmeticSingularity`] and means an operand was
    /// constructed outside the checked path.
    pub fn add(&self, other: &CurvePoint) -> Result<CurvePoint, RevocationError> {
        let x1x2 = self.x * other.x;
        let y1y2 = self.y * other.y;
        let cross = self.x * other.y + self.y * other.x;
        let dxxyy = COEFF_D * x1x2 * y1y2;

        let x_den_inv = (Fq::one() + dxxyy)
            .inverse()
            .ok_or(RevocationError::ArithmeticSingularity)?;
        let y_den_inv = (Fq::one() - dxxyy)
            .inverse()
            .ok_or(RevocationError::ArithmeticSingularity)?;

        Ok(CurvePoint {
            x: cross * x_den_inv,
            y: (y1y2 - COEFF_A * x1x2) * y_den_inv,
        })
    }

    /// Double a point. The unified law covers doubling.
    pub fn double(&self) -> Result<CurvePoint, RevocationError> {
        self.add(self)
    }

    /// Scalar multiplication by double-and-add, scanning the scalar's bits from least to most
    /// significant: accumulate the base into the result on set bits, double the base each
    /// iteration. O(log k) point additions for scalar k.
    pub fn mul_scalar(&self, scalar: &Fq) -> Result<CurvePoint, RevocationError> {
        let mut result = CurvePoint::identity();
        let mut base = *self;
        let bits = scalar.into_bigint().to_bits_le();
        let top = match bits.iter().rposition(|bit| *bit) {
            Some(top) => top,
            None => return Ok(result),
        };
        for bit in &bits[..top] {
            if *bit {
                result = result.add(&base)?;
            }
            base = base.double()?;
        }
        result.add(&base)
    }
}
