use ark_serialize::SerializationError;

#[derive(Debug)]
pub enum RevocationError {
    /// Malformed input: the zero device identifier or an off-curve point. Rejected before any
    /// state is touched.
    InvalidInput,
    /// The device identifier has never been registered
    DeviceNotFound,
    /// The device identifier is already registered
    AlreadyRegistered,
    /// The device is already revoked. Revocation is terminal in this accumulator.
    AlreadyRevoked,
    /// A stored witness does not satisfy the witness equation against the current accumulator.
    /// Fatal to the request being built; signals a bug elsewhere, never retried or auto-corrected.
    WitnessInconsistent,
    /// Zero denominator in the twisted-Edwards addition law. Cannot happen for points on the
    /// curve; indicates malformed caller-supplied points or scalars.
    ArithmeticSingularity,
    /// The external prover failed to produce a proof
    ProofGeneration,
    Serialization(SerializationError),
}

impl From<SerializationError> for RevocationError {
    fn from(e: SerializationError) -> Self {
        Self::Serialization(e)
    }
}
