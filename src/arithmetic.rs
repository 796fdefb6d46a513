//! Scalar field and curve group helpers shared by setup, commit, open and verify.
//!
//! Field and group arithmetic itself comes from arkworks; this module adds the
//! checked operations, canonical encodings and parallel kernels the engine needs
//! on top of it.

use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::{Field, One, PrimeField, UniformRand, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::RngCore;
use rayon::prelude::*;

use crate::error::{PcsError, Result};

/// Number of bases handled by a single MSM task.
pub const MSM_CHUNK_SIZE: usize = 1 << 12;

/// Multiplicative inverse, failing on zero.
pub fn inverse<F: Field>(x: &F) -> Result<F> {
    x.inverse().ok_or(PcsError::DivisionByZero)
}

/// Montgomery batch inversion. Either every element is inverted or none is.
pub fn batch_inverse<F: Field>(xs: &[F]) -> Result<Vec<F>> {
    if xs.iter().any(|x| x.is_zero()) {
        return Err(PcsError::DivisionByZero);
    }
    let mut inverses = xs.to_vec();
    ark_ff::batch_inversion(&mut inverses);
    Ok(inverses)
}

pub fn random_scalars<F: UniformRand, R: RngCore>(n: usize, rng: &mut R) -> Vec<F> {
    (0..n).map(|_| F::rand(rng)).collect()
}

/// Byte length of a canonically encoded scalar.
pub fn scalar_size<E: Pairing>() -> usize {
    E::ScalarField::zero().compressed_size()
}

/// Byte length of a compressed G1 element.
pub fn g1_size<E: Pairing>() -> usize {
    E::G1Affine::generator().compressed_size()
}

/// Byte length of a compressed G2 element.
pub fn g2_size<E: Pairing>() -> usize {
    E::G2Affine::generator().compressed_size()
}

/// Little-endian canonical encoding of a scalar.
pub fn scalar_to_bytes<F: PrimeField>(x: &F) -> Vec<u8> {
    use ark_ff::BigInteger;
    x.into_bigint().to_bytes_le()
}

/// Decodes a scalar, rejecting short input and values outside `[0, r)`.
pub fn scalar_from_bytes<F: PrimeField>(bytes: &[u8]) -> Result<F> {
    from_canonical_bytes(bytes, F::zero().compressed_size())
}

pub fn g1_to_bytes<E: Pairing>(p: &E::G1Affine) -> Result<Vec<u8>> {
    to_canonical_bytes(p)
}

/// Decodes a compressed G1 element, checking it is on the curve and in the
/// prime-order subgroup.
pub fn g1_from_bytes<E: Pairing>(bytes: &[u8]) -> Result<E::G1Affine> {
    from_canonical_bytes(bytes, g1_size::<E>())
}

pub fn g2_to_bytes<E: Pairing>(p: &E::G2Affine) -> Result<Vec<u8>> {
    to_canonical_bytes(p)
}

pub fn g2_from_bytes<E: Pairing>(bytes: &[u8]) -> Result<E::G2Affine> {
    from_canonical_bytes(bytes, g2_size::<E>())
}

pub(crate) fn to_canonical_bytes<T: CanonicalSerialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(value.compressed_size());
    value.serialize_compressed(&mut bytes)?;
    Ok(bytes)
}

pub(crate) fn from_canonical_bytes<T: CanonicalDeserialize>(
    bytes: &[u8],
    expected_len: usize,
) -> Result<T> {
    if bytes.len() != expected_len {
        return Err(PcsError::InvalidEncoding(format!(
            "expected {} bytes, got {}",
            expected_len,
            bytes.len()
        )));
    }
    T::deserialize_compressed(bytes).map_err(|e| PcsError::InvalidEncoding(e.to_string()))
}

/// Multi-scalar multiplication `Σ scalars[i] · bases[i]`.
///
/// The bases are split into chunks of [`MSM_CHUNK_SIZE`] that are reduced on
/// the rayon pool. Group addition is exact, so the result does not depend on
/// how many workers take part. Zero scalars are not filtered out beforehand.
pub fn msm<E: Pairing>(bases: &[E::G1Affine], scalars: &[E::ScalarField]) -> Result<E::G1> {
    if bases.len() != scalars.len() {
        return Err(PcsError::InvalidLength {
            expected: bases.len(),
            got: scalars.len(),
        });
    }
    Ok(bases
        .par_chunks(MSM_CHUNK_SIZE)
        .zip(scalars.par_chunks(MSM_CHUNK_SIZE))
        .map(|(bases, scalars)| E::G1::msm_unchecked(bases, scalars))
        .reduce(E::G1::zero, |acc, part| acc + part))
}

/// Fixed-base multiplication of `base` by every scalar, returned in affine form.
pub fn batch_scalar_mul<G: CurveGroup>(base: G, scalars: &[G::ScalarField]) -> Vec<G::Affine> {
    let projective: Vec<G> = scalars.par_iter().map(|s| base * s).collect();
    G::normalize_batch(&projective)
}

/// Checks `Π e(g1[i], g2[i]) == 1` in the target group with one multi-pairing.
pub fn pairing_product_is_one<E: Pairing>(g1: Vec<E::G1Affine>, g2: Vec<E::G2Affine>) -> bool {
    g1.len() == g2.len() && E::multi_pairing(g1, g2).0.is_one()
}
