//! Multilinear KZG commitments.
//!
//! A commitment is `g^{f(τ)}`, computed as one MSM of the evaluation table
//! against level 0 of the prover key. Opening at `z` folds the table one
//! variable at a time; the `i`-th fold produces a quotient `q_i` with
//!
//! ```text
//! f(X) - f(z) = Σ_i (X_i - z_i) · q_i(X_{i+1}, .., X_{nv-1})
//! ```
//!
//! and the proof is the commitments `π_i = g^{q_i(τ)}`. The verifier checks
//!
//! ```text
//! e(C - v·g, h) = Π_i e(π_i, h^{τ_i} - z_i·h)
//! ```
//!
//! with a single multi-pairing.

use std::marker::PhantomData;

use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{One, PrimeField};
use merlin::Transcript;
use rayon::prelude::*;
use tracing::{debug, instrument, trace};

use crate::arithmetic::{
    from_canonical_bytes, g1_size, msm, pairing_product_is_one, scalar_from_bytes,
    scalar_size, scalar_to_bytes, to_canonical_bytes,
};
use crate::error::{PcsError, Result};
use crate::multilinear::{fold_with_quotient, MultilinearPolynomial};
use crate::srs::{ProverParam, VerifierParam};

/// A commitment scheme for polynomials over the scalar field of `E`.
pub trait PolynomialCommitmentScheme<E: Pairing> {
    type ProverParam;
    type VerifierParam;
    type Polynomial;
    type Commitment;
    type Proof;
    type BatchProof;

    fn commit(
        prover_param: &Self::ProverParam,
        poly: &Self::Polynomial,
    ) -> Result<Self::Commitment>;

    fn multi_commit(
        prover_param: &Self::ProverParam,
        polys: &[Self::Polynomial],
    ) -> Result<Vec<Self::Commitment>>;

    /// Returns a proof that `poly(point)` equals the returned value.
    fn open(
        prover_param: &Self::ProverParam,
        poly: &Self::Polynomial,
        point: &[E::ScalarField],
    ) -> Result<(Self::Proof, E::ScalarField)>;

    /// Opens several polynomials at the same point with one proof.
    fn batch_open(
        prover_param: &Self::ProverParam,
        polys: &[Self::Polynomial],
        commitments: &[Self::Commitment],
        point: &[E::ScalarField],
        transcript: &mut Transcript,
    ) -> Result<Self::BatchProof>;

    /// `Ok(false)` means the proof was well formed but does not convince the
    /// verifier; malformed input is an error.
    fn verify(
        verifier_param: &Self::VerifierParam,
        commitment: &Self::Commitment,
        point: &[E::ScalarField],
        value: &E::ScalarField,
        proof: &Self::Proof,
    ) -> Result<bool>;

    fn batch_verify(
        verifier_param: &Self::VerifierParam,
        commitments: &[Self::Commitment],
        point: &[E::ScalarField],
        batch_proof: &Self::BatchProof,
        transcript: &mut Transcript,
    ) -> Result<bool>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Commitment<E: Pairing>(pub E::G1Affine);

impl<E: Pairing> Commitment<E> {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        to_canonical_bytes(&self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        from_canonical_bytes(bytes, g1_size::<E>()).map(Self)
    }
}

/// Evaluation claim plus one G1 element per variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpeningProof<E: Pairing> {
    pub evaluation: E::ScalarField,
    pub proofs: Vec<E::G1Affine>,
}

impl<E: Pairing> OpeningProof<E> {
    pub fn num_vars(&self) -> usize {
        self.proofs.len()
    }

    /// Encoded size for `num_vars` variables: `num_vars · |G1| + |Fr|`.
    pub fn serialized_size(num_vars: usize) -> usize {
        num_vars * g1_size::<E>() + scalar_size::<E>()
    }

    /// The evaluation followed by each compressed G1 element. The length is not
    /// encoded; the reader supplies `num_vars`.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(Self::serialized_size(self.num_vars()));
        bytes.extend(scalar_to_bytes(&self.evaluation));
        for pi in &self.proofs {
            bytes.extend(to_canonical_bytes(pi)?);
        }
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8], num_vars: usize) -> Result<Self> {
        let expected = Self::serialized_size(num_vars);
        if bytes.len() != expected {
            return Err(PcsError::InvalidLength {
                expected,
                got: bytes.len(),
            });
        }
        let (evaluation, rest) = bytes.split_at(scalar_size::<E>());
        let g1_len = g1_size::<E>();
        Ok(Self {
            evaluation: scalar_from_bytes(evaluation)?,
            proofs: rest
                .chunks_exact(g1_len)
                .map(|chunk| from_canonical_bytes(chunk, g1_len))
                .collect::<Result<_>>()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOpeningProof<E: Pairing> {
    /// One claimed evaluation per opened polynomial.
    pub evaluations: Vec<E::ScalarField>,
    /// Opening of the random linear combination of the polynomials.
    pub proof: OpeningProof<E>,
}

pub struct MultilinearKzgPcs<E: Pairing> {
    _phantom: PhantomData<E>,
}

impl<E: Pairing> PolynomialCommitmentScheme<E> for MultilinearKzgPcs<E> {
    type ProverParam = ProverParam<E>;
    type VerifierParam = VerifierParam<E>;
    type Polynomial = MultilinearPolynomial<E::ScalarField>;
    type Commitment = Commitment<E>;
    type Proof = OpeningProof<E>;
    type BatchProof = BatchOpeningProof<E>;

    #[instrument(skip_all, fields(nv = poly.num_vars()))]
    fn commit(prover_param: &ProverParam<E>, poly: &Self::Polynomial) -> Result<Commitment<E>> {
        check_num_vars(prover_param.num_vars(), poly.num_vars())?;
        let commitment = msm::<E>(prover_param.level(0)?, poly.evaluations())?;
        Ok(Commitment(commitment.into_affine()))
    }

    #[instrument(skip_all, fields(count = polys.len()))]
    fn multi_commit(
        prover_param: &ProverParam<E>,
        polys: &[Self::Polynomial],
    ) -> Result<Vec<Commitment<E>>> {
        polys
            .par_iter()
            .map(|poly| Self::commit(prover_param, poly))
            .collect()
    }

    #[instrument(skip_all, fields(nv = poly.num_vars()))]
    fn open(
        prover_param: &ProverParam<E>,
        poly: &Self::Polynomial,
        point: &[E::ScalarField],
    ) -> Result<(OpeningProof<E>, E::ScalarField)> {
        check_num_vars(prover_param.num_vars(), poly.num_vars())?;
        check_num_vars(poly.num_vars(), point.len())?;

        let mut proofs = Vec::with_capacity(point.len());
        let mut folded: Option<Vec<E::ScalarField>> = None;
        for (i, z) in point.iter().enumerate() {
            let table = folded.as_deref().unwrap_or(poly.evaluations());
            let (next, quotient) = fold_with_quotient(table, *z);
            proofs.push(msm::<E>(prover_param.level(i + 1)?, &quotient)?);
            trace!(round = i, remaining = next.len(), "committed quotient");
            folded = Some(next);
        }
        let evaluation = folded.as_deref().unwrap_or(poly.evaluations())[0];

        let proof = OpeningProof {
            evaluation,
            proofs: E::G1::normalize_batch(&proofs),
        };
        Ok((proof, evaluation))
    }

    #[instrument(skip_all, fields(count = polys.len(), nv = point.len()))]
    fn batch_open(
        prover_param: &ProverParam<E>,
        polys: &[Self::Polynomial],
        commitments: &[Commitment<E>],
        point: &[E::ScalarField],
        transcript: &mut Transcript,
    ) -> Result<BatchOpeningProof<E>> {
        if polys.is_empty() {
            return Err(PcsError::InvalidParameters(
                "batch opening needs at least one polynomial".to_string(),
            ));
        }
        check_num_vars(polys.len(), commitments.len())?;

        let evaluations = polys
            .par_iter()
            .map(|poly| poly.evaluate(point))
            .collect::<Result<Vec<_>>>()?;
        let coeffs = batching_coefficients::<E>(transcript, commitments, point, &evaluations)?;
        let combined = MultilinearPolynomial::linear_combination(polys, &coeffs)?;
        let (proof, _) = Self::open(prover_param, &combined, point)?;

        Ok(BatchOpeningProof { evaluations, proof })
    }

    #[instrument(skip_all, fields(nv = point.len()))]
    fn verify(
        verifier_param: &VerifierParam<E>,
        commitment: &Commitment<E>,
        point: &[E::ScalarField],
        value: &E::ScalarField,
        proof: &OpeningProof<E>,
    ) -> Result<bool> {
        check_num_vars(verifier_param.num_vars(), point.len())?;
        check_num_vars(verifier_param.num_vars(), proof.num_vars())?;

        if proof.evaluation != *value {
            debug!("claimed value differs from the proof's evaluation");
            return Ok(false);
        }

        let h = verifier_param.h.into_group();
        let shifted_h: Vec<E::G2> = verifier_param
            .h_mask
            .iter()
            .zip(point)
            .map(|(h_tau, z)| h_tau.into_group() - h * z)
            .collect();

        let mut g1 = Vec::with_capacity(point.len() + 1);
        g1.push((commitment.0.into_group() - verifier_param.g * value).into_affine());
        let negated: Vec<E::G1> = proof.proofs.iter().map(|pi| -pi.into_group()).collect();
        g1.extend(E::G1::normalize_batch(&negated));

        let mut g2 = Vec::with_capacity(point.len() + 1);
        g2.push(verifier_param.h);
        g2.extend(E::G2::normalize_batch(&shifted_h));

        let accepted = pairing_product_is_one::<E>(g1, g2);
        if !accepted {
            debug!("pairing check failed");
        }
        Ok(accepted)
    }

    #[instrument(skip_all, fields(count = commitments.len(), nv = point.len()))]
    fn batch_verify(
        verifier_param: &VerifierParam<E>,
        commitments: &[Commitment<E>],
        point: &[E::ScalarField],
        batch_proof: &BatchOpeningProof<E>,
        transcript: &mut Transcript,
    ) -> Result<bool> {
        if commitments.is_empty() {
            return Err(PcsError::InvalidParameters(
                "batch verification needs at least one commitment".to_string(),
            ));
        }
        check_num_vars(commitments.len(), batch_proof.evaluations.len())?;

        let coeffs =
            batching_coefficients::<E>(transcript, commitments, point, &batch_proof.evaluations)?;
        let bases: Vec<E::G1Affine> = commitments.iter().map(|c| c.0).collect();
        let combined_commitment = Commitment(msm::<E>(&bases, &coeffs)?.into_affine());
        let combined_value: E::ScalarField = coeffs
            .iter()
            .zip(batch_proof.evaluations.iter())
            .map(|(c, v)| *c * v)
            .sum();

        Self::verify(
            verifier_param,
            &combined_commitment,
            point,
            &combined_value,
            &batch_proof.proof,
        )
    }
}

fn check_num_vars(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(PcsError::InvalidLength { expected, got });
    }
    Ok(())
}

/// Absorbs the batch statement and returns `1, γ, γ^2, ..` for the linear
/// combination.
fn batching_coefficients<E: Pairing>(
    transcript: &mut Transcript,
    commitments: &[Commitment<E>],
    point: &[E::ScalarField],
    evaluations: &[E::ScalarField],
) -> Result<Vec<E::ScalarField>> {
    transcript.append_message(b"dom-sep", b"multilinear-kzg-batch");
    transcript.append_u64(b"num_vars", point.len() as u64);
    for commitment in commitments {
        transcript.append_message(b"commitment", &commitment.to_bytes()?);
    }
    for z in point {
        transcript.append_message(b"point", &scalar_to_bytes(z));
    }
    for v in evaluations {
        transcript.append_message(b"evaluation", &scalar_to_bytes(v));
    }

    let mut challenge_bytes = [0u8; 64];
    transcript.challenge_bytes(b"gamma", &mut challenge_bytes);
    let gamma = E::ScalarField::from_le_bytes_mod_order(&challenge_bytes);

    let mut power = E::ScalarField::one();
    Ok((0..commitments.len())
        .map(|_| {
            let current = power;
            power *= gamma;
            current
        })
        .collect())
}
