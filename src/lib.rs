pub mod arithmetic;
pub mod config;
pub mod error;
pub mod kzg;
pub mod multilinear;
pub mod report;
pub mod srs;

#[cfg(test)]
mod tests;

pub use config::PcsConfig;
pub use error::{PcsError, Result};
pub use kzg::{
    BatchOpeningProof, Commitment, MultilinearKzgPcs, OpeningProof, PolynomialCommitmentScheme,
};
pub use multilinear::MultilinearPolynomial;
pub use report::{aggregate, Aggregate, PcsRow, PiopRow};
pub use srs::{ProverParam, UniversalParams, VerifierParam};

use ark_bls12_381::Bls12_381;
use ark_ec::pairing::Pairing;

/// Multilinear KZG over BLS12-381.
pub type Bls12MultilinearKzg = MultilinearKzgPcs<Bls12_381>;

/// Runs the setup described by `config` and trims it to `num_vars`.
///
/// The parameters come from a simulated trusted setup; see [`srs`].
pub fn setup_pcs<E: Pairing>(
    config: &PcsConfig,
    num_vars: usize,
) -> Result<(ProverParam<E>, VerifierParam<E>)> {
    config
        .install(|| config.universal_params::<E>(num_vars))??
        .trim(num_vars)
}

/// Commits to `poly` and opens it at `point` in one go, returning the
/// commitment, the proof and the evaluation.
pub fn commit_and_open<E: Pairing>(
    prover_param: &ProverParam<E>,
    poly: &MultilinearPolynomial<E::ScalarField>,
    point: &[E::ScalarField],
) -> Result<(Commitment<E>, OpeningProof<E>, E::ScalarField)> {
    let commitment = MultilinearKzgPcs::<E>::commit(prover_param, poly)?;
    let (proof, value) = MultilinearKzgPcs::<E>::open(prover_param, poly, point)?;
    Ok((commitment, proof, value))
}
