//! Structured reference strings for multilinear KZG.
//!
//! For a secret point `τ = (τ_0, .., τ_{N-1})` the universal parameters hold,
//! for every level `k = 0..=N`, the group elements `g^{eq(b, (τ_k, .., τ_{N-1}))}`
//! for all `b ∈ {0,1}^{N-k}`, together with `h^{τ_i}` in G2. Level 0 commits to
//! full polynomials, level `k + 1` commits to the quotient produced by the
//! `k`-th fold of an opening.
//!
//! WARNING: parameters produced here come from a simulated trusted setup. They
//! are fine for tests and benchmarks and must not back production deployments.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use ark_ec::{pairing::Pairing, CurveGroup};
use ark_ff::{Field, One, UniformRand};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand::{rngs::OsRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, instrument};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::arithmetic::batch_scalar_mul;
use crate::error::{PcsError, Result};
use crate::multilinear::extend_eq_table;

/// Largest number of variables a setup will accept.
pub const MAX_NUM_VARS: usize = 28;

/// The secret evaluation point of a simulated setup.
///
/// Only constructed inside this module and wiped when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct Trapdoor<F: Field> {
    tau: Vec<F>,
}

impl<F: Field> Trapdoor<F> {
    fn sample<R: RngCore>(num_vars: usize, rng: &mut R) -> Self {
        Self {
            tau: (0..num_vars).map(|_| F::rand(rng)).collect(),
        }
    }

    fn num_vars(&self) -> usize {
        self.tau.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct UniversalParams<E: Pairing> {
    num_vars: usize,
    g: E::G1Affine,
    h: E::G2Affine,
    /// `powers_of_g[k]` holds `2^(num_vars - k)` elements.
    powers_of_g: Vec<Vec<E::G1Affine>>,
    /// `h^{τ_i}` for every variable.
    h_mask: Vec<E::G2Affine>,
}

/// Commit key for polynomials in exactly `num_vars` variables.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct ProverParam<E: Pairing> {
    pub(crate) num_vars: usize,
    pub(crate) g: E::G1Affine,
    pub(crate) powers_of_g: Vec<Vec<E::G1Affine>>,
}

/// Verification key for polynomials in exactly `num_vars` variables.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct VerifierParam<E: Pairing> {
    pub(crate) num_vars: usize,
    pub(crate) g: E::G1Affine,
    pub(crate) h: E::G2Affine,
    pub(crate) h_mask: Vec<E::G2Affine>,
}

impl<E: Pairing> UniversalParams<E> {
    /// Simulated setup driven by `rng`.
    #[instrument(skip_all, fields(nv = num_vars))]
    pub fn gen_srs_for_testing<R: RngCore>(rng: &mut R, num_vars: usize) -> Result<Self> {
        if num_vars > MAX_NUM_VARS {
            return Err(PcsError::InvalidParameters(format!(
                "setup supports at most {} variables, requested {}",
                MAX_NUM_VARS, num_vars
            )));
        }
        let g = E::G1::rand(rng);
        let h = E::G2::rand(rng);
        let trapdoor = Trapdoor::sample(num_vars, rng);
        Ok(Self::from_trapdoor(trapdoor, g, h))
    }

    /// Reproducible setup: the same seed always yields the same parameters.
    pub fn from_seed(seed: u64, num_vars: usize) -> Result<Self> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        Self::gen_srs_for_testing(&mut rng, num_vars)
    }

    /// Setup driven by the operating system's random source.
    pub fn setup(num_vars: usize) -> Result<Self> {
        Self::gen_srs_for_testing(&mut OsRng, num_vars)
    }

    /// Consumes the trapdoor; it is wiped when this function returns, as are
    /// the intermediate eq tables derived from it.
    fn from_trapdoor(trapdoor: Trapdoor<E::ScalarField>, g: E::G1, h: E::G2) -> Self {
        let num_vars = trapdoor.num_vars();

        let mut table = Zeroizing::new(vec![E::ScalarField::one()]);
        let mut powers_of_g = Vec::with_capacity(num_vars + 1);
        powers_of_g.push(batch_scalar_mul(g, &table));
        for tau_k in trapdoor.tau.iter().rev() {
            table = Zeroizing::new(extend_eq_table(&table, *tau_k));
            powers_of_g.push(batch_scalar_mul(g, &table));
        }
        powers_of_g.reverse();

        let h_mask = batch_scalar_mul(h, &trapdoor.tau);
        debug!(levels = powers_of_g.len(), "generated universal parameters");

        Self {
            num_vars,
            g: g.into_affine(),
            h: h.into_affine(),
            powers_of_g,
            h_mask,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Specializes the parameters to polynomials in `num_vars` variables.
    ///
    /// Uses the last `num_vars` secret coordinates, so any `num_vars` up to the
    /// setup size is supported.
    #[instrument(skip_all, fields(nv = num_vars))]
    pub fn trim(&self, num_vars: usize) -> Result<(ProverParam<E>, VerifierParam<E>)> {
        if num_vars > self.num_vars {
            return Err(PcsError::InvalidParameters(format!(
                "parameters support {} variables, requested {}",
                self.num_vars, num_vars
            )));
        }
        let offset = self.num_vars - num_vars;
        let prover_param = ProverParam {
            num_vars,
            g: self.g,
            powers_of_g: self.powers_of_g[offset..].to_vec(),
        };
        let verifier_param = VerifierParam {
            num_vars,
            g: self.g,
            h: self.h,
            h_mask: self.h_mask[offset..].to_vec(),
        };
        Ok((prover_param, verifier_param))
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        self.serialize_compressed(writer)?;
        Ok(())
    }

    /// Reads parameters written by [`UniversalParams::write`]. Every group
    /// element is checked, as is the level layout.
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let params = Self::deserialize_compressed(reader)?;
        params.check_layout()?;
        Ok(params)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PcsError::MissingFile(path.to_path_buf()));
        }
        Self::read(BufReader::new(File::open(path)?))
    }

    fn check_layout(&self) -> Result<()> {
        if self.num_vars > MAX_NUM_VARS {
            return Err(PcsError::InvalidParameters(format!(
                "parameters claim {} variables",
                self.num_vars
            )));
        }
        check_len(self.num_vars + 1, self.powers_of_g.len())?;
        check_len(self.num_vars, self.h_mask.len())?;
        for (k, level) in self.powers_of_g.iter().enumerate() {
            check_len(1 << (self.num_vars - k), level.len())?;
        }
        Ok(())
    }
}

impl<E: Pairing> ProverParam<E> {
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn g(&self) -> E::G1Affine {
        self.g
    }

    /// Bases for tables in `num_vars - level` variables.
    pub(crate) fn level(&self, level: usize) -> Result<&[E::G1Affine]> {
        self.powers_of_g
            .get(level)
            .map(Vec::as_slice)
            .ok_or(PcsError::InvalidLength {
                expected: level + 1,
                got: self.powers_of_g.len(),
            })
    }
}

impl<E: Pairing> VerifierParam<E> {
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn g(&self) -> E::G1Affine {
        self.g
    }

    pub fn h(&self) -> E::G2Affine {
        self.h
    }
}

fn check_len(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(PcsError::InvalidLength { expected, got });
    }
    Ok(())
}
