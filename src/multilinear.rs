//! Dense multilinear polynomials over `{0,1}^nv`.
//!
//! A polynomial is stored as its table of `2^nv` evaluations. Entry `i` holds
//! the value at the boolean point whose little-endian bits are the bits of `i`,
//! so variable 0 selects between the neighbouring entries `2j` and `2j + 1`.

use ark_ff::Field;
use ark_poly::DenseMultilinearExtension;
use rand::RngCore;
use rayon::prelude::*;

use crate::error::{PcsError, Result};

/// Tables at least this long are folded on the rayon pool.
const PARALLEL_FOLD_THRESHOLD: usize = 1 << 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultilinearPolynomial<F: Field> {
    num_vars: usize,
    evaluations: Vec<F>,
}

impl<F: Field> MultilinearPolynomial<F> {
    /// Builds a polynomial from its evaluation table. The table length must be
    /// a power of two.
    pub fn from_evaluations(evaluations: Vec<F>) -> Result<Self> {
        let len = evaluations.len();
        if !len.is_power_of_two() {
            return Err(PcsError::InvalidLength {
                expected: len.checked_next_power_of_two().unwrap_or(1),
                got: len,
            });
        }
        Ok(Self {
            num_vars: len.trailing_zeros() as usize,
            evaluations,
        })
    }

    pub fn zero(num_vars: usize) -> Self {
        Self {
            num_vars,
            evaluations: vec![F::zero(); 1 << num_vars],
        }
    }

    pub fn rand<R: RngCore>(num_vars: usize, rng: &mut R) -> Self {
        Self {
            num_vars,
            evaluations: (0..1usize << num_vars).map(|_| F::rand(rng)).collect(),
        }
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn evaluations(&self) -> &[F] {
        &self.evaluations
    }

    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    /// Evaluates the multilinear extension at an arbitrary point of `F^nv`.
    ///
    /// Each coordinate folds the table in half; after `nv` folds one value is
    /// left.
    pub fn evaluate(&self, point: &[F]) -> Result<F> {
        if point.len() != self.num_vars {
            return Err(PcsError::InvalidLength {
                expected: self.num_vars,
                got: point.len(),
            });
        }
        let mut table = self.evaluations.clone();
        for z in point {
            table = fold_table(&table, *z);
        }
        Ok(table[0])
    }

    /// One fold step on variable 0.
    ///
    /// Returns the polynomial with variable 0 fixed to `z` and the quotient
    /// `q = e1 - e0`, so that `f(X_0, rest) - f(z, rest) = (X_0 - z) · q(rest)`.
    pub fn fold(&self, z: F) -> Result<(Self, Self)> {
        if self.num_vars == 0 {
            return Err(PcsError::InvalidParameters(
                "cannot fold a polynomial with no variables".to_string(),
            ));
        }
        let (folded, quotient) = fold_with_quotient(&self.evaluations, z);
        let num_vars = self.num_vars - 1;
        Ok((
            Self {
                num_vars,
                evaluations: folded,
            },
            Self {
                num_vars,
                evaluations: quotient,
            },
        ))
    }

    pub fn fix_first_variable(&self, z: F) -> Result<Self> {
        self.fold(z).map(|(folded, _)| folded)
    }

    /// `Σ coeffs[j] · polys[j]`. All polynomials must share `num_vars`.
    pub fn linear_combination(polys: &[Self], coeffs: &[F]) -> Result<Self> {
        let first = polys.first().ok_or_else(|| {
            PcsError::InvalidParameters("empty linear combination".to_string())
        })?;
        if coeffs.len() != polys.len() {
            return Err(PcsError::InvalidLength {
                expected: polys.len(),
                got: coeffs.len(),
            });
        }
        let mut evaluations = vec![F::zero(); first.len()];
        for (poly, coeff) in polys.iter().zip(coeffs) {
            if poly.num_vars != first.num_vars {
                return Err(PcsError::InvalidLength {
                    expected: first.num_vars,
                    got: poly.num_vars,
                });
            }
            evaluations
                .par_iter_mut()
                .zip(poly.evaluations.par_iter())
                .for_each(|(acc, e)| *acc += *coeff * e);
        }
        Ok(Self {
            num_vars: first.num_vars,
            evaluations,
        })
    }
}

impl<F: Field> From<DenseMultilinearExtension<F>> for MultilinearPolynomial<F> {
    fn from(mle: DenseMultilinearExtension<F>) -> Self {
        Self {
            num_vars: mle.num_vars,
            evaluations: mle.evaluations,
        }
    }
}

impl<F: Field> From<&MultilinearPolynomial<F>> for DenseMultilinearExtension<F> {
    fn from(poly: &MultilinearPolynomial<F>) -> Self {
        DenseMultilinearExtension::from_evaluations_slice(poly.num_vars, &poly.evaluations)
    }
}

/// `t[2j] + z · (t[2j+1] - t[2j])` for every pair.
pub(crate) fn fold_table<F: Field>(table: &[F], z: F) -> Vec<F> {
    let fold = |pair: &[F]| pair[0] + z * (pair[1] - pair[0]);
    if table.len() >= PARALLEL_FOLD_THRESHOLD {
        table.par_chunks_exact(2).map(fold).collect()
    } else {
        table.chunks_exact(2).map(fold).collect()
    }
}

/// Fold plus the per-pair differences `t[2j+1] - t[2j]`.
pub(crate) fn fold_with_quotient<F: Field>(table: &[F], z: F) -> (Vec<F>, Vec<F>) {
    let step = |pair: &[F]| {
        let q = pair[1] - pair[0];
        (pair[0] + z * q, q)
    };
    if table.len() >= PARALLEL_FOLD_THRESHOLD {
        table.par_chunks_exact(2).map(step).unzip()
    } else {
        table.chunks_exact(2).map(step).unzip()
    }
}

/// Table of `eq(b, r) = Π_i (b_i r_i + (1 - b_i)(1 - r_i))` over `b ∈ {0,1}^|r|`,
/// indexed like evaluation tables (bit `i` of the index is `b_i`).
pub fn eq_table<F: Field>(r: &[F]) -> Vec<F> {
    let mut table = vec![F::one()];
    for r_i in r.iter().rev() {
        table = extend_eq_table(&table, *r_i);
    }
    table
}

/// Adds `r` as the new lowest variable of an eq table:
/// `new[2j] = old[j] · (1 - r)`, `new[2j+1] = old[j] · r`.
///
/// The output is written into a single allocation of its final size, so no
/// intermediate buffer holding entries is ever released.
pub(crate) fn extend_eq_table<F: Field>(table: &[F], r: F) -> Vec<F> {
    let one_minus_r = F::one() - r;
    let mut extended = vec![F::zero(); table.len() * 2];
    let split = |(pair, e): (&mut [F], &F)| {
        pair[0] = *e * one_minus_r;
        pair[1] = *e * r;
    };
    if table.len() >= PARALLEL_FOLD_THRESHOLD {
        extended.par_chunks_mut(2).zip(table.par_iter()).for_each(split);
    } else {
        extended.chunks_mut(2).zip(table.iter()).for_each(split);
    }
    extended
}
