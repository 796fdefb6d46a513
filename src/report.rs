//! Aggregates benchmark tables into end-to-end prover/verifier figures.
//!
//! Two tables are combined: the PIOP table (prover and verifier time and proof
//! size of the interactive part) and the commitment table produced by the
//! multilinear KZG benchmark. Units are whatever the producing benchmarks used;
//! they only need to agree between the two tables.

use std::{fmt, fs::File, io::Read, path::Path};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::error::{PcsError, Result};

pub const PIOP_TABLE: &str = "piop";
pub const PCS_TABLE: &str = "mkzg";

/// Commitments made per proof, against a single opening.
pub const COMMITMENTS_PER_PROOF: f64 = 3.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PiopRow {
    pub nv: usize,
    pub prover_time: f64,
    pub verifier_time: f64,
    pub proof_size: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PcsRow {
    pub nv: usize,
    pub commit_time: f64,
    pub open_time: f64,
    pub proof_size: f64,
    pub verifier_time: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Aggregate {
    pub prover_time: f64,
    pub verifier_time: f64,
    pub proof_size: f64,
}

/// Reads a headered CSV table. Columns are matched by name.
pub fn read_table<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .map(|row| row.map_err(PcsError::from))
        .collect()
}

pub fn load_table<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PcsError::MissingFile(path.to_path_buf()));
    }
    let rows = read_table(File::open(path)?)?;
    debug!(path = %path.display(), rows = rows.len(), "loaded table");
    Ok(rows)
}

pub fn load_piop_table(path: impl AsRef<Path>) -> Result<Vec<PiopRow>> {
    load_table(path)
}

pub fn load_pcs_table(path: impl AsRef<Path>) -> Result<Vec<PcsRow>> {
    load_table(path)
}

/// Combines the rows for `nv`:
///
/// - prover time: PIOP prover + 3 commits + 1 opening
/// - verifier time: PIOP verifier + opening verifier
/// - proof size: PIOP proof + opening proof
pub fn aggregate(piop: &[PiopRow], pcs: &[PcsRow], nv: usize) -> Result<Aggregate> {
    let piop_row = piop
        .iter()
        .find(|row| row.nv == nv)
        .ok_or(PcsError::MissingRow {
            table: PIOP_TABLE,
            nv,
        })?;
    let pcs_row = pcs
        .iter()
        .find(|row| row.nv == nv)
        .ok_or(PcsError::MissingRow { table: PCS_TABLE, nv })?;

    check_finite(PIOP_TABLE, "prover_time", piop_row.prover_time)?;
    check_finite(PIOP_TABLE, "verifier_time", piop_row.verifier_time)?;
    check_finite(PIOP_TABLE, "proof_size", piop_row.proof_size)?;
    check_finite(PCS_TABLE, "commit_time", pcs_row.commit_time)?;
    check_finite(PCS_TABLE, "open_time", pcs_row.open_time)?;
    check_finite(PCS_TABLE, "verifier_time", pcs_row.verifier_time)?;
    check_finite(PCS_TABLE, "proof_size", pcs_row.proof_size)?;

    Ok(Aggregate {
        prover_time: piop_row.prover_time
            + pcs_row.commit_time * COMMITMENTS_PER_PROOF
            + pcs_row.open_time,
        verifier_time: piop_row.verifier_time + pcs_row.verifier_time,
        proof_size: piop_row.proof_size + pcs_row.proof_size,
    })
}

fn check_finite(table: &str, column: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(PcsError::InvalidParameters(format!(
            "{} table: {} is {}",
            table, column, value
        )));
    }
    Ok(())
}

pub fn aggregate_files(
    piop_path: impl AsRef<Path>,
    pcs_path: impl AsRef<Path>,
    nv: usize,
) -> Result<Aggregate> {
    let piop = load_piop_table(piop_path)?;
    let pcs = load_pcs_table(pcs_path)?;
    aggregate(&piop, &pcs, nv)
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "prover time: {}", round_to_nanos(self.prover_time))?;
        writeln!(f, "verifier time: {}", round_to_nanos(self.verifier_time))?;
        write!(f, "proof size: {}", round_to_nanos(self.proof_size))
    }
}

/// Drops binary floating point noise such as `0.30000000000000004`.
fn round_to_nanos(x: f64) -> f64 {
    (x * 1e9).round() / 1e9
}
