//! Prints end-to-end prover time, verifier time and proof size for one `nv`
//! from the PIOP and multilinear KZG benchmark tables.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin pcs-report -- --piop hyperplonk/piop.csv --pcs poly_commit/mkzg.csv --nv 15
//! ```

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use multilinear_kzg::report::aggregate_files;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pcs-report")]
#[command(about = "Aggregate PIOP and commitment benchmark tables", long_about = None)]
struct Cli {
    /// Table with nv, prover_time, verifier_time, proof_size
    #[arg(long, default_value = "hyperplonk/piop.csv")]
    piop: PathBuf,

    /// Table with nv, commit_time, open_time, proof_size, verifier_time
    #[arg(long, default_value = "poly_commit/mkzg.csv")]
    pcs: PathBuf,

    /// Number of variables to report on
    #[arg(long, default_value_t = 15)]
    nv: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match aggregate_files(&cli.piop, &cli.pcs, cli.nv) {
        Ok(aggregate) => {
            println!("{}", aggregate);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "aggregation failed");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
