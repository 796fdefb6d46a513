//! Runtime configuration: worker threads and setup randomness.

use ark_ec::pairing::Pairing;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::{PcsError, Result};
use crate::srs::UniversalParams;

/// Worker thread count for the engine's internal parallelism.
pub const NUM_THREADS_ENV: &str = "RAYON_NUM_THREADS";
/// Seed for a reproducible simulated setup.
pub const SRS_SEED_ENV: &str = "PCS_SRS_SEED";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PcsConfig {
    /// `None` uses every available core.
    pub num_threads: Option<usize>,
    /// `None` draws the setup trapdoor from the operating system.
    pub srs_seed: Option<u64>,
}

impl PcsConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from any key-value source shaped like the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let num_threads = match lookup(NUM_THREADS_ENV) {
            Some(raw) => match parse_var::<usize>(NUM_THREADS_ENV, &raw)? {
                0 => None,
                n => Some(n),
            },
            None => None,
        };
        let srs_seed = lookup(SRS_SEED_ENV)
            .map(|raw| parse_var::<u64>(SRS_SEED_ENV, &raw))
            .transpose()?;

        let config = Self {
            num_threads,
            srs_seed,
        };
        debug!(?config, "loaded configuration");
        Ok(config)
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = (num_threads > 0).then_some(num_threads);
        self
    }

    pub fn with_srs_seed(mut self, seed: u64) -> Self {
        self.srs_seed = Some(seed);
        self
    }

    pub fn thread_pool(&self) -> Result<ThreadPool> {
        let mut builder = ThreadPoolBuilder::new();
        if let Some(n) = self.num_threads {
            builder = builder.num_threads(n);
        }
        Ok(builder.build()?)
    }

    /// Runs `op` on a pool sized by this configuration.
    pub fn install<T, OP>(&self, op: OP) -> Result<T>
    where
        T: Send,
        OP: FnOnce() -> T + Send,
    {
        Ok(self.thread_pool()?.install(op))
    }

    /// Seeded or OS-random setup, as configured.
    pub fn universal_params<E: Pairing>(&self, num_vars: usize) -> Result<UniversalParams<E>> {
        match self.srs_seed {
            Some(seed) => UniversalParams::from_seed(seed, num_vars),
            None => UniversalParams::setup(num_vars),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        PcsError::InvalidParameters(format!("{} must be an unsigned integer, got {:?}", key, raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::Bls12_381;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = PcsConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PcsConfig::default());
    }

    #[test]
    fn test_reads_threads_and_seed() {
        let config =
            PcsConfig::from_lookup(lookup(&[(NUM_THREADS_ENV, "1"), (SRS_SEED_ENV, " 42 ")]))
                .unwrap();
        assert_eq!(config.num_threads, Some(1));
        assert_eq!(config.srs_seed, Some(42));

        let config = PcsConfig::from_lookup(lookup(&[(NUM_THREADS_ENV, "0")])).unwrap();
        assert_eq!(config.num_threads, None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            PcsConfig::from_lookup(lookup(&[(NUM_THREADS_ENV, "many")])),
            Err(PcsError::InvalidParameters(_))
        ));
        assert!(matches!(
            PcsConfig::from_lookup(lookup(&[(SRS_SEED_ENV, "-3")])),
            Err(PcsError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_thread_pool_size() {
        let config = PcsConfig::default().with_num_threads(2);
        assert_eq!(config.thread_pool().unwrap().current_num_threads(), 2);
        assert_eq!(config.install(rayon::current_num_threads).unwrap(), 2);
        assert_eq!(PcsConfig::default().with_num_threads(0).num_threads, None);
    }

    #[test]
    fn test_seeded_params_follow_config() {
        let config = PcsConfig::default().with_srs_seed(5);
        let a = config.universal_params::<Bls12_381>(2).unwrap();
        let b = UniversalParams::<Bls12_381>::from_seed(5, 2).unwrap();
        assert_eq!(a, b);
    }
}
