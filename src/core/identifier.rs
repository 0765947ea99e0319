use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Produces `<name>-<16 hex chars>` service identifiers.
///
/// Uniqueness is probabilistic only: nothing checks generated ids against
/// each other or against the registry.
#[derive(Debug)]
pub struct IdGenerator {
    rng: StdRng,
}

impl IdGenerator {
    /// Seeds from the current wall clock, once per process.
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn service_id(&mut self, service_name: &str) -> String {
        format!("{}-{:016x}", service_name, self.rng.gen::<u64>())
    }
}
