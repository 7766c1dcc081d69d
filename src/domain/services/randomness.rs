use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// Source of uniform values in `[0, 1)` driving the simulated upload timings.
pub trait RandomSource: Send + Sync {
    fn next_f64(&self) -> f64;
}

#[derive(Default)]
pub struct ThreadRandom {}

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        return rand::thread_rng().gen::<f64>();
    }
}

/// Reproducible sequence for demos started with a fixed seed.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> SeededRandom {
        return SeededRandom {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        };
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        return rng.gen::<f64>();
    }
}
