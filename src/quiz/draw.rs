use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of the simulated opponent's per-question roll.
pub trait ScoreDraw {
    /// A uniform value in `[0, 100)`.
    fn draw_percent(&mut self) -> f64;
}

impl<D: ScoreDraw + ?Sized> ScoreDraw for &mut D {
    fn draw_percent(&mut self) -> f64 {
        (**self).draw_percent()
    }
}

#[derive(Debug, Clone)]
pub struct RandomDraw {
    rng: ChaCha8Rng,
}

impl RandomDraw {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl ScoreDraw for RandomDraw {
    fn draw_percent(&mut self) -> f64 {
        self.rng.gen_range(0.0..100.0)
    }
}
