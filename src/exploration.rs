use rand::Rng;

use crate::decay::Decay;

/// Exploration policy result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// The epsilon threshold after `episode` completed episodes
    pub fn epsilon(&self, episode: u32) -> f32 {
        self.epsilon.evaluate(episode as f32)
    }

    /// Invoke epsilon greedy policy for current episode
    pub fn choose<R: Rng + ?Sized>(&self, episode: u32, rng: &mut R) -> Choice {
        roll(self.epsilon(episode), rng)
    }
}

impl<D: Decay + Default> Default for EpsilonGreedy<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

/// Explore with probability `epsilon`, exploit otherwise
///
/// An `epsilon` of `0.0` never explores and `1.0` always does.
pub fn roll<R: Rng + ?Sized>(epsilon: f32, rng: &mut R) -> Choice {
    if rng.gen::<f32>() < epsilon {
        Choice::Explore
    } else {
        Choice::Exploit
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::decay::Linear;

    #[test]
    fn extremes_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            assert_eq!(roll(0.0, &mut rng), Choice::Exploit);
            assert_eq!(roll(1.0, &mut rng), Choice::Explore);
        }
    }

    #[test]
    fn explore_rate_tracks_epsilon() {
        let mut rng = StdRng::seed_from_u64(11);
        let explored = (0..10_000)
            .filter(|_| roll(0.25, &mut rng) == Choice::Explore)
            .count();
        assert!((2_200..2_800).contains(&explored), "explored {explored} times");
    }

    #[test]
    fn policy_follows_schedule() {
        let policy = EpsilonGreedy::new(Linear::new(10.0, 1.0, 0.0).unwrap());
        assert_eq!(policy.epsilon(0), 1.0);
        assert_eq!(policy.epsilon(5), 0.5);
        assert_eq!(policy.epsilon(10), 0.0);

        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(policy.choose(0, &mut rng), Choice::Explore);
        assert_eq!(policy.choose(10, &mut rng), Choice::Exploit);
    }
}
