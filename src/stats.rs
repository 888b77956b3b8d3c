/// Number of trailing episodes averaged by [`EpisodeStats::smoothed_steps`] and friends
pub const SMOOTHING_WINDOW: usize = 100;

/// Step count and total reward of every finished episode, in episode order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeStats {
    steps: Vec<usize>,
    rewards: Vec<f32>,
}

impl EpisodeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, steps: usize, reward: f32) {
        self.steps.push(steps);
        self.rewards.push(reward);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Mean step count of the last `n` episodes
    pub fn mean_steps(&self, n: usize) -> Option<f64> {
        let tail = &self.steps[self.steps.len().saturating_sub(n)..];
        mean(tail.iter().map(|&s| s as f64))
    }

    /// Mean reward of the last `n` episodes
    pub fn mean_reward(&self, n: usize) -> Option<f64> {
        let tail = &self.rewards[self.rewards.len().saturating_sub(n)..];
        mean(tail.iter().map(|&r| r as f64))
    }

    /// Trailing average of the step counts, see [`moving_average`]
    pub fn smoothed_steps(&self, window: usize) -> Vec<f64> {
        let steps: Vec<f64> = self.steps.iter().map(|&s| s as f64).collect();
        moving_average(&steps, window)
    }

    /// Trailing average of the rewards, see [`moving_average`]
    pub fn smoothed_rewards(&self, window: usize) -> Vec<f64> {
        let rewards: Vec<f64> = self.rewards.iter().map(|&r| r as f64).collect();
        moving_average(&rewards, window)
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let n = values.len();
    (n > 0).then(|| values.sum::<f64>() / n as f64)
}

/// Element `t` is the mean of `values[t - window ..= t]`, clipped at the start
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let mut sum = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(t, &v)| {
            sum += v;
            let start = t.saturating_sub(window);
            if t > window {
                sum -= values[start - 1];
            }
            sum / (t - start + 1) as f64
        })
        .collect()
}
