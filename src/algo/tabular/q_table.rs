use std::marker::PhantomData;

use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    assert_interval,
    decay::Linear,
    ds::q_table::{QTable, Shape},
    env::{BoxObservationSpace, DiscreteActionSpace, Step},
    error::{Error, Result},
    exp::Exp,
    exploration::{self, Choice, EpsilonGreedy},
    stats::{EpisodeStats, SMOOTHING_WINDOW},
};

/// Whether the agent learns from its episodes or only plays them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Explore with the epsilon schedule and update the table after every step
    #[default]
    Train,
    /// Act greedily and leave the table untouched
    Evaluate,
}

/// Configuration for the [`QTableAgent`]
#[derive(Debug, Clone)]
pub struct QTableAgentConfig {
    /// Epsilon schedule, evaluated at the number of completed episodes
    ///
    /// **Default**: linear from `1.0` to `0.0` over one episode,
    /// see [`QTableAgentConfig::for_episodes`]
    pub exploration: EpsilonGreedy<Linear>,
    /// Learning rate, in `[0, 1]`
    ///
    /// **Default**: `0.9`
    pub alpha: f32,
    /// Discount factor, in `[0, 1]`
    ///
    /// **Default**: `0.9`
    pub gamma: f32,
    /// Added to each episode's total reward before it is recorded, to keep plotted rewards positive
    ///
    /// **Default**: `100.0`
    pub reward_offset: f32,
    /// **Default**: [`Mode::Train`]
    pub mode: Mode,
    /// Cut episodes off after this many steps
    ///
    /// **Default**: `None`, episodes run until the target is reached
    pub max_steps: Option<usize>,
    /// Seed for the agent's own random choices
    ///
    /// **Default**: `None`, seeded from entropy
    pub seed: Option<u64>,
}

impl Default for QTableAgentConfig {
    fn default() -> Self {
        Self {
            exploration: EpsilonGreedy::default(),
            alpha: 0.9,
            gamma: 0.9,
            reward_offset: 100.0,
            mode: Mode::Train,
            max_steps: None,
            seed: None,
        }
    }
}

impl QTableAgentConfig {
    /// Default configuration whose epsilon reaches `0.0` after `episodes` episodes
    ///
    /// **Panics** if `episodes` is zero
    pub fn for_episodes(episodes: u32) -> Self {
        assert!(episodes > 0, "At least one episode is required.");
        Self {
            exploration: EpsilonGreedy::new(
                Linear::new(episodes as f32, 1.0, 0.0).expect("horizon is positive"),
            ),
            ..Default::default()
        }
    }
}

/// What happened in a single episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub steps: usize,
    /// Sum of the rewards, without the configured offset
    pub reward: f32,
    /// `true` if the episode ended in a terminal state, `false` if it was cut off
    pub terminated: bool,
}

/// Shape of the table needed for `env`: one axis per observation component, then the actions
pub fn table_shape<E>(env: &E) -> Shape
where
    E: BoxObservationSpace<3> + DiscreteActionSpace,
{
    let [a, b, c] = env.observation_shape();
    [a, b, c, env.num_actions()]
}

/// A Q-learning agent that stores one value per observation and action in a dense [`QTable`]
///
/// ### Generics
/// - `E` - The [`Environment`](crate::env::Environment) in which the agent will learn
///     - Observations must be bounded integer triples so they can index the table directly
///     - Actions must convert to their index in [`DiscreteActionSpace::actions`]
pub struct QTableAgent<E>
where
    E: BoxObservationSpace<3> + DiscreteActionSpace,
    E::Action: Copy + Into<usize>,
{
    table: QTable,
    exploration: EpsilonGreedy<Linear>,
    alpha: f32,   // learning rate
    gamma: f32,   // discount factor
    reward_offset: f32,
    mode: Mode,
    max_steps: Option<usize>,
    episode: u32, // completed episodes
    stats: EpisodeStats,
    rng: StdRng,
    env: PhantomData<fn() -> E>,
}

impl<E> QTableAgent<E>
where
    E: BoxObservationSpace<3> + DiscreteActionSpace,
    E::Action: Copy + Into<usize>,
{
    /// Initialize a new agent with a zeroed table sized for `env`
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn new(env: &E, config: QTableAgentConfig) -> Self {
        Self::build(QTable::zeros(table_shape(env)), config)
    }

    /// Initialize an agent around a previously learned table
    ///
    /// Fails with [`Error::ShapeMismatch`] if the table was not made for an environment shaped
    /// like `env`.
    ///
    /// **Panics** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn with_table(env: &E, config: QTableAgentConfig, table: QTable) -> Result<Self> {
        let expected = table_shape(env);
        if table.shape() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                found: table.shape(),
            });
        }
        Ok(Self::build(table, config))
    }

    fn build(table: QTable, config: QTableAgentConfig) -> Self {
        assert_interval!(config.alpha, 0.0, 1.0);
        assert_interval!(config.gamma, 0.0, 1.0);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            table,
            exploration: config.exploration,
            alpha: config.alpha,
            gamma: config.gamma,
            reward_offset: config.reward_offset,
            mode: config.mode,
            max_steps: config.max_steps,
            episode: 0,
            stats: EpisodeStats::new(),
            rng,
            env: PhantomData,
        }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn into_table(self) -> QTable {
        self.table
    }

    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of completed episodes
    pub fn episode(&self) -> u32 {
        self.episode
    }

    /// Exploration rate for the next episode, always `0.0` when evaluating
    pub fn epsilon(&self) -> f32 {
        match self.mode {
            Mode::Train => self.exploration.epsilon(self.episode),
            Mode::Evaluate => 0.0,
        }
    }

    /// Pick a uniformly random action with probability `epsilon`, otherwise the highest valued one
    pub fn select_action(&mut self, env: &E, state: &[usize; 3], epsilon: f32) -> E::Action {
        match exploration::roll(epsilon, &mut self.rng) {
            Choice::Explore => env.random_action(&mut self.rng),
            Choice::Exploit => env.actions()[self.table.argmax(state)],
        }
    }

    /// Move `Q(s, a)` toward `r + γ max Q(s', ·)`; a terminal transition has no future value
    pub fn learn(&mut self, experience: Exp<E>) {
        let Exp {
            state,
            action,
            next_state,
            reward,
        } = experience;

        let max_next_q = next_state.map_or(0.0, |s| self.table.max(&s));
        let (alpha, gamma) = (self.alpha, self.gamma);
        let action: usize = action.into();
        let q = &mut self.table[(state, action)];
        *q += alpha * (reward + gamma * max_next_q - *q);
    }

    /// Play one episode in `env`, learning along the way in [`Mode::Train`]
    pub fn go(&mut self, env: &mut E) -> EpisodeSummary {
        let epsilon = self.epsilon();
        let (mut state, _) = env.reset(None);
        debug!("Episode {} from {state:?}, epsilon {epsilon}", self.episode);

        let mut steps = 0;
        let mut total = 0.0;
        let terminated = loop {
            let action = self.select_action(env, &state, epsilon);
            let Step {
                state: next,
                reward,
                terminated,
                truncated,
                ..
            } = env.step(action);
            steps += 1;
            total += reward;

            if self.mode == Mode::Train {
                self.learn(Exp {
                    state,
                    action,
                    next_state: (!terminated).then_some(next),
                    reward,
                });
            }

            if terminated {
                break true;
            }
            if truncated || self.max_steps.is_some_and(|max| steps >= max) {
                warn!("Episode {} cut off after {steps} steps", self.episode);
                break false;
            }
            state = next;
        };

        self.stats.record(steps, total + self.reward_offset);
        self.episode += 1;

        EpisodeSummary {
            steps,
            reward: total,
            terminated,
        }
    }

    /// Play `episodes` episodes, logging progress every tenth of the way
    pub fn run(&mut self, env: &mut E, episodes: u32) -> &EpisodeStats {
        let every = (episodes / 10).max(1);
        for i in 1..=episodes {
            self.go(env);
            if i % every == 0 || i == episodes {
                info!(
                    "Episode {i}/{episodes}: epsilon {:.3}, mean steps {:.2}, mean reward {:.2}",
                    self.epsilon(),
                    self.stats.mean_steps(SMOOTHING_WINDOW).unwrap_or_default(),
                    self.stats.mean_reward(SMOOTHING_WINDOW).unwrap_or_default(),
                );
            }
        }

        &self.stats
    }
}
