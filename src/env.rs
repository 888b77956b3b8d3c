use std::{
    collections::{btree_map::Entry, BTreeMap, HashMap},
    ops::Index,
};

use rand::Rng;

/// Free-form metadata attached to resets and steps
pub type Info = HashMap<String, String>;

/// The result of advancing an environment by one action
#[derive(Debug, Clone, PartialEq)]
pub struct Step<S> {
    /// Observation after the action was applied
    pub state: S,
    /// Reward produced by the action
    pub reward: f32,
    /// The episode reached a terminal state
    pub terminated: bool,
    /// The episode was cut short without reaching a terminal state
    pub truncated: bool,
    pub info: Info,
}

/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// This base trait represents the common case of a discrete-time MDP with one agent
/// and a finite state space and action space.
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type State;

    /// A representation of an action that an agent can take to affect the environment
    type Action;

    /// Reset the environment to an initial state, reseeding its random source if `seed` is given
    ///
    /// **Returns** `(state, info)`
    fn reset(&mut self, seed: Option<u64>) -> (Self::State, Info);

    /// Update the environment in response to an action taken by an agent
    fn step(&mut self, action: Self::Action) -> Step<Self::State>;

    /// Sample an action uniformly from the action space
    fn random_action<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Action;
}

/// An environment with a finite, fixed set of actions
pub trait DiscreteActionSpace: Environment {
    /// Get the available actions, ordered by their index
    ///
    /// The returned vec should never be empty.
    fn actions(&self) -> Vec<Self::Action>;

    /// Cardinality of the action space
    fn num_actions(&self) -> usize {
        self.actions().len()
    }
}

/// An environment whose observations are bounded integer vectors `[0, high]`
pub trait BoxObservationSpace<const N: usize>: Environment<State = [usize; N]> {
    /// Inclusive upper bound of each observation component
    fn observation_high(&self) -> [usize; N];

    /// Number of distinct values each component can take
    fn observation_shape(&self) -> [usize; N] {
        self.observation_high().map(|h| h + 1)
    }
}

/// Named counters for the running episode, e.g. `steps` and `reward`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    keys: Vec<&'static str>,
    values: BTreeMap<&'static str, f64>,
}

impl Report {
    /// A report with every counter in `keys` at zero
    pub fn new(keys: Vec<&'static str>) -> Self {
        let values = keys.iter().map(|&k| (k, 0.0)).collect();
        Self { keys, values }
    }

    /// Counter names in the order they were given
    pub fn keys(&self) -> &[&'static str] {
        &self.keys
    }

    pub fn entry(&mut self, key: &'static str) -> Entry<'_, &'static str, f64> {
        self.values.entry(key)
    }

    /// Current value of `key`, if it is tracked
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Set every counter back to zero
    pub fn clear(&mut self) {
        self.values.values_mut().for_each(|v| *v = 0.0);
    }

    /// Return the counters and start again from zero
    pub fn take(&mut self) -> BTreeMap<&'static str, f64> {
        let taken = self.values.clone();
        self.clear();
        taken
    }
}

impl Index<&str> for Report {
    type Output = f64;

    fn index(&self, key: &str) -> &Self::Output {
        self.values
            .get(key)
            .unwrap_or_else(|| panic!("Report has no counter named `{key}`"))
    }
}
