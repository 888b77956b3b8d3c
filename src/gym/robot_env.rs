use log::{debug, info};
use rand::{seq::SliceRandom, Rng};
use strum::VariantArray;

use crate::{
    env::{BoxObservationSpace, DiscreteActionSpace, Environment, Info, Report, Step},
    error::Result,
};

use super::warehouse::{Action, Warehouse};

/// Observation handed to agents: `[robot, target, obstacle]`
pub type Obs = [usize; 3];

/// The warehouse robot problem behind the standard reset/step contract
///
/// Intended for use with a [QTableAgent](crate::algo::tabular::q_table::QTableAgent). An episode
/// terminates when the robot reaches the target; there is no step limit, so `truncated` is
/// always `false`.
pub struct RobotEnv {
    warehouse: Warehouse,
    render: bool,
    /// `steps` and `reward` of the running episode, cleared on reset
    pub report: Report,
}

impl RobotEnv {
    pub fn new(width: usize, seed: Option<u64>) -> Result<Self> {
        Ok(Self::from_warehouse(Warehouse::new(width, seed)?))
    }

    /// Wrap an already built warehouse, e.g. one with fixed positions
    pub fn from_warehouse(warehouse: Warehouse) -> Self {
        Self {
            warehouse,
            render: false,
            report: Report::new(vec!["steps", "reward"]),
        }
    }

    /// Log the floor after every reset and step
    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    pub fn width(&self) -> usize {
        self.warehouse.width()
    }

    fn observe(&self) -> Obs {
        [
            self.warehouse.robot(),
            self.warehouse.target(),
            self.warehouse.obstacle(),
        ]
    }
}

impl Environment for RobotEnv {
    type State = Obs;
    type Action = Action;

    fn reset(&mut self, seed: Option<u64>) -> (Self::State, Info) {
        self.warehouse.reset(seed);
        self.report.clear();
        let obs = self.observe();
        debug!("Reset: {obs:?}");
        if self.render {
            info!("{}", self.warehouse);
        }

        (obs, Info::new())
    }

    fn step(&mut self, action: Self::Action) -> Step<Self::State> {
        self.report.entry("steps").and_modify(|x| *x += 1.0);
        let outcome = self.warehouse.perform_action(action);
        self.report
            .entry("reward")
            .and_modify(|x| *x += outcome.reward as f64);
        if self.render {
            info!("{action}");
            info!("{}", self.warehouse);
        }

        Step {
            state: self.observe(),
            reward: outcome.reward as f32,
            terminated: outcome.terminal,
            truncated: false,
            info: Info::new(),
        }
    }

    fn random_action<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Action {
        *Action::VARIANTS
            .choose(rng)
            .expect("There is always at least one action available")
    }
}

impl DiscreteActionSpace for RobotEnv {
    fn actions(&self) -> Vec<Self::Action> {
        Action::VARIANTS.to_vec()
    }
}

impl BoxObservationSpace<3> for RobotEnv {
    fn observation_high(&self) -> [usize; 3] {
        [self.width() - 1; 3]
    }
}
