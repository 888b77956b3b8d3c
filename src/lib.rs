//! Tabular Q-learning on a one-dimensional warehouse floor
//!
//! A robot starts in the middle of a row of cells and has to reach a target package while
//! stepping around an obstacle. [`gym::RobotEnv`] exposes the problem through the reset/step
//! contract in [`env`], and [`algo::tabular::q_table::QTableAgent`] learns it with a dense
//! [`ds::q_table::QTable`] that [`persist`] can write to disk and load back for evaluation.

/// Implemented RL algorithms
pub mod algo;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Data structures
pub mod ds;

/// Environment
pub mod env;

pub mod error;

/// Experience tuples
pub mod exp;

/// Exploration policies
pub mod exploration;

/// Testing environments
pub mod gym;

pub mod persist;

/// Per-episode training statistics
pub mod stats;

mod util;

pub use error::{Error, Result};
