pub mod robot_env;
pub mod warehouse;

pub use robot_env::RobotEnv;
pub use warehouse::{Action, Outcome, Tile, Warehouse};
