use std::fmt;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use strum::{Display, FromRepr, VariantArray};

use crate::error::{Error, Result};

/// Moves the robot can make
#[derive(VariantArray, FromRepr, Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Left = 0,
    Right = 1,
}

impl TryFrom<usize> for Action {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        Action::from_repr(value).ok_or(Error::InvalidAction(value))
    }
}

impl From<Action> for usize {
    fn from(action: Action) -> Self {
        action as usize
    }
}

/// What occupies a cell of the warehouse floor, printed as a single letter
#[derive(Display, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    #[strum(serialize = "_")]
    Floor,
    #[strum(serialize = "C")]
    Robot,
    #[strum(serialize = "T")]
    Target,
    #[strum(serialize = "O")]
    Obstacle,
}

/// Reward for landing on the obstacle
pub const OBSTACLE_REWARD: i32 = -10;
/// Reward for reaching the target
pub const TARGET_REWARD: i32 = 10;
/// Reward for any other move
pub const MOVE_REWARD: i32 = -1;

/// The result of [`Warehouse::perform_action`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub reward: i32,
    /// The robot is standing on the target
    pub terminal: bool,
}

/// A single row of warehouse floor holding a robot, a target package and an obstacle
///
/// The robot always starts in the middle of the row. The target and obstacle are placed at random
/// in `[1, width-1]`, never on the robot or on each other, and stay put for the whole episode.
pub struct Warehouse {
    width: usize,
    robot: usize,
    target: usize,
    obstacle: usize,
    rng: StdRng,
}

impl Warehouse {
    /// Build a warehouse `width` cells wide and place everything on it
    ///
    /// `seed` makes target and obstacle placement repeatable across runs.
    pub fn new(width: usize, seed: Option<u64>) -> Result<Self> {
        if width < 3 {
            return Err(Error::DegenerateGrid { width });
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut warehouse = Self {
            width,
            robot: 0,
            target: 0,
            obstacle: 0,
            rng,
        };
        warehouse.reset(None);
        Ok(warehouse)
    }

    /// Build a warehouse with fixed positions
    ///
    /// Fails with [`Error::InvalidLayout`] unless the positions are in bounds and pairwise
    /// distinct.
    pub fn with_positions(
        width: usize,
        robot: usize,
        target: usize,
        obstacle: usize,
    ) -> Result<Self> {
        if width < 3 {
            return Err(Error::DegenerateGrid { width });
        }
        let in_bounds = robot < width && target < width && obstacle < width;
        let distinct = robot != target && robot != obstacle && target != obstacle;
        if !(in_bounds && distinct) {
            return Err(Error::InvalidLayout {
                width,
                robot,
                target,
                obstacle,
            });
        }
        Ok(Self {
            width,
            robot,
            target,
            obstacle,
            rng: StdRng::from_entropy(),
        })
    }

    /// Put the robot back in the middle and draw new target and obstacle positions
    pub fn reset(&mut self, seed: Option<u64>) {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }

        self.robot = self.width / 2;

        // Cells 1..width, minus the robot. A three-wide floor has only one such cell, so it
        // opens up the left wall as well.
        let mut cells: Vec<usize> = (1..self.width).filter(|&c| c != self.robot).collect();
        if cells.len() < 2 {
            cells = (0..self.width).filter(|&c| c != self.robot).collect();
        }

        loop {
            let target = *cells.choose(&mut self.rng).expect("at least two free cells");
            let obstacle = *cells.choose(&mut self.rng).expect("at least two free cells");
            if target != obstacle {
                self.target = target;
                self.obstacle = obstacle;
                break;
            }
        }
    }

    /// Move the robot one cell and score where it lands
    pub fn perform_action(&mut self, action: Action) -> Outcome {
        match action {
            Action::Left => self.robot = self.robot.saturating_sub(1),
            Action::Right => self.robot = (self.robot + 1).min(self.width - 1),
        }

        if self.robot == self.obstacle {
            Outcome {
                reward: OBSTACLE_REWARD,
                terminal: false,
            }
        } else if self.robot == self.target {
            Outcome {
                reward: TARGET_REWARD,
                terminal: true,
            }
        } else {
            Outcome {
                reward: MOVE_REWARD,
                terminal: false,
            }
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn robot(&self) -> usize {
        self.robot
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn obstacle(&self) -> usize {
        self.obstacle
    }

    /// What is drawn at `cell`; the robot hides whatever it stands on
    pub fn tile(&self, cell: usize) -> Tile {
        if cell == self.robot {
            Tile::Robot
        } else if cell == self.target {
            Tile::Target
        } else if cell == self.obstacle {
            Tile::Obstacle
        } else {
            Tile::Floor
        }
    }

    /// One-line picture of the floor, e.g. `_ _ C T O`
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Warehouse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in 0..self.width {
            if cell > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", self.tile(cell))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn too_narrow_is_rejected() {
        for width in 0..3 {
            assert!(matches!(
                Warehouse::new(width, Some(1)),
                Err(Error::DegenerateGrid { width: w }) if w == width
            ));
        }
    }

    #[test]
    fn fixed_layout_is_validated() {
        assert!(Warehouse::with_positions(5, 2, 4, 0).is_ok());
        for (robot, target, obstacle) in [(2, 2, 4), (2, 4, 4), (1, 3, 1), (2, 5, 0), (9, 1, 0)] {
            assert!(
                matches!(
                    Warehouse::with_positions(5, robot, target, obstacle),
                    Err(Error::InvalidLayout { width: 5, .. })
                ),
                "({robot}, {target}, {obstacle}) is not a valid layout"
            );
        }
        assert!(matches!(
            Warehouse::with_positions(2, 0, 1, 1),
            Err(Error::DegenerateGrid { width: 2 })
        ));
    }

    #[test]
    fn action_indices() {
        assert_eq!(Action::try_from(0usize).unwrap(), Action::Left);
        assert_eq!(Action::try_from(1usize).unwrap(), Action::Right);
        assert!(matches!(Action::try_from(2usize), Err(Error::InvalidAction(2))));
        assert_eq!(usize::from(Action::Right), 1);
    }

    #[test]
    fn moves_are_clamped_at_the_walls() {
        let mut w = Warehouse::with_positions(5, 0, 3, 4).unwrap();
        w.perform_action(Action::Left);
        assert_eq!(w.robot(), 0, "Left at the left wall is a no-op");

        let mut w = Warehouse::with_positions(5, 4, 0, 1).unwrap();
        w.perform_action(Action::Right);
        assert_eq!(w.robot(), 4, "Right at the right wall is a no-op");
    }

    #[test]
    fn rewards() {
        let mut w = Warehouse::with_positions(6, 2, 4, 3).unwrap();
        assert_eq!(
            w.perform_action(Action::Right),
            Outcome {
                reward: -10,
                terminal: false
            },
            "Landing on the obstacle"
        );
        assert_eq!(
            w.perform_action(Action::Right),
            Outcome {
                reward: 10,
                terminal: true
            },
            "Landing on the target"
        );

        let mut w = Warehouse::with_positions(6, 2, 4, 3).unwrap();
        assert_eq!(
            w.perform_action(Action::Left),
            Outcome {
                reward: -1,
                terminal: false
            },
            "Landing on the floor"
        );
        assert_eq!(w.perform_action(Action::Left).reward, -1, "Walking away from both");
    }

    #[test]
    fn state_other_than_robot_is_untouched_by_actions() {
        let mut w = Warehouse::new(9, Some(42)).unwrap();
        let (target, obstacle) = (w.target(), w.obstacle());
        for action in [Action::Left, Action::Left, Action::Right, Action::Right, Action::Right] {
            w.perform_action(action);
            assert_eq!((w.target(), w.obstacle()), (target, obstacle));
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let mut a = Warehouse::new(15, None).unwrap();
        let mut b = Warehouse::new(15, None).unwrap();
        a.reset(Some(1234));
        b.reset(Some(1234));
        assert_eq!((a.target(), a.obstacle()), (b.target(), b.obstacle()));

        a.reset(None);
        b.reset(None);
        assert_eq!(
            (a.target(), a.obstacle()),
            (b.target(), b.obstacle()),
            "Unseeded resets continue the same stream"
        );
    }

    #[test]
    fn three_wide_floor_uses_every_cell() {
        let mut w = Warehouse::new(3, Some(5)).unwrap();
        for _ in 0..20 {
            w.reset(None);
            assert_eq!(w.robot(), 1);
            let mut cells = [w.target(), w.obstacle()];
            cells.sort();
            assert_eq!(cells, [0, 2]);
        }
    }

    #[test]
    fn render_draws_every_tile() {
        let w = Warehouse::with_positions(5, 2, 4, 0).unwrap();
        assert_eq!(w.render(), "O _ C _ T");
    }

    proptest! {
        #[test]
        fn reset_places_distinct_positions(width in 3usize..40, seed in any::<u64>()) {
            let mut w = Warehouse::new(width, Some(seed)).unwrap();
            for _ in 0..5 {
                w.reset(None);
                let (r, t, o) = (w.robot(), w.target(), w.obstacle());
                prop_assert_eq!(r, width / 2);
                prop_assert!(r < width && t < width && o < width);
                prop_assert!(r != t && r != o && t != o);
                if width > 3 {
                    prop_assert!(t >= 1 && o >= 1);
                }
            }
        }
    }
}
