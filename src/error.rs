//! Error types for the crate

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid action index {0} (expected 0 or 1)")]
    InvalidAction(usize),

    #[error("grid width {width} is too small for robot, target and obstacle (need at least 3)")]
    DegenerateGrid { width: usize },

    #[error(
        "positions robot={robot}, target={target}, obstacle={obstacle} must be distinct cells of a \
         {width}-cell floor"
    )]
    InvalidLayout {
        width: usize,
        robot: usize,
        target: usize,
        obstacle: usize,
    },

    #[error("stored Q-table has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        expected: [usize; 4],
        found: [usize; 4],
    },

    #[error("unsupported Q-table format version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("corrupt Q-table data: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        match *err {
            // A short read means the data ended early, not that the device failed
            bincode::ErrorKind::Io(e) if e.kind() != std::io::ErrorKind::UnexpectedEof => {
                Error::Io(e)
            }
            other => Error::Corrupt(other.to_string()),
        }
    }
}
