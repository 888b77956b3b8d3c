use std::ops::{Index, IndexMut};

use crate::error::{Error, Result};

/// Shape of a [`QTable`]: three observation components followed by the action count
pub type Shape = [usize; 4];

/// A dense table of action values for states `[usize; 3]`
///
/// Values live in one flat `Vec` in row-major order, so all actions of a state sit next to each
/// other and can be borrowed as a single row.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    shape: Shape,
    values: Vec<f32>,
}

impl QTable {
    /// A table of the given shape filled with `0.0`
    pub fn zeros(shape: Shape) -> Self {
        Self {
            shape,
            values: vec![0.0; shape.iter().product()],
        }
    }

    /// Rebuild a table from its shape and flat values
    pub fn from_raw(shape: Shape, values: Vec<f32>) -> Result<Self> {
        let len: usize = shape.iter().product();
        if values.len() != len {
            return Err(Error::Corrupt(format!(
                "shape {shape:?} holds {len} values, found {}",
                values.len()
            )));
        }
        Ok(Self { shape, values })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn num_actions(&self) -> usize {
        self.shape[3]
    }

    /// All values in row-major order
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    fn row_offset(&self, state: &[usize; 3]) -> usize {
        let [a, b, c, n] = self.shape;
        assert!(
            state[0] < a && state[1] < b && state[2] < c,
            "State {state:?} is outside the table shape {:?}",
            self.shape
        );
        ((state[0] * b + state[1]) * c + state[2]) * n
    }

    /// Action values of `state`, indexed by action
    pub fn row(&self, state: &[usize; 3]) -> &[f32] {
        let start = self.row_offset(state);
        &self.values[start..start + self.num_actions()]
    }

    pub fn row_mut(&mut self, state: &[usize; 3]) -> &mut [f32] {
        let start = self.row_offset(state);
        let n = self.num_actions();
        &mut self.values[start..start + n]
    }

    /// Highest action value of `state`
    pub fn max(&self, state: &[usize; 3]) -> f32 {
        self.row(state)
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Index of the highest action value of `state`, the lowest index winning ties
    pub fn argmax(&self, state: &[usize; 3]) -> usize {
        self.row(state)
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |(best, best_q), (i, &q)| {
                if q > best_q {
                    (i, q)
                } else {
                    (best, best_q)
                }
            })
            .0
    }
}

impl Index<([usize; 3], usize)> for QTable {
    type Output = f32;

    fn index(&self, (state, action): ([usize; 3], usize)) -> &Self::Output {
        &self.row(&state)[action]
    }
}

impl IndexMut<([usize; 3], usize)> for QTable {
    fn index_mut(&mut self, (state, action): ([usize; 3], usize)) -> &mut Self::Output {
        &mut self.row_mut(&state)[action]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_has_full_size() {
        let table = QTable::zeros([5, 5, 5, 2]);
        assert_eq!(table.values().len(), 250);
        assert!(table.values().iter().all(|&q| q == 0.0));
    }

    #[test]
    fn cells_are_independent() {
        let mut table = QTable::zeros([3, 4, 5, 2]);
        table[([2, 3, 4], 1)] = 7.0;
        table[([0, 0, 0], 0)] = -1.0;
        table[([1, 2, 3], 0)] = 2.5;

        assert_eq!(table[([2, 3, 4], 1)], 7.0);
        assert_eq!(table[([2, 3, 4], 0)], 0.0);
        assert_eq!(table.row(&[1, 2, 3]), &[2.5, 0.0]);
        assert_eq!(*table.values().last().unwrap(), 7.0, "Last state is last in memory");
        assert_eq!(table.values()[0], -1.0);
        assert_eq!(table.values().iter().filter(|&&q| q != 0.0).count(), 3);
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        let mut table = QTable::zeros([2, 2, 2, 3]);
        let s = [1, 0, 1];
        assert_eq!(table.argmax(&s), 0);

        table.row_mut(&s).copy_from_slice(&[-1.0, 4.0, 4.0]);
        assert_eq!(table.argmax(&s), 1);
        assert_eq!(table.max(&s), 4.0);

        table.row_mut(&s).copy_from_slice(&[-3.0, -2.0, -5.0]);
        assert_eq!(table.argmax(&s), 1);
        assert_eq!(table.max(&s), -2.0);
    }

    #[test]
    fn from_raw_checks_length() {
        assert!(QTable::from_raw([2, 2, 2, 2], vec![0.0; 16]).is_ok());
        assert!(matches!(
            QTable::from_raw([2, 2, 2, 2], vec![0.0; 15]),
            Err(Error::Corrupt(_))
        ));
    }

    #[test]
    #[should_panic(expected = "outside the table shape")]
    fn out_of_range_state_panics() {
        let table = QTable::zeros([3, 3, 3, 2]);
        table.row(&[0, 3, 0]);
    }
}
