//! Saving and loading learned Q-tables
//!
//! A saved table is a `bincode` encoded record of a format version, the table shape and its values
//! in row-major order.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    ds::q_table::{QTable, Shape},
    error::{Error, Result},
};

const VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SavedQTable {
    version: u32,
    shape: Shape,
    values: Vec<f32>,
}

impl SavedQTable {
    fn into_table(self, expected: Shape) -> Result<QTable> {
        if self.version != VERSION {
            return Err(Error::Version {
                found: self.version,
                expected: VERSION,
            });
        }
        if self.shape != expected {
            return Err(Error::ShapeMismatch {
                expected,
                found: self.shape,
            });
        }
        QTable::from_raw(self.shape, self.values)
    }
}

fn record(table: &QTable) -> SavedQTable {
    SavedQTable {
        version: VERSION,
        shape: table.shape(),
        values: table.values().to_vec(),
    }
}

/// Encode a table
pub fn to_bytes(table: &QTable) -> Result<Vec<u8>> {
    Ok(bincode::serialize(&record(table))?)
}

/// Decode a table, which must have the `expected` shape
pub fn from_bytes(bytes: &[u8], expected: Shape) -> Result<QTable> {
    let saved: SavedQTable = bincode::deserialize(bytes)?;
    saved.into_table(expected)
}

/// Write a table to `path`, replacing any existing file
pub fn save<P: AsRef<Path>>(path: P, table: &QTable) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, &record(table))?;
    writer.flush()?;
    debug!("Saved Q-table {:?} to {}", table.shape(), path.display());
    Ok(())
}

/// Read a table from `path`, which must have the `expected` shape
pub fn load<P: AsRef<Path>>(path: P, expected: Shape) -> Result<QTable> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let saved: SavedQTable = bincode::deserialize_from(reader)?;
    let table = saved.into_table(expected)?;
    debug!("Loaded Q-table {:?} from {}", table.shape(), path.display());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> QTable {
        let mut table = QTable::zeros([4, 4, 4, 2]);
        table[([1, 2, 3], 1)] = 3.25;
        table[([0, 3, 1], 0)] = -7.125;
        table[([3, 3, 3], 1)] = f32::MIN_POSITIVE;
        table
    }

    #[test]
    fn bytes_roundtrip() {
        let table = sample_table();
        let bytes = to_bytes(&table).unwrap();
        let loaded = from_bytes(&bytes, [4, 4, 4, 2]).unwrap();
        assert_eq!(loaded, table);
        assert!(loaded
            .values()
            .iter()
            .zip(table.values())
            .all(|(a, b)| a.to_bits() == b.to_bits()));
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q_table.bin");
        let table = sample_table();

        save(&path, &table).unwrap();
        assert_eq!(load(&path, table.shape()).unwrap(), table);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let bytes = to_bytes(&sample_table()).unwrap();
        match from_bytes(&bytes, [5, 5, 5, 2]) {
            Err(Error::ShapeMismatch { expected, found }) => {
                assert_eq!(expected, [5, 5, 5, 2]);
                assert_eq!(found, [4, 4, 4, 2]);
            }
            other => panic!("expected a shape mismatch, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_corrupt() {
        assert!(matches!(
            from_bytes(&[1, 2, 3], [4, 4, 4, 2]),
            Err(Error::Corrupt(_))
        ));

        let mut bytes = to_bytes(&sample_table()).unwrap();
        bytes.truncate(bytes.len() - 4);
        assert!(matches!(
            from_bytes(&bytes, [4, 4, 4, 2]),
            Err(Error::Corrupt(_))
        ));
    }

    #[test]
    fn value_count_must_match_shape() {
        let bytes = bincode::serialize(&SavedQTable {
            version: VERSION,
            shape: [2, 2, 2, 2],
            values: vec![0.0; 3],
        })
        .unwrap();
        assert!(matches!(
            from_bytes(&bytes, [2, 2, 2, 2]),
            Err(Error::Corrupt(_))
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let bytes = bincode::serialize(&SavedQTable {
            version: 99,
            shape: [2, 2, 2, 2],
            values: vec![0.0; 16],
        })
        .unwrap();
        assert!(matches!(
            from_bytes(&bytes, [2, 2, 2, 2]),
            Err(Error::Version { found: 99, .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(dir.path().join("nope.bin"), [2, 2, 2, 2]),
            Err(Error::Io(_))
        ));
    }
}
