use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{de::DeserializeOwned, Serialize};

use crate::{KeyValueStore, StoreError};

const SNAPSHOT_VERSION: &str = "v1";
const FIELD_DELIMITER: char = ':';

/// Row-major grid contents tagged with the mode that produced them.
///
/// The single-line form is `<domain>:v1:<columns>x<rows>:<payload>`, where the
/// payload is the base64 encoding of the JSON cell array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutSnapshot<T> {
    domain: String,
    columns: u32,
    rows: u32,
    cells: Vec<T>,
}

impl<T> LayoutSnapshot<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Captures `cells` for a grid of `columns` by `rows`.
    pub fn new(
        domain: impl Into<String>,
        columns: u32,
        rows: u32,
        cells: Vec<T>,
    ) -> Result<Self, SnapshotError> {
        let expected = cell_count(columns, rows);
        if expected == 0 || cells.len() != expected {
            return Err(SnapshotError::CellCount {
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            domain: domain.into(),
            columns,
            rows,
            cells,
        })
    }

    /// Mode tag the snapshot belongs to.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Captured cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Consumes the snapshot, yielding its cells.
    #[must_use]
    pub fn into_cells(self) -> Vec<T> {
        self.cells
    }

    /// Encodes the snapshot into its single-line form.
    pub fn encode(&self) -> Result<String, SnapshotError> {
        let json = serde_json::to_vec(&self.cells).map_err(SnapshotError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{}:{SNAPSHOT_VERSION}:{}x{}:{encoded}",
            self.domain, self.columns, self.rows
        ))
    }

    /// Decodes a snapshot that must belong to `domain`.
    pub fn decode(domain: &str, value: &str) -> Result<Self, SnapshotError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SnapshotError::Empty);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let found_domain = parts.next().ok_or(SnapshotError::MissingField("domain"))?;
        let version = parts.next().ok_or(SnapshotError::MissingField("version"))?;
        let dimensions = parts
            .next()
            .ok_or(SnapshotError::MissingField("dimensions"))?;
        let payload = parts.next().ok_or(SnapshotError::MissingField("payload"))?;

        if found_domain != domain {
            return Err(SnapshotError::WrongDomain {
                expected: domain.to_owned(),
                found: found_domain.to_owned(),
            });
        }
        if version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(SnapshotError::InvalidEncoding)?;
        let cells: Vec<T> =
            serde_json::from_slice(&bytes).map_err(SnapshotError::InvalidPayload)?;

        Self::new(domain, columns, rows, cells)
    }

    /// Encodes the snapshot and stores it under `key`.
    pub fn save<S>(&self, store: &mut S, key: &str) -> Result<(), SnapshotError>
    where
        S: KeyValueStore + ?Sized,
    {
        store.set(key, self.encode()?)?;
        Ok(())
    }

    /// Loads the snapshot stored under `key`, if any.
    pub fn load<S>(store: &S, key: &str, domain: &str) -> Result<Option<Self>, SnapshotError>
    where
        S: KeyValueStore + ?Sized,
    {
        store
            .get(key)?
            .map(|value| Self::decode(domain, &value))
            .transpose()
    }
}

/// Errors that can occur while encoding, decoding or storing snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The provided string was empty or contained only whitespace.
    #[error("snapshot was empty")]
    Empty,
    /// A required segment was missing.
    #[error("snapshot is missing the {0}")]
    MissingField(&'static str),
    /// The snapshot belongs to another mode.
    #[error("snapshot for '{found}' cannot be loaded as '{expected}'")]
    WrongDomain {
        /// Domain the caller asked for.
        expected: String,
        /// Domain found in the snapshot.
        found: String,
    },
    /// The snapshot used an unsupported version identifier.
    #[error("snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The cell count does not match the grid dimensions.
    #[error("snapshot holds {actual} cells but the grid needs {expected}")]
    CellCount {
        /// Cells implied by the dimensions.
        expected: usize,
        /// Cells present in the payload.
        actual: usize,
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode snapshot payload")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The JSON payload could not be (de)serialised.
    #[error("could not parse snapshot payload")]
    InvalidPayload(#[source] serde_json::Error),
    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn cell_count(columns: u32, rows: u32) -> usize {
    usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0)
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), SnapshotError> {
    let invalid = || SnapshotError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;
    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || rows == 0 {
        return Err(invalid());
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use touchline_core::city::TileKind;

    fn city_layout() -> LayoutSnapshot<TileKind> {
        let mut tiles = vec![TileKind::Grass; 6];
        tiles[1] = TileKind::Road;
        tiles[4] = TileKind::Commerce;
        LayoutSnapshot::new("city", 3, 2, tiles).expect("valid layout")
    }

    #[test]
    fn encoded_form_carries_domain_and_dimensions() {
        let encoded = city_layout().encode().expect("encode");
        assert!(encoded.starts_with("city:v1:3x2:"));
        assert_eq!(
            LayoutSnapshot::<TileKind>::decode("city", &encoded).expect("decode"),
            city_layout()
        );
    }

    #[test]
    fn decode_rejects_other_domains() {
        let encoded = city_layout().encode().expect("encode");
        let error = LayoutSnapshot::<TileKind>::decode("farm", &encoded)
            .expect_err("domain must match");
        assert!(matches!(error, SnapshotError::WrongDomain { .. }));
    }

    #[test]
    fn decode_rejects_malformed_input() {
        let decode = |value: &str| LayoutSnapshot::<TileKind>::decode("city", value);
        assert!(matches!(decode("   "), Err(SnapshotError::Empty)));
        assert!(matches!(
            decode("city:v1"),
            Err(SnapshotError::MissingField("dimensions"))
        ));
        assert!(matches!(
            decode("city:v2:3x2:AA"),
            Err(SnapshotError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            decode("city:v1:0x2:AA"),
            Err(SnapshotError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode("city:v1:3x2:!!!"),
            Err(SnapshotError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn cell_count_must_match_dimensions() {
        let error = LayoutSnapshot::new("city", 4, 4, vec![TileKind::Road; 3])
            .expect_err("short layouts are rejected");
        assert!(matches!(
            error,
            SnapshotError::CellCount {
                expected: 16,
                actual: 3
            }
        ));
    }

    #[test]
    fn save_and_load_through_a_store() {
        let mut store = MemoryStore::new();
        assert!(LayoutSnapshot::<TileKind>::load(&store, "city.layout", "city")
            .expect("empty load")
            .is_none());

        city_layout().save(&mut store, "city.layout").expect("save");
        let loaded = LayoutSnapshot::<TileKind>::load(&store, "city.layout", "city")
            .expect("load")
            .expect("snapshot present");
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.cells()[1], TileKind::Road);
    }
}
