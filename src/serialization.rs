//! Byte-level persistence of fitted parameters and cached feature maps.
//!
//! Anything stored on disk by this crate (fitted target scalers, featurization
//! caches) goes through [`SerializableParams`], so the on-disk format is decided
//! in one place.

use std::error::Error;
use std::path::Path;

/// A value that can be serialized to and from bytes.
///
/// Implementors should contain plain data (`Vec<f64>`, maps of strings to
/// numeric vectors), not handles or references.
pub trait SerializableParams: Sized {
    /// The error type returned during (de)serialization.
    type Error: Error + Send + Sync + 'static;

    /// Serialize into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: serde::Serialize + for<'de> serde::Deserialize<'de>,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}

/// Write `value` to `path` in one piece, replacing any previous content.
pub fn write_file<T: SerializableParams, P: AsRef<Path>>(
    value: &T,
    path: P,
) -> crate::error::Result<()> {
    let bytes = value
        .to_bytes()
        .map_err(|e| crate::error::DatasetError::Serialization(e.to_string()))?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Read a whole file written by [`write_file`].
pub fn read_file<T: SerializableParams, P: AsRef<Path>>(path: P) -> crate::error::Result<T> {
    let bytes = std::fs::read(path)?;
    T::from_bytes(&bytes).map_err(|e| crate::error::DatasetError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_map_survives_file_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let mut map: BTreeMap<String, Vec<f32>> = BTreeMap::new();
        map.insert("D1".to_string(), vec![0.5, 1.5]);
        map.insert("D2".to_string(), vec![]);

        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("map.bin");
        write_file(&map, &path)?;
        let loaded: BTreeMap<String, Vec<f32>> = read_file(&path)?;

        assert_eq!(loaded, map);
        Ok(())
    }

    #[test]
    fn test_read_file_rejects_garbage() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("garbage.bin");
        std::fs::write(&path, [0xffu8; 3])?;

        let result: crate::error::Result<BTreeMap<String, Vec<f32>>> = read_file(&path);
        assert!(matches!(
            result,
            Err(crate::error::DatasetError::Serialization(_))
        ));
        Ok(())
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("drp_dataset_definitely_missing.bin");
        let result: crate::error::Result<Vec<f64>> = read_file(path);
        assert!(matches!(result, Err(crate::error::DatasetError::Io(_))));
    }
}
