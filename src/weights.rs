//! Category weight table.
//!
//! A read-only mapping from incident category code to a small integer
//! weight, loaded once at process start from a JSON object. Its absence or
//! malformed content is a fatal startup error; unknown codes resolve to
//! the zero weight during the run.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Read-only category-to-weight lookup, shared across all workers
#[derive(Debug, Clone, Default)]
pub struct WeightTable {
    weights: HashMap<String, u8>,
}

impl WeightTable {
    /// Load the table from a JSON object of `{ "CODE": weight }` pairs.
    ///
    /// Fatal on a missing file or malformed content: a run without weights
    /// would silently produce an all-zero aggregate.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::weight_table(path, format!("cannot read file: {e}")))?;

        let weights: HashMap<String, u8> = serde_json::from_str(&contents)
            .map_err(|e| Error::weight_table(path, format!("invalid JSON: {e}")))?;

        debug!(
            "Loaded {} category weights from {}",
            weights.len(),
            path.display()
        );

        Ok(Self { weights })
    }

    /// Build a table from an existing mapping (used by tests)
    pub fn from_map(weights: HashMap<String, u8>) -> Self {
        Self { weights }
    }

    /// Weight for a category code; unknown codes resolve to 0
    pub fn weight_for(&self, category: &str) -> u8 {
        self.weights.get(category).copied().unwrap_or(0)
    }

    /// Number of known categories
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_valid_table() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("weights.json");
        fs::write(&path, r#"{"BURG": 4, "ASSAULT": 7, "THEFT": 2}"#).unwrap();

        let table = WeightTable::load(&path).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.weight_for("BURG"), 4);
        assert_eq!(table.weight_for("ASSAULT"), 7);
    }

    #[test]
    fn test_unknown_category_resolves_to_zero() {
        let table = WeightTable::from_map(HashMap::from([("BURG".to_string(), 4)]));
        assert_eq!(table.weight_for("UNKNOWN"), 0);
        assert_eq!(table.weight_for(""), 0);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let temp = TempDir::new().unwrap();
        let result = WeightTable::load(&temp.path().join("absent.json"));

        assert!(matches!(result, Err(Error::WeightTable { .. })));
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("weights.json");
        fs::write(&path, "{not json").unwrap();

        let result = WeightTable::load(&path);
        assert!(matches!(result, Err(Error::WeightTable { .. })));
    }

    #[test]
    fn test_non_integer_weight_is_fatal() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("weights.json");
        fs::write(&path, r#"{"BURG": "four"}"#).unwrap();

        assert!(WeightTable::load(&path).is_err());
    }
}
