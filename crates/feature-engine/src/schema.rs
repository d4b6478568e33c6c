//! Feature Schema
//!
//! The regression model has no notion of column names at inference time, so
//! a positional mix-up would silently skew every estimate. The schema pins
//! the expected label sequence and rows are checked against it before they
//! reach a model.

use crate::attributes::NumericField;
use crate::error::SchemaError;
use crate::region::RegionCatalog;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Ordered column labels a model expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

/// On-disk schema layouts: a bare label array or `{ "columns": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredSchema {
    List(Vec<String>),
    Object { columns: Vec<String> },
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Numeric columns followed by one indicator per supported region
    pub fn for_catalog(catalog: &RegionCatalog) -> Self {
        let columns = NumericField::ALL
            .iter()
            .map(|f| f.column().to_string())
            .chain(catalog.supported().iter().map(|r| RegionCatalog::column_label(r)))
            .collect();
        Self { columns }
    }

    /// Parse a stored schema
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let stored: StoredSchema =
            serde_json::from_str(json).map_err(|e| SchemaError::Parse(e.to_string()))?;
        let columns = match stored {
            StoredSchema::List(columns) | StoredSchema::Object { columns } => columns,
        };
        Ok(Self { columns })
    }

    /// Load a stored schema shipped next to a model artifact
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Io(format!("{}: {}", path.display(), e)))?;
        let schema = Self::from_json_str(&json)?;
        debug!("Loaded {}-column schema from {}", schema.width(), path.display());
        Ok(schema)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Check that `labels` matches this schema exactly, in order
    pub fn verify(&self, labels: &[String]) -> Result<(), SchemaError> {
        if labels.len() != self.columns.len() {
            return Err(SchemaError::WidthMismatch {
                expected: self.columns.len(),
                actual: labels.len(),
            });
        }

        match self
            .columns
            .iter()
            .zip(labels)
            .position(|(expected, actual)| expected != actual)
        {
            Some(index) => Err(SchemaError::ColumnMismatch {
                index,
                expected: self.columns[index].clone(),
                actual: labels[index].clone(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_catalog_schema_layout() {
        let catalog = RegionCatalog::default();
        let schema = FeatureSchema::for_catalog(&catalog);

        assert_eq!(schema.width(), 9 + catalog.len());
        assert_eq!(schema.columns()[0], "Kamar Tidur");
        assert_eq!(schema.columns()[8], "Kamar Mandi Pembantu");
        assert_eq!(schema.columns()[9], "kec_Balaraja");
        assert_eq!(schema.position("kec_Tigaraksa"), Some(29));
    }

    #[test]
    fn test_parse_both_layouts() {
        let list = FeatureSchema::from_json_str(r#"["a", "b"]"#).unwrap();
        let object = FeatureSchema::from_json_str(r#"{"columns": ["a", "b"]}"#).unwrap();
        assert_eq!(list, object);
        assert!(matches!(
            FeatureSchema::from_json_str("{}"),
            Err(SchemaError::Parse(_))
        ));
    }

    #[test]
    fn test_verify_detects_reordering() {
        let schema = FeatureSchema::new(vec!["a".into(), "b".into(), "c".into()]);
        assert!(schema.verify(&["a".into(), "b".into(), "c".into()]).is_ok());
        assert_eq!(
            schema.verify(&["a".into(), "c".into(), "b".into()]),
            Err(SchemaError::ColumnMismatch {
                index: 1,
                expected: "b".into(),
                actual: "c".into(),
            })
        );
        assert_eq!(
            schema.verify(&["a".into()]),
            Err(SchemaError::WidthMismatch {
                expected: 3,
                actual: 1
            })
        );
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("schema-test-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"columns": ["Kamar Tidur", "kec_Mauk"]}}"#).unwrap();
        drop(file);

        let schema = FeatureSchema::from_json_file(&path).unwrap();
        assert_eq!(schema.width(), 2);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            FeatureSchema::from_json_file(&path),
            Err(SchemaError::Io(_))
        ));
    }
}
