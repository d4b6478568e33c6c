//! Region Catalog

use crate::error::{CatalogError, EncodeError};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Regions the shipped model was trained on, in column order
pub const DEFAULT_SUPPORTED: [&str; 21] = [
    "Balaraja",
    "Cikupa",
    "Cisauk",
    "Curug",
    "Jatiuwung",
    "Jayanti",
    "Kadu",
    "Kelapa Dua",
    "Kosambi",
    "Kresek",
    "Legok",
    "Mauk",
    "Pagedangan",
    "Panongan",
    "Pasar Kemis",
    "Rajeg",
    "Sepatan",
    "Sindang Jaya",
    "Solear",
    "Teluk Naga",
    "Tigaraksa",
];

/// Selectable regions without training coverage
pub const DEFAULT_UNSUPPORTED: [&str; 10] = [
    "Cisoka",
    "Gunung Kaler",
    "Jambe",
    "Kemiri",
    "Kronjo",
    "Mekar Baru",
    "Pakuhaji",
    "Sepatan Timur",
    "Sukadiri",
    "Sukamulya",
];

/// Outcome of looking a region name up in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionStatus<'a> {
    /// Covered by the model; `index` is the indicator column offset
    Supported { index: usize, name: &'a str },
    /// Known region with no model coverage
    Unsupported { name: &'a str },
    Unknown,
}

/// Ordered list of supported regions plus a disjoint unsupported list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCatalog {
    supported: Vec<String>,
    unsupported: Vec<String>,
}

impl RegionCatalog {
    /// Build a catalog, rejecting empty, duplicated or overlapping lists
    pub fn new(supported: Vec<String>, unsupported: Vec<String>) -> Result<Self, CatalogError> {
        if supported.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut supported_seen = HashSet::new();
        for name in &supported {
            if !supported_seen.insert(normalize(name)) {
                return Err(CatalogError::Duplicate(name.clone()));
            }
        }

        let mut unsupported_seen = HashSet::new();
        for name in &unsupported {
            let key = normalize(name);
            if supported_seen.contains(&key) {
                return Err(CatalogError::Overlap(name.clone()));
            }
            if !unsupported_seen.insert(key) {
                return Err(CatalogError::Duplicate(name.clone()));
            }
        }

        debug!(
            "Region catalog: {} supported, {} unsupported",
            supported.len(),
            unsupported.len()
        );

        Ok(Self {
            supported,
            unsupported,
        })
    }

    /// Supported regions in indicator column order
    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    pub fn unsupported(&self) -> &[String] {
        &self.unsupported
    }

    /// Number of indicator columns
    pub fn len(&self) -> usize {
        self.supported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.supported.is_empty()
    }

    /// Look a name up; matching ignores case and surrounding whitespace
    pub fn resolve(&self, name: &str) -> RegionStatus<'_> {
        let key = normalize(name);

        if let Some(index) = self.supported.iter().position(|r| normalize(r) == key) {
            return RegionStatus::Supported {
                index,
                name: self.supported[index].as_str(),
            };
        }

        match self.unsupported.iter().find(|r| normalize(r) == key) {
            Some(name) => RegionStatus::Unsupported { name: name.as_str() },
            None => RegionStatus::Unknown,
        }
    }

    /// Indicator column offset of a supported region
    pub fn index_of(&self, name: &str) -> Result<usize, EncodeError> {
        match self.resolve(name) {
            RegionStatus::Supported { index, .. } => Ok(index),
            RegionStatus::Unsupported { name } => {
                Err(EncodeError::RegionUnavailable(name.to_string()))
            }
            RegionStatus::Unknown => Err(EncodeError::UnknownRegion(name.trim().to_string())),
        }
    }

    /// One-hot vector with a single 1.0 at the region's column
    pub fn indicators(&self, name: &str) -> Result<Vec<f64>, EncodeError> {
        let index = self.index_of(name)?;
        Ok((0..self.len())
            .map(|i| if i == index { 1.0 } else { 0.0 })
            .collect())
    }

    /// Column label of a region's indicator
    pub fn column_label(region: &str) -> String {
        format!("kec_{}", region)
    }
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self {
            supported: DEFAULT_SUPPORTED.iter().map(|s| s.to_string()).collect(),
            unsupported: DEFAULT_UNSUPPORTED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
