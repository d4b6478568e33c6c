//! Feature Engineering Engine
//!
//! Turns raw form attributes into the fixed-order feature row the price
//! model was trained on: nine numeric columns (the two area columns
//! log1p-compressed) followed by one indicator column per supported region.

mod attributes;
mod error;
mod features;
mod region;
mod schema;

pub use attributes::{HouseAttributes, NumericField, Transform, NUMERIC_FEATURES};
pub use error::{CatalogError, EncodeError, SchemaError};
pub use features::{FeatureEncoder, FeatureVector};
pub use region::{RegionCatalog, RegionStatus};
pub use schema::FeatureSchema;
