//! Feature Vector Assembly

use crate::attributes::{HouseAttributes, NumericField, NUMERIC_FEATURES};
use crate::error::{EncodeError, SchemaError};
use crate::region::RegionCatalog;
use crate::schema::FeatureSchema;
use std::sync::Arc;
use tracing::{debug, info};

/// Single feature row for ML inference, labelled column by column
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    columns: Arc<[String]>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Pair labels with values; both must have the same length
    pub fn new(columns: Arc<[String]>, values: Vec<f64>) -> Result<Self, SchemaError> {
        if columns.len() != values.len() {
            return Err(SchemaError::WidthMismatch {
                expected: columns.len(),
                actual: values.len(),
            });
        }
        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a column by label
    pub fn get(&self, label: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == label)
            .map(|i| self.values[i])
    }

    /// The numeric block preceding the region indicators
    pub fn numeric(&self) -> &[f64] {
        &self.values[..NUMERIC_FEATURES.min(self.values.len())]
    }

    /// The region indicator block
    pub fn indicators(&self) -> &[f64] {
        &self.values[NUMERIC_FEATURES.min(self.values.len())..]
    }

    /// Values narrowed to `f32` for tensor backends
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|v| *v as f32).collect()
    }
}

/// Encoder from raw attributes to the model's feature row
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    catalog: RegionCatalog,
    schema: FeatureSchema,
    columns: Arc<[String]>,
}

impl FeatureEncoder {
    /// Create an encoder whose indicator columns follow `catalog`
    pub fn new(catalog: RegionCatalog) -> Self {
        let schema = FeatureSchema::for_catalog(&catalog);
        info!(
            "Creating feature encoder: {} numeric + {} region columns",
            NUMERIC_FEATURES,
            catalog.len()
        );
        Self {
            columns: schema.columns().to_vec().into(),
            catalog,
            schema,
        }
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    /// Schema of every row this encoder produces
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Row width, `9 + supported regions`
    pub fn width(&self) -> usize {
        self.schema.width()
    }

    /// Build the feature row for one request
    pub fn encode(&self, attrs: &HouseAttributes) -> Result<FeatureVector, EncodeError> {
        let indicators = self.catalog.indicators(&attrs.region)?;

        let mut values = Vec::with_capacity(self.width());
        values.extend(NumericField::ALL.iter().map(|f| f.encode(attrs)));
        values.extend(indicators);

        debug!(
            "Encoded {} columns for region {}",
            values.len(),
            attrs.region.trim()
        );

        Ok(FeatureVector::new(self.columns.clone(), values)?)
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new(RegionCatalog::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_validator::ValidationConfig;
    use proptest::prelude::*;

    fn cikupa_example() -> HouseAttributes {
        HouseAttributes {
            bedrooms: 3,
            bathrooms: 2,
            land_area: 100,
            building_area: 80,
            electrical_power: 1300,
            floors: 1,
            carports: 1,
            servant_bedrooms: 0,
            servant_bathrooms: 0,
            region: "Cikupa".to_string(),
        }
    }

    #[test]
    fn test_cikupa_example_row() {
        let encoder = FeatureEncoder::default();
        let row = encoder.encode(&cikupa_example()).unwrap();

        let expected = [3.0, 2.0, 101f64.ln(), 81f64.ln(), 1300.0, 1.0, 1.0, 0.0, 0.0];
        for (got, want) in row.numeric().iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{} != {}", got, want);
        }

        assert_eq!(row.len(), 30);
        assert_eq!(row.get("kec_Cikupa"), Some(1.0));
        assert_eq!(row.indicators().iter().sum::<f64>(), 1.0);
        assert_eq!(row.indicators()[1], 1.0);
        assert_eq!(row.columns(), encoder.schema().columns());
    }

    #[test]
    fn test_unsupported_region_is_rejected() {
        let encoder = FeatureEncoder::default();
        let attrs = HouseAttributes {
            region: "Sukadiri".into(),
            ..cikupa_example()
        };
        assert_eq!(
            encoder.encode(&attrs),
            Err(EncodeError::RegionUnavailable("Sukadiri".into()))
        );
    }

    #[test]
    fn test_custom_catalog_changes_width() {
        let catalog = RegionCatalog::new(vec!["Cikupa".into(), "Mauk".into()], vec![]).unwrap();
        let encoder = FeatureEncoder::new(catalog);
        let row = encoder.encode(&cikupa_example()).unwrap();
        assert_eq!(row.len(), 11);
        assert_eq!(row.indicators(), &[1.0, 0.0]);
    }

    #[test]
    fn test_vector_rejects_mismatched_lengths() {
        let columns: Arc<[String]> = vec!["a".to_string()].into();
        assert!(FeatureVector::new(columns, vec![1.0, 2.0]).is_err());
    }

    fn attributes_in_bounds() -> impl Strategy<Value = HouseAttributes> {
        let b = ValidationConfig::default();
        (
            (b.bedrooms.min..=b.bedrooms.max, b.bathrooms.min..=b.bathrooms.max),
            (b.land_area.min..=b.land_area.max, b.building_area.min..=b.building_area.max),
            b.electrical_power.min..=b.electrical_power.max,
            (b.floors.min..=b.floors.max, b.carports.min..=b.carports.max),
            (b.servant_bedrooms.min..=b.servant_bedrooms.max, b.servant_bathrooms.min..=b.servant_bathrooms.max),
            0usize..21,
        )
            .prop_map(|((bed, bath), (land, building), power, (floors, carports), (sbed, sbath), r)| {
                HouseAttributes {
                    bedrooms: bed,
                    bathrooms: bath,
                    land_area: land,
                    building_area: building,
                    electrical_power: power,
                    floors,
                    carports,
                    servant_bedrooms: sbed,
                    servant_bathrooms: sbath,
                    region: RegionCatalog::default().supported()[r].clone(),
                }
            })
    }

    proptest! {
        #[test]
        fn prop_numeric_columns_follow_transforms(attrs in attributes_in_bounds()) {
            let encoder = FeatureEncoder::default();
            let row = encoder.encode(&attrs).unwrap();

            prop_assert_eq!(row.len(), NUMERIC_FEATURES + encoder.catalog().len());
            prop_assert_eq!(row.get("Luas Tanah"), Some(f64::from(attrs.land_area).ln_1p()));
            prop_assert_eq!(row.get("Luas Bangunan"), Some(f64::from(attrs.building_area).ln_1p()));
            prop_assert_eq!(row.get("Kamar Tidur"), Some(f64::from(attrs.bedrooms)));
            prop_assert_eq!(row.get("Daya Listrik"), Some(f64::from(attrs.electrical_power)));
            prop_assert_eq!(row.get("Kamar Mandi Pembantu"), Some(f64::from(attrs.servant_bathrooms)));
        }

        #[test]
        fn prop_selected_region_is_hot(attrs in attributes_in_bounds()) {
            let encoder = FeatureEncoder::default();
            let row = encoder.encode(&attrs).unwrap();
            let label = RegionCatalog::column_label(&attrs.region);

            prop_assert_eq!(row.get(&label), Some(1.0));
            prop_assert_eq!(row.indicators().iter().filter(|v| **v != 0.0).count(), 1);
            let expected = encoder.catalog().indicators(&attrs.region).unwrap();
            prop_assert_eq!(row.indicators(), expected.as_slice());
        }
    }
}
