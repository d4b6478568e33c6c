//! Raw House Attributes

use data_validator::{ValidationConfig, ValidationResult, Validator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of numeric columns preceding the region indicators
pub const NUMERIC_FEATURES: usize = 9;

/// User-supplied attributes for one estimate request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseAttributes {
    pub bedrooms: u32,
    pub bathrooms: u32,
    /// Land area in m²
    pub land_area: u32,
    /// Building area in m²
    pub building_area: u32,
    /// Electrical capacity in Watt
    pub electrical_power: u32,
    pub floors: u32,
    pub carports: u32,
    pub servant_bedrooms: u32,
    pub servant_bathrooms: u32,
    /// Region (kecamatan) name
    pub region: String,
}

impl HouseAttributes {
    /// Attributes pre-filled with the form defaults
    pub fn from_defaults(config: &ValidationConfig, region: impl Into<String>) -> Self {
        Self {
            bedrooms: config.bedrooms.default,
            bathrooms: config.bathrooms.default,
            land_area: config.land_area.default,
            building_area: config.building_area.default,
            electrical_power: config.electrical_power.default,
            floors: config.floors.default,
            carports: config.carports.default,
            servant_bedrooms: config.servant_bedrooms.default,
            servant_bathrooms: config.servant_bathrooms.default,
            region: region.into(),
        }
    }

    /// Build attributes from raw form fields
    ///
    /// Fields that are missing or not a whole number keep their default and
    /// are reported in the returned result, so a rejected form can be shown
    /// again with everything else the user entered.
    pub fn from_fields(
        fields: &HashMap<String, String>,
        validator: &Validator,
    ) -> (Self, ValidationResult) {
        let region = fields.get("region").map(|r| r.trim()).unwrap_or_default();
        let mut attrs = Self::from_defaults(validator.config(), region);

        let checks = NumericField::ALL.iter().map(|field| {
            let raw = fields.get(field.key()).map(String::as_str);
            validator
                .parse_field(field.key(), raw)
                .map(|value| field.set(&mut attrs, value))
        });
        let result = ValidationResult::collect(checks);

        (attrs, result)
    }

    /// Check every numeric field against its bounds and require a region
    pub fn validate(&self, validator: &Validator) -> ValidationResult {
        ValidationResult::collect([
            validator.validate_bedrooms(self.bedrooms),
            validator.validate_bathrooms(self.bathrooms),
            validator.validate_land_area(self.land_area),
            validator.validate_building_area(self.building_area),
            validator.validate_electrical_power(self.electrical_power),
            validator.validate_floors(self.floors),
            validator.validate_carports(self.carports),
            validator.validate_servant_bedrooms(self.servant_bedrooms),
            validator.validate_servant_bathrooms(self.servant_bathrooms),
            validator.validate_required("region", &self.region),
        ])
    }
}

/// Transform applied to a numeric column before it enters the row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Value passes through unchanged
    Identity,
    /// `ln(1 + x)`
    Log1p,
}

impl Transform {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Transform::Identity => value,
            Transform::Log1p => value.ln_1p(),
        }
    }
}

/// The nine numeric model inputs, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Bedrooms,
    Bathrooms,
    LandArea,
    BuildingArea,
    ElectricalPower,
    Floors,
    Carports,
    ServantBedrooms,
    ServantBathrooms,
}

impl NumericField {
    /// All fields in the order the model expects them
    pub const ALL: [NumericField; NUMERIC_FEATURES] = [
        NumericField::Bedrooms,
        NumericField::Bathrooms,
        NumericField::LandArea,
        NumericField::BuildingArea,
        NumericField::ElectricalPower,
        NumericField::Floors,
        NumericField::Carports,
        NumericField::ServantBedrooms,
        NumericField::ServantBathrooms,
    ];

    /// Attribute name, shared with the validator and the form
    pub fn key(&self) -> &'static str {
        match self {
            NumericField::Bedrooms => "bedrooms",
            NumericField::Bathrooms => "bathrooms",
            NumericField::LandArea => "land_area",
            NumericField::BuildingArea => "building_area",
            NumericField::ElectricalPower => "electrical_power",
            NumericField::Floors => "floors",
            NumericField::Carports => "carports",
            NumericField::ServantBedrooms => "servant_bedrooms",
            NumericField::ServantBathrooms => "servant_bathrooms",
        }
    }

    /// Column label the model was trained with
    pub fn column(&self) -> &'static str {
        match self {
            NumericField::Bedrooms => "Kamar Tidur",
            NumericField::Bathrooms => "Kamar Mandi",
            NumericField::LandArea => "Luas Tanah",
            NumericField::BuildingArea => "Luas Bangunan",
            NumericField::ElectricalPower => "Daya Listrik",
            NumericField::Floors => "Jumlah Lantai",
            NumericField::Carports => "Carport",
            NumericField::ServantBedrooms => "Kamar Tidur Pembantu",
            NumericField::ServantBathrooms => "Kamar Mandi Pembantu",
        }
    }

    pub fn transform(&self) -> Transform {
        match self {
            NumericField::LandArea | NumericField::BuildingArea => Transform::Log1p,
            _ => Transform::Identity,
        }
    }

    /// Raw value of this field
    pub fn value(&self, attrs: &HouseAttributes) -> u32 {
        match self {
            NumericField::Bedrooms => attrs.bedrooms,
            NumericField::Bathrooms => attrs.bathrooms,
            NumericField::LandArea => attrs.land_area,
            NumericField::BuildingArea => attrs.building_area,
            NumericField::ElectricalPower => attrs.electrical_power,
            NumericField::Floors => attrs.floors,
            NumericField::Carports => attrs.carports,
            NumericField::ServantBedrooms => attrs.servant_bedrooms,
            NumericField::ServantBathrooms => attrs.servant_bathrooms,
        }
    }

    pub fn set(&self, attrs: &mut HouseAttributes, value: u32) {
        let slot = match self {
            NumericField::Bedrooms => &mut attrs.bedrooms,
            NumericField::Bathrooms => &mut attrs.bathrooms,
            NumericField::LandArea => &mut attrs.land_area,
            NumericField::BuildingArea => &mut attrs.building_area,
            NumericField::ElectricalPower => &mut attrs.electrical_power,
            NumericField::Floors => &mut attrs.floors,
            NumericField::Carports => &mut attrs.carports,
            NumericField::ServantBedrooms => &mut attrs.servant_bedrooms,
            NumericField::ServantBathrooms => &mut attrs.servant_bathrooms,
        };
        *slot = value;
    }

    /// Transformed value as it appears in the feature row
    pub fn encode(&self, attrs: &HouseAttributes) -> f64 {
        self.transform().apply(f64::from(self.value(attrs)))
    }
}
