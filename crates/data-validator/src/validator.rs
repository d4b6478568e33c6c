//! Data Validator for Range Checking

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inclusive bounds and form default for one numeric attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldBounds {
    /// Smallest accepted value
    pub min: u32,
    /// Largest accepted value
    pub max: u32,
    /// Value pre-filled in the form
    pub default: u32,
}

impl FieldBounds {
    /// Create bounds
    pub const fn new(min: u32, max: u32, default: u32) -> Self {
        Self { min, max, default }
    }

    /// Whether `value` lies within `[min, max]`
    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Bedroom count
    pub bedrooms: FieldBounds,
    /// Bathroom count
    pub bathrooms: FieldBounds,
    /// Land area (m²)
    pub land_area: FieldBounds,
    /// Building area (m²)
    pub building_area: FieldBounds,
    /// Electrical capacity (Watt)
    pub electrical_power: FieldBounds,
    /// Floor count
    pub floors: FieldBounds,
    /// Carport capacity (cars)
    pub carports: FieldBounds,
    /// Servant bedroom count
    pub servant_bedrooms: FieldBounds,
    /// Servant bathroom count
    pub servant_bathrooms: FieldBounds,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            bedrooms: FieldBounds::new(1, 10, 3),
            bathrooms: FieldBounds::new(1, 10, 2),
            land_area: FieldBounds::new(10, 1000, 100),
            building_area: FieldBounds::new(10, 1000, 80),
            electrical_power: FieldBounds::new(450, 6600, 1300),
            floors: FieldBounds::new(1, 5, 1),
            carports: FieldBounds::new(0, 5, 1),
            servant_bedrooms: FieldBounds::new(0, 5, 0),
            servant_bathrooms: FieldBounds::new(0, 5, 0),
        }
    }
}

impl ValidationConfig {
    /// All bounds paired with their field names, in form order
    pub fn fields(&self) -> [(&'static str, FieldBounds); 9] {
        [
            ("bedrooms", self.bedrooms),
            ("bathrooms", self.bathrooms),
            ("land_area", self.land_area),
            ("building_area", self.building_area),
            ("electrical_power", self.electrical_power),
            ("floors", self.floors),
            ("carports", self.carports),
            ("servant_bedrooms", self.servant_bedrooms),
            ("servant_bathrooms", self.servant_bathrooms),
        ]
    }

    /// Look up bounds by field name
    pub fn bounds(&self, field: &str) -> Option<FieldBounds> {
        self.fields()
            .into_iter()
            .find(|(name, _)| *name == field)
            .map(|(_, bounds)| bounds)
    }

    /// Check that every field has `min <= default <= max`
    pub fn check(&self) -> Result<(), ValidationError> {
        for (field, b) in self.fields() {
            if b.min > b.max || !b.contains(b.default) {
                return Err(ValidationError::InvalidBounds {
                    field,
                    min: b.min,
                    max: b.max,
                    default: b.default,
                });
            }
        }
        Ok(())
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            fields_checked,
        }
    }

    /// Collect the outcome of several field checks
    pub fn collect<I>(checks: I) -> Self
    where
        I: IntoIterator<Item = Result<(), ValidationError>>,
    {
        let mut fields_checked = 0;
        let mut errors = Vec::new();
        for check in checks {
            fields_checked += 1;
            if let Err(e) = check {
                errors.push(e);
            }
        }
        Self::invalid(errors, fields_checked)
    }

    /// All error messages joined with `"; "`
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Data validator for house attributes
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Bounds this validator enforces
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: u32,
        bounds: FieldBounds,
    ) -> Result<(), ValidationError> {
        if bounds.contains(value) {
            Ok(())
        } else {
            debug!("{} rejected: {} not in [{}, {}]", field, value, bounds.min, bounds.max);
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: bounds.min,
                max: bounds.max,
            })
        }
    }

    /// Validate bedroom count
    pub fn validate_bedrooms(&self, value: u32) -> Result<(), ValidationError> {
        self.validate_range("bedrooms", value, self.config.bedrooms)
    }

    /// Validate bathroom count
    pub fn validate_bathrooms(&self, value: u32) -> Result<(), ValidationError> {
        self.validate_range("bathrooms", value, self.config.bathrooms)
    }

    /// Validate land area
    pub fn validate_land_area(&self, value: u32) -> Result<(), ValidationError> {
        self.validate_range("land_area", value, self.config.land_area)
    }

    /// Validate building area
    pub fn validate_building_area(&self, value: u32) -> Result<(), ValidationError> {
        self.validate_range("building_area", value, self.config.building_area)
    }

    /// Validate electrical capacity
    pub fn validate_electrical_power(&self, value: u32) -> Result<(), ValidationError> {
        self.validate_range("electrical_power", value, self.config.electrical_power)
    }

    /// Validate floor count
    pub fn validate_floors(&self, value: u32) -> Result<(), ValidationError> {
        self.validate_range("floors", value, self.config.floors)
    }

    /// Validate carport count
    pub fn validate_carports(&self, value: u32) -> Result<(), ValidationError> {
        self.validate_range("carports", value, self.config.carports)
    }

    /// Validate servant bedroom count
    pub fn validate_servant_bedrooms(&self, value: u32) -> Result<(), ValidationError> {
        self.validate_range("servant_bedrooms", value, self.config.servant_bedrooms)
    }

    /// Validate servant bathroom count
    pub fn validate_servant_bathrooms(&self, value: u32) -> Result<(), ValidationError> {
        self.validate_range("servant_bathrooms", value, self.config.servant_bathrooms)
    }

    /// Reject empty or whitespace-only text fields
    pub fn validate_required(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::MissingField(field))
        } else {
            Ok(())
        }
    }

    /// Parse a raw numeric field as submitted by a form
    pub fn parse_field(
        &self,
        field: &'static str,
        raw: Option<&str>,
    ) -> Result<u32, ValidationError> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty());
        let raw = raw.ok_or(ValidationError::MissingField(field))?;
        raw.parse::<u32>()
            .map_err(|_| ValidationError::InvalidFormat(format!("{} '{}'", field, raw)))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
