//! Domain model for the RYG report: materials and their product models.

/// A product model resolved from the reference sheet, carrying the demand
/// quantity of the column it was found under.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductModel {
    pub name: String,
    pub risk: String,
    pub program: String,
    pub apn_pcba: String,
    pub apn_description: String,
    pub qty: f64,
}

impl ProductModel {
    /// The "not found in reference sheet" sentinel. A concrete value, not an
    /// absence: consumers compare with [`ProductModel::is_null`] and must
    /// filter it out before aggregation.
    pub fn null() -> Self {
        Self {
            name: "NULL".to_string(),
            risk: "NULL".to_string(),
            program: "NULL".to_string(),
            apn_pcba: "NULL".to_string(),
            apn_description: "NULL".to_string(),
            qty: 0.0,
        }
    }

    pub fn is_null(&self) -> bool {
        *self == Self::null()
    }
}

/// One demand row's material: a part number inside a group, plus the models
/// that carry nonzero demand on that row (insertion order = column order).
#[derive(Debug, Clone, Default)]
pub struct Material {
    pub group: String,
    pub part_number: String,
    pub models: Vec<ProductModel>,
}

impl Material {
    pub fn new(group: impl Into<String>, part_number: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            part_number: part_number.into(),
            models: Vec::new(),
        }
    }

    /// "Single" for zero or one attached model, "Multiple" otherwise.
    pub fn material_type(&self) -> &'static str {
        if self.models.len() <= 1 {
            "Single"
        } else {
            "Multiple"
        }
    }
}
