use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub brand: String,
}

/// Full set of writable product fields, used by create and PUT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub sku: String,
    pub price: f64,
    pub brand: String,
}

impl ProductInput {
    /// Field-level validation; the map is keyed by field name
    pub fn validate(&self) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();

        for (field, value) in [("name", &self.name), ("sku", &self.sku), ("brand", &self.brand)] {
            if value.trim().is_empty() {
                errors.insert(field.to_string(), "must not be empty".to_string());
            }
        }
        if !self.price.is_finite() || self.price < 0.0 {
            errors.insert("price".to_string(), "must be a non-negative number".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Partial update; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price: Option<f64>,
    pub brand: Option<String>,
}

impl ProductPatch {
    pub fn apply(&self, current: &Product) -> ProductInput {
        ProductInput {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            sku: self.sku.clone().unwrap_or_else(|| current.sku.clone()),
            price: self.price.unwrap_or(current.price),
            brand: self.brand.clone().unwrap_or_else(|| current.brand.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: 1,
            name: "New Product".to_string(),
            sku: "1234567890".to_string(),
            price: 99.9,
            brand: "Luuna".to_string(),
        }
    }

    #[test]
    fn patch_keeps_unset_fields() {
        let patch = ProductPatch {
            sku: Some("12301230123".to_string()),
            ..Default::default()
        };
        let merged = patch.apply(&product());

        assert_eq!(merged.sku, "12301230123");
        assert_eq!(merged.name, "New Product");
        assert_eq!(merged.price, 99.9);
        assert_eq!(merged.brand, "Luuna");
    }

    #[test]
    fn validate_reports_each_bad_field() {
        let input = ProductInput {
            name: " ".to_string(),
            sku: "abc".to_string(),
            price: -1.0,
            brand: String::new(),
        };
        let errors = input.validate().unwrap_err();

        assert_eq!(errors.len(), 3);
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("price"));
        assert!(errors.contains_key("brand"));
    }
}
