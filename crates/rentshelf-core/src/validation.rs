//! # Validation Module
//!
//! Input validation for the shipping step and order creation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation                                                  │
//! │  └── Tier picker only offers 7/14/21/30 days                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Shipping details complete (checkout Shipping → Payment)            │
//! │  └── Order request complete (before persistence)                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database                                                      │
//! │  └── NOT NULL / FOREIGN KEY constraints                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::ShippingDetails;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates that a string field is present and not just whitespace.
///
/// ## Example
/// ```rust
/// use rentshelf_core::validation::validate_required;
///
/// assert!(validate_required("city", "Pune").is_ok());
/// assert!(validate_required("city", "   ").is_err());
/// ```
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Lists every required shipping field left blank, in form order.
///
/// `country` is optional.
pub fn missing_shipping_fields(details: &ShippingDetails) -> Vec<&'static str> {
    [
        ("full_name", details.full_name.as_str()),
        ("street_address", details.street_address.as_str()),
        ("city", details.city.as_str()),
        ("state", details.state.as_str()),
        ("postal_code", details.postal_code.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect()
}

/// Validates shipping details at the Shipping → Payment boundary.
///
/// Fails with every blank required field so the form can flag them at once.
pub fn validate_shipping_details(details: &ShippingDetails) -> ValidationResult<()> {
    let missing = missing_shipping_fields(details);
    if missing.is_empty() {
        return Ok(());
    }

    Err(ValidationError::MissingFields {
        fields: missing.into_iter().map(String::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ShippingDetails {
        ShippingDetails {
            full_name: "Asha Rao".to_string(),
            street_address: "12 MG Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            postal_code: "411001".to_string(),
            country: String::new(),
        }
    }

    #[test]
    fn test_complete_details_pass_without_country() {
        assert!(validate_shipping_details(&complete()).is_ok());
    }

    #[test]
    fn test_each_blank_required_field_is_rejected() {
        let blankers: [(&str, fn(&mut ShippingDetails)); 5] = [
            ("full_name", |d| d.full_name.clear()),
            ("street_address", |d| d.street_address.clear()),
            ("city", |d| d.city = "  ".to_string()),
            ("state", |d| d.state.clear()),
            ("postal_code", |d| d.postal_code.clear()),
        ];

        for (field, blank) in blankers {
            let mut details = complete();
            blank(&mut details);
            assert_eq!(
                validate_shipping_details(&details),
                Err(ValidationError::MissingFields {
                    fields: vec![field.to_string()]
                })
            );
        }
    }

    #[test]
    fn test_missing_fields_lists_all() {
        let details = ShippingDetails::default();
        assert_eq!(
            missing_shipping_fields(&details),
            vec!["full_name", "street_address", "city", "state", "postal_code"]
        );
    }
}
