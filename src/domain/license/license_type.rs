//! Recognized license types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Kind of permit a store uploads for compliance review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseType {
    BusinessLicense,
    SellerPermit,
    TaxRegistration,
    FoodPermit,
    AlcoholPermit,
    Other,
}

impl LicenseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseType::BusinessLicense => "business_license",
            LicenseType::SellerPermit => "seller_permit",
            LicenseType::TaxRegistration => "tax_registration",
            LicenseType::FoodPermit => "food_permit",
            LicenseType::AlcoholPermit => "alcohol_permit",
            LicenseType::Other => "other",
        }
    }
}

impl fmt::Display for LicenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("license_type"));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "business_license" => Ok(LicenseType::BusinessLicense),
            "seller_permit" => Ok(LicenseType::SellerPermit),
            "tax_registration" => Ok(LicenseType::TaxRegistration),
            "food_permit" => Ok(LicenseType::FoodPermit),
            "alcohol_permit" => Ok(LicenseType::AlcoholPermit),
            "other" => Ok(LicenseType::Other),
            other => Err(ValidationError::invalid_format(
                "license_type",
                format!("unknown license type '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types_case_insensitively() {
        assert_eq!(
            "Seller_Permit".parse::<LicenseType>().unwrap(),
            LicenseType::SellerPermit
        );
        assert_eq!(" other ".parse::<LicenseType>().unwrap(), LicenseType::Other);
    }

    #[test]
    fn blank_type_names_the_field() {
        let err = "  ".parse::<LicenseType>().unwrap_err();
        assert_eq!(err, ValidationError::empty_field("license_type"));
    }

    #[test]
    fn unknown_type_is_invalid_format() {
        let err = "fishing_license".parse::<LicenseType>().unwrap_err();
        assert_eq!(err.field(), "license_type");
        assert!(err.to_string().contains("fishing_license"));
    }
}
