//! Country-level constants and cost bands.

use serde::{Deserialize, Serialize};

pub const COUNTRY_NAME: &str = "United Arab Emirates";
pub const COUNTRY_CODE: &str = "UAE";
pub const COUNTRY_REGION: &str = "Middle East";
pub const CURRENCY: &str = "AED";
pub const CURRENCY_SYMBOL: &str = "د.إ";

/// Schema version tag written into the document metadata.
pub const API_VERSION: &str = "1.0";

/// Source list carried by the country aggregate and the metadata.
pub const DATA_SOURCES: [&str; 3] = [
    "https://www.caa.ae/Pages/Institutes/All.aspx",
    "https://www.bachelorsportal.com",
    "https://www.universityliving.com",
];

/// Monthly student living costs in AED.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostOfLiving {
    pub accommodation_min: f64,
    pub accommodation_max: f64,
    pub food_min: f64,
    pub food_max: f64,
    pub transport_min: f64,
    pub transport_max: f64,
    pub utilities_min: f64,
    pub utilities_max: f64,
    pub total_min: f64,
    pub total_max: f64,
    pub currency: String,
}

impl Default for CostOfLiving {
    fn default() -> Self {
        Self {
            accommodation_min: 3500.0,
            accommodation_max: 6000.0,
            food_min: 500.0,
            food_max: 1200.0,
            transport_min: 350.0,
            transport_max: 500.0,
            utilities_min: 300.0,
            utilities_max: 600.0,
            total_min: 4500.0,
            total_max: 6500.0,
            currency: CURRENCY.to_string(),
        }
    }
}

/// Annual tuition bands in AED.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuitionRange {
    pub undergraduate_min: f64,
    pub undergraduate_max: f64,
    pub postgraduate_min: f64,
    pub postgraduate_max: f64,
    pub currency: String,
}

impl Default for TuitionRange {
    fn default() -> Self {
        Self {
            undergraduate_min: 25000.0,
            undergraduate_max: 75000.0,
            postgraduate_min: 30000.0,
            postgraduate_max: 120000.0,
            currency: CURRENCY.to_string(),
        }
    }
}

/// The single cost-of-living result of a run. Always fully populated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LivingCosts {
    pub cost_of_living: CostOfLiving,
    pub tuition_range: TuitionRange,
}
