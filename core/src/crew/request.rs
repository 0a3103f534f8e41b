use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::pipeline::Inputs;

/// Placeholder keys the travel crew reads.
pub const INPUT_KEYS: [&str; 4] = ["origin", "cities", "date_range", "interests"];

/// The four user-supplied fields of a planning request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin: String,
    pub cities: Vec<String>,
    pub date_range: String,
    pub interests: Vec<String>,
}

/// Splits a comma list, trimming items and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl TripRequest {
    /// Builds a request from raw form fields (comma-separated lists).
    pub fn from_fields(
        origin: &str,
        cities: &str,
        date_range: &str,
        interests: &str,
    ) -> Result<Self, ValidationError> {
        let req = Self {
            origin: origin.trim().to_string(),
            cities: split_list(cities),
            date_range: date_range.trim().to_string(),
            interests: split_list(interests),
        };
        req.validate()?;
        Ok(req)
    }

    /// Every field must be non-empty after trimming; all offenders are reported.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let blank_list = |items: &[String]| items.iter().all(|s| s.trim().is_empty());

        let mut fields = Vec::new();
        if self.origin.trim().is_empty() {
            fields.push("origin");
        }
        if blank_list(&self.cities) {
            fields.push("cities");
        }
        if self.date_range.trim().is_empty() {
            fields.push("date_range");
        }
        if blank_list(&self.interests) {
            fields.push("interests");
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::EmptyFields { fields })
        }
    }

    pub fn to_inputs(&self) -> Inputs {
        let clean = |items: &[String]| -> Vec<String> {
            items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        };
        Inputs::new()
            .with("origin", self.origin.trim())
            .with("cities", clean(&self.cities))
            .with("date_range", self.date_range.trim())
            .with("interests", clean(&self.interests))
    }
}
