//! Request validation for the plan endpoint

use tripcrew_core::api::TripRequest;

use super::models::{HttpServerError, PlanRequest};

const MAX_FIELD_CHARS: usize = 500;
const MAX_LIST_ITEMS: usize = 20;

fn check_len(field: &str, value: &str) -> Result<(), HttpServerError> {
    let len = value.chars().count();
    if len > MAX_FIELD_CHARS {
        return Err(HttpServerError::InvalidRequest(format!(
            "{field} too long ({len} chars, max {MAX_FIELD_CHARS})"
        )));
    }
    Ok(())
}

fn check_list(field: &str, items: &[String]) -> Result<(), HttpServerError> {
    if items.len() > MAX_LIST_ITEMS {
        return Err(HttpServerError::InvalidRequest(format!(
            "{field} has too many entries ({}, max {MAX_LIST_ITEMS})",
            items.len()
        )));
    }
    items.iter().try_for_each(|item| check_len(field, item))
}

/// Normalizes the body into a [`TripRequest`]; every blank field is reported at once.
pub fn validate_plan_request(req: PlanRequest) -> Result<TripRequest, HttpServerError> {
    let trip = TripRequest {
        origin: req.origin.trim().to_string(),
        cities: req.cities.into_items(),
        date_range: req.date_range.trim().to_string(),
        interests: req.interests.into_items(),
    };

    check_len("origin", &trip.origin)?;
    check_len("date_range", &trip.date_range)?;
    check_list("cities", &trip.cities)?;
    check_list("interests", &trip.interests)?;

    trip.validate()?;
    Ok(trip)
}
