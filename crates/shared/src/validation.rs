//! Common validation utilities.

use validator::ValidationError;

use crate::event_code::is_valid_event_code;

/// Smallest seat capacity a car can be registered with.
pub const MIN_SEAT_CAPACITY: i32 = 1;

/// Largest seat capacity a car can be registered with.
pub const MAX_SEAT_CAPACITY: i32 = 8;

/// Minimum length of a car PIN, after trimming.
pub const MIN_PIN_LENGTH: usize = 4;

/// Longest stored person name, in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// Validates that a required text field is not empty or whitespace only.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a seat capacity lies within 1 to 8.
pub fn validate_seat_capacity(capacity: i32) -> Result<(), ValidationError> {
    if (MIN_SEAT_CAPACITY..=MAX_SEAT_CAPACITY).contains(&capacity) {
        Ok(())
    } else {
        let mut err = ValidationError::new("seat_capacity_range");
        err.message = Some("Seat capacity must be between 1 and 8".into());
        Err(err)
    }
}

/// Validates that a person name fits the stored column.
pub fn validate_name_length(name: &str) -> Result<(), ValidationError> {
    if name.chars().count() <= MAX_NAME_LENGTH {
        Ok(())
    } else {
        let mut err = ValidationError::new("name_length");
        err.message = Some("Name must be at most 100 characters".into());
        Err(err)
    }
}

/// Validates a car PIN: at least four characters once trimmed.
pub fn validate_car_pin(pin: &str) -> Result<(), ValidationError> {
    if pin.trim().chars().count() >= MIN_PIN_LENGTH {
        Ok(())
    } else {
        let mut err = ValidationError::new("pin_length");
        err.message = Some("PIN must be at least 4 characters".into());
        Err(err)
    }
}

/// Validates the shape of an event code (8-9 uppercase alphanumerics).
pub fn validate_event_code(code: &str) -> Result<(), ValidationError> {
    if is_valid_event_code(code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("event_code_format");
        err.message = Some("Event code must be 8 or 9 uppercase letters or digits".into());
        Err(err)
    }
}

/// Validates that a seat index is non-negative.
pub fn validate_seat_index(index: i32) -> Result<(), ValidationError> {
    if index >= 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("seat_index_range");
        err.message = Some("Seat index must be non-negative".into());
        Err(err)
    }
}
