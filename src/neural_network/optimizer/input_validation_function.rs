use super::*;

/// Validates that a value is positive and finite.
///
/// # Parameters
///
/// - `value` - The value to validate
/// - `param_name` - The name of the parameter (for error messages)
///
/// # Returns
///
/// - `Ok(())` if the value is positive and finite
/// - `Err(ModelError::InputValidationError)` otherwise
pub(super) fn validate_positive_finite(value: f32, param_name: &str) -> Result<(), ModelError> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(ModelError::InputValidationError(format!(
            "{} must be positive and finite, got {}",
            param_name, value
        )));
    }
    Ok(())
}

/// Validates that a decay rate (beta or rho) is in the range [0, 1).
///
/// # Returns
///
/// - `Ok(())` if the value is in range
/// - `Err(ModelError::InputValidationError)` otherwise
pub(super) fn validate_decay_rate(value: f32, param_name: &str) -> Result<(), ModelError> {
    if !(0.0..1.0).contains(&value) {
        return Err(ModelError::InputValidationError(format!(
            "{} must be in range [0, 1), got {}",
            param_name, value
        )));
    }
    Ok(())
}
