use super::*;

/// Validates that a dimension value is greater than 0
///
/// # Parameters
///
/// - `value` - The dimension value to validate
/// - `name` - The name of the dimension for error messages
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` if validation fails
pub(super) fn validate_dimension_greater_than_zero(
    value: usize,
    name: &str,
) -> Result<(), ModelError> {
    if value == 0 {
        return Err(ModelError::InputValidationError(format!(
            "{} must be greater than 0",
            name
        )));
    }
    Ok(())
}

/// Validates all five GDU dimensions
///
/// # Returns
///
/// * `Ok(())` if validation passes
/// * `Err(ModelError)` naming the first dimension that is 0
pub(super) fn validate_gdu_dimensions(
    g_sz: usize,
    x_sz: usize,
    z_sz: usize,
    h_sz: usize,
    out_sz: usize,
) -> Result<(), ModelError> {
    validate_dimension_greater_than_zero(g_sz, "g_sz")?;
    validate_dimension_greater_than_zero(x_sz, "x_sz")?;
    validate_dimension_greater_than_zero(z_sz, "z_sz")?;
    validate_dimension_greater_than_zero(h_sz, "h_sz")?;
    validate_dimension_greater_than_zero(out_sz, "out_sz")?;
    Ok(())
}

/// Validates the feature width of one input matrix
fn validate_input_width(input: &Array2<f32>, expected: usize, name: &str) -> Result<(), ModelError> {
    if input.ncols() != expected {
        return Err(ModelError::InputValidationError(format!(
            "input {} has {} features, expected {}",
            name,
            input.ncols(),
            expected
        )));
    }
    Ok(())
}

/// Validates the three forward inputs against the configured widths
///
/// # Parameters
///
/// - `x`, `z`, `h` - Input matrices with shape (batch, width)
/// - `x_sz`, `z_sz`, `h_sz` - Expected widths
///
/// # Returns
///
/// * `Ok(usize)` - The shared batch size
/// * `Err(ModelError)` if a width is wrong or the batch sizes disagree
pub(super) fn validate_forward_inputs(
    x: &Array2<f32>,
    z: &Array2<f32>,
    h: &Array2<f32>,
    x_sz: usize,
    z_sz: usize,
    h_sz: usize,
) -> Result<usize, ModelError> {
    validate_input_width(x, x_sz, "x")?;
    validate_input_width(z, z_sz, "z")?;
    validate_input_width(h, h_sz, "h")?;

    let batch = x.nrows();
    if z.nrows() != batch || h.nrows() != batch {
        return Err(ModelError::InputValidationError(format!(
            "Batch size mismatch: x has {} rows, z has {} rows, h has {} rows",
            batch,
            z.nrows(),
            h.nrows()
        )));
    }
    Ok(batch)
}

/// Validates that the upstream gradient matches the cached output shape
pub(super) fn validate_grad_output(
    grad_output: &Array2<f32>,
    expected: (usize, usize),
) -> Result<(), ModelError> {
    if grad_output.dim() != expected {
        return Err(ModelError::InputValidationError(format!(
            "grad_output has shape {:?}, expected {:?}",
            grad_output.dim(),
            expected
        )));
    }
    Ok(())
}
