/// Error types that can occur while building, running or training a unit
///
/// # Variants
///
/// - `InputValidationError` - indicates a configuration, input tensor or hyperparameter that does not meet the expected shape or range
/// - `ProcessingError` - indicates that something went wrong while processing, e.g. a backward pass without a cached forward pass
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    InputValidationError(String),
    ProcessingError(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InputValidationError(msg) => write!(f, "Input validation error: {}", msg),
            ModelError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}
