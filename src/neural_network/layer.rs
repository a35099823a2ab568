use crate::error::ModelError;
use ndarray::{Array1, Array2, ArrayViewD, ArrayViewMutD, Axis};
use rand::Rng;

/// Gated Diffusive Unit: configuration, parameter table and the trainable cell
pub mod gated_unit;
/// Borrowed views over unit weights
pub mod layer_weight;

pub use gated_unit::*;
pub use layer_weight::*;

/// Number of parameters reported by a trainable unit
///
/// # Variants
///
/// - `Trainable` - Number of parameters updated by the optimizers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingParameters {
    Trainable(usize),
}
