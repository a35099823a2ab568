use crate::error::ModelError;
use crate::neural_network::layer::{GDUConfig, GDUParameters};
use crate::neural_network::neural_network_trait::{Optimizer, TrainableUnit};
use ndarray::Zip;

/// AdaGrad optimizer and its accumulated squared gradients
pub mod ada_grad;
/// Adam optimizer and its moment estimates
pub mod adam;
/// Hyperparameter validation shared by the optimizers
mod input_validation_function;
/// RMSprop optimizer and its moving average of squared gradients
pub mod rms_prop;
/// Stochastic Gradient Descent optimizer
pub mod sgd;

pub use ada_grad::{AdaGrad, AdaGradStates};
pub use adam::{Adam, AdamStates};
pub use rms_prop::{RMSprop, RMSpropCache};
pub use sgd::SGD;

use input_validation_function::*;

/// Gradient clipping value to prevent exploding gradients
const GRADIENT_CLIP_VALUE: f32 = 5.0;

/// Threshold for switching between sequential and parallel computation.
/// Tensors with fewer elements than this are updated sequentially
/// to avoid parallelization overhead.
const OPTIMIZER_PARALLEL_THRESHOLD: usize = 1024;

#[inline]
fn clip_gradient(g: f32) -> f32 {
    g.clamp(-GRADIENT_CLIP_VALUE, GRADIENT_CLIP_VALUE)
}

/// Optimizer state owned by a unit, created lazily on the first step of each algorithm
///
/// # Fields
///
/// - `adam_states` - First and second moment estimates for Adam
/// - `rmsprop_cache` - Moving average of squared gradients for RMSprop
/// - `ada_grad_cache` - Accumulated squared gradients for AdaGrad
#[derive(Debug, Clone, Default)]
pub struct OptimizerCache {
    pub adam_states: Option<AdamStates>,
    pub rmsprop_cache: Option<RMSpropCache>,
    pub ada_grad_cache: Option<AdaGradStates>,
}
