use crate::neural_network::layer::TrainingParameters;
use crate::neural_network::layer::layer_weight::LayerWeight;

/// Defines the interface an optimizer needs from a trainable unit.
///
/// Forward and backward passes are unit specific (the Gated Diffusive Unit consumes three
/// inputs), so this trait only covers what is shared: introspection and the parameter
/// updates applied by the optimization algorithms between forward calls.
pub trait TrainableUnit: std::any::Any + Send + Sync {
    /// Returns the type name of the unit (e.g. "GDU").
    ///
    /// # Returns
    ///
    /// * `&str` - A string slice representing the unit type
    fn layer_type(&self) -> &str;

    /// Returns a description of the output shape of the unit.
    ///
    /// # Returns
    ///
    /// - `String` - A string describing the output dimensions
    fn output_shape(&self) -> String;

    /// Returns the total number of trainable parameters in the unit.
    ///
    /// # Returns
    ///
    /// - `TrainingParameters` - The count of parameters as an enum variant
    fn param_count(&self) -> TrainingParameters;

    /// Updates the unit parameters using Stochastic Gradient Descent.
    ///
    /// # Parameters
    ///
    /// - `_lr` - Learning rate for parameter updates
    fn update_parameters_sgd(&mut self, _lr: f32);

    /// Updates the unit parameters using Adam optimizer.
    ///
    /// # Parameters
    ///
    /// - `_lr` - Learning rate for parameter updates
    /// - `_beta1` - Exponential decay rate for the first moment estimates
    /// - `_beta2` - Exponential decay rate for the second moment estimates
    /// - `_epsilon` - Small constant for numerical stability
    /// - `_t` - Current training iteration
    fn update_parameters_adam(
        &mut self,
        _lr: f32,
        _beta1: f32,
        _beta2: f32,
        _epsilon: f32,
        _t: u64,
    );

    /// Updates the unit parameters using RMSprop optimizer.
    ///
    /// # Parameters
    ///
    /// - `_lr` - Learning rate for parameter updates
    /// - `_rho` - Decay rate for moving average of squared gradients
    /// - `_epsilon` - Small constant for numerical stability
    fn update_parameters_rmsprop(&mut self, _lr: f32, _rho: f32, _epsilon: f32);

    /// Updates the unit parameters using AdaGrad optimizer.
    ///
    /// # Parameters
    ///
    /// - `_lr` - Learning rate for parameter updates
    /// - `_epsilon` - Small constant for numerical stability
    fn update_parameters_ada_grad(&mut self, _lr: f32, _epsilon: f32);

    /// Returns a reference to all weights in the unit.
    ///
    /// # Returns
    ///
    /// - `LayerWeight<'_>` - An enum containing references to the unit's weights
    fn get_weights(&self) -> LayerWeight<'_>;
}

/// Defines the interface for optimization algorithms.
///
/// This trait provides methods to update unit parameters during
/// the training process.
pub trait Optimizer {
    /// Updates the parameters of a unit according to the optimization algorithm.
    ///
    /// # Parameters
    ///
    /// - `unit` - The unit whose parameters should be updated
    fn update(&mut self, unit: &mut dyn TrainableUnit);
}
