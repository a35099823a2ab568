use super::*;

/// Stochastic Gradient Descent (SGD) optimizer.
///
/// A simple optimization algorithm that updates parameters in the direction
/// of the negative gradient, scaled by the learning rate.
///
/// # Fields
///
/// * `learning_rate` - Learning rate controlling the size of parameter updates
pub struct SGD {
    learning_rate: f32,
}

impl SGD {
    /// Creates a new SGD optimizer with the specified learning rate.
    ///
    /// # Parameters
    ///
    /// * `learning_rate` - Step size for parameter updates
    ///
    /// # Returns
    ///
    /// * `Result<Self, ModelError>` - A new SGD optimizer instance or an error
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If `learning_rate` is not positive and finite
    pub fn new(learning_rate: f32) -> Result<Self, ModelError> {
        validate_positive_finite(learning_rate, "learning_rate")?;
        Ok(Self { learning_rate })
    }

    /// Applies `param -= lr * clip(grad)` to every tensor of a GDU
    ///
    /// # Parameters
    ///
    /// - `parameters` - Parameters to be updated
    /// - `gradients` - Gradients with the same shapes as `parameters`
    /// - `lr` - Learning rate
    pub fn update_parameters(parameters: &mut GDUParameters, gradients: &GDUParameters, lr: f32) {
        for ((_, param), (_, grad)) in parameters.iter_mut().zip(gradients.iter()) {
            let use_parallel = param.len() >= OPTIMIZER_PARALLEL_THRESHOLD;
            let step = move |p: &mut f32, &g: &f32| *p -= lr * clip_gradient(g);

            let zip = Zip::from(param).and(grad);
            if use_parallel {
                zip.par_for_each(step);
            } else {
                zip.for_each(step);
            }
        }
    }
}

impl Optimizer for SGD {
    fn update(&mut self, unit: &mut dyn TrainableUnit) {
        // Directly call the unit's parameter update method
        unit.update_parameters_sgd(self.learning_rate);
    }
}
