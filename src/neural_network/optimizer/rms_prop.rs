use super::*;

/// RMSprop (Root Mean Square Propagation) optimizer.
///
/// Adapts per-parameter learning rates using a moving average of squared gradients.
///
/// # Fields
///
/// - `learning_rate` - Learning rate controlling the size of parameter updates
/// - `rho` - Decay rate for the moving average of squared gradients
/// - `epsilon` - Small constant added for numerical stability
pub struct RMSprop {
    learning_rate: f32,
    rho: f32,
    epsilon: f32,
}

impl RMSprop {
    /// Creates a new RMSprop optimizer with the specified parameters.
    ///
    /// # Parameters
    ///
    /// - `learning_rate` - Step size for parameter updates
    /// - `rho` - Decay rate for moving average of squared gradients (typically 0.9)
    /// - `epsilon` - Small constant for numerical stability (typically 1e-8)
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - A new RMSprop optimizer instance or an error
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If any hyperparameter is out of range
    pub fn new(learning_rate: f32, rho: f32, epsilon: f32) -> Result<Self, ModelError> {
        validate_positive_finite(learning_rate, "learning_rate")?;
        validate_decay_rate(rho, "rho")?;
        validate_positive_finite(epsilon, "epsilon")?;

        Ok(Self {
            learning_rate,
            rho,
            epsilon,
        })
    }
}

impl Optimizer for RMSprop {
    fn update(&mut self, unit: &mut dyn TrainableUnit) {
        unit.update_parameters_rmsprop(self.learning_rate, self.rho, self.epsilon);
    }
}

/// RMSprop cache for a GDU.
///
/// # Fields
///
/// - `cache` - Moving average of squared gradients, one tensor per parameter
#[derive(Debug, Clone)]
pub struct RMSpropCache {
    pub cache: GDUParameters,
}

impl RMSpropCache {
    /// Creates a zero-initialized cache for `config`
    pub fn new(config: &GDUConfig) -> Self {
        Self {
            cache: GDUParameters::zeros(config),
        }
    }

    /// Updates the moving averages and applies the RMSprop step to every tensor
    ///
    /// # Parameters
    ///
    /// - `parameters` - Parameters to be updated
    /// - `gradients` - Gradients with the same shapes as `parameters`
    /// - `lr` - Learning rate
    /// - `rho` - Decay rate
    /// - `epsilon` - Small constant for numerical stability
    pub fn update_parameters(
        &mut self,
        parameters: &mut GDUParameters,
        gradients: &GDUParameters,
        lr: f32,
        rho: f32,
        epsilon: f32,
    ) {
        let tensors = parameters
            .iter_mut()
            .zip(gradients.iter())
            .zip(self.cache.iter_mut());

        for (((_, param), (_, grad)), (_, cache)) in tensors {
            let use_parallel = param.len() >= OPTIMIZER_PARALLEL_THRESHOLD;
            let step = move |p: &mut f32, &g: &f32, c: &mut f32| {
                let g = clip_gradient(g);
                *c = rho * *c + (1.0 - rho) * g * g;
                *p -= lr * g / (c.sqrt() + epsilon);
            };

            let zip = Zip::from(param).and(grad).and(cache);
            if use_parallel {
                zip.par_for_each(step);
            } else {
                zip.for_each(step);
            }
        }
    }
}
