use super::*;

/// Adam optimizer implementation.
///
/// An optimization algorithm that computes individual adaptive learning
/// rates for different parameters from estimates of first and second moments
/// of the gradients.
pub struct Adam {
    /// Learning rate controlling the size of parameter updates.
    learning_rate: f32,
    /// Exponential decay rate for the first moment estimates.
    beta1: f32,
    /// Exponential decay rate for the second moment estimates.
    beta2: f32,
    /// Small constant added for numerical stability.
    epsilon: f32,
    /// Current timestep, incremented with each update.
    t: u64,
}

impl Adam {
    /// Creates a new Adam optimizer with the specified parameters.
    ///
    /// # Parameters
    ///
    /// - `learning_rate` - Step size for parameter updates
    /// - `beta1` - Decay rate for the first moment estimates (typically 0.9)
    /// - `beta2` - Decay rate for the second moment estimates (typically 0.999)
    /// - `epsilon` - Small constant for numerical stability (typically 1e-8)
    ///
    /// # Returns
    ///
    /// * `Result<Self, ModelError>` - A new Adam optimizer instance or an error
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If any hyperparameter is out of range
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Result<Self, ModelError> {
        validate_positive_finite(learning_rate, "learning_rate")?;
        validate_decay_rate(beta1, "beta1")?;
        validate_decay_rate(beta2, "beta2")?;
        validate_positive_finite(epsilon, "epsilon")?;

        Ok(Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            t: 0,
        })
    }

    /// Number of updates performed so far
    pub fn timestep(&self) -> u64 {
        self.t
    }
}

impl Optimizer for Adam {
    fn update(&mut self, unit: &mut dyn TrainableUnit) {
        self.t += 1; // Increment step count with each update
        unit.update_parameters_adam(
            self.learning_rate,
            self.beta1,
            self.beta2,
            self.epsilon,
            self.t,
        );
    }
}

/// Stores the Adam moment estimates of every GDU parameter.
///
/// # Fields
///
/// - `m` - First moment vector (moving average of gradients)
/// - `v` - Second moment vector (moving average of squared gradients)
#[derive(Debug, Clone)]
pub struct AdamStates {
    pub m: GDUParameters,
    pub v: GDUParameters,
}

impl AdamStates {
    /// Creates a new Adam state object, initialized to zero
    pub fn new(config: &GDUConfig) -> Self {
        Self {
            m: GDUParameters::zeros(config),
            v: GDUParameters::zeros(config),
        }
    }

    /// Updates the moments and applies the bias-corrected Adam step to every tensor
    ///
    /// # Parameters
    ///
    /// - `parameters` - Parameters to be updated
    /// - `gradients` - Gradients with the same shapes as `parameters`
    /// - `lr` - Learning rate for parameter updates
    /// - `beta1` - Exponential decay rate for first moment estimates
    /// - `beta2` - Exponential decay rate for second moment estimates
    /// - `epsilon` - Small constant added for numerical stability
    /// - `t` - Current timestep (iteration number, starting at 1, saturating at `i32::MAX`)
    pub fn update_parameters(
        &mut self,
        parameters: &mut GDUParameters,
        gradients: &GDUParameters,
        lr: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
        t: u64,
    ) {
        let t = t.clamp(1, i32::MAX as u64) as i32;
        let bias_correction1 = 1.0 - beta1.powi(t);
        let bias_correction2 = 1.0 - beta2.powi(t);

        let tensors = parameters
            .iter_mut()
            .zip(gradients.iter())
            .zip(self.m.iter_mut())
            .zip(self.v.iter_mut());

        for ((((_, param), (_, grad)), (_, m)), (_, v)) in tensors {
            let use_parallel = param.len() >= OPTIMIZER_PARALLEL_THRESHOLD;
            let step = move |p: &mut f32, &g: &f32, m: &mut f32, v: &mut f32| {
                let g = clip_gradient(g);
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                let m_hat = *m / bias_correction1;
                let v_hat = *v / bias_correction2;
                *p -= lr * m_hat / (v_hat.sqrt() + epsilon);
            };

            let zip = Zip::from(param).and(grad).and(m).and(v);
            if use_parallel {
                zip.par_for_each(step);
            } else {
                zip.for_each(step);
            }
        }
    }
}
