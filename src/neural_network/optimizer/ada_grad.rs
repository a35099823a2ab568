use super::*;

/// AdaGrad (Adaptive Gradient Algorithm) optimizer
///
/// An adaptive learning rate optimization algorithm that adjusts the learning rate
/// for each parameter based on the historical sum of squared gradients.
///
/// # Fields
///
/// - `learning_rate` - Initial learning rate controlling the size of parameter updates
/// - `epsilon` - Small constant added for numerical stability
pub struct AdaGrad {
    learning_rate: f32,
    epsilon: f32,
}

impl AdaGrad {
    /// Creates a new AdaGrad optimizer with the specified parameters.
    ///
    /// # Parameters
    ///
    /// - `learning_rate` - Initial step size for parameter updates (typically 0.01)
    /// - `epsilon` - Small constant for numerical stability (typically 1e-8)
    ///
    /// # Returns
    ///
    /// * `Result<Self, ModelError>` - A new AdaGrad optimizer instance or an error
    pub fn new(learning_rate: f32, epsilon: f32) -> Result<Self, ModelError> {
        validate_positive_finite(learning_rate, "learning_rate")?;
        validate_positive_finite(epsilon, "epsilon")?;

        Ok(Self {
            learning_rate,
            epsilon,
        })
    }
}

impl Optimizer for AdaGrad {
    fn update(&mut self, unit: &mut dyn TrainableUnit) {
        unit.update_parameters_ada_grad(self.learning_rate, self.epsilon);
    }
}

/// Accumulated squared gradients of every GDU parameter.
///
/// # Fields
///
/// - `accumulator` - Sum of squared gradients seen so far, one tensor per parameter
#[derive(Debug, Clone)]
pub struct AdaGradStates {
    pub accumulator: GDUParameters,
}

impl AdaGradStates {
    /// Creates a new AdaGrad state object, initialized to zero
    pub fn new(config: &GDUConfig) -> Self {
        Self {
            accumulator: GDUParameters::zeros(config),
        }
    }

    /// Accumulates the squared gradients and applies the AdaGrad step to every tensor
    pub fn update_parameters(
        &mut self,
        parameters: &mut GDUParameters,
        gradients: &GDUParameters,
        lr: f32,
        epsilon: f32,
    ) {
        let tensors = parameters
            .iter_mut()
            .zip(gradients.iter())
            .zip(self.accumulator.iter_mut());

        for (((_, param), (_, grad)), (_, acc)) in tensors {
            let use_parallel = param.len() >= OPTIMIZER_PARALLEL_THRESHOLD;
            let step = move |p: &mut f32, &g: &f32, a: &mut f32| {
                let g = clip_gradient(g);
                *a += g * g;
                *p -= lr * g / (a.sqrt() + epsilon);
            };

            let zip = Zip::from(param).and(grad).and(acc);
            if use_parallel {
                zip.par_for_each(step);
            } else {
                zip.for_each(step);
            }
        }
    }
}
