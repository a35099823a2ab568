use super::*;
use crate::neural_network::neural_network_trait::TrainableUnit;
use crate::neural_network::optimizer::{
    AdaGradStates, AdamStates, OptimizerCache, RMSpropCache, SGD,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, trace};

/// Intermediate values of one GDU forward pass.
///
/// # Fields
///
/// - `f` - Forget gate activations, shape (batch, z_sz)
/// - `z_tilde` - Adjusted diffused state `f ⊙ z`
/// - `e` - Evolve gate activations, shape (batch, h_sz)
/// - `h_tilde` - Adjusted hidden state `e ⊙ h`
/// - `g` - Selection gate choosing between `z_tilde` and `z`, shape (batch, out_sz)
/// - `r` - Selection gate choosing between `h_tilde` and `h`, shape (batch, out_sz)
/// - `o1` - Candidate built from (`z_tilde`, `h_tilde`)
/// - `o2` - Candidate built from (`z`, `h_tilde`)
/// - `o3` - Candidate built from (`z_tilde`, `h`)
/// - `o4` - Candidate built from (`z`, `h`)
/// - `output` - Convex blend of the four candidates
#[derive(Debug, Clone, PartialEq)]
pub struct GDUTrace {
    pub f: Array2<f32>,
    pub z_tilde: Array2<f32>,
    pub e: Array2<f32>,
    pub h_tilde: Array2<f32>,
    pub g: Array2<f32>,
    pub r: Array2<f32>,
    pub o1: Array2<f32>,
    pub o2: Array2<f32>,
    pub o3: Array2<f32>,
    pub o4: Array2<f32>,
    pub output: Array2<f32>,
}

impl GDUTrace {
    /// Blend weights of `o1..o4`: `g·r`, `(1-g)·r`, `g·(1-r)`, `(1-g)·(1-r)`.
    ///
    /// They sum to one at every position.
    pub fn blend_coefficients(&self) -> [Array2<f32>; 4] {
        let one_minus_g = self.g.mapv(|v| 1.0 - v);
        let one_minus_r = self.r.mapv(|v| 1.0 - v);
        [
            &self.g * &self.r,
            &one_minus_g * &self.r,
            &self.g * &one_minus_r,
            &one_minus_g * &one_minus_r,
        ]
    }
}

impl GDUParameters {
    /// Runs the forward computation and keeps every intermediate value.
    ///
    /// In order:
    /// 1. f = σ(x·W_fx + z·W_fz + h·W_fh + b_f), z_tilde = f ⊙ z
    /// 2. e = σ(x·W_ex + z·W_ez + h·W_eh + b_e), h_tilde = e ⊙ h
    /// 3. g, r = σ(x·W_x + z·W_z + h·W_h + z_tilde·W_z~ + h_tilde·W_h~ + b)
    /// 4. o1..o4 = tanh(x·W_ux + {z_tilde, z}·W_uz + {h_tilde, h}·W_uh + b_u)
    /// 5. output = g·r·o1 + (1-g)·r·o2 + g·(1-r)·o3 + (1-g)·(1-r)·o4
    ///
    /// # Parameters
    ///
    /// - `x` - Context features with shape (batch, x_sz)
    /// - `z` - Diffused state with shape (batch, z_sz)
    /// - `h` - Hidden state with shape (batch, h_sz)
    ///
    /// # Returns
    ///
    /// - `Ok(GDUTrace)` - All gates, candidates and the output
    /// - `Err(ModelError::InputValidationError)` - If an input width is wrong or batch sizes differ
    pub fn forward_trace(
        &self,
        x: &Array2<f32>,
        z: &Array2<f32>,
        h: &Array2<f32>,
    ) -> Result<GDUTrace, ModelError> {
        let (x_sz, z_sz, h_sz) = self.input_dims();
        let batch = validate_forward_inputs(x, z, h, x_sz, z_sz, h_sz)?;

        let widest_gate = z_sz.max(h_sz).max(self.output_dim());
        let use_parallel = batch * widest_gate >= GDU_PARALLEL_THRESHOLD;

        // Adjustment gates
        let (f, e) = join_if(
            use_parallel,
            || apply_sigmoid(self.forget.pre_activation(x, z, h)),
            || apply_sigmoid(self.evolve.pre_activation(x, z, h)),
        );
        let z_tilde = &f * z;
        let h_tilde = &e * h;

        // Selection gates
        let (g, r) = join_if(
            use_parallel,
            || apply_sigmoid(self.select_g.pre_activation(x, z, h, &z_tilde, &h_tilde)),
            || apply_sigmoid(self.select_r.pre_activation(x, z, h, &z_tilde, &h_tilde)),
        );

        // Candidate outputs share the projection of every input
        let x_u = x.dot(&self.fuse.w_x);
        let ((z_tilde_u, z_u), (h_tilde_u, h_u)) = join_if(
            use_parallel,
            || (z_tilde.dot(&self.fuse.w_z), z.dot(&self.fuse.w_z)),
            || (h_tilde.dot(&self.fuse.w_h), h.dot(&self.fuse.w_h)),
        );
        let candidate = |z_part: &Array2<f32>, h_part: &Array2<f32>| {
            apply_tanh(&x_u + z_part + h_part + &self.fuse.bias)
        };
        let ((o1, o2), (o3, o4)) = join_if(
            use_parallel,
            || (candidate(&z_tilde_u, &h_tilde_u), candidate(&z_u, &h_tilde_u)),
            || (candidate(&z_tilde_u, &h_u), candidate(&z_u, &h_u)),
        );

        let one_minus_g = g.mapv(|v| 1.0 - v);
        let one_minus_r = r.mapv(|v| 1.0 - v);
        let output = &g * &r * &o1
            + &(&one_minus_g * &r * &o2)
            + &(&g * &one_minus_r * &o3)
            + &(&one_minus_g * &one_minus_r * &o4);

        Ok(GDUTrace {
            f,
            z_tilde,
            e,
            h_tilde,
            g,
            r,
            o1,
            o2,
            o3,
            o4,
            output,
        })
    }

    /// Computes the fused output for `x`, `z` and `h`.
    ///
    /// A pure function of the parameters and the inputs.
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f32>)` - Output with shape (batch, out_sz)
    /// - `Err(ModelError::InputValidationError)` - If an input width is wrong or batch sizes differ
    pub fn forward(
        &self,
        x: &Array2<f32>,
        z: &Array2<f32>,
        h: &Array2<f32>,
    ) -> Result<Array2<f32>, ModelError> {
        Ok(self.forward_trace(x, z, h)?.output)
    }
}

/// Helper function to extract cache and return error if not available
#[inline]
fn take_cache<T>(cache: &mut Option<T>, error_msg: &str) -> Result<T, ModelError> {
    cache
        .take()
        .ok_or_else(|| ModelError::ProcessingError(error_msg.to_string()))
}

/// Chain rule through a sigmoid given its output `s`
#[inline]
fn sigmoid_backward(grad: Array2<f32>, s: &Array2<f32>) -> Array2<f32> {
    grad * &s.mapv(|v| v * (1.0 - v))
}

/// Chain rule through a tanh given its output `t`
#[inline]
fn tanh_backward(grad: Array2<f32>, t: &Array2<f32>) -> Array2<f32> {
    grad * &t.mapv(|v| 1.0 - v * v)
}

/// Gated Diffusive Unit (GDU).
///
/// Fuses a context feature matrix `x` (batch, x_sz), a diffused state `z` (batch, z_sz)
/// and a hidden state `h` (batch, h_sz) into an output of shape (batch, out_sz).
/// The forget gate `f` and evolve gate `e` produce adjusted states `z_tilde = f ⊙ z` and
/// `h_tilde = e ⊙ h`; the selection gates `g` and `r` then interpolate softly between the
/// four tanh candidates built from {`z_tilde`, `z`} × {`h_tilde`, `h`}.
///
/// Forward calls never touch the parameters; they change only through the optimizer
/// hooks of [`TrainableUnit`], called by the training procedure between forward calls.
///
/// # Fields
///
/// - `config` - Dimensions and type label
/// - `parameters` - The 24 parameter tensors
/// - `gradients` - Parameter gradients stored by the last backward pass
/// - `optimizer_cache` - Lazily created optimizer state (Adam moments, RMSprop/AdaGrad accumulators)
/// - `input_cache` - Inputs of the last `forward` call for backward propagation
/// - `trace_cache` - Intermediate values of the last `forward` call
///
/// # Example
/// ```rust
/// use gdu::neural_network::*;
/// use ndarray::Array2;
///
/// let config = GDUConfig::new("article", 1, 3, 4, 5, 2).unwrap();
/// let mut unit = GDU::with_seed(config, 7);
///
/// let x = Array2::<f32>::ones((4, 3));
/// let z = Array2::<f32>::zeros((4, 4));
/// let h = Array2::<f32>::ones((4, 5));
///
/// let output = unit.forward(&x, &z, &h).unwrap();
/// assert_eq!(output.shape(), &[4, 2]);
/// ```
#[derive(Debug)]
pub struct GDU {
    config: GDUConfig,
    parameters: GDUParameters,
    gradients: Option<GDUParameters>,
    optimizer_cache: OptimizerCache,

    // Caches for forward pass
    input_cache: Option<(Array2<f32>, Array2<f32>, Array2<f32>)>,
    trace_cache: Option<GDUTrace>,
}

impl GDU {
    /// Creates a GDU with randomly initialized parameters.
    ///
    /// # Parameters
    ///
    /// - `gdu_type` - Opaque label stored for the caller's bookkeeping
    /// - `g_sz` - Vestigial dimension, stored but unused
    /// - `x_sz` - Width of the context input `x`
    /// - `z_sz` - Width of the diffused state `z`
    /// - `h_sz` - Width of the hidden state `h`
    /// - `out_sz` - Width of the output
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - A new GDU instance
    ///
    /// # Errors
    ///
    /// - `ModelError::InputValidationError` - If any dimension is 0
    pub fn new(
        gdu_type: impl Into<String>,
        g_sz: usize,
        x_sz: usize,
        z_sz: usize,
        h_sz: usize,
        out_sz: usize,
    ) -> Result<Self, ModelError> {
        let config = GDUConfig::new(gdu_type, g_sz, x_sz, z_sz, h_sz, out_sz)?;
        Ok(Self::from_config(config))
    }

    /// Creates a GDU from a configuration, drawing parameters from the thread-local RNG
    pub fn from_config(config: GDUConfig) -> Self {
        Self::from_config_with_rng(config, &mut rand::thread_rng())
    }

    /// Creates a GDU whose parameters are reproducible from `seed`
    pub fn with_seed(config: GDUConfig, seed: u64) -> Self {
        Self::from_config_with_rng(config, &mut StdRng::seed_from_u64(seed))
    }

    /// Creates a GDU drawing its parameters from `rng`
    pub fn from_config_with_rng<R: Rng + ?Sized>(config: GDUConfig, rng: &mut R) -> Self {
        let parameters = GDUParameters::random(&config, rng);
        debug!(
            gdu_type = config.gdu_type(),
            x_sz = config.x_sz(),
            z_sz = config.z_sz(),
            h_sz = config.h_sz(),
            out_sz = config.out_sz(),
            params = parameters.param_count(),
            "created GDU"
        );

        Self {
            config,
            parameters,
            gradients: None,
            optimizer_cache: OptimizerCache::default(),
            input_cache: None,
            trace_cache: None,
        }
    }

    pub fn config(&self) -> &GDUConfig {
        &self.config
    }

    pub fn gdu_type(&self) -> &str {
        self.config.gdu_type()
    }

    pub fn parameters(&self) -> &GDUParameters {
        &self.parameters
    }

    /// Mutable access for the training procedure; must not overlap a forward call
    pub fn parameters_mut(&mut self) -> &mut GDUParameters {
        &mut self.parameters
    }

    /// Gradients stored by the last backward pass, if any
    pub fn gradients(&self) -> Option<&GDUParameters> {
        self.gradients.as_ref()
    }

    /// Re-initializes all parameters and drops gradients, caches and optimizer state
    pub fn reset_parameters<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.parameters.init_weights(rng);
        self.gradients = None;
        self.optimizer_cache = OptimizerCache::default();
        self.input_cache = None;
        self.trace_cache = None;
    }

    /// Computes the output without caching anything for a backward pass
    pub fn predict(
        &self,
        x: &Array2<f32>,
        z: &Array2<f32>,
        h: &Array2<f32>,
    ) -> Result<Array2<f32>, ModelError> {
        self.parameters.forward(x, z, h)
    }

    /// Computes all gates, candidates and the output without caching them
    pub fn forward_trace(
        &self,
        x: &Array2<f32>,
        z: &Array2<f32>,
        h: &Array2<f32>,
    ) -> Result<GDUTrace, ModelError> {
        self.parameters.forward_trace(x, z, h)
    }

    /// Performs forward propagation and caches what the backward pass needs.
    ///
    /// # Parameters
    ///
    /// - `x` - Context features with shape (batch, x_sz)
    /// - `z` - Diffused state with shape (batch, z_sz)
    /// - `h` - Hidden state with shape (batch, h_sz)
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f32>)` - Output with shape (batch, out_sz)
    /// - `Err(ModelError::InputValidationError)` - If an input width is wrong or batch sizes differ
    pub fn forward(
        &mut self,
        x: &Array2<f32>,
        z: &Array2<f32>,
        h: &Array2<f32>,
    ) -> Result<Array2<f32>, ModelError> {
        let trace = self.parameters.forward_trace(x, z, h)?;
        trace!(gdu_type = self.gdu_type(), batch = x.nrows(), "GDU forward");

        let output = trace.output.clone();
        self.input_cache = Some((x.to_owned(), z.to_owned(), h.to_owned()));
        self.trace_cache = Some(trace);
        Ok(output)
    }

    /// Performs backward propagation for the last `forward` call.
    ///
    /// Stores the gradients of all 24 parameters (summed over the batch) and returns the
    /// gradients with respect to the three inputs.
    ///
    /// # Parameters
    ///
    /// - `grad_output` - Gradient of the loss w.r.t. the output, shape (batch, out_sz)
    ///
    /// # Returns
    ///
    /// - `Ok((grad_x, grad_z, grad_h))` - Gradients w.r.t. `x`, `z` and `h`
    /// - `Err(ModelError::ProcessingError)` - If no forward pass has been cached
    /// - `Err(ModelError::InputValidationError)` - If `grad_output` has the wrong shape
    pub fn backward(
        &mut self,
        grad_output: &Array2<f32>,
    ) -> Result<(Array2<f32>, Array2<f32>, Array2<f32>), ModelError> {
        let error_msg = "Forward pass has not been run";
        let expected = self
            .trace_cache
            .as_ref()
            .map(|trace| trace.output.dim())
            .ok_or_else(|| ModelError::ProcessingError(error_msg.to_string()))?;
        validate_grad_output(grad_output, expected)?;

        let (x, z, h) = take_cache(&mut self.input_cache, error_msg)?;
        let GDUTrace {
            f,
            z_tilde,
            e,
            h_tilde,
            g,
            r,
            o1,
            o2,
            o3,
            o4,
            ..
        } = take_cache(&mut self.trace_cache, error_msg)?;
        trace!(gdu_type = self.gdu_type(), batch = x.nrows(), "GDU backward");

        let p = &self.parameters;
        let one_minus_g = g.mapv(|v| 1.0 - v);
        let one_minus_r = r.mapv(|v| 1.0 - v);

        // Gradient through the candidate tanh activations
        let delta_o1 = tanh_backward(grad_output * &g * &r, &o1);
        let delta_o2 = tanh_backward(grad_output * &one_minus_g * &r, &o2);
        let delta_o3 = tanh_backward(grad_output * &g * &one_minus_r, &o3);
        let delta_o4 = tanh_backward(grad_output * &one_minus_g * &one_minus_r, &o4);

        // Gradient through the selection gates
        let grad_g = grad_output * &(&r * &(&o1 - &o2) + &(&one_minus_r * &(&o3 - &o4)));
        let grad_r = grad_output * &(&g * &(&o1 - &o3) + &(&one_minus_g * &(&o2 - &o4)));
        let delta_g = sigmoid_backward(grad_g, &g);
        let delta_r = sigmoid_backward(grad_r, &r);

        // Candidates grouped by which version of z and h they consumed
        let delta_u = &delta_o1 + &delta_o2 + &delta_o3 + &delta_o4;
        let delta_u_z_tilde = &delta_o1 + &delta_o3;
        let delta_u_z = &delta_o2 + &delta_o4;
        let delta_u_h_tilde = &delta_o1 + &delta_o2;
        let delta_u_h = &delta_o3 + &delta_o4;

        let [g_x, g_z, g_h, g_z_tilde, g_h_tilde] = p.select_g.input_gradients(&delta_g);
        let [r_x, r_z, r_h, r_z_tilde, r_h_tilde] = p.select_r.input_gradients(&delta_r);

        // Gradient reaching the adjusted states
        let grad_z_tilde = delta_u_z_tilde.dot(&p.fuse.w_z.t()) + &g_z_tilde + &r_z_tilde;
        let grad_h_tilde = delta_u_h_tilde.dot(&p.fuse.w_h.t()) + &g_h_tilde + &r_h_tilde;

        // Gradient through the adjustment gates
        let delta_f = sigmoid_backward(&grad_z_tilde * &z, &f);
        let delta_e = sigmoid_backward(&grad_h_tilde * &h, &e);
        let (f_x, f_z, f_h) = p.forget.input_gradients(&delta_f);
        let (e_x, e_z, e_h) = p.evolve.input_gradients(&delta_e);

        let grad_x = delta_u.dot(&p.fuse.w_x.t()) + &g_x + &r_x + &f_x + &e_x;
        let grad_z = delta_u_z.dot(&p.fuse.w_z.t())
            + &g_z
            + &r_z
            + &f_z
            + &e_z
            + &(&grad_z_tilde * &f);
        let grad_h = delta_u_h.dot(&p.fuse.w_h.t())
            + &g_h
            + &r_h
            + &f_h
            + &e_h
            + &(&grad_h_tilde * &e);

        let gradients = GDUParameters {
            forget: AdjustmentGate::gradient(&delta_f, &x, &z, &h),
            evolve: AdjustmentGate::gradient(&delta_e, &x, &z, &h),
            select_g: SelectionGate::gradient(&delta_g, &x, &z, &h, &z_tilde, &h_tilde),
            select_r: SelectionGate::gradient(&delta_r, &x, &z, &h, &z_tilde, &h_tilde),
            fuse: AdjustmentGate {
                w_x: x.t().dot(&delta_u),
                w_z: z_tilde.t().dot(&delta_u_z_tilde) + &z.t().dot(&delta_u_z),
                w_h: h_tilde.t().dot(&delta_u_h_tilde) + &h.t().dot(&delta_u_h),
                bias: delta_u.sum_axis(Axis(0)),
            },
        };
        self.gradients = Some(gradients);

        Ok((grad_x, grad_z, grad_h))
    }
}

impl TrainableUnit for GDU {
    fn layer_type(&self) -> &str {
        "GDU"
    }

    fn output_shape(&self) -> String {
        format!("(None, {})", self.config.out_sz())
    }

    fn param_count(&self) -> TrainingParameters {
        TrainingParameters::Trainable(self.parameters.param_count())
    }

    fn update_parameters_sgd(&mut self, lr: f32) {
        let Some(gradients) = self.gradients.as_ref() else {
            debug!(gdu_type = self.gdu_type(), "SGD step skipped: no gradients");
            return;
        };
        SGD::update_parameters(&mut self.parameters, gradients, lr);
    }

    fn update_parameters_adam(&mut self, lr: f32, beta1: f32, beta2: f32, epsilon: f32, t: u64) {
        let Some(gradients) = self.gradients.as_ref() else {
            debug!(gdu_type = self.gdu_type(), "Adam step skipped: no gradients");
            return;
        };
        let config = &self.config;
        let adam_states = self
            .optimizer_cache
            .adam_states
            .get_or_insert_with(|| AdamStates::new(config));
        adam_states.update_parameters(&mut self.parameters, gradients, lr, beta1, beta2, epsilon, t);
    }

    fn update_parameters_rmsprop(&mut self, lr: f32, rho: f32, epsilon: f32) {
        let Some(gradients) = self.gradients.as_ref() else {
            debug!(gdu_type = self.gdu_type(), "RMSprop step skipped: no gradients");
            return;
        };
        let config = &self.config;
        let cache = self
            .optimizer_cache
            .rmsprop_cache
            .get_or_insert_with(|| RMSpropCache::new(config));
        cache.update_parameters(&mut self.parameters, gradients, lr, rho, epsilon);
    }

    fn update_parameters_ada_grad(&mut self, lr: f32, epsilon: f32) {
        let Some(gradients) = self.gradients.as_ref() else {
            debug!(gdu_type = self.gdu_type(), "AdaGrad step skipped: no gradients");
            return;
        };
        let config = &self.config;
        let states = self
            .optimizer_cache
            .ada_grad_cache
            .get_or_insert_with(|| AdaGradStates::new(config));
        states.update_parameters(&mut self.parameters, gradients, lr, epsilon);
    }

    fn get_weights(&self) -> LayerWeight<'_> {
        LayerWeight::GDU(GDULayerWeight::from_parameters(&self.parameters))
    }
}
