use super::*;
use ndarray::ArrayD;
use ndarray_rand::RandomExt;
use rand_distr::Uniform;
use tracing::trace;

/// Name of every parameter tensor of a GDU, in a fixed order.
///
/// `ParameterName::ALL` is the explicit parameter table: initialization, iteration and
/// optimizer updates all walk it in this order, so a seeded random source always
/// produces the same parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterName {
    ForgetX,
    ForgetZ,
    ForgetH,
    ForgetBias,
    EvolveX,
    EvolveZ,
    EvolveH,
    EvolveBias,
    SelectGX,
    SelectGZ,
    SelectGH,
    SelectGZTilde,
    SelectGHTilde,
    SelectGBias,
    SelectRX,
    SelectRZ,
    SelectRH,
    SelectRZTilde,
    SelectRHTilde,
    SelectRBias,
    FuseX,
    FuseZ,
    FuseH,
    FuseBias,
}

impl ParameterName {
    /// Number of parameter tensors
    pub const COUNT: usize = 24;

    /// Every parameter, in table order
    pub const ALL: [ParameterName; Self::COUNT] = [
        ParameterName::ForgetX,
        ParameterName::ForgetZ,
        ParameterName::ForgetH,
        ParameterName::ForgetBias,
        ParameterName::EvolveX,
        ParameterName::EvolveZ,
        ParameterName::EvolveH,
        ParameterName::EvolveBias,
        ParameterName::SelectGX,
        ParameterName::SelectGZ,
        ParameterName::SelectGH,
        ParameterName::SelectGZTilde,
        ParameterName::SelectGHTilde,
        ParameterName::SelectGBias,
        ParameterName::SelectRX,
        ParameterName::SelectRZ,
        ParameterName::SelectRH,
        ParameterName::SelectRZTilde,
        ParameterName::SelectRHTilde,
        ParameterName::SelectRBias,
        ParameterName::FuseX,
        ParameterName::FuseZ,
        ParameterName::FuseH,
        ParameterName::FuseBias,
    ];

    /// Canonical short name, e.g. `W_fx` or `b_u`
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterName::ForgetX => "W_fx",
            ParameterName::ForgetZ => "W_fz",
            ParameterName::ForgetH => "W_fh",
            ParameterName::ForgetBias => "b_f",
            ParameterName::EvolveX => "W_ex",
            ParameterName::EvolveZ => "W_ez",
            ParameterName::EvolveH => "W_eh",
            ParameterName::EvolveBias => "b_e",
            ParameterName::SelectGX => "W_gx",
            ParameterName::SelectGZ => "W_gz",
            ParameterName::SelectGH => "W_gh",
            ParameterName::SelectGZTilde => "W_gz_tilde",
            ParameterName::SelectGHTilde => "W_gh_tilde",
            ParameterName::SelectGBias => "b_g",
            ParameterName::SelectRX => "W_rx",
            ParameterName::SelectRZ => "W_rz",
            ParameterName::SelectRH => "W_rh",
            ParameterName::SelectRZTilde => "W_rz_tilde",
            ParameterName::SelectRHTilde => "W_rh_tilde",
            ParameterName::SelectRBias => "b_r",
            ParameterName::FuseX => "W_ux",
            ParameterName::FuseZ => "W_uz",
            ParameterName::FuseH => "W_uh",
            ParameterName::FuseBias => "b_u",
        }
    }

    /// Returns `true` for the five bias vectors
    pub fn is_bias(&self) -> bool {
        matches!(
            self,
            ParameterName::ForgetBias
                | ParameterName::EvolveBias
                | ParameterName::SelectGBias
                | ParameterName::SelectRBias
                | ParameterName::FuseBias
        )
    }

    /// Shape of this parameter for the given configuration
    ///
    /// Weights are (input width, gate width); biases are (gate width,).
    pub fn shape(&self, config: &GDUConfig) -> Vec<usize> {
        let (x, z, h, out) = (config.x_sz(), config.z_sz(), config.h_sz(), config.out_sz());
        match self {
            ParameterName::ForgetX => vec![x, z],
            ParameterName::ForgetZ => vec![z, z],
            ParameterName::ForgetH => vec![h, z],
            ParameterName::ForgetBias => vec![z],
            ParameterName::EvolveX => vec![x, h],
            ParameterName::EvolveZ => vec![z, h],
            ParameterName::EvolveH => vec![h, h],
            ParameterName::EvolveBias => vec![h],
            ParameterName::SelectGX | ParameterName::SelectRX | ParameterName::FuseX => {
                vec![x, out]
            }
            ParameterName::SelectGZ
            | ParameterName::SelectGZTilde
            | ParameterName::SelectRZ
            | ParameterName::SelectRZTilde
            | ParameterName::FuseZ => vec![z, out],
            ParameterName::SelectGH
            | ParameterName::SelectGHTilde
            | ParameterName::SelectRH
            | ParameterName::SelectRHTilde
            | ParameterName::FuseH => vec![h, out],
            ParameterName::SelectGBias | ParameterName::SelectRBias | ParameterName::FuseBias => {
                vec![out]
            }
        }
    }
}

impl std::fmt::Display for ParameterName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scale of the uniform initialization for a tensor of the given shape.
///
/// `1 / sqrt(n)` where `n` is the size of the second dimension for tensors with two or
/// more dimensions, and the size of the only dimension otherwise.
///
/// # Parameters
///
/// * `shape` - Shape of the tensor, must not be empty
///
/// # Returns
///
/// * `f32` - The bound `stdv`; elements are drawn from `[-stdv, stdv]`
pub fn init_stdv(shape: &[usize]) -> f32 {
    let n = if shape.len() >= 2 { shape[1] } else { shape[0] };
    1.0 / (n as f32).sqrt()
}

/// Parameters of a gate fed by `x`, `z` and `h`.
///
/// Used by the forget gate `f` (width z_sz), the evolve gate `e` (width h_sz) and the
/// fuse projection `u` (width out_sz).
///
/// # Fields
///
/// - `w_x` - Weight matrix for the context input with shape (x_sz, units)
/// - `w_z` - Weight matrix for the diffused state with shape (z_sz, units)
/// - `w_h` - Weight matrix for the hidden state with shape (h_sz, units)
/// - `bias` - Bias vector with shape (units,)
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentGate {
    pub w_x: Array2<f32>,
    pub w_z: Array2<f32>,
    pub w_h: Array2<f32>,
    pub bias: Array1<f32>,
}

impl AdjustmentGate {
    /// Creates a zero-filled gate
    pub fn zeros(x_sz: usize, z_sz: usize, h_sz: usize, units: usize) -> Self {
        Self {
            w_x: Array2::zeros((x_sz, units)),
            w_z: Array2::zeros((z_sz, units)),
            w_h: Array2::zeros((h_sz, units)),
            bias: Array1::zeros(units),
        }
    }

    /// Computes the pre-activation: x @ w_x + z @ w_z + h @ w_h + bias
    ///
    /// # Panics
    ///
    /// - If matrix dimensions are incompatible for multiplication
    #[inline]
    pub fn pre_activation(&self, x: &Array2<f32>, z: &Array2<f32>, h: &Array2<f32>) -> Array2<f32> {
        x.dot(&self.w_x) + &z.dot(&self.w_z) + &h.dot(&self.w_h) + &self.bias
    }

    /// Parameter gradients for a pre-activation gradient `delta` (batch, units)
    pub(super) fn gradient(
        delta: &Array2<f32>,
        x: &Array2<f32>,
        z: &Array2<f32>,
        h: &Array2<f32>,
    ) -> Self {
        Self {
            w_x: x.t().dot(delta),
            w_z: z.t().dot(delta),
            w_h: h.t().dot(delta),
            bias: delta.sum_axis(Axis(0)),
        }
    }

    /// Gradients w.r.t. `x`, `z` and `h` for a pre-activation gradient `delta`
    pub(super) fn input_gradients(
        &self,
        delta: &Array2<f32>,
    ) -> (Array2<f32>, Array2<f32>, Array2<f32>) {
        (
            delta.dot(&self.w_x.t()),
            delta.dot(&self.w_z.t()),
            delta.dot(&self.w_h.t()),
        )
    }

    fn views(&self) -> [ArrayViewD<'_, f32>; 4] {
        [
            self.w_x.view().into_dyn(),
            self.w_z.view().into_dyn(),
            self.w_h.view().into_dyn(),
            self.bias.view().into_dyn(),
        ]
    }

    fn views_mut(&mut self) -> [ArrayViewMutD<'_, f32>; 4] {
        [
            self.w_x.view_mut().into_dyn(),
            self.w_z.view_mut().into_dyn(),
            self.w_h.view_mut().into_dyn(),
            self.bias.view_mut().into_dyn(),
        ]
    }
}

/// Parameters of a selection gate, fed by the original and the adjusted states.
///
/// # Fields
///
/// - `w_x` - Weight matrix for `x` with shape (x_sz, out_sz)
/// - `w_z` - Weight matrix for `z` with shape (z_sz, out_sz)
/// - `w_h` - Weight matrix for `h` with shape (h_sz, out_sz)
/// - `w_z_tilde` - Weight matrix for the adjusted diffused state with shape (z_sz, out_sz)
/// - `w_h_tilde` - Weight matrix for the adjusted hidden state with shape (h_sz, out_sz)
/// - `bias` - Bias vector with shape (out_sz,)
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionGate {
    pub w_x: Array2<f32>,
    pub w_z: Array2<f32>,
    pub w_h: Array2<f32>,
    pub w_z_tilde: Array2<f32>,
    pub w_h_tilde: Array2<f32>,
    pub bias: Array1<f32>,
}

impl SelectionGate {
    /// Creates a zero-filled gate
    pub fn zeros(x_sz: usize, z_sz: usize, h_sz: usize, units: usize) -> Self {
        Self {
            w_x: Array2::zeros((x_sz, units)),
            w_z: Array2::zeros((z_sz, units)),
            w_h: Array2::zeros((h_sz, units)),
            w_z_tilde: Array2::zeros((z_sz, units)),
            w_h_tilde: Array2::zeros((h_sz, units)),
            bias: Array1::zeros(units),
        }
    }

    /// Computes the pre-activation:
    /// x @ w_x + z @ w_z + h @ w_h + z_tilde @ w_z_tilde + h_tilde @ w_h_tilde + bias
    #[inline]
    pub fn pre_activation(
        &self,
        x: &Array2<f32>,
        z: &Array2<f32>,
        h: &Array2<f32>,
        z_tilde: &Array2<f32>,
        h_tilde: &Array2<f32>,
    ) -> Array2<f32> {
        x.dot(&self.w_x)
            + &z.dot(&self.w_z)
            + &h.dot(&self.w_h)
            + &z_tilde.dot(&self.w_z_tilde)
            + &h_tilde.dot(&self.w_h_tilde)
            + &self.bias
    }

    pub(super) fn gradient(
        delta: &Array2<f32>,
        x: &Array2<f32>,
        z: &Array2<f32>,
        h: &Array2<f32>,
        z_tilde: &Array2<f32>,
        h_tilde: &Array2<f32>,
    ) -> Self {
        Self {
            w_x: x.t().dot(delta),
            w_z: z.t().dot(delta),
            w_h: h.t().dot(delta),
            w_z_tilde: z_tilde.t().dot(delta),
            w_h_tilde: h_tilde.t().dot(delta),
            bias: delta.sum_axis(Axis(0)),
        }
    }

    /// Gradients w.r.t. `x`, `z`, `h`, `z_tilde` and `h_tilde` for a pre-activation gradient
    pub(super) fn input_gradients(&self, delta: &Array2<f32>) -> [Array2<f32>; 5] {
        [
            delta.dot(&self.w_x.t()),
            delta.dot(&self.w_z.t()),
            delta.dot(&self.w_h.t()),
            delta.dot(&self.w_z_tilde.t()),
            delta.dot(&self.w_h_tilde.t()),
        ]
    }

    fn views(&self) -> [ArrayViewD<'_, f32>; 6] {
        [
            self.w_x.view().into_dyn(),
            self.w_z.view().into_dyn(),
            self.w_h.view().into_dyn(),
            self.w_z_tilde.view().into_dyn(),
            self.w_h_tilde.view().into_dyn(),
            self.bias.view().into_dyn(),
        ]
    }

    fn views_mut(&mut self) -> [ArrayViewMutD<'_, f32>; 6] {
        [
            self.w_x.view_mut().into_dyn(),
            self.w_z.view_mut().into_dyn(),
            self.w_h.view_mut().into_dyn(),
            self.w_z_tilde.view_mut().into_dyn(),
            self.w_h_tilde.view_mut().into_dyn(),
            self.bias.view_mut().into_dyn(),
        ]
    }
}

/// The complete parameter set of a GDU, grouped per gate.
///
/// Also used, with identical shapes, to hold gradients and optimizer moments.
///
/// # Fields
///
/// - `forget` - Forget gate `f`, adjusts the diffused state (width z_sz)
/// - `evolve` - Evolve gate `e`, adjusts the hidden state (width h_sz)
/// - `select_g` - Selection gate `g` (width out_sz)
/// - `select_r` - Selection gate `r` (width out_sz)
/// - `fuse` - Shared projection `u` of the four candidate outputs (width out_sz)
#[derive(Debug, Clone, PartialEq)]
pub struct GDUParameters {
    pub forget: AdjustmentGate,
    pub evolve: AdjustmentGate,
    pub select_g: SelectionGate,
    pub select_r: SelectionGate,
    pub fuse: AdjustmentGate,
}

impl GDUParameters {
    /// Allocates all 24 tensors for `config`, filled with zeros
    pub fn zeros(config: &GDUConfig) -> Self {
        let (x, z, h, out) = (config.x_sz(), config.z_sz(), config.h_sz(), config.out_sz());
        Self {
            forget: AdjustmentGate::zeros(x, z, h, z),
            evolve: AdjustmentGate::zeros(x, z, h, h),
            select_g: SelectionGate::zeros(x, z, h, out),
            select_r: SelectionGate::zeros(x, z, h, out),
            fuse: AdjustmentGate::zeros(x, z, h, out),
        }
    }

    /// Allocates all tensors for `config` and initializes them from `rng`
    ///
    /// See [`GDUParameters::init_weights`].
    pub fn random<R: Rng + ?Sized>(config: &GDUConfig, rng: &mut R) -> Self {
        let mut parameters = Self::zeros(config);
        parameters.init_weights(rng);
        parameters
    }

    /// Re-initializes every tensor in place.
    ///
    /// Each tensor gets its own bound `stdv` from [`init_stdv`] and every element is drawn
    /// independently and uniformly from `[-stdv, stdv]`. Tensors are visited in
    /// `ParameterName::ALL` order.
    ///
    /// # Parameters
    ///
    /// * `rng` - Random source; a seeded source gives reproducible parameters
    pub fn init_weights<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for (name, mut param) in self.iter_mut() {
            let stdv = init_stdv(param.shape());
            let values = ArrayD::<f32>::random_using(
                param.raw_dim(),
                Uniform::new_inclusive(-stdv, stdv),
                &mut *rng,
            );
            param.assign(&values);
            trace!(parameter = %name, shape = ?param.shape(), stdv, "initialized parameter");
        }
    }

    /// Width of `x`, `z` and `h` these parameters expect
    pub fn input_dims(&self) -> (usize, usize, usize) {
        (
            self.forget.w_x.nrows(),
            self.forget.w_z.nrows(),
            self.forget.w_h.nrows(),
        )
    }

    /// Width of the fused output
    pub fn output_dim(&self) -> usize {
        self.fuse.bias.len()
    }

    /// Total number of scalar parameters
    pub fn param_count(&self) -> usize {
        self.iter().map(|(_, param)| param.len()).sum()
    }

    /// Returns a view of a single parameter
    pub fn get(&self, name: ParameterName) -> ArrayViewD<'_, f32> {
        match name {
            ParameterName::ForgetX => self.forget.w_x.view().into_dyn(),
            ParameterName::ForgetZ => self.forget.w_z.view().into_dyn(),
            ParameterName::ForgetH => self.forget.w_h.view().into_dyn(),
            ParameterName::ForgetBias => self.forget.bias.view().into_dyn(),
            ParameterName::EvolveX => self.evolve.w_x.view().into_dyn(),
            ParameterName::EvolveZ => self.evolve.w_z.view().into_dyn(),
            ParameterName::EvolveH => self.evolve.w_h.view().into_dyn(),
            ParameterName::EvolveBias => self.evolve.bias.view().into_dyn(),
            ParameterName::SelectGX => self.select_g.w_x.view().into_dyn(),
            ParameterName::SelectGZ => self.select_g.w_z.view().into_dyn(),
            ParameterName::SelectGH => self.select_g.w_h.view().into_dyn(),
            ParameterName::SelectGZTilde => self.select_g.w_z_tilde.view().into_dyn(),
            ParameterName::SelectGHTilde => self.select_g.w_h_tilde.view().into_dyn(),
            ParameterName::SelectGBias => self.select_g.bias.view().into_dyn(),
            ParameterName::SelectRX => self.select_r.w_x.view().into_dyn(),
            ParameterName::SelectRZ => self.select_r.w_z.view().into_dyn(),
            ParameterName::SelectRH => self.select_r.w_h.view().into_dyn(),
            ParameterName::SelectRZTilde => self.select_r.w_z_tilde.view().into_dyn(),
            ParameterName::SelectRHTilde => self.select_r.w_h_tilde.view().into_dyn(),
            ParameterName::SelectRBias => self.select_r.bias.view().into_dyn(),
            ParameterName::FuseX => self.fuse.w_x.view().into_dyn(),
            ParameterName::FuseZ => self.fuse.w_z.view().into_dyn(),
            ParameterName::FuseH => self.fuse.w_h.view().into_dyn(),
            ParameterName::FuseBias => self.fuse.bias.view().into_dyn(),
        }
    }

    /// Returns a mutable view of a single parameter
    pub fn get_mut(&mut self, name: ParameterName) -> ArrayViewMutD<'_, f32> {
        match name {
            ParameterName::ForgetX => self.forget.w_x.view_mut().into_dyn(),
            ParameterName::ForgetZ => self.forget.w_z.view_mut().into_dyn(),
            ParameterName::ForgetH => self.forget.w_h.view_mut().into_dyn(),
            ParameterName::ForgetBias => self.forget.bias.view_mut().into_dyn(),
            ParameterName::EvolveX => self.evolve.w_x.view_mut().into_dyn(),
            ParameterName::EvolveZ => self.evolve.w_z.view_mut().into_dyn(),
            ParameterName::EvolveH => self.evolve.w_h.view_mut().into_dyn(),
            ParameterName::EvolveBias => self.evolve.bias.view_mut().into_dyn(),
            ParameterName::SelectGX => self.select_g.w_x.view_mut().into_dyn(),
            ParameterName::SelectGZ => self.select_g.w_z.view_mut().into_dyn(),
            ParameterName::SelectGH => self.select_g.w_h.view_mut().into_dyn(),
            ParameterName::SelectGZTilde => self.select_g.w_z_tilde.view_mut().into_dyn(),
            ParameterName::SelectGHTilde => self.select_g.w_h_tilde.view_mut().into_dyn(),
            ParameterName::SelectGBias => self.select_g.bias.view_mut().into_dyn(),
            ParameterName::SelectRX => self.select_r.w_x.view_mut().into_dyn(),
            ParameterName::SelectRZ => self.select_r.w_z.view_mut().into_dyn(),
            ParameterName::SelectRH => self.select_r.w_h.view_mut().into_dyn(),
            ParameterName::SelectRZTilde => self.select_r.w_z_tilde.view_mut().into_dyn(),
            ParameterName::SelectRHTilde => self.select_r.w_h_tilde.view_mut().into_dyn(),
            ParameterName::SelectRBias => self.select_r.bias.view_mut().into_dyn(),
            ParameterName::FuseX => self.fuse.w_x.view_mut().into_dyn(),
            ParameterName::FuseZ => self.fuse.w_z.view_mut().into_dyn(),
            ParameterName::FuseH => self.fuse.w_h.view_mut().into_dyn(),
            ParameterName::FuseBias => self.fuse.bias.view_mut().into_dyn(),
        }
    }

    /// Iterates over all 24 parameters in `ParameterName::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (ParameterName, ArrayViewD<'_, f32>)> {
        let views = self
            .forget
            .views()
            .into_iter()
            .chain(self.evolve.views())
            .chain(self.select_g.views())
            .chain(self.select_r.views())
            .chain(self.fuse.views());
        ParameterName::ALL.into_iter().zip(views)
    }

    /// Iterates mutably over all 24 parameters in `ParameterName::ALL` order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ParameterName, ArrayViewMutD<'_, f32>)> {
        let GDUParameters {
            forget,
            evolve,
            select_g,
            select_r,
            fuse,
        } = self;
        let views = forget
            .views_mut()
            .into_iter()
            .chain(evolve.views_mut())
            .chain(select_g.views_mut())
            .chain(select_r.views_mut())
            .chain(fuse.views_mut());
        ParameterName::ALL.into_iter().zip(views)
    }

    /// Sets every element of every parameter to `value`
    pub fn fill(&mut self, value: f32) {
        for (_, mut param) in self.iter_mut() {
            param.fill(value);
        }
    }
}
