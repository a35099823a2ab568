use super::*;

/// Container for the weights of a trainable unit
///
/// # Variants
///
/// - `GDU` - Contains weights for a Gated Diffusive Unit
pub enum LayerWeight<'a> {
    GDU(GDULayerWeight<'a>),
}

/// Weights for a gate fed by `x`, `z` and `h` (forget, evolve and fuse)
///
/// # Fields
///
/// - `w_x` - Weight matrix for the context input
/// - `w_z` - Weight matrix for the diffused state
/// - `w_h` - Weight matrix for the hidden state
/// - `bias` - Bias vector for the gate
pub struct AdjustmentGateWeight<'a> {
    pub w_x: &'a Array2<f32>,
    pub w_z: &'a Array2<f32>,
    pub w_h: &'a Array2<f32>,
    pub bias: &'a Array1<f32>,
}

/// Weights for a selection gate (g or r)
///
/// # Fields
///
/// - `w_x` - Weight matrix for the context input
/// - `w_z` - Weight matrix for the diffused state
/// - `w_h` - Weight matrix for the hidden state
/// - `w_z_tilde` - Weight matrix for the adjusted diffused state
/// - `w_h_tilde` - Weight matrix for the adjusted hidden state
/// - `bias` - Bias vector for the gate
pub struct SelectionGateWeight<'a> {
    pub w_x: &'a Array2<f32>,
    pub w_z: &'a Array2<f32>,
    pub w_h: &'a Array2<f32>,
    pub w_z_tilde: &'a Array2<f32>,
    pub w_h_tilde: &'a Array2<f32>,
    pub bias: &'a Array1<f32>,
}

/// Weights for a Gated Diffusive Unit
///
/// # Fields
///
/// - `forget` - Forget gate `f`, which adjusts the diffused state
/// - `evolve` - Evolve gate `e`, which adjusts the hidden state
/// - `select_g` - Selection gate `g` over {z_tilde, z}
/// - `select_r` - Selection gate `r` over {h_tilde, h}
/// - `fuse` - Shared projection of the four candidate outputs
pub struct GDULayerWeight<'a> {
    pub forget: AdjustmentGateWeight<'a>,
    pub evolve: AdjustmentGateWeight<'a>,
    pub select_g: SelectionGateWeight<'a>,
    pub select_r: SelectionGateWeight<'a>,
    pub fuse: AdjustmentGateWeight<'a>,
}

impl<'a> AdjustmentGateWeight<'a> {
    fn from_gate(gate: &'a AdjustmentGate) -> Self {
        Self {
            w_x: &gate.w_x,
            w_z: &gate.w_z,
            w_h: &gate.w_h,
            bias: &gate.bias,
        }
    }
}

impl<'a> SelectionGateWeight<'a> {
    fn from_gate(gate: &'a SelectionGate) -> Self {
        Self {
            w_x: &gate.w_x,
            w_z: &gate.w_z,
            w_h: &gate.w_h,
            w_z_tilde: &gate.w_z_tilde,
            w_h_tilde: &gate.w_h_tilde,
            bias: &gate.bias,
        }
    }
}

impl<'a> GDULayerWeight<'a> {
    /// Borrows every tensor of `parameters`
    pub fn from_parameters(parameters: &'a GDUParameters) -> Self {
        Self {
            forget: AdjustmentGateWeight::from_gate(&parameters.forget),
            evolve: AdjustmentGateWeight::from_gate(&parameters.evolve),
            select_g: SelectionGateWeight::from_gate(&parameters.select_g),
            select_r: SelectionGateWeight::from_gate(&parameters.select_r),
            fuse: AdjustmentGateWeight::from_gate(&parameters.fuse),
        }
    }
}
