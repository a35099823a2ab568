use super::*;

/// Dimensions of a Gated Diffusive Unit.
///
/// Immutable once built; every parameter shape of the unit is derived from it.
///
/// # Fields
///
/// - `gdu_type` - Opaque label kept for the caller's bookkeeping (e.g. which node type of a heterogeneous graph the unit serves); never read by the computation
/// - `g_sz` - Vestigial dimension kept for interface symmetry; no gate consumes it
/// - `x_sz` - Width of the context feature input `x`
/// - `z_sz` - Width of the diffused state input `z`
/// - `h_sz` - Width of the hidden state input `h`
/// - `out_sz` - Width of the fused output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GDUConfig {
    gdu_type: String,
    g_sz: usize,
    x_sz: usize,
    z_sz: usize,
    h_sz: usize,
    out_sz: usize,
}

impl GDUConfig {
    /// Creates a validated configuration.
    ///
    /// # Parameters
    ///
    /// - `gdu_type` - Opaque type label
    /// - `g_sz` - Vestigial dimension
    /// - `x_sz` - Width of `x`
    /// - `z_sz` - Width of `z`
    /// - `h_sz` - Width of `h`
    /// - `out_sz` - Width of the output
    ///
    /// # Returns
    ///
    /// - `Result<Self, ModelError>` - The configuration
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
        validate_gdu_dimensions(g_sz, x_sz, z_sz, h_sz, out_sz)?;

        Ok(Self {
            gdu_type: gdu_type.into(),
            g_sz,
            x_sz,
            z_sz,
            h_sz,
            out_sz,
        })
    }

    pub fn gdu_type(&self) -> &str {
        &self.gdu_type
    }

    pub fn g_sz(&self) -> usize {
        self.g_sz
    }

    pub fn x_sz(&self) -> usize {
        self.x_sz
    }

    pub fn z_sz(&self) -> usize {
        self.z_sz
    }

    pub fn h_sz(&self) -> usize {
        self.h_sz
    }

    pub fn out_sz(&self) -> usize {
        self.out_sz
    }
}
