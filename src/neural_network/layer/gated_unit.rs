use super::*;

/// Inputs to the sigmoid are clamped to this magnitude to keep `exp` finite
const SIGMOID_CLAMP: f32 = 500.0;

/// Threshold for using parallel computation in the GDU.
/// When batch_size * widest gate < this value, gates are evaluated sequentially.
/// When batch_size * widest gate >= this value, independent gates run on the rayon pool.
const GDU_PARALLEL_THRESHOLD: usize = 1024;

/// Applies stable sigmoid activation to an array
///
/// Uses clipping to prevent numerical overflow before computing sigmoid.
#[inline]
fn apply_sigmoid(arr: Array2<f32>) -> Array2<f32> {
    arr.mapv(|x| {
        let clipped_x = x.clamp(-SIGMOID_CLAMP, SIGMOID_CLAMP);
        1.0 / (1.0 + (-clipped_x).exp())
    })
}

/// Applies tanh activation to an array
#[inline]
fn apply_tanh(arr: Array2<f32>) -> Array2<f32> {
    arr.mapv(f32::tanh)
}

/// Runs two independent computations, on the rayon pool when `parallel` is set
#[inline]
fn join_if<A, B, RA, RB>(parallel: bool, a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    if parallel {
        rayon::join(a, b)
    } else {
        (a(), b())
    }
}

/// Dimensions and type label of a Gated Diffusive Unit
mod config;
/// The GDU cell: forward pass, cached backward pass and optimizer hooks
mod gdu;
/// Input validation functions for the GDU
mod input_validation_function;
/// Named parameter table, gate parameter groups and initialization
mod parameter;

pub use config::GDUConfig;
pub use gdu::{GDU, GDUTrace};
pub use parameter::{AdjustmentGate, GDUParameters, ParameterName, SelectionGate, init_stdv};

use input_validation_function::*;
