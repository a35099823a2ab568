/// Error types shared by every module of the crate
pub mod error;

pub use error::ModelError;

/// A convenience module that re-exports the most commonly used types and traits from this crate.
///
/// # Available Components
///
/// - `GDU` cell, its configuration and parameter table
/// - Optimizers (SGD, Adam, RMSprop, AdaGrad)
/// - The `TrainableUnit` and `Optimizer` traits
///
/// # Examples
/// ```rust
/// use gdu::prelude::*;
///
/// let unit = GDU::new("news_article", 1, 3, 4, 5, 2).unwrap();
/// assert_eq!(unit.layer_type(), "GDU");
/// ```
pub mod prelude;

/// Components for building and training the Gated Diffusive Unit.
///
/// The Gated Diffusive Unit (GDU) fuses three input representations into one output:
/// a context feature matrix `x`, a diffused state `z` and a hidden state `h`. Two
/// adjustment gates (forget `f`, evolve `e`) produce adjusted states `z_tilde = f ⊙ z`
/// and `h_tilde = e ⊙ h`; two selection gates (`g`, `r`) then softly choose between the
/// original and the adjusted state on each axis, blending four tanh candidates.
///
/// # Core Components
///
/// - **GDU**: the trainable cell (forward, cached backward, optimizer hooks)
/// - **GDUConfig**: the five dimensions plus an opaque type label
/// - **GDUParameters**: the 24 named parameter tensors, grouped per gate
/// - **ParameterName**: explicit table of every parameter, in a fixed order
///
/// ## Optimization Algorithms
/// - **SGD**, **Adam**, **RMSprop**, **AdaGrad**
///
/// # Examples
/// ```rust
/// use gdu::neural_network::*;
/// use ndarray::Array2;
///
/// let mut unit = GDU::with_seed(GDUConfig::new("author", 1, 3, 4, 5, 2).unwrap(), 42);
///
/// let x = Array2::<f32>::ones((8, 3));
/// let z = Array2::<f32>::ones((8, 4));
/// let h = Array2::<f32>::ones((8, 5));
///
/// let output = unit.forward(&x, &z, &h).unwrap();
/// assert_eq!(output.shape(), &[8, 2]);
///
/// // Gradients for an upstream gradient of ones, then one SGD step
/// unit.backward(&Array2::ones((8, 2))).unwrap();
/// SGD::new(0.01).unwrap().update(&mut unit);
/// ```
pub mod neural_network;
