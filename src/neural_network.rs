/// Module that contains the Gated Diffusive Unit and its weight views
pub mod layer;
/// Module that contains the traits shared by trainable units and optimizers
pub mod neural_network_trait;
/// Module that contains optimization algorithms for training the unit
pub mod optimizer;

pub use layer::*;
pub use optimizer::*;

pub use neural_network_trait::Optimizer;
pub use neural_network_trait::TrainableUnit;
