pub use crate::error::ModelError;
pub use crate::neural_network::layer::{
    GDU, GDUConfig, GDUParameters, GDUTrace, LayerWeight, ParameterName, TrainingParameters,
};
pub use crate::neural_network::neural_network_trait::{Optimizer, TrainableUnit};
pub use crate::neural_network::optimizer::*;
