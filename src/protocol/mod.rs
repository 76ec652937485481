pub mod registry;
pub mod wire;

pub use registry::{AlgorithmId, SpecRegistry, build_registry, registry};
