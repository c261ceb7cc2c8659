//! Field storage: scalar fields, tensor fields and the buffer pool

pub mod pool;
pub mod scalar;
pub mod tensor;

pub use pool::FieldPool;
pub use scalar::ScalarField;
pub use tensor::TensorField;
