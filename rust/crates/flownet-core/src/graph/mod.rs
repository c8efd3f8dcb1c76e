mod core;
pub mod residual;

pub use self::core::{EdgeId, IndexGraph, NodeId};
