//! Python interface for the valuation engine.

pub mod bindings;
pub mod numpy_bridge;
