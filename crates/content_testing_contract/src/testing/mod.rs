//! Content-test definition models and the loader contract.

pub mod definition;
pub mod loader;
