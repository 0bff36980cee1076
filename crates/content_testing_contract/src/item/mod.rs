//! Item-domain models, data URIs, and the versioned item store contract.

pub mod data_uri;
pub mod provider;
pub mod types;
