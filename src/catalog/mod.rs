//! Template metadata, brand configuration, and the generate passthrough.

pub mod brand;
pub mod generate;
pub mod template;
