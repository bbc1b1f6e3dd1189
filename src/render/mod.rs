//! Flattening the scene to pixels and exporting it.

pub mod backend;
pub mod compose;
pub mod export;
