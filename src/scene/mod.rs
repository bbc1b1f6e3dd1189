//! The editable scene: object model and the graph that owns ordering and selection.

pub mod graph;
pub mod object;
