//! Editor session context and toolbar actions.

pub mod editor;
pub mod toolbar;
