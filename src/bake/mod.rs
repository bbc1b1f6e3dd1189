//! Template baking: render off-screen, then install the capture as the locked background.

pub mod pipeline;
pub mod renderer;
