//! Brandcanvas bakes branded marketing templates and edits layered designs on top of them.
//!
//! The API is session-oriented:
//!
//! - Load a [`TemplateCatalog`] and validate a [`BrandConfig`]
//! - Create an [`EditorSession`] and bake a template into it with a [`BakePipeline`]
//! - Add text, shapes and images, edit them through the [`Inspector`] and [`layers`]
//! - Export the result with [`export_png`]
//!
//! Everything runs on one thread. Asynchronous operations borrow the session only between
//! suspension points and discard their result if the scene moved on while they were pending.
#![forbid(unsafe_code)]

mod foundation;

/// Colors, image decoding, image sources and fonts.
pub mod assets;
/// Template baking.
pub mod bake;
/// Template catalog, brand validation and the generate passthrough.
pub mod catalog;
pub mod inspector;
pub mod layers;
/// Compositing and PNG export.
pub mod render;
/// Scene objects and the scene graph.
pub mod scene;
/// Editor session state and toolbar actions.
pub mod session;

pub use crate::foundation::core::{
    Affine, AspectRatio, Canvas, Point, Rect, Rgba8Premul, Size, Transform2D, Vec2,
};
pub use crate::foundation::error::{EditorError, EditorResult, FieldError};

pub use crate::assets::fonts::{FontBook, FontBookOpts};
pub use crate::assets::source::{FsLoader, ImageSource, SourceLoader};
pub use crate::bake::pipeline::{BakeOpts, BakeOutcome, BakePipeline, BakeRequest, BakeTicket};
pub use crate::bake::renderer::{RenderJob, SvgTemplateRenderer, TemplateRenderer};
pub use crate::catalog::brand::{BrandConfig, validate_brand};
pub use crate::catalog::generate::{GenerateRequest, GenerateResponse, generate};
pub use crate::catalog::template::{TemplateCatalog, TemplateDefinition};
pub use crate::inspector::{Inspector, InspectorEdit, InspectorState};
pub use crate::render::backend::FrameRGBA;
pub use crate::render::export::{ExportedImage, export_png};
pub use crate::scene::graph::{ReorderDirection, SceneGraph};
pub use crate::scene::object::{Attr, ObjectId, ObjectKind, SceneObject};
pub use crate::session::editor::{EditorOpts, EditorSession, Notice, NoticeLevel};
pub use crate::session::toolbar::{ImageFit, add_image};
