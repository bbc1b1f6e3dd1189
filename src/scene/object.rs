use crate::assets::color::Color;
use crate::assets::decode::PreparedImage;
use crate::assets::source::ImageSource;
use crate::foundation::core::{Affine, Point, Rect, Size, Transform2D, Vec2};

/// Identity of a scene object, allocated once per session and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "obj-{}", self.0)
    }
}

/// Text weights the inspector offers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontWeight {
    #[default]
    Normal,
    W500,
    W600,
    W700,
    W800,
}

impl FontWeight {
    /// Inspector dropdown order.
    pub const ALL: [FontWeight; 5] = [
        FontWeight::Normal,
        FontWeight::W500,
        FontWeight::W600,
        FontWeight::W700,
        FontWeight::W800,
    ];

    /// Numeric OpenType weight.
    pub fn numeric(self) -> u16 {
        match self {
            FontWeight::Normal => 400,
            FontWeight::W500 => 500,
            FontWeight::W600 => 600,
            FontWeight::W700 => 700,
            FontWeight::W800 => 800,
        }
    }

    /// CSS `font-weight` value.
    pub fn css_value(self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::W500 => "500",
            FontWeight::W600 => "600",
            FontWeight::W700 => "700",
            FontWeight::W800 => "800",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FontWeight::Normal => "Normal",
            FontWeight::W500 => "Medium",
            FontWeight::W600 => "Semi Bold",
            FontWeight::W700 => "Bold",
            FontWeight::W800 => "Extra Bold",
        }
    }
}

impl std::str::FromStr for FontWeight {
    type Err = crate::foundation::error::EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "400" => Ok(FontWeight::Normal),
            "500" => Ok(FontWeight::W500),
            "600" => Ok(FontWeight::W600),
            "bold" | "700" => Ok(FontWeight::W700),
            "800" => Ok(FontWeight::W800),
            other => Err(crate::foundation::error::EditorError::validation(format!(
                "unsupported font weight '{other}'"
            ))),
        }
    }
}

/// Placement shared by every object variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Where the origin point lands on the canvas.
    pub position: Point,
    pub rotation_deg: f64,
    pub scale: Vec2,
    /// Pivot as a fraction of the native size; `(0.5, 0.5)` is the center.
    pub origin: Vec2,
    pub opacity: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Point::ORIGIN,
            rotation_deg: 0.0,
            scale: Vec2::new(1.0, 1.0),
            origin: Vec2::ZERO,
            opacity: 1.0,
        }
    }
}

impl Placement {
    /// Centered pivot placed at `position`.
    pub fn centered_at(position: Point) -> Self {
        Self {
            position,
            origin: Vec2::new(0.5, 0.5),
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, sx: f64, sy: f64) -> Self {
        self.scale = Vec2::new(sx, sy);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextBody {
    pub content: String,
    pub font_size: f64,
    /// CSS family stack.
    pub font_family: String,
    pub font_weight: FontWeight,
    /// CSS color string.
    pub fill: String,
    /// Measured native size; refreshed by the scene graph whenever text or font changes.
    pub extent: Size,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rect,
    Circle,
}

impl ShapeKind {
    /// Capitalized kind name used for layer labels.
    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Rect => "Rectangle",
            ShapeKind::Circle => "Circle",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShapeBody {
    pub kind: ShapeKind,
    /// Unscaled size; a circle's diameter on both axes.
    pub size: Size,
    pub fill: String,
    pub corner_radius: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct ImageBody {
    pub source: ImageSource,
    pub image: PreparedImage,
}

/// Rasterized template output installed at the bottom of the scene.
#[derive(Clone, Debug)]
pub struct BackgroundBody {
    pub template_id: String,
    pub image: PreparedImage,
}

#[derive(Clone, Debug)]
pub enum ObjectKind {
    Text(TextBody),
    Shape(ShapeBody),
    Image(ImageBody),
    Background(BackgroundBody),
}

/// One addressable item on the canvas.
#[derive(Clone, Debug)]
pub struct SceneObject {
    pub id: ObjectId,
    pub placement: Placement,
    pub kind: ObjectKind,
}

/// A single typed attribute write.
#[derive(Clone, Debug, PartialEq)]
pub enum Attr {
    Left(f64),
    Top(f64),
    Angle(f64),
    Opacity(f64),
    ScaleX(f64),
    ScaleY(f64),
    Fill(String),
    FontSize(f64),
    FontWeight(FontWeight),
    FontFamily(String),
    Content(String),
    CornerRadius(f64),
    /// Rendered width; resizes shapes, rescales text and images.
    Width(f64),
    /// Rendered height; resizes shapes, rescales text and images.
    Height(f64),
}

/// Outcome of [`SceneObject::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Applied {
    /// Nothing changed: unknown attribute for the variant or invalid value.
    Ignored,
    Changed,
    /// Changed text content or font; the extent must be measured again.
    ChangedText,
}

impl SceneObject {
    pub fn is_background(&self) -> bool {
        matches!(self.kind, ObjectKind::Background(_))
    }

    /// Everything except the background can be selected.
    pub fn is_selectable(&self) -> bool {
        !self.is_background()
    }

    /// Unscaled size in local coordinates.
    pub fn native_size(&self) -> Size {
        match &self.kind {
            ObjectKind::Text(t) => t.extent,
            ObjectKind::Shape(s) => s.size,
            ObjectKind::Image(i) => Size::new(f64::from(i.image.width), f64::from(i.image.height)),
            ObjectKind::Background(b) => {
                Size::new(f64::from(b.image.width), f64::from(b.image.height))
            }
        }
    }

    /// Local-to-canvas transform.
    pub fn affine(&self) -> Affine {
        let p = &self.placement;
        let native = self.native_size();
        Transform2D {
            translate: p.position.to_vec2(),
            rotation_rad: p.rotation_deg.to_radians(),
            scale: p.scale,
            anchor: Vec2::new(p.origin.x * native.width, p.origin.y * native.height),
        }
        .to_affine()
    }

    /// Axis-aligned bounds on the canvas, rotation included.
    pub fn bounding_box(&self) -> Rect {
        let local = Rect::from_origin_size(Point::ORIGIN, self.native_size());
        self.affine().transform_rect_bbox(local)
    }

    /// Rendered (scaled) size, ignoring rotation.
    pub fn scaled_size(&self) -> Size {
        let n = self.native_size();
        Size::new(
            n.width * self.placement.scale.x.abs(),
            n.height * self.placement.scale.y.abs(),
        )
    }

    /// Fill color string for variants that have one.
    pub fn fill(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::Text(t) => Some(&t.fill),
            ObjectKind::Shape(s) => Some(&s.fill),
            ObjectKind::Image(_) | ObjectKind::Background(_) => None,
        }
    }

    pub(crate) fn apply(&mut self, attr: &Attr) -> Applied {
        if self.is_background() {
            return Applied::Ignored;
        }
        let native = self.native_size();
        let p = &mut self.placement;

        match (attr, &mut self.kind) {
            (Attr::Left(v), _) if v.is_finite() => p.position.x = *v,
            (Attr::Top(v), _) if v.is_finite() => p.position.y = *v,
            (Attr::Angle(v), _) if v.is_finite() => p.rotation_deg = *v,
            (Attr::Opacity(v), _) if v.is_finite() => p.opacity = v.clamp(0.0, 1.0),
            (Attr::ScaleX(v), _) if positive(*v) => p.scale.x = *v,
            (Attr::ScaleY(v), _) if positive(*v) => p.scale.y = *v,

            (Attr::Fill(c), ObjectKind::Text(TextBody { fill, .. }))
            | (Attr::Fill(c), ObjectKind::Shape(ShapeBody { fill, .. }))
                if Color::parse(c).is_ok() =>
            {
                *fill = c.trim().to_string();
            }

            (Attr::FontSize(v), ObjectKind::Text(t)) if positive(*v) => {
                t.font_size = *v;
                return Applied::ChangedText;
            }
            (Attr::FontWeight(w), ObjectKind::Text(t)) => {
                t.font_weight = *w;
                return Applied::ChangedText;
            }
            (Attr::FontFamily(f), ObjectKind::Text(t)) if !f.trim().is_empty() => {
                t.font_family = f.trim().to_string();
                return Applied::ChangedText;
            }
            (Attr::Content(s), ObjectKind::Text(t)) => {
                t.content = s.clone();
                return Applied::ChangedText;
            }

            (Attr::CornerRadius(v), ObjectKind::Shape(s))
                if s.kind == ShapeKind::Rect && v.is_finite() && *v >= 0.0 =>
            {
                s.corner_radius = Some(*v);
            }

            (Attr::Width(v), ObjectKind::Shape(s)) if positive(*v) => match s.kind {
                ShapeKind::Rect => s.size.width = *v / p.scale.x.abs(),
                ShapeKind::Circle => {
                    let d = *v / p.scale.x.abs();
                    s.size = Size::new(d, d);
                }
            },
            (Attr::Height(v), ObjectKind::Shape(s)) if positive(*v) => match s.kind {
                ShapeKind::Rect => s.size.height = *v / p.scale.y.abs(),
                ShapeKind::Circle => {
                    let d = *v / p.scale.y.abs();
                    s.size = Size::new(d, d);
                }
            },
            (Attr::Width(v), ObjectKind::Text(_) | ObjectKind::Image(_))
                if positive(*v) && native.width > 0.0 =>
            {
                p.scale.x = *v / native.width;
            }
            (Attr::Height(v), ObjectKind::Text(_) | ObjectKind::Image(_))
                if positive(*v) && native.height > 0.0 =>
            {
                p.scale.y = *v / native.height;
            }

            _ => return Applied::Ignored,
        }
        Applied::Changed
    }
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

#[cfg(test)]
#[path = "../../tests/unit/scene/object.rs"]
mod tests;
