use crate::foundation::error::{EditorError, EditorResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Canvas pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in logical pixels.
    pub width: u32,
    /// Height in logical pixels.
    pub height: u32,
}

impl Canvas {
    /// Build a canvas, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> EditorResult<Self> {
        if width == 0 || height == 0 {
            return Err(EditorError::validation("canvas width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Canvas center in canvas coordinates.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Length of the shorter side.
    pub fn min_side(self) -> f64 {
        f64::from(self.width.min(self.height))
    }

    /// Canvas dimensions multiplied by `ratio`, rounded to whole pixels.
    pub fn scaled(self, ratio: f64) -> EditorResult<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(EditorError::validation("pixel ratio must be finite and > 0"));
        }
        let w = (f64::from(self.width) * ratio).round() as u32;
        let h = (f64::from(self.height) * ratio).round() as u32;
        Self::new(w, h)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        AspectRatio::Square.canvas()
    }
}

/// Declared template aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AspectRatio {
    /// `1:1`, 1080×1080.
    #[serde(rename = "1:1")]
    Square,
    /// `16:9`, 1200×675.
    #[serde(rename = "16:9")]
    Landscape,
    /// `9:16`, 1080×1920.
    #[serde(rename = "9:16")]
    Portrait,
    /// `4:5`, 1080×1350.
    #[serde(rename = "4:5")]
    Vertical,
}

impl AspectRatio {
    /// Every ratio in toolbar order.
    pub const ALL: [AspectRatio; 4] = [
        AspectRatio::Square,
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Vertical,
    ];

    /// Native pixel size for this ratio.
    pub fn canvas(self) -> Canvas {
        let (width, height) = match self {
            AspectRatio::Square => (1080, 1080),
            AspectRatio::Landscape => (1200, 675),
            AspectRatio::Portrait => (1080, 1920),
            AspectRatio::Vertical => (1080, 1350),
        };
        Canvas { width, height }
    }

    /// The `w:h` notation used in template metadata.
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Vertical => "4:5",
        }
    }

    /// Toolbar label, e.g. `16:9 (1200×675)`.
    pub fn label(self) -> String {
        let c = self.canvas();
        format!("{} ({}×{})", self.as_str(), c.width, c.height)
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectRatio::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| EditorError::validation(format!("unknown aspect ratio '{s}'")))
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Object placement: where the origin point lands, how the object is rotated and scaled around it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform2D {
    pub translate: Vec2,
    pub rotation_rad: f64,
    pub scale: Vec2,  // default (1,1)
    pub anchor: Vec2, // pivot in local (unscaled) space
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotation_rad: 0.0,
            scale: Vec2::new(1.0, 1.0),
            anchor: Vec2::ZERO,
        }
    }
}

impl Transform2D {
    pub fn to_affine(self) -> Affine {
        let t_translate = Affine::translate(self.translate);
        let t_rotate = Affine::rotate(self.rotation_rad);
        let t_scale = Affine::scale_non_uniform(self.scale.x, self.scale.y);
        let t_unanchor = Affine::translate(-self.anchor);

        // The anchor lands exactly on `translate`:
        // T(translate) * R(rot) * S(scale) * T(-anchor)
        t_translate * t_rotate * t_scale * t_unanchor
    }
}
