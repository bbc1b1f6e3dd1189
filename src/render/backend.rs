use crate::assets::decode::{
    PreparedImage, premultiply_rgba8_in_place, unpremultiply_rgba8_in_place,
};
use crate::foundation::error::EditorResult;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are premultiplied alpha unless `premultiplied` says otherwise.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the pixel data.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }

    /// Convert into an image a scene object can hold.
    pub fn into_prepared_image(self) -> EditorResult<PreparedImage> {
        let mut data = self.data;
        if !self.premultiplied {
            premultiply_rgba8_in_place(&mut data);
        }
        PreparedImage::from_premul(self.width, self.height, data)
    }
}
