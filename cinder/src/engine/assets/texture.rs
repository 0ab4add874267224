use serde::{Deserialize, Serialize};
use std::path::Path;
use wgpu::TextureFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    Rgba8,
    R8,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::R8 => 1,
        }
    }
}

/// Decoded pixel data. The pixels themselves live in the artifact's bulk section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub srgb: bool,
    pub cpu_readable: bool,
    #[serde(skip)]
    pub pixels: Vec<u8>,
}

impl Texture {
    pub fn load_image<P: AsRef<Path>>(
        path: P,
        srgb: bool,
        cpu_readable: bool,
    ) -> Result<Texture, image::ImageError> {
        let image = image::open(path)?;
        let rgba = image.into_rgba8();

        Ok(Texture {
            width: rgba.width(),
            height: rgba.height(),
            format: PixelFormat::Rgba8,
            srgb,
            cpu_readable,
            pixels: rgba.into_raw(),
        })
    }

    pub fn load_pixels(pixels: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> Texture {
        Texture {
            width,
            height,
            format,
            srgb: false,
            cpu_readable: false,
            pixels,
        }
    }

    /// Size of the pixel data. `None` if the dimensions don't fit in memory at all.
    pub fn byte_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.format.bytes_per_pixel())
    }

    /// The format this texture would be uploaded with.
    pub fn gpu_format(&self) -> TextureFormat {
        match (self.format, self.srgb) {
            (PixelFormat::Rgba8, true) => TextureFormat::Rgba8UnormSrgb,
            (PixelFormat::Rgba8, false) => TextureFormat::Rgba8Unorm,
            (PixelFormat::R8, _) => TextureFormat::R8Unorm,
        }
    }
}
