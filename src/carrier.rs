//! In-memory pixel carriers.
//!
//! A [`Carrier`] is a flat buffer of 8-bit channel samples in row-major,
//! channel-interleaved order (`width * height * channels` bytes). Codecs read
//! a borrowed carrier and always return a new one, so the caller's buffer is
//! never modified.
//!
//! Conversion to and from [`image::DynamicImage`] is provided for callers.
//! Only lossless containers (PNG, BMP) preserve embedded data; output is
//! always written as PNG.

use image::{DynamicImage, ImageBuffer, ImageFormat};
use std::fmt;
use std::io::Cursor;
use std::path::Path;

use crate::stego::CodecError;

/// Channel layout of a carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Grayscale.
    Luma,
    /// Grayscale with alpha.
    LumaAlpha,
    Rgb,
    Rgba,
}

impl ColorMode {
    pub const ALL: [ColorMode; 4] = [
        ColorMode::Luma,
        ColorMode::LumaAlpha,
        ColorMode::Rgb,
        ColorMode::Rgba,
    ];

    /// Samples per pixel.
    pub fn channels(self) -> usize {
        match self {
            Self::Luma => 1,
            Self::LumaAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// Samples per pixel excluding alpha.
    pub fn color_channels(self) -> usize {
        match self {
            Self::Luma | Self::LumaAlpha => 1,
            Self::Rgb | Self::Rgba => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Luma => "L",
            Self::LumaAlpha => "LA",
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded raster image as a flat sample buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carrier {
    width: u32,
    height: u32,
    mode: ColorMode,
    samples: Vec<u8>,
}

impl Carrier {
    /// Creates a carrier, checking that the buffer matches the dimensions.
    pub fn new(
        width: u32,
        height: u32,
        mode: ColorMode,
        samples: Vec<u8>,
    ) -> Result<Self, CodecError> {
        let expected = width as usize * height as usize * mode.channels();
        if samples.len() != expected {
            return Err(CodecError::InvalidCarrier(format!(
                "{}x{} {} needs {} samples, got {}",
                width,
                height,
                mode,
                expected,
                samples.len()
            )));
        }

        Ok(Self {
            width,
            height,
            mode,
            samples,
        })
    }

    /// Creates a carrier with every sample set to `value`.
    pub fn filled(width: u32, height: u32, mode: ColorMode, value: u8) -> Self {
        let len = width as usize * height as usize * mode.channels();
        Self {
            width,
            height,
            mode,
            samples: vec![value; len],
        }
    }

    /// Converts a decoded image. Only 8-bit L, LA, RGB and RGBA are accepted.
    pub fn from_image(image: DynamicImage) -> Result<Self, CodecError> {
        let (width, height) = (image.width(), image.height());
        let (mode, samples) = match image {
            DynamicImage::ImageLuma8(buf) => (ColorMode::Luma, buf.into_raw()),
            DynamicImage::ImageLumaA8(buf) => (ColorMode::LumaAlpha, buf.into_raw()),
            DynamicImage::ImageRgb8(buf) => (ColorMode::Rgb, buf.into_raw()),
            DynamicImage::ImageRgba8(buf) => (ColorMode::Rgba, buf.into_raw()),
            other => {
                return Err(CodecError::UnsupportedMode {
                    mode: format!("{:?}", other.color()),
                    accepted: ColorMode::ALL.iter().map(|m| m.name()).collect(),
                })
            }
        };

        Self::new(width, height, mode, samples)
    }

    /// Decodes an encoded image file held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let image = image::load_from_memory(bytes).map_err(|e| CodecError::Image(e.to_string()))?;
        Self::from_image(image)
    }

    /// Opens and decodes an image file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CodecError> {
        let image = image::open(path).map_err(|e| CodecError::Image(e.to_string()))?;
        Self::from_image(image)
    }

    /// Converts back into an image.
    pub fn into_image(self) -> Result<DynamicImage, CodecError> {
        let (w, h) = (self.width, self.height);
        let image = match self.mode {
            ColorMode::Luma => ImageBuffer::from_raw(w, h, self.samples).map(DynamicImage::ImageLuma8),
            ColorMode::LumaAlpha => {
                ImageBuffer::from_raw(w, h, self.samples).map(DynamicImage::ImageLumaA8)
            }
            ColorMode::Rgb => ImageBuffer::from_raw(w, h, self.samples).map(DynamicImage::ImageRgb8),
            ColorMode::Rgba => {
                ImageBuffer::from_raw(w, h, self.samples).map(DynamicImage::ImageRgba8)
            }
        };

        image.ok_or_else(|| CodecError::InvalidCarrier("sample buffer too small".to_string()))
    }

    /// Serializes the carrier as PNG.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::new();
        self.clone()
            .into_image()?
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| CodecError::Image(e.to_string()))?;
        Ok(bytes)
    }

    /// Writes the carrier as a PNG file regardless of the path's extension.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), CodecError> {
        self.clone()
            .into_image()?
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| CodecError::Image(e.to_string()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn channels(&self) -> usize {
        self.mode.channels()
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// Extracts one channel as a `width * height` plane.
    pub fn channel_plane(&self, channel: usize) -> Vec<u8> {
        self.samples
            .iter()
            .skip(channel)
            .step_by(self.channels())
            .copied()
            .collect()
    }

    /// Fails with a descriptive error unless the mode is in `accepted`.
    pub fn ensure_mode(&self, accepted: &[ColorMode]) -> Result<(), CodecError> {
        if accepted.contains(&self.mode) {
            return Ok(());
        }
        Err(CodecError::UnsupportedMode {
            mode: self.mode.name().to_string(),
            accepted: accepted.iter().map(|m| m.name()).collect(),
        })
    }

    /// Builds a carrier with the same geometry around new samples.
    pub(crate) fn with_samples(&self, samples: Vec<u8>) -> Self {
        debug_assert_eq!(samples.len(), self.samples.len());
        Self {
            width: self.width,
            height: self.height,
            mode: self.mode,
            samples,
        }
    }
}
