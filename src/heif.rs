use std::path::Path;

use image::RgbImage;

use crate::error::PipelineError;

/// Channel layout of a decoded HEIC frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMode {
    /// 3 bytes per pixel, interleaved.
    Rgb,
    /// 4 bytes per pixel, interleaved; alpha is flattened over white during
    /// conversion.
    Rgba,
}

impl PixelMode {
    fn bytes_per_pixel(self) -> usize {
        match self {
            PixelMode::Rgb => 3,
            PixelMode::Rgba => 4,
        }
    }
}

/// Raw decoded HEIC frame as handed back by a decoder backend: interleaved
/// pixel buffer, channel mode, dimensions, and row stride in bytes.
#[derive(Debug, Clone)]
pub struct HeifImage {
    /// Interleaved pixel data, `stride` bytes per row.
    pub data: Vec<u8>,
    /// Channel layout of `data`.
    pub mode: PixelMode,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes per row. At least `width × bytes_per_pixel`; rows may be padded.
    pub stride: usize,
}

impl HeifImage {
    /// Convert to a tightly packed 3-channel RGB image, honoring the row
    /// stride and compositing any alpha channel onto a white background.
    pub fn to_rgb(&self) -> Result<RgbImage, PipelineError> {
        let bpp = self.mode.bytes_per_pixel();
        let row_bytes = self.width as usize * bpp;
        if self.stride < row_bytes {
            return Err(PipelineError::Conversion(format!(
                "stride {} is smaller than row width {}",
                self.stride, row_bytes
            )));
        }
        let needed = self
            .stride
            .saturating_mul(self.height.saturating_sub(1) as usize)
            + row_bytes;
        if self.width == 0 || self.height == 0 || self.data.len() < needed {
            return Err(PipelineError::Conversion(format!(
                "pixel buffer too short: {} bytes for {}x{} stride {}",
                self.data.len(),
                self.width,
                self.height,
                self.stride
            )));
        }

        let mut rgb = RgbImage::new(self.width, self.height);
        for y in 0..self.height {
            let row = &self.data[y as usize * self.stride..];
            for x in 0..self.width {
                let px = &row[x as usize * bpp..x as usize * bpp + bpp];
                let pixel = match self.mode {
                    PixelMode::Rgb => image::Rgb([px[0], px[1], px[2]]),
                    PixelMode::Rgba => {
                        // Composite over white (255, 255, 255)
                        let alpha = px[3] as f32 / 255.0;
                        let inv_alpha = 1.0 - alpha;
                        let blend =
                            |c: u8| (c as f32 * alpha + 255.0 * inv_alpha).round() as u8;
                        image::Rgb([blend(px[0]), blend(px[1]), blend(px[2])])
                    }
                };
                rgb.put_pixel(x, y, pixel);
            }
        }
        Ok(rgb)
    }
}

/// Pluggable HEIC decoding backend.
///
/// The pipeline treats HEIC decoding as an opaque capability; the built-in
/// [`crate::libheif_backend::LibheifDecoder`] (feature `heif`) wraps the
/// native libheif library, and tests inject stub implementations.
pub trait HeifDecoder: Send + Sync {
    /// Decode the primary image of the HEIC file at `path`.
    fn decode(&self, path: &Path) -> Result<HeifImage, PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_image(width: u32, height: u32, stride: usize) -> HeifImage {
        let mut data = vec![0u8; stride * height as usize];
        for y in 0..height as usize {
            for x in 0..width as usize {
                data[y * stride + x * 3] = (x * 10) as u8;
                data[y * stride + x * 3 + 1] = (y * 10) as u8;
                data[y * stride + x * 3 + 2] = 7;
            }
        }
        HeifImage {
            data,
            mode: PixelMode::Rgb,
            width,
            height,
            stride,
        }
    }

    #[test]
    fn rgb_conversion_is_exact() {
        let rgb = rgb_image(4, 3, 12).to_rgb().unwrap();
        assert_eq!(rgb.dimensions(), (4, 3));
        assert_eq!(rgb.get_pixel(2, 1), &image::Rgb([20, 10, 7]));
    }

    #[test]
    fn padded_stride_is_honored() {
        // 4 px * 3 bytes = 12, padded to 16
        let rgb = rgb_image(4, 3, 16).to_rgb().unwrap();
        assert_eq!(rgb.get_pixel(3, 2), &image::Rgb([30, 20, 7]));
    }

    #[test]
    fn transparent_rgba_flattens_to_white() {
        let img = HeifImage {
            data: vec![255, 0, 0, 0],
            mode: PixelMode::Rgba,
            width: 1,
            height: 1,
            stride: 4,
        };
        let rgb = img.to_rgb().unwrap();
        assert_eq!(rgb.get_pixel(0, 0), &image::Rgb([255, 255, 255]));
    }

    #[test]
    fn opaque_rgba_keeps_color() {
        let img = HeifImage {
            data: vec![100, 150, 200, 255],
            mode: PixelMode::Rgba,
            width: 1,
            height: 1,
            stride: 4,
        };
        let rgb = img.to_rgb().unwrap();
        assert_eq!(rgb.get_pixel(0, 0), &image::Rgb([100, 150, 200]));
    }

    #[test]
    fn short_buffer_is_rejected() {
        let img = HeifImage {
            data: vec![0; 10],
            mode: PixelMode::Rgb,
            width: 4,
            height: 3,
            stride: 12,
        };
        assert!(img.to_rgb().is_err());
    }

    #[test]
    fn undersized_stride_is_rejected() {
        let img = HeifImage {
            data: vec![0; 100],
            mode: PixelMode::Rgb,
            width: 4,
            height: 3,
            stride: 8,
        };
        assert!(img.to_rgb().is_err());
    }
}
