use std::path::Path;

use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

use crate::error::PipelineError;
use crate::heif::{HeifDecoder, HeifImage, PixelMode};

/// HEIC decoder backed by the native libheif library.
pub struct LibheifDecoder {
    lib: LibHeif,
}

impl LibheifDecoder {
    /// Initialize the libheif runtime.
    pub fn new() -> Self {
        Self {
            lib: LibHeif::new(),
        }
    }
}

impl Default for LibheifDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeifDecoder for LibheifDecoder {
    fn decode(&self, path: &Path) -> Result<HeifImage, PipelineError> {
        let conversion = |e: libheif_rs::HeifError| PipelineError::Conversion(e.to_string());

        let context = HeifContext::read_from_file(&path.to_string_lossy()).map_err(conversion)?;
        let handle = context.primary_image_handle().map_err(conversion)?;
        let decoded = self
            .lib
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
            .map_err(conversion)?;

        let planes = decoded.planes();
        let plane = planes.interleaved.ok_or_else(|| {
            PipelineError::Conversion("decoded HEIC has no interleaved plane".to_string())
        })?;

        Ok(HeifImage {
            data: plane.data.to_vec(),
            mode: PixelMode::Rgb,
            width: plane.width,
            height: plane.height,
            stride: plane.stride,
        })
    }
}
