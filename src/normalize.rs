use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tempfile::TempDir;

use crate::error::PipelineError;
use crate::heif::HeifDecoder;

/// Quality for the canonical re-encode every input goes through before
/// detection. Pinned at maximum so the unification step degrades the source
/// as little as possible.
const CANONICAL_JPEG_QUALITY: u8 = 100;

/// A path the general raster reader can decode, plus ownership of any
/// temporary directory backing it.
///
/// For HEIC inputs the converted JPEG lives in a directory created for that
/// one file; dropping the `NormalizedInput` removes it, on success and
/// failure paths alike.
#[derive(Debug)]
pub(crate) enum NormalizedInput {
    /// The input was already decodable; no temporary file was created.
    Original(PathBuf),
    /// The input was converted into `path` inside `_dir`.
    Converted { path: PathBuf, _dir: TempDir },
}

impl NormalizedInput {
    pub(crate) fn path(&self) -> &Path {
        match self {
            NormalizedInput::Original(path) => path,
            NormalizedInput::Converted { path, .. } => path,
        }
    }
}

pub(crate) fn is_heic(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("heic"))
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Convert `path` into something the raster reader can open.
///
/// Non-HEIC inputs pass through untouched. HEIC inputs are decoded through
/// the configured [`HeifDecoder`], converted to 3-channel RGB, and written as
/// a JPEG into a fresh temporary directory owned by the returned value.
pub(crate) fn normalize(
    path: &Path,
    heif: Option<&dyn HeifDecoder>,
) -> Result<NormalizedInput, PipelineError> {
    if !is_heic(path) {
        return Ok(NormalizedInput::Original(path.to_path_buf()));
    }

    let decoder = heif.ok_or_else(|| {
        PipelineError::Conversion("no HEIC decoder configured (build with the `heif` feature or inject one)".to_string())
    })?;

    let rgb = decoder.decode(path)?.to_rgb()?;

    let dir = TempDir::new().map_err(|e| PipelineError::Conversion(e.to_string()))?;
    let jpg_path = dir.path().join(format!("{}.jpg", file_stem(path)));
    write_jpeg(&rgb, &jpg_path, CANONICAL_JPEG_QUALITY)
        .map_err(|e| PipelineError::Conversion(e.to_string()))?;

    Ok(NormalizedInput::Converted {
        path: jpg_path,
        _dir: dir,
    })
}

/// Unification step: decode `path` with the general reader and re-encode it
/// as a quality-100 JPEG under `scratch`, so the detector always sees one
/// uniform encoding and unreadable files surface here rather than later.
///
/// `token` is unique per file within a run, which keeps two inputs that share
/// a stem (`img.png`, `img.bmp`) from colliding in the scratch directory.
pub(crate) fn reencode_canonical(
    path: &Path,
    scratch: &Path,
    token: u64,
) -> Result<PathBuf, PipelineError> {
    let decoded = image::open(path).map_err(|e| PipelineError::Conversion(e.to_string()))?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(PipelineError::Conversion(
            "decoded image has zero dimensions".to_string(),
        ));
    }

    let out = scratch.join(format!("{}-{token}.jpg", file_stem(path)));
    write_jpeg(&decoded.to_rgb8(), &out, CANONICAL_JPEG_QUALITY)
        .map_err(|e| PipelineError::Conversion(e.to_string()))?;
    Ok(out)
}

fn write_jpeg(image: &image::RgbImage, path: &Path, quality: u8) -> Result<(), String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| e.to_string())
}
