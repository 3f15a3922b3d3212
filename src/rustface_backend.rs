use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::face_detector::{FaceDetector, FaceRegion};

/// Default location of the SeetaFace frontal-face model, relative to the
/// working directory.
pub const DEFAULT_MODEL_PATH: &str = "models/seeta_fd_frontal_v1.0.bin";

/// Regions smaller than this on either side are discarded.
const MIN_FACE_SIZE: u32 = 100;

/// Scale step between pyramid levels. SeetaFace expresses this as a shrink
/// factor below 1.0, so a 1.05 step becomes 1/1.05.
const SCALE_STEP: f32 = 1.05;

/// Minimum overlapping-detection score required to confirm a face.
const CONFIRMATION_THRESHOLD: f64 = 6.0;

/// The model file could not be read or parsed.
#[derive(Debug, Error)]
#[error("failed to load face detection model from {path}: {message}")]
pub struct ModelLoadError {
    path: PathBuf,
    message: String,
}

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The model is read from disk exactly once, at construction; `detect` builds
/// a per-call detector from the held model because the engine's detector type
/// is not `Sync`.
pub struct RustfaceDetector {
    model: rustface::Model,
}

impl RustfaceDetector {
    /// Load the SeetaFace model from `path`.
    pub fn from_file(path: &Path) -> Result<Self, ModelLoadError> {
        let file = File::open(path).map_err(|e| ModelLoadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let model = rustface::read_model(BufReader::new(file)).map_err(|e| ModelLoadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self { model })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceRegion> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(MIN_FACE_SIZE);
        detector.set_score_thresh(CONFIRMATION_THRESHOLD);
        detector.set_pyramid_scale_factor(1.0 / SCALE_STEP);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));

        faces
            .iter()
            .filter_map(|face| {
                let bbox = face.bbox();
                clamp_region(
                    bbox.x(),
                    bbox.y(),
                    bbox.width(),
                    bbox.height(),
                    width,
                    height,
                )
            })
            .filter(|r| r.width >= MIN_FACE_SIZE && r.height >= MIN_FACE_SIZE)
            .collect()
    }
}

/// Clip a raw engine rectangle to the image bounds. The engine can report
/// boxes that start before the left/top edge or run past the right/bottom
/// edge; downstream code requires fully in-bounds regions.
fn clamp_region(
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    image_width: u32,
    image_height: u32,
) -> Option<FaceRegion> {
    if image_width == 0 || image_height == 0 {
        return None;
    }

    let left = x.max(0) as u32;
    let top = y.max(0) as u32;
    if left >= image_width || top >= image_height {
        return None;
    }

    // Amount cut off the left/top edge shrinks the box by the same amount.
    let lost_left = (left as i64 - x as i64) as u32;
    let lost_top = (top as i64 - y as i64) as u32;
    let width = width.saturating_sub(lost_left).min(image_width - left);
    let height = height.saturating_sub(lost_top).min(image_height - top);
    if width == 0 || height == 0 {
        return None;
    }

    Some(FaceRegion {
        x: left,
        y: top,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_bounds_region_is_unchanged() {
        let r = clamp_region(10, 20, 100, 120, 640, 480).unwrap();
        assert_eq!(
            r,
            FaceRegion {
                x: 10,
                y: 20,
                width: 100,
                height: 120
            }
        );
    }

    #[test]
    fn negative_origin_is_clipped() {
        let r = clamp_region(-30, -10, 100, 100, 640, 480).unwrap();
        assert_eq!(r.x, 0);
        assert_eq!(r.y, 0);
        assert_eq!(r.width, 70);
        assert_eq!(r.height, 90);
    }

    #[test]
    fn overflow_past_right_edge_is_clipped() {
        let r = clamp_region(600, 0, 100, 100, 640, 480).unwrap();
        assert_eq!(r.x, 600);
        assert_eq!(r.width, 40);
    }

    #[test]
    fn region_outside_image_is_dropped() {
        assert!(clamp_region(700, 0, 100, 100, 640, 480).is_none());
        assert!(clamp_region(-200, 0, 100, 100, 640, 480).is_none());
    }

    #[test]
    fn zero_sized_image_yields_nothing() {
        assert!(clamp_region(0, 0, 100, 100, 0, 480).is_none());
    }
}
