use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::TempDir;

use crate::crop::crop_face;
use crate::error::{BatchError, PipelineError};
use crate::face_detector::FaceDetector;
use crate::heif::HeifDecoder;
use crate::normalize::{self, NormalizedInput};

/// File extensions (case-insensitive) that count as batch candidates.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "heic"];

/// Terminal state of one file's trip through the pipeline.
///
/// Crops from one file are written independently: if a later write fails the
/// file is `Skipped`, but crops already written for it are not removed.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was processed to completion; `faces` crops were written.
    Done {
        /// Number of face crops written for this file.
        faces: usize,
    },
    /// The file was skipped; the reason says at which step and why.
    Skipped(PipelineError),
}

/// Result of a whole batch run.
#[derive(Debug)]
pub struct BatchSummary {
    /// Files that matched a supported extension, whether or not they ended in
    /// [`FileOutcome::Done`]. This is the number the summary line reports.
    pub attempted: usize,
    /// Per-file outcomes, in processing order.
    pub outcomes: Vec<(PathBuf, FileOutcome)>,
}

impl BatchSummary {
    /// Files that ended in [`FileOutcome::Done`].
    pub fn completed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, FileOutcome::Done { .. }))
            .count()
    }
}

/// Batch face-extraction pipeline.
///
/// Walks an input directory, normalizes each supported image, detects faces,
/// and writes one 512×512 JPEG crop per detection to the output directory as
/// `{stem}_{index}.jpg`. A failure in one file never aborts the batch.
///
/// ```no_run
/// use facecrop::{FaceCropBatch, RustfaceDetector};
/// use std::path::Path;
///
/// let detector = RustfaceDetector::from_file(Path::new(facecrop::DEFAULT_MODEL_PATH))?;
/// let summary = FaceCropBatch::new(Box::new(detector))
///     .run(Path::new("input"), Path::new("output"))?;
/// println!("Processed {} images.", summary.attempted);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct FaceCropBatch {
    detector: Box<dyn FaceDetector>,
    heif: Option<Box<dyn HeifDecoder>>,
}

impl FaceCropBatch {
    /// Create a batch pipeline around the given face detector.
    ///
    /// When built with the `heif` feature, HEIC inputs are decoded through
    /// libheif unless [`Self::heif_decoder`] injects a replacement; without
    /// the feature and without an injected decoder, HEIC files are skipped
    /// with a conversion error.
    pub fn new(detector: Box<dyn FaceDetector>) -> Self {
        Self {
            detector,
            heif: default_heif_decoder(),
        }
    }

    /// Provide a custom HEIC decoding backend.
    pub fn heif_decoder(mut self, decoder: Box<dyn HeifDecoder>) -> Self {
        self.heif = Some(decoder);
        self
    }

    /// Run the batch over every entry directly under `input_dir` whose
    /// extension is supported, writing crops to `output_dir` (created if
    /// absent).
    ///
    /// The only fatal errors are an unreadable input directory and failure to
    /// set up the output or scratch directories; everything per-file becomes
    /// a logged [`FileOutcome::Skipped`].
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchSummary, BatchError> {
        fs::create_dir_all(output_dir).map_err(|source| BatchError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        // One scratch directory per run holds the canonical re-encodes; it is
        // removed when the run ends.
        let scratch = TempDir::new().map_err(BatchError::Scratch)?;

        let entries = fs::read_dir(input_dir).map_err(|source| BatchError::InputDir {
            path: input_dir.to_path_buf(),
            source,
        })?;

        let mut summary = BatchSummary {
            attempted: 0,
            outcomes: Vec::new(),
        };

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!("skipping unreadable directory entry: {e}");
                    continue;
                }
            };
            if !is_supported(&path) {
                continue;
            }

            let token = summary.attempted as u64;
            summary.attempted += 1;

            let outcome = match self.process_file(&path, output_dir, scratch.path(), token) {
                Ok(faces) => FileOutcome::Done { faces },
                Err(e) => FileOutcome::Skipped(e),
            };

            match &outcome {
                FileOutcome::Done { faces } => {
                    debug!("{}: wrote {faces} face crop(s)", path.display());
                }
                FileOutcome::Skipped(PipelineError::NoFace) => {
                    info!("{}: no face detected", path.display());
                }
                FileOutcome::Skipped(e) => {
                    warn!("skipping {}: {e}", path.display());
                }
            }
            summary.outcomes.push((path, outcome));
        }

        info!(
            "batch finished: {} attempted, {} completed",
            summary.attempted,
            summary.completed()
        );
        Ok(summary)
    }

    /// Per-file pipeline: size check → normalize → re-encode → decode →
    /// detect → crop and write each region.
    fn process_file(
        &self,
        path: &Path,
        output_dir: &Path,
        scratch: &Path,
        token: u64,
    ) -> Result<usize, PipelineError> {
        let metadata = fs::metadata(path).map_err(|e| PipelineError::Other(e.to_string()))?;
        if metadata.len() == 0 {
            return Err(PipelineError::EmptyFile);
        }

        // Temp dir for a converted HEIC lives exactly as long as this value.
        let normalized: NormalizedInput = normalize::normalize(path, self.heif.as_deref())?;
        let canonical = normalize::reencode_canonical(normalized.path(), scratch, token)?;

        let image = image::open(&canonical).map_err(|e| PipelineError::Decode(e.to_string()))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(PipelineError::Decode("image has zero dimensions".to_string()));
        }

        let gray = image.to_luma8();
        let regions = self
            .detector
            .detect(gray.as_raw(), gray.width(), gray.height());
        if regions.is_empty() {
            return Err(PipelineError::NoFace);
        }

        let stem = normalize::file_stem(path);
        for (index, region) in regions.iter().enumerate() {
            let crop = crop_face(&image, *region);
            let out_path = output_dir.join(format!("{stem}_{index}.jpg"));
            crop.save(&out_path)
                .map_err(|e| PipelineError::Write(e.to_string()))?;
        }

        Ok(regions.len())
    }
}

fn default_heif_decoder() -> Option<Box<dyn HeifDecoder>> {
    #[cfg(feature = "heif")]
    {
        Some(Box::new(crate::libheif_backend::LibheifDecoder::new()))
    }
    #[cfg(not(feature = "heif"))]
    {
        None
    }
}

// Extension is the only candidacy test: a directory named `x.jpg` still
// counts as attempted and fails down the pipeline like any unreadable file.
fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn extension_filter_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        for name in ["a.jpg", "b.JPEG", "c.Png", "d.BMP", "e.heic"] {
            let path = dir.path().join(name);
            File::create(&path).unwrap();
            assert!(is_supported(&path), "{name}");
        }
        for name in ["notes.txt", "archive.zip", "noext", "f.jpg.bak"] {
            let path = dir.path().join(name);
            File::create(&path).unwrap();
            assert!(!is_supported(&path), "{name}");
        }
    }

    #[test]
    fn candidacy_is_decided_by_extension_alone() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("folder.jpg");
        fs::create_dir(&sub).unwrap();
        assert!(is_supported(&sub));

        let plain = dir.path().join("folder");
        fs::create_dir(&plain).unwrap();
        assert!(!is_supported(&plain));
    }
}
