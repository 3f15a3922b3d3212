//! Batch face extraction: walk a directory of photos, find the faces, and
//! write each one out as a 512×512 JPEG crop.
//!
//! Inputs may be JPEG, PNG, BMP, or HEIC; HEIC files are normalized through a
//! pluggable decoder first. One corrupt or faceless file never aborts the
//! batch — it is skipped with a logged reason and the run continues.
//!
//! # Example
//!
//! ```no_run
//! use facecrop::{FaceCropBatch, RustfaceDetector, DEFAULT_MODEL_PATH};
//! use std::path::Path;
//!
//! let detector = RustfaceDetector::from_file(Path::new(DEFAULT_MODEL_PATH))?;
//! let summary = FaceCropBatch::new(Box::new(detector))
//!     .run(Path::new("input"), Path::new("output"))?;
//! println!("Processed {} images.", summary.attempted);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![warn(missing_docs)]

mod batch;
mod crop;
mod error;
/// Face detection trait and region type.
pub mod face_detector;
/// HEIC decoding trait and raw decoded-frame type.
pub mod heif;
#[cfg(feature = "heif")]
/// Built-in HEIC decoder backend over the native libheif library.
pub mod libheif_backend;
mod normalize;
#[cfg(feature = "rustface")]
/// Built-in SeetaFace-based face detector backend.
pub mod rustface_backend;

pub use batch::{BatchSummary, FaceCropBatch, FileOutcome, SUPPORTED_EXTENSIONS};
pub use crop::{crop_face, CROP_SIZE};
pub use error::{BatchError, PipelineError};
pub use face_detector::{FaceDetector, FaceRegion};
pub use heif::{HeifDecoder, HeifImage, PixelMode};
#[cfg(feature = "heif")]
pub use libheif_backend::LibheifDecoder;
#[cfg(feature = "rustface")]
pub use rustface_backend::{ModelLoadError, RustfaceDetector, DEFAULT_MODEL_PATH};
