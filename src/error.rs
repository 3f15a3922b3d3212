use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a single file did not make it through the pipeline.
///
/// Every variant is caught at the file boundary and turned into a skip — none
/// of these abort the batch. `NoFace` is informational rather than a fault.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("file is empty")]
    EmptyFile,

    #[error("format conversion failed: {0}")]
    Conversion(String),

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("no face detected")]
    NoFace,

    #[error("failed to write face crop: {0}")]
    Write(String),

    #[error("processing failed: {0}")]
    Other(String),
}

/// Fatal batch-level failures. Unlike [`PipelineError`], these occur before or
/// outside the per-file loop and terminate the run.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to read input directory {path}: {source}")]
    InputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create scratch directory: {0}")]
    Scratch(#[source] io::Error),
}
