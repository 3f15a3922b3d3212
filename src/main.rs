use std::path::Path;

use anyhow::Context;
use env_logger::{Builder, Env};

use facecrop::{FaceCropBatch, RustfaceDetector, DEFAULT_MODEL_PATH};

const INPUT_DIR: &str = "input";
const OUTPUT_DIR: &str = "output";

fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    // Load the cascade model once, before touching any file; a missing model
    // is fatal at startup rather than a per-file error.
    let detector = RustfaceDetector::from_file(Path::new(DEFAULT_MODEL_PATH))
        .context("face detection model is required at startup")?;

    let summary = FaceCropBatch::new(Box::new(detector))
        .run(Path::new(INPUT_DIR), Path::new(OUTPUT_DIR))?;

    println!("Processed {} images.", summary.attempted);
    Ok(())
}
