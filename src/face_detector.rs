/// Rectangular face region in source-image pixel coordinates.
///
/// Regions returned by a [`FaceDetector`] are guaranteed to lie fully inside
/// the image they were detected in, with `width > 0` and `height > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRegion {
    /// X coordinate of the top-left corner (pixels).
    pub x: u32,
    /// Y coordinate of the top-left corner (pixels).
    pub y: u32,
    /// Width of the region (pixels).
    pub width: u32,
    /// Height of the region (pixels).
    pub height: u32,
}

/// Pluggable face detection backend.
///
/// Implement this trait to provide a custom face detector (ONNX, dlib, etc.)
/// and pass it to [`crate::FaceCropBatch::new`]. The order of the
/// returned regions determines output crop indices, so it must be stable
/// within a run for identical pixel data.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height` bytes.
    ///
    /// An empty result means "no face" and is not an error.
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceRegion>;
}
