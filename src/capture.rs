//! One-shot frame acquisition.
//!
//! The connection/buffering mechanics of a live stream are an external
//! concern; the core only needs one fresh frame. [`CalibrationFrame`] drains
//! a few buffered frames so the one it keeps is not stale, corrects it, and
//! derives the display preview — all exactly once per run, before any
//! interactive state exists.

use crate::camera::{undistort_image, CameraParams};
use crate::display::{scale_down, DisplayScale};
use crate::error::CollectError;
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Buffered frames discarded before the frame actually used.
pub const WARMUP_GRABS: usize = 5;

/// Source of raw frames at the camera's native resolution.
pub trait FrameSource {
    /// Grab and discard one buffered frame. Default: no buffering, no-op.
    fn grab(&mut self) {}

    /// Produce the latest raw frame, or a reason why none is available.
    fn capture_latest_frame(&mut self) -> Result<RgbImage, String>;
}

/// Still-image frame source for demos and tests: every capture returns the
/// same frame, loaded from disk on first use.
pub struct ImageFileSource {
    path: PathBuf,
    frame: Option<RgbImage>,
}

impl ImageFileSource {
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            frame: None,
        }
    }

    /// Wrap an in-memory frame (tests).
    pub fn from_frame(frame: RgbImage) -> Self {
        Self {
            path: PathBuf::new(),
            frame: Some(frame),
        }
    }
}

impl FrameSource for ImageFileSource {
    fn capture_latest_frame(&mut self) -> Result<RgbImage, String> {
        match &self.frame {
            Some(frame) => Ok(frame.clone()),
            None => {
                let img = image::open(&self.path)
                    .map_err(|e| format!("failed to open {}: {e}", self.path.display()))?
                    .into_rgb8();
                self.frame = Some(img.clone());
                Ok(img)
            }
        }
    }
}

/// The corrected full-resolution frame and its derived display preview.
/// Created once per run; immutable thereafter.
pub struct CalibrationFrame {
    /// Full-resolution undistorted image (source space).
    pub full: RgbImage,
    /// Aspect-preserving downscale of `full` for on-screen picking.
    pub display: RgbImage,
    /// Factor mapping between the two spaces.
    pub scale: DisplayScale,
}

impl CalibrationFrame {
    /// Drain stale buffered frames, capture one raw frame, undistort it, and
    /// derive the display image.
    pub fn acquire(
        source: &mut dyn FrameSource,
        params: &CameraParams,
        display_width: u32,
    ) -> Result<Self, CollectError> {
        for _ in 0..WARMUP_GRABS {
            source.grab();
        }
        let raw = source
            .capture_latest_frame()
            .map_err(CollectError::CaptureFailed)?;
        let full = undistort_image(&raw, params);
        Ok(Self::from_corrected(full, display_width))
    }

    /// Build from an already-corrected frame (tests, pre-recorded input).
    pub fn from_corrected(full: RgbImage, display_width: u32) -> Self {
        let (display, scale) = scale_down(&full, display_width);
        Self {
            full,
            display,
            scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use nalgebra::Matrix3;

    struct CountingSource {
        grabs: usize,
        frame: RgbImage,
    }

    impl FrameSource for CountingSource {
        fn grab(&mut self) {
            self.grabs += 1;
        }

        fn capture_latest_frame(&mut self) -> Result<RgbImage, String> {
            Ok(self.frame.clone())
        }
    }

    struct DeadSource;

    impl FrameSource for DeadSource {
        fn capture_latest_frame(&mut self) -> Result<RgbImage, String> {
            Err("stream is down".into())
        }
    }

    fn null_params(w: f64, h: f64) -> CameraParams {
        let k = Matrix3::new(1.0, 0.0, w / 2.0, 0.0, 1.0, h / 2.0, 0.0, 0.0, 1.0);
        CameraParams::from_parts(k, [0.0; 5], k).unwrap()
    }

    #[test]
    fn acquire_drains_warmup_frames_first() {
        let mut frame = RgbImage::new(64, 32);
        frame.put_pixel(10, 10, Rgb([200, 100, 50]));
        let mut source = CountingSource { grabs: 0, frame };
        let params = null_params(64.0, 32.0);
        let cal = CalibrationFrame::acquire(&mut source, &params, 32).unwrap();
        assert_eq!(source.grabs, WARMUP_GRABS);
        assert_eq!(cal.full.dimensions(), (64, 32));
        assert_eq!(cal.display.dimensions(), (32, 16));
        assert!((cal.scale.factor() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn acquire_reports_capture_failure() {
        let params = null_params(64.0, 32.0);
        let err = CalibrationFrame::acquire(&mut DeadSource, &params, 32);
        assert!(matches!(err, Err(CollectError::CaptureFailed(_))));
    }

    #[test]
    fn missing_image_file_fails_at_capture() {
        let mut source = ImageFileSource::open(Path::new("/nonexistent/frame.png"));
        assert!(source.capture_latest_frame().is_err());
    }
}
