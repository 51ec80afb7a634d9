#![doc = include_str!("../README.md")]

pub mod annotate;
pub mod camera;
pub mod capture;
pub mod config;
pub mod display;
pub mod error;
pub mod intersect;
pub mod session;
pub mod types;

// --- High-level re-exports -------------------------------------------------

// Acquisition workflow: context, events, transition function.
pub use crate::session::{step, Effect, InputEvent, Mode, Phase, SessionContext};

// Frame pipeline: model loading, correction, scaling, capture.
pub use crate::camera::{undistort_image, CameraParams};
pub use crate::capture::{CalibrationFrame, FrameSource, ImageFileSource, WARMUP_GRABS};
pub use crate::display::{scale_down, DisplayScale};

// Result assembly.
pub use crate::annotate::{annotate_points, parse_points, serialize_points, write_artifacts};

pub use crate::error::CollectError;
pub use crate::types::{LineSegment, Point2D, PointSet, POINT_COUNT};

/// Small prelude for quick experiments.
pub mod prelude {
    pub use crate::annotate::{annotate_points, serialize_points};
    pub use crate::camera::CameraParams;
    pub use crate::capture::{CalibrationFrame, ImageFileSource};
    pub use crate::display::DisplayScale;
    pub use crate::session::{step, Effect, InputEvent, Mode, Phase, SessionContext};
    pub use crate::types::{Point2D, PointSet};
}
