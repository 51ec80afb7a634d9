//! Camera intrinsics, lens-distortion model, and frame undistortion.
//!
//! The model is the usual triple produced by an OpenCV-style intrinsic
//! calibration: the native intrinsic matrix, a five-coefficient
//! Brown-Conrady distortion vector `[k1, k2, p1, p2, k3]`, and the refined
//! ("optimal") intrinsic matrix that parameterizes the undistorted output
//! frame. The triple is loaded once at startup and validated there; the
//! corrector itself assumes a valid model.

use crate::error::CollectError;
use crate::types::Point2D;
use image::{Rgb, RgbImage};
use nalgebra::{Matrix3, Vector3};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Fixed-point iterations for point-level undistortion.
const UNDISTORT_ITERS: usize = 15;
/// Convergence threshold on the normalized-coordinate update.
const UNDISTORT_EPS: f64 = 1e-12;

/// On-disk parameter layout: three fixed-shape numeric tables.
#[derive(Debug, Deserialize)]
struct CameraParamsFile {
    camera_matrix: [[f64; 3]; 3],
    distortion: [f64; 5],
    new_camera_matrix: [[f64; 3]; 3],
}

/// Validated camera model. Immutable for the lifetime of a run.
#[derive(Clone, Debug)]
pub struct CameraParams {
    kmtx: Matrix3<f64>,
    dist: [f64; 5],
    new_kmtx: Matrix3<f64>,
    kmtx_inv: Matrix3<f64>,
    new_kmtx_inv: Matrix3<f64>,
}

impl CameraParams {
    /// Build and validate a model from its three components.
    ///
    /// Fails when any entry is non-finite, a focal term is (near) zero, or a
    /// matrix is not invertible. This is the fail-fast gate: correction is
    /// never attempted on an unvalidated model.
    pub fn from_parts(
        kmtx: Matrix3<f64>,
        dist: [f64; 5],
        new_kmtx: Matrix3<f64>,
    ) -> Result<Self, CollectError> {
        validate_matrix("camera_matrix", &kmtx)?;
        validate_matrix("new_camera_matrix", &new_kmtx)?;
        if dist.iter().any(|c| !c.is_finite()) {
            return Err(CollectError::ConfigInvalid(
                "distortion coefficients contain non-finite entries".into(),
            ));
        }
        let kmtx_inv = kmtx.try_inverse().ok_or_else(|| {
            CollectError::ConfigInvalid("camera_matrix is not invertible".into())
        })?;
        let new_kmtx_inv = new_kmtx.try_inverse().ok_or_else(|| {
            CollectError::ConfigInvalid("new_camera_matrix is not invertible".into())
        })?;
        Ok(Self {
            kmtx,
            dist,
            new_kmtx,
            kmtx_inv,
            new_kmtx_inv,
        })
    }

    /// Load and validate the parameter file (JSON, see [`CameraParamsFile`]
    /// shape). Any failure here is fatal before capture starts.
    pub fn load(path: &Path) -> Result<Self, CollectError> {
        let data = fs::read_to_string(path).map_err(|e| {
            CollectError::ConfigInvalid(format!("failed to read {}: {e}", path.display()))
        })?;
        let raw: CameraParamsFile = serde_json::from_str(&data).map_err(|e| {
            CollectError::ConfigInvalid(format!("failed to parse {}: {e}", path.display()))
        })?;
        Self::from_parts(
            matrix_from_rows(&raw.camera_matrix),
            raw.distortion,
            matrix_from_rows(&raw.new_camera_matrix),
        )
    }

    pub fn kmtx(&self) -> &Matrix3<f64> {
        &self.kmtx
    }

    pub fn new_kmtx(&self) -> &Matrix3<f64> {
        &self.new_kmtx
    }

    pub fn distortion(&self) -> &[f64; 5] {
        &self.dist
    }

    /// Map a point of the undistorted output frame to the raw frame.
    ///
    /// Back-projects through the refined matrix, applies forward
    /// Brown-Conrady distortion, and reprojects through the native matrix.
    /// This is the per-pixel mapping the corrector samples with.
    pub fn distort_point(&self, p: Point2D) -> Point2D {
        let n = self.new_kmtx_inv * Vector3::new(p.x, p.y, 1.0);
        let (xd, yd) = distort_normalized(&self.dist, n.x / n.z, n.y / n.z);
        let q = self.kmtx * Vector3::new(xd, yd, 1.0);
        Point2D::new(q.x / q.z, q.y / q.z)
    }

    /// Map a raw-frame point to the undistorted output frame.
    ///
    /// Inverts the distortion by fixed-point iteration on normalized
    /// coordinates; the tangential terms are folded into each update.
    pub fn undistort_point(&self, p: Point2D) -> Point2D {
        let n = self.kmtx_inv * Vector3::new(p.x, p.y, 1.0);
        let x0 = n.x / n.z;
        let y0 = n.y / n.z;
        let [k1, k2, p1, p2, k3] = self.dist;
        let mut x = x0;
        let mut y = y0;
        for _ in 0..UNDISTORT_ITERS {
            let r2 = x * x + y * y;
            let r4 = r2 * r2;
            let radial = 1.0 + k1 * r2 + k2 * r4 + k3 * r4 * r2;
            let x_tan = 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
            let y_tan = p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;
            let x_next = (x0 - x_tan) / radial;
            let y_next = (y0 - y_tan) / radial;
            let dx = x_next - x;
            let dy = y_next - y;
            x = x_next;
            y = y_next;
            if (dx * dx + dy * dy).sqrt() <= UNDISTORT_EPS {
                break;
            }
        }
        let q = self.new_kmtx * Vector3::new(x, y, 1.0);
        Point2D::new(q.x / q.z, q.y / q.z)
    }
}

/// Remove lens distortion from a raw frame.
///
/// Output dimensions equal the input's; the refined intrinsic matrix is the
/// output camera model. Each output pixel is bilinearly sampled at its
/// distorted source position; positions falling outside the raw frame come
/// out black.
pub fn undistort_image(raw: &RgbImage, params: &CameraParams) -> RgbImage {
    let (w, h) = raw.dimensions();
    let mut out = RgbImage::new(w, h);
    for v in 0..h {
        for u in 0..w {
            let src = params.distort_point(Point2D::new(u as f64, v as f64));
            let px = bilinear_sample(raw, src.x, src.y).unwrap_or(Rgb([0, 0, 0]));
            out.put_pixel(u, v, px);
        }
    }
    out
}

fn distort_normalized(dist: &[f64; 5], x: f64, y: f64) -> (f64, f64) {
    let [k1, k2, p1, p2, k3] = *dist;
    let r2 = x * x + y * y;
    let r4 = r2 * r2;
    let radial = 1.0 + k1 * r2 + k2 * r4 + k3 * r4 * r2;
    let x_tan = 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
    let y_tan = p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;
    (x * radial + x_tan, y * radial + y_tan)
}

fn bilinear_sample(img: &RgbImage, x: f64, y: f64) -> Option<Rgb<u8>> {
    if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
        return None;
    }
    let (w, h) = img.dimensions();
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    if x0 + 1 >= w || y0 + 1 >= h {
        // Clamp exact edge hits, reject everything further out.
        if x0 < w && y0 < h && x == x0 as f64 && y == y0 as f64 {
            return Some(*img.get_pixel(x0, y0));
        }
        return None;
    }
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;
    let p00 = img.get_pixel(x0, y0);
    let p10 = img.get_pixel(x0 + 1, y0);
    let p01 = img.get_pixel(x0, y0 + 1);
    let p11 = img.get_pixel(x0 + 1, y0 + 1);
    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bot = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        out[c] = (top * (1.0 - fy) + bot * fy).round().clamp(0.0, 255.0) as u8;
    }
    Some(Rgb(out))
}

fn matrix_from_rows(rows: &[[f64; 3]; 3]) -> Matrix3<f64> {
    Matrix3::new(
        rows[0][0], rows[0][1], rows[0][2],
        rows[1][0], rows[1][1], rows[1][2],
        rows[2][0], rows[2][1], rows[2][2],
    )
}

fn validate_matrix(name: &str, m: &Matrix3<f64>) -> Result<(), CollectError> {
    if m.iter().any(|v| !v.is_finite()) {
        return Err(CollectError::ConfigInvalid(format!(
            "{name} contains non-finite entries"
        )));
    }
    if m[(0, 0)].abs() < 1e-12 || m[(1, 1)].abs() < 1e-12 {
        return Err(CollectError::ConfigInvalid(format!(
            "{name} has a zero focal length"
        )));
    }
    Ok(())
}
