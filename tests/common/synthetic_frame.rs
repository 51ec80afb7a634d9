use image::{Rgb, RgbImage};
use ipm_picker::camera::CameraParams;
use ipm_picker::session::InputEvent;
use nalgebra::Matrix3;

/// Generates a simple two-axis gradient frame.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    assert!(width > 0 && height > 0, "frame dimensions must be positive");
    let mut img = RgbImage::new(width, height);
    for (x, y, px) in img.enumerate_pixels_mut() {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        *px = Rgb([r, g, 128]);
    }
    img
}

/// Camera model with unit focal terms and zero distortion: undistortion is
/// the identity mapping, so frame pixels pass through unchanged.
pub fn null_camera(width: u32, height: u32) -> CameraParams {
    let k = Matrix3::new(
        1.0,
        0.0,
        width as f64 / 2.0,
        0.0,
        1.0,
        height as f64 / 2.0,
        0.0,
        0.0,
        1.0,
    );
    CameraParams::from_parts(k, [0.0; 5], k).unwrap()
}

/// Click events at the given display coordinates, in order.
pub fn clicks(points: &[(f64, f64)]) -> Vec<InputEvent> {
    points
        .iter()
        .map(|&(x, y)| InputEvent::Click { x, y })
        .collect()
}
