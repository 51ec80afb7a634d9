//! Overlay drawing and serialization of the finished point set.
//!
//! Markers on the saved full-resolution image are sized by the inverse
//! display factor so they look the same whether the image is inspected at
//! display or source resolution. Labels are stamped from a small built-in
//! glyph set; no font asset is involved.

use crate::display::DisplayScale;
use crate::error::CollectError;
use crate::types::{Point2D, PointSet, POINT_COUNT};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use std::fs;
use std::path::Path;

/// Marker radius in display-pixel units.
const MARKER_RADIUS: f64 = 5.0;
const MARKER_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LABEL_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Placeholder line for an unfilled slot. By invariant none remains at
/// assembly time; the serializer still must not fault on one.
const EMPTY_SLOT_PLACEHOLDER: &str = "None";

/// Click feedback on the display preview: filled circle plus the click
/// ordinal within the current phase.
pub fn mark_click(display_img: &mut RgbImage, display: Point2D, ordinal: usize) {
    let cx = display.x.round() as i32;
    let cy = display.y.round() as i32;
    draw_filled_circle_mut(display_img, (cx, cy), MARKER_RADIUS as i32, MARKER_COLOR);
    draw_label(
        display_img,
        cx + MARKER_RADIUS as i32 + 2,
        cy - MARKER_RADIUS as i32 - GLYPH_ROWS as i32,
        &ordinal.to_string(),
        1,
        LABEL_COLOR,
    );
}

/// Annotate the finished point set on a copy of the full-resolution frame.
///
/// Each filled slot gets a filled circle and a `P<slot+1>` label at its
/// source-space position, sized by the inverse display factor. Unfilled
/// slots and out-of-frame centers are skipped.
pub fn annotate_points(
    corrected: &RgbImage,
    points: &PointSet,
    scale: &DisplayScale,
) -> RgbImage {
    let mut out = corrected.clone();
    let (w, h) = out.dimensions();
    let draw_scale = scale.draw_scale();
    let radius = (MARKER_RADIUS * draw_scale).round().max(1.0) as i32;
    let px = draw_scale.round().max(1.0) as i32;
    for (slot, point) in points.slots().iter().enumerate() {
        let Some(p) = point else { continue };
        let cx = p.x.round() as i64;
        let cy = p.y.round() as i64;
        if cx < 0 || cy < 0 || cx >= w as i64 || cy >= h as i64 {
            continue;
        }
        draw_filled_circle_mut(&mut out, (cx as i32, cy as i32), radius, MARKER_COLOR);
        draw_label(
            &mut out,
            cx as i32 + radius + px,
            cy as i32 - radius - GLYPH_ROWS as i32 * px,
            &format!("P{}", slot + 1),
            px,
            LABEL_COLOR,
        );
    }
    out
}

/// Serialize the point set to its textual form: one line per slot in slot
/// order, `"<x>,<y>"` at six decimals, placeholder for an unfilled slot.
pub fn serialize_points(points: &PointSet) -> String {
    let mut out = String::new();
    for point in points.slots() {
        match point {
            Some(p) => out.push_str(&format!("{:.6},{:.6}\n", p.x, p.y)),
            None => {
                out.push_str(EMPTY_SLOT_PLACEHOLDER);
                out.push('\n');
            }
        }
    }
    out
}

/// Parse the textual form back into a point set (downstream consumers and
/// round-trip checks).
pub fn parse_points(text: &str) -> Result<PointSet, String> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() != POINT_COUNT {
        return Err(format!(
            "expected {POINT_COUNT} lines, got {}",
            lines.len()
        ));
    }
    let mut points = PointSet::new();
    for (slot, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line == EMPTY_SLOT_PLACEHOLDER {
            continue;
        }
        let (x, y) = line
            .split_once(',')
            .ok_or_else(|| format!("line {}: missing separator in {line:?}", slot + 1))?;
        let x: f64 = x
            .trim()
            .parse()
            .map_err(|e| format!("line {}: bad x: {e}", slot + 1))?;
        let y: f64 = y
            .trim()
            .parse()
            .map_err(|e| format!("line {}: bad y: {e}", slot + 1))?;
        points.fill(slot, Point2D::new(x, y));
    }
    Ok(points)
}

/// Write the annotated image and the coordinate text file.
pub fn write_artifacts(
    annotated: &RgbImage,
    points: &PointSet,
    image_path: &Path,
    text_path: &Path,
) -> Result<(), CollectError> {
    ensure_parent_dir(image_path)?;
    ensure_parent_dir(text_path)?;
    annotated.save(image_path).map_err(|e| CollectError::WriteFailed {
        path: image_path.to_path_buf(),
        reason: e.to_string(),
    })?;
    fs::write(text_path, serialize_points(points)).map_err(|e| CollectError::WriteFailed {
        path: text_path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn ensure_parent_dir(path: &Path) -> Result<(), CollectError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| CollectError::WriteFailed {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
    }
    Ok(())
}

const GLYPH_COLS: usize = 5;
const GLYPH_ROWS: usize = 7;

/// 5x7 bitmaps, one row per byte, most significant of the low five bits on
/// the left. Only the characters the labels use.
fn glyph(c: char) -> Option<[u8; GLYPH_ROWS]> {
    match c {
        'P' => Some([0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
        '1' => Some([0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
        '2' => Some([0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
        '3' => Some([0b01110, 0b10001, 0b00001, 0b00110, 0b00001, 0b10001, 0b01110]),
        '4' => Some([0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
        _ => None,
    }
}

/// Stamp `text` with its top-left corner at (x, y), each glyph pixel drawn
/// as a `px`-sized block.
fn draw_label(img: &mut RgbImage, x: i32, y: i32, text: &str, px: i32, color: Rgb<u8>) {
    let (w, h) = img.dimensions();
    let mut pen_x = x;
    for c in text.chars() {
        let Some(rows) = glyph(c) else { continue };
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_COLS {
                if bits & (1 << (GLYPH_COLS - 1 - col)) == 0 {
                    continue;
                }
                for dy in 0..px {
                    for dx in 0..px {
                        let ix = pen_x + col as i32 * px + dx;
                        let iy = y + row as i32 * px + dy;
                        if ix >= 0 && iy >= 0 && (ix as u32) < w && (iy as u32) < h {
                            img.put_pixel(ix as u32, iy as u32, color);
                        }
                    }
                }
            }
        }
        pen_x += (GLYPH_COLS as i32 + 1) * px;
    }
}
