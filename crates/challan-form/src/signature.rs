// SPDX-FileCopyrightText: 2026 Challan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Freehand signature capture.
//!
//! Records pointer/touch strokes and flattens them into a PNG raster on
//! demand. Only the rendered bitmap ever leaves this type; the stroke
//! log is discarded on `clear` and is never persisted.

use std::io::Cursor;

use image::{ImageOutputFormat, Rgba, RgbaImage};

use challan_core::types::SignatureImage;

use crate::FormError;

/// Ink half-thickness in pixels.
const PEN_RADIUS: i64 = 1;

/// A single polyline stroke in pad coordinates.
pub type Stroke = Vec<(f32, f32)>;

/// In-memory signature pad.
#[derive(Debug, Clone)]
pub struct SignaturePad {
    width: u32,
    height: u32,
    strokes: Vec<Stroke>,
}

impl SignaturePad {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            strokes: Vec::new(),
        }
    }

    /// Record one completed stroke. Single-point strokes (a tap) are kept
    /// and render as a dot; empty strokes are ignored.
    pub fn append_stroke(&mut self, stroke: Stroke) {
        if !stroke.is_empty() {
            self.strokes.push(stroke);
        }
    }

    /// Discard all strokes, returning the pad to its blank state.
    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Flatten the strokes into a PNG snapshot.
    ///
    /// Returns `None` for a blank pad: a submission without ink carries
    /// no signature rather than an empty white image.
    pub fn to_image(&self) -> Result<Option<SignatureImage>, FormError> {
        if self.is_blank() {
            return Ok(None);
        }

        let mut canvas = RgbaImage::from_pixel(self.width, self.height, Rgba([255, 255, 255, 255]));
        for stroke in &self.strokes {
            self.draw_stroke(&mut canvas, stroke);
        }

        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
            .map_err(|e| FormError::Signature(format!("PNG encode failed: {e}")))?;

        Ok(Some(SignatureImage {
            width: self.width,
            height: self.height,
            png,
        }))
    }

    fn draw_stroke(&self, canvas: &mut RgbaImage, stroke: &Stroke) {
        if stroke.len() == 1 {
            self.plot(canvas, stroke[0].0, stroke[0].1);
            return;
        }
        for pair in stroke.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            // Interpolate one plot per pixel of segment length.
            let steps = ((x1 - x0).abs().max((y1 - y0).abs()).ceil() as u32).max(1);
            for step in 0..=steps {
                let t = step as f32 / steps as f32;
                self.plot(canvas, x0 + (x1 - x0) * t, y0 + (y1 - y0) * t);
            }
        }
    }

    fn plot(&self, canvas: &mut RgbaImage, x: f32, y: f32) {
        let cx = x.round() as i64;
        let cy = y.round() as i64;
        for dx in -PEN_RADIUS..=PEN_RADIUS {
            for dy in -PEN_RADIUS..=PEN_RADIUS {
                let (px, py) = (cx + dx, cy + dy);
                if px >= 0 && py >= 0 && (px as u32) < self.width && (py as u32) < self.height {
                    canvas.put_pixel(px as u32, py as u32, Rgba([0, 0, 0, 255]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_pad_produces_no_image() {
        let pad = SignaturePad::new(200, 80);
        assert!(pad.is_blank());
        assert!(pad.to_image().unwrap().is_none());
    }

    #[test]
    fn strokes_flatten_to_png() {
        let mut pad = SignaturePad::new(200, 80);
        pad.append_stroke(vec![(10.0, 10.0), (60.0, 40.0), (120.0, 20.0)]);
        pad.append_stroke(vec![(10.0, 60.0), (120.0, 60.0)]);

        let image = pad.to_image().unwrap().expect("ink should produce image");
        assert_eq!(image.width, 200);
        assert_eq!(image.height, 80);
        // PNG magic bytes.
        assert_eq!(&image.png[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn clear_returns_pad_to_blank() {
        let mut pad = SignaturePad::new(100, 40);
        pad.append_stroke(vec![(5.0, 5.0), (20.0, 20.0)]);
        assert!(!pad.is_blank());

        pad.clear();
        assert!(pad.is_blank());
        assert!(pad.to_image().unwrap().is_none());
    }

    #[test]
    fn empty_stroke_is_ignored() {
        let mut pad = SignaturePad::new(100, 40);
        pad.append_stroke(vec![]);
        assert!(pad.is_blank());
    }

    #[test]
    fn out_of_bounds_points_are_clipped_not_panicking() {
        let mut pad = SignaturePad::new(50, 50);
        pad.append_stroke(vec![(-10.0, -10.0), (200.0, 200.0)]);
        let image = pad.to_image().unwrap();
        assert!(image.is_some());
    }
}
