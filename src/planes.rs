// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport struct, which describes a relationship between
//! a rectangle on the integral plane with an origin at 0,0 in the top
//! left corner, and a rectangle on the complex plane described by its
//! centre and a zoom level.  Image rows run downwards while the
//! imaginary axis runs upwards, so row 0 has the greatest imaginary
//! part.
use num::Complex;

use complex::ComplexValue;
use errors::FractalError;

/// The height of the complex plane visible at zoom level 1.
pub const REFERENCE_HEIGHT: f64 = 4.0;

/// Describes the column, row of a pixel in the image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pixel(pub usize, pub usize);

/// Maps pixels to points and points to pixels.  The pixel step `dz` is
/// the distance on the complex plane between the centres of two adjacent
/// pixels, and `origin` is the point under the top-left pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    center: ComplexValue,
    zoom: f64,
    width: usize,
    height: usize,
    origin: ComplexValue,
    dz: f64,
}

impl Viewport {
    /// Constructor.  Takes the centre of the image on the complex plane,
    /// the zoom level, and the size of the image in pixels.
    pub fn new(
        center: ComplexValue,
        zoom: f64,
        width: usize,
        height: usize,
    ) -> Result<Viewport, FractalError> {
        if width < 1 {
            return Err(FractalError::Viewport(
                "the image must be at least one pixel wide".to_string(),
            ));
        }

        if height < 2 {
            return Err(FractalError::Viewport(
                "the image must be at least two pixels high".to_string(),
            ));
        }

        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(FractalError::Viewport(format!(
                "zoom level {} is not a positive number",
                zoom
            )));
        }

        if !(center.re.is_finite() && center.im.is_finite()) {
            return Err(FractalError::Viewport(format!(
                "centre {} is not a finite point",
                center
            )));
        }

        let dz = REFERENCE_HEIGHT / (((height - 1) as f64) * zoom);
        let origin = Complex::new(
            center.re - dz * (0.5 * (width as f64) - 0.5),
            center.im + dz * (0.5 * (height as f64) - 0.5),
        );

        Ok(Viewport {
            center,
            zoom,
            width,
            height,
            origin,
            dz,
        })
    }

    /// The total number of pixels.  Used to size every buffer.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The point under the middle of the image.
    pub fn center(&self) -> ComplexValue {
        self.center
    }

    /// The zoom level this plane was built with.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// The point under the centre of pixel (0, 0).
    pub fn origin(&self) -> ComplexValue {
        self.origin
    }

    /// The distance between two adjacent pixel centres.
    pub fn dz(&self) -> f64 {
        self.dz
    }

    /// Given the column and row of a pixel, return the point under its
    /// centre.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> ComplexValue {
        Complex::new(
            self.origin.re + (pixel.0 as f64) * self.dz,
            self.origin.im - (pixel.1 as f64) * self.dz,
        )
    }

    /// Rounds a point to the nearest column and row, which may lie
    /// outside the image.  Halves round up.  A point with a non-finite
    /// part has no place on the grid.
    pub fn point_to_grid(&self, point: &ComplexValue) -> Option<(i64, i64)> {
        let left = (point.re - self.origin.re) / self.dz;
        let top = (self.origin.im - point.im) / self.dz;
        if !(left.is_finite() && top.is_finite()) {
            return None;
        }
        Some(((left + 0.5).floor() as i64, (top + 0.5).floor() as i64))
    }

    /// Given a point, map it as closely as possible to a pixel, or
    /// nothing if it lies off the image.
    pub fn point_to_pixel(&self, point: &ComplexValue) -> Option<Pixel> {
        let (left, top) = self.point_to_grid(point)?;
        if left < 0 || top < 0 || left >= self.width as i64 || top >= self.height as i64 {
            return None;
        }
        Some(Pixel(left as usize, top as usize))
    }

    /// Whether a point falls on the image, allowing half a pixel step
    /// beyond the outermost pixel centres.
    pub fn contains(&self, point: &ComplexValue) -> bool {
        let left = point.re - self.origin.re;
        let top = self.origin.im - point.im;
        let half = 0.5 * self.dz;
        left >= -half
            && left <= (self.width as f64 - 0.5) * self.dz
            && top >= -half
            && top <= (self.height as f64 - 0.5) * self.dz
    }

    /// Index into a row-major buffer for the pixel under `point`, used
    /// when an orbit sample needs a visit counter.  `contains` admits
    /// points on its far edge that round one past the last column or
    /// row; those get `None` here too.
    pub fn point_to_offset(&self, point: &ComplexValue) -> Option<usize> {
        if !self.contains(point) {
            return None;
        }
        self.point_to_pixel(point)
            .map(|p| p.1 * self.width + p.0)
    }

    /// The same plane moved by a whole number of pixels.  Positive `dx`
    /// moves the picture right, so the centre moves left; positive `dy`
    /// moves the picture down, so the centre moves up.
    pub fn translated(&self, dx: i64, dy: i64) -> Viewport {
        let shift = Complex::new(-(dx as f64) * self.dz, (dy as f64) * self.dz);
        Viewport {
            center: self.center + shift,
            origin: self.origin + shift,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Viewport {
        Viewport::new(Complex::new(0.0, 0.0), 1.0, 5, 5).unwrap()
    }

    #[test]
    fn viewport_fails_on_bad_shape() {
        let center = Complex::new(0.0, 0.0);
        assert!(Viewport::new(center, 1.0, 0, 4).is_err());
        assert!(Viewport::new(center, 1.0, 4, 1).is_err());
        assert!(Viewport::new(center, 0.0, 4, 4).is_err());
        assert!(Viewport::new(center, -2.0, 4, 4).is_err());
        assert!(Viewport::new(Complex::new(std::f64::NAN, 0.0), 1.0, 4, 4).is_err());
    }

    #[test]
    fn viewport_passes_on_good_shape() {
        assert!(Viewport::new(Complex::new(-0.5, 0.25), 3.0, 640, 480).is_ok());
    }

    #[test]
    fn pixel_step_spans_the_reference_height() {
        let vp = unit();
        assert_eq!(vp.dz(), 1.0);
        assert_eq!(vp.origin(), Complex::new(-2.0, 2.0));
    }

    #[test]
    fn doubling_zoom_halves_the_step() {
        let center = Complex::new(0.3, -0.1);
        for &zoom in &[0.5, 1.0, 7.0, 1.0e6] {
            let a = Viewport::new(center, zoom, 80, 60).unwrap();
            let b = Viewport::new(center, 2.0 * zoom, 80, 60).unwrap();
            assert!((a.dz() / 2.0 - b.dz()).abs() <= 1e-15 * a.dz());
        }
    }

    #[test]
    fn row_zero_is_the_top_of_the_plane() {
        let vp = unit();
        assert_eq!(vp.pixel_to_point(&Pixel(0, 0)), Complex::new(-2.0, 2.0));
        assert_eq!(vp.pixel_to_point(&Pixel(2, 2)), Complex::new(0.0, 0.0));
        assert_eq!(vp.pixel_to_point(&Pixel(4, 4)), Complex::new(2.0, -2.0));
    }

    #[test]
    fn pixel_to_point_and_back() {
        let vp = Viewport::new(Complex::new(-0.743, 0.131), 250.0, 97, 61).unwrap();
        for row in 0..vp.height() {
            for column in 0..vp.width() {
                let p = Pixel(column, row);
                assert_eq!(vp.point_to_pixel(&vp.pixel_to_point(&p)), Some(p));
            }
        }
    }

    #[test]
    fn point_to_pixel_rounds_to_nearest() {
        let vp = unit();
        assert_eq!(vp.point_to_pixel(&Complex::new(0.4, -0.4)), Some(Pixel(2, 2)));
        assert_eq!(vp.point_to_pixel(&Complex::new(0.6, 0.6)), Some(Pixel(3, 1)));
        assert_eq!(vp.point_to_pixel(&Complex::new(5.0, 0.0)), None);
    }

    #[test]
    fn contains_allows_half_a_step() {
        let vp = unit();
        assert!(vp.contains(&Complex::new(-2.5, 2.5)));
        assert!(vp.contains(&Complex::new(2.4, -2.4)));
        assert!(!vp.contains(&Complex::new(-2.6, 0.0)));
        assert!(!vp.contains(&Complex::new(0.0, -2.6)));
    }

    #[test]
    fn offsets_off_the_far_edge_are_dropped() {
        let vp = unit();
        // Exactly half a step past the last column is "contained" but
        // rounds to column 5.
        let edge = Complex::new(2.5, 0.0);
        assert!(vp.contains(&edge));
        assert_eq!(vp.point_to_offset(&edge), None);
        assert_eq!(vp.point_to_offset(&Complex::new(0.0, 0.0)), Some(12));
    }

    #[test]
    fn points_that_are_not_numbers_are_off_the_image() {
        let vp = unit();
        for point in &[
            Complex::new(std::f64::NAN, 0.0),
            Complex::new(0.0, std::f64::NAN),
            Complex::new(std::f64::INFINITY, std::f64::NEG_INFINITY),
        ] {
            assert!(!vp.contains(point));
            assert_eq!(vp.point_to_grid(point), None);
            assert_eq!(vp.point_to_pixel(point), None);
            assert_eq!(vp.point_to_offset(point), None);
        }
    }

    #[test]
    fn translation_moves_the_centre_against_the_picture() {
        let vp = unit();
        let moved = vp.translated(1, 2);
        assert_eq!(moved.center(), Complex::new(-1.0, 2.0));
        assert_eq!(moved.pixel_to_point(&Pixel(3, 4)), vp.pixel_to_point(&Pixel(2, 2)));
    }
}
