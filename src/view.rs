// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the View struct, which describes a relationship between
//! a rectangle on the integral plane with an origin at 0,0 in the
//! upper-left corner, and a rectangle on the complex plane described
//! by its center and its height.  The width of the complex rectangle
//! follows from the aspect ratio of the integral one.
//!
//! Image rows grow downward; the imaginary axis grows upward.  Each
//! pixel is a cell on the complex plane, and the sample for a pixel
//! is the center of its cell, not its corner.

use itertools::iproduct;
use num::Complex;
use std::iter::Zip;
use std::ops::Range;

use crate::errors::RenderError;

/// Describes the x, y of a pixel in the image, with the origin in
/// the upper-left corner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pixel(pub usize, pub usize);

/// Offsets, relative to the center of the view, of the four edges of
/// the imaged region, plus the offset from a cell's upper-left corner
/// to its center.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Offsets {
    /// Center to the top edge.
    pub top: Complex<f64>,
    /// Center to the right edge.
    pub right: Complex<f64>,
    /// Center to the bottom edge.
    pub bottom: Complex<f64>,
    /// Center to the left edge.
    pub left: Complex<f64>,
    /// Upper-left corner of a pixel cell to its center.
    pub sample: Complex<f64>,
}

/// The mapping between a pixel grid and a rectangle of the complex
/// plane.  Built once per render and shared read-only by every worker.
#[derive(Clone, Debug, PartialEq)]
pub struct View {
    width: usize,
    height: usize,
    region_width: f64,
    region_height: f64,
    aspect: f64,
    center: Complex<f64>,
    offsets: Offsets,
    // Distance on the complex plane from one pixel to the next, along
    // x (real) and y (negative imaginary).
    separation: (f64, f64),
}

impl View {
    /// Takes the resolution of the image, the height of the region of
    /// the complex plane to be imaged, and the point on the complex
    /// plane at the center of the image.  Fails if the grid has a
    /// zero-length side or the region has no height.
    pub fn new(
        width: usize,
        height: usize,
        region_height: f64,
        center: Complex<f64>,
    ) -> Result<View, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidResolution(width, height));
        }

        if !(region_height > 0.0 && region_height.is_finite()) {
            return Err(RenderError::InvalidRegion(region_height));
        }

        let aspect = (width as f64) / (height as f64);
        let region_width = aspect * region_height;
        let separation = (
            region_width / (width as f64),
            region_height / (height as f64),
        );

        Ok(View {
            width,
            height,
            region_width,
            region_height,
            aspect,
            center,
            offsets: Offsets {
                top: Complex::new(0.0, region_height / 2.0),
                right: Complex::new(region_width / 2.0, 0.0),
                bottom: Complex::new(0.0, -region_height / 2.0),
                left: Complex::new(-region_width / 2.0, 0.0),
                sample: Complex::new(separation.0 / 2.0, -separation.1 / 2.0),
            },
            separation,
        })
    }

    /// Pixels per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows of pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The total number of pixels in the grid.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// A view always has at least one pixel.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width over height, in pixel space.
    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// Width of the imaged region on the complex plane.
    pub fn region_width(&self) -> f64 {
        self.region_width
    }

    /// Height of the imaged region on the complex plane.
    pub fn region_height(&self) -> f64 {
        self.region_height
    }

    /// The point at the center of the image.
    pub fn center(&self) -> Complex<f64> {
        self.center
    }

    /// Edge and half-sample offsets relative to the center.
    pub fn offsets(&self) -> &Offsets {
        &self.offsets
    }

    /// The upper-left and lower-right corners of the imaged region.
    pub fn bounds(&self) -> (Complex<f64>, Complex<f64>) {
        (
            self.center + self.offsets.top + self.offsets.left,
            self.center + self.offsets.bottom + self.offsets.right,
        )
    }

    /// Given a pixel on the integral plane, return the complex number
    /// at the center of that pixel's cell.
    pub fn sample_at(&self, x: usize, y: usize) -> Complex<f64> {
        let (upper_left, _) = self.bounds();
        upper_left
            + Complex::new(
                (x as f64) * self.separation.0,
                -(y as f64) * self.separation.1,
            )
            + self.offsets.sample
    }

    /// The rows `[start, stop)` of the image, with `stop` clamped to
    /// the height of the image.
    pub fn rows(&self, start: usize, stop: usize) -> RowRange {
        let stop = stop.min(self.height);
        RowRange {
            view: self,
            start: start.min(stop),
            stop,
        }
    }
}

type Grid = itertools::Product<Range<usize>, Range<usize>>;

/// A horizontal slice of a view.  Restartable: every call to
/// `samples`, `pixels`, or `into_iter` begins again at the first row,
/// and every sequence walks the slice in row-major order, x fastest,
/// so the samples and pixels produced from the same range pair up by
/// position.
#[derive(Copy, Clone, Debug)]
pub struct RowRange<'a> {
    view: &'a View,
    start: usize,
    stop: usize,
}

impl<'a> RowRange<'a> {
    fn grid(&self) -> Grid {
        iproduct!(self.start..self.stop, 0..self.view.width)
    }

    /// The first row in the range.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last row in the range.
    pub fn stop(&self) -> usize {
        self.stop
    }

    /// The number of pixels in the range.
    pub fn len(&self) -> usize {
        (self.stop - self.start) * self.view.width
    }

    /// True when the range covers no rows.
    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    /// A single pass over the complex samples of the range.
    pub fn samples(&self) -> Samples<'a> {
        Samples {
            view: self.view,
            grid: self.grid(),
        }
    }

    /// A single pass over the pixel coordinates of the range.
    pub fn pixels(&self) -> Pixels {
        Pixels { grid: self.grid() }
    }

    /// A matched pair of single-pass sequences over the range.
    pub fn sample_points(&self) -> (Samples<'a>, Pixels) {
        (self.samples(), self.pixels())
    }
}

impl<'a> IntoIterator for RowRange<'a> {
    type Item = (Complex<f64>, Pixel);
    type IntoIter = Zip<Samples<'a>, Pixels>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples().zip(self.pixels())
    }
}

/// Complex samples of a row range, in row-major order.  Single pass:
/// a consumed sequence cannot be copied or rewound; ask the range for
/// a fresh one instead.
///
/// ```compile_fail
/// let view = mandelbrot::View::new(2, 2, 1.0, num::Complex::new(0.0, 0.0)).unwrap();
/// let samples = view.rows(0, 2).samples();
/// let _again = samples.clone();
/// ```
pub struct Samples<'a> {
    view: &'a View,
    grid: Grid,
}

impl<'a> Iterator for Samples<'a> {
    type Item = Complex<f64>;

    fn next(&mut self) -> Option<Complex<f64>> {
        let view = self.view;
        self.grid.next().map(|(y, x)| view.sample_at(x, y))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.grid.size_hint()
    }
}

/// Pixel coordinates of a row range, in row-major order.  Single pass,
/// like `Samples`.
///
/// ```compile_fail
/// let view = mandelbrot::View::new(2, 2, 1.0, num::Complex::new(0.0, 0.0)).unwrap();
/// let pixels = view.rows(0, 2).pixels();
/// let _again = pixels.clone();
/// ```
pub struct Pixels {
    grid: Grid,
}

impl Iterator for Pixels {
    type Item = Pixel;

    fn next(&mut self) -> Option<Pixel> {
        self.grid.next().map(|(y, x)| Pixel(x, y))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.grid.size_hint()
    }
}
