// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time renderer.
//!
//! A `FractalEngine` owns one iterator and the buffers for one image:
//! the per-pixel classification and iteration count, the packed colour
//! of every pixel, and a histogram of iteration counts across the whole
//! image.  Rendering is split by rows across the worker pool; colouring
//! always happens afterwards, on the calling thread.

use std::ops::Range;
use std::time::Instant;

use itertools::iproduct;
use num::Complex;

use colour::{ColorMapper, ColorMode, ColorStyle, HistogramEqualizer, Rgb};
use complex::ComplexValue;
use config::{newton_palette, FractalConfig};
use errors::FractalError;
use fractal::Fractal;
use iterators::{EscapeIterator, IterationResult, Variant, BOUNDED};
use partition::{merge_counts, Partitioner};
use planes::{Pixel, Viewport};

/// Renders the escape-time and Newton fractals into an owned pixel
/// buffer.
pub struct FractalEngine {
    config: FractalConfig,
    iterator: EscapeIterator,
    palette: Vec<Rgb>,
    partitioner: Partitioner,
    viewport: Option<Viewport>,
    pixels: Vec<IterationResult>,
    colours: Vec<u32>,
    histogram: Vec<u64>,
}

impl FractalEngine {
    /// Fails if the configured view cannot be mapped, or if the worker
    /// pool cannot be started.
    pub fn new(config: &FractalConfig, iterator: EscapeIterator) -> Result<FractalEngine, FractalError> {
        Viewport::new(config.center, config.zoom, config.width, config.height)?;
        let partitioner = match config.workers {
            Some(workers) => Partitioner::new(workers)?,
            None => Partitioner::with_available_parallelism()?,
        };
        let mut iterator = iterator;
        iterator.set_max_iterations(config.max_iterations);
        let palette = default_palette(&iterator);
        Ok(FractalEngine {
            config: config.clone(),
            iterator,
            palette,
            partitioner,
            viewport: None,
            pixels: vec![],
            colours: vec![],
            histogram: vec![],
        })
    }

    /// Replaces the base colours.  A palette of the wrong size for the
    /// iterator is swapped for the default one at the next setup.
    pub fn with_palette(mut self, palette: Vec<Rgb>) -> FractalEngine {
        self.palette = palette;
        self
    }

    /// The iterator this engine renders with.
    pub fn iterator(&self) -> &EscapeIterator {
        &self.iterator
    }

    /// Changes to the iterator take effect at the next render.
    pub fn iterator_mut(&mut self) -> &mut EscapeIterator {
        &mut self.iterator
    }

    /// Base colours, one per classification.
    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    /// The mapping used by the last setup, if there has been one.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Classification and count of every pixel, row-major.
    pub fn pixels(&self) -> &[IterationResult] {
        &self.pixels
    }

    /// One pixel, once rendered.
    pub fn pixel(&self, column: usize, row: usize) -> Option<IterationResult> {
        let viewport = self.viewport?;
        if column >= viewport.width() || row >= viewport.height() {
            return None;
        }
        self.pixels.get(row * viewport.width() + column).cloned()
    }

    /// How many pixels took each number of iterations.
    pub fn histogram(&self) -> &[u64] {
        &self.histogram
    }

    fn parts(&self) -> usize {
        if self.config.multithreading {
            self.partitioner.workers()
        } else {
            1
        }
    }

    fn ready(&self) -> Result<Viewport, FractalError> {
        self.viewport.ok_or_else(|| {
            FractalError::Configuration("the fractal has not been set up".to_string())
        })
    }

    /// Renders the given rows on the calling thread, adding their
    /// iteration counts to the histogram.
    pub fn render_rows(&mut self, rows: Range<usize>) -> Result<(), FractalError> {
        let viewport = self.ready()?;
        let width = viewport.width();
        let rows = rows.start.min(viewport.height())..rows.end.min(viewport.height());
        if rows.start >= rows.end {
            return Ok(());
        }
        let buckets = self.histogram.len();
        let band = &mut self.pixels[rows.start * width..rows.end * width];
        let local = render_band(&self.iterator, &viewport, rows, band, buckets);
        merge_counts(&mut self.histogram, &[local]);
        Ok(())
    }

    fn render_all(&mut self) -> Result<(), FractalError> {
        let viewport = self.ready()?;
        let parts = self.parts();
        let buckets = self.histogram.len();
        let iterator = &self.iterator;
        let locals = self.partitioner.map_chunks(
            parts,
            &mut self.pixels,
            viewport.width(),
            |rows, band| render_band(iterator, &viewport, rows, band, buckets),
        );
        merge_counts(&mut self.histogram, &locals);
        Ok(())
    }

    fn mapper(&self) -> ColorMapper {
        let interior = if self.iterator.has_interior() {
            Some(BOUNDED)
        } else {
            None
        };
        ColorMapper::new(self.config.style, &self.palette, self.config.max_iterations.max(1))
            .with_interior(interior)
    }

    fn equalizer(&self) -> Option<HistogramEqualizer> {
        match self.config.mode {
            ColorMode::Histogram => Some(HistogramEqualizer::new(&self.histogram)),
            ColorMode::EscapeTime => None,
        }
    }

    /// Resolves the colours of the given rows from their stored counts.
    pub fn color_rows(&mut self, rows: Range<usize>) {
        let width = match self.viewport {
            Some(viewport) => viewport.width(),
            None => return,
        };
        let mapper = self.mapper();
        let equalizer = self.equalizer();
        let end = (rows.end * width).min(self.pixels.len());
        for offset in (rows.start * width).min(end)..end {
            self.colours[offset] = shade(&mapper, equalizer.as_ref(), self.pixels[offset]).packed();
        }
    }

    /// An anti-aliasing pass.  Interior pixels whose neighbours disagree
    /// with them are resampled at four diagonal sub-pixel offsets, and
    /// are coloured with the mean count of the five samples.  The stored
    /// counts are not changed, so repeating the pass gives the same image.
    /// Returns the number of pixels that were resampled.
    pub fn supersample(&mut self) -> usize {
        let viewport = match self.viewport {
            Some(viewport) => viewport,
            None => return 0,
        };
        let (width, height) = (viewport.width(), viewport.height());
        if width < 3 || height < 3 {
            return 0;
        }

        let start = Instant::now();
        let parts = self.parts();
        let mut shown: Vec<usize> = self.pixels.iter().map(|p| p.iterations).collect();
        let pixels = &self.pixels;
        let iterator = &self.iterator;
        let changed: usize = self
            .partitioner
            .map_chunks(parts, &mut shown, width, |rows, band| {
                let mut changed = 0;
                for (row, column) in iproduct!(rows.clone(), 1..width - 1) {
                    if row == 0 || row == height - 1 {
                        continue;
                    }
                    if let Some(mean) = resample(iterator, &viewport, pixels, Pixel(column, row)) {
                        band[(row - rows.start) * width + column] = mean;
                        changed += 1;
                    }
                }
                changed
            })
            .iter()
            .sum();

        let mapper = self.mapper();
        let equalizer = self.equalizer();
        for (offset, pixel) in self.pixels.iter().enumerate() {
            let sampled = IterationResult {
                iterations: shown[offset],
                ..*pixel
            };
            self.colours[offset] = shade(&mapper, equalizer.as_ref(), sampled).packed();
        }
        debug!("supersampled {} pixels in {:?}", changed, start.elapsed());
        changed
    }
}

/// The default base colours for an iterator: one per Newton root plus
/// black, or the Mandelbrot palette.
fn default_palette(iterator: &EscapeIterator) -> Vec<Rgb> {
    match *iterator.variant() {
        Variant::Newton(_) => newton_palette(iterator.order()),
        _ => vec![Rgb::BLACK, Rgb::YELLOW, Rgb::BLUE],
    }
}

fn render_band(
    iterator: &EscapeIterator,
    viewport: &Viewport,
    rows: Range<usize>,
    band: &mut [IterationResult],
    buckets: usize,
) -> Vec<u64> {
    let width = viewport.width();
    let mut histogram = vec![0u64; buckets];
    for (offset, cell) in band.iter_mut().enumerate() {
        let pixel = Pixel(offset % width, rows.start + offset / width);
        *cell = iterator.iterate(viewport.pixel_to_point(&pixel));
        histogram[cell.iterations.min(buckets - 1)] += 1;
    }
    histogram
}

fn shade(mapper: &ColorMapper, equalizer: Option<&HistogramEqualizer>, pixel: IterationResult) -> Rgb {
    match equalizer {
        Some(equalizer) => mapper.resolve_equalized(pixel.classification, pixel.iterations, equalizer),
        None => mapper.resolve(pixel.classification, pixel.iterations),
    }
}

/// The mean iteration count of a pixel and four sub-pixel samples, or
/// nothing if the pixel sits in a solid region.
fn resample(
    iterator: &EscapeIterator,
    viewport: &Viewport,
    pixels: &[IterationResult],
    pixel: Pixel,
) -> Option<usize> {
    let width = viewport.width();
    let Pixel(column, row) = pixel;
    let at = |c: usize, r: usize| pixels[r * width + c];
    let neighbours = [
        at(column, row - 1),
        at(column - 1, row),
        at(column + 1, row),
        at(column, row + 1),
    ];
    if neighbours.iter().all(|n| n.classification == BOUNDED) {
        return None;
    }

    let centre = at(column, row).iterations;
    let around: usize = neighbours.iter().map(|n| n.iterations).sum();
    if ((around as f64) - 4.0 * (centre as f64)).abs() < 0.1 * (centre as f64) {
        return None;
    }

    let spd = 0.25 * viewport.dz();
    let point = viewport.pixel_to_point(&pixel);
    let total = [(-spd, spd), (spd, spd), (-spd, -spd), (spd, -spd)]
        .iter()
        .map(|&(re, im)| iterator.iterate(point + Complex::new(re, im)).iterations)
        .fold(centre, |sum, n| sum + n);
    Some(((total as f64) / 5.0).round() as usize)
}

impl Fractal for FractalEngine {
    /// Maps the view and clears every buffer.
    fn setup(&mut self) -> Result<(), FractalError> {
        let start = Instant::now();
        let c = &self.config;
        let viewport = Viewport::new(c.center, c.zoom, c.width, c.height)?;
        self.iterator.set_max_iterations(c.max_iterations);
        if self.palette.len() != self.iterator.order() + 1 {
            self.palette = default_palette(&self.iterator);
        }
        self.pixels = vec![IterationResult::default(); viewport.len()];
        self.colours = vec![0; viewport.len()];
        self.histogram = vec![0; c.max_iterations + 1];
        self.viewport = Some(viewport);
        debug!("setup time: {:?}", start.elapsed());
        Ok(())
    }

    fn create_fractal(&mut self) -> Result<(), FractalError> {
        self.setup()?;
        let start = Instant::now();
        self.render_all()?;
        self.color_fractal();
        if self.config.supersampling {
            self.supersample();
        }
        info!(
            "rendered {}x{} in {:?}",
            self.config.width,
            self.config.height,
            start.elapsed()
        );
        Ok(())
    }

    fn color_fractal(&mut self) {
        let height = self.viewport.map(|v| v.height()).unwrap_or(0);
        self.color_rows(0..height);
    }

    /// Pixels still on the image after the move keep what they had; the
    /// ones that fall off are recomputed at the mirrored position, which
    /// is exactly the strip the move exposes.
    fn translate(&mut self, dx: i64, dy: i64) -> Result<(), FractalError> {
        if self.viewport.is_none() {
            self.create_fractal()?;
        }
        let viewport = self.ready()?;
        let start = Instant::now();
        let moved = viewport.translated(dx, dy);
        let w = viewport.width();
        let (width, height) = (w as i64, viewport.height() as i64);
        let (dx, dy) = (dx.max(-width).min(width), dy.max(-height).min(height));

        let previous_pixels = self.pixels.clone();
        let previous_colours = self.colours.clone();
        let buckets = self.histogram.len();
        let mut recomputed = 0;
        for (x, y) in iproduct!(0..width, 0..height) {
            let (nx, ny) = (x + dx, y + dy);
            if nx >= 0 && ny >= 0 && nx < width && ny < height {
                let from = (y * width + x) as usize;
                let to = (ny * width + nx) as usize;
                self.pixels[to] = previous_pixels[from];
                self.colours[to] = previous_colours[from];
                continue;
            }
            let exposed = Pixel((width - 1 - x) as usize, (height - 1 - y) as usize);
            let result = self.iterator.iterate(moved.pixel_to_point(&exposed));
            self.pixels[exposed.1 * w + exposed.0] = result;
            self.histogram[result.iterations.min(buckets - 1)] += 1;
            recomputed += 1;
        }

        self.viewport = Some(moved);
        self.config.center = moved.center();
        self.color_fractal();
        debug!(
            "translate time: {:?}, {} pixels recomputed",
            start.elapsed(),
            recomputed
        );
        Ok(())
    }

    fn center(&self) -> ComplexValue {
        self.config.center
    }

    fn set_center(&mut self, center: ComplexValue) {
        self.config.center = center;
    }

    fn zoom(&self) -> f64 {
        self.config.zoom
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.config.zoom = zoom;
    }

    fn max_iterations(&self) -> usize {
        self.config.max_iterations
    }

    fn set_max_iterations(&mut self, max_iterations: usize) {
        self.config.max_iterations = max_iterations;
    }

    fn set_color_style(&mut self, style: ColorStyle) {
        self.config.style = style;
    }

    fn set_color_mode(&mut self, mode: ColorMode) {
        self.config.mode = mode;
    }

    fn set_colour(&mut self, index: usize, colour: Rgb) {
        if let Some(slot) = self.palette.get_mut(index) {
            *slot = colour;
        }
    }

    fn set_workers(&mut self, workers: usize) -> Result<(), FractalError> {
        if workers != self.partitioner.workers() {
            self.partitioner = Partitioner::new(workers)?;
        }
        self.config.workers = Some(workers);
        Ok(())
    }

    fn set_multithreading(&mut self, enabled: bool) {
        self.config.multithreading = enabled;
    }

    fn set_supersampling(&mut self, enabled: bool) {
        self.config.supersampling = enabled;
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.config.width, self.config.height)
    }

    fn set_dimensions(&mut self, width: usize, height: usize) {
        self.config.width = width;
        self.config.height = height;
    }

    fn pixel_buffer(&self) -> &[u32] {
        &self.colours
    }
}
