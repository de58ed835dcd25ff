// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The operations every renderer offers to a caller that displays or
//! saves the image, and a constructor that picks the renderer for a kind
//! of fractal.
//!
//! Setters only record the new value; nothing changes on screen until
//! the next `setup` or `create_fractal`.

use colour::{ColorMode, ColorStyle, Rgb};
use complex::ComplexValue;
use config::{newton_palette, FractalConfig, FractalKind, VariantParams};
use errors::FractalError;
use grid::FractalEngine;
use trajectory::{Accumulation, TrajectoryEngine};

/// A renderer that owns its settings and pixel buffer.
pub trait Fractal: Send {
    /// Maps the view and (re)allocates the buffers.
    fn setup(&mut self) -> Result<(), FractalError>;

    /// Setup, render and colour in one go.
    fn create_fractal(&mut self) -> Result<(), FractalError>;

    /// Recolours the current render, e.g. after a palette change.
    fn color_fractal(&mut self);

    /// Pans the view by whole pixels.
    fn translate(&mut self, dx: i64, dy: i64) -> Result<(), FractalError>;

    /// The point under the middle of the image.
    fn center(&self) -> ComplexValue;
    /// Moves the view.
    fn set_center(&mut self, center: ComplexValue);
    /// Current zoom level.
    fn zoom(&self) -> f64;
    /// Changes the zoom level.
    fn set_zoom(&mut self, zoom: f64);
    /// Iteration budget per point.
    fn max_iterations(&self) -> usize;
    /// Changes the iteration budget.
    fn set_max_iterations(&mut self, max_iterations: usize);
    /// Changes how classifications are shaded.
    fn set_color_style(&mut self, style: ColorStyle);

    /// Only escape-time renderers have a histogram to equalize against.
    fn set_color_mode(&mut self, _mode: ColorMode) {}

    /// Replaces one base colour; out-of-range indices are ignored.
    fn set_colour(&mut self, index: usize, colour: Rgb);

    /// Replaces the worker pool with one of `workers` threads.
    fn set_workers(&mut self, workers: usize) -> Result<(), FractalError>;
    /// Turns the worker pool on or off.  Off runs every job on the calling
    /// thread.  Newton roots are numbered in the order they are found, so
    /// only a single-threaded render numbers the basins the same way every
    /// time.
    fn set_multithreading(&mut self, enabled: bool);
    /// Turns the anti-aliasing pass on or off, where there is one.
    fn set_supersampling(&mut self, _enabled: bool) {}
    /// Image width and height in pixels.
    fn dimensions(&self) -> (usize, usize);
    /// Resizes the image.
    fn set_dimensions(&mut self, width: usize, height: usize);

    /// Row-major packed `0xRRGGBB` colours.
    fn pixel_buffer(&self) -> &[u32];
}

/// Builds the renderer for `kind`, with the kind's base colours.
pub fn build_fractal(
    kind: FractalKind,
    config: &FractalConfig,
    params: &VariantParams,
) -> Result<Box<dyn Fractal>, FractalError> {
    match kind {
        FractalKind::Buddhabrot => Ok(Box::new(TrajectoryEngine::new(
            config,
            params.trajectory.clone(),
            Accumulation::Single,
        )?)),
        FractalKind::Nebulabrot => Ok(Box::new(TrajectoryEngine::new(
            config,
            params.trajectory.clone(),
            Accumulation::ThreeChannel,
        )?)),
        _ => {
            let iterator = params.iterator(kind, config.max_iterations)?;
            let palette = match kind {
                FractalKind::Newton => newton_palette(iterator.order()),
                _ => kind.palette(),
            };
            Ok(Box::new(
                FractalEngine::new(config, iterator)?.with_palette(palette),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::TrajectoryConfig;
    use num::Complex;

    fn small(kind: FractalKind) -> FractalConfig {
        FractalConfig {
            workers: Some(2),
            max_iterations: 30,
            ..FractalConfig::for_kind(kind)
        }
        .with_size(24, 16)
    }

    #[test]
    fn every_kind_renders() {
        let params = VariantParams {
            trajectory: TrajectoryConfig {
                points: 500,
                rng_seed: Some(1),
                ..TrajectoryConfig::default()
            },
            ..VariantParams::default()
        };
        for &kind in FractalKind::all() {
            let mut fractal = build_fractal(kind, &small(kind), &params).unwrap();
            fractal.create_fractal().unwrap();
            assert_eq!(fractal.pixel_buffer().len(), 24 * 16);
        }
    }

    #[test]
    fn setters_take_effect_on_the_next_render() {
        let kind = FractalKind::Julia;
        let mut fractal = build_fractal(kind, &small(kind), &VariantParams::default()).unwrap();
        fractal.set_dimensions(10, 8);
        fractal.set_center(Complex::new(0.1, 0.0));
        fractal.set_zoom(2.0);
        assert_eq!(fractal.dimensions(), (10, 8));
        fractal.create_fractal().unwrap();
        assert_eq!(fractal.pixel_buffer().len(), 80);
        assert_eq!(fractal.zoom(), 2.0);
    }

    #[test]
    fn bad_parameters_are_reported() {
        let params = VariantParams {
            power: Some(3.0),
            ..VariantParams::default()
        };
        let kind = FractalKind::BurningShip;
        assert!(build_fractal(kind, &small(kind), &params).is_err());

        let zoomed_out = FractalConfig {
            zoom: 0.0,
            ..small(FractalKind::Mandelbrot)
        };
        assert!(build_fractal(FractalKind::Mandelbrot, &zoomed_out, &VariantParams::default()).is_err());
    }
}
