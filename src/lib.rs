#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fractal renderer
//!
//! Two families of fractal live here.  The escape-time family
//! (Mandelbrot, Julia, Multibrot, Burning Ship, Tricorn, and Newton's
//! method on a polynomial) colours each pixel by what happens when the
//! point under it is iterated: how quickly it escapes, or which root it
//! settles on.  The trajectory family (Buddhabrot and Nebulabrot) picks
//! random points instead, follows the ones that escape, and colours each
//! pixel by how many of those orbits pass through it.
//!
//! Both are driven through the `Fractal` trait; `build_fractal` returns
//! the right renderer for a `FractalKind`.  Work is split across a
//! persistent pool of worker threads, by image rows for escape-time
//! renders and by seed points for trajectory renders.  The result is a
//! row-major buffer of packed RGB values, which the caller encodes or
//! displays.

extern crate crossbeam;
extern crate failure;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;
extern crate rand;
extern crate rayon;

pub mod colour;
pub mod complex;
pub mod config;
pub mod errors;
pub mod fractal;
pub mod grid;
pub mod iterators;
pub mod partition;
pub mod planes;
pub mod polynomial;
pub mod trajectory;

pub use colour::{rgb_bytes, ColorMapper, ColorMode, ColorStyle, Rgb};
pub use complex::{ComplexValue, Exponent};
pub use config::{FractalConfig, FractalKind, TrajectoryConfig, VariantParams};
pub use errors::FractalError;
pub use fractal::{build_fractal, Fractal};
pub use grid::FractalEngine;
pub use iterators::{EscapeIterator, IterationResult, Newton, Tolerance, Variant};
pub use partition::Partitioner;
pub use planes::{Pixel, Viewport};
pub use polynomial::Polynomial;
pub use trajectory::{Accumulation, TrajectoryEngine, TrajectoryState};
