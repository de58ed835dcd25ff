// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The error type shared by every part of the renderer.
//!
//! Very little in fractal rendering is allowed to fail outright.  A
//! derivative that vanishes during a Newton search is a classification,
//! not an error; an orbit sample that rounds off the edge of the grid is
//! dropped and counted.  What remains are configuration mistakes, which
//! are caught before any work starts, and worker failures, which are
//! logged while the partially rendered image is kept.

use failure::Fail;

/// Everything that can go wrong while configuring or running a render.
#[derive(Debug, Fail, PartialEq)]
pub enum FractalError {
    /// The image size or zoom level cannot describe a plane.
    #[fail(display = "invalid viewport: {}", _0)]
    Viewport(String),

    /// A replacement Newton polynomial was malformed or degenerate.
    #[fail(display = "invalid polynomial: {}", _0)]
    Polynomial(String),

    /// Any other setting that cannot be honoured.
    #[fail(display = "invalid configuration: {}", _0)]
    Configuration(String),

    /// The persistent worker pool could not be created.
    #[fail(display = "could not start worker pool: {}", _0)]
    WorkerPool(String),

    /// Some partitions of a fork-join never completed.
    #[fail(display = "{} of {} partitions were interrupted", failed, total)]
    Interrupted {
        /// Partitions that panicked before finishing.
        failed: usize,
        /// Partitions submitted.
        total: usize,
    },
}
