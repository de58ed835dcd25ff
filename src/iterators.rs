// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The iteration rules behind every fractal the renderer draws.
//!
//! Each variant takes a point on the complex plane and reports a pair of
//! integers: a classification and the number of iterations it took to
//! reach it.  For the escape-time variants (Mandelbrot, Julia, Multibrot,
//! Burning Ship, Tricorn) the classification is 1 if the orbit escaped
//! the radius-2 disk and 0 if it stayed bounded, settled into a fixed
//! point, or ran out of iterations.  For Newton's method it is the index
//! of the root the search converged to, or the degree of the polynomial
//! when the search failed.

use std::sync::RwLock;

use num::Complex;

use complex::{dist, ComplexValue, Exponent};
use errors::FractalError;
use polynomial::Polynomial;

/// Classification of an orbit that stayed bounded.
pub const BOUNDED: usize = 0;
/// Classification of an orbit that left the escape radius.
pub const ESCAPED: usize = 1;
/// |z|^2 beyond which an orbit is considered to have escaped.
pub const ESCAPE_RADIUS_SQR: f64 = 4.0;

const D4: f64 = 1.0 / 4.0;
const D16: f64 = D4 / 4.0;

/// Convergence tolerance handed to every iterator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tolerance {
    /// Squared-distance threshold.
    pub tol: f64,
}

impl Default for Tolerance {
    fn default() -> Tolerance {
        Tolerance { tol: 1.0e-10 }
    }
}

impl Tolerance {
    /// Two consecutive iterates within TOL of each other: the orbit has
    /// stopped moving.
    #[inline]
    pub fn converged(&self, previous: ComplexValue, next: ComplexValue) -> bool {
        dist(previous, next) <= self.tol * self.tol
    }

    /// A derivative this small cannot be divided by.
    #[inline]
    pub fn degenerate(&self, derivative: ComplexValue) -> bool {
        derivative.norm_sqr() < self.tol * self.tol
    }

    /// Whether two converged Newton searches found the same root.
    #[inline]
    pub fn same_root(&self, a: ComplexValue, b: ComplexValue) -> bool {
        dist(a, b) < self.tol
    }
}

/// What an iterator learned about a single point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IterationResult {
    /// Escape flag, or Newton root index.
    pub classification: usize,
    /// Iterations spent on the point.
    pub iterations: usize,
}

impl IterationResult {
    fn new(classification: usize, iterations: usize) -> IterationResult {
        IterationResult {
            classification,
            iterations,
        }
    }
}

/// As I understand it, the first half of the `or` expression is true
/// inside the main cardioid and the second inside the period-2 bulb.
/// Points there never escape, so there is no reason to iterate them.
pub fn in_main_bulbs(point: ComplexValue) -> bool {
    let (x, y) = (point.re, point.im);
    let a = (x - D4) * (x - D4) + y * y;
    let b = a * (a + (x - D4));
    b < D4 * y * y || (x + 1.0) * (x + 1.0) + y * y < D16
}

/// Newton-Raphson root search on a fixed polynomial, remembering every
/// root it has found so that each one keeps the same index (and so the
/// same colour) from one point to the next.
///
/// Indices are handed out in discovery order.  When several workers
/// share one instance, whichever reaches a root first claims the next
/// index, so a multithreaded render may number (and colour) the basins
/// differently from one run to the next.  Render single-threaded for a
/// stable numbering.
#[derive(Debug)]
pub struct Newton {
    f: Polynomial,
    fp: Polynomial,
    roots: RwLock<Vec<ComplexValue>>,
}

impl Newton {
    /// Fails for a constant or non-finite polynomial.
    pub fn new(f: Polynomial) -> Result<Newton, FractalError> {
        validate(&f)?;
        Ok(Newton {
            fp: f.derivative(),
            f,
            roots: RwLock::new(vec![]),
        })
    }

    /// z^5 - 1
    pub fn fifth_roots_of_unity() -> Newton {
        let f = Polynomial::from_real(&[-1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        Newton {
            fp: f.derivative(),
            f,
            roots: RwLock::new(vec![]),
        }
    }

    /// The polynomial being solved.
    pub fn polynomial(&self) -> &Polynomial {
        &self.f
    }

    /// Its derivative.
    pub fn derivative(&self) -> &Polynomial {
        &self.fp
    }

    /// Replaces the polynomial and forgets every root found for the old
    /// one.  A rejected polynomial leaves everything as it was.
    pub fn set_polynomial(&mut self, f: Polynomial) -> Result<(), FractalError> {
        validate(&f)?;
        self.fp = f.derivative();
        self.f = f;
        match self.roots.get_mut() {
            Ok(roots) => roots.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
        Ok(())
    }

    /// The roots discovered so far, in index order.
    pub fn roots(&self) -> Vec<ComplexValue> {
        match self.roots.read() {
            Ok(roots) => roots.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The sentinel classification for a search that did not converge.
    pub fn order(&self) -> usize {
        self.f.degree()
    }

    /// Finds (or registers) the index of a converged root.  Readers take
    /// the shared lock; only an unseen root takes the exclusive one, and
    /// it looks again in case another worker registered it first.
    fn root_index(&self, root: ComplexValue, tolerance: &Tolerance) -> usize {
        let seen = match self.roots.read() {
            Ok(roots) => roots.iter().position(|r| tolerance.same_root(root, *r)),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .position(|r| tolerance.same_root(root, *r)),
        };
        if let Some(index) = seen {
            return index;
        }
        let mut roots = match self.roots.write() {
            Ok(roots) => roots,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(index) = roots.iter().position(|r| tolerance.same_root(root, *r)) {
            return index;
        }
        roots.push(root);
        roots.len() - 1
    }

    fn iterate(&self, z0: ComplexValue, limit: usize, tolerance: &Tolerance) -> IterationResult {
        let mut result = IterationResult::new(self.order(), 1);
        let mut z = z0;
        for n in 1..=limit {
            result.iterations = n;
            let slope = self.fp.evaluate(z);
            if tolerance.degenerate(slope) {
                break;
            }
            let previous = z;
            z = previous - self.f.evaluate(previous) / slope;
            if tolerance.converged(previous, z) {
                result.classification = self.root_index(z, tolerance);
                break;
            }
        }
        result
    }
}

impl Clone for Newton {
    fn clone(&self) -> Newton {
        Newton {
            f: self.f.clone(),
            fp: self.fp.clone(),
            roots: RwLock::new(self.roots()),
        }
    }
}

fn validate(f: &Polynomial) -> Result<(), FractalError> {
    if f
        .coefficients()
        .iter()
        .any(|c| !c.re.is_finite() || !c.im.is_finite())
    {
        return Err(FractalError::Polynomial(format!(
            "{} has a non-finite coefficient",
            f
        )));
    }
    if f.degree() < 1 {
        return Err(FractalError::Polynomial(format!(
            "{} is constant and has no roots to find",
            f
        )));
    }
    Ok(())
}

/// The closed set of iteration rules.
#[derive(Clone, Debug)]
pub enum Variant {
    /// z -> z^2 + c, starting from zero, c the point.
    Mandelbrot,
    /// z -> z^power + c, starting from the point, c fixed.
    Julia {
        /// The fixed constant.
        c: ComplexValue,
        /// The exponent.
        power: f64,
    },
    /// z -> z^power + c for a real power.
    Multibrot {
        /// The exponent.
        power: f64,
    },
    /// z -> (|Re z| + i|Im z|)^2 + c.
    BurningShip,
    /// z -> conj(z)^power + c.
    Tricorn {
        /// The exponent.
        power: f64,
    },
    /// Newton-Raphson on a polynomial.
    Newton(Newton),
}

/// An iteration rule plus the budget and tolerance it runs with.
#[derive(Clone, Debug)]
pub struct EscapeIterator {
    variant: Variant,
    max_iterations: usize,
    tolerance: Tolerance,
}

impl EscapeIterator {
    /// An iterator for any variant, with the default tolerance.
    pub fn new(variant: Variant, max_iterations: usize) -> EscapeIterator {
        EscapeIterator {
            variant,
            max_iterations,
            tolerance: Tolerance::default(),
        }
    }

    /// The classic set.
    pub fn mandelbrot(max_iterations: usize) -> EscapeIterator {
        EscapeIterator::new(Variant::Mandelbrot, max_iterations)
    }

    /// A Julia set for the constant `c`.
    pub fn julia(c: ComplexValue, power: f64, max_iterations: usize) -> EscapeIterator {
        EscapeIterator::new(Variant::Julia { c, power }, max_iterations)
    }

    /// Mandelbrot with a real exponent.
    pub fn multibrot(power: f64, max_iterations: usize) -> EscapeIterator {
        EscapeIterator::new(Variant::Multibrot { power }, max_iterations)
    }

    /// The Burning Ship.
    pub fn burning_ship(max_iterations: usize) -> EscapeIterator {
        EscapeIterator::new(Variant::BurningShip, max_iterations)
    }

    /// The Tricorn, with exponent 2.
    pub fn tricorn(max_iterations: usize) -> EscapeIterator {
        EscapeIterator::new(Variant::Tricorn { power: 2.0 }, max_iterations)
    }

    /// Newton on `f`; fails for a constant or non-finite polynomial.
    pub fn newton(f: Polynomial, max_iterations: usize) -> Result<EscapeIterator, FractalError> {
        Ok(EscapeIterator::new(
            Variant::Newton(Newton::new(f)?),
            max_iterations,
        ))
    }

    /// Replaces the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> EscapeIterator {
        self.tolerance = tolerance;
        self
    }

    /// The iteration rule.
    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    /// The convergence tolerance.
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// The configured iteration budget.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Changes the iteration budget.
    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.max_iterations = max_iterations;
    }

    /// The largest classification this rule can report; palettes carry
    /// `order() + 1` base colours.
    pub fn order(&self) -> usize {
        match self.variant {
            Variant::Newton(ref newton) => newton.order(),
            _ => 2,
        }
    }

    /// Whether a classification of zero means "inside the set" and should
    /// be drawn flat.  Newton's zero is simply its first root.
    pub fn has_interior(&self) -> bool {
        match self.variant {
            Variant::Newton(_) => false,
            _ => true,
        }
    }

    /// Replaces the Julia constant.
    pub fn set_c(&mut self, value: ComplexValue) -> Result<(), FractalError> {
        match self.variant {
            Variant::Julia { ref mut c, .. } => {
                *c = value;
                Ok(())
            }
            _ => Err(FractalError::Configuration(
                "only Julia sets have a constant".to_string(),
            )),
        }
    }

    /// Replaces the exponent of a Julia, Multibrot or Tricorn rule.
    pub fn set_power(&mut self, value: f64) -> Result<(), FractalError> {
        if !value.is_finite() {
            return Err(FractalError::Configuration(format!(
                "exponent {} is not finite",
                value
            )));
        }
        match self.variant {
            Variant::Julia { ref mut power, .. }
            | Variant::Multibrot { ref mut power }
            | Variant::Tricorn { ref mut power } => {
                *power = value;
                Ok(())
            }
            _ => Err(FractalError::Configuration(
                "this fractal has a fixed exponent".to_string(),
            )),
        }
    }

    /// Replaces the Newton polynomial, clearing the root registry.
    pub fn set_polynomial(&mut self, f: Polynomial) -> Result<(), FractalError> {
        match self.variant {
            Variant::Newton(ref mut newton) => newton.set_polynomial(f),
            _ => Err(FractalError::Configuration(
                "only Newton fractals have a polynomial".to_string(),
            )),
        }
    }

    /// Roots discovered so far by a Newton iterator; empty otherwise.
    pub fn roots(&self) -> Vec<ComplexValue> {
        match self.variant {
            Variant::Newton(ref newton) => newton.roots(),
            _ => vec![],
        }
    }

    /// Classifies a point with the configured iteration budget.
    pub fn iterate(&self, point: ComplexValue) -> IterationResult {
        self.iterate_with_limit(point, self.max_iterations)
    }

    /// Classifies a point with an explicit iteration budget.
    pub fn iterate_with_limit(&self, point: ComplexValue, limit: usize) -> IterationResult {
        let tolerance = &self.tolerance;
        match self.variant {
            Variant::Mandelbrot => {
                if in_main_bulbs(point) {
                    return IterationResult::new(BOUNDED, 1);
                }
                settle(limit, tolerance, |z| z * z + point)
            }
            Variant::Multibrot { power } => {
                settle(limit, tolerance, |z| z.pow_real(power) + point)
            }
            Variant::Tricorn { power } => {
                if point.norm_sqr() <= D16 {
                    return IterationResult::new(BOUNDED, 1);
                }
                settle(limit, tolerance, |z| z.conj().pow_real(power) + point)
            }
            Variant::BurningShip => escape(Complex::new(0.0, 0.0), limit, |z| {
                let folded = Complex::new(z.re.abs(), z.im.abs());
                folded * folded + point
            }),
            Variant::Julia { c, power } => {
                if power == power.floor() && power >= 1.0 {
                    let n = power as u32;
                    escape(point, limit, |z| z.pow_int(n) + c)
                } else {
                    escape(point, limit, |z| z.pow_real(power) + c)
                }
            }
            Variant::Newton(ref newton) => newton.iterate(point, limit, tolerance),
        }
    }
}

/// Iterates from zero, watching both for escape and for the orbit
/// coming to rest.  A resting orbit, or one that runs out of iterations,
/// is reported as bounded.
fn settle<F>(limit: usize, tolerance: &Tolerance, step: F) -> IterationResult
where
    F: Fn(ComplexValue) -> ComplexValue,
{
    let mut result = IterationResult::new(BOUNDED, 1);
    let mut z = Complex::new(0.0, 0.0);
    for n in 1..=limit {
        result.iterations = n;
        if z.norm_sqr() > ESCAPE_RADIUS_SQR {
            result.classification = ESCAPED;
            break;
        }
        let previous = z;
        z = step(previous);
        if tolerance.converged(previous, z) {
            break;
        }
    }
    result
}

/// Iterates from `z0` until escape or the budget runs out, with no
/// periodicity test.  Escaping on the very last iteration counts as
/// bounded, as does a budget too small to iterate at all.
fn escape<F>(z0: ComplexValue, limit: usize, step: F) -> IterationResult
where
    F: Fn(ComplexValue) -> ComplexValue,
{
    let mut z = z0;
    let mut n = 1;
    while n < limit && z.norm_sqr() < ESCAPE_RADIUS_SQR {
        z = step(z);
        n += 1;
    }
    let classification = if n >= limit { BOUNDED } else { ESCAPED };
    IterationResult::new(classification, n)
}
