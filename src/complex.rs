// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Complex arithmetic.  `num::Complex` already supplies addition,
//! negation, multiplication (by scalars and by other complex numbers),
//! division, magnitude, argument and conjugation; this module adds the
//! two exponentiation rules the fractal iterations depend on and a
//! squared-distance helper.

use num::Complex;

/// Every point on the plane, every orbit sample, every polynomial
/// coefficient.
pub type ComplexValue = Complex<f64>;

/// Calculate the squared distance between two complex numbers on a
/// Cartesian plane.  All of the convergence tests compare this against a
/// squared tolerance, so the square root is never taken.
#[inline]
pub fn dist(i: ComplexValue, j: ComplexValue) -> f64 {
    (i.im - j.im) * (i.im - j.im) + (i.re - j.re) * (i.re - j.re)
}

/// Exponentiation rules used by the iterators.
pub trait Exponent {
    /// Raise to a real power using the polar form
    /// `|z|^n * (cos(n*arg z), sin(n*arg z))`.  Zero raised to anything
    /// stays zero.
    fn pow_real(&self, n: f64) -> Self;

    /// Raise to a non-negative integer power by repeated multiplication.
    /// Zero raised to anything (even 0) stays zero.
    fn pow_int(&self, n: u32) -> Self;
}

impl Exponent for ComplexValue {
    fn pow_real(&self, n: f64) -> Self {
        if self.re == 0.0 && self.im == 0.0 {
            return *self;
        }
        let theta = n * self.arg();
        let magnitude = self.norm().powf(n);
        Complex::new(theta.cos(), theta.sin()) * magnitude
    }

    fn pow_int(&self, n: u32) -> Self {
        if self.re == 0.0 && self.im == 0.0 {
            return *self;
        }
        let mut answer = Complex::new(1.0, 0.0);
        for _ in 0..n {
            answer = answer * *self;
        }
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: ComplexValue, b: ComplexValue) -> bool {
        dist(a, b) < 1e-18
    }

    #[test]
    fn adding_the_negation_gives_zero() {
        for z in &[
            Complex::new(0.0, 0.0),
            Complex::new(1.5, -2.25),
            Complex::new(-1e12, 3e-7),
        ] {
            assert_eq!(*z + (-*z), Complex::new(0.0, 0.0));
        }
    }

    #[test]
    fn division_undoes_multiplication() {
        let a = Complex::new(3.0, -1.0);
        let b = Complex::new(0.5, 2.0);
        assert!(close((a * b) / b, a));
    }

    #[test]
    fn distance_is_squared() {
        assert_eq!(dist(Complex::new(0.0, 0.0), Complex::new(3.0, 4.0)), 25.0);
    }

    #[test]
    fn real_power_matches_multiplication() {
        let z = Complex::new(0.3, -1.2);
        assert!(close(z.pow_real(2.0), z * z));
        assert!(close(z.pow_real(3.0), z * z * z));
    }

    #[test]
    fn integer_power_is_a_true_power() {
        let z = Complex::new(-0.7, 0.4);
        assert!(close(z.pow_int(3), z * z * z));
        assert_eq!(z.pow_int(0), Complex::new(1.0, 0.0));
        assert_eq!(z.pow_int(1), z);
    }

    #[test]
    fn zero_stays_zero() {
        let zero = Complex::new(0.0, 0.0);
        assert_eq!(zero.pow_real(2.5), zero);
        assert_eq!(zero.pow_real(-1.0), zero);
        assert_eq!(zero.pow_int(0), zero);
    }
}
