// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Polynomials with complex coefficients, the target functions of the
//! Newton root-basin fractal.

use std::fmt;

use num::Complex;

use complex::ComplexValue;

/// An ordered list of coefficients, indexed by the power of z they
/// multiply.  The highest coefficient is never zero, except for the zero
/// polynomial itself, which is stored as a single zero constant.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coeff: Vec<ComplexValue>,
}

impl Polynomial {
    /// Builds a polynomial, trimming zero coefficients from the top.
    pub fn new(coeff: &[ComplexValue]) -> Polynomial {
        match coeff.iter().rposition(|c| c.norm_sqr() > 0.0) {
            Some(top) => Polynomial {
                coeff: coeff[..=top].to_vec(),
            },
            None => Polynomial::zero(),
        }
    }

    /// Convenience constructor for real coefficients.
    pub fn from_real(coeff: &[f64]) -> Polynomial {
        let coeff: Vec<ComplexValue> = coeff.iter().map(|&re| Complex::new(re, 0.0)).collect();
        Polynomial::new(&coeff)
    }

    /// The constant zero.
    pub fn zero() -> Polynomial {
        Polynomial {
            coeff: vec![Complex::new(0.0, 0.0)],
        }
    }

    /// The number of coefficients less one.
    pub fn degree(&self) -> usize {
        self.coeff.len() - 1
    }

    /// Coefficients, constant term first.
    pub fn coefficients(&self) -> &[ComplexValue] {
        &self.coeff
    }

    /// Evaluates the polynomial at z with Horner's method.
    pub fn evaluate(&self, z: ComplexValue) -> ComplexValue {
        self.coeff
            .iter()
            .rev()
            .fold(Complex::new(0.0, 0.0), |acc, c| acc * z + *c)
    }

    /// Term-wise derivative.  Constants differentiate to the zero
    /// polynomial.
    pub fn derivative(&self) -> Polynomial {
        if self.degree() == 0 {
            return Polynomial::zero();
        }
        let coeff: Vec<ComplexValue> = self
            .coeff
            .iter()
            .enumerate()
            .skip(1)
            .map(|(power, c)| *c * (power as f64))
            .collect();
        Polynomial::new(&coeff)
    }
}

impl Default for Polynomial {
    fn default() -> Polynomial {
        Polynomial::zero()
    }
}

fn write_coefficient(f: &mut fmt::Formatter, c: &ComplexValue) -> fmt::Result {
    if c.im < 0.0 {
        write!(f, "{}-{}i", c.re, c.im.abs())
    } else {
        write!(f, "{}+{}i", c.re, c.im)
    }
}

/// Written low power first: `(-1+0i) + (0+0i)z^1 + (1+0i)z^2`.
impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;
        write_coefficient(f, &self.coeff[0])?;
        write!(f, ")")?;
        for (power, c) in self.coeff.iter().enumerate().skip(1) {
            write!(f, " + (")?;
            write_coefficient(f, c)?;
            write!(f, ")z^{}", power)?;
        }
        Ok(())
    }
}
