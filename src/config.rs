// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Settings shared by every renderer, plus the per-fractal parameters
//! and the defaults each kind of fractal starts with.

use std::fmt;
use std::str::FromStr;

use num::Complex;

use colour::{ColorMode, ColorStyle, Rgb};
use complex::ComplexValue;
use errors::FractalError;
use iterators::{EscapeIterator, Newton, Variant};
use polynomial::Polynomial;

/// The fractals this crate knows how to draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FractalKind {
    /// z -> z^2 + c.
    Mandelbrot,
    /// Filled Julia set for a fixed constant.
    Julia,
    /// Newton's method on a polynomial.
    Newton,
    /// The Burning Ship.
    BurningShip,
    /// Mandelbrot with a real exponent.
    Multibrot,
    /// Conjugate Mandelbrot.
    Tricorn,
    /// Orbit density of escaping points.
    Buddhabrot,
    /// Three-channel Buddhabrot.
    Nebulabrot,
}

impl FractalKind {
    /// Every kind, in menu order.
    pub fn all() -> &'static [FractalKind] {
        &[
            FractalKind::Mandelbrot,
            FractalKind::Julia,
            FractalKind::Newton,
            FractalKind::BurningShip,
            FractalKind::Multibrot,
            FractalKind::Tricorn,
            FractalKind::Buddhabrot,
            FractalKind::Nebulabrot,
        ]
    }

    /// Whether the kind is drawn by accumulating orbits rather than by
    /// escape time.
    pub fn is_trajectory(self) -> bool {
        self == FractalKind::Buddhabrot || self == FractalKind::Nebulabrot
    }

    /// Base colours for the escape-time and Buddhabrot kinds.  Newton
    /// palettes depend on the polynomial; see `newton_palette`.
    pub fn palette(self) -> Vec<Rgb> {
        match self {
            FractalKind::Mandelbrot => vec![Rgb::BLACK, Rgb::YELLOW, Rgb::BLUE],
            FractalKind::Julia | FractalKind::BurningShip => vec![Rgb::BLUE, Rgb::WHITE, Rgb::RED],
            FractalKind::Multibrot => vec![Rgb::BLACK, Rgb::YELLOW, Rgb::RED],
            FractalKind::Tricorn => vec![Rgb::RED, Rgb::YELLOW, Rgb::BLUE],
            FractalKind::Newton => newton_palette(5),
            FractalKind::Buddhabrot | FractalKind::Nebulabrot => vec![Rgb::WHITE, Rgb::BLACK],
        }
    }
}

/// One colour per root, cycling through eight, then black for the
/// points that never converged.
pub fn newton_palette(order: usize) -> Vec<Rgb> {
    const ROOT_COLOURS: [Rgb; 8] = [
        Rgb::RED,
        Rgb::BLUE,
        Rgb::GREEN,
        Rgb::YELLOW,
        Rgb::CYAN,
        Rgb::MAGENTA,
        Rgb::ORANGE,
        Rgb::PINK,
    ];
    let mut palette: Vec<Rgb> = (0..order).map(|i| ROOT_COLOURS[i % 8]).collect();
    palette.push(Rgb::BLACK);
    palette
}

impl FromStr for FractalKind {
    type Err = FractalError;

    fn from_str(s: &str) -> Result<FractalKind, FractalError> {
        match s.to_lowercase().as_str() {
            "mandelbrot" => Ok(FractalKind::Mandelbrot),
            "julia" => Ok(FractalKind::Julia),
            "newton" => Ok(FractalKind::Newton),
            "burningship" | "burning-ship" | "burning_ship" => Ok(FractalKind::BurningShip),
            "multibrot" => Ok(FractalKind::Multibrot),
            "tricorn" => Ok(FractalKind::Tricorn),
            "buddhabrot" | "bhuddabrot" => Ok(FractalKind::Buddhabrot),
            "nebulabrot" => Ok(FractalKind::Nebulabrot),
            _ => Err(FractalError::Configuration(format!(
                "unknown fractal '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for FractalKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            FractalKind::Mandelbrot => "mandelbrot",
            FractalKind::Julia => "julia",
            FractalKind::Newton => "newton",
            FractalKind::BurningShip => "burningship",
            FractalKind::Multibrot => "multibrot",
            FractalKind::Tricorn => "tricorn",
            FractalKind::Buddhabrot => "buddhabrot",
            FractalKind::Nebulabrot => "nebulabrot",
        };
        write!(f, "{}", name)
    }
}

/// What every renderer is constructed with.
#[derive(Clone, Debug, PartialEq)]
pub struct FractalConfig {
    /// The point under the middle of the image.
    pub center: ComplexValue,
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// 1 shows a height of 4 on the complex plane.
    pub zoom: f64,
    /// Iteration budget per point.
    pub max_iterations: usize,
    /// How classifications are shaded.
    pub style: ColorStyle,
    /// Escape-time or histogram-equalized colouring.
    pub mode: ColorMode,
    /// Worker count; `None` uses one per hardware thread.
    pub workers: Option<usize>,
    /// When false, every job runs on the calling thread.
    pub multithreading: bool,
    /// Whether `create_fractal` finishes with an anti-aliasing pass.
    pub supersampling: bool,
}

impl Default for FractalConfig {
    fn default() -> FractalConfig {
        FractalConfig {
            center: Complex::new(0.0, 0.0),
            width: 800,
            height: 480,
            zoom: 1.0,
            max_iterations: 100,
            style: ColorStyle::TwoColour,
            mode: ColorMode::EscapeTime,
            workers: None,
            multithreading: true,
            supersampling: true,
        }
    }
}

impl FractalConfig {
    /// The view each kind of fractal opens with.
    pub fn for_kind(kind: FractalKind) -> FractalConfig {
        let base = FractalConfig::default();
        match kind {
            FractalKind::Mandelbrot => FractalConfig {
                max_iterations: 1000,
                style: ColorStyle::Rainbow,
                ..base
            },
            FractalKind::Julia => FractalConfig {
                max_iterations: 150,
                ..base
            },
            FractalKind::Newton => FractalConfig {
                max_iterations: 40,
                style: ColorStyle::ThreeColour,
                ..base
            },
            FractalKind::BurningShip => FractalConfig {
                center: Complex::new(-1.7, 0.0),
                zoom: 25.0,
                max_iterations: 150,
                style: ColorStyle::ThreeColour,
                ..base
            },
            FractalKind::Multibrot => FractalConfig {
                style: ColorStyle::Rainbow,
                ..base
            },
            FractalKind::Tricorn => FractalConfig {
                max_iterations: 40,
                ..base
            },
            FractalKind::Buddhabrot | FractalKind::Nebulabrot => FractalConfig {
                center: Complex::new(-0.4, 0.0),
                supersampling: false,
                ..base
            },
        }
    }

    /// The same settings for an image of another size.
    pub fn with_size(self, width: usize, height: usize) -> FractalConfig {
        FractalConfig {
            width,
            height,
            ..self
        }
    }
}

/// Orbit-accumulation settings for the Buddhabrot and Nebulabrot.
#[derive(Clone, Debug, PartialEq)]
pub struct TrajectoryConfig {
    /// How many random starting points to follow.
    pub points: usize,
    /// Starting points are drawn with a magnitude in `[radius.0, radius.1)`.
    pub radius: (f64, f64),
    /// Per-channel (red, green, blue) fraction of the iteration budget.
    pub channel_coefficients: [f64; 3],
    /// Fixes the random sequence, for reproducible images.
    pub rng_seed: Option<u64>,
}

impl Default for TrajectoryConfig {
    fn default() -> TrajectoryConfig {
        TrajectoryConfig {
            points: 1_000_000,
            radius: (0.0, 2.0),
            channel_coefficients: [1.0, 0.7, 0.3],
            rng_seed: None,
        }
    }
}

impl TrajectoryConfig {
    /// Rejects an empty radius band or a negative channel coefficient.
    pub fn validate(&self) -> Result<(), FractalError> {
        let (low, high) = self.radius;
        if !(low.is_finite() && high.is_finite() && low >= 0.0 && low < high) {
            return Err(FractalError::Configuration(format!(
                "radius band [{}, {}) is empty",
                low, high
            )));
        }
        if self
            .channel_coefficients
            .iter()
            .any(|c| !(c.is_finite() && *c >= 0.0))
        {
            return Err(FractalError::Configuration(
                "channel coefficients must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// The parameters that differ between fractals.  Unset values take the
/// kind's defaults.
#[derive(Clone, Debug, Default)]
pub struct VariantParams {
    /// Exponent for Julia, Multibrot and Tricorn.
    pub power: Option<f64>,
    /// The Julia constant.
    pub c: Option<ComplexValue>,
    /// The Newton target polynomial.
    pub polynomial: Option<Polynomial>,
    /// Seed settings for the trajectory kinds.
    pub trajectory: TrajectoryConfig,
}

impl VariantParams {
    /// Builds the iterator for an escape-time kind.  The trajectory kinds
    /// classify their seeds with the Mandelbrot rule.
    pub fn iterator(&self, kind: FractalKind, max_iterations: usize) -> Result<EscapeIterator, FractalError> {
        let mut iterator = match kind {
            FractalKind::Mandelbrot | FractalKind::Buddhabrot | FractalKind::Nebulabrot => {
                EscapeIterator::mandelbrot(max_iterations)
            }
            FractalKind::Julia => EscapeIterator::julia(
                self.c.unwrap_or_else(|| Complex::new(-0.835, 0.2321)),
                2.0,
                max_iterations,
            ),
            FractalKind::Multibrot => EscapeIterator::multibrot(2.3568, max_iterations),
            FractalKind::Tricorn => EscapeIterator::tricorn(max_iterations),
            FractalKind::BurningShip => EscapeIterator::burning_ship(max_iterations),
            FractalKind::Newton => match self.polynomial {
                Some(ref f) => EscapeIterator::newton(f.clone(), max_iterations)?,
                None => EscapeIterator::new(
                    Variant::Newton(Newton::fifth_roots_of_unity()),
                    max_iterations,
                ),
            },
        };
        if let Some(power) = self.power {
            match kind {
                FractalKind::Julia | FractalKind::Multibrot | FractalKind::Tricorn => {
                    iterator.set_power(power)?
                }
                _ => {
                    return Err(FractalError::Configuration(format!(
                        "{} has no exponent to set",
                        kind
                    )))
                }
            }
        }
        Ok(iterator)
    }
}
