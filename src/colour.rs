// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colouring algorithms.
//!
//! A `ColorMapper` holds one colour ramp per classification, each as
//! long as the iteration budget, and turns a (classification, iteration
//! count) pair into a colour.  Histogram colouring
//! ([Wikipedia](https://en.wikipedia.org/wiki/Plotting_algorithms_for_the_Mandelbrot_set#Histogram_coloring))
//! replaces the ramp lookup with a hue taken from the cumulative
//! distribution of iteration counts across the whole image.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use errors::FractalError;

/// A plain 8-bit RGB colour.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Black.
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    /// White.
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    /// Red.
    pub const RED: Rgb = Rgb(255, 0, 0);
    /// Green.
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    /// Blue.
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    /// Yellow.
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
    /// Cyan.
    pub const CYAN: Rgb = Rgb(0, 255, 255);
    /// Magenta.
    pub const MAGENTA: Rgb = Rgb(255, 0, 255);
    /// Orange.
    pub const ORANGE: Rgb = Rgb(255, 200, 0);
    /// Pink.
    pub const PINK: Rgb = Rgb(255, 175, 175);

    /// Builds a colour from components in [0, 1], clamping anything
    /// outside.
    pub fn from_unit(r: f32, g: f32, b: f32) -> Rgb {
        Rgb(channel(r), channel(g), channel(b))
    }

    /// Converts hue, saturation and brightness to RGB.  Only the
    /// fractional part of the hue is used.
    pub fn from_hsb(hue: f32, saturation: f32, brightness: f32) -> Rgb {
        if saturation == 0.0 {
            let v = channel(brightness);
            return Rgb(v, v, v);
        }
        let h = (hue - hue.floor()) * 6.0;
        let f = h - h.floor();
        let p = brightness * (1.0 - saturation);
        let q = brightness * (1.0 - saturation * f);
        let t = brightness * (1.0 - saturation * (1.0 - f));
        let (r, g, b) = match h as u32 {
            0 => (brightness, t, p),
            1 => (q, brightness, p),
            2 => (p, brightness, t),
            3 => (p, q, brightness),
            4 => (t, p, brightness),
            _ => (brightness, p, q),
        };
        Rgb::from_unit(r, g, b)
    }

    /// The colour as `0xRRGGBB`.
    pub fn packed(self) -> u32 {
        (u32::from(self.0) << 16) | (u32::from(self.1) << 8) | u32::from(self.2)
    }

    /// Unpacks a `0xRRGGBB` value.
    pub fn from_packed(packed: u32) -> Rgb {
        Rgb(
            ((packed >> 16) & 0xff) as u8,
            ((packed >> 8) & 0xff) as u8,
            (packed & 0xff) as u8,
        )
    }

    fn unit(self) -> [f32; 3] {
        [
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        ]
    }

    /// Linear blend: `f = 0` gives `from`, `f = 1` gives `to`.
    fn blend(from: Rgb, to: Rgb, f: f32) -> Rgb {
        let (a, b) = (from.unit(), to.unit());
        Rgb::from_unit(
            (1.0 - f) * a[0] + f * b[0],
            (1.0 - f) * a[1] + f * b[1],
            (1.0 - f) * a[2] + f * b[2],
        )
    }
}

fn channel(v: f32) -> u8 {
    let v = if v < 0.0 {
        0.0
    } else if v > 1.0 {
        1.0
    } else {
        v
    };
    (v * 255.0 + 0.5) as u8
}

/// Unpacks a row-major `0xRRGGBB` buffer into interleaved bytes, the
/// layout image encoders expect.
pub fn rgb_bytes(pixels: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pixels.len() * 3);
    for &p in pixels {
        let Rgb(r, g, b) = Rgb::from_packed(p);
        bytes.extend_from_slice(&[r, g, b]);
    }
    bytes
}

/// How the per-classification ramps are built.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorStyle {
    /// One flat colour per classification.
    NoShading,
    /// A repeating rainbow hue per iteration count.
    Rainbow,
    /// Each classification's base colour eased toward the last one.
    ThreeColour,
    /// The second base colour eased toward the first, for every
    /// classification.
    TwoColour,
}

impl FromStr for ColorStyle {
    type Err = FractalError;

    fn from_str(s: &str) -> Result<ColorStyle, FractalError> {
        match s.to_lowercase().as_str() {
            "none" | "flat" | "no_shading" => Ok(ColorStyle::NoShading),
            "rainbow" => Ok(ColorStyle::Rainbow),
            "three" | "threecolour" | "threecolor" => Ok(ColorStyle::ThreeColour),
            "two" | "twocolour" | "twocolor" => Ok(ColorStyle::TwoColour),
            _ => Err(FractalError::Configuration(format!(
                "unknown colour style '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for ColorStyle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            ColorStyle::NoShading => "none",
            ColorStyle::Rainbow => "rainbow",
            ColorStyle::ThreeColour => "three",
            ColorStyle::TwoColour => "two",
        };
        write!(f, "{}", name)
    }
}

/// How a pixel's colour is chosen from its iteration count.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorMode {
    /// Look the count up in the classification's ramp.
    EscapeTime,
    /// Hue from the cumulative distribution of all counts.
    Histogram,
}

impl FromStr for ColorMode {
    type Err = FractalError;

    fn from_str(s: &str) -> Result<ColorMode, FractalError> {
        match s.to_lowercase().as_str() {
            "escape" | "escape_time" | "escapetime" => Ok(ColorMode::EscapeTime),
            "histogram" => Ok(ColorMode::Histogram),
            _ => Err(FractalError::Configuration(format!(
                "unknown colour mode '{}'",
                s
            ))),
        }
    }
}

/// Colour ramps for every classification.
#[derive(Clone, Debug)]
pub struct ColorMapper {
    style: ColorStyle,
    base: Vec<Rgb>,
    map: Vec<Vec<Rgb>>,
    interior: Option<usize>,
}

impl ColorMapper {
    /// Builds `base.len()` ramps of `steps` colours each.  The base
    /// palette should hold `order + 1` colours.
    pub fn new(style: ColorStyle, base: &[Rgb], steps: usize) -> ColorMapper {
        let base: Vec<Rgb> = if base.is_empty() {
            vec![Rgb::BLACK]
        } else {
            base.to_vec()
        };
        let last = base[base.len() - 1];
        let first = base[0];
        let second = *base.get(1).unwrap_or(&last);
        let ease = |k: usize| ((PI / 2.0) * (k as f64) / (steps as f64)).sin() as f32;

        let map = base
            .iter()
            .map(|&own| match style {
                ColorStyle::NoShading => vec![own; steps],
                ColorStyle::Rainbow => (0..steps)
                    .map(|k| Rgb::from_hsb(((k % 360) as f32) / 360.0 + 0.05, 1.0, 1.0))
                    .collect(),
                ColorStyle::TwoColour => (0..steps)
                    .map(|k| Rgb::blend(second, first, ease(k)))
                    .collect(),
                ColorStyle::ThreeColour => (0..steps)
                    .map(|k| Rgb::blend(own, last, ease(k)))
                    .collect(),
            })
            .collect();

        ColorMapper {
            style,
            base,
            map,
            interior: Some(0),
        }
    }

    /// Which classification, if any, is the inside of the set and is
    /// always drawn in its flat base colour.
    pub fn with_interior(mut self, interior: Option<usize>) -> ColorMapper {
        self.interior = interior;
        self
    }

    /// The ramp style the table was built with.
    pub fn style(&self) -> ColorStyle {
        self.style
    }

    /// The flat colour of a classification.  Classifications beyond the
    /// palette use the last colour.
    pub fn base(&self, classification: usize) -> Rgb {
        match self.base.get(classification) {
            Some(&c) => c,
            None => self.base[self.base.len() - 1],
        }
    }

    /// The ramp entry for a classification after `iterations` steps.
    pub fn ramp(&self, classification: usize, iterations: usize) -> Rgb {
        let step = iterations.saturating_sub(1);
        self.map
            .get(classification)
            .and_then(|ramp| ramp.get(step).or_else(|| ramp.last()))
            .cloned()
            .unwrap_or_else(|| self.base(classification))
    }

    /// Escape-time colouring.
    pub fn resolve(&self, classification: usize, iterations: usize) -> Rgb {
        if self.style == ColorStyle::NoShading || self.interior == Some(classification) {
            return self.base(classification);
        }
        self.ramp(classification, iterations)
    }

    /// Histogram colouring; the interior stays flat.
    pub fn resolve_equalized(
        &self,
        classification: usize,
        iterations: usize,
        equalizer: &HistogramEqualizer,
    ) -> Rgb {
        if self.interior == Some(classification) {
            return self.base(classification);
        }
        Rgb::from_hsb(equalizer.hue(iterations), 1.0, 1.0)
    }
}

/// Cumulative distribution of iteration counts.
#[derive(Clone, Debug)]
pub struct HistogramEqualizer {
    cumulative: Vec<u64>,
    total: u64,
}

impl HistogramEqualizer {
    /// Takes the per-count pixel totals, indexed by iteration count.  The
    /// final bucket (pixels that used the whole budget) is left out of the
    /// total.
    pub fn new(histogram: &[u64]) -> HistogramEqualizer {
        let counted = histogram.len().saturating_sub(1);
        let mut cumulative = Vec::with_capacity(counted + 1);
        let mut running = 0;
        cumulative.push(0);
        for &bucket in &histogram[..counted] {
            running += bucket;
            cumulative.push(running);
        }
        HistogramEqualizer {
            cumulative,
            total: running,
        }
    }

    /// The fraction of counted pixels that needed fewer than `iterations`
    /// iterations.
    pub fn hue(&self, iterations: usize) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        let below = match self.cumulative.get(iterations) {
            Some(&c) => c,
            None => self.total,
        };
        (below as f64 / self.total as f64) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsb_primaries() {
        assert_eq!(Rgb::from_hsb(0.0, 1.0, 1.0), Rgb::RED);
        assert_eq!(Rgb::from_hsb(1.0 / 3.0, 1.0, 1.0), Rgb::GREEN);
        assert_eq!(Rgb::from_hsb(2.0 / 3.0, 1.0, 1.0), Rgb::BLUE);
        assert_eq!(Rgb::from_hsb(1.0, 1.0, 1.0), Rgb::RED);
        assert_eq!(Rgb::from_hsb(0.5, 0.0, 1.0), Rgb::WHITE);
    }

    #[test]
    fn packing() {
        assert_eq!(Rgb(0x12, 0x34, 0x56).packed(), 0x0012_3456);
        assert_eq!(Rgb::from_packed(0x00ab_cdef), Rgb(0xab, 0xcd, 0xef));
        assert_eq!(rgb_bytes(&[0x00ff_0000, 0x0000_00ff]), vec![255, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn unit_components_clamp() {
        assert_eq!(Rgb::from_unit(-1.0, 0.5, 2.0), Rgb(0, 128, 255));
    }

    #[test]
    fn flat_style_ignores_steps() {
        let m = ColorMapper::new(ColorStyle::NoShading, &[Rgb::BLACK, Rgb::YELLOW, Rgb::BLUE], 10);
        assert_eq!(m.resolve(1, 1), Rgb::YELLOW);
        assert_eq!(m.resolve(1, 9), Rgb::YELLOW);
        assert_eq!(m.resolve(2, 5), Rgb::BLUE);
    }

    #[test]
    fn two_colour_eases_from_second_to_first() {
        let m = ColorMapper::new(ColorStyle::TwoColour, &[Rgb::WHITE, Rgb::BLACK], 100);
        assert_eq!(m.resolve(1, 1), Rgb::BLACK);
        let late = m.resolve(1, 100);
        assert!(late.0 > 250);
        let mid = m.resolve(1, 50);
        assert!(mid.0 > 100 && mid.0 < late.0);
    }

    #[test]
    fn three_colour_eases_toward_the_last_colour() {
        let m = ColorMapper::new(
            ColorStyle::ThreeColour,
            &[Rgb::BLACK, Rgb::YELLOW, Rgb::BLUE],
            1000,
        );
        assert_eq!(m.resolve(1, 1), Rgb::YELLOW);
        let end = m.resolve(1, 1000);
        assert!(end.2 > 250 && end.0 < 5);
    }

    #[test]
    fn rainbow_starts_near_red() {
        let m = ColorMapper::new(ColorStyle::Rainbow, &[Rgb::BLACK, Rgb::BLACK, Rgb::BLACK], 400);
        assert_eq!(m.resolve(1, 1), Rgb::from_hsb(0.05, 1.0, 1.0));
        assert_eq!(m.resolve(1, 361), m.resolve(1, 1));
    }

    #[test]
    fn interior_is_flat() {
        let m = ColorMapper::new(ColorStyle::Rainbow, &[Rgb::BLACK, Rgb::RED, Rgb::BLUE], 50);
        assert_eq!(m.resolve(0, 17), Rgb::BLACK);
        let newton = m.with_interior(None);
        assert_ne!(newton.resolve(0, 17), Rgb::BLACK);
    }

    #[test]
    fn out_of_range_lookups_fall_back() {
        let m = ColorMapper::new(ColorStyle::TwoColour, &[Rgb::WHITE, Rgb::BLACK], 10);
        assert_eq!(m.resolve(5, 3), m.base(1));
        assert_eq!(m.resolve(1, 0), Rgb::BLACK);
        assert_eq!(m.resolve(1, 500), m.resolve(1, 10));
    }

    #[test]
    fn equalized_hue_is_the_cumulative_fraction() {
        // Two pixels at 1 iteration, two at 3, the rest used the budget.
        let eq = HistogramEqualizer::new(&[0, 2, 0, 2, 9]);
        assert_eq!(eq.hue(1), 0.0);
        assert_eq!(eq.hue(2), 0.5);
        assert_eq!(eq.hue(3), 0.5);
        assert_eq!(eq.hue(4), 1.0);
        assert_eq!(eq.hue(40), 1.0);
        assert_eq!(HistogramEqualizer::new(&[0, 0]).hue(1), 0.0);
    }

    #[test]
    fn styles_parse() {
        assert_eq!("rainbow".parse::<ColorStyle>().unwrap(), ColorStyle::Rainbow);
        assert_eq!("TWO".parse::<ColorStyle>().unwrap(), ColorStyle::TwoColour);
        assert!("plaid".parse::<ColorStyle>().is_err());
        assert_eq!("histogram".parse::<ColorMode>().unwrap(), ColorMode::Histogram);
    }
}
