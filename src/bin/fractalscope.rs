// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate failure;
extern crate fractalscope;
extern crate image;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::Error;
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use num::Complex;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use fractalscope::{
    build_fractal, rgb_bytes, ColorMode, ColorStyle, FractalConfig, FractalKind, Polynomial,
    VariantParams,
};

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

/// Coefficients of the polynomial, constant term first.
fn parse_coefficients(s: &str) -> Option<Vec<f64>> {
    s.split(',').map(|c| f64::from_str(c.trim()).ok()).collect()
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_parse<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(err.to_string()),
    }
}

const OUTPUT: &str = "output";
const FRACTAL: &str = "fractal";
const SIZE: &str = "size";
const CENTER: &str = "center";
const ZOOM: &str = "zoom";
const ITERATIONS: &str = "iterations";
const THREADS: &str = "threads";
const STYLE: &str = "style";
const MODE: &str = "mode";
const POWER: &str = "power";
const CONSTANT: &str = "constant";
const POLYNOMIAL: &str = "polynomial";
const POINTS: &str = "points";
const SEED: &str = "seed";
const NO_SUPERSAMPLE: &str = "no-supersample";
const SINGLE_THREADED: &str = "single-threaded";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = 4 * num_cpus::get();

    App::new("fractalscope")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Escape-time, Newton and Buddhabrot fractal renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (binary PPM)"),
        )
        .arg(
            Arg::with_name(FRACTAL)
                .long(FRACTAL)
                .short("f")
                .takes_value(true)
                .default_value("mandelbrot")
                .validator(|s| validate_parse::<FractalKind>(&s, "Unknown fractal"))
                .help("mandelbrot, julia, newton, burningship, multibrot, tricorn, buddhabrot or nebulabrot"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image, as WIDTHxHEIGHT"),
        )
        .arg(
            Arg::with_name(CENTER)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse centre"))
                .help("Centre of the image on the complex plane, as RE,IM"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse zoom level",
                        "Zoom level must be positive",
                    )
                })
                .help("Zoom level; 1 shows a height of 4 on the complex plane"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Maximum number of iterations per point"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of worker threads (default: one per CPU)"),
        )
        .arg(
            Arg::with_name(STYLE)
                .long(STYLE)
                .takes_value(true)
                .validator(|s| validate_parse::<ColorStyle>(&s, "Unknown colour style"))
                .help("none, rainbow, three or two"),
        )
        .arg(
            Arg::with_name(MODE)
                .long(MODE)
                .takes_value(true)
                .validator(|s| validate_parse::<ColorMode>(&s, "Unknown colour mode"))
                .help("escape or histogram"),
        )
        .arg(
            Arg::with_name(POWER)
                .long(POWER)
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_parse::<f64>(&s, "Could not parse exponent"))
                .help("Exponent for julia, multibrot and tricorn"),
        )
        .arg(
            Arg::with_name(CONSTANT)
                .long(CONSTANT)
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse Julia constant"))
                .help("Julia constant, as RE,IM"),
        )
        .arg(
            Arg::with_name(POLYNOMIAL)
                .long(POLYNOMIAL)
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| match parse_coefficients(&s) {
                    Some(_) => Ok(()),
                    None => Err("Could not parse polynomial coefficients".to_string()),
                })
                .help("Newton polynomial coefficients, constant term first, e.g. -1,0,0,1"),
        )
        .arg(
            Arg::with_name(POINTS)
                .long(POINTS)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        100_000_000,
                        "Could not parse point count",
                        "Point count must be between 1 and 100000000",
                    )
                })
                .help("Random starting points for buddhabrot and nebulabrot"),
        )
        .arg(
            Arg::with_name(SEED)
                .long(SEED)
                .takes_value(true)
                .validator(|s| validate_parse::<u64>(&s, "Could not parse random seed"))
                .help("Fixes the random starting points"),
        )
        .arg(
            Arg::with_name(NO_SUPERSAMPLE)
                .long(NO_SUPERSAMPLE)
                .help("Skip the anti-aliasing pass"),
        )
        .arg(
            Arg::with_name(SINGLE_THREADED)
                .long(SINGLE_THREADED)
                .help("Render on the calling thread only"),
        )
        .get_matches()
}

/// Fetches and parses an argument that the validators have already
/// checked.
fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>, Error> {
    match matches.value_of(name) {
        None => Ok(None),
        Some(s) => T::from_str(s)
            .map(Some)
            .map_err(|_| format_err!("Could not parse --{} '{}'", name, s)),
    }
}

fn write_image(outfile: &str, pixels: &[u8], bounds: (usize, usize)) -> Result<(), std::io::Error> {
    let path = Path::new(outfile);
    let output = File::create(&path)?;
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
    encoder.encode(pixels, bounds.0 as u32, bounds.1 as u32, ColorType::RGB(8))?;
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let kind: FractalKind = value(matches, FRACTAL)?.unwrap_or(FractalKind::Mandelbrot);
    let mut config = FractalConfig::for_kind(kind);
    if let Some(size) = matches.value_of(SIZE) {
        let (width, height) =
            parse_pair::<usize>(size, 'x').ok_or_else(|| format_err!("Error parsing image dimensions"))?;
        config = config.with_size(width, height);
    }
    if let Some(center) = matches.value_of(CENTER) {
        config.center = parse_complex(center).ok_or_else(|| format_err!("Error parsing centre"))?;
    }
    if let Some(zoom) = value(matches, ZOOM)? {
        config.zoom = zoom;
    }
    if let Some(iterations) = value(matches, ITERATIONS)? {
        config.max_iterations = iterations;
    }
    if let Some(style) = value(matches, STYLE)? {
        config.style = style;
    }
    if let Some(mode) = value(matches, MODE)? {
        config.mode = mode;
    }
    config.workers = value(matches, THREADS)?;
    config.multithreading = !matches.is_present(SINGLE_THREADED);
    if matches.is_present(NO_SUPERSAMPLE) {
        config.supersampling = false;
    }

    let mut params = VariantParams::default();
    params.power = value(matches, POWER)?;
    if let Some(c) = matches.value_of(CONSTANT) {
        params.c = Some(parse_complex(c).ok_or_else(|| format_err!("Error parsing Julia constant"))?);
    }
    if let Some(p) = matches.value_of(POLYNOMIAL) {
        let coefficients =
            parse_coefficients(p).ok_or_else(|| format_err!("Error parsing polynomial"))?;
        params.polynomial = Some(Polynomial::from_real(&coefficients));
    }
    if let Some(points) = value(matches, POINTS)? {
        params.trajectory.points = points;
    }
    params.trajectory.rng_seed = value(matches, SEED)?;

    let mut fractal = build_fractal(kind, &config, &params)?;
    fractal.create_fractal()?;
    let (width, height) = fractal.dimensions();
    let outfile = matches.value_of(OUTPUT).unwrap_or("fractal.ppm");
    write_image(outfile, &rgb_bytes(fractal.pixel_buffer()), (width, height))?;
    info!("wrote {}x{} {} to {}", width, height, kind, outfile);
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
