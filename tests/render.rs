// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate fractalscope;
extern crate num;

use fractalscope::trajectory::channel_of;
use fractalscope::{
    Accumulation, ColorMode, EscapeIterator, Fractal, FractalConfig, FractalEngine, FractalKind,
    Polynomial, TrajectoryConfig, TrajectoryEngine, VariantParams,
};
use num::Complex;

fn config(kind: FractalKind, width: usize, height: usize, multithreading: bool) -> FractalConfig {
    FractalConfig {
        workers: Some(4),
        multithreading,
        ..FractalConfig::for_kind(kind)
    }
    .with_size(width, height)
}

fn engine(kind: FractalKind, multithreading: bool) -> FractalEngine {
    let c = FractalConfig {
        max_iterations: 120,
        ..config(kind, 64, 48, multithreading)
    };
    let iterator = VariantParams::default().iterator(kind, c.max_iterations).unwrap();
    FractalEngine::new(&c, iterator).unwrap()
}

#[test]
fn parallel_render_matches_serial_render() {
    let kinds = [
        FractalKind::Mandelbrot,
        FractalKind::Julia,
        FractalKind::BurningShip,
        FractalKind::Multibrot,
        FractalKind::Tricorn,
    ];
    for &kind in &kinds {
        let mut serial = engine(kind, false);
        let mut parallel = engine(kind, true);
        serial.create_fractal().unwrap();
        parallel.create_fractal().unwrap();
        assert_eq!(serial.pixels(), parallel.pixels(), "{}", kind);
        assert_eq!(serial.histogram(), parallel.histogram(), "{}", kind);
        assert_eq!(serial.pixel_buffer(), parallel.pixel_buffer(), "{}", kind);
    }
}

#[test]
fn centre_of_a_small_mandelbrot_is_in_the_set() {
    let c = FractalConfig {
        max_iterations: 50,
        zoom: 1.0,
        center: Complex::new(0.0, 0.0),
        ..config(FractalKind::Mandelbrot, 100, 100, true)
    };
    let mut fractal = FractalEngine::new(&c, EscapeIterator::mandelbrot(50)).unwrap();
    fractal.create_fractal().unwrap();
    assert_eq!(fractal.pixel(50, 50).unwrap().classification, 0);
}

#[test]
fn newton_colours_every_pixel_by_root() {
    let c = FractalConfig {
        max_iterations: 40,
        ..config(FractalKind::Newton, 60, 60, true)
    };
    let cubic = Polynomial::from_real(&[-1.0, 0.0, 0.0, 1.0]);
    let mut fractal = FractalEngine::new(&c, EscapeIterator::newton(cubic, 40).unwrap()).unwrap();
    fractal.create_fractal().unwrap();

    let roots = fractal.iterator().roots();
    assert_eq!(roots.len(), 3);
    for root in &roots {
        assert!((root.norm() - 1.0).abs() < 1e-6);
    }
    let mut seen = [false; 4];
    for pixel in fractal.pixels() {
        assert!(pixel.classification <= 3);
        seen[pixel.classification] = true;
    }
    assert!(seen[0] && seen[1] && seen[2]);
}

#[test]
fn histogram_mode_uses_the_whole_image() {
    let mut fractal = engine(FractalKind::Mandelbrot, true);
    fractal.set_color_mode(ColorMode::Histogram);
    fractal.create_fractal().unwrap();
    let total: u64 = fractal.histogram().iter().sum();
    assert_eq!(total, 64 * 48);
    let distinct: std::collections::HashSet<u32> = fractal.pixel_buffer().iter().cloned().collect();
    assert!(distinct.len() > 2);
}

#[test]
fn seed_bands_follow_the_seed_index() {
    let total = 3001;
    let k = total / 3;
    for index in 0..total {
        let expected = if index < k {
            0
        } else if index < 2 * k {
            1
        } else {
            2
        };
        assert_eq!(channel_of(index, total), expected);
    }
}

fn nebula(multithreading: bool) -> TrajectoryEngine {
    let c = FractalConfig {
        max_iterations: 80,
        ..config(FractalKind::Nebulabrot, 48, 32, multithreading)
    };
    let trajectory = TrajectoryConfig {
        points: 5000,
        rng_seed: Some(2024),
        ..TrajectoryConfig::default()
    };
    TrajectoryEngine::new(&c, trajectory, Accumulation::ThreeChannel).unwrap()
}

#[test]
fn trajectory_workers_sum_to_the_serial_histogram() {
    let mut serial = nebula(false);
    let mut parallel = nebula(true);
    serial.create_fractal().unwrap();
    parallel.create_fractal().unwrap();
    assert_eq!(serial.visits(), parallel.visits());
    assert_eq!(serial.pixel_buffer(), parallel.pixel_buffer());
    assert_eq!(serial.dropped_samples(), parallel.dropped_samples());
}

#[test]
fn rerendering_reuses_live_seeds() {
    let mut fractal = nebula(true);
    fractal.create_fractal().unwrap();
    let live = fractal.seeds().live();

    fractal.set_num_random_points(5000);
    fractal.create_fractal().unwrap();
    assert_eq!(fractal.seeds().len(), 5000);
    assert_eq!(&fractal.seeds().points()[..live.len()], &live[..]);
}
