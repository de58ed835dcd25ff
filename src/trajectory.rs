// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Buddhabrot and Nebulabrot renderer
//!
//! This engine draws where escaping orbits go rather than how fast they
//! leave.  It picks a great many random starting points, throws away
//! the ones that never escape, and follows the orbit of each survivor
//! on its way out.  Every iterate that lands on the image increments the
//! pixel under it, and the resulting visit counts are the picture.
//!
//! The Nebulabrot keeps three histograms instead of one.  The seeds are
//! split into three equal bands, one per colour channel, and each
//! channel only counts iterates below its own fraction of the
//! iteration budget, so the channels pick out orbits of different
//! lengths.
//!
//! A render moves through the stages of `TrajectoryState` in order:
//! seeds are drawn, classified, walked, and the counts normalized into
//! colours.

use std::f64::consts::PI;
use std::time::Instant;

use num::Complex;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use colour::{ColorMapper, ColorStyle, Rgb};
use complex::ComplexValue;
use config::{FractalConfig, TrajectoryConfig};
use errors::FractalError;
use fractal::Fractal;
use iterators::{EscapeIterator, ESCAPED, ESCAPE_RADIUS_SQR};
use partition::Partitioner;
use planes::Viewport;

/// Where a trajectory render has got to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrajectoryState {
    /// Nothing drawn yet.
    Unseeded,
    /// Seeds drawn, histograms cleared.
    Seeded,
    /// Non-escaping seeds marked spent.
    Classified,
    /// Orbits walked and histograms merged.
    Accumulated,
    /// Colours computed.
    Normalized,
}

/// One histogram, or one per colour channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Accumulation {
    /// One histogram, coloured through the palette.
    Single,
    /// Red, green and blue histograms.
    ThreeChannel,
}

impl Accumulation {
    fn channels(self) -> usize {
        match self {
            Accumulation::Single => 1,
            Accumulation::ThreeChannel => 3,
        }
    }

    fn channel(self, index: usize, total: usize) -> usize {
        match self {
            Accumulation::Single => 0,
            Accumulation::ThreeChannel => channel_of(index, total),
        }
    }
}

/// The colour channel of the `index`th of `total` seeds: the seeds are
/// cut into bands `[0, k)`, `[k, 2k)` and the rest, with `k = total / 3`.
pub fn channel_of(index: usize, total: usize) -> usize {
    let k = total / 3;
    if index < k {
        0
    } else if index < 2 * k {
        1
    } else {
        2
    }
}

/// Per-pixel visit counts, one array per channel.
#[derive(Clone, Debug, PartialEq)]
pub struct VisitHistogram {
    channels: Vec<Vec<u64>>,
}

impl VisitHistogram {
    /// Zeroed counters, `pixels` per channel.
    pub fn new(channels: usize, pixels: usize) -> VisitHistogram {
        VisitHistogram {
            channels: vec![vec![0; pixels]; channels],
        }
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    /// The counters of one channel.
    pub fn channel(&self, channel: usize) -> &[u64] {
        &self.channels[channel]
    }

    /// Adds another histogram of the same shape into this one.
    pub fn merge(&mut self, other: &VisitHistogram) {
        for (mine, theirs) in self.channels.iter_mut().zip(other.channels.iter()) {
            for (total, &count) in mine.iter_mut().zip(theirs.iter()) {
                *total += count;
            }
        }
    }

    /// The largest count in any channel.
    pub fn max(&self) -> u64 {
        self.channels
            .iter()
            .flat_map(|channel| channel.iter())
            .cloned()
            .max()
            .unwrap_or(0)
    }

    /// Sum of every counter.
    pub fn total(&self) -> u64 {
        self.channels.iter().map(|c| c.iter().sum::<u64>()).sum()
    }
}

/// Draws starting points uniformly in angle, with a magnitude uniform in
/// a band.
struct SeedSampler(Uniform<f64>, Uniform<f64>);

impl SeedSampler {
    fn new(radius: (f64, f64)) -> SeedSampler {
        SeedSampler(Uniform::new(0.0, 2.0 * PI), Uniform::new(radius.0, radius.1))
    }

    fn get<R: Rng>(&self, rng: &mut R) -> ComplexValue {
        let theta = self.0.sample(rng);
        let r = self.1.sample(rng);
        Complex::new(r * theta.cos(), r * theta.sin())
    }
}

/// The random starting points, and which of them have been used up.  A
/// seed is spent when it does not escape, or when its orbit never
/// touches the image; spent seeds are dropped the next time the set is
/// replenished.
#[derive(Clone, Debug, Default)]
pub struct SeedSet {
    points: Vec<ComplexValue>,
    spent: Vec<bool>,
}

impl SeedSet {
    /// An empty set.
    pub fn new() -> SeedSet {
        SeedSet::default()
    }

    /// Number of seeds, spent or not.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there are no seeds at all.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Every seed, spent or not.
    pub fn points(&self) -> &[ComplexValue] {
        &self.points
    }

    /// The seeds that have not been spent.
    pub fn live(&self) -> Vec<ComplexValue> {
        self.points
            .iter()
            .zip(self.spent.iter())
            .filter(|&(_, &spent)| !spent)
            .map(|(&point, _)| point)
            .collect()
    }

    /// Drops spent seeds, then tops the set up to `count` with fresh ones
    /// (or cuts it down to `count`).  Returns how many were drawn.
    pub fn replenish<R: Rng>(
        &mut self,
        count: usize,
        radius: (f64, f64),
        rng: &mut R,
    ) -> Result<usize, FractalError> {
        if !(radius.0 < radius.1) {
            return Err(FractalError::Configuration(format!(
                "radius band [{}, {}) is empty",
                radius.0, radius.1
            )));
        }
        let mut points = self.live();
        points.truncate(count);
        let drawn = count - points.len();
        let sampler = SeedSampler::new(radius);
        points.extend((0..drawn).map(|_| sampler.get(rng)));
        self.points = points;
        self.spent = vec![false; count];
        Ok(drawn)
    }
}

/// Follows the orbit of `seed`, adding each iterate that lands on the
/// image to `visits` as long as the iteration is below `cutoff`.  Lands
/// that round off the far edge of the image are counted in `dropped`.
/// Returns whether the orbit touched the image at all.
fn walk(
    seed: ComplexValue,
    viewport: &Viewport,
    max_iterations: usize,
    cutoff: f64,
    visits: &mut [u64],
    dropped: &mut u64,
) -> bool {
    let mut z = seed;
    let mut n = 1;
    let mut touched = false;
    while n < max_iterations {
        if viewport.contains(&z) {
            touched = true;
            if (n as f64) < cutoff {
                match viewport.point_to_offset(&z) {
                    Some(offset) => visits[offset] += 1,
                    None => *dropped += 1,
                }
            }
        }
        if z.norm_sqr() > ESCAPE_RADIUS_SQR {
            break;
        }
        n += 1;
        z = z * z + seed;
    }
    touched
}

/// Renders the Buddhabrot and Nebulabrot by accumulating the orbits of
/// random seeds.  Each stage of a render is exposed so that callers can
/// watch `state` move from `Unseeded` to `Normalized`.
pub struct TrajectoryEngine {
    config: FractalConfig,
    trajectory: TrajectoryConfig,
    accumulation: Accumulation,
    iterator: EscapeIterator,
    palette: Vec<Rgb>,
    partitioner: Partitioner,
    rng: StdRng,
    seeds: SeedSet,
    state: TrajectoryState,
    viewport: Option<Viewport>,
    visits: VisitHistogram,
    colours: Vec<u32>,
    dropped: u64,
}

impl TrajectoryEngine {
    /// Fails on bad view or trajectory settings, and when the worker pool
    /// cannot start.
    pub fn new(
        config: &FractalConfig,
        trajectory: TrajectoryConfig,
        accumulation: Accumulation,
    ) -> Result<TrajectoryEngine, FractalError> {
        Viewport::new(config.center, config.zoom, config.width, config.height)?;
        trajectory.validate()?;
        let partitioner = match config.workers {
            Some(workers) => Partitioner::new(workers)?,
            None => Partitioner::with_available_parallelism()?,
        };
        let rng = match trajectory.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(TrajectoryEngine {
            config: config.clone(),
            trajectory,
            accumulation,
            iterator: EscapeIterator::mandelbrot(config.max_iterations),
            palette: vec![Rgb::WHITE, Rgb::BLACK],
            partitioner,
            rng,
            seeds: SeedSet::new(),
            state: TrajectoryState::Unseeded,
            viewport: None,
            visits: VisitHistogram::new(accumulation.channels(), 0),
            colours: vec![],
            dropped: 0,
        })
    }

    /// Where the render has got to.
    pub fn state(&self) -> TrajectoryState {
        self.state
    }

    /// The current seeds.
    pub fn seeds(&self) -> &SeedSet {
        &self.seeds
    }

    /// The merged visit counts.
    pub fn visits(&self) -> &VisitHistogram {
        &self.visits
    }

    /// Orbit points that were on the image but rounded to a pixel off it.
    pub fn dropped_samples(&self) -> u64 {
        self.dropped
    }

    /// The plane mapped by the last `setup`.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Seeds the next `setup` will top up to.
    pub fn num_random_points(&self) -> usize {
        self.trajectory.points
    }

    /// Takes effect at the next setup, which keeps the live seeds.
    pub fn set_num_random_points(&mut self, points: usize) {
        self.trajectory.points = points;
    }

    /// The rule used to decide which seeds escape.
    pub fn iterator_mut(&mut self) -> &mut EscapeIterator {
        &mut self.iterator
    }

    fn parts(&self) -> usize {
        if self.config.multithreading {
            self.partitioner.workers()
        } else {
            1
        }
    }

    fn expect_state(&self, wanted: TrajectoryState) -> Result<(), FractalError> {
        if self.state != wanted {
            return Err(FractalError::Configuration(format!(
                "trajectory render is {:?}, not {:?}",
                self.state, wanted
            )));
        }
        Ok(())
    }

    /// The fraction of the iteration budget each channel may count.
    fn cutoffs(&self) -> [f64; 3] {
        let max = self.config.max_iterations as f64;
        match self.accumulation {
            Accumulation::Single => [max; 3],
            Accumulation::ThreeChannel => {
                let c = &self.trajectory.channel_coefficients;
                [c[0] * max, c[1] * max, c[2] * max]
            }
        }
    }

    /// Marks every seed that does not escape within its channel's budget
    /// as spent.  Returns the number that escaped.
    pub fn classify(&mut self) -> Result<usize, FractalError> {
        self.expect_state(TrajectoryState::Seeded)?;
        let start = Instant::now();
        let parts = self.parts();
        let cutoffs = self.cutoffs();
        let budgets = [
            cutoffs[0].ceil() as usize,
            cutoffs[1].ceil() as usize,
            cutoffs[2].ceil() as usize,
        ];
        let accumulation = self.accumulation;
        let iterator = &self.iterator;
        let points = &self.seeds.points;
        let total = points.len();
        let escaping: usize = self
            .partitioner
            .map_chunks(parts, &mut self.seeds.spent, 1, |range, spent| {
                let mut escaping = 0;
                for (index, flag) in range.zip(spent.iter_mut()) {
                    let budget = budgets[accumulation.channel(index, total)];
                    if iterator.iterate_with_limit(points[index], budget).classification == ESCAPED {
                        escaping += 1;
                    } else {
                        *flag = true;
                    }
                }
                escaping
            })
            .iter()
            .sum();
        self.state = TrajectoryState::Classified;
        debug!(
            "classified {} seeds, {} escape, in {:?}",
            total,
            escaping,
            start.elapsed()
        );
        Ok(escaping)
    }

    /// Walks every live seed, each worker into a private histogram, then
    /// sums the workers' histograms.
    pub fn accumulate(&mut self) -> Result<(), FractalError> {
        self.expect_state(TrajectoryState::Classified)?;
        let viewport = self.viewport.ok_or_else(|| {
            FractalError::Configuration("the fractal has not been set up".to_string())
        })?;
        let start = Instant::now();
        let parts = self.parts();
        let cutoffs = self.cutoffs();
        let accumulation = self.accumulation;
        let max_iterations = self.config.max_iterations;
        let points = &self.seeds.points;
        let total = points.len();
        let tallies = self
            .partitioner
            .map_chunks(parts, &mut self.seeds.spent, 1, |range, spent| {
                let mut visits = VisitHistogram::new(accumulation.channels(), viewport.len());
                let mut dropped = 0;
                for (index, flag) in range.zip(spent.iter_mut()) {
                    if *flag {
                        continue;
                    }
                    let channel = accumulation.channel(index, total);
                    let touched = walk(
                        points[index],
                        &viewport,
                        max_iterations,
                        cutoffs[channel],
                        &mut visits.channels[channel],
                        &mut dropped,
                    );
                    if !touched {
                        *flag = true;
                    }
                }
                (visits, dropped)
            });

        for &(ref visits, dropped) in &tallies {
            self.visits.merge(visits);
            self.dropped += dropped;
        }
        if self.dropped > 0 {
            debug!("{} orbit points rounded off the image", self.dropped);
        }
        self.state = TrajectoryState::Accumulated;
        debug!("path tracing time: {:?}", start.elapsed());
        Ok(())
    }

    /// Turns visit counts into colours.  A single histogram is coloured
    /// through the palette like an iteration count; three channels are
    /// scaled by the largest count in any of them.
    fn normalize(&mut self) {
        let most = self.visits.max();
        match self.accumulation {
            Accumulation::Single => {
                let mapper = ColorMapper::new(self.config.style, &self.palette, most as usize + 1);
                for (colour, &visits) in self.colours.iter_mut().zip(self.visits.channel(0)) {
                    *colour = mapper.resolve(1, visits as usize + 1).packed();
                }
            }
            Accumulation::ThreeChannel => {
                let scale = if most == 0 { 0.0 } else { 1.0 / most as f32 };
                let (red, green, blue) = (
                    self.visits.channel(0),
                    self.visits.channel(1),
                    self.visits.channel(2),
                );
                for (offset, colour) in self.colours.iter_mut().enumerate() {
                    *colour = Rgb::from_unit(
                        red[offset] as f32 * scale,
                        green[offset] as f32 * scale,
                        blue[offset] as f32 * scale,
                    )
                    .packed();
                }
            }
        }
        info!("max visits for a pixel: {}", most);
        self.state = TrajectoryState::Normalized;
    }
}

impl Fractal for TrajectoryEngine {
    /// Maps the view, replenishes the seeds and clears the histograms.
    fn setup(&mut self) -> Result<(), FractalError> {
        let start = Instant::now();
        let c = &self.config;
        let viewport = Viewport::new(c.center, c.zoom, c.width, c.height)?;
        self.trajectory.validate()?;
        self.iterator.set_max_iterations(c.max_iterations);
        let drawn = self
            .seeds
            .replenish(self.trajectory.points, self.trajectory.radius, &mut self.rng)?;
        self.visits = VisitHistogram::new(self.accumulation.channels(), viewport.len());
        self.colours = vec![0; viewport.len()];
        self.dropped = 0;
        self.viewport = Some(viewport);
        self.state = TrajectoryState::Seeded;
        debug!(
            "setup time: {:?}, {} seeds drawn, {} reused",
            start.elapsed(),
            drawn,
            self.seeds.len() - drawn
        );
        Ok(())
    }

    fn create_fractal(&mut self) -> Result<(), FractalError> {
        let start = Instant::now();
        self.setup()?;
        self.classify()?;
        self.accumulate()?;
        self.normalize();
        info!("create time: {:?}", start.elapsed());
        Ok(())
    }

    /// Recolours the last accumulation; does nothing before there is one.
    fn color_fractal(&mut self) {
        match self.state {
            TrajectoryState::Accumulated | TrajectoryState::Normalized => self.normalize(),
            _ => {}
        }
    }

    /// Orbits cross the whole image, so a moved view is drawn afresh.
    fn translate(&mut self, dx: i64, dy: i64) -> Result<(), FractalError> {
        let viewport = match self.viewport {
            Some(viewport) => viewport,
            None => {
                let c = &self.config;
                Viewport::new(c.center, c.zoom, c.width, c.height)?
            }
        };
        self.config.center = viewport.translated(dx, dy).center();
        self.create_fractal()
    }

    fn center(&self) -> ComplexValue {
        self.config.center
    }

    fn set_center(&mut self, center: ComplexValue) {
        self.config.center = center;
    }

    fn zoom(&self) -> f64 {
        self.config.zoom
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.config.zoom = zoom;
    }

    fn max_iterations(&self) -> usize {
        self.config.max_iterations
    }

    fn set_max_iterations(&mut self, max_iterations: usize) {
        self.config.max_iterations = max_iterations;
    }

    fn set_color_style(&mut self, style: ColorStyle) {
        self.config.style = style;
    }

    fn set_colour(&mut self, index: usize, colour: Rgb) {
        if let Some(slot) = self.palette.get_mut(index) {
            *slot = colour;
        }
    }

    fn set_workers(&mut self, workers: usize) -> Result<(), FractalError> {
        if workers != self.partitioner.workers() {
            self.partitioner = Partitioner::new(workers)?;
        }
        self.config.workers = Some(workers);
        Ok(())
    }

    fn set_multithreading(&mut self, enabled: bool) {
        self.config.multithreading = enabled;
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.config.width, self.config.height)
    }

    fn set_dimensions(&mut self, width: usize, height: usize) {
        self.config.width = width;
        self.config.height = height;
    }

    fn pixel_buffer(&self) -> &[u32] {
        &self.colours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FractalKind;
    use iterators::BOUNDED;

    fn engine(accumulation: Accumulation, multithreading: bool) -> TrajectoryEngine {
        let config = FractalConfig {
            max_iterations: 50,
            workers: Some(4),
            multithreading,
            ..FractalConfig::for_kind(FractalKind::Buddhabrot)
        }
        .with_size(40, 30);
        let trajectory = TrajectoryConfig {
            points: 3000,
            rng_seed: Some(7),
            ..TrajectoryConfig::default()
        };
        TrajectoryEngine::new(&config, trajectory, accumulation).unwrap()
    }

    #[test]
    fn seeds_fall_into_three_bands() {
        assert_eq!(channel_of(0, 9), 0);
        assert_eq!(channel_of(2, 9), 0);
        assert_eq!(channel_of(3, 9), 1);
        assert_eq!(channel_of(5, 9), 1);
        assert_eq!(channel_of(6, 9), 2);
        assert_eq!(channel_of(10, 11), 2);
        assert_eq!(channel_of(0, 2), 2);
    }

    #[test]
    fn seeds_lie_in_the_radius_band() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seeds = SeedSet::new();
        assert_eq!(seeds.replenish(500, (0.5, 1.5), &mut rng).unwrap(), 500);
        assert!(seeds
            .points()
            .iter()
            .all(|p| p.norm() >= 0.5 - 1e-12 && p.norm() < 1.5 + 1e-12));
        assert!(seeds.replenish(10, (1.0, 1.0), &mut rng).is_err());
    }

    #[test]
    fn stages_run_in_order() {
        let mut e = engine(Accumulation::Single, false);
        assert_eq!(e.state(), TrajectoryState::Unseeded);
        assert!(e.classify().is_err());
        e.setup().unwrap();
        assert!(e.accumulate().is_err());
        e.classify().unwrap();
        assert_eq!(e.state(), TrajectoryState::Classified);
        e.accumulate().unwrap();
        e.color_fractal();
        assert_eq!(e.state(), TrajectoryState::Normalized);
    }

    #[test]
    fn surviving_seeds_escape_and_are_reused() {
        let mut e = engine(Accumulation::Single, true);
        e.create_fractal().unwrap();
        let live = e.seeds().live();
        assert!(!live.is_empty());
        assert!(live.len() < 3000);
        let mandelbrot = EscapeIterator::mandelbrot(50);
        assert!(live
            .iter()
            .all(|&p| mandelbrot.iterate(p).classification != BOUNDED));

        e.set_num_random_points(live.len() + 25);
        e.setup().unwrap();
        assert_eq!(e.seeds().len(), live.len() + 25);
        assert_eq!(&e.seeds().points()[..live.len()], &live[..]);
    }

    #[test]
    fn serial_and_parallel_agree() {
        let mut serial = engine(Accumulation::ThreeChannel, false);
        let mut parallel = engine(Accumulation::ThreeChannel, true);
        serial.create_fractal().unwrap();
        parallel.create_fractal().unwrap();
        assert!(serial.visits().total() > 0);
        assert_eq!(serial.visits(), parallel.visits());
        assert_eq!(serial.pixel_buffer(), parallel.pixel_buffer());
    }

    #[test]
    fn a_channel_with_no_budget_stays_dark() {
        let config = FractalConfig {
            max_iterations: 50,
            workers: Some(2),
            ..FractalConfig::for_kind(FractalKind::Nebulabrot)
        }
        .with_size(40, 30);
        let trajectory = TrajectoryConfig {
            points: 3000,
            channel_coefficients: [1.0, 0.0, 0.0],
            rng_seed: Some(11),
            ..TrajectoryConfig::default()
        };
        let mut e = TrajectoryEngine::new(&config, trajectory, Accumulation::ThreeChannel).unwrap();
        e.create_fractal().unwrap();
        assert!(e.visits().channel(0).iter().any(|&v| v > 0));
        assert!(e.visits().channel(1).iter().all(|&v| v == 0));
        assert!(e.visits().channel(2).iter().all(|&v| v == 0));
        for &pixel in e.pixel_buffer() {
            assert_eq!(pixel & 0x00ffff, 0);
        }
    }

    #[test]
    fn lands_off_the_far_edge_are_dropped() {
        let viewport = Viewport::new(Complex::new(0.0, 0.0), 1.0, 5, 5).unwrap();
        let mut visits = vec![0; viewport.len()];
        let mut dropped = 0;
        let touched = walk(Complex::new(2.5, 0.0), &viewport, 10, 10.0, &mut visits, &mut dropped);
        assert!(touched);
        assert_eq!(dropped, 1);
        assert!(visits.iter().all(|&v| v == 0));
    }

    #[test]
    fn histograms_merge_in_any_order() {
        let mut a = VisitHistogram::new(3, 4);
        a.channels[0][1] = 2;
        a.channels[2][3] = 5;
        let mut b = VisitHistogram::new(3, 4);
        b.channels[0][1] = 1;
        b.channels[1][0] = 4;

        let mut ab = VisitHistogram::new(3, 4);
        ab.merge(&a);
        ab.merge(&b);
        let mut ba = VisitHistogram::new(3, 4);
        ba.merge(&b);
        ba.merge(&a);
        assert_eq!(ab, ba);
        assert_eq!(ab.max(), 5);
        assert_eq!(ab.total(), 12);
    }

    #[test]
    fn seeds_that_never_reach_the_image_are_replaced() {
        let config = FractalConfig {
            center: Complex::new(50.0, 50.0),
            zoom: 10.0,
            max_iterations: 50,
            workers: Some(3),
            ..FractalConfig::for_kind(FractalKind::Buddhabrot)
        }
        .with_size(40, 30);
        let trajectory = TrajectoryConfig {
            points: 3000,
            rng_seed: Some(5),
            ..TrajectoryConfig::default()
        };
        let mut e = TrajectoryEngine::new(&config, trajectory, Accumulation::Single).unwrap();
        e.setup().unwrap();
        assert!(e.classify().unwrap() > 0);
        e.accumulate().unwrap();
        assert_eq!(e.visits().total(), 0);
        assert!(e.seeds().live().is_empty());

        let old = e.seeds().points().to_vec();
        e.setup().unwrap();
        assert_eq!(e.seeds().live().len(), 3000);
        assert!(e.seeds().points().iter().all(|p| !old.contains(p)));
    }

    #[test]
    fn translation_recentres() {
        let mut e = engine(Accumulation::Single, true);
        e.create_fractal().unwrap();
        let dz = e.viewport().unwrap().dz();
        let before = e.center();
        e.translate(4, 0).unwrap();
        assert_eq!(e.center(), before + Complex::new(-4.0 * dz, 0.0));
        assert_eq!(e.state(), TrajectoryState::Normalized);
    }
}
