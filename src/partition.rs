// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fork-join over contiguous index ranges.
//!
//! A job of `total` units (image rows, or seed points) is cut into `parts`
//! near-equal ranges.  Each range gets its own disjoint slice of the
//! caller's buffer, so rows can be written without locks; anything that
//! must be shared across ranges (histograms) is returned from the job
//! and merged by the caller after the join.

use std::mem;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};

use crossbeam::channel;
use rayon::{ThreadPool, ThreadPoolBuilder};

use errors::FractalError;

/// Boundaries `b[0] = 0, b[parts] = total, b[i] = i * (total / parts)`.
/// The last range absorbs the remainder.
pub fn partition_bounds(total: usize, parts: usize) -> Vec<usize> {
    let parts = parts.max(1);
    let mut bounds: Vec<usize> = (0..parts).map(|i| i * (total / parts)).collect();
    bounds.push(total);
    bounds
}

/// Adds worker-local counts into `into`, element by element.  Addition
/// is the only combining step, so the order of `locals` never matters.
pub fn merge_counts(into: &mut [u64], locals: &[Vec<u64>]) {
    for local in locals {
        for (total, &count) in into.iter_mut().zip(local.iter()) {
            *total += count;
        }
    }
}

/// A fixed-size pool of worker threads, kept alive between renders.
pub struct Partitioner {
    pool: ThreadPool,
    workers: usize,
}

impl Partitioner {
    /// Starts a pool of `workers` threads, at least one.
    pub fn new(workers: usize) -> Result<Partitioner, FractalError> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("fractal-worker-{}", i))
            .build()
            .map_err(|e| FractalError::WorkerPool(e.to_string()))?;
        debug!("started {} render workers", workers);
        Ok(Partitioner { pool, workers })
    }

    /// One worker per hardware thread.
    pub fn with_available_parallelism() -> Result<Partitioner, FractalError> {
        Partitioner::new(num_cpus::get())
    }

    /// Number of threads in the pool.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Splits `data` into `parts` runs of whole `unit`-sized blocks and
    /// calls `job(range, chunk)` on each, where `range` is the block
    /// indices the chunk covers.  Blocks until every job has finished and
    /// returns their results in range order.
    ///
    /// A job that panics loses its result, and whatever it wrote to its
    /// chunk stays there; the rest of the results are still returned.
    pub fn map_chunks<T, R, F>(&self, parts: usize, data: &mut [T], unit: usize, job: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(Range<usize>, &mut [T]) -> R + Sync,
    {
        let unit = unit.max(1);
        let total = data.len() / unit;
        let bounds = partition_bounds(total, parts);

        if bounds.len() == 2 {
            return vec![job(0..total, &mut data[..total * unit])];
        }

        let (sender, receiver) = channel::unbounded();
        let job = &job;
        let bounds_ref = &bounds;
        self.pool.scope(move |scope| {
            let mut rest = data;
            for (index, window) in bounds_ref.windows(2).enumerate() {
                let (start, end) = (window[0], window[1]);
                let (chunk, tail) = mem::replace(&mut rest, &mut []).split_at_mut((end - start) * unit);
                rest = tail;
                let sender = sender.clone();
                scope.spawn(move |_| {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(start..end, chunk)));
                    let _ = sender.send((index, outcome.ok()));
                });
            }
        });

        let submitted = bounds.len() - 1;
        let mut finished: Vec<(usize, R)> = receiver
            .try_iter()
            .filter_map(|(index, result)| result.map(|r| (index, r)))
            .collect();
        if finished.len() < submitted {
            warn!(
                "{}",
                FractalError::Interrupted {
                    failed: submitted - finished.len(),
                    total: submitted,
                }
            );
        }
        finished.sort_by_key(|&(index, _)| index);
        finished.into_iter().map(|(_, r)| r).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_everything_once() {
        assert_eq!(partition_bounds(10, 3), vec![0, 3, 6, 10]);
        assert_eq!(partition_bounds(9, 3), vec![0, 3, 6, 9]);
        assert_eq!(partition_bounds(2, 4), vec![0, 0, 0, 0, 2]);
        assert_eq!(partition_bounds(7, 1), vec![0, 7]);
        assert_eq!(partition_bounds(7, 0), vec![0, 7]);
    }

    #[test]
    fn merging_ignores_order() {
        let locals = vec![vec![1, 0, 4], vec![0, 2, 2], vec![7, 1, 0]];
        let mut forward = vec![0u64; 3];
        merge_counts(&mut forward, &locals);
        let mut reversed = vec![0u64; 3];
        let backwards: Vec<Vec<u64>> = locals.iter().rev().cloned().collect();
        merge_counts(&mut reversed, &backwards);
        assert_eq!(forward, vec![8, 3, 6]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn every_chunk_is_visited_once() {
        let partitioner = Partitioner::new(4).unwrap();
        let mut rows = vec![0usize; 13 * 5];
        let sums = partitioner.map_chunks(4, &mut rows, 5, |range, chunk| {
            for (offset, cell) in chunk.iter_mut().enumerate() {
                *cell = range.start + offset / 5 + 1;
            }
            range.len()
        });
        assert_eq!(sums, vec![3, 3, 3, 4]);
        for (row, cells) in rows.chunks(5).enumerate() {
            assert!(cells.iter().all(|&c| c == row + 1));
        }
    }

    #[test]
    fn single_part_runs_inline() {
        let partitioner = Partitioner::new(2).unwrap();
        let mut data = vec![1u32; 6];
        let result = partitioner.map_chunks(1, &mut data, 2, |range, chunk| {
            chunk.iter_mut().for_each(|c| *c = 7);
            range
        });
        assert_eq!(result, vec![0..3]);
        assert!(data.iter().all(|&c| c == 7));
    }

    #[test]
    fn a_panicking_partition_keeps_the_rest() {
        let partitioner = Partitioner::new(3).unwrap();
        let mut data = vec![0u8; 9];
        let result = partitioner.map_chunks(3, &mut data, 1, |range, chunk| {
            if range.start == 3 {
                panic!("lost a worker");
            }
            chunk.iter_mut().for_each(|c| *c = 1);
            range.start
        });
        assert_eq!(result, vec![0, 6]);
        assert_eq!(&data[..3], &[1, 1, 1]);
        assert_eq!(&data[6..], &[1, 1, 1]);
    }
}
