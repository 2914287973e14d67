//! Simple benchmarking utilities for the render harness.
//!
//! A [`Bencher`] runs a fixed number of unmeasured warmup iterations followed by a fixed
//! number of measured iterations, timing each call individually. Measured durations are
//! reduced to [`Stats`] (median, min, max, mean) once the run completes.

use std::hint::black_box;
use std::time::{Duration, Instant};

/// Runs a closure a fixed number of times and measures each call.
#[derive(Debug, Clone)]
pub struct Bencher {
    name: String,
    warmup_iters: usize,
    iters: usize,
}

/// Timing of one benchmark run together with the output of its first measured call.
#[derive(Debug)]
pub struct Measurement<R> {
    pub name: String,
    pub stats: Stats,
    pub first_output: R,
}

/// Latency statistics over a set of measured durations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub iterations: usize,
    pub total: Duration,
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
    pub median: Duration,
}

impl Default for Bencher {
    fn default() -> Self {
        Self {
            name: String::new(),
            warmup_iters: 3,
            iters: 20,
        }
    }
}

impl Bencher {
    /// Create a new bencher with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the number of unmeasured warmup iterations.
    #[must_use]
    pub fn with_warmup_iters(mut self, iters: usize) -> Self {
        self.warmup_iters = iters;
        self
    }

    /// Set the number of measured iterations. Must be at least one.
    #[must_use]
    pub fn with_iters(mut self, iters: usize) -> Self {
        assert!(iters > 0, "at least one measured iteration is required");
        self.iters = iters;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn warmup_iters(&self) -> usize {
        self.warmup_iters
    }

    pub fn iters(&self) -> usize {
        self.iters
    }

    /// Run the benchmark.
    ///
    /// Warmup calls are not timed and their output is dropped. Each measured call is
    /// timed from just before the call until its output is returned; dropping the output
    /// happens outside the timed region. The first error from `f` aborts the run.
    pub fn bench<F, R, E>(&self, mut f: F) -> Result<Measurement<R>, E>
    where
        F: FnMut() -> Result<R, E>,
    {
        for _ in 0..self.warmup_iters {
            black_box(f()?);
        }

        let (first_output, first_elapsed) = time_call(&mut f)?;

        let mut times = Vec::with_capacity(self.iters);
        for _ in 1..self.iters {
            let (output, elapsed) = time_call(&mut f)?;
            times.push(elapsed);
            drop(output);
        }

        let stats = Stats::summarize(first_elapsed, times);

        Ok(Measurement {
            name: self.name.clone(),
            stats,
            first_output,
        })
    }
}

fn time_call<F, R, E>(f: &mut F) -> Result<(R, Duration), E>
where
    F: FnMut() -> Result<R, E>,
{
    let start = Instant::now();
    let output = black_box(f()?);
    Ok((output, start.elapsed()))
}

impl Stats {
    /// Reduces raw samples to statistics. Returns `None` for an empty sample set.
    ///
    /// The median is the element at index `len / 2` of the sorted samples, which for even
    /// counts is the upper of the two middle values.
    pub fn from_samples(mut times: Vec<Duration>) -> Option<Stats> {
        let last = times.pop()?;
        Some(Stats::summarize(last, times))
    }

    /// Holds at least `sample`, so the sorted set is never empty.
    fn summarize(sample: Duration, mut rest: Vec<Duration>) -> Stats {
        rest.push(sample);
        let mut times = rest;
        times.sort();

        let total: Duration = times.iter().sum();
        let mean = total / times.len() as u32;

        Stats {
            iterations: times.len(),
            total,
            mean,
            min: times[0],
            max: times[times.len() - 1],
            median: times[times.len() / 2],
        }
    }

    pub fn median_ms(&self) -> f64 {
        as_ms(self.median)
    }

    pub fn min_ms(&self) -> f64 {
        as_ms(self.min)
    }

    pub fn max_ms(&self) -> f64 {
        as_ms(self.max)
    }

    /// Arithmetic mean computed from the total, without `Duration` integer rounding.
    pub fn mean_ms(&self) -> f64 {
        as_ms(self.total) / self.iterations as f64
    }

    /// Frames per second implied by the median latency.
    pub fn fps(&self) -> f64 {
        1000.0 / self.median_ms()
    }
}

fn as_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

impl<R> std::fmt::Display for Measurement<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[BENCH] {}: {}", self.name, self.stats)
    }
}

impl std::fmt::Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} (min: {:?}, max: {:?}, mean: {:?}, {} iters)",
            self.median, self.min, self.max, self.mean, self.iterations
        )
    }
}
