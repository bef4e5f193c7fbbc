use std::cell::Cell;
use std::collections::VecDeque;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of every random decision the engine makes.
pub trait RandomSource {
    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Uniform integer in `min..=max`.
    fn int_inclusive(&mut self, min: u32, max: u32) -> u32;
}

/// Adapts any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandRandom<R>(pub R);

pub type StdRandom = RandRandom<StdRng>;

impl RandRandom<StdRng> {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RandRandom<R> {
    fn unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }

    fn int_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        self.0.gen_range(min..=max)
    }
}

/// Replays queued values, then falls back to a seeded generator.
///
/// Integer values outside the requested range are clamped into it.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    units: VecDeque<f64>,
    ints: VecDeque<u32>,
    fallback: RandRandom<StdRng>,
}

impl ScriptedRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            units: VecDeque::new(),
            ints: VecDeque::new(),
            fallback: RandRandom::seeded(seed),
        }
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = f64>) -> Self {
        self.units.extend(units);
        self
    }

    pub fn with_ints(mut self, ints: impl IntoIterator<Item = u32>) -> Self {
        self.ints.extend(ints);
        self
    }

    pub fn push_unit(&mut self, value: f64) {
        self.units.push_back(value);
    }

    pub fn push_int(&mut self, value: u32) {
        self.ints.push_back(value);
    }
}

impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f64 {
        match self.units.pop_front() {
            Some(value) => value,
            None => self.fallback.unit(),
        }
    }

    fn int_inclusive(&mut self, min: u32, max: u32) -> u32 {
        match self.ints.pop_front() {
            Some(value) => value.clamp(min, max.max(min)),
            None => self.fallback.int_inclusive(min, max),
        }
    }
}

/// Millisecond wall clock.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<i64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: i64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, now_ms: i64) {
        self.now.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}
