//! One Euro Filter - adaptive low-pass filter for landmark jitter
//!
//! Smooth when the hand is still, responsive when it moves fast.
//! One instance per scalar channel; position uses three of them.

use std::f32::consts::PI;

use nalgebra::Point3;

use super::config::FilterConfig;

/// Rate reported by `frequency()` until a second sample gives a real delta (Hz)
pub const NOMINAL_FREQ: f32 = 30.0;

/// Exponential smoothing stage
#[derive(Clone, Debug, Default)]
pub struct LowPassFilter {
    value: f32,
}

impl LowPassFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blend `x` into the state with weight `alpha`
    pub fn filter_with_alpha(&mut self, x: f32, alpha: f32) -> f32 {
        self.value = alpha * x + (1.0 - alpha) * self.value;
        self.value
    }

    /// Overwrite the state
    pub fn set(&mut self, x: f32) {
        self.value = x;
    }

    pub fn last_value(&self) -> f32 {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

/// Adaptive low-pass filter: smooth at rest, responsive during motion
#[derive(Clone, Debug)]
pub struct OneEuroFilter {
    /// Sampling frequency estimate (Hz), refreshed from every timestamp delta
    freq: f32,
    /// Minimum cutoff frequency (Hz) - lower = smoother at rest
    min_cutoff: f32,
    /// Speed coefficient - higher = less lag during fast motion
    beta: f32,
    /// Derivative cutoff frequency (Hz)
    d_cutoff: f32,

    x: LowPassFilter,
    dx: LowPassFilter,
    last_time: Option<f64>,
}

impl OneEuroFilter {
    pub fn new(freq: f32, min_cutoff: f32, beta: f32, d_cutoff: f32) -> Self {
        Self {
            freq,
            min_cutoff,
            beta,
            d_cutoff,
            x: LowPassFilter::new(),
            dx: LowPassFilter::new(),
            last_time: None,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(NOMINAL_FREQ, config.min_cutoff, config.beta, config.d_cutoff)
    }

    /// Preset for dragging objects with a pinched hand
    pub fn for_hand_drag() -> Self {
        Self::from_config(&FilterConfig::default())
    }

    /// alpha = 1 / (1 + tau / te), tau = 1 / (2π·cutoff), te = 1 / freq
    fn smoothing_factor(t_e: f32, cutoff: f32) -> f32 {
        let r = 2.0 * PI * cutoff * t_e;
        r / (r + 1.0)
    }

    /// Filter a single value
    ///
    /// - `t`: timestamp in seconds
    /// - `x`: raw input value
    ///
    /// Returns the filtered value. A timestamp that does not advance returns the
    /// previous output untouched.
    pub fn filter(&mut self, t: f64, x: f32) -> f32 {
        let Some(last_time) = self.last_time else {
            self.x.set(x);
            self.last_time = Some(t);
            return x;
        };

        let dt = (t - last_time) as f32;
        if dt <= 0.0 {
            return self.x.last_value();
        }
        self.freq = 1.0 / dt;
        self.last_time = Some(t);
        let t_e = 1.0 / self.freq;

        // 1. Estimate derivative (velocity)
        let dx = (x - self.x.last_value()) * self.freq;
        let dx_hat = self
            .dx
            .filter_with_alpha(dx, Self::smoothing_factor(t_e, self.d_cutoff));

        // 2. Adaptive cutoff: more smoothing when slow, less when fast
        let cutoff = self.min_cutoff + self.beta * dx_hat.abs();

        // 3. Apply filter
        self.x
            .filter_with_alpha(x, Self::smoothing_factor(t_e, cutoff))
    }

    /// Forget history; the next sample passes through unfiltered
    pub fn reset(&mut self) {
        self.last_time = None;
        self.x.reset();
        self.dx.reset();
    }

    pub fn frequency(&self) -> f32 {
        self.freq
    }
}

impl Default for OneEuroFilter {
    fn default() -> Self {
        Self::for_hand_drag()
    }
}

/// Three independent One Euro Filters for a 3D position
#[derive(Clone, Debug, Default)]
pub struct OneEuroFilter3D {
    pub x: OneEuroFilter,
    pub y: OneEuroFilter,
    pub z: OneEuroFilter,
}

impl OneEuroFilter3D {
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            x: OneEuroFilter::from_config(config),
            y: OneEuroFilter::from_config(config),
            z: OneEuroFilter::from_config(config),
        }
    }

    pub fn filter(&mut self, t: f64, p: Point3<f32>) -> Point3<f32> {
        Point3::new(
            self.x.filter(t, p.x),
            self.y.filter(t, p.y),
            self.z.filter(t, p.z),
        )
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.z.reset();
    }
}
