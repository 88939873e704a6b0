// SPDX-License-Identifier: LGPL-3.0-or-later

//! Loudness pre-filter: per-channel one-pole low-pass at ~500 Hz.
//!
//! The filter tracks the low-frequency content of the gain-applied input.
//! Its output magnitude feeds the limiter's slow peak detector, so
//! bass-heavy material drives the slow gain-reduction path instead of
//! whipping the fast detector along the waveform shape. A tiny DC bias is
//! injected every sample to flush denormal accumulators from the feedback
//! state.

/// Pre-filter corner frequency in Hz.
const CORNER_HZ: f32 = 500.0;

/// DC bias flushing denormals out of the one-pole state.
const DENORMAL_BIAS: f32 = 1e-20;

/// Per-channel one-pole low-pass tracking low-frequency signal energy.
#[derive(Debug, Clone)]
pub struct LoudnessPreFilter {
    /// Low-pass coefficient, `2*pi*500/fsamp`.
    coeff: f32,
    /// Per-channel filter state.
    state: Vec<f32>,
}

impl Default for LoudnessPreFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoudnessPreFilter {
    /// Create a new filter with no channels allocated.
    pub fn new() -> Self {
        Self {
            coeff: 0.0,
            state: Vec::new(),
        }
    }

    /// Initialize for the given sample rate and channel count.
    ///
    /// Re-initializing with an unchanged channel count reuses the existing
    /// allocation and zeroes the state.
    pub fn init(&mut self, fsamp: f32, nchan: usize) {
        self.coeff = std::f32::consts::TAU * CORNER_HZ / fsamp;
        if self.state.len() != nchan {
            self.state = vec![0.0; nchan];
        } else {
            self.state.fill(0.0);
        }
    }

    /// Advance one channel by one sample and return the new filter state.
    #[inline]
    pub fn tick(&mut self, chn: usize, x: f32) -> f32 {
        let z = &mut self.state[chn];
        *z += self.coeff * (x - *z) + DENORMAL_BIAS;
        *z
    }

    /// Release the storage. The filter must be re-initialized before reuse.
    pub fn fini(&mut self) {
        self.state = Vec::new();
        self.coeff = 0.0;
    }
}
