// SPDX-License-Identifier: LGPL-3.0-or-later

//! True-peak estimation via 4x polyphase upsampling.
//!
//! Reconstruction of a sampled signal can peak between samples; a limiter
//! that only inspects sample values will let such peaks through. This
//! module estimates the inter-sample peak by interpolating three
//! additional values per input sample with a 48-tap cosine-windowed sinc,
//! decomposed into four polyphase rows:
//!
//! - phase 0 is a pass-through of the newest input sample,
//! - phases 1 and 3 are a mirrored coefficient pair,
//! - phase 2 is symmetric.
//!
//! Only the peak magnitude across the four phases is consumed; the
//! individual interpolated samples are never propagated downstream.
//!
//! The interpolator has an internal delay of 23 samples. A limiter using
//! it inside a longer look-ahead window absorbs that bias (at the cost of
//! rare slip-through on extreme transients); standalone pre-scan callers
//! must drain it themselves via [`TruePeakUpsampler::latency`].
//!
//! # Examples
//!
//! ```
//! use brickwall_dsp::meters::true_peak::TruePeakUpsampler;
//!
//! let mut up = TruePeakUpsampler::new();
//! up.init(1);
//!
//! // A sine sampled off-peak: samples stay below the continuous maximum.
//! let signal: Vec<f32> = (0..256)
//!     .map(|n| (std::f32::consts::FRAC_PI_2 * n as f32 + 0.78).sin())
//!     .collect();
//! let peak = up.process(0.0, &signal);
//! assert!(peak > 0.95);
//! ```

/// FIR length per polyphase row.
const NTAPS: usize = 48;

/// Internal interpolator delay in input samples.
const LATENCY: usize = 23;

/// Phase-1 polyphase row. Phase 3 is this row reversed.
#[rustfmt::skip]
const PHASE_1: [f32; NTAPS] = [
    -2.330790e-05,  1.321291e-04, -3.394408e-04,  6.562235e-04,
    -1.094138e-03,  1.665807e-03, -2.385230e-03,  3.268371e-03,
    -4.334012e-03,  5.604985e-03, -7.109989e-03,  8.886314e-03,
    -1.098403e-02,  1.347264e-02, -1.645206e-02,  2.007155e-02,
    -2.456432e-02,  3.031531e-02, -3.800644e-02,  4.896667e-02,
    -6.616853e-02,  9.788141e-02, -1.788607e-01,  9.000753e-01,
     2.993829e-01, -1.269367e-01,  7.922398e-02, -5.647748e-02,
     4.295093e-02, -3.385706e-02,  2.724946e-02, -2.218943e-02,
     1.816976e-02, -1.489313e-02,  1.217411e-02, -9.891211e-03,
     7.961470e-03, -6.326144e-03,  4.942202e-03, -3.777065e-03,
     2.805240e-03, -2.006106e-03,  1.362416e-03, -8.592768e-04,
     4.834383e-04, -2.228007e-04,  6.607267e-05, -2.537056e-06,
];

/// Phase-2 polyphase row (symmetric).
#[rustfmt::skip]
const PHASE_2: [f32; NTAPS] = [
    -1.450055e-05,  1.359163e-04, -3.928527e-04,  8.006445e-04,
    -1.375510e-03,  2.134915e-03, -3.098103e-03,  4.286860e-03,
    -5.726614e-03,  7.448018e-03, -9.489286e-03,  1.189966e-02,
    -1.474471e-02,  1.811472e-02, -2.213828e-02,  2.700557e-02,
    -3.301023e-02,  4.062971e-02, -5.069345e-02,  6.477499e-02,
    -8.625619e-02,  1.239454e-01, -2.101678e-01,  6.359382e-01,
     6.359382e-01, -2.101678e-01,  1.239454e-01, -8.625619e-02,
     6.477499e-02, -5.069345e-02,  4.062971e-02, -3.301023e-02,
     2.700557e-02, -2.213828e-02,  1.811472e-02, -1.474471e-02,
     1.189966e-02, -9.489286e-03,  7.448018e-03, -5.726614e-03,
     4.286860e-03, -3.098103e-03,  2.134915e-03, -1.375510e-03,
     8.006445e-04, -3.928527e-04,  1.359163e-04, -1.450055e-05,
];

/// Per-channel 4x polyphase true-peak estimator.
#[derive(Debug, Clone)]
pub struct TruePeakUpsampler {
    /// Tap memory per channel; index 47 holds the newest sample.
    taps: Vec<[f32; NTAPS]>,
}

impl Default for TruePeakUpsampler {
    fn default() -> Self {
        Self::new()
    }
}

impl TruePeakUpsampler {
    /// Create a new upsampler with no channels allocated.
    pub fn new() -> Self {
        Self { taps: Vec::new() }
    }

    /// Initialize tap memories for `nchan` channels.
    ///
    /// Re-initializing with an unchanged channel count reuses the existing
    /// allocation and zeroes it.
    pub fn init(&mut self, nchan: usize) {
        if self.taps.len() != nchan {
            self.taps = vec![[0.0; NTAPS]; nchan];
        } else {
            self.clear();
        }
    }

    /// Zero all tap memories without reallocating.
    ///
    /// Must be called whenever the input stream becomes discontinuous
    /// (e.g. when true-peak analysis is toggled), otherwise stale tap
    /// contents emit a transient burst.
    pub fn clear(&mut self) {
        for t in &mut self.taps {
            *t = [0.0; NTAPS];
        }
    }

    /// Internal interpolator delay in input samples.
    ///
    /// This bias is not reflected in a hosting limiter's reported latency;
    /// only standalone pre-scan callers need to drain it.
    pub fn latency(&self) -> usize {
        LATENCY
    }

    /// Advance one channel by one input sample.
    ///
    /// Returns the peak magnitude across the four interpolation phases
    /// for this sample position.
    ///
    /// # Arguments
    /// * `chn` - Channel index
    /// * `x` - Input sample
    #[inline]
    pub fn process_one(&mut self, chn: usize, x: f32) -> f32 {
        let r = &mut self.taps[chn];
        r[NTAPS - 1] = x;

        // Phase 0 is the pass-through u0 = x; phases 1..3 are inner
        // products with the FIR rows, phase 3 using the reversed phase-1
        // row.
        let mut u1 = 0.0f32;
        let mut u2 = 0.0f32;
        let mut u3 = 0.0f32;
        for (i, &s) in r.iter().enumerate() {
            u1 += s * PHASE_1[i];
            u2 += s * PHASE_2[i];
            u3 += s * PHASE_1[NTAPS - 1 - i];
        }

        // Age the tap memory by one sample.
        r.copy_within(1.., 0);

        let p1 = x.abs().max(u1.abs());
        let p2 = u2.abs().max(u3.abs());
        p1.max(p2)
    }

    /// Fold the per-sample peak estimate over an interleaved block.
    ///
    /// Carries a running maximum starting from `pk`, so material can be
    /// scanned across multiple blocks (e.g. measuring a whole stream
    /// before choosing gain).
    ///
    /// # Arguments
    /// * `pk` - Running peak to fold into
    /// * `inp` - Interleaved samples, length a multiple of the channel count
    ///
    /// # Returns
    /// The updated running peak.
    pub fn process(&mut self, pk: f32, inp: &[f32]) -> f32 {
        let nchan = self.taps.len();
        if nchan == 0 {
            return pk;
        }
        debug_assert_eq!(inp.len() % nchan, 0);

        let mut pk = pk;
        for frame in inp.chunks_exact(nchan) {
            for (j, &x) in frame.iter().enumerate() {
                pk = pk.max(self.process_one(j, x));
            }
        }
        pk
    }

    /// Release the storage. The upsampler must be re-initialized before
    /// reuse.
    pub fn fini(&mut self) {
        self.taps = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

    #[test]
    fn test_phase_2_is_symmetric() {
        for i in 0..NTAPS {
            assert_eq!(PHASE_2[i], PHASE_2[NTAPS - 1 - i], "tap {i}");
        }
    }

    #[test]
    fn test_rows_have_unity_dc_gain() {
        let s1: f32 = PHASE_1.iter().sum();
        let s2: f32 = PHASE_2.iter().sum();
        assert!((s1 - 1.0).abs() < 0.01, "phase 1 DC gain {s1}");
        assert!((s2 - 1.0).abs() < 0.01, "phase 2 DC gain {s2}");
    }

    #[test]
    fn test_silence_yields_zero() {
        let mut up = TruePeakUpsampler::new();
        up.init(1);
        for _ in 0..100 {
            assert_eq!(up.process_one(0, 0.0), 0.0);
        }
    }

    #[test]
    fn test_pass_through_phase_reports_sample_peak_immediately() {
        let mut up = TruePeakUpsampler::new();
        up.init(1);
        // Phase 0 passes the newest sample straight through, so an
        // impulse registers at the sample it arrives.
        assert_eq!(up.process_one(0, 1.0), 1.0);
    }

    #[test]
    fn test_interpolated_impulse_response_peaks_at_latency() {
        let mut up = TruePeakUpsampler::new();
        up.init(1);

        let mut responses = vec![up.process_one(0, 1.0)];
        for _ in 0..NTAPS {
            responses.push(up.process_one(0, 0.0));
        }

        // Ignoring the immediate pass-through, the interpolated phases
        // peak once the impulse reaches the filter center.
        let (argmax, _) = responses
            .iter()
            .enumerate()
            .skip(1)
            .fold((1, 0.0f32), |(ai, av), (i, &v)| {
                if v > av { (i, v) } else { (ai, av) }
            });
        assert_eq!(argmax, up.latency(), "interpolation peak index");
    }

    #[test]
    fn test_dc_settles_to_input_level() {
        let mut up = TruePeakUpsampler::new();
        up.init(1);
        let mut p = 0.0;
        for _ in 0..200 {
            p = up.process_one(0, 0.6);
        }
        assert!((p - 0.6).abs() < 0.05, "DC peak should be near 0.6, got {p}");
    }

    #[test]
    fn test_detects_inter_sample_peak() {
        // A sine at fs/4 sampled midway between its extremes: every sample
        // has magnitude A/sqrt(2), but the reconstruction peaks at A.
        let mut up = TruePeakUpsampler::new();
        up.init(1);

        let a = 1.0f32;
        let mut sample_peak = 0.0f32;
        let mut true_peak = 0.0f32;
        for n in 0..400 {
            let x = a * (FRAC_PI_2 * n as f32 + FRAC_PI_4).sin();
            sample_peak = sample_peak.max(x.abs());
            true_peak = true_peak.max(up.process_one(0, x));
        }

        assert!((sample_peak - a / 2.0f32.sqrt()).abs() < 1e-3);
        assert!(
            true_peak > 0.95 * a,
            "inter-sample peak should approach {a}, got {true_peak}"
        );
    }

    #[test]
    fn test_estimate_never_below_sample_peak() {
        let mut up = TruePeakUpsampler::new();
        up.init(1);
        for n in 0..1000 {
            let x = 0.8 * (TAU * 997.0 * n as f32 / 48000.0).sin();
            let p = up.process_one(0, x);
            assert!(p >= x.abs(), "estimate {p} below sample {x} at {n}");
        }
    }

    #[test]
    fn test_block_process_matches_per_sample_fold() {
        let signal: Vec<f32> = (0..300)
            .map(|n| (TAU * 1250.0 * n as f32 / 48000.0).sin() * 0.9)
            .collect();

        let mut up_block = TruePeakUpsampler::new();
        up_block.init(1);
        let pk_block = up_block.process(0.0, &signal);

        let mut up_single = TruePeakUpsampler::new();
        up_single.init(1);
        let mut pk_single = 0.0f32;
        for &x in &signal {
            pk_single = pk_single.max(up_single.process_one(0, x));
        }

        assert_eq!(pk_block, pk_single);
    }

    #[test]
    fn test_block_process_carries_running_peak() {
        let mut up = TruePeakUpsampler::new();
        up.init(1);
        let quiet = vec![0.1f32; 64];
        let pk = up.process(0.75, &quiet);
        assert_eq!(pk, 0.75, "a louder prior peak must be preserved");
    }

    #[test]
    fn test_channels_are_independent() {
        let mut up = TruePeakUpsampler::new();
        up.init(2);

        up.process_one(0, 1.0);
        // Channel 1 saw nothing, so it keeps reporting silence.
        for _ in 0..10 {
            assert_eq!(up.process_one(1, 0.0), 0.0);
        }
        // Channel 0 still rings from the impulse.
        assert!(up.process_one(0, 0.0) != 0.0);
    }

    #[test]
    fn test_clear_silences_ringing() {
        let mut up = TruePeakUpsampler::new();
        up.init(1);
        up.process_one(0, 1.0);
        up.clear();
        assert_eq!(up.process_one(0, 0.0), 0.0);
    }

    #[test]
    fn test_reinit_same_channel_count_clears() {
        let mut up = TruePeakUpsampler::new();
        up.init(1);
        up.process_one(0, 1.0);
        up.init(1);
        assert_eq!(up.process_one(0, 0.0), 0.0);
    }

    #[test]
    fn test_process_with_no_channels_is_identity() {
        let mut up = TruePeakUpsampler::new();
        assert_eq!(up.process(0.5, &[]), 0.5);
    }
}
