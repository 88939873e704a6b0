// SPDX-License-Identifier: LGPL-3.0-or-later

//! Look-ahead brickwall peak limiter for interleaved multi-channel audio.
//!
//! The limiter delays the signal by a short look-ahead window (~1.2 ms)
//! and computes a gain-reduction envelope from two peak detectors running
//! at different time scales:
//!
//! - a **fast detector** samples the digital (or 4x-upsampled true) peak
//!   of the gain-applied input every `div1` samples and holds its gain
//!   target through a moving-minimum window spanning the look-ahead;
//! - a **slow detector** watches a ~500 Hz low-pass of the same signal
//!   every `div1 * div2` samples, so sustained low-frequency energy gets
//!   an automatically extended hold instead of the limiter tracing the
//!   waveform shape and distorting it.
//!
//! Both targets are low-pass smoothed, the lower one wins, and the final
//! envelope attacks at a fast fixed rate and releases at the configured
//! release rate. The envelope is applied to the delayed signal, so gain
//! reduction is already in place when a peak emerges. All channels share
//! one envelope and one input-gain ramp.
//!
//! # Example
//!
//! ```
//! use brickwall_dsp::dynamics::limiter::Limiter;
//!
//! let mut limiter = Limiter::new();
//! limiter.init(48000.0, 1);
//! limiter.set_inpgain(3.0);    // dB
//! limiter.set_threshold(-1.0); // dBFS
//! limiter.set_release(0.05);   // seconds
//!
//! let input = vec![0.25f32; 4096];
//! let mut output = vec![0.0f32; 4096];
//! limiter.process(&input, &mut output);
//!
//! let stats = limiter.get_stats();
//! assert!(stats.gmin > 0.0 && stats.gmax <= 1.0);
//! ```

use crate::consts::GAIN_AMP_0_DB;
use crate::filters::prefilter::LoudnessPreFilter;
use crate::meters::true_peak::TruePeakUpsampler;
use crate::units::{db_to_gain, seconds_to_samples};
use crate::util::delay_bank::DelayBank;
use crate::util::moving_min::MovingMin;

/// Maximum supported channel count.
pub const MAX_CHANNELS: usize = 64;

/// Slow-detector commit divider relative to the fast detector.
const DIV2: usize = 8;

/// Length of the slow moving-minimum window, in slow-detector commits.
const SLOW_HIST_LEN: usize = 12;

/// Look-ahead target in seconds (~1.2 ms).
const LOOKAHEAD_SECONDS: f32 = 1.2e-3;

/// Running level observables since the last stats reset.
///
/// All three fields are linear; convert with
/// [`units::gain_to_db`](crate::units::gain_to_db) for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimiterStats {
    /// Highest detector level relative to the threshold (values above 1.0
    /// mean the limiter had to engage).
    pub peak: f32,
    /// Highest gain the envelope reached.
    pub gmax: f32,
    /// Lowest gain the envelope reached (maximum attenuation).
    pub gmin: f32,
}

/// Look-ahead brickwall peak limiter.
///
/// Construct with [`new`](Self::new), configure with [`init`](Self::init),
/// then feed interleaved blocks through [`process`](Self::process). The
/// output stream lags the input by [`get_latency`](Self::get_latency)
/// samples; callers realign by dropping that many leading output samples
/// and flushing an equal number of zero input samples at end-of-stream.
#[derive(Debug, Clone)]
pub struct Limiter {
    // Configuration
    fsamp: f32,
    nchan: usize,
    div1: usize,
    div2: usize,
    delay: usize,

    // Owned components
    dbuff: DelayBank,
    lowpass: LoudnessPreFilter,
    upsampler: TruePeakUpsampler,
    hist1: MovingMin,
    hist2: MovingMin,

    // Detector cycle state
    c1: usize,
    c2: usize,
    m1: f32,
    m2: f32,

    // Input gain ramp and threshold
    g0: f32,
    g1: f32,
    dg: f32,
    gt: f32,

    // Envelope coefficients and states
    w1: f32,
    w2: f32,
    w3: f32,
    z1: f32,
    z2: f32,
    z3: f32,

    // Delay ring read position
    delri: usize,

    // Observables
    rstat: bool,
    peak: f32,
    gmax: f32,
    gmin: f32,

    truepeak: bool,
}

impl Default for Limiter {
    fn default() -> Self {
        Self::new()
    }
}

impl Limiter {
    /// Create a new limiter instance.
    ///
    /// The limiter must be configured with [`init`](Self::init) before use.
    pub fn new() -> Self {
        Self {
            fsamp: 0.0,
            nchan: 0,
            div1: 0,
            div2: 0,
            delay: 0,
            dbuff: DelayBank::new(),
            lowpass: LoudnessPreFilter::new(),
            upsampler: TruePeakUpsampler::new(),
            hist1: MovingMin::new(),
            hist2: MovingMin::new(),
            c1: 0,
            c2: 0,
            m1: 0.0,
            m2: 0.0,
            g0: GAIN_AMP_0_DB,
            g1: GAIN_AMP_0_DB,
            dg: 0.0,
            gt: GAIN_AMP_0_DB,
            w1: 0.0,
            w2: 0.0,
            w3: 0.0,
            z1: GAIN_AMP_0_DB,
            z2: GAIN_AMP_0_DB,
            z3: GAIN_AMP_0_DB,
            delri: 0,
            rstat: false,
            peak: 0.0,
            gmax: GAIN_AMP_0_DB,
            gmin: GAIN_AMP_0_DB,
            truepeak: false,
        }
    }

    /// Configure the limiter for a sample rate and channel count.
    ///
    /// May be called repeatedly to reconfigure; allocations are reused when
    /// the buffer shapes are unchanged. All processing state, parameters
    /// and statistics are reset to their defaults: unity input gain and
    /// threshold, 10 ms release. The true-peak switch is left as set.
    ///
    /// # Arguments
    /// * `fsamp` - Sample rate in Hz, must be positive
    /// * `nchan` - Channel count, `1..=MAX_CHANNELS`
    pub fn init(&mut self, fsamp: f32, nchan: usize) {
        assert!(fsamp > 0.0, "sample rate must be positive");
        assert!(
            (1..=MAX_CHANNELS).contains(&nchan),
            "channel count must be in 1..={MAX_CHANNELS}, got {nchan}"
        );

        self.fsamp = fsamp;
        self.nchan = nchan;

        // The fast detector commits once per div1 samples; coarser at
        // higher rates so the commit cadence stays roughly constant in
        // wall-clock time.
        self.div1 = if fsamp > 130_000.0 {
            32
        } else if fsamp > 65_000.0 {
            16
        } else {
            8
        };
        self.div2 = DIV2;

        let k1 = (LOOKAHEAD_SECONDS * fsamp / self.div1 as f32).ceil() as usize;
        self.delay = k1 * self.div1;

        self.dbuff.init(nchan, self.delay + self.div1);
        self.lowpass.init(fsamp, nchan);
        self.upsampler.init(nchan);
        self.hist1.init(k1 + 1);
        self.hist2.init(SLOW_HIST_LEN);

        self.c1 = self.div1;
        self.c2 = self.div2;
        self.m1 = 0.0;
        self.m2 = 0.0;

        self.w1 = 10.0 / self.delay as f32;
        self.w2 = self.w1 / self.div2 as f32;
        self.w3 = 1.0 / (0.01 * fsamp);

        self.g0 = GAIN_AMP_0_DB;
        self.g1 = GAIN_AMP_0_DB;
        self.dg = 0.0;
        self.gt = GAIN_AMP_0_DB;
        self.z1 = GAIN_AMP_0_DB;
        self.z2 = GAIN_AMP_0_DB;
        self.z3 = GAIN_AMP_0_DB;

        self.delri = 0;
        self.rstat = false;
        self.peak = 0.0;
        self.gmax = GAIN_AMP_0_DB;
        self.gmin = GAIN_AMP_0_DB;
    }

    /// Release all buffers. Idempotent; [`init`](Self::init) must be called
    /// before the limiter is used again.
    pub fn fini(&mut self) {
        self.dbuff.fini();
        self.lowpass.fini();
        self.upsampler.fini();
        self.hist1 = MovingMin::new();
        self.hist2 = MovingMin::new();
        self.nchan = 0;
        self.fsamp = 0.0;
        self.delay = 0;
    }

    /// Set the input gain applied ahead of peak detection.
    ///
    /// The applied gain ramps towards the new target over one slow-detector
    /// period rather than jumping.
    ///
    /// # Arguments
    /// * `db` - Input gain in dB (wrappers typically allow -10 to +30)
    pub fn set_inpgain(&mut self, db: f32) {
        self.g1 = db_to_gain(db);
    }

    /// Set the limiting threshold.
    ///
    /// # Arguments
    /// * `db` - Threshold in dBFS (wrappers typically allow -10 to 0)
    pub fn set_threshold(&mut self, db: f32) {
        self.gt = db_to_gain(-db);
    }

    /// Set the release time, silently clamped to 1 ms .. 1 s.
    ///
    /// Gain reduction caused by sustained low-frequency content gets an
    /// automatically extended hold regardless of this setting; short
    /// superimposed peaks recover at the configured rate.
    ///
    /// # Arguments
    /// * `seconds` - Release time in seconds
    pub fn set_release(&mut self, seconds: f32) {
        debug_assert!(self.fsamp > 0.0, "init() must be called first");
        let v = seconds.clamp(1e-3, 1.0);
        self.w3 = 1.0 / seconds_to_samples(self.fsamp, v);
    }

    /// Enable or disable inter-sample (true-peak) detection.
    ///
    /// Toggling clears the upsampler history so stale taps cannot emit a
    /// transient burst.
    pub fn set_truepeak(&mut self, enable: bool) {
        if self.truepeak == enable {
            return;
        }
        self.upsampler.clear();
        self.truepeak = enable;
    }

    /// Whether inter-sample detection is active.
    pub fn truepeak(&self) -> bool {
        self.truepeak
    }

    /// Look-ahead delay in samples; constant between calls to
    /// [`init`](Self::init).
    ///
    /// The upsampler's internal 23-sample bias is not included: the
    /// look-ahead window is longer than the bias, which may let rare
    /// true-peak transients slip through but keeps the reported alignment
    /// exact for the digital path.
    pub fn get_latency(&self) -> usize {
        self.delay
    }

    /// Sample the running observables and arm a reset.
    ///
    /// The reset takes effect at the start of the next
    /// [`process`](Self::process) call: `peak` restarts at zero, while the
    /// gain interval restarts pivoted around the last known envelope —
    /// `gmax` from the previous `gmin` and vice versa — so the next window
    /// grows outward from the most recent value on both sides.
    pub fn get_stats(&mut self) -> LimiterStats {
        self.rstat = true;
        LimiterStats {
            peak: self.peak,
            gmax: self.gmax,
            gmin: self.gmin,
        }
    }

    /// Process an interleaved block.
    ///
    /// Input and output must have equal length, a multiple of the channel
    /// count. Any block length is accepted; internal detector alignment is
    /// carried across calls. The output is the delayed input scaled by the
    /// gain envelope; in-place processing is ruled out by the borrow on
    /// both slices.
    ///
    /// # Arguments
    /// * `inp` - Interleaved input frames
    /// * `out` - Interleaved output frames, same shape
    pub fn process(&mut self, inp: &[f32], out: &mut [f32]) {
        assert!(self.nchan > 0, "init() must be called before process()");
        assert_eq!(inp.len(), out.len(), "input and output length mismatch");
        assert_eq!(
            inp.len() % self.nchan,
            0,
            "buffer length must be a multiple of the channel count"
        );

        let nchan = self.nchan;
        let mask = self.dbuff.mask();
        let mut nframes = inp.len() / nchan;

        let mut ri = self.delri;
        let mut wi = (ri + self.delay) & mask;
        let mut h1 = self.hist1.vmin();
        let mut h2 = self.hist2.vmin();
        let mut m1 = self.m1;
        let mut m2 = self.m2;
        let mut z1 = self.z1;
        let mut z2 = self.z2;
        let mut z3 = self.z3;

        let (mut pk, mut t0, mut t1) = if self.rstat {
            self.rstat = false;
            (0.0, self.gmax, self.gmin)
        } else {
            (self.peak, self.gmin, self.gmax)
        };

        let truepeak = self.truepeak;
        let (w1, w2, w3) = (self.w1, self.w2, self.w3);

        let mut k = 0usize;
        while nframes > 0 {
            // Slice the block so every chunk ends on a fast-detector
            // boundary. Chunks never wrap the delay rings: the ring size,
            // the delay and the chunk granularity are all multiples of
            // div1.
            let n = self.c1.min(nframes);
            debug_assert!(wi + n <= self.dbuff.size());
            debug_assert!(ri + n <= self.dbuff.size());

            let frames = &inp[k * nchan..(k + n) * nchan];

            // Apply the gain ramp, fill the delay rings and collect both
            // detector maxima. Every channel replays the same gain
            // trajectory from g0.
            let d = self.dg;
            let mut g_next = self.g0;
            for j in 0..nchan {
                let mut g = self.g0;
                let dchan = self.dbuff.channel_mut(j);
                for i in 0..n {
                    let mut x = g * frames[i * nchan + j];
                    g += d;
                    dchan[wi + i] = x;
                    let z = self.lowpass.tick(j, x);
                    x = if truepeak {
                        self.upsampler.process_one(j, x)
                    } else {
                        x.abs()
                    };
                    if x > m1 {
                        m1 = x;
                    }
                    let z = z.abs();
                    if z > m2 {
                        m2 = z;
                    }
                }
                g_next = g;
            }
            self.g0 = g_next;

            // Detector commits at the chunk boundary.
            self.c1 -= n;
            if self.c1 == 0 {
                m1 *= self.gt;
                if m1 > pk {
                    pk = m1;
                }
                h1 = self.hist1.write(if m1 > 1.0 { 1.0 / m1 } else { 1.0 });
                m1 = 0.0;
                self.c1 = self.div1;

                self.c2 -= 1;
                if self.c2 == 0 {
                    m2 *= self.gt;
                    h2 = self.hist2.write(if m2 > 1.0 { 1.0 / m2 } else { 1.0 });
                    m2 = 0.0;
                    self.c2 = self.div2;

                    self.dg = self.g1 - self.g0;
                    if self.dg.abs() < 1e-9 {
                        self.g0 = self.g1;
                        self.dg = 0.0;
                    } else {
                        self.dg /= (self.div1 * self.div2) as f32;
                    }
                }
            }

            // Smooth the envelope and emit the delayed, scaled output.
            let out_chunk = &mut out[k * nchan..(k + n) * nchan];
            for i in 0..n {
                z1 += w1 * (h1 - z1);
                z2 += w2 * (h2 - z2);
                let z = z1.min(z2);
                z3 += if z < z3 {
                    w1 * (z - z3)
                } else {
                    w3 * (z - z3)
                };
                if z3 > t1 {
                    t1 = z3;
                }
                if z3 < t0 {
                    t0 = z3;
                }
                for j in 0..nchan {
                    out_chunk[i * nchan + j] = z3 * self.dbuff.read(j, ri + i);
                }
            }

            wi = (wi + n) & mask;
            ri = (ri + n) & mask;
            k += n;
            nframes -= n;
        }

        self.delri = ri;
        self.m1 = m1;
        self.m2 = m2;
        self.z1 = z1;
        self.z2 = z2;
        self.z3 = z3;
        self.peak = pk;
        self.gmin = t0;
        self.gmax = t1;
    }
}
