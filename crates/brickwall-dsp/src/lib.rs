// SPDX-License-Identifier: LGPL-3.0-or-later

//! # brickwall-dsp
//!
//! A look-ahead digital peak limiter for multi-channel audio streams.
//!
//! The crate is built around [`dynamics::limiter::Limiter`], a sample-aligned
//! processing engine that constrains interleaved floating-point audio to a
//! configurable threshold while keeping the gain-reduction envelope smooth in
//! time and coordinated across channels. Supporting components:
//!
//! - **Dynamics**: the look-ahead peak limiter engine
//! - **Meters**: 4x polyphase upsampler for inter-sample ("true-peak") detection
//! - **Filters**: one-pole loudness pre-filter feeding the slow peak detector
//! - **Utilities**: windowed moving minimum, multi-channel delay bank
//! - **Units / consts**: dB and time conversions, common gain constants
//!
//! ## Example
//!
//! ```
//! use brickwall_dsp::dynamics::limiter::Limiter;
//!
//! let mut limiter = Limiter::new();
//! limiter.init(48000.0, 2);
//! limiter.set_threshold(-1.0); // dBFS
//! limiter.set_release(0.05);   // seconds
//!
//! let input = vec![0.0f32; 2 * 1024];
//! let mut output = vec![0.0f32; 2 * 1024];
//! limiter.process(&input, &mut output);
//!
//! // The look-ahead delay is reported so callers can realign the stream.
//! assert_eq!(limiter.get_latency(), 64);
//! ```

// Foundational modules
pub mod consts;
pub mod units;

// Processing modules
pub mod dynamics;
pub mod filters;
pub mod meters;
pub mod util;
