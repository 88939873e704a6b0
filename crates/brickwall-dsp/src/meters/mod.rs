// SPDX-License-Identifier: LGPL-3.0-or-later

//! Metering utilities.
//!
//! - **TruePeakUpsampler**: 4x polyphase interpolator estimating the
//!   inter-sample peak of a multi-channel stream

pub mod true_peak;

pub use true_peak::TruePeakUpsampler;
