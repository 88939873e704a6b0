// SPDX-License-Identifier: LGPL-3.0-or-later

//! Common gain constants.
//!
//! Linear amplitude ratios for frequently used dB values, so that hot paths
//! and tests can compare against exact constants instead of recomputing
//! `10^(dB/20)`.

/// +6 dB amplitude gain (~2.0)
pub const GAIN_AMP_P_6_DB: f32 = 1.995_262_3;

/// 0 dB amplitude gain (1.0)
pub const GAIN_AMP_0_DB: f32 = 1.0;

/// -3 dB amplitude gain (~0.71)
pub const GAIN_AMP_M_3_DB: f32 = 0.707_945_76;

/// -6 dB amplitude gain (~0.5)
pub const GAIN_AMP_M_6_DB: f32 = 0.501_187_2;

/// -20 dB amplitude gain (0.1)
pub const GAIN_AMP_M_20_DB: f32 = 1e-1;
