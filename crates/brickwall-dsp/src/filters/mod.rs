// SPDX-License-Identifier: LGPL-3.0-or-later

//! Filter modules.
//!
//! - **LoudnessPreFilter**: per-channel one-pole low-pass used to derive the
//!   limiter's slow gain-reduction target

pub mod prefilter;

pub use prefilter::LoudnessPreFilter;
