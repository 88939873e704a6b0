// SPDX-License-Identifier: LGPL-3.0-or-later

//! Dynamics processors.
//!
//! This module implements the look-ahead peak limiter engine, built on the
//! moving-minimum, delay-bank, pre-filter and true-peak components.

pub mod limiter;

pub use limiter::{Limiter, LimiterStats};
