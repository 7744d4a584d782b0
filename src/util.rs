// Copyright 2026 the Shapecache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Misc helpers.

/// Converts a 26.6 fixed-point value from the shaper ABI to `f32`.
pub fn fixed_to_f32(value: i32) -> f32 {
    value as f32 / 64.0
}

/// Converts a float value to the shaper ABI's 26.6 fixed point.
pub fn f32_to_fixed(value: f32) -> i32 {
    (value * 64.0) as i32
}
