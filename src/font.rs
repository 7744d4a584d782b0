// Copyright 2026 the Shapecache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font-side request parameters.

/// Glyph hinting level requested from the font backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Hinting {
    #[default]
    None,
    Slight,
    Normal,
    Full,
}

/// The shaping-relevant subset of a paint: which face to shape with and the
/// geometry applied to it.
///
/// `typeface_id` is an opaque, stable identity supplied by the font backend;
/// the cache uses it only for equality and never dereferences it. Pixel
/// scaling is assumed to be pre-applied by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FontConfig {
    pub typeface_id: u64,
    pub text_size: f32,
    pub skew_x: f32,
    pub scale_x: f32,
    /// Paint flag bits that affect shaping. Opaque to the cache; they only
    /// participate in key identity.
    pub flags: u32,
    pub hinting: Hinting,
}
