// Copyright 2026 the Shapecache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composite cache keys.

use core::cmp::Ordering;
use core::mem;
use std::borrow::Cow;

use hashbrown::Equivalent;

use crate::font::{FontConfig, Hinting};

/// How the paragraph direction is resolved for a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Direction {
    /// Resolve with a left-to-right paragraph level.
    Ltr,
    /// Resolve with a right-to-left paragraph level.
    Rtl,
    /// Resolve from the first strong character, falling back to LTR.
    DefaultLtr,
    /// Resolve from the first strong character, falling back to RTL.
    DefaultRtl,
    /// Skip bidi resolution and shape the whole text as one LTR run.
    ForceLtr,
    /// Skip bidi resolution and shape the whole text as one RTL run.
    ForceRtl,
}

/// Identity of one shaping request: the exact code units plus every font
/// parameter that can change the shaper's output.
///
/// A key borrows the caller's code units while it is only used for lookup
/// and owns a private copy once it has been inserted into the store;
/// [`into_owned`](Self::into_owned) performs the transition. The `Cow`
/// discriminant distinguishes the two states.
#[derive(Clone, Debug)]
pub struct ShapeKey<'a> {
    text: Cow<'a, [u16]>,
    typeface_id: u64,
    text_size: f32,
    skew_x: f32,
    scale_x: f32,
    flags: u32,
    hinting: Hinting,
    direction: Direction,
}

impl<'a> ShapeKey<'a> {
    /// Builds a borrowing key over the caller's code units.
    pub fn new(font: &FontConfig, text: &'a [u16], direction: Direction) -> Self {
        Self {
            text: Cow::Borrowed(text),
            typeface_id: font.typeface_id,
            text_size: font.text_size,
            skew_x: font.skew_x,
            scale_x: font.scale_x,
            flags: font.flags,
            hinting: font.hinting,
            direction,
        }
    }

    /// The code units covered by this key.
    pub fn text(&self) -> &[u16] {
        &self.text
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Logical byte footprint used for budget accounting: the fixed struct
    /// size plus two bytes per code unit.
    pub fn size(&self) -> usize {
        mem::size_of::<Self>() + mem::size_of::<u16>() * self.text.len()
    }

    /// Copies borrowed code units into the key, detaching it from the
    /// caller's buffer. A key that already owns its text is returned
    /// unchanged. Called once, immediately before insertion.
    pub fn into_owned(self) -> ShapeKey<'static> {
        ShapeKey {
            text: Cow::Owned(self.text.into_owned()),
            typeface_id: self.typeface_id,
            text_size: self.text_size,
            skew_x: self.skew_x,
            scale_x: self.scale_x,
            flags: self.flags,
            hinting: self.hinting,
            direction: self.direction,
        }
    }

    // Float fields compare by bit pattern so that `Eq` agrees with the
    // `total_cmp` ordering below.
    fn matches(&self, other: &ShapeKey<'_>) -> bool {
        self.text == other.text
            && self.typeface_id == other.typeface_id
            && self.text_size.to_bits() == other.text_size.to_bits()
            && self.skew_x.to_bits() == other.skew_x.to_bits()
            && self.scale_x.to_bits() == other.scale_x.to_bits()
            && self.flags == other.flags
            && self.hinting == other.hinting
            && self.direction == other.direction
    }
}

impl PartialEq for ShapeKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl Eq for ShapeKey<'_> {}

impl PartialOrd for ShapeKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ShapeKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text
            .cmp(&other.text)
            .then_with(|| self.typeface_id.cmp(&other.typeface_id))
            .then_with(|| self.text_size.total_cmp(&other.text_size))
            .then_with(|| self.skew_x.total_cmp(&other.skew_x))
            .then_with(|| self.scale_x.total_cmp(&other.scale_x))
            .then_with(|| self.flags.cmp(&other.flags))
            .then_with(|| self.hinting.cmp(&other.hinting))
            .then_with(|| self.direction.cmp(&other.direction))
    }
}

/// Lets a borrowing key look up entries stored under owned keys without
/// copying the text.
pub(crate) struct LookupKey<'a, 'text>(pub(crate) &'a ShapeKey<'text>);

impl Equivalent<ShapeKey<'static>> for LookupKey<'_, '_> {
    fn equivalent(&self, key: &ShapeKey<'static>) -> bool {
        self.0.matches(key)
    }
}
