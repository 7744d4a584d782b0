// Copyright 2026 the Shapecache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The narrow interface to the complex shaper, and the buffer management
//! wrapped around it.

use crate::font::FontConfig;

/// Script hint attached to a run before shaping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptHint {
    /// Script-neutral text.
    Common,
    /// Right-to-left runs are hinted as Arabic so joining behavior applies.
    Arabic,
}

/// Font parameters as the shaper sees them.
///
/// The font backend pre-applies pixel scaling, so the ppem and scale fields
/// are fixed at 1 and implementations must not scale again.
#[derive(Clone, Copy, Debug)]
pub struct ShaperFont {
    pub config: FontConfig,
    pub x_ppem: u32,
    pub y_ppem: u32,
    pub x_scale: i32,
    pub y_scale: i32,
}

impl ShaperFont {
    fn new(config: &FontConfig) -> Self {
        Self {
            config: *config,
            x_ppem: 1,
            y_ppem: 1,
            x_scale: 1,
            y_scale: 1,
        }
    }
}

/// One shaping request over a run of code units, together with the output
/// buffers the shaper writes into.
///
/// `num_glyphs` carries buffer capacity in and the produced glyph count
/// out: the glyph-side buffers (`glyphs`, `attributes`, `advances`,
/// `offsets`) all hold `num_glyphs` zeroed slots when [`Shaper::shape`] is
/// invoked, and a `false` return leaves the required count there instead.
/// `log_clusters` is sized to the full context and is never resized.
pub struct ShapeItem<'t> {
    pub font: ShaperFont,
    /// Full code-unit context; the run being shaped is
    /// `start..start + length`.
    pub text: &'t [u16],
    pub start: usize,
    pub length: usize,
    pub rtl: bool,
    pub script: ScriptHint,
    /// Glyph IDs, one per produced glyph.
    pub glyphs: Vec<u16>,
    /// Per-glyph attribute bits.
    pub attributes: Vec<u32>,
    /// Per-glyph advances in 26.6 fixed point.
    pub advances: Vec<i32>,
    /// Per-glyph offsets in 26.6 fixed point.
    pub offsets: Vec<(i32, i32)>,
    /// Maps each code unit of the run, starting at index 0, to the index of
    /// the first glyph of its cluster.
    pub log_clusters: Vec<u16>,
    pub num_glyphs: usize,
}

impl<'t> ShapeItem<'t> {
    /// Builds a request for the run `start..start + length` of `text`.
    ///
    /// Glyph-side buffers start at twice the context length plus padding;
    /// script runs rarely produce more than two glyphs per code unit, so
    /// the regrow loop in [`shape_with_retry`] is the uncommon path.
    pub(crate) fn new(
        font: &FontConfig,
        text: &'t [u16],
        start: usize,
        length: usize,
        rtl: bool,
    ) -> Self {
        let mut item = Self {
            font: ShaperFont::new(font),
            text,
            start,
            length,
            rtl,
            script: if rtl {
                ScriptHint::Arabic
            } else {
                ScriptHint::Common
            },
            glyphs: Vec::new(),
            attributes: Vec::new(),
            advances: Vec::new(),
            offsets: Vec::new(),
            log_clusters: vec![0; text.len()],
            num_glyphs: 0,
        };
        item.grow((text.len() + 2) * 2);
        item
    }

    /// Replaces the glyph-side buffers with `capacity` zeroed slots and
    /// advertises the new capacity through `num_glyphs`.
    fn grow(&mut self, capacity: usize) {
        self.glyphs = vec![0; capacity];
        self.attributes = vec![0; capacity];
        self.advances = vec![0; capacity];
        self.offsets = vec![(0, 0); capacity];
        self.num_glyphs = capacity;
    }
}

/// The complex shaper consumed by the cache.
///
/// Implementations resolve `item.font.config.typeface_id` to an actual
/// face, shape the run window, and fill the item's buffers: glyph IDs,
/// attributes, advances (26.6 fixed point, see [`crate::fixed_to_f32`]),
/// offsets, and the log-cluster map for the run's code units, storing the
/// produced glyph count in `num_glyphs`. When the glyph-side buffers are
/// too small the implementation returns `false` with the required count in
/// `num_glyphs` and is retried with larger buffers.
pub trait Shaper {
    fn shape(&mut self, item: &mut ShapeItem<'_>) -> bool;
}

/// Shapes `item`, regrowing the glyph-side buffers until the shaper accepts
/// their capacity.
pub(crate) fn shape_with_retry<S: Shaper + ?Sized>(shaper: &mut S, item: &mut ShapeItem<'_>) {
    while !shaper.shape(item) {
        let required = item.num_glyphs.max(1);
        item.grow(required * 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_sizes_buffers_from_the_context() {
        let text = [0x61, 0x62, 0x63];
        let item = ShapeItem::new(&FontConfig::default(), &text, 1, 2, false);
        assert_eq!(item.num_glyphs, 10);
        assert_eq!(item.glyphs.len(), 10);
        assert_eq!(item.advances.len(), 10);
        assert_eq!(item.offsets.len(), 10);
        assert_eq!(item.log_clusters.len(), 3);
        assert_eq!(item.script, ScriptHint::Common);
        assert_eq!(item.font.x_ppem, 1);
        assert_eq!(item.font.x_scale, 1);
    }

    #[test]
    fn rtl_runs_are_hinted_as_arabic() {
        let text = [0x627, 0x644];
        let item = ShapeItem::new(&FontConfig::default(), &text, 0, 2, true);
        assert_eq!(item.script, ScriptHint::Arabic);
    }

    #[test]
    fn retry_regrows_to_twice_the_reported_requirement() {
        struct Demanding {
            required: usize,
            calls: usize,
        }
        impl Shaper for Demanding {
            fn shape(&mut self, item: &mut ShapeItem<'_>) -> bool {
                self.calls += 1;
                if item.glyphs.len() < self.required {
                    item.num_glyphs = self.required;
                    return false;
                }
                item.num_glyphs = self.required;
                true
            }
        }

        let text = [0x61, 0x62];
        let mut item = ShapeItem::new(&FontConfig::default(), &text, 0, 2, false);
        let mut shaper = Demanding {
            required: 40,
            calls: 0,
        };
        shape_with_retry(&mut shaper, &mut item);
        assert_eq!(shaper.calls, 2);
        assert_eq!(item.glyphs.len(), 80);
        assert_eq!(item.num_glyphs, 40);
        // The log-cluster buffer is never resized.
        assert_eq!(item.log_clusters.len(), 2);
    }
}
