// Copyright 2026 the Shapecache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Byte-budgeted caching for Unicode text shaping.
//!
//! Shaping a run of text is expensive: the bidirectional algorithm splits it
//! into directional runs, a complex shaper turns each run into glyphs, and
//! the results have to be projected back onto code-unit positions. This
//! crate memoizes that work. [`ShapeCache::get_or_compute`] returns the
//! shaped form of a UTF-16 code-unit sequence for a given font
//! configuration and [`Direction`] mode, computing it at most once while the
//! entry stays within the cache's byte budget.
//!
//! The cache holds [`ShapeResult`] values: one advance per input code unit,
//! glyph IDs in visual order, and a log-cluster map tying glyphs back to
//! code-unit positions. Entries are keyed by the exact code units plus the
//! shaping-relevant font parameters, accounted by their logical byte size,
//! and evicted oldest-first once the budget is exceeded.
//!
//! The expensive collaborators are consumed through narrow traits: the
//! complex shaper through [`Shaper`] and the bidirectional resolver through
//! [`BidiEngine`]. A production resolver backed by the `unicode-bidi` crate
//! is provided as [`UnicodeBidiEngine`]; the shaper is supplied by the
//! embedding font stack.

mod bidi;
mod cache;
mod font;
mod key;
mod result;
mod shape;
mod shaper;
mod store;
mod util;

pub use bidi::{
    BidiEngine, BidiError, BidiParagraph, RunDirection, UnicodeBidiEngine, VisualRun,
    LEVEL_DEFAULT_LTR, LEVEL_DEFAULT_RTL,
};
pub use cache::{CacheOptions, CacheStats, ShapeCache, DEFAULT_MAX_BYTES};
pub use font::{FontConfig, Hinting};
pub use key::{Direction, ShapeKey};
pub use result::ShapeResult;
pub use shaper::{ScriptHint, ShapeItem, Shaper, ShaperFont};
pub use util::{f32_to_fixed, fixed_to_f32};
