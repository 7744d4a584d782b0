// Copyright 2026 the Shapecache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The narrow interface to the bidirectional resolver, and its production
//! implementation over the `unicode-bidi` crate.

use smallvec::SmallVec;
use thiserror::Error;
use unicode_bidi::utf16::BidiInfo;
use unicode_bidi::{bidi_class, BidiClass, Level};

/// Paragraph-level sentinel requesting first-strong resolution with an LTR
/// fallback.
pub const LEVEL_DEFAULT_LTR: u8 = 0xfe;
/// Paragraph-level sentinel requesting first-strong resolution with an RTL
/// fallback.
pub const LEVEL_DEFAULT_RTL: u8 = 0xff;

/// Resolved direction of one visual run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunDirection {
    Ltr,
    Rtl,
}

/// One visual run of a resolved paragraph, in code-unit indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisualRun {
    pub start: usize,
    pub length: usize,
    pub direction: RunDirection,
}

/// Failures the resolver can report. Both degrade to single-run shaping
/// inside the driver; neither surfaces to cache callers.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BidiError {
    #[error("paragraph could not be resolved")]
    Paragraph,
    #[error("visual runs could not be enumerated")]
    Runs,
}

/// A bidirectional resolver, opened once per computation.
pub trait BidiEngine {
    /// Opens a resolver for a single paragraph, or `None` when the engine
    /// is unavailable.
    fn open<'t>(&mut self) -> Option<Box<dyn BidiParagraph<'t> + 't>>;
}

/// One resolved paragraph. Dropping the value closes the resolver.
pub trait BidiParagraph<'t> {
    /// Resolves embedding levels for `text`. `level` is either an explicit
    /// paragraph level (the low bit carries direction) or one of
    /// [`LEVEL_DEFAULT_LTR`]/[`LEVEL_DEFAULT_RTL`].
    fn set_paragraph(&mut self, text: &'t [u16], level: u8) -> Result<(), BidiError>;

    /// The resolved paragraph level.
    fn paragraph_level(&self) -> u8;

    /// Number of visual runs in the paragraph.
    fn count_runs(&mut self) -> Result<usize, BidiError>;

    /// The `index`th run in visual order.
    fn visual_run(&self, index: usize) -> Option<VisualRun>;
}

/// [`BidiEngine`] backed by the `unicode-bidi` implementation of the
/// Unicode Bidirectional Algorithm, operating directly on UTF-16 code
/// units.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnicodeBidiEngine;

impl UnicodeBidiEngine {
    pub fn new() -> Self {
        Self
    }
}

impl BidiEngine for UnicodeBidiEngine {
    fn open<'t>(&mut self) -> Option<Box<dyn BidiParagraph<'t> + 't>> {
        Some(Box::new(UnicodeBidiParagraph::default()))
    }
}

#[derive(Default)]
struct UnicodeBidiParagraph<'t> {
    info: Option<BidiInfo<'t>>,
    runs: SmallVec<[VisualRun; 4]>,
    para_level: u8,
    enumerated: bool,
}

impl<'t> BidiParagraph<'t> for UnicodeBidiParagraph<'t> {
    fn set_paragraph(&mut self, text: &'t [u16], level: u8) -> Result<(), BidiError> {
        let default_level = match level {
            LEVEL_DEFAULT_LTR => None,
            LEVEL_DEFAULT_RTL => match first_strong(text) {
                // A strong character decides; auto-detection finds it.
                Some(_) => None,
                None => Some(Level::rtl()),
            },
            explicit => Some(Level::new(explicit).map_err(|_| BidiError::Paragraph)?),
        };
        let info = BidiInfo::new(text, default_level);
        self.para_level = match info.paragraphs.first() {
            Some(para) => para.level.number(),
            // Empty text has no paragraph; fall back to the request.
            None => match level {
                LEVEL_DEFAULT_LTR => 0,
                LEVEL_DEFAULT_RTL => 1,
                explicit => explicit & 1,
            },
        };
        self.info = Some(info);
        Ok(())
    }

    fn paragraph_level(&self) -> u8 {
        self.para_level
    }

    fn count_runs(&mut self) -> Result<usize, BidiError> {
        if !self.enumerated {
            let info = self.info.as_ref().ok_or(BidiError::Runs)?;
            // A paragraph separator splits the text; visual runs of each
            // paragraph concatenate in paragraph order.
            for para in &info.paragraphs {
                let (levels, ranges) = info.visual_runs(para, para.range.clone());
                for range in ranges {
                    let direction = if levels[range.start].is_rtl() {
                        RunDirection::Rtl
                    } else {
                        RunDirection::Ltr
                    };
                    self.runs.push(VisualRun {
                        start: range.start,
                        length: range.len(),
                        direction,
                    });
                }
            }
            self.enumerated = true;
        }
        Ok(self.runs.len())
    }

    fn visual_run(&self, index: usize) -> Option<VisualRun> {
        self.runs.get(index).copied()
    }
}

/// First strong direction in the text, decoding surrogate pairs along the
/// way.
fn first_strong(text: &[u16]) -> Option<RunDirection> {
    for ch in char::decode_utf16(text.iter().copied()) {
        let ch = ch.unwrap_or(char::REPLACEMENT_CHARACTER);
        match bidi_class(ch) {
            BidiClass::L => return Some(RunDirection::Ltr),
            BidiClass::R | BidiClass::AL => return Some(RunDirection::Rtl),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(engine: &mut UnicodeBidiEngine) -> Box<dyn BidiParagraph<'static> + 'static> {
        engine.open().expect("engine is always available")
    }

    #[test]
    fn all_ltr_text_is_one_run() {
        // "abc"
        const TEXT: &[u16] = &[0x61, 0x62, 0x63];
        let mut engine = UnicodeBidiEngine::new();
        let mut para = open(&mut engine);
        para.set_paragraph(TEXT, LEVEL_DEFAULT_LTR).unwrap();
        assert_eq!(para.paragraph_level(), 0);
        assert_eq!(para.count_runs().unwrap(), 1);
        assert_eq!(
            para.visual_run(0),
            Some(VisualRun {
                start: 0,
                length: 3,
                direction: RunDirection::Ltr,
            })
        );
    }

    #[test]
    fn mixed_text_splits_into_directional_runs() {
        // "abc" followed by two Hebrew letters.
        const TEXT: &[u16] = &[0x61, 0x62, 0x63, 0x05D0, 0x05D1];
        let mut engine = UnicodeBidiEngine::new();
        let mut para = open(&mut engine);
        para.set_paragraph(TEXT, 0).unwrap();
        assert_eq!(para.paragraph_level(), 0);
        assert_eq!(para.count_runs().unwrap(), 2);
        let first = para.visual_run(0).unwrap();
        let second = para.visual_run(1).unwrap();
        assert_eq!((first.start, first.length), (0, 3));
        assert_eq!(first.direction, RunDirection::Ltr);
        assert_eq!((second.start, second.length), (3, 2));
        assert_eq!(second.direction, RunDirection::Rtl);
        assert_eq!(para.visual_run(2), None);
    }

    #[test]
    fn rtl_text_resolves_to_level_one() {
        // Three Arabic letters.
        const TEXT: &[u16] = &[0x0627, 0x0644, 0x0645];
        let mut engine = UnicodeBidiEngine::new();
        let mut para = open(&mut engine);
        para.set_paragraph(TEXT, 1).unwrap();
        assert_eq!(para.paragraph_level(), 1);
        assert_eq!(para.count_runs().unwrap(), 1);
        assert_eq!(para.visual_run(0).unwrap().direction, RunDirection::Rtl);
    }

    #[test]
    fn default_sentinels_pick_the_fallback_on_neutral_text() {
        // Digits and punctuation carry no strong direction.
        const TEXT: &[u16] = &[0x31, 0x2E, 0x32];
        let mut engine = UnicodeBidiEngine::new();

        let mut para = open(&mut engine);
        para.set_paragraph(TEXT, LEVEL_DEFAULT_LTR).unwrap();
        assert_eq!(para.paragraph_level(), 0);

        let mut para = open(&mut engine);
        para.set_paragraph(TEXT, LEVEL_DEFAULT_RTL).unwrap();
        assert_eq!(para.paragraph_level(), 1);
    }

    #[test]
    fn default_sentinels_follow_the_first_strong_character() {
        // Hebrew letter first, then Latin.
        const TEXT: &[u16] = &[0x05D0, 0x61];
        let mut engine = UnicodeBidiEngine::new();
        let mut para = open(&mut engine);
        para.set_paragraph(TEXT, LEVEL_DEFAULT_LTR).unwrap();
        assert_eq!(para.paragraph_level(), 1);
    }

    #[test]
    fn empty_text_has_no_runs() {
        let mut engine = UnicodeBidiEngine::new();
        let mut para = open(&mut engine);
        para.set_paragraph(&[], LEVEL_DEFAULT_RTL).unwrap();
        assert_eq!(para.paragraph_level(), 1);
        assert_eq!(para.count_runs().unwrap(), 0);
    }
}
