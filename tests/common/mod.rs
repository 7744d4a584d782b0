// Copyright 2026 the Shapecache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted shaper and bidi doubles shared by the scenario tests.

#![allow(dead_code)]

use shapecache::{
    f32_to_fixed, BidiEngine, BidiError, BidiParagraph, FontConfig, Hinting, ShapeItem, Shaper,
    VisualRun, LEVEL_DEFAULT_LTR, LEVEL_DEFAULT_RTL,
};

pub fn font() -> FontConfig {
    FontConfig {
        typeface_id: 1,
        text_size: 16.0,
        skew_x: 0.0,
        scale_x: 1.0,
        flags: 0,
        hinting: Hinting::Slight,
    }
}

/// Expected output for one `(start, length, rtl)` run.
pub struct StubRun {
    pub start: usize,
    pub length: usize,
    pub rtl: bool,
    /// Glyph IDs in the shaper's output order.
    pub glyphs: Vec<u16>,
    /// Glyph-side advances, converted to 26.6 on write.
    pub advances: Vec<f32>,
    /// Code-unit-to-glyph cluster map for the run.
    pub clusters: Vec<u16>,
}

/// Replays scripted tables for the runs it recognizes and reports an empty
/// result for any other run.
pub struct ScriptedShaper {
    pub runs: Vec<StubRun>,
}

impl ScriptedShaper {
    pub fn new(runs: Vec<StubRun>) -> Self {
        Self { runs }
    }
}

impl Shaper for ScriptedShaper {
    fn shape(&mut self, item: &mut ShapeItem<'_>) -> bool {
        let run = self
            .runs
            .iter()
            .find(|run| run.start == item.start && run.length == item.length && run.rtl == item.rtl);
        let Some(run) = run else {
            item.num_glyphs = 0;
            return true;
        };
        if item.glyphs.len() < run.glyphs.len() {
            item.num_glyphs = run.glyphs.len();
            return false;
        }
        for (i, &glyph) in run.glyphs.iter().enumerate() {
            item.glyphs[i] = glyph;
            item.advances[i] = f32_to_fixed(run.advances[i]);
        }
        for (i, &cluster) in run.clusters.iter().enumerate() {
            item.log_clusters[i] = cluster;
        }
        item.num_glyphs = run.glyphs.len();
        true
    }
}

/// One glyph per code unit, each advancing by the same amount.
pub struct UniformShaper {
    pub advance: f32,
}

impl Shaper for UniformShaper {
    fn shape(&mut self, item: &mut ShapeItem<'_>) -> bool {
        let count = item.length;
        if item.glyphs.len() < count {
            item.num_glyphs = count;
            return false;
        }
        for i in 0..count {
            item.glyphs[i] = i as u16;
            item.advances[i] = f32_to_fixed(self.advance);
            item.log_clusters[i] = i as u16;
        }
        item.num_glyphs = count;
        true
    }
}

/// Simulates an engine that cannot be opened at all.
pub struct NoBidi;

impl BidiEngine for NoBidi {
    fn open<'t>(&mut self) -> Option<Box<dyn BidiParagraph<'t> + 't>> {
        None
    }
}

/// An engine whose paragraphs fail at a scripted stage.
pub struct FlakyBidi {
    pub fail_paragraph: bool,
    pub fail_runs: bool,
}

impl BidiEngine for FlakyBidi {
    fn open<'t>(&mut self) -> Option<Box<dyn BidiParagraph<'t> + 't>> {
        Some(Box::new(FlakyParagraph {
            fail_paragraph: self.fail_paragraph,
            fail_runs: self.fail_runs,
            level: 0,
        }))
    }
}

struct FlakyParagraph {
    fail_paragraph: bool,
    fail_runs: bool,
    level: u8,
}

impl<'t> BidiParagraph<'t> for FlakyParagraph {
    fn set_paragraph(&mut self, _text: &'t [u16], level: u8) -> Result<(), BidiError> {
        self.level = match level {
            LEVEL_DEFAULT_LTR => 0,
            LEVEL_DEFAULT_RTL => 1,
            explicit => explicit & 1,
        };
        if self.fail_paragraph {
            Err(BidiError::Paragraph)
        } else {
            Ok(())
        }
    }

    fn paragraph_level(&self) -> u8 {
        self.level
    }

    fn count_runs(&mut self) -> Result<usize, BidiError> {
        if self.fail_runs {
            Err(BidiError::Runs)
        } else {
            Ok(1)
        }
    }

    fn visual_run(&self, _index: usize) -> Option<VisualRun> {
        None
    }
}
