// Copyright 2026 the Shapecache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drives the shaper across the visual runs of a paragraph and projects
//! the per-run output into a [`ShapeResult`].

use log::warn;

use crate::bidi::{BidiEngine, RunDirection, LEVEL_DEFAULT_LTR, LEVEL_DEFAULT_RTL};
use crate::font::FontConfig;
use crate::key::Direction;
use crate::result::ShapeResult;
use crate::shaper::{shape_with_retry, ShapeItem, Shaper};
use crate::util::fixed_to_f32;

/// Resolves `text` into visual runs per `direction` and shapes each run in
/// visual order, appending advances, glyphs and log clusters to `out`.
pub(crate) fn shape_text<S, B>(
    shaper: &mut S,
    bidi: &mut B,
    font: &FontConfig,
    text: &[u16],
    direction: Direction,
    out: &mut ShapeResult,
) where
    S: Shaper + ?Sized,
    B: BidiEngine + ?Sized,
{
    let context = text.len();

    if matches!(direction, Direction::ForceLtr | Direction::ForceRtl) {
        let rtl = direction == Direction::ForceRtl;
        let run_total = shape_run(shaper, font, text, 0, context, rtl, out);
        out.total_advance += run_total;
        return;
    }

    let level = match direction {
        Direction::Rtl => 1,
        Direction::DefaultLtr => LEVEL_DEFAULT_LTR,
        Direction::DefaultRtl => LEVEL_DEFAULT_RTL,
        _ => 0,
    };

    let Some(mut para) = bidi.open() else {
        // No resolver at all: shape one run in the requested fallback
        // direction.
        warn!("bidi resolver unavailable, shaping a single run");
        let rtl = level == 1 || level == LEVEL_DEFAULT_RTL;
        let run_total = shape_run(shaper, font, text, 0, context, rtl, out);
        out.total_advance += run_total;
        return;
    };

    if let Err(err) = para.set_paragraph(text, level) {
        warn!("bidi paragraph resolution failed ({err}), shaping a single run");
        let run_total = shape_run(shaper, font, text, 0, context, level & 1 == 1, out);
        out.total_advance += run_total;
        return;
    }

    let para_rtl = para.paragraph_level() & 1 == 1;
    match para.count_runs() {
        Ok(1) => {
            let run_total = shape_run(shaper, font, text, 0, context, para_rtl, out);
            out.total_advance += run_total;
        }
        Ok(count) => {
            for index in 0..count {
                let Some(run) = para.visual_run(index) else {
                    break;
                };
                let rtl = run.direction == RunDirection::Rtl;
                let run_total = shape_run(shaper, font, text, run.start, run.length, rtl, out);
                out.total_advance += run_total;
            }
        }
        Err(err) => {
            warn!("bidi run enumeration failed ({err}), shaping a single run");
            let run_total = shape_run(shaper, font, text, 0, context, para_rtl, out);
            out.total_advance += run_total;
        }
    }
}

/// Shapes one run and appends its output to `out`, returning the run's
/// total advance.
fn shape_run<S>(
    shaper: &mut S,
    font: &FontConfig,
    text: &[u16],
    start: usize,
    count: usize,
    rtl: bool,
    out: &mut ShapeResult,
) -> f32
where
    S: Shaper + ?Sized,
{
    if count == 0 {
        return 0.0;
    }

    let mut item = ShapeItem::new(font, text, start, count, rtl);
    shape_with_retry(shaper, &mut item);

    if item.num_glyphs == 0 {
        // The shaper produced nothing for this run; the result still needs
        // one advance per code unit.
        out.advances.extend(std::iter::repeat(0.0).take(count));
        return 0.0;
    }

    // One advance per code unit: the first code unit of each cluster takes
    // the whole cluster's advance, later members take zero.
    let clusters = &item.log_clusters;
    let mut current = fixed_to_f32(item.advances[clusters[0] as usize]);
    let mut run_total = current;
    out.advances.push(current);
    for i in 1..count {
        if clusters[i] == clusters[i - 1] {
            out.advances.push(0.0);
        } else {
            current = fixed_to_f32(item.advances[clusters[i] as usize]);
            run_total += current;
            out.advances.push(current);
        }
    }

    // Glyphs land in visual order: reversed within the run when RTL.
    for i in 0..item.num_glyphs {
        let index = if rtl { item.num_glyphs - 1 - i } else { i };
        out.glyphs.push(item.glyphs[index]);
    }

    // Successive runs share one flat cluster sequence; shift this run's
    // entries past those already appended so downstream range lookups see
    // unique values. The cluster buffer holds one entry per context code
    // unit, which bounds the append when a run produces more glyphs than
    // code units.
    let shift = out.log_clusters.len() as u16;
    for &cluster in item.log_clusters.iter().take(item.num_glyphs) {
        out.log_clusters.push(cluster + shift);
    }

    run_total
}
