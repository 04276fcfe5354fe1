//! Unicode Bidirectional Algorithm (UAX #9) over logical code points.
//!
//! The engine produces per-character embedding levels and level runs; it
//! deliberately stops short of reordering for display. Callers that need
//! visual order apply [`Paragraph::visual_order`] (rule L2): the display
//! formatter does exactly that after shaping.
//!
//! Rule coverage: P2/P3 ([`explicit::paragraph_level`]), X1–X8 explicit
//! embeddings/overrides/isolates with a 125-deep status stack, W1–W7 and
//! N0–N2 per isolating run sequence, I1/I2 implicit levels, and the L1
//! separator/trailing-whitespace level resets (so paragraph separators hold
//! the paragraph level, as callers observe).

mod explicit;
mod resolve;
mod sequence;

use crate::class::{bidi_class, BidiClass};

/// UAX #9 maximum explicit depth.
pub const MAX_DEPTH: u8 = 125;

/// Requested paragraph direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseLevel {
    /// Force a left-to-right paragraph (level 0).
    Ltr,
    /// Force a right-to-left paragraph (level 1).
    Rtl,
    /// Detect from the first strong character (rules P2/P3), default LTR.
    #[default]
    Auto,
}

impl BaseLevel {
    /// Conventional integer encoding: `0` LTR, `1` RTL, `-1` auto.
    pub fn from_raw(raw: i32) -> BaseLevel {
        match raw {
            0 => BaseLevel::Ltr,
            1 => BaseLevel::Rtl,
            _ => BaseLevel::Auto,
        }
    }
}

/// A maximal span of characters sharing one embedding level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub start: usize,
    pub len: usize,
    pub level: u8,
}

/// Resolved paragraph: levels, runs, and enough bookkeeping to reorder.
#[derive(Debug, Clone)]
pub struct Paragraph {
    /// Per-character embedding level, `0..=125`.
    pub levels: Vec<u8>,
    /// Equal-level runs covering the paragraph exactly.
    pub runs: Vec<Run>,
    /// Paragraph embedding level after P2/P3 (or as forced).
    pub base_level: u8,
    /// Original character classes; needed to identify the X9-removed
    /// formatting characters, which reordering drops.
    classes: Vec<BidiClass>,
}

impl Paragraph {
    /// Whether position `i` holds an explicit formatting character or
    /// boundary neutral that rule X9 removes from display.
    pub fn is_removed(&self, i: usize) -> bool {
        self.classes[i].is_removed_by_x9()
    }

    /// Rule L2: logical indices in visual (left-to-right screen) order.
    /// X9-removed characters are omitted.
    pub fn visual_order(&self) -> Vec<usize> {
        let kept: Vec<usize> = (0..self.levels.len())
            .filter(|&i| !self.is_removed(i))
            .collect();
        reorder_visual(&kept, &self.levels)
    }
}

/// Rule L2 over an explicit subset: reverse contiguous spans from the
/// highest level down to the lowest odd level. `positions` are the logical
/// indices taking part (callers pass the non-removed ones), returned in
/// visual order.
pub fn reorder_visual(positions: &[usize], levels: &[u8]) -> Vec<usize> {
    let mut order: Vec<usize> = positions.to_vec();
    if order.is_empty() {
        return order;
    }
    let max_level = order.iter().map(|&i| levels[i]).max().unwrap_or(0);
    let lowest_odd = order
        .iter()
        .map(|&i| levels[i])
        .filter(|l| l % 2 == 1)
        .min()
        .unwrap_or(max_level + 1);
    let mut level = max_level;
    while level >= lowest_odd {
        let mut k = 0;
        while k < order.len() {
            if levels[order[k]] >= level {
                let start = k;
                while k < order.len() && levels[order[k]] >= level {
                    k += 1;
                }
                order[start..k].reverse();
            } else {
                k += 1;
            }
        }
        if level == 0 {
            break;
        }
        level -= 1;
    }
    order
}

/// The UAX #9 engine. Stateless; one instance can serve every surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct BidiEngine;

impl BidiEngine {
    pub fn new() -> Self {
        BidiEngine
    }

    /// Resolve a paragraph of logical code points.
    pub fn process(&self, chars: &[char], base: BaseLevel) -> Paragraph {
        let classes: Vec<BidiClass> = chars.iter().map(|&c| bidi_class(c)).collect();
        self.resolve(classes, Some(chars), base)
    }

    /// Resolve a paragraph given as bidi classes directly. This is the
    /// conformance entry point: `BidiTest.txt` cases are class sequences,
    /// so bracket pairing (N0) has no character identities to act on.
    pub fn resolve_classes(&self, classes: &[BidiClass], base: BaseLevel) -> Paragraph {
        self.resolve(classes.to_vec(), None, base)
    }

    fn resolve(&self, classes: Vec<BidiClass>, chars: Option<&[char]>, base: BaseLevel) -> Paragraph {
        if classes.is_empty() {
            return Paragraph {
                levels: Vec::new(),
                runs: Vec::new(),
                base_level: match base {
                    BaseLevel::Rtl => 1,
                    _ => 0,
                },
                classes,
            };
        }

        let matching_pdi = explicit::matching_pdi_map(&classes);
        let para_level = match base {
            BaseLevel::Ltr => 0,
            BaseLevel::Rtl => 1,
            BaseLevel::Auto => explicit::paragraph_level(&classes, &matching_pdi),
        };

        let explicit::ExplicitOutput { mut levels, mut work } =
            explicit::run_explicit(&classes, para_level, &matching_pdi);

        let sequences =
            sequence::isolating_run_sequences(&classes, &levels, para_level, &matching_pdi);
        for seq in &sequences {
            resolve::resolve_weak(seq, &mut work);
            if let Some(chars) = chars {
                resolve::resolve_brackets(seq, chars, &classes, &mut work);
            }
            resolve::resolve_neutrals(seq, &mut work);
            resolve::resolve_implicit(seq, &work, &mut levels);
        }

        l1_reset(&classes, &mut levels, para_level);
        let runs = build_runs(&levels);

        tracing::trace!(
            target: "bidi",
            chars = classes.len(),
            para_level,
            runs = runs.len(),
            "paragraph_resolved"
        );

        Paragraph {
            levels,
            runs,
            base_level: para_level,
            classes,
        }
    }
}

/// Rule L1: segment/paragraph separators and any run of whitespace or
/// isolate formatting characters before them (or at the end of the text)
/// reset to the paragraph level. Original classes decide membership;
/// X9-removed characters ride along without terminating the run.
fn l1_reset(classes: &[BidiClass], levels: &mut [u8], para_level: u8) {
    let resettable = |cls: BidiClass| {
        cls == BidiClass::WS
            || cls.is_isolate_initiator()
            || cls == BidiClass::PDI
            || cls.is_removed_by_x9()
    };
    let mut run_start = None::<usize>;
    for i in 0..classes.len() {
        if resettable(classes[i]) {
            run_start.get_or_insert(i);
        } else if matches!(classes[i], BidiClass::B | BidiClass::S) {
            levels[i] = para_level;
            if let Some(start) = run_start {
                for level in &mut levels[start..i] {
                    *level = para_level;
                }
            }
            run_start = None;
        } else {
            run_start = None;
        }
    }
    if let Some(start) = run_start {
        for level in &mut levels[start..] {
            *level = para_level;
        }
    }
}

fn build_runs(levels: &[u8]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for (i, &level) in levels.iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.level == level => run.len += 1,
            _ => runs.push(Run {
                start: i,
                len: 1,
                level,
            }),
        }
    }
    runs
}
