//! Rules P2/P3 and X1–X8: paragraph level and the explicit
//! embedding/override/isolate pass.

use crate::class::BidiClass;

use super::MAX_DEPTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Override {
    Neutral,
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy)]
struct Status {
    level: u8,
    override_state: Override,
    isolate: bool,
}

/// Result of the explicit pass.
pub(super) struct ExplicitOutput {
    /// Per-character embedding level after X1–X8.
    pub levels: Vec<u8>,
    /// Working classes; characters under a directional override have been
    /// rewritten to L or R, everything else keeps its original class.
    pub work: Vec<BidiClass>,
}

/// For every isolate initiator, the index of its matching PDI (BD9).
/// Non-initiators map to `None`, as do unmatched initiators.
pub(super) fn matching_pdi_map(classes: &[BidiClass]) -> Vec<Option<usize>> {
    let mut map = vec![None; classes.len()];
    let mut open: Vec<usize> = Vec::new();
    for (i, cls) in classes.iter().enumerate() {
        if cls.is_isolate_initiator() {
            open.push(i);
        } else if *cls == BidiClass::PDI {
            if let Some(start) = open.pop() {
                map[start] = Some(i);
            }
        }
    }
    map
}

/// P2/P3 over a class slice: first strong type wins, skipping anything
/// between an isolate initiator and its matching PDI. Defaults to LTR.
pub(super) fn paragraph_level(classes: &[BidiClass], matching_pdi: &[Option<usize>]) -> u8 {
    let mut i = 0;
    while i < classes.len() {
        match classes[i] {
            BidiClass::L => return 0,
            BidiClass::R | BidiClass::AL => return 1,
            cls if cls.is_isolate_initiator() => {
                // Skip past the matching PDI; an unmatched initiator hides
                // the rest of the paragraph from P2.
                match matching_pdi[i] {
                    Some(pdi) => i = pdi + 1,
                    None => return 0,
                }
            }
            _ => i += 1,
        }
    }
    0
}

fn next_odd(level: u8) -> u8 {
    (level + 1) | 1
}

fn next_even(level: u8) -> u8 {
    (level + 2) & !1
}

/// The direction an FSI assumes: scan forward to the matching PDI for the
/// first strong type (X5c), reusing the P2 logic on the enclosed slice.
fn fsi_is_rtl(classes: &[BidiClass], start: usize, matching_pdi: &[Option<usize>]) -> bool {
    let end = matching_pdi[start].unwrap_or(classes.len());
    let inner = &classes[start + 1..end];
    let inner_map = matching_pdi_map(inner);
    paragraph_level(inner, &inner_map) == 1
}

/// X1–X8. Every character receives the embedding level of the directional
/// status entry active when it was encountered; overridden characters have
/// their working class rewritten to L or R.
pub(super) fn run_explicit(
    classes: &[BidiClass],
    para_level: u8,
    matching_pdi: &[Option<usize>],
) -> ExplicitOutput {
    let n = classes.len();
    let mut levels = vec![para_level; n];
    let mut work = classes.to_vec();

    let mut stack = Vec::with_capacity(MAX_DEPTH as usize + 2);
    stack.push(Status {
        level: para_level,
        override_state: Override::Neutral,
        isolate: false,
    });
    let mut overflow_isolates = 0usize;
    let mut overflow_embeddings = 0usize;
    let mut valid_isolates = 0usize;

    for i in 0..n {
        let cls = classes[i];
        match cls {
            BidiClass::RLE | BidiClass::LRE | BidiClass::RLO | BidiClass::LRO => {
                let top = *stack.last().unwrap();
                levels[i] = top.level;
                let rtl = matches!(cls, BidiClass::RLE | BidiClass::RLO);
                let new_level = if rtl {
                    next_odd(top.level)
                } else {
                    next_even(top.level)
                };
                if new_level <= MAX_DEPTH && overflow_isolates == 0 && overflow_embeddings == 0 {
                    let override_state = match cls {
                        BidiClass::RLO => Override::Rtl,
                        BidiClass::LRO => Override::Ltr,
                        _ => Override::Neutral,
                    };
                    stack.push(Status {
                        level: new_level,
                        override_state,
                        isolate: false,
                    });
                } else if overflow_isolates == 0 {
                    overflow_embeddings += 1;
                }
            }
            BidiClass::RLI | BidiClass::LRI | BidiClass::FSI => {
                let rtl = match cls {
                    BidiClass::RLI => true,
                    BidiClass::LRI => false,
                    _ => fsi_is_rtl(classes, i, matching_pdi),
                };
                let top = *stack.last().unwrap();
                levels[i] = top.level;
                apply_override(&mut work[i], top.override_state);
                let new_level = if rtl {
                    next_odd(top.level)
                } else {
                    next_even(top.level)
                };
                if new_level <= MAX_DEPTH && overflow_isolates == 0 && overflow_embeddings == 0 {
                    valid_isolates += 1;
                    stack.push(Status {
                        level: new_level,
                        override_state: Override::Neutral,
                        isolate: true,
                    });
                } else {
                    overflow_isolates += 1;
                }
            }
            BidiClass::PDI => {
                if overflow_isolates > 0 {
                    overflow_isolates -= 1;
                } else if valid_isolates > 0 {
                    overflow_embeddings = 0;
                    while !stack.last().unwrap().isolate {
                        stack.pop();
                    }
                    stack.pop();
                    valid_isolates -= 1;
                }
                let top = *stack.last().unwrap();
                levels[i] = top.level;
                apply_override(&mut work[i], top.override_state);
            }
            BidiClass::PDF => {
                levels[i] = stack.last().unwrap().level;
                if overflow_isolates > 0 {
                    // Balanced against an overflow isolate; nothing to pop.
                } else if overflow_embeddings > 0 {
                    overflow_embeddings -= 1;
                } else if !stack.last().unwrap().isolate && stack.len() >= 2 {
                    stack.pop();
                }
            }
            BidiClass::B => {
                // X8: paragraph separators sit at the paragraph level.
                levels[i] = para_level;
            }
            BidiClass::BN => {
                levels[i] = stack.last().unwrap().level;
            }
            _ => {
                let top = *stack.last().unwrap();
                levels[i] = top.level;
                apply_override(&mut work[i], top.override_state);
            }
        }
    }

    ExplicitOutput { levels, work }
}

fn apply_override(class: &mut BidiClass, state: Override) {
    match state {
        Override::Neutral => {}
        Override::Ltr => *class = BidiClass::L,
        Override::Rtl => *class = BidiClass::R,
    }
}
