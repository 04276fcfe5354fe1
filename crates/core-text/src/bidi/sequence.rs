//! Isolating run sequences (BD13) and their sos/eos boundary types (X10).

use crate::class::BidiClass;

/// A maximal chain of same-level runs joined across isolate initiator /
/// matching-PDI boundaries. `indices` are logical positions of the
/// non-removed characters, in order.
pub(super) struct IsolatingSequence {
    pub indices: Vec<usize>,
    pub level: u8,
    /// Strong type (L or R) at the start-of-sequence boundary.
    pub sos: BidiClass,
    /// Strong type (L or R) at the end-of-sequence boundary.
    pub eos: BidiClass,
}

fn direction_of(level: u8) -> BidiClass {
    if level % 2 == 1 {
        BidiClass::R
    } else {
        BidiClass::L
    }
}

/// Compute the isolating run sequences for one paragraph.
///
/// `classes` are the original character types (used to find X9-removed
/// characters and isolate boundaries), `levels` the post-X levels.
pub(super) fn isolating_run_sequences(
    classes: &[BidiClass],
    levels: &[u8],
    para_level: u8,
    matching_pdi: &[Option<usize>],
) -> Vec<IsolatingSequence> {
    let n = classes.len();
    // Logical positions that participate in the W/N/I rules.
    let kept: Vec<usize> = (0..n).filter(|&i| !classes[i].is_removed_by_x9()).collect();
    if kept.is_empty() {
        return Vec::new();
    }

    // Level runs over the kept positions: maximal spans of equal level.
    struct LevelRun {
        positions: Vec<usize>,
    }
    let mut runs: Vec<LevelRun> = Vec::new();
    let mut current = vec![kept[0]];
    for &i in &kept[1..] {
        if levels[i] == levels[*current.last().unwrap()] {
            current.push(i);
        } else {
            runs.push(LevelRun {
                positions: std::mem::replace(&mut current, vec![i]),
            });
        }
    }
    runs.push(LevelRun { positions: current });

    // Map a logical position to the run it starts, for PDI chaining.
    let mut run_starting_at = vec![usize::MAX; n];
    for (r, run) in runs.iter().enumerate() {
        run_starting_at[run.positions[0]] = r;
    }

    let mut consumed = vec![false; runs.len()];
    let mut sequences = Vec::new();
    for r in 0..runs.len() {
        if consumed[r] {
            continue;
        }
        let mut indices = Vec::new();
        let mut current_run = r;
        loop {
            consumed[current_run] = true;
            indices.extend_from_slice(&runs[current_run].positions);
            let last = *indices.last().unwrap();
            // Chain to the run beginning with the matching PDI, if any.
            if classes[last].is_isolate_initiator() {
                if let Some(pdi) = matching_pdi[last] {
                    let next = run_starting_at[pdi];
                    if next != usize::MAX && !consumed[next] {
                        current_run = next;
                        continue;
                    }
                }
            }
            break;
        }

        let level = levels[indices[0]];
        let first = indices[0];
        let last = *indices.last().unwrap();

        // sos: compare against the level of the nearest kept character
        // before the sequence, or the paragraph level at the text edge.
        let level_before = kept
            .iter()
            .rev()
            .find(|&&i| i < first)
            .map_or(para_level, |&i| levels[i]);
        let sos = direction_of(level.max(level_before));

        // eos: an unmatched isolate initiator at the end of the sequence is
        // paired with the paragraph edge; otherwise the nearest kept
        // character after the sequence decides.
        let level_after = if classes[last].is_isolate_initiator() && matching_pdi[last].is_none() {
            para_level
        } else {
            kept.iter()
                .find(|&&i| i > last)
                .map_or(para_level, |&i| levels[i])
        };
        let eos = direction_of(level.max(level_after));

        sequences.push(IsolatingSequence {
            indices,
            level,
            sos,
            eos,
        });
    }
    sequences
}

#[cfg(test)]
mod tests {
    use super::super::explicit::{matching_pdi_map, run_explicit};
    use super::*;
    use BidiClass::*;

    fn sequences_for(classes: &[BidiClass], para: u8) -> Vec<IsolatingSequence> {
        let map = matching_pdi_map(classes);
        let out = run_explicit(classes, para, &map);
        isolating_run_sequences(classes, &out.levels, para, &map)
    }

    #[test]
    fn single_sequence_for_uniform_text() {
        let seqs = sequences_for(&[L, L, WS, L], 0);
        assert_eq!(seqs.len(), 1);
        assert_eq!(seqs[0].indices, vec![0, 1, 2, 3]);
        assert_eq!(seqs[0].sos, L);
        assert_eq!(seqs[0].eos, L);
    }

    #[test]
    fn isolate_chains_initiator_with_pdi() {
        // RLI R PDI L: the initiator and PDI belong to the outer sequence,
        // the R forms its own inner sequence.
        let classes = [RLI, R, PDI, L];
        let seqs = sequences_for(&classes, 0);
        assert_eq!(seqs.len(), 2);
        let outer = seqs.iter().find(|s| s.indices.contains(&0)).unwrap();
        assert_eq!(outer.indices, vec![0, 2, 3]);
        assert_eq!(outer.level, 0);
        let inner = seqs.iter().find(|s| s.indices == vec![1]).unwrap();
        assert_eq!(inner.level, 1);
        assert_eq!(inner.sos, R);
        assert_eq!(inner.eos, R);
    }

    #[test]
    fn removed_characters_do_not_split_runs() {
        // The RLE/PDF pair raises the middle character; the surrounding L
        // characters stay one level run each side but the removed chars are
        // not members of any sequence.
        let classes = [L, RLE, L, PDF, L];
        let seqs = sequences_for(&classes, 0);
        let all: Vec<usize> = seqs.iter().flat_map(|s| s.indices.clone()).collect();
        assert!(!all.contains(&1));
        assert!(!all.contains(&3));
    }

    #[test]
    fn unmatched_initiator_uses_paragraph_edge_for_eos() {
        let classes = [L, RLI, R];
        let seqs = sequences_for(&classes, 0);
        let outer = seqs.iter().find(|s| s.indices.contains(&1)).unwrap();
        // Sequence ends with an unmatched RLI: eos from max(level 0, para 0).
        assert_eq!(outer.eos, L);
    }
}
